// SPDX-License-Identifier: GPL-3.0-only

use crate::geometry::{Geometry, GeometryLimits, Point, Size, Viewport, clamp};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Panel geometry that persists between sessions.
///
/// Written only while the panel is open; maximized and mobile rectangles are
/// derived from the viewport and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub position: Point,
    pub size: Size,
    /// Milliseconds since the Unix epoch.
    pub saved_at: u64,
}

impl PersistedRecord {
    /// Snapshot a committed geometry, stamped with the current time.
    #[must_use]
    pub fn capture(geometry: Geometry) -> Self {
        Self::capture_at(geometry, now_millis())
    }

    #[must_use]
    pub const fn capture_at(geometry: Geometry, saved_at: u64) -> Self {
        Self {
            position: geometry.position(),
            size: geometry.size(),
            saved_at,
        }
    }

    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        Geometry::from_parts(self.position, self.size)
    }

    /// Re-validate a stored geometry against the current viewport.
    ///
    /// Returns `None` for records that cannot describe a panel at all
    /// (non-positive sizes). Anything else is corrected by [`clamp`].
    #[must_use]
    pub fn restore(&self, viewport: Viewport, limits: &GeometryLimits) -> Option<Geometry> {
        if self.size.width <= 0 || self.size.height <= 0 {
            return None;
        }
        Some(clamp(self.geometry(), viewport, limits))
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = PersistedRecord::capture_at(Geometry::new(100, 50, 450, 620), 1_700_000_000_000);
        let json = serde_json::to_value(record).expect("record serializes");
        assert_eq!(json["position"]["x"], 100);
        assert_eq!(json["position"]["y"], 50);
        assert_eq!(json["size"]["width"], 450);
        assert_eq!(json["size"]["height"], 620);
        assert_eq!(json["savedAt"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_partial_record_fails_to_parse() {
        let result = serde_json::from_str::<PersistedRecord>(r#"{ "position": { "x": 1, "y": 2 } }"#);
        assert!(result.is_err(), "A record without a size must not parse");
    }

    #[test]
    fn test_restore_reclamps() {
        let limits = GeometryLimits::default();
        let record = PersistedRecord::capture_at(Geometry::new(5000, -40, 2000, 100), 0);
        let restored = record
            .restore(Viewport::new(1280, 800), &limits)
            .expect("oversized record is corrected, not rejected");
        assert_eq!(restored, Geometry::new(1180, 0, 800, 400));
    }

    #[test]
    fn test_restore_rejects_degenerate_size() {
        let record = PersistedRecord::capture_at(Geometry::new(10, 10, 0, 500), 0);
        assert!(record.restore(Viewport::new(1280, 800), &GeometryLimits::default()).is_none());
    }

    #[test]
    fn test_capture_stamps_time() {
        let record = PersistedRecord::capture(Geometry::new(1, 2, 400, 500));
        assert!(record.saved_at > 0, "savedAt should be a real timestamp");
    }
}
