// SPDX-License-Identifier: GPL-3.0-only

//! Screen-space geometry for the floating panel.
//!
//! Everything in this module is a pure function over value types. The panel
//! manager owns the authoritative [`Geometry`] and routes every proposed change
//! through [`clamp`], [`clamp_size`] and [`snap`] before committing it.
//!
//! Coordinates are integer pixels with the origin at the top-left corner of the
//! viewport.

use crate::app_settings;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A pointer or panel position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// Panel dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Visible area of the host surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether the viewport is narrow enough to force the full-screen layout.
    #[must_use]
    pub const fn is_mobile(&self, breakpoint: i32) -> bool {
        self.width < breakpoint
    }
}

/// Position and size of the panel rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub const fn with_position(self, position: Point) -> Self {
        Self::from_parts(position, self.size())
    }

    #[must_use]
    pub const fn with_size(self, size: Size) -> Self {
        Self::from_parts(self.position(), size)
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// Size bounds and visibility requirements applied by [`clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryLimits {
    pub min_size: Size,
    pub max_size: Size,
    /// Horizontal strip that must remain inside the viewport.
    pub min_visible_width: i32,
    /// The header must stay reachable: `y` never exceeds `viewport.height - header_height`.
    pub header_height: i32,
}

impl Default for GeometryLimits {
    fn default() -> Self {
        Self {
            min_size: Size::new(app_settings::MIN_WIDTH, app_settings::MIN_HEIGHT),
            max_size: Size::new(app_settings::MAX_WIDTH, app_settings::MAX_HEIGHT),
            min_visible_width: app_settings::MIN_VISIBLE_WIDTH,
            header_height: app_settings::HEADER_HEIGHT,
        }
    }
}

impl GeometryLimits {
    /// Clamp each dimension into `[min_size, max_size]`.
    #[must_use]
    pub fn clamp_dimensions(&self, size: Size) -> Size {
        Size::new(
            size.width
                .max(self.min_size.width)
                .min(self.max_size.width.max(self.min_size.width)),
            size.height
                .max(self.min_size.height)
                .min(self.max_size.height.max(self.min_size.height)),
        )
    }
}

/// Constrain a geometry so it satisfies the size bounds and stays reachable.
///
/// The panel may hang off the left or right edge, but at least
/// `min_visible_width` pixels of it remain on-screen. The header never goes
/// above the top edge nor below `viewport.height - header_height`.
///
/// Idempotent: `clamp(clamp(g, v, l), v, l) == clamp(g, v, l)`.
#[must_use]
pub fn clamp(geometry: Geometry, viewport: Viewport, limits: &GeometryLimits) -> Geometry {
    let size = limits.clamp_dimensions(geometry.size());

    let min_x = limits.min_visible_width.saturating_sub(size.width);
    let max_x = viewport
        .width
        .saturating_sub(limits.min_visible_width)
        .max(min_x);
    let max_y = viewport.height.saturating_sub(limits.header_height).max(0);

    Geometry::new(
        geometry.x.clamp(min_x, max_x),
        geometry.y.clamp(0, max_y),
        size.width,
        size.height,
    )
}

/// Shrink the size so the right and bottom edges stay inside the viewport.
///
/// The position is never moved. Dimensions are clamped into
/// `[min_size, max_size]` afterwards, so the minimum wins when the viewport
/// is too small to fit it.
#[must_use]
pub fn clamp_size(geometry: Geometry, viewport: Viewport, limits: &GeometryLimits) -> Geometry {
    let fitted = Size::new(
        geometry.width.min(viewport.width.saturating_sub(geometry.x)),
        geometry.height.min(viewport.height.saturating_sub(geometry.y)),
    );
    geometry.with_size(limits.clamp_dimensions(fitted))
}

/// Pull edges that are within `threshold` pixels of a viewport edge flush to it.
///
/// Each axis is evaluated independently. When both edges of an axis qualify,
/// the nearer one wins and ties go to the left/top edge.
#[must_use]
pub fn snap(geometry: Geometry, viewport: Viewport, threshold: i32) -> Geometry {
    let x = snap_axis(geometry.x, geometry.width, viewport.width, threshold);
    let y = snap_axis(geometry.y, geometry.height, viewport.height, threshold);
    geometry.with_position(Point::new(x, y))
}

fn snap_axis(start: i32, extent: i32, span: i32, threshold: i32) -> i32 {
    let leading = start.saturating_abs();
    let trailing = span
        .saturating_sub(start.saturating_add(extent))
        .saturating_abs();

    match (leading <= threshold, trailing <= threshold) {
        (true, true) if trailing < leading => span - extent,
        (true, _) => 0,
        (false, true) => span - extent,
        (false, false) => start,
    }
}

/// Default bottom-right anchored geometry for a first open.
#[must_use]
pub fn default_geometry(
    viewport: Viewport,
    size: Size,
    margin_right: i32,
    margin_bottom: i32,
    limits: &GeometryLimits,
) -> Geometry {
    let size = limits.clamp_dimensions(size);
    let proposed = Geometry::new(
        viewport
            .width
            .saturating_sub(size.width)
            .saturating_sub(margin_right),
        viewport
            .height
            .saturating_sub(size.height)
            .saturating_sub(margin_bottom),
        size.width,
        size.height,
    );
    clamp(proposed, viewport, limits)
}

/// Rectangle used while maximized: the viewport minus a fixed inset.
///
/// Never smaller than the minimum size; on tiny viewports the rectangle
/// overflows instead of collapsing.
#[must_use]
pub fn maximized_geometry(viewport: Viewport, inset: i32, limits: &GeometryLimits) -> Geometry {
    Geometry::new(
        inset,
        inset,
        viewport
            .width
            .saturating_sub(inset.saturating_mul(2))
            .max(limits.min_size.width),
        viewport
            .height
            .saturating_sub(inset.saturating_mul(2))
            .max(limits.min_size.height),
    )
}

/// Full-screen rectangle used by the mobile layout.
#[must_use]
pub fn mobile_geometry(viewport: Viewport) -> Geometry {
    Geometry::new(0, 0, viewport.width.max(1), viewport.height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> GeometryLimits {
        GeometryLimits::default()
    }

    /// Geometry samples covering in-bounds, overshooting and degenerate inputs.
    fn samples() -> Vec<Geometry> {
        let mut out = Vec::new();
        for x in [-5000, -420, -321, -320, -60, 0, 5, 840, 1180, 1181, 9000] {
            for y in [-100, 0, 19, 100, 760, 761, 5000] {
                for (w, h) in [(0, 0), (350, 400), (420, 600), (801, 2000), (-10, 450)] {
                    out.push(Geometry::new(x, y, w, h));
                }
            }
        }
        out
    }

    #[test]
    fn test_clamp_is_idempotent() {
        for viewport in [
            Viewport::new(1280, 800),
            Viewport::new(375, 667),
            Viewport::new(50, 30),
        ] {
            for g in samples() {
                let once = clamp(g, viewport, &limits());
                let twice = clamp(once, viewport, &limits());
                assert_eq!(once, twice, "clamp must be idempotent for {:?} in {:?}", g, viewport);
            }
        }
    }

    #[test]
    fn test_clamp_keeps_visible_strip_and_header() {
        let viewport = Viewport::new(1280, 800);
        for g in samples() {
            let c = clamp(g, viewport, &limits());
            let visible_left = c.x.max(0);
            let visible_right = c.right().min(viewport.width);
            assert!(
                visible_right - visible_left >= app_settings::MIN_VISIBLE_WIDTH,
                "At least the minimum strip must stay visible: {:?}",
                c
            );
            assert!(c.y >= 0, "Header must not go above the top edge: {:?}", c);
            assert!(
                c.y <= viewport.height - app_settings::HEADER_HEIGHT,
                "Header must stay reachable: {:?}",
                c
            );
            assert!((350..=800).contains(&c.width), "Width out of bounds: {:?}", c);
            assert!((400..=900).contains(&c.height), "Height out of bounds: {:?}", c);
        }
    }

    #[test]
    fn test_clamp_boundary_math() {
        let viewport = Viewport::new(1280, 800);
        let g = Geometry::new(-60, 100, 420, 600);
        assert_eq!(clamp(g, viewport, &limits()), g, "x=-60 is inside [-320, 1180]");

        let far_left = Geometry::new(-900, 100, 420, 600);
        assert_eq!(clamp(far_left, viewport, &limits()).x, -320);

        let far_right = Geometry::new(1250, 100, 420, 600);
        assert_eq!(clamp(far_right, viewport, &limits()).x, 1180);

        let too_low = Geometry::new(100, 790, 420, 600);
        assert_eq!(clamp(too_low, viewport, &limits()).y, 760);
    }

    #[test]
    fn test_clamp_size_shrinks_size_not_position() {
        let viewport = Viewport::new(1280, 800);
        let g = Geometry::new(700, 100, 700, 800);
        let c = clamp_size(g, viewport, &limits());
        assert_eq!(c.position(), g.position(), "Position must not move");
        assert_eq!(c.width, 580);
        assert_eq!(c.height, 700);
    }

    #[test]
    fn test_clamp_size_minimum_wins_over_fit() {
        let viewport = Viewport::new(1280, 800);
        let g = Geometry::new(1100, 600, 400, 500);
        let c = clamp_size(g, viewport, &limits());
        assert_eq!(c.size(), Size::new(350, 400));
    }

    #[test]
    fn test_snap_threshold_edges() {
        let viewport = Viewport::new(1280, 800);
        let at_20 = snap(Geometry::new(20, 300, 420, 400), viewport, 20);
        assert_eq!(at_20.x, 0, "20px from the left edge snaps");

        let at_21 = snap(Geometry::new(21, 300, 420, 400), viewport, 20);
        assert_eq!(at_21.x, 21, "21px from the left edge does not snap");

        let right = snap(Geometry::new(1280 - 420 - 15, 300, 420, 400), viewport, 20);
        assert_eq!(right.right(), 1280, "Right edge snaps flush");

        let bottom = snap(Geometry::new(300, 800 - 400 - 10, 420, 400), viewport, 20);
        assert_eq!(bottom.bottom(), 800, "Bottom edge snaps flush");
    }

    #[test]
    fn test_snap_corner_and_overshoot() {
        let viewport = Viewport::new(1280, 800);
        let corner = snap(Geometry::new(12, -8, 420, 400), viewport, 20);
        assert_eq!(corner.position(), Point::new(0, 0), "Left and top snap together");
    }

    #[test]
    fn test_snap_is_idempotent() {
        let viewport = Viewport::new(1280, 800);
        for g in samples() {
            let once = snap(g, viewport, 20);
            assert_eq!(once, snap(once, viewport, 20), "snap must be idempotent for {:?}", g);
        }
        let wide = Geometry::new(25, 0, 1262, 400);
        let once = snap(wide, viewport, 20);
        assert_eq!(once, snap(once, viewport, 20), "Nearer edge wins consistently");
    }

    #[test]
    fn test_default_geometry_is_bottom_right() {
        let g = default_geometry(
            Viewport::new(1280, 800),
            Size::new(420, 600),
            20,
            100,
            &limits(),
        );
        assert_eq!(g, Geometry::new(840, 100, 420, 600));
    }

    #[test]
    fn test_maximized_geometry_inset_and_fallback() {
        let g = maximized_geometry(Viewport::new(1280, 800), 20, &limits());
        assert_eq!(g, Geometry::new(20, 20, 1240, 760));

        let tiny = maximized_geometry(Viewport::new(300, 300), 20, &limits());
        assert_eq!(tiny.size(), Size::new(350, 400), "Tiny viewport falls back to the minimum size");
    }

    #[test]
    fn test_extreme_margins_saturate_instead_of_overflowing() {
        let g = maximized_geometry(Viewport::new(1280, 800), 1_200_000_000, &limits());
        assert_eq!(g.size(), Size::new(350, 400), "Huge inset falls back to the minimum size");

        let g = default_geometry(
            Viewport::new(1280, 800),
            Size::new(420, 600),
            i32::MIN,
            100,
            &limits(),
        );
        assert_eq!(g, Geometry::new(1180, 100, 420, 600), "Saturated x is clamped back on-screen");
    }

    #[test]
    fn test_mobile_geometry_fills_viewport() {
        assert_eq!(mobile_geometry(Viewport::new(375, 667)), Geometry::new(0, 0, 375, 667));
        assert!(Viewport::new(375, 667).is_mobile(768));
        assert!(!Viewport::new(768, 1024).is_mobile(768));
    }
}
