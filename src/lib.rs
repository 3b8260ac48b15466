// SPDX-License-Identifier: GPL-3.0-only

//! Floatpanel - geometry and window-state engine for a floating panel
//!
//! This crate owns the screen-space geometry of a single floating window (a
//! chat widget, a tool palette, an on-screen keyboard) and keeps it valid while
//! the user drags it, resizes it, minimizes or maximizes it, and while the host
//! viewport changes size underneath it. It does not paint anything: the host
//! renders whatever [`manager::PanelManager::frame`] reports.
//!
//! # Architecture
//!
//! Data flows in one direction:
//!
//! 1. **Pointer events** reach the [`gesture::GestureController`], which
//!    proposes a new position or size.
//! 2. **Proposals** are validated by the pure functions in [`geometry`]
//!    (clamp while moving, snap when a drag ends).
//! 3. **Committed geometry** is stored in the
//!    [`window_state::WindowStateMachine`] and written to a
//!    [`store::PersistenceStore`] once the gesture ends.
//!
//! The [`viewport::ViewportObserver`] feeds viewport changes back into the
//! manager, which re-clamps with the same function gestures use.
//!
//! # Modules
//!
//! - `app_settings`: Centralized constants (sizes, thresholds, panel id)
//! - `config`: Runtime configuration with JSON loading and validation
//! - `geometry`: Geometry value types and clamp/snap functions
//! - `gesture`: Drag/resize gesture controller
//! - `manager`: The panel manager orchestrating everything else
//! - `state`: Persisted geometry record
//! - `store`: Persistence backends (memory, JSON files, background writer)
//! - `viewport`: Viewport size observer
//! - `window_state`: Closed/Open/Minimized/Maximized state machine

pub mod app_settings;
pub mod config;
pub mod geometry;
pub mod gesture;
pub mod manager;
pub mod state;
pub mod store;
pub mod viewport;
pub mod window_state;

pub use crate::config::PanelConfig;
pub use crate::geometry::{Geometry, Point, Size, Viewport};
pub use crate::manager::{PanelEvent, PanelFrame, PanelManager};
pub use crate::window_state::{StateKind, WindowState};


// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use crate::app_settings::PANEL_ID;
    use crate::state::PersistedRecord;
    use crate::store::{BackgroundStore, JsonFileStore, MemoryStore, PersistenceStore};
    use crate::viewport::ViewportObserver;
    use crate::{Geometry, PanelConfig, PanelEvent, PanelManager, Point, StateKind, Viewport};
    use futures::StreamExt;

    /// Integration Test 1: Full session against a file-backed store
    ///
    /// Open, drag, close, then "restart" with a fresh manager over the same
    /// directory and verify the panel comes back where it was left.
    #[test]
    fn test_session_survives_restart_with_file_store() {
        crate::test_support::init_tracing();
        let dir = tempfile::tempdir().expect("temp dir");
        let viewport = Viewport::new(1280, 800);

        let mut panel = PanelManager::new(
            PanelConfig::default(),
            JsonFileStore::new(dir.path()),
            viewport,
        );
        assert!(panel.open());
        panel.on_drag_start(Point::new(850, 110));
        panel.on_pointer_move(Point::new(310, 60));
        panel.on_pointer_up();
        let left_at = panel.geometry().expect("panel is open");
        assert!(panel.close());

        let mut restarted = PanelManager::new(
            PanelConfig::default(),
            JsonFileStore::new(dir.path()),
            viewport,
        );
        restarted.init();
        assert_eq!(
            restarted.persisted().map(PersistedRecord::geometry),
            Some(left_at),
            "The record written at drag end should be read back at start-up"
        );
        assert!(restarted.open());
        assert_eq!(restarted.geometry(), Some(left_at));
    }

    /// Integration Test 2: Restored geometry is re-clamped for a smaller screen
    #[test]
    fn test_restore_on_smaller_viewport_is_reclamped() {
        let store = MemoryStore::new();
        store
            .save(
                PANEL_ID,
                &PersistedRecord::capture_at(Geometry::new(1700, 900, 700, 850), 1),
            )
            .expect("seed record");

        let mut panel = PanelManager::new(PanelConfig::default(), store, Viewport::new(1280, 800));
        assert!(panel.open());
        assert_eq!(
            panel.geometry(),
            Some(Geometry::new(1180, 760, 700, 850)),
            "Off-screen record is pulled back so the strip and header stay reachable"
        );
    }

    /// Integration Test 3: Writes through the background store never block
    /// and land once flushed.
    #[tokio::test]
    async fn test_background_store_with_manager() {
        let memory = MemoryStore::new();
        let store = BackgroundStore::spawn(memory.clone());

        let mut panel = PanelManager::new(
            PanelConfig::default(),
            store.clone(),
            Viewport::new(1280, 800),
        );
        panel.open();
        panel.on_resize_start(Point::new(1260, 700));
        panel.on_pointer_move(Point::new(1290, 720));
        panel.on_resize_end();

        store.flush().await.expect("writer running");
        let record = memory
            .load(PANEL_ID)
            .expect("load succeeds")
            .expect("resize end was persisted");
        assert_eq!(record.geometry(), Geometry::new(840, 100, 440, 620));
    }

    /// Integration Test 4: Rapid viewport resize events
    ///
    /// Every intermediate size is delivered to other subscribers while the
    /// manager coalesces them into a single re-clamp against the last size.
    #[tokio::test]
    async fn test_rapid_viewport_events() {
        let mut observer = ViewportObserver::new(Viewport::new(1280, 800));
        let (_id, mut host_rx) = observer.subscribe();

        let mut panel = PanelManager::new(
            PanelConfig::default(),
            MemoryStore::new(),
            observer.current(),
        );
        panel.attach_viewport(&mut observer);
        panel.open();

        for step in 1..=20 {
            observer.update(Viewport::new(1280 - step * 20, 800 - step * 5));
        }
        assert!(panel.pump_viewport());

        let last = observer.current();
        assert_eq!(panel.viewport(), last);
        let g = panel.geometry().expect("open");
        assert!(g.x <= last.width - 100, "Strip stays visible after rapid resizes");

        let first = host_rx.next().await;
        assert_eq!(first, Some(Viewport::new(1260, 795)), "Other subscribers see every size");
    }

    /// Integration Test 5: Unread-badge style listener sees open/close signals
    #[test]
    fn test_open_close_signal_for_host_listeners() {
        let mut panel = PanelManager::new(
            PanelConfig::default(),
            MemoryStore::new(),
            Viewport::new(1280, 800),
        );
        let mut rx = panel.subscribe();
        panel.toggle();
        panel.toggle();

        let mut open_flags = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PanelEvent::StateChanged { to, .. } = event {
                open_flags.push(to == StateKind::Open);
            }
        }
        assert_eq!(open_flags, vec![true, false]);
    }
}
