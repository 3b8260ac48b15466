// SPDX-License-Identifier: GPL-3.0-only

//! Centralized panel settings and constants.
//!
//! These are the compiled-in defaults. [`crate::config::PanelConfig`] carries a
//! runtime copy that hosts may override.

/// Identifier of the single floating panel (persistence key).
pub const PANEL_ID: &str = "chat-widget";

/// Default panel width in pixels.
pub const DEFAULT_WIDTH: i32 = 420;

/// Default panel height in pixels.
pub const DEFAULT_HEIGHT: i32 = 600;

/// Minimum panel width in pixels.
pub const MIN_WIDTH: i32 = 350;

/// Minimum panel height in pixels.
pub const MIN_HEIGHT: i32 = 400;

/// Maximum panel width in pixels.
pub const MAX_WIDTH: i32 = 800;

/// Maximum panel height in pixels.
pub const MAX_HEIGHT: i32 = 900;

/// Horizontal strip of the panel that must stay on-screen.
pub const MIN_VISIBLE_WIDTH: i32 = 100;

/// Height of the draggable header bar.
pub const HEADER_HEIGHT: i32 = 40;

/// Distance at which an edge snaps flush to the viewport edge.
pub const SNAP_THRESHOLD: i32 = 20;

/// Margin kept around the maximized rectangle.
pub const MAXIMIZE_INSET: i32 = 20;

/// Two header activations closer than this toggle maximize.
pub const DOUBLE_ACTIVATION_MS: u64 = 300;

/// Gap between the default panel position and the right viewport edge.
pub const ANCHOR_MARGIN_RIGHT: i32 = 20;

/// Gap between the default panel position and the bottom viewport edge.
pub const ANCHOR_MARGIN_BOTTOM: i32 = 100;

/// Upper bound accepted for configured insets and margins.
pub const MAX_MARGIN: i32 = 10_000;

/// Viewports narrower than this render the panel full-screen.
pub const MOBILE_BREAKPOINT: i32 = 768;
