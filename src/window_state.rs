// SPDX-License-Identifier: GPL-3.0-only

//! Macro window states and the transitions between them.
//!
//! ```text
//! Closed ──open──▶ Open ◀──restore── Minimized
//!                   │  ──minimize──▶
//!                   │  ──maximize──▶ Maximized
//!                   ◀──restore────
//! any ──close──▶ Closed
//! ```
//!
//! Mobile is not a state: it is a viewport-derived override that renders the
//! panel full-screen and disables gestures while leaving the underlying state
//! untouched.

use crate::geometry::Geometry;
use std::time::{Duration, Instant};

/// Current window state. Only `Open` carries a committed geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowState {
    #[default]
    Closed,
    Open(Geometry),
    Minimized,
    Maximized,
}

impl WindowState {
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            WindowState::Closed => StateKind::Closed,
            WindowState::Open(_) => StateKind::Open,
            WindowState::Minimized => StateKind::Minimized,
            WindowState::Maximized => StateKind::Maximized,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, WindowState::Open(_))
    }
}

/// Geometry-free discriminant of [`WindowState`], used in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Closed,
    Open,
    Minimized,
    Maximized,
}

impl StateKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Closed => "Closed",
            StateKind::Open => "Open",
            StateKind::Minimized => "Minimized",
            StateKind::Maximized => "Maximized",
        }
    }
}

/// A state change that actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateKind,
    pub to: StateKind,
}

/// Owns the window state, the geometry to return to, and the mobile override.
#[derive(Debug, Clone, Default)]
pub struct WindowStateMachine {
    state: WindowState,
    /// Last committed open geometry. Kept across minimize, maximize and close
    /// so that `restore()` and the next `open()` return to it exactly.
    retained: Option<Geometry>,
    mobile: bool,
    last_header_activation: Option<Instant>,
}

impl WindowStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> WindowState {
        self.state
    }

    #[must_use]
    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Geometry the panel returns to when it is next shown as `Open`.
    #[must_use]
    pub fn retained_geometry(&self) -> Option<Geometry> {
        self.retained
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    /// Drag and resize are only allowed on an open, non-mobile panel.
    #[must_use]
    pub fn allows_gestures(&self) -> bool {
        self.state.is_open() && !self.mobile
    }

    /// `Closed -> Open` with the given (already validated) geometry.
    pub fn open(&mut self, geometry: Geometry) -> Option<Transition> {
        match self.state {
            WindowState::Closed => Some(self.enter_open(geometry)),
            _ => None,
        }
    }

    /// `Open -> Minimized`, retaining the current geometry.
    pub fn minimize(&mut self) -> Option<Transition> {
        match self.state {
            WindowState::Open(geometry) => {
                self.retained = Some(geometry);
                Some(self.transition(WindowState::Minimized))
            }
            _ => None,
        }
    }

    /// `Open -> Maximized`, snapshotting the current geometry for restore.
    pub fn maximize(&mut self) -> Option<Transition> {
        match self.state {
            WindowState::Open(geometry) => {
                self.retained = Some(geometry);
                Some(self.transition(WindowState::Maximized))
            }
            _ => None,
        }
    }

    /// `Minimized | Maximized -> Open`, returning to the retained geometry.
    ///
    /// `restored` is the retained geometry after the caller re-validated it
    /// against the current viewport; `None` keeps it as is.
    pub fn restore(&mut self, restored: Option<Geometry>) -> Option<Transition> {
        match self.state {
            WindowState::Minimized | WindowState::Maximized => {
                let geometry = restored.or(self.retained)?;
                Some(self.enter_open(geometry))
            }
            _ => None,
        }
    }

    /// `* -> Closed`. Retained geometry survives for the next `open()`.
    pub fn close(&mut self) -> Option<Transition> {
        match self.state {
            WindowState::Closed => None,
            WindowState::Open(geometry) => {
                self.retained = Some(geometry);
                Some(self.transition(WindowState::Closed))
            }
            _ => Some(self.transition(WindowState::Closed)),
        }
    }

    /// Replace the committed geometry. Only legal while `Open`.
    pub fn set_geometry(&mut self, geometry: Geometry) -> bool {
        if !self.state.is_open() {
            return false;
        }
        self.state = WindowState::Open(geometry);
        self.retained = Some(geometry);
        true
    }

    /// Update the mobile override. Returns `true` if it changed.
    pub fn set_mobile(&mut self, mobile: bool) -> bool {
        let changed = self.mobile != mobile;
        self.mobile = mobile;
        changed
    }

    /// Register a header activation and report whether it completes a
    /// double activation within `window`.
    pub fn header_activation(&mut self, now: Instant, window: Duration) -> bool {
        match self.last_header_activation.take() {
            Some(previous) if now.saturating_duration_since(previous) <= window => true,
            _ => {
                self.last_header_activation = Some(now);
                false
            }
        }
    }

    fn enter_open(&mut self, geometry: Geometry) -> Transition {
        self.retained = Some(geometry);
        self.transition(WindowState::Open(geometry))
    }

    fn transition(&mut self, next: WindowState) -> Transition {
        let from = self.state.kind();
        self.state = next;
        Transition {
            from,
            to: next.kind(),
        }
    }
}
