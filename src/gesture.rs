// SPDX-License-Identifier: GPL-3.0-only

//! Pointer gesture tracking for drag and resize.
//!
//! The controller turns a stream of pointer positions into proposed panel
//! positions or sizes. It never clamps: the panel manager validates every
//! proposal against the geometry model before committing it.
//!
//! At most one [`GestureSession`] exists at a time. A begin call while a
//! session is active is ignored, so the first gesture wins until [`end`].
//!
//! [`end`]: GestureController::end

use crate::geometry::{Geometry, Point, Size};

/// Which gesture a session is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Which handle started a resize.
///
/// Only the bottom-right corner is modeled; the panel grows toward it and
/// its position is untouched while resizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeHandle {
    #[default]
    BottomRight,
}

/// Transient record of one in-progress gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSession {
    pub kind: GestureKind,
    pub handle: Option<ResizeHandle>,
    /// Pointer position when the gesture started.
    pub anchor: Point,
    /// Committed geometry when the gesture started.
    pub start: Geometry,
}

impl GestureSession {
    /// Offset between the pointer and the panel origin at drag start.
    #[must_use]
    pub fn drag_offset(&self) -> Point {
        self.anchor - self.start.position()
    }
}

/// Unvalidated geometry change proposed for one pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureProposal {
    /// New panel position; size unchanged.
    Move(Point),
    /// New panel size; position unchanged.
    Resize(Size),
}

impl GestureProposal {
    /// Apply the proposal to a geometry.
    #[must_use]
    pub fn apply(self, geometry: Geometry) -> Geometry {
        match self {
            GestureProposal::Move(position) => geometry.with_position(position),
            GestureProposal::Resize(size) => geometry.with_size(size),
        }
    }
}

/// Drag/resize state machine.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    active: Option<GestureSession>,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> Option<&GestureSession> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn kind(&self) -> Option<GestureKind> {
        self.active.map(|session| session.kind)
    }

    /// Start dragging. Returns `false` if another gesture is in progress.
    pub fn begin_drag(&mut self, pointer: Point, current: Geometry) -> bool {
        self.begin(GestureSession {
            kind: GestureKind::Drag,
            handle: None,
            anchor: pointer,
            start: current,
        })
    }

    /// Start resizing. Returns `false` if another gesture is in progress.
    pub fn begin_resize(&mut self, pointer: Point, handle: ResizeHandle, current: Geometry) -> bool {
        self.begin(GestureSession {
            kind: GestureKind::Resize,
            handle: Some(handle),
            anchor: pointer,
            start: current,
        })
    }

    fn begin(&mut self, session: GestureSession) -> bool {
        if let Some(active) = &self.active {
            tracing::debug!(
                "Ignoring {:?} start while {:?} is active",
                session.kind,
                active.kind
            );
            return false;
        }
        tracing::debug!("{:?} started at ({}, {})", session.kind, session.anchor.x, session.anchor.y);
        self.active = Some(session);
        true
    }

    /// Propose a geometry change for a pointer move.
    ///
    /// Returns `None` when no gesture is active.
    #[must_use]
    pub fn on_pointer_move(&self, pointer: Point) -> Option<GestureProposal> {
        let session = self.active?;
        let proposal = match session.kind {
            GestureKind::Drag => GestureProposal::Move(pointer - session.drag_offset()),
            GestureKind::Resize => {
                let delta = pointer - session.anchor;
                GestureProposal::Resize(Size::new(
                    session.start.width.saturating_add(delta.x),
                    session.start.height.saturating_add(delta.y),
                ))
            }
        };
        Some(proposal)
    }

    /// Finish the active gesture, if any, returning its session.
    pub fn end(&mut self) -> Option<GestureSession> {
        let ended = self.active.take();
        if let Some(session) = &ended {
            tracing::debug!("{:?} ended", session.kind);
        }
        ended
    }
}
