// SPDX-License-Identifier: GPL-3.0-only

//! Panel manager: the single owner of the panel's geometry.
//!
//! The manager composes the pieces of the crate:
//!
//! - pointer input goes to the [`GestureController`], which proposes a change;
//! - the proposal is validated with [`clamp`], [`clamp_size`] and, at drag end,
//!   [`snap`];
//! - the result is committed to the [`WindowStateMachine`] if the current state
//!   allows gestures;
//! - stable results (gesture end, viewport re-clamp) are written to the
//!   [`PersistenceStore`].
//!
//! Nothing here fails loudly. Corrupt persisted data falls back to the default
//! geometry, illegal inputs are ignored, and write failures are logged.
//!
//! Hosts read [`PanelManager::frame`] every frame and may [`subscribe`] to
//! [`PanelEvent`]s.
//!
//! [`subscribe`]: PanelManager::subscribe

use crate::config::PanelConfig;
use crate::geometry::{
    Geometry, GeometryLimits, Point, Viewport, clamp, clamp_size, default_geometry,
    maximized_geometry, mobile_geometry, snap,
};
use crate::gesture::{GestureController, GestureKind, GestureProposal, GestureSession, ResizeHandle};
use crate::state::PersistedRecord;
use crate::store::PersistenceStore;
use crate::viewport::{SubscriptionId, ViewportObserver};
use crate::window_state::{StateKind, Transition, WindowState, WindowStateMachine};
use futures::channel::mpsc;
use std::time::Instant;

/// Notification emitted by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// The window state changed.
    StateChanged { from: StateKind, to: StateKind },
    /// The committed open geometry changed.
    GeometryChanged(Geometry),
    /// The panel returned to a previously known geometry.
    Restored(Geometry),
    /// The mobile override was switched on or off.
    MobileChanged(bool),
}

/// What the renderer should paint this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelFrame {
    pub state: StateKind,
    /// Screen rectangle of the panel, `None` while closed or minimized.
    pub rect: Option<Geometry>,
    pub mobile: bool,
    /// Gesture in progress, if any.
    pub interacting: Option<GestureKind>,
}

/// Orchestrates gestures, window state, viewport changes and persistence.
pub struct PanelManager {
    config: PanelConfig,
    limits: GeometryLimits,
    viewport: Viewport,
    machine: WindowStateMachine,
    gestures: GestureController,
    store: Box<dyn PersistenceStore>,
    /// Record read from the store at start-up, updated on every write.
    persisted: Option<PersistedRecord>,
    initialized: bool,
    subscribers: Vec<mpsc::UnboundedSender<PanelEvent>>,
    viewport_subscription: Option<(SubscriptionId, mpsc::UnboundedReceiver<Viewport>)>,
}

impl std::fmt::Debug for PanelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelManager")
            .field("window_id", &self.config.window_id)
            .field("viewport", &self.viewport)
            .field("state", &self.machine.state())
            .field("mobile", &self.machine.is_mobile())
            .field("gesture", &self.gestures.session())
            .finish_non_exhaustive()
    }
}

impl PanelManager {
    /// Create a manager for the panel described by `config`.
    ///
    /// The store is not read until [`init`](Self::init) or the first
    /// [`open`](Self::open).
    pub fn new(config: PanelConfig, store: impl PersistenceStore + 'static, viewport: Viewport) -> Self {
        let mut machine = WindowStateMachine::new();
        machine.set_mobile(viewport.is_mobile(config.mobile_breakpoint));
        Self {
            limits: config.limits(),
            config,
            viewport,
            machine,
            gestures: GestureController::new(),
            store: Box::new(store),
            persisted: None,
            initialized: false,
            subscribers: Vec::new(),
            viewport_subscription: None,
        }
    }

    /// Read the persisted record once. Later calls are no-ops.
    ///
    /// Missing or corrupt records are discarded; the panel then opens at the
    /// default position.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        match self.store.load(&self.config.window_id) {
            Ok(Some(record)) => {
                tracing::debug!(
                    "Loaded persisted panel geometry: {:?} {:?}",
                    record.position,
                    record.size
                );
                self.persisted = Some(record);
            }
            Ok(None) => tracing::debug!("No persisted panel geometry"),
            Err(err) => tracing::warn!("Discarding persisted panel geometry: {}", err),
        }
    }

    // ------------------------------------------------------------------
    // Read model
    // ------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> WindowState {
        self.machine.state()
    }

    /// Committed geometry while `Open`.
    #[must_use]
    pub fn geometry(&self) -> Option<Geometry> {
        match self.machine.state() {
            WindowState::Open(geometry) => Some(geometry),
            _ => None,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.machine.is_mobile()
    }

    #[must_use]
    pub fn gesture(&self) -> Option<&GestureSession> {
        self.gestures.session()
    }

    /// Last record written to or read from the store.
    #[must_use]
    pub fn persisted(&self) -> Option<&PersistedRecord> {
        self.persisted.as_ref()
    }

    /// Rectangle and flags for the renderer.
    #[must_use]
    pub fn frame(&self) -> PanelFrame {
        let mobile = self.machine.is_mobile();
        let rect = match self.machine.state() {
            WindowState::Open(_) | WindowState::Maximized if mobile => {
                Some(mobile_geometry(self.viewport))
            }
            WindowState::Open(geometry) => Some(geometry),
            WindowState::Maximized => Some(maximized_geometry(
                self.viewport,
                self.config.maximize_inset,
                &self.limits,
            )),
            WindowState::Closed | WindowState::Minimized => None,
        };
        PanelFrame {
            state: self.machine.kind(),
            rect,
            mobile,
            interacting: self.gestures.kind(),
        }
    }

    /// Receive every [`PanelEvent`] emitted from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PanelEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.push(tx);
        rx
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// `Closed -> Open`.
    ///
    /// Uses the geometry from this session if there is one, otherwise the
    /// persisted record, otherwise the default bottom-right position. Whatever
    /// is chosen is re-clamped against the current viewport.
    pub fn open(&mut self) -> bool {
        if self.machine.kind() != StateKind::Closed {
            tracing::debug!("Ignoring open() while {}", self.machine.kind().as_str());
            return false;
        }
        self.init();

        let (geometry, restored) = self.opening_geometry();
        let Some(transition) = self.machine.open(geometry) else {
            return false;
        };
        tracing::info!(
            "Opening panel at ({}, {}) {}x{}",
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height
        );
        self.emit_transition(transition);
        if restored {
            self.emit(PanelEvent::Restored(geometry));
        }
        true
    }

    fn opening_geometry(&mut self) -> (Geometry, bool) {
        if let Some(retained) = self.machine.retained_geometry() {
            return (clamp(retained, self.viewport, &self.limits), true);
        }

        if let Some(record) = self.persisted {
            match record.restore(self.viewport, &self.limits) {
                Some(geometry) => return (geometry, true),
                None => {
                    tracing::warn!("Discarding unusable persisted panel geometry: {:?}", record);
                    self.persisted = None;
                }
            }
        }

        let geometry = default_geometry(
            self.viewport,
            self.config.default_size,
            self.config.anchor_margin_right,
            self.config.anchor_margin_bottom,
            &self.limits,
        );
        (geometry, false)
    }

    /// `* -> Closed`. Geometry is kept for the next `open()`.
    pub fn close(&mut self) -> bool {
        self.finish_gesture();
        match self.machine.close() {
            Some(transition) => {
                tracing::info!("Closing panel");
                self.emit_transition(transition);
                true
            }
            None => false,
        }
    }

    /// Open when closed, close otherwise.
    pub fn toggle(&mut self) -> bool {
        if self.machine.kind() == StateKind::Closed {
            self.open()
        } else {
            self.close()
        }
    }

    /// `Open -> Minimized`.
    pub fn minimize(&mut self) -> bool {
        self.finish_gesture();
        match self.machine.minimize() {
            Some(transition) => {
                tracing::info!("Minimizing panel");
                self.emit_transition(transition);
                true
            }
            None => {
                tracing::debug!("Ignoring minimize() while {}", self.machine.kind().as_str());
                false
            }
        }
    }

    /// `Open -> Maximized`. The open geometry is snapshotted for `restore()`.
    pub fn maximize(&mut self) -> bool {
        self.finish_gesture();
        match self.machine.maximize() {
            Some(transition) => {
                tracing::info!("Maximizing panel");
                self.emit_transition(transition);
                true
            }
            None => {
                tracing::debug!("Ignoring maximize() while {}", self.machine.kind().as_str());
                false
            }
        }
    }

    /// `Minimized | Maximized -> Open`, back to the geometry held before.
    ///
    /// If the viewport changed in the meantime the geometry is re-clamped and
    /// the corrected value persisted.
    pub fn restore(&mut self) -> bool {
        let Some(retained) = self.machine.retained_geometry() else {
            return false;
        };
        let geometry = clamp(retained, self.viewport, &self.limits);
        let Some(transition) = self.machine.restore(Some(geometry)) else {
            tracing::debug!("Ignoring restore() while {}", self.machine.kind().as_str());
            return false;
        };

        tracing::info!("Restoring panel from {}", transition.from.as_str());
        self.emit_transition(transition);
        self.emit(PanelEvent::Restored(geometry));
        if geometry != retained {
            self.persist(geometry);
        }
        true
    }

    /// Maximize when open, restore when maximized.
    pub fn toggle_maximize(&mut self) -> bool {
        match self.machine.kind() {
            StateKind::Open => self.maximize(),
            StateKind::Maximized => self.restore(),
            _ => false,
        }
    }

    /// Header activation (click/tap). Two activations within the configured
    /// window toggle maximize. Returns `true` if a toggle happened.
    pub fn on_header_activate(&mut self, now: Instant) -> bool {
        if !matches!(self.machine.kind(), StateKind::Open | StateKind::Maximized) {
            return false;
        }
        let window = self.config.double_activation_window();
        self.machine.header_activation(now, window) && self.toggle_maximize()
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Pointer down on the header. Ignored unless open and not mobile, and
    /// while another gesture is in progress.
    pub fn on_drag_start(&mut self, pointer: Point) -> bool {
        match self.gesture_origin() {
            Some(current) => self.gestures.begin_drag(pointer, current),
            None => false,
        }
    }

    /// Pointer down on the bottom-right resize handle.
    pub fn on_resize_start(&mut self, pointer: Point) -> bool {
        self.on_resize_start_with(pointer, ResizeHandle::BottomRight)
    }

    pub fn on_resize_start_with(&mut self, pointer: Point, handle: ResizeHandle) -> bool {
        match self.gesture_origin() {
            Some(current) => self.gestures.begin_resize(pointer, handle, current),
            None => false,
        }
    }

    fn gesture_origin(&self) -> Option<Geometry> {
        if !self.machine.allows_gestures() {
            tracing::debug!(
                "Gestures disabled while {} (mobile: {})",
                self.machine.kind().as_str(),
                self.machine.is_mobile()
            );
            return None;
        }
        self.geometry()
    }

    /// Global pointer move. Returns the newly committed geometry, if any.
    ///
    /// Moves without an active gesture are ignored. The committed geometry is
    /// updated live; persistence waits for the gesture to end.
    pub fn on_pointer_move(&mut self, pointer: Point) -> Option<Geometry> {
        let proposal = self.gestures.on_pointer_move(pointer)?;
        let current = self.geometry()?;

        let proposed = proposal.apply(current);
        let next = match proposal {
            GestureProposal::Move(_) => clamp(proposed, self.viewport, &self.limits),
            GestureProposal::Resize(_) => clamp(
                clamp_size(proposed, self.viewport, &self.limits),
                self.viewport,
                &self.limits,
            ),
        };

        if next != current {
            self.commit(next);
        }
        Some(next)
    }

    /// Pointer released on a drag.
    pub fn on_drag_end(&mut self) {
        self.finish_gesture();
    }

    /// Pointer released on a resize.
    pub fn on_resize_end(&mut self) {
        self.finish_gesture();
    }

    /// Global pointer release: ends whichever gesture is active.
    pub fn on_pointer_up(&mut self) {
        self.finish_gesture();
    }

    fn finish_gesture(&mut self) {
        let Some(session) = self.gestures.end() else {
            return;
        };
        let Some(current) = self.geometry() else {
            return;
        };

        let settled = match session.kind {
            GestureKind::Drag => clamp(
                snap(current, self.viewport, self.config.snap_threshold),
                self.viewport,
                &self.limits,
            ),
            GestureKind::Resize => current,
        };
        if settled != current {
            self.commit(settled);
        }
        if settled != session.start {
            self.persist(settled);
        }
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// React to a new viewport size.
    ///
    /// Updates the mobile override and re-clamps the open geometry with the
    /// same function gestures use. Safe to call on every resize event.
    pub fn on_viewport_change(&mut self, viewport: Viewport) {
        self.viewport = viewport;

        let mobile = viewport.is_mobile(self.config.mobile_breakpoint);
        let mobile_changed = self.machine.set_mobile(mobile);
        if mobile_changed {
            tracing::info!("Mobile layout {}", if mobile { "enabled" } else { "disabled" });
            if mobile && self.gestures.end().is_some() {
                tracing::debug!("Gesture cancelled by mobile layout");
            }
            self.emit(PanelEvent::MobileChanged(mobile));
        }

        let Some(current) = self.geometry() else {
            return;
        };
        let clamped = clamp(current, viewport, &self.limits);
        if clamped != current {
            tracing::debug!("Re-clamped panel to {}x{} viewport", viewport.width, viewport.height);
            self.commit(clamped);
        }
        if self.gestures.is_active() {
            return;
        }

        // Changes made while mobile were never written.
        let left_mobile = mobile_changed && !mobile;
        let stale = self.persisted.map(|record| record.geometry()) != Some(clamped);
        if clamped != current || (left_mobile && stale) {
            self.persist(clamped);
        }
    }

    /// Subscribe to `observer` and adopt its current size.
    pub fn attach_viewport(&mut self, observer: &mut ViewportObserver) {
        if let Some((id, _)) = self.viewport_subscription.take() {
            observer.unsubscribe(id);
        }
        self.viewport_subscription = Some(observer.subscribe());
        let current = observer.current();
        if current != self.viewport {
            self.on_viewport_change(current);
        }
    }

    /// Unsubscribe from `observer` on teardown.
    pub fn detach_viewport(&mut self, observer: &mut ViewportObserver) -> bool {
        match self.viewport_subscription.take() {
            Some((id, _)) => observer.unsubscribe(id),
            None => false,
        }
    }

    /// Apply pending viewport notifications, coalesced to the latest size.
    ///
    /// Returns `true` if a notification was processed.
    pub fn pump_viewport(&mut self) -> bool {
        let Some((_, rx)) = self.viewport_subscription.as_mut() else {
            return false;
        };
        let mut latest = None;
        while let Ok(viewport) = rx.try_recv() {
            latest = Some(viewport);
        }
        match latest {
            Some(viewport) => {
                self.on_viewport_change(viewport);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit(&mut self, geometry: Geometry) {
        if self.machine.set_geometry(geometry) {
            self.emit(PanelEvent::GeometryChanged(geometry));
        }
    }

    /// Best-effort write of a stable open geometry.
    fn persist(&mut self, geometry: Geometry) {
        if !self.machine.state().is_open() || self.machine.is_mobile() {
            return;
        }
        let record = PersistedRecord::capture(geometry);
        match self.store.save(&self.config.window_id, &record) {
            Ok(()) => tracing::debug!(
                "Saved panel geometry ({}, {}) {}x{}",
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height
            ),
            Err(err) => tracing::warn!("Failed to save panel geometry: {}", err),
        }
        self.persisted = Some(record);
    }

    fn emit_transition(&mut self, transition: Transition) {
        self.emit(PanelEvent::StateChanged {
            from: transition.from,
            to: transition.to,
        });
    }

    fn emit(&mut self, event: PanelEvent) {
        self.subscribers
            .retain(|tx| tx.unbounded_send(event).is_ok());
    }
}
