// SPDX-License-Identifier: GPL-3.0-only

//! Viewport size source.
//!
//! The host feeds window-resize notifications into a [`ViewportObserver`];
//! subscribers receive every new size over an unbounded channel and drain it
//! on their own schedule.

use crate::geometry::Viewport;
use futures::channel::mpsc;

/// Handle identifying one subscription, used to unsubscribe on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Tracks the current viewport size and notifies subscribers of changes.
#[derive(Debug)]
pub struct ViewportObserver {
    current: Viewport,
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<Viewport>)>,
    next_id: u64,
}

impl ViewportObserver {
    #[must_use]
    pub fn new(initial: Viewport) -> Self {
        Self {
            current: initial,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Current viewport size.
    #[must_use]
    pub fn current(&self) -> Viewport {
        self.current
    }

    /// Register for change notifications.
    pub fn subscribe(&mut self) -> (SubscriptionId, mpsc::UnboundedReceiver<Viewport>) {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.push((id, tx));
        (id, rx)
    }

    /// Drop a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Record a new viewport size and notify subscribers if it changed.
    ///
    /// Subscribers whose receiver has been dropped are pruned.
    pub fn update(&mut self, viewport: Viewport) {
        if viewport == self.current {
            return;
        }
        tracing::debug!(
            "Viewport changed: {}x{} -> {}x{}",
            self.current.width,
            self.current.height,
            viewport.width,
            viewport.height
        );
        self.current = viewport;
        self.subscribers
            .retain(|(_, tx)| tx.unbounded_send(viewport).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
