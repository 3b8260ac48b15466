// SPDX-License-Identifier: GPL-3.0-only

use super::{PersistenceStore, StoreError, StoreResult};
use crate::state::PersistedRecord;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum WriteRequest {
    Save { key: String, record: PersistedRecord },
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Fire-and-forget writer in front of another store.
///
/// `save` only enqueues the record; a Tokio task performs the write on the
/// blocking pool and logs failures. Reads go straight to the inner store.
/// Clones share the same writer task, which stops once every clone is dropped
/// or one of them calls [`shutdown`](Self::shutdown).
pub struct BackgroundStore<S> {
    inner: Arc<S>,
    tx: mpsc::UnboundedSender<WriteRequest>,
}

impl<S> Clone for BackgroundStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            tx: self.tx.clone(),
        }
    }
}

impl<S> std::fmt::Debug for BackgroundStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundStore")
            .field("closed", &self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

impl<S> BackgroundStore<S>
where
    S: PersistenceStore + Send + Sync + 'static,
{
    /// Start the writer task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(inner: S) -> Self {
        let inner = Arc::new(inner);
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(Arc::clone(&inner), rx));
        Self { inner, tx }
    }

    /// Wait until every write enqueued before this call has been attempted.
    pub async fn flush(&self) -> StoreResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteRequest::Flush(done_tx))
            .map_err(|_| StoreError::Closed)?;
        done_rx.await.map_err(|_| StoreError::Closed)
    }

    /// Stop the writer after draining every write already enqueued.
    ///
    /// Saves issued afterwards, from any clone, fail with [`StoreError::Closed`].
    pub async fn shutdown(self) -> StoreResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteRequest::Shutdown(done_tx))
            .map_err(|_| StoreError::Closed)?;
        done_rx.await.map_err(|_| StoreError::Closed)
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

async fn run_writer<S>(inner: Arc<S>, mut rx: mpsc::UnboundedReceiver<WriteRequest>)
where
    S: PersistenceStore + Send + Sync + 'static,
{
    let mut stopped = None;
    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Save { key, record } => {
                let store = Arc::clone(&inner);
                let outcome =
                    tokio::task::spawn_blocking(move || store.save(&key, &record).map(|()| key))
                        .await;
                match outcome {
                    Ok(Ok(key)) => tracing::debug!("Persisted panel geometry for '{}'", key),
                    Ok(Err(err)) => tracing::warn!("Failed to persist panel geometry: {}", err),
                    Err(err) => tracing::warn!("Panel geometry writer task failed: {}", err),
                }
            }
            WriteRequest::Flush(done) => {
                let _ = done.send(());
            }
            WriteRequest::Shutdown(done) => {
                rx.close();
                if stopped.is_none() {
                    stopped = Some(done);
                }
            }
        }
    }
    tracing::debug!("Background panel store stopped");
    if let Some(done) = stopped {
        let _ = done.send(());
    }
}

impl<S> PersistenceStore for BackgroundStore<S>
where
    S: PersistenceStore + Send + Sync + 'static,
{
    fn load(&self, key: &str) -> StoreResult<Option<PersistedRecord>> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, record: &PersistedRecord) -> StoreResult<()> {
        self.tx
            .send(WriteRequest::Save {
                key: key.to_string(),
                record: *record,
            })
            .map_err(|_| StoreError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::store::MemoryStore;

    struct FailingStore;

    impl PersistenceStore for FailingStore {
        fn load(&self, _key: &str) -> StoreResult<Option<PersistedRecord>> {
            Ok(None)
        }

        fn save(&self, _key: &str, _record: &PersistedRecord) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[tokio::test]
    async fn test_writes_land_after_flush() {
        let memory = MemoryStore::new();
        let store = BackgroundStore::spawn(memory.clone());
        let record = PersistedRecord::capture_at(Geometry::new(100, 50, 450, 620), 3);

        store.save("chat-widget", &record).expect("enqueue succeeds");
        store.flush().await.expect("flush succeeds");

        assert_eq!(memory.load("chat-widget").expect("load"), Some(record));
        assert_eq!(store.load("chat-widget").expect("load"), Some(record));
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_writes() {
        let memory = MemoryStore::new();
        let store = BackgroundStore::spawn(memory.clone());
        let other = store.clone();
        let first = PersistedRecord::capture_at(Geometry::new(100, 50, 450, 620), 1);
        let last = PersistedRecord::capture_at(Geometry::new(200, 80, 450, 620), 2);

        store.save("chat-widget", &first).expect("enqueue succeeds");
        other.save("chat-widget", &last).expect("enqueue succeeds");
        store.shutdown().await.expect("shutdown succeeds");

        assert_eq!(
            memory.load("chat-widget").expect("load"),
            Some(last),
            "Every write enqueued before shutdown should land"
        );
        assert!(
            matches!(other.save("chat-widget", &first), Err(StoreError::Closed)),
            "Clones stop accepting writes once the writer has shut down"
        );
        assert!(matches!(other.flush().await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn test_write_failures_are_swallowed() {
        let store = BackgroundStore::spawn(FailingStore);
        let record = PersistedRecord::capture_at(Geometry::new(0, 0, 400, 500), 0);

        assert!(
            store.save("chat-widget", &record).is_ok(),
            "Enqueueing never reports the eventual write failure"
        );
        store.flush().await.expect("writer survives a failed write");
        assert!(store.save("chat-widget", &record).is_ok());
    }
}
