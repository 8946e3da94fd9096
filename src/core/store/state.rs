use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use time::OffsetDateTime;
use tokio::sync::{RwLock, mpsc, oneshot, watch};
use tracing::{debug, error};

use crate::core::store::{
    StoreOptions,
    snapshot::Snapshot,
    storage::KeyValueStorage,
};

pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;
pub type PersistErrorHandler = Arc<dyn Fn(&anyhow::Error) + Send + Sync>;

enum PersistCommand {
    Write(String),
    Flush(oneshot::Sender<()>),
}

pub(super) struct StoreState {
    snapshot: RwLock<Arc<Snapshot>>,
    hydrated: AtomicBool,
    published: watch::Sender<Arc<Snapshot>>,
    persist_tx: mpsc::UnboundedSender<PersistCommand>,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    clock: Clock,
    on_persist_error: PersistErrorHandler,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("storage_key", &self.storage_key)
            .field("hydrated", &self.hydrated.load(Ordering::Acquire))
            .finish()
    }
}

fn log_persist_error(e: &anyhow::Error) {
    error!(error = %format!("{:#}", e), "failed to persist trip store");
}

impl StoreState {
    /// Build the state and spawn its persistence worker on the current runtime.
    pub(super) fn new(storage: Arc<dyn KeyValueStorage>, options: StoreOptions) -> Self {
        let StoreOptions {
            storage_key,
            clock,
            on_persist_error,
        } = options;
        let on_persist_error: PersistErrorHandler =
            on_persist_error.unwrap_or_else(|| Arc::new(log_persist_error) as PersistErrorHandler);

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        tokio::spawn(persist_worker(
            persist_rx,
            storage.clone(),
            storage_key.clone(),
            on_persist_error.clone(),
        ));

        let initial = Arc::new(Snapshot::default());
        let (published, _) = watch::channel(initial.clone());
        Self {
            snapshot: RwLock::new(initial),
            hydrated: AtomicBool::new(false),
            published,
            persist_tx,
            storage,
            storage_key,
            clock,
            on_persist_error,
        }
    }

    pub(super) fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    pub(super) fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub(super) fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::Acquire)
    }

    pub(super) fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.subscribe()
    }

    pub(super) async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Read the persisted record on a blocking task.
    pub(super) async fn load_raw(&self) -> anyhow::Result<Option<String>> {
        let storage = self.storage.clone();
        let key = self.storage_key.clone();
        tokio::task::spawn_blocking(move || storage.get_item(&key)).await?
    }

    /// Replace the whole snapshot after a load. Does not write back.
    pub(super) async fn finish_hydration(&self, snapshot: Option<Snapshot>) {
        if let Some(snapshot) = snapshot {
            let snapshot = Arc::new(snapshot);
            *self.snapshot.write().await = snapshot.clone();
            self.published.send_replace(snapshot);
        }
        self.hydrated.store(true, Ordering::Release);
    }

    /// Apply `f` to a copy-on-write snapshot. When `f` reports a change the
    /// new snapshot is published and queued for persistence.
    pub(super) async fn mutate<R>(&self, f: impl FnOnce(&mut Snapshot) -> (R, bool)) -> R {
        let mut guard = self.snapshot.write().await;
        let mut next = Snapshot::clone(&guard);
        let (result, changed) = f(&mut next);
        if changed {
            let next = Arc::new(next);
            *guard = next.clone();
            self.published.send_replace(next.clone());
            self.persist(&next);
        }
        result
    }

    fn persist(&self, snapshot: &Snapshot) {
        let blob = match snapshot.encode() {
            Ok(blob) => blob,
            Err(e) => {
                (self.on_persist_error)(&e);
                return;
            }
        };
        if self.persist_tx.send(PersistCommand::Write(blob)).is_err() {
            (self.on_persist_error)(&anyhow::anyhow!("Persistence worker is not running"));
        }
    }

    /// Wait until every write queued before this call has been attempted.
    pub(super) async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.persist_tx.send(PersistCommand::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Drains the queue, coalescing back-to-back snapshots so only the newest
/// pending one is written.
async fn persist_worker(
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    on_error: PersistErrorHandler,
) {
    while let Some(first) = rx.recv().await {
        let mut pending = None;
        let mut waiters = Vec::new();
        let mut collect = |command: PersistCommand| match command {
            PersistCommand::Write(blob) => pending = Some(blob),
            PersistCommand::Flush(done) => waiters.push(done),
        };
        collect(first);
        while let Ok(command) = rx.try_recv() {
            collect(command);
        }

        if let Some(blob) = pending {
            let bytes = blob.len();
            let storage = storage.clone();
            let key_for_write = key.clone();
            let result =
                tokio::task::spawn_blocking(move || storage.set_item(&key_for_write, &blob)).await;
            match result {
                Ok(Ok(())) => debug!(key = %key, bytes, "persisted trip store"),
                Ok(Err(e)) => on_error(&e),
                Err(e) => on_error(&anyhow::Error::new(e).context("Persistence task panicked")),
            }
        }
        for done in waiters {
            let _ = done.send(());
        }
    }
    debug!(key = %key, "persistence worker stopped");
}
