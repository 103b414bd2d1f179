//! Background snapshot writer.
//!
//! Ticks hand over a copy of the registry and return immediately. The
//! writer task keeps a single pending slot: if the disk is slower than the
//! tick rate, intermediate snapshots are overwritten and only the newest
//! one is written. Failed writes are logged and not retried; the next tick
//! brings a fresh snapshot anyway.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::snapshot::SnapshotStore;
use crate::registry::TrackedMember;

type Pending = Option<Arc<Vec<TrackedMember>>>;

pub struct SnapshotWriter {
    tx: watch::Sender<Pending>,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Start the writer task on the current tokio runtime.
    pub fn spawn(store: SnapshotStore) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(write_loop(store, rx));
        Self { tx, task }
    }

    /// Queue `members` as the latest snapshot. Never blocks.
    pub fn submit(&self, members: Vec<TrackedMember>) {
        if self.tx.send(Some(Arc::new(members))).is_err() {
            tracing::warn!("snapshot writer has stopped; dropping snapshot");
        }
    }

    /// Stop accepting snapshots, let the pending one (if any) land, and
    /// wait for the task to finish.
    pub async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "snapshot writer task failed");
        }
    }
}

async fn write_loop(store: SnapshotStore, mut rx: watch::Receiver<Pending>) {
    // changed() still reports an unseen value after the sender is dropped,
    // so the final snapshot is written before the loop ends.
    while rx.changed().await.is_ok() {
        let Some(members) = rx.borrow_and_update().clone() else {
            continue;
        };
        let store = store.clone();
        match tokio::task::spawn_blocking(move || store.save(&members)).await {
            Ok(Ok(())) => tracing::trace!("snapshot written"),
            Ok(Err(e)) => tracing::error!(error = %e, "snapshot write failed"),
            Err(e) => tracing::error!(error = %e, "snapshot write task panicked"),
        }
    }
    tracing::debug!(path = %store.path().display(), "snapshot writer stopped");
}
