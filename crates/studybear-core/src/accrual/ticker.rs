//! The global accrual tick.
//!
//! One timer for the whole registry. Each tick locks the registry once,
//! runs the engine with a single timestamp, copies the result and hands the
//! copy to the snapshot writer after the lock is released.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::engine::{now_ms, AccrualEngine, TickReport};
use crate::registry::SharedRegistry;
use crate::storage::SnapshotWriter;

pub struct Ticker {
    registry: SharedRegistry,
    engine: AccrualEngine,
    period: Duration,
}

/// Shortest period the ticker will run at; `interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl Ticker {
    /// A `period` shorter than one millisecond is raised to one millisecond.
    pub fn new(registry: SharedRegistry, engine: AccrualEngine, period: Duration) -> Self {
        Self {
            registry,
            engine,
            period: period.max(MIN_PERIOD),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one tick at `now_ms` and queue the resulting snapshot.
    pub fn tick_once(&self, now_ms: u64, writer: &SnapshotWriter) -> TickReport {
        let (report, snapshot) = {
            let mut registry = self.registry.lock();
            let report = self.engine.tick(&mut registry, now_ms);
            (report, registry.snapshot())
        };
        writer.submit(snapshot);
        report
    }

    /// Tick every period until `shutdown` flips to true or its sender is
    /// dropped, then queue a final snapshot and let the writer finish.
    pub async fn run(self, writer: SnapshotWriter, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period_ms = self.period.as_millis() as u64, "accrual ticker started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick_once(now_ms(), &writer);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("accrual ticker stopped");
        // Presence changes since the last tick are not credited, but they
        // must still reach disk.
        let last = self.registry.lock().snapshot();
        writer.submit(last);
        writer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{StudentRegistry, TrackedMember};
    use crate::storage::SnapshotStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn tick_once_accrues_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("data.json"));
        let registry = SharedRegistry::new(StudentRegistry::from_members(vec![TrackedMember::new(
            "a", 1_000,
        )]));
        let ticker = Ticker::new(registry.clone(), AccrualEngine::default(), Duration::from_secs(1));
        let writer = SnapshotWriter::spawn(store.clone());

        let report = ticker.tick_once(3_000, &writer);
        writer.shutdown().await;

        assert_eq!(report.credited_ms, 2_000);
        assert_eq!(registry.lock().find("a").unwrap().total_time, 2_000);
        let saved = store.load();
        assert_eq!(saved[0].total_time, 2_000);
        assert_eq!(saved[0].last_seen_ms, Some(3_000));
    }

    #[tokio::test]
    async fn zero_period_is_raised_and_runs() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("data.json"));
        let ticker = Ticker::new(SharedRegistry::default(), AccrualEngine::default(), Duration::ZERO);
        assert_eq!(ticker.period(), Duration::from_millis(1));

        let writer = SnapshotWriter::spawn(store);
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(ticker.run(writer, rx));
        tokio::time::sleep(Duration::from_millis(5)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_and_flushes() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("data.json"));
        let registry = SharedRegistry::new(StudentRegistry::from_members(vec![TrackedMember::new(
            "a",
            now_ms(),
        )]));
        let ticker = Ticker::new(
            registry.clone(),
            AccrualEngine::default(),
            Duration::from_millis(10),
        );
        let writer = SnapshotWriter::spawn(store.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(ticker.run(writer, rx));
        tokio::time::sleep(Duration::from_millis(60)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let saved = store.load();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].last_seen_ms.is_some());
        assert_eq!(saved[0], registry.lock().all()[0]);
    }
}
