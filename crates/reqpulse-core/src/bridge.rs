//! The emitter bridge: periodically rolls the interval and pushes
//! snapshots to a sink.
//!
//! Sinks own their wire format; the bridge only defines the handoff. The
//! default [`LogSink`] writes snapshots through `tracing`.

use crate::registry::CategoryRegistry;
use crate::snapshot::IntervalSnapshot;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Destination for finished interval snapshots.
pub trait SnapshotSink: Send + Sync + 'static {
    /// Consume one interval's worth of snapshots. Called once per roll,
    /// only when at least one category was active.
    fn emit(&self, snapshots: &[IntervalSnapshot]);
}

/// A sink that logs each snapshot through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SnapshotSink for LogSink {
    fn emit(&self, snapshots: &[IntervalSnapshot]) {
        for snapshot in snapshots {
            tracing::info!(
                category = %snapshot.category,
                hits = snapshot.total_hits,
                completions = snapshot.total_completions,
                average_ms = snapshot.average_duration.as_millis() as u64,
                max_ms = snapshot.max_duration.as_millis() as u64,
                throughput = snapshot.throughput,
                max_concurrent = snapshot.max_concurrent_threads,
                "interval snapshot"
            );
        }
    }
}

/// Periodic task bridging a [`CategoryRegistry`] to a [`SnapshotSink`].
///
/// Runs on the tokio runtime of the composition root until
/// [`shutdown`](Self::shutdown) is called or the emitter is dropped.
pub struct Emitter {
    handle: JoinHandle<()>,
    stop: Option<oneshot::Sender<()>>,
}

impl Emitter {
    /// Spawn the emitter loop. Every `period`, the open interval of every
    /// category is closed and active snapshots are pushed to `sink`.
    pub fn spawn(
        registry: Arc<CategoryRegistry>,
        period: Duration,
        sink: Arc<dyn SnapshotSink>,
    ) -> Self {
        let (stop, mut stopped) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it so the first
            // interval actually spans a full period.
            ticker.tick().await;
            let mut interval_start = SystemTime::now();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let interval_end = SystemTime::now();
                        let snapshots =
                            registry.roll_interval(interval_start, interval_end);
                        interval_start = interval_end;
                        if !snapshots.is_empty() {
                            sink.emit(&snapshots);
                        }
                    }
                    _ = &mut stopped => break,
                }
            }
        });

        Self {
            handle,
            stop: Some(stop),
        }
    }

    /// Stop the loop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for Emitter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
