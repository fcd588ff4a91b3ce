use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

/// Which processing operation a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOperation {
    Filter,
    Map,
    Reduce,
}

impl fmt::Display for ExecutionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Filter => "filter",
            Self::Map => "map",
            Self::Reduce => "reduce",
        };
        f.write_str(name)
    }
}

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        op: ExecutionOperation,
        input_len: usize,
        label: Option<String>,
    },
    Progress {
        op: ExecutionOperation,
        processed: u64,
    },
    /// `output_len` is 1 for reductions.
    RunFinished {
        op: ExecutionOperation,
        output_len: usize,
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
    /// A fallible callback returned `Err` after `processed` elements were visited.
    RunAborted {
        op: ExecutionOperation,
        processed: u64,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Fans every event out to a list of observers, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExecutionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ExecutionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ExecutionObserver for CompositeObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Logs execution events through `tracing`.
///
/// Nothing is printed unless the application installs a subscriber.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunStarted { op, input_len, label } => {
                tracing::debug!(%op, input_len, label = label.as_deref(), "run started");
            }
            ExecutionEvent::Progress { op, processed } => {
                tracing::debug!(%op, processed, "progress");
            }
            ExecutionEvent::RunFinished {
                op,
                output_len,
                elapsed,
                metrics,
            } => {
                tracing::info!(%op, output_len, ?elapsed, %metrics, "run finished");
            }
            ExecutionEvent::RunAborted { op, processed } => {
                tracing::warn!(%op, processed, "run aborted by callback error");
            }
        }
    }
}

/// Counters for the most recent run.
///
/// The engine resets these when a run begins, bumps the live element count as it goes, and
/// writes the run's final numbers once it closes. When runs overlap on one engine the shared
/// counters are last-writer-wins; the snapshot carried by each [`ExecutionEvent::RunFinished`]
/// always describes that run alone.
///
/// A panicking callback unwinds without closing the run, so the counters are left looking like a
/// run still in progress: `aborted == false` and `elapsed == None`.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,
    elements_processed: AtomicU64,
    output_len: AtomicU64,
    aborted: AtomicBool,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            elements_processed: AtomicU64::new(0),
            output_len: AtomicU64::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    /// Resets the counters and returns the id of the new run.
    pub fn begin_run(&self) -> u64 {
        let run_id = self.run_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.elements_processed.store(0, Ordering::SeqCst);
        self.output_len.store(0, Ordering::SeqCst);
        self.aborted.store(false, Ordering::SeqCst);
        run_id
    }

    /// Records a completed run and returns its snapshot.
    pub fn end_run(
        &self,
        run_id: u64,
        elapsed: Duration,
        elements_processed: u64,
        output_len: usize,
    ) -> ExecutionMetricsSnapshot {
        self.record(ExecutionMetricsSnapshot {
            run_id,
            elapsed: nonzero(elapsed),
            elements_processed,
            output_len: output_len as u64,
            aborted: false,
        })
    }

    /// Records a run stopped by a callback error and returns its snapshot.
    pub fn abort_run(
        &self,
        run_id: u64,
        elapsed: Duration,
        elements_processed: u64,
    ) -> ExecutionMetricsSnapshot {
        self.record(ExecutionMetricsSnapshot {
            run_id,
            elapsed: nonzero(elapsed),
            elements_processed,
            output_len: 0,
            aborted: true,
        })
    }

    fn record(&self, snap: ExecutionMetricsSnapshot) -> ExecutionMetricsSnapshot {
        let elapsed_ns = snap
            .elapsed
            .map_or(0, |d| d.as_nanos().min(u64::MAX as u128) as u64);
        self.elapsed_ns.store(elapsed_ns, Ordering::SeqCst);
        self.elements_processed
            .store(snap.elements_processed, Ordering::SeqCst);
        self.output_len.store(snap.output_len, Ordering::SeqCst);
        self.aborted.store(snap.aborted, Ordering::SeqCst);
        snap
    }

    /// Live count of visited elements, shared by every run on the engine.
    pub fn on_element_processed(&self) {
        let _ = self.elements_processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn elements_processed(&self) -> u64 {
        self.elements_processed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: nonzero(Duration::from_nanos(elapsed_ns)),
            elements_processed: self.elements_processed.load(Ordering::SeqCst),
            output_len: self.output_len.load(Ordering::SeqCst),
            aborted: self.aborted.load(Ordering::SeqCst),
        }
    }
}

fn nonzero(d: Duration) -> Option<Duration> {
    if d > Duration::ZERO { Some(d) } else { None }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub elements_processed: u64,
    pub output_len: u64,
    pub aborted: bool,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, elements_processed={}, output_len={}, aborted={}, elapsed={:?}",
            self.run_id, self.elements_processed, self.output_len, self.aborted, self.elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutionMetrics, ExecutionOperation};
    use std::time::Duration;

    #[test]
    fn begin_run_resets_counters_and_bumps_run_id() {
        let m = ExecutionMetrics::new();
        let first = m.begin_run();
        m.on_element_processed();
        m.on_element_processed();
        assert_eq!(m.elements_processed(), 2);
        let snap = m.end_run(first, Duration::from_millis(3), 2, 2);
        assert_eq!(snap, m.snapshot());

        let second = m.begin_run();
        assert_eq!((first, second), (1, 2));
        let snap = m.snapshot();
        assert_eq!(snap.run_id, 2);
        assert_eq!(snap.elements_processed, 0);
        assert_eq!(snap.output_len, 0);
        assert_eq!(snap.elapsed, None);
        assert!(!snap.aborted);
    }

    #[test]
    fn end_run_records_given_counts_over_live_counter() {
        let m = ExecutionMetrics::new();
        let run_id = m.begin_run();
        for _ in 0..7 {
            m.on_element_processed();
        }
        let snap = m.end_run(run_id, Duration::from_millis(1), 4, 4);
        assert_eq!(snap.elements_processed, 4);
        assert_eq!(m.snapshot().elements_processed, 4);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let m = ExecutionMetrics::new();
        let run_id = m.begin_run();
        m.on_element_processed();
        m.abort_run(run_id, Duration::from_secs(1), 1);

        let json = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(json["run_id"], 1);
        assert_eq!(json["elements_processed"], 1);
        assert_eq!(json["aborted"], true);
        assert_eq!(json["elapsed"]["secs"], 1);
    }

    #[test]
    fn operation_displays_lowercase() {
        assert_eq!(ExecutionOperation::Filter.to_string(), "filter");
        assert_eq!(
            serde_json::to_string(&ExecutionOperation::Reduce).unwrap(),
            "\"reduce\""
        );
    }
}
