//! Observed execution of processing operations.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - The same filter/map/reduce operations (and their `try_` forms), run sequentially
//! - Real-time metrics + observer hooks for monitoring
//! - Periodic progress events, configurable through [`ExecutionOptions`]
//!
//! Results are always identical to calling the processing functions directly; the engine only
//! counts the elements the callback sees.

mod observer;

use std::cell::Cell;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, ExecutionResult};
use crate::processing;

pub use observer::{
    CompositeObserver, ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    ExecutionOperation, TracingExecutionObserver,
};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Emit an [`ExecutionEvent::Progress`] every this many visited elements.
    pub progress_interval: usize,
    /// Optional name attached to run events and log lines.
    pub label: Option<String>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            progress_interval: 1_024,
            label: None,
        }
    }
}

impl ExecutionOptions {
    /// Parse options from JSON. Missing keys take their default value.
    pub fn from_json_str(input: &str) -> ExecutionResult<Self> {
        let opts: Self = serde_json::from_str(input)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Rejects a `progress_interval` of zero.
    pub fn validate(&self) -> ExecutionResult<()> {
        if self.progress_interval == 0 {
            return Err(ExecutionError::InvalidOptions {
                message: "progress_interval must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Runs processing operations while reporting metrics and events.
///
/// One engine may be shared across threads. Each run counts its own elements, so its events carry
/// that run's numbers; the shared [`ExecutionMetrics`] are last-writer-wins across concurrent runs.
pub struct ExecutionEngine {
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine, rejecting invalid options.
    pub fn new(opts: ExecutionOptions) -> ExecutionResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Observed [`processing::filter`].
    pub fn filter<T, F>(&self, items: &[T], mut predicate: F) -> Vec<T>
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let op = ExecutionOperation::Filter;
        let run = self.begin(op, items.len());
        let out = processing::filter(items, |item| {
            self.tick(&run);
            predicate(item)
        });
        self.finish(&run, out.len());
        out
    }

    /// Observed [`processing::map`].
    pub fn map<T, M, F>(&self, items: &[T], mut transform: F) -> Vec<M>
    where
        F: FnMut(&T) -> M,
    {
        let op = ExecutionOperation::Map;
        let run = self.begin(op, items.len());
        let out = processing::map(items, |item| {
            self.tick(&run);
            transform(item)
        });
        self.finish(&run, out.len());
        out
    }

    /// Observed [`processing::reduce`].
    pub fn reduce<T, M, F>(&self, items: &[T], seed: M, mut combine: F) -> M
    where
        F: FnMut(M, &T) -> M,
    {
        let op = ExecutionOperation::Reduce;
        let run = self.begin(op, items.len());
        let out = processing::reduce(items, seed, |acc, item| {
            self.tick(&run);
            combine(acc, item)
        });
        self.finish(&run, 1);
        out
    }

    /// Observed [`processing::try_filter`]. The callback's error is returned unchanged.
    pub fn try_filter<T, E, F>(&self, items: &[T], mut predicate: F) -> Result<Vec<T>, E>
    where
        T: Clone,
        F: FnMut(&T) -> Result<bool, E>,
    {
        let op = ExecutionOperation::Filter;
        let run = self.begin(op, items.len());
        let res = processing::try_filter(items, |item| {
            self.tick(&run);
            predicate(item)
        });
        self.settle(&run, res.as_ref().ok().map(Vec::len));
        res
    }

    /// Observed [`processing::try_map`]. The callback's error is returned unchanged.
    pub fn try_map<T, M, E, F>(&self, items: &[T], mut transform: F) -> Result<Vec<M>, E>
    where
        F: FnMut(&T) -> Result<M, E>,
    {
        let op = ExecutionOperation::Map;
        let run = self.begin(op, items.len());
        let res = processing::try_map(items, |item| {
            self.tick(&run);
            transform(item)
        });
        self.settle(&run, res.as_ref().ok().map(Vec::len));
        res
    }

    /// Observed [`processing::try_reduce`]. The callback's error is returned unchanged.
    pub fn try_reduce<T, M, E, F>(&self, items: &[T], seed: M, mut combine: F) -> Result<M, E>
    where
        F: FnMut(M, &T) -> Result<M, E>,
    {
        let op = ExecutionOperation::Reduce;
        let run = self.begin(op, items.len());
        let res = processing::try_reduce(items, seed, |acc, item| {
            self.tick(&run);
            combine(acc, item)
        });
        self.settle(&run, res.as_ref().ok().map(|_| 1));
        res
    }

    fn begin(&self, op: ExecutionOperation, input_len: usize) -> RunState {
        let start = Instant::now();
        let run_id = self.metrics.begin_run();
        tracing::trace!(%op, run_id, input_len, label = self.opts.label.as_deref(), "begin run");
        self.emit(ExecutionEvent::RunStarted {
            op,
            input_len,
            label: self.opts.label.clone(),
        });
        RunState {
            op,
            run_id,
            start,
            processed: Cell::new(0),
        }
    }

    fn tick(&self, run: &RunState) {
        let processed = run.processed.get() + 1;
        run.processed.set(processed);
        self.metrics.on_element_processed();
        if processed % self.opts.progress_interval as u64 == 0 {
            self.emit(ExecutionEvent::Progress {
                op: run.op,
                processed,
            });
        }
    }

    fn finish(&self, run: &RunState, output_len: usize) {
        let op = run.op;
        let elapsed = run.start.elapsed();
        let metrics = self
            .metrics
            .end_run(run.run_id, elapsed, run.processed.get(), output_len);
        tracing::trace!(%op, run_id = run.run_id, output_len, ?elapsed, "end run");
        self.emit(ExecutionEvent::RunFinished {
            op,
            output_len,
            elapsed,
            metrics,
        });
    }

    /// Closes a fallible run: `None` means the callback returned `Err`.
    fn settle(&self, run: &RunState, output_len: Option<usize>) {
        match output_len {
            Some(output_len) => self.finish(run, output_len),
            None => {
                let op = run.op;
                let processed = run.processed.get();
                self.metrics
                    .abort_run(run.run_id, run.start.elapsed(), processed);
                tracing::trace!(%op, run_id = run.run_id, processed, "abort run");
                self.emit(ExecutionEvent::RunAborted { op, processed });
            }
        }
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Bookkeeping for a single run, local to the calling thread.
struct RunState {
    op: ExecutionOperation,
    run_id: u64,
    start: Instant,
    processed: Cell<u64>,
}

#[cfg(test)]
mod tests {
    use super::{ExecutionEngine, ExecutionOptions};
    use std::num::ParseIntError;
    use std::sync::{Arc, Mutex};

    use crate::error::ExecutionError;
    use crate::execution::{ExecutionEvent, ExecutionObserver, ExecutionOperation};

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<ExecutionEvent>>,
    }

    impl RecordingObserver {
        fn progress(&self) -> Vec<u64> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    ExecutionEvent::Progress { processed, .. } => Some(*processed),
                    _ => None,
                })
                .collect()
        }
    }

    impl ExecutionObserver for RecordingObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn engine_with(interval: usize) -> (ExecutionEngine, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let engine = ExecutionEngine::new(ExecutionOptions {
            progress_interval: interval,
            label: Some("test".to_string()),
        })
        .unwrap()
        .with_observer(observer.clone());
        (engine, observer)
    }

    #[test]
    fn zero_progress_interval_is_rejected() {
        let err = ExecutionEngine::new(ExecutionOptions {
            progress_interval: 0,
            label: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, ExecutionError::InvalidOptions { .. }));
        assert!(err.to_string().contains("progress_interval must be > 0"));
    }

    #[test]
    fn options_from_json_fill_defaults() {
        let opts = ExecutionOptions::from_json_str(r#"{"label":"nightly"}"#).unwrap();
        assert_eq!(opts.progress_interval, 1_024);
        assert_eq!(opts.label.as_deref(), Some("nightly"));

        let err = ExecutionOptions::from_json_str(r#"{"progress_interval":0}"#).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidOptions { .. }));

        let err = ExecutionOptions::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ExecutionError::Config(_)));
        assert!(err.to_string().starts_with("config error:"));
    }

    #[test]
    fn engine_results_match_processing_functions() {
        let (engine, _) = engine_with(4);
        let input = [1, 5, -1, 0, -2, 10, 99, -24, 6];

        assert_eq!(engine.filter(&input, |i| *i >= 0), vec![1, 5, 0, 10, 99, 6]);
        assert_eq!(engine.map(&input, |i| i * 2).len(), input.len());
        assert_eq!(engine.reduce(&input, 0, |acc, i| acc + i), 94);
    }

    #[test]
    fn progress_events_follow_interval() {
        let (engine, observer) = engine_with(3);
        let input: Vec<i32> = (0..10).collect();
        let _ = engine.map(&input, |i| i + 1);
        assert_eq!(observer.progress(), vec![3, 6, 9]);
    }

    #[test]
    fn run_events_bracket_a_successful_run() {
        let (engine, observer) = engine_with(100);
        let out = engine.filter(&["a", "0", "b0"], |s| s.contains('0'));
        assert_eq!(out, vec!["0", "b0"]);

        let events = observer.events.lock().unwrap();
        assert!(matches!(
            &events[0],
            ExecutionEvent::RunStarted { op: ExecutionOperation::Filter, input_len: 3, label: Some(l) } if l == "test"
        ));
        match events.last().unwrap() {
            ExecutionEvent::RunFinished { op, output_len, metrics, .. } => {
                assert_eq!(*op, ExecutionOperation::Filter);
                assert_eq!(*output_len, 2);
                assert_eq!(metrics.elements_processed, 3);
                assert_eq!(metrics.output_len, 2);
                assert!(!metrics.aborted);
            }
            other => panic!("unexpected last event: {other:?}"),
        }
    }

    #[test]
    fn failed_callback_aborts_run_and_passes_error_through() {
        let (engine, observer) = engine_with(100);
        let metrics = engine.metrics();

        let err: ParseIntError = engine
            .try_reduce(&["4", "2", "x", "9"], 0i64, |acc, s| Ok(acc + s.parse::<i64>()?))
            .unwrap_err();
        assert_eq!(err, "x".parse::<i64>().unwrap_err());

        let snap = metrics.snapshot();
        assert_eq!(snap.elements_processed, 3);
        assert!(snap.aborted);
        assert!(matches!(
            observer.events.lock().unwrap().last(),
            Some(ExecutionEvent::RunAborted { op: ExecutionOperation::Reduce, processed: 3 })
        ));
    }

    #[test]
    fn each_run_resets_metrics() {
        let (engine, _) = engine_with(100);
        let metrics = engine.metrics();

        let _ = engine.map(&[1, 2, 3, 4], |i| *i);
        let _: Result<Vec<i32>, ()> = engine.try_map(&[1, 2], |i| Ok(*i));

        let snap = metrics.snapshot();
        assert_eq!(snap.run_id, 2);
        assert_eq!(snap.elements_processed, 2);
        assert_eq!(snap.output_len, 2);
    }

    #[test]
    fn panicking_callback_leaves_run_open_in_metrics() {
        let (engine, observer) = engine_with(100);
        let metrics = engine.metrics();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            engine.map(&[1, 2, 3], |i| {
                if *i == 2 {
                    panic!("boom");
                }
                *i
            })
        }));
        assert!(result.is_err());

        let snap = metrics.snapshot();
        assert_eq!(snap.run_id, 1);
        assert_eq!(snap.elements_processed, 2);
        assert_eq!(snap.elapsed, None);
        assert!(!snap.aborted);
        assert!(!observer
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, ExecutionEvent::RunFinished { .. } | ExecutionEvent::RunAborted { .. })));
    }
}
