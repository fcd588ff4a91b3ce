//! `higher-order-functions` provides eager, generic [`processing::filter`], [`processing::map`] and
//! [`processing::reduce`] over slices, plus `try_` forms whose callbacks return a `Result`.
//!
//! Every operation is one synchronous pass over a borrowed slice: the input is never mutated,
//! each element is visited exactly once in index order, and nothing outlives the call. A failing
//! callback (panic or `Err`) aborts the pass and reaches the caller unchanged.
//!
//! ## Quick examples
//!
//! ```rust
//! use higher_order_functions::processing::{filter, map, reduce};
//!
//! let kept = filter(&[1, 5, -1, 0, -2, 10, 99, -24, 6], |i| *i >= 0);
//! assert_eq!(kept, vec![1, 5, 0, 10, 99, 6]);
//!
//! let bumped = map(&[1, 5, 2, 8], |i| i + 1);
//! assert_eq!(bumped, vec![2, 6, 3, 9]);
//!
//! let sum = reduce(&[1, 5, 0, -5, 8, 7], 0, |acc, i| acc + i);
//! assert_eq!(sum, 16);
//! ```
//!
//! Fallible callbacks:
//!
//! ```rust
//! use higher_order_functions::processing::try_map;
//!
//! let parsed: Result<Vec<i32>, _> = try_map(&["1", "2", "three"], |s| s.parse::<i32>());
//! assert!(parsed.is_err());
//! ```
//!
//! ## Modules
//!
//! - [`processing`]: the filter/map/reduce operations
//! - [`execution`]: an engine that runs the same operations while reporting metrics and events
//! - [`error`]: error types used by the execution layer
//!
//! ## Observed execution
//!
//! ```rust
//! use std::sync::Arc;
//! use higher_order_functions::execution::{
//!     ExecutionEngine, ExecutionOptions, TracingExecutionObserver,
//! };
//!
//! # fn main() -> Result<(), higher_order_functions::ExecutionError> {
//! let opts = ExecutionOptions::from_json_str(r#"{"progress_interval": 2, "label": "demo"}"#)?;
//! let engine = ExecutionEngine::new(opts)?.with_observer(Arc::new(TracingExecutionObserver));
//!
//! let words = engine.filter(&["asdfas", "0", "0000"], |s| s.contains('0'));
//! assert_eq!(words, vec!["0", "0000"]);
//! assert_eq!(engine.metrics().snapshot().elements_processed, 3);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod execution;
pub mod processing;

pub use error::{ExecutionError, ExecutionResult};
