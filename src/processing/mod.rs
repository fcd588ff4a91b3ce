//! Eager higher-order operations over slices.
//!
//! Every operation is a single, synchronous pass over a borrowed slice. The input is never
//! mutated, nothing is retained once the call returns, and no element is skipped.
//!
//! Currently implemented:
//!
//! - [`filter()`]: order-preserving selection by predicate
//! - [`map()`]: element-wise transformation, possibly to another type
//! - [`reduce()`]: left fold from a seed value
//!
//! Each has a `try_` counterpart whose callback returns a `Result`. The first `Err` aborts the
//! pass and is handed back to the caller untouched. A panicking callback unwinds through these
//! functions the same way.
//!
//! ## Example: filter → map → reduce
//!
//! ```rust
//! use higher_order_functions::processing::{filter, map, reduce};
//!
//! let readings = [12, -3, 7, 0, -8, 21];
//!
//! // Drop negative readings.
//! let valid = filter(&readings, |r| *r >= 0);
//!
//! // Render each reading.
//! let labels = map(&valid, |r| format!("{r}C"));
//! assert_eq!(labels, vec!["12C", "7C", "0C", "21C"]);
//!
//! // Sum them.
//! let total = reduce(&valid, 0, |acc, r| acc + r);
//! assert_eq!(total, 40);
//! ```

pub mod filter;
pub mod map;
pub mod reduce;

pub use filter::{filter, try_filter};
pub use map::{map, try_map};
pub use reduce::{reduce, try_reduce};
