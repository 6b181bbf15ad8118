//! Collatz step counts, memoized by a fixed-list adaptive replacement cache.
//!
//! - [`collatz`] holds the recurrence and the [`StepCounter`] seam.
//! - [`BoundedList`] is the fixed capacity, most-recent-first list the cache is made of.
//! - [`AdaptiveCache`] is the four list (T1, T2, B1, B2) cache with its partition `p`.
//! - `driver` (with the `std` feature) reads keys, resolves them and writes
//!   `Number,Steps` records.
//!
//! # Example
//!
//! ```rust
//! use collatz_arc::AdaptiveCache;
//!
//! let mut cache = AdaptiveCache::new(4);
//! assert_eq!(cache.lookup(27), 111);
//! assert_eq!(cache.lookup(27), 111);
//! assert_eq!(cache.stats().hits(), 1);
//! ```
//!
//! [`collatz`]: collatz/index.html
//! [`StepCounter`]: trait.StepCounter.html
//! [`BoundedList`]: struct.BoundedList.html
//! [`AdaptiveCache`]: struct.AdaptiveCache.html
#![no_std]
#![deny(missing_docs)]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod macros;

mod adaptive;
pub mod collatz;
mod list;

cfg_std! {
    pub mod driver;
}

pub use adaptive::{AdaptiveCache, AdaptiveCacheBuilder, LookupStats};
pub use collatz::{Collatz, StepCounter};
pub use list::{BoundedList, Iter, Keys};
