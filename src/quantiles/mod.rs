//! Streaming ε-approximate weighted quantiles.
//!
//! The sketch is a three-layer pipeline:
//!
//! 1. `buffer`: raw `(value, weight)` pairs accumulate until the buffer
//!    is full, then drain as a sorted, value-coalesced list.
//! 2. `summary`: a sorted run of rank-annotated entries built from a
//!    drained buffer (or from another summary). Summaries merge in linear
//!    time with rank shifting (`merges`) and shrink under a bounded error
//!    budget (`compress`).
//! 3. `stream`: the front-end. Each buffer-load becomes a compressed
//!    summary that cascades bottom-up through a stack of levels; level ℓ
//!    absorbs up to 2^ℓ buffer-loads before being promoted. Finalizing
//!    collapses the stack into one terminal summary answering quantile and
//!    boundary queries.
//!
//! The target error ε bounds the rank error of every reported quantile as a
//! fraction of total pushed weight.
//!
//! ```
//! use gk_quantiles::quantiles::Stream;
//!
//! let mut stream = Stream::new(0.01, 1_000).unwrap();
//! for i in 0..1_000u32 {
//!     stream.push(f64::from(i), 1.0).unwrap();
//! }
//! stream.finalize().unwrap();
//!
//! let quantiles = stream.generate_quantiles(4).unwrap();
//! assert_eq!(quantiles.len(), 5);
//! assert_eq!(quantiles[0], 0.0);
//! assert_eq!(quantiles[4], 999.0);
//! ```
//!
//! For distributed use, run one `Stream` per shard at ε/2, finalize each,
//! and feed the final summaries' entries to a reducer `Stream` via
//! [`Stream::push_summary`].

mod buffer;
mod compress;
mod entries;
mod merges;
mod stream;
mod summary;
pub mod test_helpers;

pub use entries::SummaryEntry;
pub use stream::Stream;
pub use summary::Summary;
