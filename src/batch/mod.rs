//! Batched lookups over large or unbounded inputs.
//!
//! Ids and query terms are ingested from any of the accepted forms
//! ([`QueryInput`]), split into bounded requests by [`chunk`], and driven
//! through a caller-supplied fetch by [`BatchRunner`].
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use ferro_myvariant::batch::{BatchConfig, BatchMode, BatchResponse, BatchRunner};
//!
//! let config = BatchConfig::new().step(1).delay(Duration::ZERO).verbose(false);
//! let mut runner = BatchRunner::new(config).with_progress(|p| {
//!     println!("querying {}-{} (cached: {})", p.first, p.last, p.from_cache);
//! });
//!
//! let outcome = runner
//!     .run(BatchMode::Terms, vec!["rs58991260", "rs2500"].into(), |batch| {
//!         Ok(BatchResponse {
//!             from_cache: false,
//!             body: format!(r#"[{{"query": "{}", "notfound": true}}]"#, batch[0]),
//!         })
//!     })
//!     .unwrap();
//! assert_eq!(outcome.hits().unwrap().len(), 2);
//! ```

pub mod chunk;
mod input;
mod runner;

pub use chunk::{chunk, Chunk, Chunks};
pub use input::{split_terms, FieldList, QueryInput, Terms};
pub use runner::{
    BatchConfig, BatchMode, BatchOutcome, BatchProgress, BatchResponse, BatchRunner,
    DuplicateTerm, QueryReport, MAX_QUERY,
};
