// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-myvariant: batch client for the MyVariant.info annotation service
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! - [`hgvs`] turns VCF-style variants into the genomic HGVS ids the
//!   service uses as keys.
//! - [`batch`] splits large or unbounded id/term inputs into bounded
//!   requests and tracks duplicate and missing terms.
//! - [`scroll`] streams every hit of a query across scroll pages.
//! - [`client`] ties both to the service endpoints over a pluggable
//!   transport with an optional in-memory response cache.
//!
//! # Example
//!
//! ```
//! use ferro_myvariant::client::{MockTransport, MyVariantClient, QueryOptions};
//! use ferro_myvariant::{format_hgvs, SessionConfig};
//!
//! let id = format_hgvs("chr2", 17142, "G", "GA").unwrap();
//! assert_eq!(id, "chr2:g.17142_17143insA");
//!
//! let mock = MockTransport::new();
//! mock.push_json(200, r#"[{"_id": "chr2:g.17142_17143insA", "query": "chr2:g.17142_17143insA"}]"#);
//!
//! let config = SessionConfig { delay: 0.0, ..Default::default() };
//! let client = MyVariantClient::with_transport(config, mock).unwrap();
//! let hits = client
//!     .getvariants(vec![id.as_str()], &QueryOptions::new().verbose(false))
//!     .unwrap()
//!     .into_hits();
//! assert_eq!(hits.len(), 1);
//! ```

pub mod batch;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod hgvs;
pub mod scroll;
pub mod vcf;

// Re-export commonly used types
pub use batch::{BatchOutcome, QueryInput, QueryReport};
pub use client::{Hit, MyVariantClient, QueryOptions, QueryResponse};
pub use config::SessionConfig;
pub use error::{ErrorCode, FerroError};
pub use hgvs::{format_hgvs, VariantLocus};
pub use scroll::ScrollStream;

/// Result type alias for ferro-myvariant operations
pub type Result<T> = std::result::Result<T, FerroError>;
