//! VCF (Variant Call Format) input
//!
//! Only the leading columns of each data line are used: chromosome,
//! position, id, reference and alternate alleles. Every alternate allele
//! becomes one genomic HGVS id, so a file can be fed straight into a
//! batch lookup:
//!
//! ```no_run
//! use ferro_myvariant::batch::QueryInput;
//! use ferro_myvariant::client::{MyVariantClient, QueryOptions};
//! use ferro_myvariant::vcf::hgvs_from_vcf;
//!
//! let client = MyVariantClient::new()?;
//! let ids = hgvs_from_vcf("calls.vcf.gz")?;
//! let hits = client.getvariants(QueryInput::fallible(ids), &QueryOptions::new())?;
//! # Ok::<(), ferro_myvariant::FerroError>(())
//! ```

mod parser;
mod reader;

pub use parser::{parse_vcf_line, VcfLine};
pub use reader::{hgvs_from_vcf, open_vcf, HgvsIds};
