//! Genomic HGVS ids from VCF-style variants
//!
//! The annotation service keys every variant by a genomic HGVS id such as
//! `chr1:g.35366C>T`. This module turns (chromosome, position, REF, ALT)
//! into that id.
//!
//! # Example
//!
//! ```
//! use ferro_myvariant::hgvs::format_hgvs;
//!
//! assert_eq!(format_hgvs("1", 35366, "C", "T").unwrap(), "chr1:g.35366C>T");
//! assert_eq!(format_hgvs("chr2", 17142, "G", "GA").unwrap(), "chr2:g.17142_17143insA");
//! assert_eq!(format_hgvs("MT", 8270, "CACCCCCTCT", "C").unwrap(), "chrMT:g.8271_8279del");
//! ```
//!
//! # Classification
//!
//! | REF length | ALT length | Condition          | Result                                 |
//! |------------|------------|--------------------|----------------------------------------|
//! | 1          | 1          |                    | `g.{pos}{ref}>{alt}`                   |
//! | >1         | 1          | `ref[0] == alt`    | `g.{pos+1}del` / `g.{pos+1}_{end}del`  |
//! | >1         | 1          | otherwise          | `g.{pos}_{pos+len(ref)-1}delins{alt}`  |
//! | 1          | >1         | `alt[0] == ref`    | `g.{pos}_{pos+1}ins{alt[1:]}`          |
//! | 1          | >1         | otherwise          | `g.{pos}delins{alt}`                   |
//! | >1         | >1         | `ref[0] == alt[0]` | normalize, then classify again         |
//! | >1         | >1         | otherwise          | `g.{pos}_{pos+len(alt)-1}delins{alt}`  |
//!
//! Empty alleles and identical alleles are rejected.

pub mod edit;
pub mod locus;

pub use edit::GenomicEdit;
pub use locus::{strip_chr_prefix, VariantLocus};

use crate::error::FerroError;

/// Build the canonical genomic HGVS id for a VCF-style variant.
///
/// Any case-insensitive `chr` prefix on `chrom` is stripped and the output
/// is always re-prefixed with `chr`.
///
/// # Errors
///
/// Returns [`FerroError::InvalidVariant`] when the alleles are empty,
/// identical, or cannot be classified, and when the position is 0.
pub fn format_hgvs(
    chrom: &str,
    pos: u64,
    reference: &str,
    alternate: &str,
) -> Result<String, FerroError> {
    VariantLocus::new(chrom, pos, reference, alternate)?.to_hgvs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_format_hgvs_known_ids() {
        assert_eq!(format_hgvs("1", 35366, "C", "T").unwrap(), "chr1:g.35366C>T");
        assert_eq!(
            format_hgvs("chr2", 17142, "G", "GA").unwrap(),
            "chr2:g.17142_17143insA"
        );
        assert_eq!(format_hgvs("1", 10019, "TA", "T").unwrap(), "chr1:g.10020del");
        assert_eq!(
            format_hgvs("MT", 8270, "CACCCCCTCT", "C").unwrap(),
            "chrMT:g.8271_8279del"
        );
        assert_eq!(
            format_hgvs("7", 15903, "G", "GC").unwrap(),
            "chr7:g.15903_15904insC"
        );
        assert_eq!(
            format_hgvs("X", 107930849, "GGA", "C").unwrap(),
            "chrX:g.107930849_107930851delinsC"
        );
        assert_eq!(
            format_hgvs("20", 1234567, "GTC", "GTCT").unwrap(),
            "chr20:g.1234569_1234570insT"
        );
    }

    #[test]
    fn test_format_hgvs_case_insensitive_prefix() {
        assert_eq!(format_hgvs("CHR9", 100, "G", "A").unwrap(), "chr9:g.100G>A");
        assert_eq!(format_hgvs("Chr9", 100, "G", "A").unwrap(), "chr9:g.100G>A");
    }

    #[test]
    fn test_format_hgvs_insertion_without_anchor() {
        assert_eq!(format_hgvs("1", 500, "A", "GT").unwrap(), "chr1:g.500delinsGT");
    }

    #[test]
    fn test_format_hgvs_identical_alleles() {
        let err = format_hgvs("1", 500, "A", "A").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoVariant);

        let err = format_hgvs("1", 500, "ACG", "ACG").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoVariant);
    }

    #[test]
    fn test_format_hgvs_empty_allele() {
        let err = format_hgvs("1", 500, "A", "").unwrap_err();
        assert!(matches!(err, FerroError::InvalidVariant { .. }));
    }
}
