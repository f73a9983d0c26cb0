//! VCF-style variant loci and left-overlap normalization.

use crate::error::{ErrorCode, FerroError};

use super::edit::GenomicEdit;

/// A VCF-style variant: chromosome, 1-based position, REF and ALT alleles.
///
/// The chromosome is stored without any `chr` prefix; the prefix is added
/// back when the canonical id is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantLocus {
    chrom: String,
    pos: u64,
    reference: String,
    alternate: String,
}

/// Strip a case-insensitive leading `chr` from a chromosome name.
///
/// ```
/// use ferro_myvariant::hgvs::strip_chr_prefix;
///
/// assert_eq!(strip_chr_prefix("chr1"), "1");
/// assert_eq!(strip_chr_prefix("ChrX"), "X");
/// assert_eq!(strip_chr_prefix("MT"), "MT");
/// ```
pub fn strip_chr_prefix(chrom: &str) -> &str {
    match chrom.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &chrom[3..],
        _ => chrom,
    }
}

impl VariantLocus {
    /// Create a locus, stripping any `chr` prefix from the chromosome.
    ///
    /// Rejects an empty chromosome, position 0, a position whose allele span
    /// overflows `u64`, and non-ASCII alleles.
    /// Allele content is otherwise not validated.
    pub fn new(
        chrom: &str,
        pos: u64,
        reference: &str,
        alternate: &str,
    ) -> Result<Self, FerroError> {
        let stripped = strip_chr_prefix(chrom.trim());
        if stripped.is_empty() {
            return Err(FerroError::invalid_variant(
                chrom,
                pos,
                reference,
                alternate,
                ErrorCode::InvalidChromosome,
                "chromosome is empty",
            ));
        }
        if pos == 0 {
            return Err(FerroError::invalid_variant(
                chrom,
                pos,
                reference,
                alternate,
                ErrorCode::InvalidPosition,
                "positions are 1-based",
            ));
        }
        let span = reference.len().max(alternate.len()) as u64;
        if pos.checked_add(span).is_none() {
            return Err(FerroError::invalid_variant(
                chrom,
                pos,
                reference,
                alternate,
                ErrorCode::InvalidPosition,
                "allele span runs past the largest position",
            ));
        }
        if !reference.is_ascii() || !alternate.is_ascii() {
            return Err(FerroError::invalid_variant(
                chrom,
                pos,
                reference,
                alternate,
                ErrorCode::InvalidAlleles,
                "alleles must be ASCII",
            ));
        }

        Ok(Self {
            chrom: stripped.to_string(),
            pos,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
        })
    }

    /// Chromosome without the `chr` prefix.
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// 1-based position of the first REF base.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Reference allele.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Alternate allele.
    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    fn error(&self, code: ErrorCode, msg: &str) -> FerroError {
        FerroError::invalid_variant(
            &self.chrom,
            self.pos,
            &self.reference,
            &self.alternate,
            code,
            msg,
        )
    }

    /// Trim the bases shared at the left of REF and ALT.
    ///
    /// When the shared prefix exhausts one allele (an indel), one anchor base
    /// is kept so neither allele becomes empty. Otherwise the whole prefix is
    /// removed and the alleles start at their first mismatch. Normalizing an
    /// already-normalized locus returns it unchanged.
    ///
    /// ```
    /// use ferro_myvariant::hgvs::VariantLocus;
    ///
    /// let locus = VariantLocus::new("20", 1234567, "GTC", "GTCT").unwrap();
    /// let normalized = locus.normalize().unwrap();
    /// assert_eq!(normalized.pos(), 1234569);
    /// assert_eq!(normalized.reference(), "C");
    /// assert_eq!(normalized.alternate(), "CT");
    /// ```
    pub fn normalize(&self) -> Result<VariantLocus, FerroError> {
        let ref_bytes = self.reference.as_bytes();
        let alt_bytes = self.alternate.as_bytes();
        let shared = ref_bytes
            .iter()
            .zip(alt_bytes)
            .take_while(|(r, a)| r == a)
            .count();

        let ref_exhausted = shared == ref_bytes.len();
        let alt_exhausted = shared == alt_bytes.len();

        if ref_exhausted && alt_exhausted {
            return Err(self.error(ErrorCode::NoVariant, "alleles are identical"));
        }

        // Keep one anchor base for indels; trim the full prefix otherwise.
        let trim = if ref_exhausted || alt_exhausted {
            shared.saturating_sub(1)
        } else {
            shared
        };

        Ok(VariantLocus {
            chrom: self.chrom.clone(),
            pos: self.pos + trim as u64,
            reference: self.reference[trim..].to_string(),
            alternate: self.alternate[trim..].to_string(),
        })
    }

    /// Classify the allele change into a genomic edit.
    ///
    /// Both-long alleles sharing a first base are normalized first. After
    /// normalization either the first bases differ or one allele is a single
    /// anchor base, so the recursion is at most one level deep.
    pub fn edit(&self) -> Result<GenomicEdit, FerroError> {
        let ref_len = self.reference.len() as u64;
        let alt_len = self.alternate.len() as u64;
        let ref_first = self.reference.as_bytes().first();
        let alt_first = self.alternate.as_bytes().first();

        match (ref_len, alt_len) {
            (0, _) | (_, 0) => Err(self.error(ErrorCode::InvalidAlleles, "empty allele")),
            (1, 1) if self.reference == self.alternate => {
                Err(self.error(ErrorCode::NoVariant, "alleles are identical"))
            }
            (1, 1) => Ok(GenomicEdit::Substitution {
                pos: self.pos,
                reference: self.reference.clone(),
                alternate: self.alternate.clone(),
            }),
            (_, 1) if ref_first == alt_first => Ok(GenomicEdit::Deletion {
                start: self.pos + 1,
                end: self.pos + ref_len - 1,
            }),
            (_, 1) => Ok(GenomicEdit::DelIns {
                start: self.pos,
                end: Some(self.pos + ref_len - 1),
                sequence: self.alternate.clone(),
            }),
            (1, _) if ref_first == alt_first => Ok(GenomicEdit::Insertion {
                after: self.pos,
                sequence: self.alternate[1..].to_string(),
            }),
            (1, _) => Ok(GenomicEdit::DelIns {
                start: self.pos,
                end: None,
                sequence: self.alternate.clone(),
            }),
            _ if ref_first == alt_first => self.normalize()?.edit(),
            // The range follows the ALT length, matching the service's ids.
            _ => Ok(GenomicEdit::DelIns {
                start: self.pos,
                end: Some(self.pos + alt_len - 1),
                sequence: self.alternate.clone(),
            }),
        }
    }

    /// Render the canonical genomic id, e.g. `chr1:g.35366C>T`.
    pub fn to_hgvs(&self) -> Result<String, FerroError> {
        Ok(format!("chr{}:{}", self.chrom, self.edit()?))
    }
}
