//! Genomic edits produced by the codec.

use std::fmt;

/// A classified allele change on the genomic (`g.`) coordinate system.
///
/// Positions are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenomicEdit {
    /// Single-base substitution: `g.{pos}{ref}>{alt}`
    Substitution {
        pos: u64,
        reference: String,
        alternate: String,
    },
    /// Deletion of `start..=end`: `g.{start}del` or `g.{start}_{end}del`
    Deletion { start: u64, end: u64 },
    /// Insertion between `after` and `after + 1`: `g.{after}_{after+1}ins{seq}`
    Insertion { after: u64, sequence: String },
    /// Deletion-insertion: `g.{start}delins{seq}` or `g.{start}_{end}delins{seq}`
    DelIns {
        start: u64,
        end: Option<u64>,
        sequence: String,
    },
}

impl GenomicEdit {
    /// Short edit type name as used in HGVS.
    pub fn kind(&self) -> &'static str {
        match self {
            GenomicEdit::Substitution { .. } => "sub",
            GenomicEdit::Deletion { .. } => "del",
            GenomicEdit::Insertion { .. } => "ins",
            GenomicEdit::DelIns { .. } => "delins",
        }
    }
}

impl fmt::Display for GenomicEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomicEdit::Substitution {
                pos,
                reference,
                alternate,
            } => write!(f, "g.{}{}>{}", pos, reference, alternate),
            GenomicEdit::Deletion { start, end } if start == end => write!(f, "g.{}del", start),
            GenomicEdit::Deletion { start, end } => write!(f, "g.{}_{}del", start, end),
            GenomicEdit::Insertion { after, sequence } => {
                write!(f, "g.{}_{}ins{}", after, after + 1, sequence)
            }
            GenomicEdit::DelIns {
                start,
                end: None,
                sequence,
            } => write!(f, "g.{}delins{}", start, sequence),
            GenomicEdit::DelIns {
                start,
                end: Some(end),
                sequence,
            } => write!(f, "g.{}_{}delins{}", start, end, sequence),
        }
    }
}
