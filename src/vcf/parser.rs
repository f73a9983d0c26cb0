//! Data-line parsing for VCF input

use crate::error::FerroError;
use crate::hgvs::format_hgvs;

/// The leading fields of one VCF data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfLine {
    /// Chromosome as written in the file
    pub chrom: String,
    /// 1-based position
    pub pos: u64,
    /// The ID column (`.` when unset)
    pub id: String,
    /// Reference allele
    pub reference: String,
    /// Alternate alleles, `.` entries removed
    pub alternates: Vec<String>,
}

impl VcfLine {
    /// One HGVS id per alternate allele
    pub fn hgvs_ids(&self) -> Result<Vec<String>, FerroError> {
        self.alternates
            .iter()
            .map(|alt| format_hgvs(&self.chrom, self.pos, &self.reference, alt))
            .collect()
    }
}

/// Parse one line of a VCF file
///
/// Header/comment lines (`#`) and blank lines yield `Ok(None)`. Only the
/// first five tab-separated columns are read; anything after them is
/// ignored.
///
/// # Examples
///
/// ```
/// use ferro_myvariant::vcf::parse_vcf_line;
///
/// let line = parse_vcf_line("1\t35366\trs1\tC\tT,G\t.\tPASS\t.", 1).unwrap().unwrap();
/// assert_eq!(line.alternates, vec!["T", "G"]);
/// assert!(parse_vcf_line("##fileformat=VCFv4.2", 1).unwrap().is_none());
/// ```
pub fn parse_vcf_line(line: &str, line_no: usize) -> Result<Option<VcfLine>, FerroError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.splitn(6, '\t').collect();
    if fields.len() < 5 {
        return Err(FerroError::malformed(format!(
            "line {}: expected at least 5 tab-separated columns, found {}",
            line_no,
            fields.len()
        )));
    }

    let pos = fields[1].trim().parse::<u64>().map_err(|_| {
        FerroError::malformed(format!(
            "line {}: invalid position '{}'",
            line_no, fields[1]
        ))
    })?;

    let alternates = fields[4]
        .split(',')
        .map(str::trim)
        .filter(|alt| !alt.is_empty() && *alt != ".")
        .map(str::to_string)
        .collect();

    Ok(Some(VcfLine {
        chrom: fields[0].trim().to_string(),
        pos,
        id: fields[2].trim().to_string(),
        reference: fields[3].trim().to_string(),
        alternates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_line() {
        let line = parse_vcf_line("20\t1234567\t.\tGTC\tGTCT", 3)
            .unwrap()
            .unwrap();
        assert_eq!(line.chrom, "20");
        assert_eq!(line.pos, 1234567);
        assert_eq!(line.id, ".");
        assert_eq!(line.hgvs_ids().unwrap(), vec!["chr20:g.1234569_1234570insT"]);
    }

    #[test]
    fn test_parse_skips_headers_and_blanks() {
        assert!(parse_vcf_line("#CHROM\tPOS\tID\tREF\tALT", 1)
            .unwrap()
            .is_none());
        assert!(parse_vcf_line("", 2).unwrap().is_none());
        assert!(parse_vcf_line("   \r\n", 3).unwrap().is_none());
    }

    #[test]
    fn test_parse_multiallelic() {
        let line = parse_vcf_line("chr7\t15903\trs2\tG\tGC,A\t50\tPASS\tDP=3", 1)
            .unwrap()
            .unwrap();
        assert_eq!(
            line.hgvs_ids().unwrap(),
            vec!["chr7:g.15903_15904insC", "chr7:g.15903G>A"]
        );
    }

    #[test]
    fn test_parse_missing_alternate() {
        let line = parse_vcf_line("1\t100\t.\tA\t.", 1).unwrap().unwrap();
        assert!(line.alternates.is_empty());
        assert!(line.hgvs_ids().unwrap().is_empty());
    }

    #[test]
    fn test_position_at_u64_limit_is_an_error() {
        let line = parse_vcf_line("1\t18446744073709551615\t.\tAT\tA", 1)
            .unwrap()
            .unwrap();
        let err = line.hgvs_ids().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidPosition);
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        let err = parse_vcf_line("1\t100\t.\tA", 42).unwrap_err();
        assert!(err.to_string().contains("line 42"));

        let err = parse_vcf_line("1\tabc\t.\tA\tG", 7).unwrap_err();
        assert!(err.to_string().contains("invalid position"));
    }
}
