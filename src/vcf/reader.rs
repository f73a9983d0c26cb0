//! Streaming HGVS ids out of VCF files

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use super::parser::parse_vcf_line;
use crate::error::FerroError;

/// Lazily yields one HGVS id per alternate allele, in file order
///
/// Reading stops being useful after the first `Err`; callers feeding a
/// batch run get that error as the reason the run aborted.
pub struct HgvsIds<R> {
    reader: R,
    line_no: usize,
    pending: VecDeque<String>,
    buf: String,
}

impl<R: BufRead> HgvsIds<R> {
    /// Read ids from any buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            pending: VecDeque::new(),
            buf: String::new(),
        }
    }

    /// Number of lines read so far
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for HgvsIds<R> {
    type Item = Result<String, FerroError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.pending.pop_front() {
                return Some(Ok(id));
            }

            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(FerroError::Io {
                        msg: format!("Failed to read VCF line {}: {}", self.line_no + 1, e),
                    }))
                }
            }
            self.line_no += 1;

            let parsed = match parse_vcf_line(&self.buf, self.line_no) {
                Ok(Some(line)) => line,
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            };
            match parsed.hgvs_ids() {
                Ok(ids) => self.pending.extend(ids),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Open a VCF file, decompressing it when the name ends in `.gz`
pub fn open_vcf<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, FerroError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FerroError::Io {
        msg: format!("Failed to open VCF file '{}': {}", path.display(), e),
    })?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        debug!("reading gzip-compressed VCF {}", path.display());
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// HGVS ids for every alternate allele in a VCF file
///
/// ```no_run
/// use ferro_myvariant::vcf::hgvs_from_vcf;
///
/// for id in hgvs_from_vcf("calls.vcf.gz")? {
///     println!("{}", id?);
/// }
/// # Ok::<(), ferro_myvariant::FerroError>(())
/// ```
pub fn hgvs_from_vcf<P: AsRef<Path>>(path: P) -> Result<HgvsIds<Box<dyn BufRead>>, FerroError> {
    Ok(HgvsIds::new(open_vcf(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const TEST_VCF: &str = "\
##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t35366\trs1\tC\tT\t.\tPASS\t.
2\t17142\trs2\tG\tGA,T\t.\tPASS\t.

MT\t8270\t.\tCACCCCCTCT\tC\t.\tPASS\t.
X\t100\t.\tA\t.\t.\tPASS\t.
";

    fn collect<R: BufRead>(ids: HgvsIds<R>) -> Vec<String> {
        ids.collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn test_ids_in_file_order() {
        let ids = collect(HgvsIds::new(Cursor::new(TEST_VCF)));
        assert_eq!(
            ids,
            vec![
                "chr1:g.35366C>T",
                "chr2:g.17142_17143insA",
                "chr2:g.17142G>T",
                "chrMT:g.8271_8279del",
            ]
        );
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let mut ids = HgvsIds::new(Cursor::new("1\t100\t.\tA\tG\nbroken line\n"));
        assert_eq!(ids.next().unwrap().unwrap(), "chr1:g.100A>G");
        let err = ids.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_open_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("calls.vcf");
        std::fs::write(&plain, TEST_VCF).unwrap();
        assert_eq!(collect(hgvs_from_vcf(&plain).unwrap()).len(), 4);

        let gz = dir.path().join("calls.vcf.gz");
        let mut encoder = flate2::write::GzEncoder::new(
            std::fs::File::create(&gz).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(TEST_VCF.as_bytes()).unwrap();
        encoder.finish().unwrap();
        assert_eq!(collect(hgvs_from_vcf(&gz).unwrap()).len(), 4);
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_vcf("/nonexistent/calls.vcf").err().unwrap();
        assert!(matches!(err, FerroError::Io { .. }));
    }
}
