use std::io::{BufRead, BufReader, Lines, Read};
use std::path::{Path, PathBuf};

use mitors_core::utils::get_dynamic_reader;

use crate::errors::{AnnotationError, AnnotationResult};
use crate::vcf::header::{COLUMN_PREFIX, VcfHeader};
use crate::vcf::record::VariantRecord;

///
/// Streaming VCF reader over a plain or gzipped file.
///
pub struct VcfReader {
    path: PathBuf,
    header: VcfHeader,
    lines: Lines<BufReader<Box<dyn Read>>>,
    line_no: u64,
}

impl VcfReader {
    ///
    /// Open a VCF and read its header.
    ///
    /// # Arguments
    /// - path: path to the `.vcf` or `.vcf.gz` file
    pub fn from_path(path: &Path) -> AnnotationResult<Self> {
        let vcf_error = |message: String| AnnotationError::Vcf {
            path: path.to_path_buf(),
            message,
        };

        let reader = get_dynamic_reader(path).map_err(|e| vcf_error(format!("{:#}", e)))?;
        let mut lines = reader.lines();
        let mut meta = vec![];
        let mut line_no = 0;

        let column_line = loop {
            let line = match lines.next() {
                Some(line) => line?,
                None => return Err(vcf_error("missing #CHROM header line".to_string())),
            };
            line_no += 1;

            if line.starts_with(COLUMN_PREFIX) {
                break line;
            } else if line.starts_with("##") {
                meta.push(line);
            } else {
                return Err(vcf_error(format!("unexpected header line {}", line_no)));
            }
        };

        Ok(VcfReader {
            path: path.to_path_buf(),
            header: VcfHeader::new(meta, &column_line),
            lines,
            line_no,
        })
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Line number of the last line read.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }
}

impl Iterator for VcfReader {
    type Item = AnnotationResult<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let record = VariantRecord::from_line(&line).map_err(|message| {
                AnnotationError::MalformedRecord {
                    line: self.line_no,
                    message,
                }
            });
            return Some(record);
        }
    }
}

/// Read every record of a VCF into memory.
pub fn read_records(path: &Path) -> AnnotationResult<(VcfHeader, Vec<VariantRecord>)> {
    let reader = VcfReader::from_path(path)?;
    let header = reader.header().clone();
    let records = reader.collect::<AnnotationResult<Vec<VariantRecord>>>()?;
    Ok((header, records))
}
