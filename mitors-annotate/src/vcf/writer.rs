use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use mitors_core::utils::with_appended_extension;

use crate::errors::AnnotationResult;
use crate::vcf::header::VcfHeader;
use crate::vcf::record::VariantRecord;

///
/// Writes a VCF to a `.part` sibling of the destination and renames it into
/// place on [`VcfWriter::finish`]. A writer dropped before `finish` removes
/// the partial file, so the destination only ever holds a complete call-set.
///
pub struct VcfWriter {
    inner: Option<BufWriter<File>>,
    part: PathBuf,
    path: PathBuf,
}

impl VcfWriter {
    ///
    /// Create the partial output file (and the parent directories) and write
    /// the header.
    ///
    pub fn create(path: &Path, header: &VcfHeader) -> AnnotationResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let part = with_appended_extension(path, ".part");
        let mut writer = VcfWriter {
            inner: Some(BufWriter::new(File::create(&part)?)),
            part,
            path: path.to_path_buf(),
        };
        if let Some(inner) = writer.inner.as_mut() {
            header.write_to(inner)?;
        }

        Ok(writer)
    }

    pub fn write_record(&mut self, record: &VariantRecord) -> AnnotationResult<()> {
        if let Some(inner) = self.inner.as_mut() {
            writeln!(inner, "{}", record.to_line())?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> AnnotationResult<()> {
        if let Some(mut inner) = self.inner.take() {
            inner.flush()?;
        }
        std::fs::rename(&self.part, &self.path)?;
        Ok(())
    }
}

impl Drop for VcfWriter {
    fn drop(&mut self) {
        // only unfinished writers still hold the file
        if self.inner.take().is_some() && std::fs::remove_file(&self.part).is_ok() {
            debug!("Removed partial output {}", self.part.display());
        }
    }
}
