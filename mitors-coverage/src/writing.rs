use std::path::Path;

use crate::errors::CoverageResult;
use crate::stitch::CoverageSeries;

pub const COVERAGE_HEADER: [&str; 3] = ["chrom", "position", "coverage"];

impl CoverageSeries {
    ///
    /// Write the series as CSV, one row per base.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    pub fn write_csv<T: AsRef<Path>>(&self, path: T) -> CoverageResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(COVERAGE_HEADER)?;

        for base in &self.entries {
            let pos = base.pos.to_string();
            let depth = base.depth.to_string();
            writer.write_record([self.contig.as_str(), pos.as_str(), depth.as_str()])?;
        }

        writer.flush()?;
        Ok(())
    }
}
