use std::io::BufRead;
use std::path::Path;

use mitors_core::utils::get_dynamic_reader;

use crate::errors::{CoverageError, CoverageResult};

///
/// One row of a per-base depth file, converted to one-based closed
/// coordinates.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthInterval {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub depth: u32,
}

impl DepthInterval {
    ///
    /// Parse a `chrom start end depth` line (zero-based, half-open).
    ///
    pub fn from_bed_line(line: &str) -> Result<Self, String> {
        let mut fields = line.split('\t');

        let chrom = fields.next().ok_or("missing chromosome")?;
        let start = parse_field(fields.next(), "start")?;
        let end = parse_field(fields.next(), "end")?;
        let depth = parse_field(fields.next(), "depth")?;

        if start >= end {
            return Err(format!("empty interval [{}, {})", start, end));
        }

        Ok(DepthInterval {
            chrom: chrom.to_string(),
            // [start, end) zero-based -> [start + 1, end] one-based
            start: start + 1,
            end,
            depth,
        })
    }
}

fn parse_field(field: Option<&str>, name: &str) -> Result<u32, String> {
    let field = field.ok_or_else(|| format!("missing {} column", name))?;
    field
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid {} value '{}'", name, field))
}

///
/// Read a mosdepth `*.per-base.bed(.gz)` file.
///
/// # Arguments
/// - path: path to the per-base depth file
pub fn read_depth_intervals(path: &Path) -> CoverageResult<Vec<DepthInterval>> {
    let reader = get_dynamic_reader(path).map_err(|e| CoverageError::FileRead {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;

    let mut intervals = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let interval = DepthInterval::from_bed_line(&line).map_err(|message| {
            CoverageError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                message,
            }
        })?;
        intervals.push(interval);
    }

    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_from_bed_line_converts_coordinates() {
        let interval = DepthInterval::from_bed_line("chrM\t0\t576\t812").unwrap();
        assert_eq!(
            interval,
            DepthInterval {
                chrom: "chrM".to_string(),
                start: 1,
                end: 576,
                depth: 812
            }
        );
    }

    #[rstest]
    #[case("chrM\t10\t10\t5")]
    #[case("chrM\tx\t10\t5")]
    #[case("chrM\t0\t10")]
    fn test_from_bed_line_invalid(#[case] line: &str) {
        assert!(DepthInterval::from_bed_line(line).is_err());
    }

    #[rstest]
    fn test_read_depth_intervals_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.per-base.bed");
        std::fs::write(&path, "chrM\t0\t10\t3\nchrM\t10\tabc\t4\n").unwrap();

        let result = read_depth_intervals(&path);
        assert!(matches!(result, Err(CoverageError::Parse { line: 2, .. })));
    }

    #[rstest]
    fn test_read_depth_intervals_missing_file() {
        let result = read_depth_intervals(Path::new("missing.per-base.bed.gz"));
        assert!(matches!(result, Err(CoverageError::FileRead { .. })));
    }
}
