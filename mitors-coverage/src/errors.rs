use std::fmt::{self, Display};
use std::path::PathBuf;

use thiserror::Error;

/// Which alignment a coverage value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageSource {
    Canonical,
    Shifted,
}

impl Display for CoverageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageSource::Canonical => write!(f, "canonical"),
            CoverageSource::Shifted => write!(f, "shifted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchDefect {
    /// No trusted source covers the position.
    Gap,
    /// The position is covered more than once.
    Overlap {
        first: CoverageSource,
        second: CoverageSource,
    },
}

impl Display for StitchDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchDefect::Gap => write!(f, "no trusted coverage"),
            StitchDefect::Overlap { first, second } => {
                write!(f, "covered by both {} and {} coverage", first, second)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Coordinate stitching defect at position {pos}: {defect}")]
    CoordinateStitching { pos: u32, defect: StitchDefect },

    #[error("Invalid shift {shift} for a genome of length {genome_length}")]
    InvalidShift { shift: u32, genome_length: u32 },

    #[error("Position {pos} is outside the genome [1, {genome_length}]")]
    InvalidPosition { pos: u32, genome_length: u32 },

    #[error("Invalid trusted interval [{start}, {end}] for a genome of length {genome_length}")]
    InvalidInterval {
        start: u32,
        end: u32,
        genome_length: u32,
    },

    #[error("Can't read file {path}: {message}")]
    FileRead { path: PathBuf, message: String },

    #[error("Error parsing {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CoverageResult<T> = std::result::Result<T, CoverageError>;
