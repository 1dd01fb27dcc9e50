//! # Dual-reference coverage unification
//!
//! The mitochondrial genome is aligned twice: once against the canonical
//! reference and once against a copy rotated so that the control region
//! (which spans the origin) sits in the middle. Each alignment is only
//! trusted for part of the genome. This crate maps shifted positions back
//! to canonical coordinates and stitches the two per-base depth series
//! into one series covering every base exactly once.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use mitors_coverage::{TrustedLayout, combine_coverage};
//!
//! let layout = TrustedLayout::default();
//! let series = combine_coverage(
//!     Path::new("non_control.per-base.bed.gz"),
//!     Path::new("control.per-base.bed.gz"),
//!     "chrM",
//!     &layout,
//!     Path::new("sample_coverage.csv"),
//! )
//! .unwrap();
//! assert_eq!(series.len(), 16569);
//! ```
pub mod errors;
pub mod reading;
pub mod stitch;
pub mod transform;
pub mod writing;

use std::path::Path;

use log::info;

// re-exports
pub use errors::{CoverageError, CoverageResult, CoverageSource, StitchDefect};
pub use reading::{DepthInterval, read_depth_intervals};
pub use stitch::{BaseCoverage, CoverageSeries, stitch};
pub use transform::{ShiftTransform, TrustedInterval, TrustedLayout};

///
/// Read both per-base depth files, stitch them and write the combined
/// coverage CSV.
///
/// # Arguments
/// - canonical_bed: per-base depth of the canonical alignment
/// - shifted_bed: per-base depth of the shifted alignment
/// - contig: mitochondrial contig name; rows of other contigs are ignored
/// - layout: trusted intervals and shift transform
/// - out_csv: output path
pub fn combine_coverage(
    canonical_bed: &Path,
    shifted_bed: &Path,
    contig: &str,
    layout: &TrustedLayout,
    out_csv: &Path,
) -> CoverageResult<CoverageSeries> {
    let keep_contig = |rows: Vec<DepthInterval>| -> Vec<DepthInterval> {
        rows.into_iter().filter(|r| r.chrom == contig).collect()
    };

    let canonical = keep_contig(read_depth_intervals(canonical_bed)?);
    let shifted = keep_contig(read_depth_intervals(shifted_bed)?);

    info!("Combining per base coverage from control and non-control region...");
    let series = stitch(contig, &canonical, &shifted, layout)?;

    series.write_csv(out_csv)?;

    Ok(series)
}
