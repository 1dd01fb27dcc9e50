use std::path::{Path, PathBuf};

use log::info;

use mitors_core::config::CoverageSettings;
use mitors_core::consts::DEFAULT_MT_CONTIG;
use mitors_core::utils::{create_output_path, with_appended_extension};
use mitors_coverage::{TrustedLayout, combine_coverage};

use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::PipelineResult;
use crate::executable::Invocation;

const MOSDEPTH_DIR: &str = "tmp";
const PER_BASE_SUFFIX: &str = ".per-base.bed.gz";

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageOptions {
    /// Alignment against the canonical reference.
    pub bam: PathBuf,
    /// Alignment against the shifted reference.
    pub shifted_bam: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
    pub contig: String,
    pub settings: CoverageSettings,
}

impl CoverageOptions {
    pub fn new(bam: &Path, shifted_bam: &Path, out_dir: &Path, prefix: &str) -> Self {
        CoverageOptions {
            bam: bam.to_path_buf(),
            shifted_bam: shifted_bam.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            prefix: prefix.to_string(),
            contig: DEFAULT_MT_CONTIG.to_string(),
            settings: CoverageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageOutputs {
    pub csv: PathBuf,
}

/// Run mosdepth and return the per-base depth file it writes.
fn per_base_depth(ctx: &StageContext, bam: &Path, prefix: &Path) -> PipelineResult<PathBuf> {
    ctx.run(&Invocation::new(&ctx.tools.mosdepth).arg(prefix).arg(bam))?;
    Ok(with_appended_extension(prefix, PER_BASE_SUFFIX))
}

///
/// Compute per-base depth of both alignments and stitch them into one
/// coverage series in canonical coordinates.
///
pub fn run_coverage(ctx: &StageContext, opts: &CoverageOptions) -> PipelineResult<CoverageOutputs> {
    ensure_inputs(&[&opts.bam, &opts.shifted_bam])?;
    let layout = TrustedLayout::from_settings(&opts.settings)?;

    let mosdepth_dir = opts.out_dir.join(MOSDEPTH_DIR);
    std::fs::create_dir_all(&mosdepth_dir)?;

    info!("Getting per base coverage for non-control region using mosdepth...");
    let canonical_bed = per_base_depth(ctx, &opts.bam, &mosdepth_dir.join("non_control"))?;

    info!("Getting per base coverage for control region using mosdepth...");
    let shifted_bed = per_base_depth(ctx, &opts.shifted_bam, &mosdepth_dir.join("control"))?;

    ensure_outputs("mosdepth", &[&canonical_bed, &shifted_bed])?;

    let csv = create_output_path(&opts.prefix, &opts.out_dir, "_coverage", ".csv");
    combine_coverage(&canonical_bed, &shifted_bed, &opts.contig, &layout, &csv)?;

    ensure_outputs("Calculating combined coverage per-base", &[&csv])?;

    Ok(CoverageOutputs { csv })
}
