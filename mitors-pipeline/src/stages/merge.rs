use std::path::{Path, PathBuf};

use log::info;

use mitors_core::utils::{create_output_path, file_basename, file_directory, with_appended_extension};

use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::PipelineResult;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Calls against the canonical reference.
    pub vcf: PathBuf,
    /// Calls against the shifted reference, still in shifted coordinates.
    pub shifted_vcf: PathBuf,
    /// Mutect2 stats; default to `<vcf dir>/<vcf basename>.vcf.stats`.
    pub stats: Option<PathBuf>,
    pub shifted_stats: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutputs {
    pub vcf: PathBuf,
    pub vcf_index: PathBuf,
    pub stats: PathBuf,
}

/// Stats file Mutect2 writes next to a VCF.
pub fn default_stats_path(vcf: &Path) -> PathBuf {
    create_output_path(&file_basename(vcf), &file_directory(vcf), "", ".vcf.stats")
}

///
/// Lift the shifted calls back to canonical coordinates and merge them,
/// together with their Mutect2 stats, with the canonical calls.
///
pub fn run_merge(ctx: &StageContext, opts: &MergeOptions) -> PipelineResult<MergeOutputs> {
    let stats = opts
        .stats
        .clone()
        .unwrap_or_else(|| default_stats_path(&opts.vcf));
    let shifted_stats = opts
        .shifted_stats
        .clone()
        .unwrap_or_else(|| default_stats_path(&opts.shifted_vcf));

    ensure_inputs(&[&opts.vcf, &opts.shifted_vcf, &stats, &shifted_stats])?;
    std::fs::create_dir_all(&opts.out_dir)?;

    let out_dir = &opts.out_dir;

    info!("Lifting over shifted VCF...");
    let shifted_back = create_output_path(&opts.prefix, out_dir, "_shifted_back", ".vcf");
    let rejected = create_output_path(&opts.prefix, out_dir, "_rejected", ".vcf");
    ctx.run(
        &ctx.gatk("LiftoverVcf")
            .opt("-I", &opts.shifted_vcf)
            .opt("-R", &ctx.reference.fasta)
            .opt("-O", &shifted_back)
            .opt("-C", &ctx.reference.shift_back_chain)
            .opt("--REJECT", &rejected),
    )?;

    info!("Merging VCFs...");
    let vcf = create_output_path(&opts.prefix, out_dir, "_merged", ".vcf");
    ctx.run(
        &ctx.gatk("MergeVcfs")
            .repeated("-I", [&opts.vcf, &shifted_back])
            .opt("-O", &vcf),
    )?;

    info!("Merging Mutect2 stats...");
    let merged_stats = with_appended_extension(&vcf, ".stats");
    ctx.run(
        &ctx.gatk("MergeMutectStats")
            .repeated("-stats", [&stats, &shifted_stats])
            .opt("-O", &merged_stats),
    )?;

    let vcf_index = with_appended_extension(&vcf, ".idx");
    ensure_outputs("Merging VCF files", &[&vcf, &vcf_index, &merged_stats])?;

    Ok(MergeOutputs {
        vcf,
        vcf_index,
        stats: merged_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_stats_path() {
        assert_eq!(
            default_stats_path(Path::new("tmp/call/NA12878_shifted.vcf")),
            PathBuf::from("tmp/call/NA12878_shifted.vcf.stats")
        );
    }
}
