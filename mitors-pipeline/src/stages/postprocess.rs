use std::path::{Path, PathBuf};

use log::{debug, info};

use mitors_core::config::PostprocessSettings;
use mitors_core::utils::{create_output_path, with_appended_extension};

use super::merge::default_stats_path;
use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::{PipelineError, PipelineResult};
use crate::executable::Invocation;

pub const CONTAMINATION_COLUMN: &str = "Contamination Level";
const HAPLOCHECK_PREFIX: &str = "tmp_haplo";
const NOT_DETECTED: &str = "ND";

#[derive(Debug, Clone, PartialEq)]
pub struct PostprocessOptions {
    pub vcf: PathBuf,
    /// Mutect2 stats; defaults to the stats file next to the VCF.
    pub stats: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub prefix: String,
    pub settings: PostprocessSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostprocessOutputs {
    pub vcf: PathBuf,
    pub vcf_index: PathBuf,
}

///
/// Read the contamination level from a haplocheck `--raw` report. A level
/// of `ND` (not detected) is reported as zero.
///
pub fn read_contamination(path: &Path) -> PipelineResult<f64> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == CONTAMINATION_COLUMN)
        .ok_or_else(|| {
            PipelineError::contamination(path, format!("no '{}' column", CONTAMINATION_COLUMN))
        })?;

    let record = reader
        .records()
        .next()
        .ok_or_else(|| PipelineError::contamination(path, "no samples in report"))??;

    let level = record.get(column).map(str::trim).unwrap_or(NOT_DETECTED);
    if level == NOT_DETECTED {
        return Ok(0.0);
    }

    level.parse::<f64>().map_err(|_| {
        PipelineError::contamination(path, format!("invalid contamination level '{}'", level))
    })
}

fn estimate_contamination(ctx: &StageContext, vcf: &Path, out_dir: &Path) -> PipelineResult<f64> {
    info!("Estimating sample contamination level using Haplocheck...");
    let out_prefix = out_dir.join(HAPLOCHECK_PREFIX);
    ctx.run(
        &Invocation::new(&ctx.tools.haplocheck)
            .flag("--raw")
            .opt("--out", &out_prefix)
            .arg(vcf),
    )?;

    let contamination = read_contamination(&with_appended_extension(&out_prefix, ".raw.txt"))?;

    for entry in std::fs::read_dir(out_dir)? {
        let path = entry?.path();
        let is_haplocheck_output = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(HAPLOCHECK_PREFIX));
        if is_haplocheck_output && path.is_file() {
            std::fs::remove_file(&path)?;
        }
    }

    debug!("Contamination estimate: {}", contamination);
    Ok(contamination)
}

///
/// Filter the merged calls: Mutect2 filters (with an optional contamination
/// estimate), blacklist masking, optional NuMT filtering, optional
/// multi-allelic splitting and optional removal of non-PASS calls.
///
pub fn run_postprocess(
    ctx: &StageContext,
    opts: &PostprocessOptions,
) -> PipelineResult<PostprocessOutputs> {
    let settings = &opts.settings;
    let stats = opts
        .stats
        .clone()
        .unwrap_or_else(|| default_stats_path(&opts.vcf));
    let blacklist = settings
        .blacklisted_sites
        .clone()
        .unwrap_or_else(|| ctx.reference.blacklist.clone());

    ensure_inputs(&[&opts.vcf, &stats, &blacklist])?;
    std::fs::create_dir_all(&opts.out_dir)?;

    let out_dir = &opts.out_dir;
    let prefix = &opts.prefix;
    let fasta = &ctx.reference.fasta;

    let contamination = if settings.contamination_filter {
        estimate_contamination(ctx, &opts.vcf, out_dir)?
    } else {
        0.0
    };

    info!("Filtering variants by parameters...");
    let filtered = create_output_path(prefix, out_dir, "_filtered", ".vcf");
    ctx.run(
        &ctx.gatk("FilterMutectCalls")
            .opt("-V", &opts.vcf)
            .opt("-R", fasta)
            .opt("-O", &filtered)
            .opt("--stats", &stats)
            .opt("--max-alt-allele-count", settings.max_alt_allele_count.to_string())
            .flag("--mitochondria-mode")
            .opt("--min-allele-fraction", settings.vaf_threshold.to_string())
            .opt("--f-score-beta", settings.f_score_beta.to_string())
            .opt("--contamination-estimate", contamination.to_string()),
    )?;

    info!("Filtering blacklisted sites...");
    let mut final_vcf = create_output_path(prefix, out_dir, "_blacklisted", ".vcf");
    ctx.run(
        &ctx.gatk("VariantFiltration")
            .opt("-V", &filtered)
            .opt("-O", &final_vcf)
            .flag("--apply-allele-specific-filters")
            .opt("--mask", &blacklist)
            .opt("--mask-name", "blacklisted_site"),
    )?;

    if settings.autosomal_coverage != 0.0 {
        info!("Filtering NuMTs...");
        let numt = create_output_path(prefix, out_dir, "_numt", ".vcf");
        ctx.run(
            &ctx.gatk("NuMTFilterTool")
                .opt("-R", fasta)
                .opt("-V", &final_vcf)
                .opt("-O", &numt)
                .opt("--autosomal-coverage", settings.autosomal_coverage.to_string()),
        )?;
        final_vcf = numt;
    }

    if settings.normalize {
        info!("Splitting multi-allelic sites and left-aligning variant calls...");
        let normalized = create_output_path(prefix, out_dir, "_normalized", ".vcf");
        ctx.run(
            &ctx.gatk("LeftAlignAndTrimVariants")
                .opt("-R", fasta)
                .opt("-V", &final_vcf)
                .opt("-O", &normalized)
                .flag("--split-multi-allelics")
                .flag("--dont-trim-alleles")
                .flag("--keep-original-ac"),
        )?;
        final_vcf = normalized;
    }

    if settings.remove_non_pass {
        info!("Removing non pass variants...");
        let pass = create_output_path(prefix, out_dir, "_pass", ".vcf");
        ctx.run(
            &ctx.gatk("SelectVariants")
                .opt("-V", &final_vcf)
                .opt("-O", &pass)
                .flag("--exclude-filtered"),
        )?;
        final_vcf = pass;
    }

    let final_index = with_appended_extension(&final_vcf, ".idx");
    ensure_outputs("Variant filtering", &[&final_vcf, &final_index])?;

    let vcf = create_output_path(prefix, out_dir, "_postprocessed", ".vcf");
    let vcf_index = with_appended_extension(&vcf, ".idx");
    std::fs::rename(&final_vcf, &vcf)?;
    std::fs::rename(&final_index, &vcf_index)?;

    ensure_outputs("Variants postprocessing", &[&vcf, &vcf_index])?;

    Ok(PostprocessOutputs { vcf, vcf_index })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const REPORT_HEADER: &str = "\"Sample\"\t\"Contamination Status\"\t\"Contamination Level\"\t\"Distance\"\n";

    #[rstest]
    #[case("\"NA12878\"\t\"YES\"\t\"0.0312\"\t\"12\"\n", 0.0312)]
    #[case("\"NA12878\"\t\"NO\"\t\"ND\"\t\"0\"\n", 0.0)]
    fn test_read_contamination(#[case] row: &str, #[case] expected: f64) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp_haplo.raw.txt");
        std::fs::write(&path, format!("{}{}", REPORT_HEADER, row)).unwrap();

        assert_eq!(read_contamination(&path).unwrap(), expected);
    }

    #[rstest]
    fn test_empty_report_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp_haplo.raw.txt");
        std::fs::write(&path, REPORT_HEADER).unwrap();

        assert!(matches!(
            read_contamination(&path),
            Err(PipelineError::Contamination { .. })
        ));
    }
}
