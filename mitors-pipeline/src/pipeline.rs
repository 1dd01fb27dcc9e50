use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use mitors_core::PipelineConfig;
use mitors_core::utils::missing_files;

use crate::executable::CommandRunner;
use crate::stages::align::{AlignOptions, run_align};
use crate::stages::annotate::{AnnotateOptions, run_annotate};
use crate::stages::call::{CallOptions, run_call};
use crate::stages::coverage::{CoverageOptions, run_coverage};
use crate::stages::haplogroup::{HaplogroupOptions, run_haplogroup};
use crate::stages::merge::{MergeOptions, run_merge};
use crate::stages::postprocess::{PostprocessOptions, run_postprocess};
use crate::stages::preprocess::{PreprocessOptions, run_preprocess};
use crate::stages::{StageContext, ensure_inputs, output_location};

pub const RESULTS_DIR: &str = "results";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInput {
    pub bam: PathBuf,
    pub bai: Option<PathBuf>,
    pub reference_fa: Option<PathBuf>,
    pub contig_name: Option<String>,
    pub out_dir: PathBuf,
    pub prefix: String,
}

impl PipelineInput {
    /// Output directory and prefix default to the directory and basename of the alignment.
    pub fn new(bam: &Path, out_dir: Option<&Path>, prefix: Option<&str>) -> Self {
        let (out_dir, prefix) = output_location(bam, out_dir, prefix);
        PipelineInput {
            bam: bam.to_path_buf(),
            bai: None,
            reference_fa: None,
            contig_name: None,
            out_dir,
            prefix,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutputs {
    pub results_dir: PathBuf,
    /// Final outputs by name, at their location in the results directory.
    pub files: BTreeMap<String, PathBuf>,
}

///
/// Run every stage on one alignment.
///
/// Intermediates go to `<out_dir>/<tmp_dir>/<stage>`; the final outputs
/// are copied to `<out_dir>/results`.
///
/// # Arguments
/// - runner: executes the external tools
/// - config: pipeline configuration
/// - input: the alignment and where to write outputs
pub fn run_pipeline(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    input: &PipelineInput,
) -> Result<PipelineOutputs> {
    let reference = config.reference_config();
    ensure_inputs(&reference.required_files()).with_context(|| {
        format!(
            "Missing {} reference files under {}",
            reference.reference,
            config.data_dir.display()
        )
    })?;

    let intermediates = input.out_dir.join(&config.tmp_dir);
    let results_dir = input.out_dir.join(RESULTS_DIR);
    std::fs::create_dir_all(&intermediates)
        .with_context(|| format!("Failed to create {}", intermediates.display()))?;
    std::fs::create_dir_all(&results_dir)
        .with_context(|| format!("Failed to create {}", results_dir.display()))?;

    let ctx = StageContext::new(runner, &config.tools, &reference);
    let prefix = &input.prefix;
    let stage_dir = |stage: &str| intermediates.join(stage);

    info!("Running mitors pipeline on {}", input.bam.display());

    let preprocessed = run_preprocess(
        &ctx,
        &PreprocessOptions {
            bam: input.bam.clone(),
            bai: input.bai.clone(),
            reference_fa: input.reference_fa.clone(),
            contig_name: input.contig_name.clone(),
            out_dir: stage_dir("preprocess"),
            prefix: prefix.clone(),
        },
    )
    .with_context(|| format!("Failed to preprocess {}", input.bam.display()))?;

    let align = |shifted: bool| {
        run_align(
            &ctx,
            &AlignOptions {
                ubam: preprocessed.unmapped_bam.clone(),
                out_dir: stage_dir("align"),
                prefix: prefix.clone(),
                shifted,
                ncores: config.ncores,
            },
        )
    };
    let aligned = align(false).with_context(|| "Failed to align to the canonical reference")?;
    let aligned_shifted = align(true).with_context(|| "Failed to align to the shifted reference")?;

    let call = |bam: &Path, shifted: bool| {
        run_call(
            &ctx,
            &CallOptions {
                bam: bam.to_path_buf(),
                out_dir: stage_dir("call"),
                prefix: prefix.clone(),
                shifted,
                extra_args: config.calling.m2_extra_args.clone(),
            },
        )
    };
    let called = call(&aligned.bam, false).with_context(|| "Failed to call the non-control region")?;
    let called_shifted =
        call(&aligned_shifted.bam, true).with_context(|| "Failed to call the control region")?;

    let merged = run_merge(
        &ctx,
        &MergeOptions {
            vcf: called.vcf.clone(),
            shifted_vcf: called_shifted.vcf.clone(),
            stats: Some(called.stats.clone()),
            shifted_stats: Some(called_shifted.stats.clone()),
            out_dir: stage_dir("merge"),
            prefix: prefix.clone(),
        },
    )
    .with_context(|| "Failed to merge variant calls")?;

    let postprocessed = run_postprocess(
        &ctx,
        &PostprocessOptions {
            vcf: merged.vcf.clone(),
            stats: Some(merged.stats.clone()),
            out_dir: stage_dir("postprocess"),
            prefix: prefix.clone(),
            settings: config.postprocess.clone(),
        },
    )
    .with_context(|| "Failed to postprocess variant calls")?;

    let mut coverage_opts = CoverageOptions::new(
        &aligned.bam,
        &aligned_shifted.bam,
        &stage_dir("coverage"),
        prefix,
    );
    coverage_opts.settings = config.coverage.clone();
    let coverage =
        run_coverage(&ctx, &coverage_opts).with_context(|| "Failed to compute coverage")?;

    let annotated = run_annotate(
        &ctx,
        &AnnotateOptions {
            vcf: postprocessed.vcf.clone(),
            out_dir: stage_dir("annotate"),
            prefix: prefix.clone(),
            resources: config.annotation_resources(),
            settings: config.annotation.clone(),
            genome_length: config.genome_length(),
        },
    )
    .with_context(|| "Failed to annotate variant calls")?;

    let haplogroup = run_haplogroup(
        &ctx,
        &HaplogroupOptions {
            vcf: postprocessed.vcf.clone(),
            out_dir: stage_dir("haplogroup"),
            prefix: prefix.clone(),
        },
    )
    .with_context(|| "Failed to identify haplogroup")?;

    let mut final_outputs: BTreeMap<String, PathBuf> = BTreeMap::from([
        ("dedup_sorted_bam".to_string(), aligned.bam),
        ("dedup_sorted_bai".to_string(), aligned.bai),
        ("shifted_dedup_sorted_bam".to_string(), aligned_shifted.bam),
        ("shifted_dedup_sorted_bai".to_string(), aligned_shifted.bai),
        ("postprocessed_vcf".to_string(), postprocessed.vcf),
        ("postprocessed_vcf_idx".to_string(), postprocessed.vcf_index),
        ("coverage_csv".to_string(), coverage.csv),
        ("annotated_vcf".to_string(), annotated.vcf),
        ("haplogroups".to_string(), haplogroup.haplogroups),
    ]);
    if let Some(csv) = annotated.csv {
        final_outputs.insert("annotated_csv".to_string(), csv);
    }

    let mut files = BTreeMap::new();
    for (name, path) in final_outputs {
        let file_name = path
            .file_name()
            .with_context(|| format!("Output {} has no file name", path.display()))?;
        let target = results_dir.join(file_name);
        std::fs::copy(&path, &target).with_context(|| {
            format!("Failed to copy {} to {}", path.display(), target.display())
        })?;
        files.insert(name, target);
    }

    if config.remove_tmp {
        std::fs::remove_dir_all(&intermediates)
            .with_context(|| format!("Failed to remove {}", intermediates.display()))?;
    }

    let missing = missing_files(&files.values().collect::<Vec<_>>());
    if !missing.is_empty() {
        anyhow::bail!("Some output files are missing: {:?}", missing);
    }

    info!(
        "mitors pipeline completed successfully! See the final results: {}",
        results_dir.display()
    );

    Ok(PipelineOutputs { results_dir, files })
}
