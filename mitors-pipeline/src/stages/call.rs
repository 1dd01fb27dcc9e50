use std::path::PathBuf;

use log::info;

use mitors_core::consts::{CONTROL_REGION, NON_CONTROL_REGION};
use mitors_core::utils::{create_output_path, with_appended_extension};

use super::align::SHIFTED_SUFFIX;
use super::preprocess::MATE_READ_FILTERS;
use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::PipelineResult;

#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    pub bam: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
    /// Call the control region against the shifted reference.
    pub shifted: bool,
    /// Passed to Mutect2 after the built-in options.
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallOutputs {
    pub vcf: PathBuf,
    pub vcf_index: PathBuf,
    pub stats: PathBuf,
}

/// Calling interval: the control region on the shifted reference, the rest on the canonical one.
pub fn calling_interval(shifted: bool) -> &'static str {
    if shifted {
        CONTROL_REGION
    } else {
        NON_CONTROL_REGION
    }
}

pub fn run_call(ctx: &StageContext, opts: &CallOptions) -> PipelineResult<CallOutputs> {
    ensure_inputs(&[&opts.bam])?;
    std::fs::create_dir_all(&opts.out_dir)?;

    let prefix = if opts.shifted {
        format!("{}{}", opts.prefix, SHIFTED_SUFFIX)
    } else {
        opts.prefix.clone()
    };

    let vcf = create_output_path(&prefix, &opts.out_dir, "", ".vcf");

    info!("Calling variants with Mutect2 in mitochondria mode...");
    ctx.run(
        &ctx.gatk("Mutect2")
            .opt("-I", &opts.bam)
            .opt("-R", ctx.reference.fasta_for(opts.shifted))
            .opt("-O", &vcf)
            .repeated("--read-filter", MATE_READ_FILTERS)
            .opt("--annotation", "StrandBiasBySample")
            .flag("--mitochondria-mode")
            .opt("--max-reads-per-alignment-start", "75")
            .opt("--max-mnp-distance", "0")
            .opt("-L", calling_interval(opts.shifted))
            .args_from(&opts.extra_args),
    )?;

    let vcf_index = with_appended_extension(&vcf, ".idx");
    let stats = with_appended_extension(&vcf, ".stats");
    ensure_outputs("Variant calling", &[&vcf, &vcf_index, &stats])?;

    Ok(CallOutputs {
        vcf,
        vcf_index,
        stats,
    })
}
