use std::path::PathBuf;

use log::info;

use mitors_core::MtReference;
use mitors_core::utils::create_output_path;

use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::PipelineResult;
use crate::executable::Invocation;

#[derive(Debug, Clone, PartialEq)]
pub struct HaplogroupOptions {
    pub vcf: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HaplogroupOutputs {
    pub haplogroups: PathBuf,
}

/// Classify the sample haplogroup with haplogrep3 against the phylotree of the reference in use.
pub fn run_haplogroup(
    ctx: &StageContext,
    opts: &HaplogroupOptions,
) -> PipelineResult<HaplogroupOutputs> {
    ensure_inputs(&[&opts.vcf])?;
    std::fs::create_dir_all(&opts.out_dir)?;

    let tree = ctx.reference.reference.phylotree();

    // haplogrep3 ships the rCRS tree only
    if ctx.reference.reference == MtReference::Rsrs {
        info!("Downloading phylotree for RSRS reference...");
        ctx.run(
            &Invocation::new(&ctx.tools.haplogrep3)
                .subcommand("install-tree")
                .arg(tree),
        )?;
    }

    info!("Identifying haplogroup using Haplogrep3...");
    let haplogroups = create_output_path(&opts.prefix, &opts.out_dir, "_haplogroup", ".txt");
    ctx.run(
        &Invocation::new(&ctx.tools.haplogrep3)
            .subcommand("classify")
            .opt("--tree", tree)
            .opt("--in", &opts.vcf)
            .opt("--out", &haplogroups),
    )?;

    ensure_outputs("Haplogroup identification", &[&haplogroups])?;

    Ok(HaplogroupOutputs { haplogroups })
}
