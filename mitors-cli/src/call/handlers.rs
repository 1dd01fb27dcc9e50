use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::call::{self, CallOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, output_location};

pub fn run_call(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let bam = input_path(matches, "bam")?;
    let (out_dir, prefix) = output_location(matches, &bam);

    let outputs = call::run_call(
        &ctx,
        &CallOptions {
            bam: bam.clone(),
            out_dir,
            prefix,
            shifted: matches.get_flag("shifted"),
            extra_args: config.calling.m2_extra_args.clone(),
        },
    )
    .with_context(|| format!("Failed to call variants on {}", bam.display()))?;

    info!("Variants: {}", outputs.vcf.display());
    info!("Mutect2 stats: {}", outputs.stats.display());

    Ok(())
}
