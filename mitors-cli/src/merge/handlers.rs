use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::merge::{self, MergeOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, optional_path, output_location};

pub fn run_merge(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let vcf = input_path(matches, "vcf")?;
    let shifted_vcf = input_path(matches, "shifted_vcf")?;
    let (out_dir, prefix) = output_location(matches, &vcf);

    let outputs = merge::run_merge(
        &ctx,
        &MergeOptions {
            vcf,
            shifted_vcf,
            stats: optional_path(matches, "stats"),
            shifted_stats: optional_path(matches, "shifted-stats"),
            out_dir,
            prefix,
        },
    )
    .with_context(|| "Failed to merge variant calls")?;

    info!("Merged variants: {}", outputs.vcf.display());
    info!("Merged stats: {}", outputs.stats.display());

    Ok(())
}
