use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::align::{self, AlignOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, output_location};

pub fn run_align(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let ubam = input_path(matches, "ubam")?;
    let (out_dir, prefix) = output_location(matches, &ubam);

    let outputs = align::run_align(
        &ctx,
        &AlignOptions {
            ubam: ubam.clone(),
            out_dir,
            prefix,
            shifted: matches.get_flag("shifted"),
            ncores: config.ncores,
        },
    )
    .with_context(|| format!("Failed to align {}", ubam.display()))?;

    info!("Aligned BAM: {}", outputs.bam.display());
    info!("Index: {}", outputs.bai.display());

    Ok(())
}
