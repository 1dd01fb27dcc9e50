use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::postprocess::{self, PostprocessOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, optional_path, output_location};

pub fn run_postprocess(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let vcf = input_path(matches, "vcf")?;
    let (out_dir, prefix) = output_location(matches, &vcf);

    let outputs = postprocess::run_postprocess(
        &ctx,
        &PostprocessOptions {
            vcf: vcf.clone(),
            stats: optional_path(matches, "stats"),
            out_dir,
            prefix,
            settings: config.postprocess.clone(),
        },
    )
    .with_context(|| format!("Failed to postprocess {}", vcf.display()))?;

    info!("Postprocessed variants: {}", outputs.vcf.display());

    Ok(())
}
