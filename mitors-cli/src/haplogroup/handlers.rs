use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::haplogroup::{self, HaplogroupOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, output_location};

pub fn run_haplogroup(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let vcf = input_path(matches, "vcf")?;
    let (out_dir, prefix) = output_location(matches, &vcf);

    let outputs = haplogroup::run_haplogroup(
        &ctx,
        &HaplogroupOptions {
            vcf: vcf.clone(),
            out_dir,
            prefix,
        },
    )
    .with_context(|| format!("Failed to classify the haplogroup of {}", vcf.display()))?;

    info!("Haplogroups: {}", outputs.haplogroups.display());

    Ok(())
}
