use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::preprocess::{self, PreprocessOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, optional_path, output_location};

pub fn run_preprocess(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let bam = input_path(matches, "bam")?;
    let (out_dir, prefix) = output_location(matches, &bam);

    let outputs = preprocess::run_preprocess(
        &ctx,
        &PreprocessOptions {
            bam: bam.clone(),
            bai: optional_path(matches, "bai"),
            reference_fa: optional_path(matches, "reference-fa"),
            contig_name: matches.get_one::<String>("contig-name").cloned(),
            out_dir,
            prefix,
        },
    )
    .with_context(|| format!("Failed to preprocess {}", bam.display()))?;

    info!("Unmapped BAM: {}", outputs.unmapped_bam.display());

    Ok(())
}
