use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::coverage::{self, CoverageOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, output_location};

pub fn run_coverage(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let bam = input_path(matches, "bam")?;
    let shifted_bam = input_path(matches, "shifted_bam")?;
    let (out_dir, prefix) = output_location(matches, &bam);

    let mut opts = CoverageOptions::new(&bam, &shifted_bam, &out_dir, &prefix);
    opts.settings = config.coverage.clone();
    if let Some(contig) = matches.get_one::<String>("contig-name") {
        opts.contig = contig.clone();
    }

    let outputs = coverage::run_coverage(&ctx, &opts)
        .with_context(|| format!("Failed to compute coverage of {}", bam.display()))?;

    info!("Coverage: {}", outputs.csv.display());

    Ok(())
}
