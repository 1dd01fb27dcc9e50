use anyhow::Result;
use clap::ArgMatches;
use log::info;

use mitors_pipeline::{PipelineInput, SystemRunner, run_pipeline};

use crate::shared::{input_path, load_config, optional_path, output_location};

pub fn run_full_pipeline(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let bam = input_path(matches, "bam")?;
    let (out_dir, prefix) = output_location(matches, &bam);

    let input = PipelineInput {
        bam,
        bai: optional_path(matches, "bai"),
        reference_fa: optional_path(matches, "reference-fa"),
        contig_name: matches.get_one::<String>("contig-name").cloned(),
        out_dir,
        prefix,
    };

    let outputs = run_pipeline(&SystemRunner::new(config.verbose), &config, &input)?;
    for (name, path) in &outputs.files {
        info!("{}: {}", name, path.display());
    }

    Ok(())
}
