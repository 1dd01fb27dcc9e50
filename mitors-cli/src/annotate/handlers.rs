use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use mitors_pipeline::stages::annotate::{self, AnnotateOptions};
use mitors_pipeline::{StageContext, SystemRunner};

use crate::shared::{input_path, load_config, output_location};

pub fn run_annotate(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let reference = config.reference_config();
    let runner = SystemRunner::new(config.verbose);
    let ctx = StageContext::new(&runner, &config.tools, &reference);

    let vcf = input_path(matches, "vcf")?;
    let (out_dir, prefix) = output_location(matches, &vcf);

    let outputs = annotate::run_annotate(
        &ctx,
        &AnnotateOptions {
            vcf: vcf.clone(),
            out_dir,
            prefix,
            resources: config.annotation_resources(),
            settings: config.annotation.clone(),
            genome_length: config.genome_length(),
        },
    )
    .with_context(|| format!("Failed to annotate {}", vcf.display()))?;

    info!("Annotated variants: {}", outputs.vcf.display());
    if let Some(csv) = outputs.csv {
        info!("Report: {}", csv.display());
    }

    Ok(())
}
