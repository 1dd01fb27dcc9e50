use std::path::PathBuf;

use log::info;

use mitors_annotate::vcf::read_records;
use mitors_annotate::{
    AnnotationFlags, AnnotationRegistry, AnnotationStore, ReportLayout, annotate_vcf, flatten,
};
use mitors_core::AnnotationResources;
use mitors_core::config::AnnotationSettings;
use mitors_core::utils::create_output_path;

use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::PipelineResult;
use crate::executable::Invocation;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateOptions {
    pub vcf: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
    pub resources: AnnotationResources,
    pub settings: AnnotationSettings,
    pub genome_length: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateOutputs {
    pub vcf: PathBuf,
    pub csv: Option<PathBuf>,
}

///
/// Functional annotation with snpEff followed by the annotation tables,
/// genotype assignment and (optionally) the flat CSV report.
///
/// The annotation tables are loaded before anything runs, so a missing
/// source fails the stage before any output is written.
///
pub fn run_annotate(ctx: &StageContext, opts: &AnnotateOptions) -> PipelineResult<AnnotateOutputs> {
    ensure_inputs(&[&opts.vcf, &opts.resources.snpeff_config])?;

    let flags = AnnotationFlags::from(&opts.settings);
    let store = AnnotationStore::load(
        &AnnotationRegistry::mitochondrial(),
        &opts.resources,
        &flags,
        opts.genome_length,
    )?;

    std::fs::create_dir_all(&opts.out_dir)?;

    info!("Performing functional annotation using SnpEff...");
    let snpeff_vcf = create_output_path(&opts.prefix, &opts.out_dir, "_snpeff", ".vcf");
    ctx.run(
        &Invocation::new(&ctx.tools.snpeff)
            .opt("-c", &opts.resources.snpeff_config)
            .flag("-noStats")
            .flag("-no-upstream")
            .flag("-no-downstream")
            .arg(&opts.resources.snpeff_db)
            .arg(&opts.vcf)
            .redirect(&snpeff_vcf),
    )?;
    ensure_outputs("Functional annotation", &[&snpeff_vcf])?;

    let vcf = create_output_path(&opts.prefix, &opts.out_dir, "_annotated", ".vcf");
    annotate_vcf(&snpeff_vcf, &vcf, &store, opts.settings.min_hom_threshold)?;

    let csv = if opts.settings.create_report {
        info!("Creating CSV report...");
        let (_, records) = read_records(&vcf)?;
        let report = flatten(&records, &ReportLayout::from_store(&store));

        let csv = create_output_path(&opts.prefix, &opts.out_dir, "_annotated", ".csv");
        report.write_csv(&csv)?;
        Some(csv)
    } else {
        None
    };

    let mut outputs = vec![&vcf];
    outputs.extend(csv.as_ref());
    ensure_outputs("Annotation", &outputs)?;

    Ok(AnnotateOutputs { vcf, csv })
}
