//! Arguments shared by every subcommand and the mapping from parsed
//! arguments onto a [`PipelineConfig`]. Values given on the command line
//! override the configuration file.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, arg, value_parser};

use mitors_core::{MtReference, PipelineConfig};

pub fn config_args() -> Vec<Arg> {
    vec![
        arg!(-c --config <config> "TOML configuration file")
            .value_parser(value_parser!(PathBuf)),
        arg!(-d --"data-dir" <dir> "Directory holding the reference, filter and annotation data")
            .value_parser(value_parser!(PathBuf)),
        arg!(-r --"mt-ref" <reference> "Mitochondrial reference (rcrs or rsrs)"),
        arg!(-o --"out-dir" <dir> "Output directory [default: directory of the input]")
            .value_parser(value_parser!(PathBuf)),
        arg!(-p --prefix <prefix> "Prefix of output files [default: basename of the input]"),
        arg!(-v --verbose "Show the output of the underlying tools"),
    ]
}

pub fn tool_arg(tool: &'static str) -> Arg {
    Arg::new(tool)
        .long(tool)
        .value_name("path")
        .help("Path to the executable")
}

pub fn ncores_arg() -> Arg {
    arg!(-t --ncores <n> "Number of threads, -1 for all available")
        .value_parser(value_parser!(i32))
        .allow_negative_numbers(true)
}

pub fn m2_extra_args_arg() -> Arg {
    arg!(--"m2-extra-args" <args> "Extra arguments passed to Mutect2, space separated")
        .allow_hyphen_values(true)
}

pub fn postprocess_args() -> Vec<Arg> {
    vec![
        arg!(--"f-score-beta" <beta> "F-score beta used by FilterMutectCalls")
            .value_parser(value_parser!(f64)),
        arg!(--"no-contamination-filter" "Skip the haplocheck contamination estimate"),
        arg!(--"max-alt-allele-count" <n> "Maximum number of alternate alleles")
            .value_parser(value_parser!(u32)),
        arg!(--"vaf-threshold" <fraction> "Minimum variant allele fraction")
            .value_parser(value_parser!(f64)),
        arg!(--"autosomal-coverage" <depth> "Median autosomal coverage, enables NuMT filtering")
            .value_parser(value_parser!(f64)),
        arg!(--"blacklisted-sites" <bed> "BED file of blacklisted sites [default: reference blacklist]")
            .value_parser(value_parser!(PathBuf)),
        arg!(--"keep-non-pass" "Keep variants that fail a filter"),
        arg!(--"no-normalize" "Do not split multi-allelic sites or left-align calls"),
    ]
}

pub fn annotation_args() -> Vec<Arg> {
    vec![
        arg!(--"min-hom-threshold" <fraction> "Minimum allele fraction of a homoplasmic call")
            .value_parser(value_parser!(f64)),
        arg!(--"no-population-freqs" "Skip gnomAD population frequencies"),
        arg!(--"no-patho-predictions" "Skip pathogenicity predictions"),
        arg!(--"no-phenotype-annot" "Skip MITOMAP and ClinVar phenotype annotations"),
        arg!(--"no-conservation-scores" "Skip conservation scores"),
        arg!(--"no-report" "Do not write the CSV report"),
    ]
}

pub fn input_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .help(help)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Set)
}

// arguments are only defined on the subcommands that use them
fn value<'a, T>(matches: &'a ArgMatches, id: &str) -> Option<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches.try_get_one::<T>(id).ok().flatten()
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    value::<bool>(matches, id).copied().unwrap_or(false)
}

pub fn input_path(matches: &ArgMatches, id: &str) -> Result<PathBuf> {
    value::<PathBuf>(matches, id)
        .cloned()
        .with_context(|| format!("Missing required argument <{}>", id))
}

pub fn optional_path(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    value::<PathBuf>(matches, id).cloned()
}

///
/// Output directory and prefix for a stage run on `input`.
///
pub fn output_location(matches: &ArgMatches, input: &Path) -> (PathBuf, String) {
    mitors_pipeline::output_location(
        input,
        value::<PathBuf>(matches, "out-dir").map(PathBuf::as_path),
        value::<String>(matches, "prefix").map(String::as_str),
    )
}

///
/// Read the configuration file (if any) and apply command line overrides.
///
pub fn load_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = match value::<PathBuf>(matches, "config") {
        Some(path) => PipelineConfig::try_from(path.as_path())
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = value::<PathBuf>(matches, "data-dir") {
        config.data_dir = dir.clone();
    }
    if let Some(reference) = value::<String>(matches, "mt-ref") {
        config.reference = reference.parse::<MtReference>()?;
    }
    if flag(matches, "verbose") {
        config.verbose = true;
    }
    if let Some(tmp_dir) = value::<String>(matches, "tmp-dir") {
        config.tmp_dir = tmp_dir.clone();
    }
    if flag(matches, "remove-tmp") {
        config.remove_tmp = true;
    }
    if let Some(ncores) = value::<i32>(matches, "ncores") {
        config.ncores = *ncores;
    }
    if let Some(extra) = value::<String>(matches, "m2-extra-args") {
        config.calling.m2_extra_args = extra.split_whitespace().map(str::to_string).collect();
    }

    let post = &mut config.postprocess;
    if let Some(beta) = value::<f64>(matches, "f-score-beta") {
        post.f_score_beta = *beta;
    }
    if flag(matches, "no-contamination-filter") {
        post.contamination_filter = false;
    }
    if let Some(count) = value::<u32>(matches, "max-alt-allele-count") {
        post.max_alt_allele_count = *count;
    }
    if let Some(vaf) = value::<f64>(matches, "vaf-threshold") {
        post.vaf_threshold = *vaf;
    }
    if let Some(coverage) = value::<f64>(matches, "autosomal-coverage") {
        post.autosomal_coverage = *coverage;
    }
    if let Some(bed) = value::<PathBuf>(matches, "blacklisted-sites") {
        post.blacklisted_sites = Some(bed.clone());
    }
    if flag(matches, "keep-non-pass") {
        post.remove_non_pass = false;
    }
    if flag(matches, "no-normalize") {
        post.normalize = false;
    }

    let annotation = &mut config.annotation;
    if let Some(threshold) = value::<f64>(matches, "min-hom-threshold") {
        annotation.min_hom_threshold = *threshold;
    }
    if flag(matches, "no-population-freqs") {
        annotation.population_freqs = false;
    }
    if flag(matches, "no-patho-predictions") {
        annotation.patho_predictions = false;
    }
    if flag(matches, "no-phenotype-annot") {
        annotation.phenotype_annot = false;
    }
    if flag(matches, "no-conservation-scores") {
        annotation.conservation_scores = false;
    }
    if flag(matches, "no-report") {
        annotation.create_report = false;
    }

    let tools = &mut config.tools;
    for (id, path) in [
        ("gatk-path", &mut tools.gatk),
        ("bwamem2-path", &mut tools.bwamem2),
        ("samtools-path", &mut tools.samtools),
        ("snpeff-path", &mut tools.snpeff),
        ("haplogrep3-path", &mut tools.haplogrep3),
        ("haplocheck-path", &mut tools.haplocheck),
        ("mosdepth-path", &mut tools.mosdepth),
    ] {
        if let Some(exec) = value::<String>(matches, id) {
            *path = exec.clone();
        }
    }

    Ok(config)
}
