mod align;
mod annotate;
mod call;
mod coverage;
mod haplogroup;
mod merge;
mod postprocess;
mod preprocess;
mod run;
mod shared;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "mitors";
    pub const BIN_NAME: &str = "mitors";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Mitochondrial variant calling from whole genome sequencing alignments.")
        .subcommand_required(true)
        .subcommand(run::cli::create_run_cli())
        .subcommand(preprocess::cli::create_preprocess_cli())
        .subcommand(align::cli::create_align_cli())
        .subcommand(call::cli::create_call_cli())
        .subcommand(merge::cli::create_merge_cli())
        .subcommand(postprocess::cli::create_postprocess_cli())
        .subcommand(coverage::cli::create_coverage_cli())
        .subcommand(annotate::cli::create_annotate_cli())
        .subcommand(haplogroup::cli::create_haplogroup_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // FULL PIPELINE
        //
        Some((run::cli::RUN_CMD, matches)) => {
            run::handlers::run_full_pipeline(matches)?;
        }

        //
        // SINGLE STAGES
        //
        Some((preprocess::cli::PREPROCESS_CMD, matches)) => {
            preprocess::handlers::run_preprocess(matches)?;
        }
        Some((align::cli::ALIGN_CMD, matches)) => {
            align::handlers::run_align(matches)?;
        }
        Some((call::cli::CALL_CMD, matches)) => {
            call::handlers::run_call(matches)?;
        }
        Some((merge::cli::MERGE_CMD, matches)) => {
            merge::handlers::run_merge(matches)?;
        }
        Some((postprocess::cli::POSTPROCESS_CMD, matches)) => {
            postprocess::handlers::run_postprocess(matches)?;
        }
        Some((coverage::cli::COVERAGE_CMD, matches)) => {
            coverage::handlers::run_coverage(matches)?;
        }
        Some((annotate::cli::ANNOTATE_CMD, matches)) => {
            annotate::handlers::run_annotate(matches)?;
        }
        Some((haplogroup::cli::HAPLOGROUP_CMD, matches)) => {
            haplogroup::handlers::run_haplogroup(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    #[case(&["mitors", "run", "sample.bam", "--remove-tmp", "-t", "4"], "run")]
    #[case(&["mitors", "merge", "a.vcf", "b.vcf", "--stats", "a.vcf.stats"], "merge")]
    #[case(&["mitors", "align", "sample.ubam", "--shifted"], "align")]
    #[case(&["mitors", "annotate", "sample.vcf", "--no-report"], "annotate")]
    fn test_subcommands_parse(#[case] argv: &[&str], #[case] expected: &str) {
        let matches = build_parser().try_get_matches_from(argv).unwrap();
        assert_eq!(matches.subcommand_name(), Some(expected));
    }

    #[rstest]
    fn test_run_options_reach_the_config() {
        let matches = build_parser()
            .try_get_matches_from([
                "mitors",
                "run",
                "sample.bam",
                "--remove-tmp",
                "--tmp-dir",
                "scratch",
                "--mt-ref",
                "rsrs",
                "--no-population-freqs",
                "--vaf-threshold",
                "0.05",
            ])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        let config = shared::load_config(matches).unwrap();

        assert!(config.remove_tmp);
        assert_eq!(config.tmp_dir, "scratch");
        assert_eq!(config.reference, mitors_core::MtReference::Rsrs);
        assert!(!config.annotation.population_freqs);
        assert_eq!(config.postprocess.vaf_threshold, 0.05);
    }

    #[rstest]
    fn test_missing_input_is_rejected() {
        assert!(build_parser().try_get_matches_from(["mitors", "call"]).is_err());
    }
}
