use clap::{Command, arg};

use crate::shared::{config_args, input_arg, tool_arg};

pub const COVERAGE_CMD: &str = "coverage";

pub fn create_coverage_cli() -> Command {
    Command::new(COVERAGE_CMD)
        .about("Per-base coverage over the whole mitochondrial genome, stitched from both alignments.")
        .arg(input_arg("bam", "Alignment against the canonical reference"))
        .arg(input_arg("shifted_bam", "Alignment against the shifted reference"))
        .arg(arg!(--"contig-name" <name> "Contig name written to the coverage table"))
        .args(config_args())
        .arg(tool_arg("mosdepth-path"))
}
