use std::path::PathBuf;

use clap::{Command, arg, value_parser};

use crate::shared::{config_args, input_arg, tool_arg};

pub const PREPROCESS_CMD: &str = "preprocess";

pub fn create_preprocess_cli() -> Command {
    Command::new(PREPROCESS_CMD)
        .about("Extract mitochondrial reads from an alignment and revert them to an unmapped BAM.")
        .arg(input_arg("bam", "Input BAM or CRAM file"))
        .arg(arg!(--bai <bai> "Index of the input alignment").value_parser(value_parser!(PathBuf)))
        .arg(
            arg!(--"reference-fa" <fasta> "Reference FASTA of the input alignment, required for CRAM")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--"contig-name" <name> "Name of the mitochondrial contig in the input"))
        .args(config_args())
        .arg(tool_arg("gatk-path"))
        .arg(tool_arg("samtools-path"))
}
