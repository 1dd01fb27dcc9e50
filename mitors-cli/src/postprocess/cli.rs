use std::path::PathBuf;

use clap::{Command, arg, value_parser};

use crate::shared::{config_args, input_arg, postprocess_args, tool_arg};

pub const POSTPROCESS_CMD: &str = "postprocess";

pub fn create_postprocess_cli() -> Command {
    Command::new(POSTPROCESS_CMD)
        .about("Filter merged calls, optionally removing NuMTs and normalizing multi-allelic sites.")
        .arg(input_arg("vcf", "Merged VCF file"))
        .arg(
            arg!(--stats <stats> "Mutect2 stats of the merged calls [default: <vcf>.stats]")
                .value_parser(value_parser!(PathBuf)),
        )
        .args(config_args())
        .args(postprocess_args())
        .arg(tool_arg("gatk-path"))
        .arg(tool_arg("haplocheck-path"))
}
