use std::path::PathBuf;

use clap::{Command, arg, value_parser};

use crate::shared::{config_args, input_arg, tool_arg};

pub const MERGE_CMD: &str = "merge";

pub fn create_merge_cli() -> Command {
    Command::new(MERGE_CMD)
        .about("Lift control region calls back to canonical coordinates and merge them with the non-control region calls.")
        .arg(input_arg("vcf", "Calls against the canonical reference"))
        .arg(input_arg("shifted_vcf", "Calls against the shifted reference"))
        .arg(
            arg!(--stats <stats> "Mutect2 stats of the canonical calls [default: <vcf>.stats]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"shifted-stats" <stats> "Mutect2 stats of the shifted calls [default: <shifted_vcf>.stats]")
                .value_parser(value_parser!(PathBuf)),
        )
        .args(config_args())
        .arg(tool_arg("gatk-path"))
}
