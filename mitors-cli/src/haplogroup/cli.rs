use clap::Command;

use crate::shared::{config_args, input_arg, tool_arg};

pub const HAPLOGROUP_CMD: &str = "haplogroup";

pub fn create_haplogroup_cli() -> Command {
    Command::new(HAPLOGROUP_CMD)
        .about("Classify the mitochondrial haplogroup with haplogrep3.")
        .arg(input_arg("vcf", "Postprocessed VCF file"))
        .args(config_args())
        .arg(tool_arg("haplogrep3-path"))
}
