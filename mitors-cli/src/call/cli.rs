use clap::{Command, arg};

use crate::shared::{config_args, input_arg, m2_extra_args_arg, tool_arg};

pub const CALL_CMD: &str = "call";

pub fn create_call_cli() -> Command {
    Command::new(CALL_CMD)
        .about("Call variants with Mutect2 in mitochondrial mode.")
        .arg(input_arg("bam", "Aligned and deduplicated BAM file"))
        .arg(arg!(--shifted "Call the control region of an alignment to the shifted reference"))
        .args(config_args())
        .arg(m2_extra_args_arg())
        .arg(tool_arg("gatk-path"))
}
