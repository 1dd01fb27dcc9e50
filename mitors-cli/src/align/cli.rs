use clap::{Command, arg};

use crate::shared::{config_args, input_arg, ncores_arg, tool_arg};

pub const ALIGN_CMD: &str = "align";

pub fn create_align_cli() -> Command {
    Command::new(ALIGN_CMD)
        .about("Align an unmapped BAM to the mitochondrial reference and mark duplicates.")
        .arg(input_arg("ubam", "Unmapped BAM file"))
        .arg(arg!(--shifted "Align against the shifted reference"))
        .args(config_args())
        .arg(ncores_arg())
        .arg(tool_arg("gatk-path"))
        .arg(tool_arg("bwamem2-path"))
}
