use clap::Command;

use crate::shared::{annotation_args, config_args, input_arg, tool_arg};

pub const ANNOTATE_CMD: &str = "annotate";

pub fn create_annotate_cli() -> Command {
    Command::new(ANNOTATE_CMD)
        .about("Annotate variants with snpEff and the mitochondrial annotation tables.")
        .arg(input_arg("vcf", "Postprocessed VCF file"))
        .args(config_args())
        .args(annotation_args())
        .arg(tool_arg("snpeff-path"))
}
