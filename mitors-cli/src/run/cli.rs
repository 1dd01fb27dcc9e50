use std::path::PathBuf;

use clap::{Command, arg, value_parser};

use crate::shared::{
    annotation_args, config_args, input_arg, m2_extra_args_arg, ncores_arg, postprocess_args,
    tool_arg,
};

pub const RUN_CMD: &str = "run";

pub fn create_run_cli() -> Command {
    Command::new(RUN_CMD)
        .about("Run the full pipeline: preprocess, align, call, merge, postprocess, coverage, annotate and haplogroup.")
        .arg(input_arg("bam", "Input BAM or CRAM file"))
        .arg(arg!(--bai <bai> "Index of the input alignment").value_parser(value_parser!(PathBuf)))
        .arg(
            arg!(--"reference-fa" <fasta> "Reference FASTA of the input alignment, required for CRAM")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--"contig-name" <name> "Name of the mitochondrial contig in the input"))
        .arg(arg!(--"tmp-dir" <dir> "Directory for intermediate files, relative to the output directory"))
        .arg(arg!(--"remove-tmp" "Remove intermediate files once the final outputs are written"))
        .args(config_args())
        .arg(ncores_arg())
        .arg(m2_extra_args_arg())
        .args(postprocess_args())
        .args(annotation_args())
        .arg(tool_arg("gatk-path"))
        .arg(tool_arg("bwamem2-path"))
        .arg(tool_arg("samtools-path"))
        .arg(tool_arg("snpeff-path"))
        .arg(tool_arg("haplogrep3-path"))
        .arg(tool_arg("haplocheck-path"))
        .arg(tool_arg("mosdepth-path"))
}
