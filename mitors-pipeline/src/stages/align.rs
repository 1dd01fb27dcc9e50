use std::path::PathBuf;

use log::info;

use mitors_core::utils::{create_output_path, with_appended_extension};

use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::PipelineResult;
use crate::executable::Invocation;

pub const SHIFTED_SUFFIX: &str = "_shifted";

#[derive(Debug, Clone, PartialEq)]
pub struct AlignOptions {
    pub ubam: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
    /// Align against the shifted reference.
    pub shifted: bool,
    /// Worker threads; zero or negative uses every available core.
    pub ncores: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignOutputs {
    pub bam: PathBuf,
    pub bai: PathBuf,
}

/// Thread count for bwa-mem2.
fn bwa_threads(ncores: i32) -> usize {
    match usize::try_from(ncores) {
        Ok(n) if n > 0 => n,
        _ => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    }
}

/// Spark master for MarkDuplicatesSpark, `local[*]` for all cores.
fn spark_master(ncores: i32) -> String {
    if ncores > 0 {
        format!("local[{}]", ncores)
    } else {
        "local[*]".to_string()
    }
}

///
/// Re-align the unmapped mitochondrial reads to the canonical or shifted
/// reference, merge the alignment with the uBAM and mark duplicates.
///
pub fn run_align(ctx: &StageContext, opts: &AlignOptions) -> PipelineResult<AlignOutputs> {
    ensure_inputs(&[&opts.ubam])?;
    std::fs::create_dir_all(&opts.out_dir)?;

    let prefix = if opts.shifted {
        format!("{}{}", opts.prefix, SHIFTED_SUFFIX)
    } else {
        opts.prefix.clone()
    };
    let out_dir = &opts.out_dir;
    let fasta = ctx.reference.fasta_for(opts.shifted);

    info!("Converting uBAM to FASTQ format for alignment...");
    let fastq = create_output_path(&prefix, out_dir, "", ".fq");
    ctx.run(
        &ctx.gatk("SamToFastq")
            .opt("-I", &opts.ubam)
            .opt("-F", &fastq)
            .flag("--INTERLEAVE")
            .flag("--INCLUDE_NON_PF_READS"),
    )?;

    info!(
        "Aligning to mitochondrial reference genome {}...",
        ctx.reference.reference
    );
    let sam = create_output_path(&prefix, out_dir, "", ".sam");
    ctx.run(
        &Invocation::new(&ctx.tools.bwamem2)
            .subcommand("mem")
            .flag("-p")
            .opt("-v", "3")
            .opt("-t", bwa_threads(opts.ncores).to_string())
            .opt("-K", "100000000")
            .flag("-Y")
            .opt("-o", &sam)
            .arg(fasta)
            .arg(&fastq),
    )?;

    info!("Merging aligned SAM with uBAM...");
    let merged = create_output_path(&prefix, out_dir, "_merged", ".bam");
    ctx.run(
        &ctx.gatk("MergeBamAlignment")
            .opt("--ALIGNED_BAM", &sam)
            .opt("--UNMAPPED_BAM", &opts.ubam)
            .opt("--REFERENCE_SEQUENCE", fasta)
            .opt("--OUTPUT", &merged)
            .opt("--VALIDATION_STRINGENCY", "SILENT")
            .opt("--EXPECTED_ORIENTATIONS", "FR")
            .opt("--ATTRIBUTES_TO_RETAIN", "X0")
            .repeated("--ATTRIBUTES_TO_REMOVE", ["NM", "MD"])
            .opt("--SORT_ORDER", "queryname")
            .opt("--CLIP_ADAPTERS", "false")
            .opt("--MAX_RECORDS_IN_RAM", "2000000")
            .opt("--MAX_INSERTIONS_OR_DELETIONS", "-1")
            .opt("--PRIMARY_ALIGNMENT_STRATEGY", "MostDistant")
            .opt("--UNMAPPED_READ_STRATEGY", "COPY_TO_TAG")
            .flag("--ALIGNER_PROPER_PAIR_FLAGS")
            .flag("--UNMAP_CONTAMINANT_READS")
            .opt("--ADD_PG_TAG_TO_READS", "false"),
    )?;

    info!("Marking duplicates and coordinate-sorting...");
    let bam = create_output_path(&prefix, out_dir, "_dedup", ".bam");
    let metrics = create_output_path(&prefix, out_dir, "", ".dedup.metrics.txt");
    ctx.run(
        &ctx.gatk("MarkDuplicatesSpark")
            .opt("-I", &merged)
            .opt("-O", &bam)
            .opt("-M", &metrics)
            .opt("--optical-duplicate-pixel-distance", "2500")
            .opt("--create-output-bam-splitting-index", "false")
            .opt("--spark-runner", "LOCAL")
            .opt("--spark-master", spark_master(opts.ncores)),
    )?;

    let bai = with_appended_extension(&bam, ".bai");
    ensure_outputs("Alignment", &[&bam, &bai])?;

    Ok(AlignOutputs { bam, bai })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(4, "local[4]")]
    #[case(0, "local[*]")]
    #[case(-1, "local[*]")]
    fn test_spark_master(#[case] ncores: i32, #[case] expected: &str) {
        assert_eq!(spark_master(ncores), expected);
    }

    #[rstest]
    fn test_bwa_threads() {
        assert_eq!(bwa_threads(8), 8);
        assert!(bwa_threads(-1) >= 1);
    }
}
