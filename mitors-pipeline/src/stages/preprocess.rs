use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;
use noodles::{bam, sam};

use mitors_core::consts::MT_CONTIG_NAMES;
use mitors_core::utils::{create_output_path, file_basename, with_appended_extension};

use super::{StageContext, ensure_inputs, ensure_outputs};
use crate::errors::{PipelineError, PipelineResult};
use crate::executable::Invocation;

pub const MATE_READ_FILTERS: [&str; 2] = [
    "MateOnSameContigOrNoMappedMateReadFilter",
    "MateUnmappedAndUnmappedReadFilter",
];

const COORDINATE_SORT_ORDER: &str = "coordinate";

///
/// The parts of an alignment header the pipeline cares about.
///
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignmentHeader {
    pub sort_order: Option<String>,
    pub contigs: Vec<String>,
}

impl AlignmentHeader {
    ///
    /// Parse SAM header text (`@HD` sort order and `@SQ` names).
    ///
    pub fn from_sam_text(text: &str) -> Self {
        let mut header = AlignmentHeader::default();

        for line in text.lines() {
            let mut fields = line.split('\t');
            let kind = fields.next();
            for field in fields {
                match (kind, field.split_once(':')) {
                    (Some("@HD"), Some(("SO", value))) => {
                        header.sort_order = Some(value.to_string())
                    }
                    (Some("@SQ"), Some(("SN", value))) => header.contigs.push(value.to_string()),
                    _ => {}
                }
            }
        }

        header
    }

    /// Render through the SAM writer so BAM and CRAM headers share one parser.
    pub fn from_sam_header(header: &sam::Header) -> std::io::Result<Self> {
        let mut writer = sam::io::Writer::new(Vec::new());
        writer.write_header(header)?;
        let text = String::from_utf8_lossy(&writer.into_inner()).into_owned();
        Ok(Self::from_sam_text(&text))
    }

    pub fn read_bam(path: &Path) -> PipelineResult<Self> {
        let header_error = |message: String| PipelineError::AlignmentHeader {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path)?;
        let mut reader = bam::io::reader::Builder::default().build_from_reader(file);
        let header = reader
            .read_header()
            .map_err(|e| header_error(e.to_string()))?;

        Self::from_sam_header(&header).map_err(|e| header_error(e.to_string()))
    }

    pub fn is_coordinate_sorted(&self) -> bool {
        self.sort_order.as_deref() == Some(COORDINATE_SORT_ORDER)
    }

    /// First contig named like a mitochondrial contig (`MT` or `chrM`).
    pub fn mt_contig(&self) -> Option<&str> {
        self.contigs
            .iter()
            .map(String::as_str)
            .find(|name| MT_CONTIG_NAMES.contains(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    pub bam: PathBuf,
    pub bai: Option<PathBuf>,
    /// Reference FASTA of the input alignment; required for CRAM.
    pub reference_fa: Option<PathBuf>,
    pub contig_name: Option<String>,
    pub out_dir: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOutputs {
    pub unmapped_bam: PathBuf,
}

fn is_cram(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "cram")
}

///
/// Index files samtools/pysam would accept for an alignment:
/// `x.bam.bai`, `x.bai`, `x.cram.crai` or `x.crai`.
///
fn index_candidates(alignment: &Path) -> Vec<PathBuf> {
    let ext = if is_cram(alignment) { "crai" } else { "bai" };
    vec![
        with_appended_extension(alignment, &format!(".{}", ext)),
        alignment.with_extension(ext),
    ]
}

fn read_header(
    ctx: &StageContext,
    opts: &PreprocessOptions,
    alignment: &Path,
) -> PipelineResult<AlignmentHeader> {
    if !is_cram(alignment) {
        return AlignmentHeader::read_bam(alignment);
    }

    // CRAM headers are read through samtools
    let header_sam = create_output_path(&opts.prefix, &opts.out_dir, "_header", ".sam");
    let mut view = Invocation::new(&ctx.tools.samtools).subcommand("view").flag("-H");
    if let Some(reference_fa) = &opts.reference_fa {
        view = view.opt("-T", reference_fa);
    }
    ctx.run(&view.arg(alignment).redirect(&header_sam))?;

    let text = std::fs::read_to_string(&header_sam)?;
    std::fs::remove_file(&header_sam)?;
    Ok(AlignmentHeader::from_sam_text(&text))
}

///
/// Prepare an alignment for mitochondrial re-alignment: make sure it is
/// sorted and indexed, subset it to the mitochondrial contig and revert it
/// to an unmapped BAM.
///
pub fn run_preprocess(
    ctx: &StageContext,
    opts: &PreprocessOptions,
) -> PipelineResult<PreprocessOutputs> {
    std::fs::create_dir_all(&opts.out_dir)?;

    info!("Checking required input files...");
    ensure_inputs(&[&opts.bam])?;

    let cram = is_cram(&opts.bam);
    if cram {
        let reference_fa = opts
            .reference_fa
            .as_ref()
            .ok_or_else(|| PipelineError::MissingCramReference(opts.bam.clone()))?;
        ensure_inputs(&[reference_fa])?;

        if !reference_fa.with_extension("dict").is_file() {
            info!("The reference dictionary file not found. Creating reference dictionary file...");
            ctx.run(&ctx.gatk("CreateSequenceDictionary").opt("-R", reference_fa))?;
        }

        if !with_appended_extension(reference_fa, ".fai").is_file() {
            info!("The reference FASTA index file not found. Creating FAI index file...");
            ctx.run(
                &Invocation::new(&ctx.tools.samtools)
                    .subcommand("faidx")
                    .arg(reference_fa),
            )?;
        }
    }

    let mut alignment = opts.bam.clone();
    let mut header = read_header(ctx, opts, &alignment)?;

    if !header.is_coordinate_sorted() {
        info!("Input alignment is not coordinate sorted. Sorting...");
        let ext = if cram { ".cram" } else { ".bam" };
        let sorted = create_output_path(&file_basename(&alignment), &opts.out_dir, ".sorted", ext);

        let mut sort = Invocation::new(&ctx.tools.samtools)
            .subcommand("sort")
            .opt("-o", &sorted);
        if let (true, Some(reference_fa)) = (cram, &opts.reference_fa) {
            sort = sort.opt("--reference", reference_fa);
        }
        ctx.run(&sort.arg(&alignment))?;

        alignment = sorted;
        header.sort_order = Some(COORDINATE_SORT_ORDER.to_string());
    }

    // a user supplied index belongs to the original input, not a sorted copy
    let index_exists = (opts.bai.is_some() && alignment == opts.bam)
        || index_candidates(&alignment).iter().any(|p| p.is_file());
    if !index_exists {
        info!("The BAM/CRAM index file not found. Creating index file...");
        ctx.run(
            &Invocation::new(&ctx.tools.samtools)
                .subcommand("index")
                .arg(&alignment),
        )?;
    }

    let contig_name = match &opts.contig_name {
        Some(contig) => contig.clone(),
        None => {
            info!("Contig name not provided. Detecting mitochondrial contig name from the header...");
            header
                .mt_contig()
                .map(str::to_string)
                .ok_or_else(|| PipelineError::MtContigNotFound(opts.bam.clone()))?
        }
    };

    info!("Subsetting alignment to keep only reads mapped to {} contig...", contig_name);
    let subset = create_output_path(&opts.prefix, &opts.out_dir, "_chrM", ".bam");
    let mut print_reads = ctx
        .gatk("PrintReads")
        .opt("-L", &contig_name)
        .opt("-I", &alignment)
        .opt("-O", &subset)
        .repeated("--read-filter", MATE_READ_FILTERS);
    if let Some(reference_fa) = &opts.reference_fa {
        print_reads = print_reads.opt("-R", reference_fa);
    }
    ctx.run(&print_reads)?;

    info!("Generating unmapped BAM file...");
    let unmapped_bam = create_output_path(&opts.prefix, &opts.out_dir, "_unmapped", ".bam");
    ctx.run(
        &ctx.gatk("RevertSam")
            .opt("-I", &subset)
            .opt("-O", &unmapped_bam)
            .opt("--VALIDATION_STRINGENCY", "LENIENT")
            .repeated("--ATTRIBUTE_TO_CLEAR", ["FT", "CO"])
            .opt("--RESTORE_ORIGINAL_QUALITIES", "false"),
    )?;

    ensure_outputs("Preprocessing", &[&unmapped_bam])?;

    Ok(PreprocessOutputs { unmapped_bam })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n\
                          @SQ\tSN:chr1\tLN:248956422\n\
                          @SQ\tSN:chrM\tLN:16569\n\
                          @RG\tID:NA12878\tSM:NA12878\n";

    #[rstest]
    fn test_parse_header_text() {
        let header = AlignmentHeader::from_sam_text(HEADER);
        assert!(header.is_coordinate_sorted());
        assert_eq!(header.contigs, vec!["chr1", "chrM"]);
        assert_eq!(header.mt_contig(), Some("chrM"));
    }

    #[rstest]
    #[case("@HD\tVN:1.6\tSO:queryname\n@SQ\tSN:MT\tLN:16569\n", false, Some("MT"))]
    #[case("@HD\tVN:1.6\n@SQ\tSN:1\tLN:248956422\n", false, None)]
    #[case("@SQ\tSN:chrM\tLN:16569\n", false, Some("chrM"))]
    fn test_sort_order_and_contig(
        #[case] text: &str,
        #[case] sorted: bool,
        #[case] contig: Option<&str>,
    ) {
        let header = AlignmentHeader::from_sam_text(text);
        assert_eq!(header.is_coordinate_sorted(), sorted);
        assert_eq!(header.mt_contig(), contig);
    }

    #[rstest]
    fn test_index_candidates() {
        assert_eq!(
            index_candidates(Path::new("bams/NA12878.bam")),
            vec![
                PathBuf::from("bams/NA12878.bam.bai"),
                PathBuf::from("bams/NA12878.bai")
            ]
        );
        assert_eq!(
            index_candidates(Path::new("NA12878.cram"))[0],
            PathBuf::from("NA12878.cram.crai")
        );
    }
}
