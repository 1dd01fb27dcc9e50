use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use mitors_annotate::vcf::read_records;
use mitors_annotate::{
    AnnotationError, AnnotationFlags, AnnotationRegistry, AnnotationStore, ReportLayout,
    annotate_vcf, flatten,
};
use mitors_core::AnnotationResources;
use mitors_core::consts::MT_GENOME_LENGTH;
use mitors_core::utils::with_appended_extension;

const VCF: &str = "##fileformat=VCFv4.2
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=AF,Number=A,Type=Float,Description=\"Allele fractions\">
##INFO=<ID=ANN,Number=.,Type=String,Description=\"Functional annotations\">
##contig=<ID=chrM,length=16569>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA12878
chrM\t3243\t.\tA\tG\t.\tPASS\tANN=G|non_coding_transcript_exon_variant|MODIFIER|MT-TL1|MT-TL1|transcript|MT-TL1|Mt_tRNA|1/1|n.14A>G||||||\tGT:AF\t0/1:0.97
chrM\t3244\t.\tG\tA\t.\tPASS\t.\tGT:AF\t0/1:0.50
chrM\t16519\t.\tT\tC\t.\tPASS\t.\tGT:AF\t0/1:0.95
";

fn write_table(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// Annotation bundle laid out as `<data>/annotation_data/*.csv`.
#[fixture]
fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let annot = dir.path().join("annotation_data");
    std::fs::create_dir_all(&annot).unwrap();

    write_table(&annot, "general_annot.csv", "POS,LOCUS,BIOTYPE\n3243,MT-TL1,mt_tRNA\n3244,MT-TL1,mt_tRNA\n");
    write_table(
        &annot,
        "conservation_scores.csv",
        "POS,phastCons100way,phyloP100way\n3243,1.0,5.1\n",
    );
    write_table(&annot, "sift.csv", "POS,REF,ALT,SIFT,SIFT_score\n3308,T,C,deleterious,0.01\n");
    write_table(
        &annot,
        "mitotip.csv",
        "POS,REF,ALT,MitoTIP_Score,MitoTIP_Prediction\n3243,A,G,16.25,likely pathogenic\n",
    );
    write_table(
        &annot,
        "pon_mt_trna.csv",
        "POS,REF,ALT,PONmttRNA_Probability,PONmttRNA_Prediction\n3243,A,G,0.98,Pathogenic\n",
    );
    write_table(
        &annot,
        "gnomad_freq.csv",
        "POS,REF,ALT,GNOMAD_AC_HOM,GNOMAD_AF_HOM,GNOMAD_AF_HET,GNOMAD_AC_HET\n\
         3243,A,G,0,0,0.0001,22\n\
         73,A,G,50000,0.89,0.001,100\n",
    );
    write_table(
        &annot,
        "mitomap.csv",
        "POS,REF,ALT,MITOMAP_GENBANK_AC,MITOMAP_GENBANK_AF,MITOMAP_PubmedIDs,MITOMAP_Disease,MITOMAP_DiseaseStatus\n\
         3243,A,G,68,0.0011,112,\"MELAS, Leigh Syndrome\",Cfrm\n",
    );
    write_table(
        &annot,
        "clinvar.csv",
        "POS,REF,ALT,ClinVar_ID,CLNDN,CLNSIG,CLNDISDB\n3243,A,G,9689,Juvenile myopathy,Pathogenic,MONDO:0010789\n",
    );

    dir
}

fn input_vcf(dir: &Path) -> PathBuf {
    let path = dir.join("NA12878_snpeff.vcf.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(VCF.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn load_store(data_dir: &Path, flags: &AnnotationFlags) -> AnnotationStore {
    AnnotationStore::load(
        &AnnotationRegistry::mitochondrial(),
        &AnnotationResources::resolve(data_dir),
        flags,
        MT_GENOME_LENGTH,
    )
    .unwrap()
}

#[rstest]
fn test_annotate_vcf_and_report(data_dir: TempDir) {
    let store = load_store(data_dir.path(), &AnnotationFlags::default());
    let in_vcf = input_vcf(data_dir.path());
    let out_vcf = data_dir.path().join("out").join("NA12878_annotated.vcf");

    let n = annotate_vcf(&in_vcf, &out_vcf, &store, 0.95).unwrap();
    assert_eq!(n, 3);

    let (header, records) = read_records(&out_vcf).unwrap();
    for field in ["LOCUS", "phyloP100way", "MitoTIP_Score", "GNOMAD_AC_HET", "CLNSIG"] {
        assert!(header.has_info(field), "missing ##INFO for {}", field);
    }

    let m3243 = &records[0];
    assert_eq!(m3243.genotype(0), Some("1/1"));
    assert_eq!(m3243.info_value("LOCUS"), Some("MT-TL1"));
    assert_eq!(m3243.info_value("MitoTIP_Prediction"), Some("likely pathogenic"));
    assert_eq!(m3243.info_value("MITOMAP_Disease"), Some("MELAS%2C Leigh Syndrome"));
    assert_eq!(m3243.info_value("MITOMAP_PubmedIDs"), Some("112"));

    // site annotation only
    assert_eq!(records[1].genotype(0), Some("0/1"));
    assert_eq!(records[1].info_value("LOCUS"), Some("MT-TL1"));
    assert_eq!(records[1].info_value("MitoTIP_Score"), None);

    // AF equal to the threshold
    assert_eq!(records[2].genotype(0), Some("1/1"));

    let report = flatten(&records, &ReportLayout::from_store(&store));
    assert_eq!(report.rows.len(), 3);
    assert_eq!(
        report.column("MT Variant Type").unwrap(),
        vec!["homoplasmic", "heteroplasmic", "homoplasmic"]
    );
    assert_eq!(
        report.column("MITOMAP_Disease").unwrap(),
        vec!["MELAS, Leigh Syndrome", ".", "."]
    );
    // 73 A>G is only present in gnomad
    assert_eq!(report.column("POS").unwrap(), vec!["3243", "3244", "16519"]);

    let out_csv = data_dir.path().join("out").join("NA12878_annotated.csv");
    report.write_csv(&out_csv).unwrap();
    let mut reader = csv::Reader::from_path(&out_csv).unwrap();
    assert_eq!(reader.records().count(), 3);
}

#[rstest]
fn test_disabled_group_only_drops_its_columns(data_dir: TempDir) {
    let all = ReportLayout::from_store(&load_store(data_dir.path(), &AnnotationFlags::default()));
    let flags = AnnotationFlags {
        population_freqs: false,
        ..Default::default()
    };
    let without_gnomad = ReportLayout::from_store(&load_store(data_dir.path(), &flags));

    let dropped: Vec<String> = all
        .columns()
        .into_iter()
        .filter(|c| !without_gnomad.columns().contains(c))
        .collect();
    assert_eq!(
        dropped,
        vec!["GNOMAD_AC_HOM", "GNOMAD_AF_HOM", "GNOMAD_AF_HET", "GNOMAD_AC_HET"]
    );
}

#[rstest]
fn test_missing_source_fails_before_writing(data_dir: TempDir) {
    std::fs::remove_file(data_dir.path().join("annotation_data").join("clinvar.csv")).unwrap();

    let result = AnnotationStore::load(
        &AnnotationRegistry::mitochondrial(),
        &AnnotationResources::resolve(data_dir.path()),
        &AnnotationFlags::default(),
        MT_GENOME_LENGTH,
    );
    assert!(matches!(
        result,
        Err(AnnotationError::MissingAnnotationSource { ref category, .. }) if category == "clinvar"
    ));

    // the same bundle loads once phenotype annotations are switched off
    let flags = AnnotationFlags {
        phenotype_annot: false,
        ..Default::default()
    };
    let store = load_store(data_dir.path(), &flags);
    assert!(store.variant_fields().iter().all(|f| f.id != "CLNSIG"));
}

#[rstest]
fn test_invalid_threshold_writes_nothing(data_dir: TempDir) {
    let store = load_store(data_dir.path(), &AnnotationFlags::default());
    let in_vcf = input_vcf(data_dir.path());
    let out_vcf = data_dir.path().join("NA12878_annotated.vcf");

    let result = annotate_vcf(&in_vcf, &out_vcf, &store, 1.2);
    assert!(matches!(result, Err(AnnotationError::InvalidThreshold(_))));
    assert!(!out_vcf.exists());
}

#[rstest]
fn test_malformed_record_leaves_no_output(data_dir: TempDir) {
    let store = load_store(data_dir.path(), &AnnotationFlags::default());
    let in_vcf = data_dir.path().join("NA12878_unsplit.vcf");
    let unsplit = VCF.replace("chrM\t3244\t.\tG\tA\t", "chrM\t3244\t.\tG\tA,T\t");
    std::fs::write(&in_vcf, unsplit).unwrap();
    let out_vcf = data_dir.path().join("out").join("NA12878_annotated.vcf");

    let result = annotate_vcf(&in_vcf, &out_vcf, &store, 0.95);
    assert!(matches!(
        result,
        Err(AnnotationError::MalformedRecord { ref message, .. }) if message.starts_with("chrM:3244 ")
    ));
    assert!(!out_vcf.exists());
    assert!(!with_appended_extension(&out_vcf, ".part").exists());
}
