use std::fmt::{self, Display};
use std::path::Path;

use log::{debug, info};
use mitors_core::GenomicKey;

use crate::errors::{AnnotationError, AnnotationResult};
use crate::store::{AnnotationStore, UnifiedTable};
use crate::vcf::{VariantRecord, VcfReader, VcfWriter};

pub const HOMOPLASMIC_GENOTYPE: &str = "1/1";
pub const HETEROPLASMIC_GENOTYPE: &str = "0/1";

/// Genotype assigned to a single-sample mitochondrial call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genotype {
    Homoplasmic,
    Heteroplasmic,
}

impl Genotype {
    pub fn gt(&self) -> &'static str {
        match self {
            Genotype::Homoplasmic => HOMOPLASMIC_GENOTYPE,
            Genotype::Heteroplasmic => HETEROPLASMIC_GENOTYPE,
        }
    }

    pub fn from_gt(gt: &str) -> Self {
        if gt.replace('|', "/") == HOMOPLASMIC_GENOTYPE {
            Genotype::Homoplasmic
        } else {
            Genotype::Heteroplasmic
        }
    }
}

impl Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Genotype::Homoplasmic => write!(f, "homoplasmic"),
            Genotype::Heteroplasmic => write!(f, "heteroplasmic"),
        }
    }
}

pub fn check_threshold(threshold: f64) -> AnnotationResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AnnotationError::InvalidThreshold(threshold));
    }
    Ok(())
}

///
/// Classify an allele fraction. The threshold is inclusive: a fraction equal
/// to it is homoplasmic.
///
/// ```
/// use mitors_annotate::annotator::{Genotype, derive_genotype};
///
/// assert_eq!(derive_genotype(0.95, 0.95).unwrap(), Genotype::Homoplasmic);
/// assert_eq!(derive_genotype(0.5, 0.95).unwrap(), Genotype::Heteroplasmic);
/// ```
pub fn derive_genotype(af: f64, threshold: f64) -> AnnotationResult<Genotype> {
    check_threshold(threshold)?;
    if af >= threshold {
        Ok(Genotype::Homoplasmic)
    } else {
        Ok(Genotype::Heteroplasmic)
    }
}

fn malformed(location: &str, line: u64, message: &str) -> AnnotationError {
    AnnotationError::MalformedRecord {
        line,
        message: format!("{} {}", location, message),
    }
}

///
/// Annotate one record in place: copy matching site fields, then matching
/// variant fields, then set the genotype from the sample allele fraction.
///
/// # Arguments
/// - record: the record to annotate; must carry exactly one ALT allele
/// - line: line number used in error messages
/// - site_table: position-keyed annotations
/// - variant_table: allele-keyed annotations
/// - threshold: homoplasmy threshold in [0, 1]
/// - genome_length: positions must lie in `1..=genome_length`
pub fn annotate_record(
    record: &mut VariantRecord,
    line: u64,
    site_table: &UnifiedTable,
    variant_table: &UnifiedTable,
    threshold: f64,
    genome_length: u32,
) -> AnnotationResult<Genotype> {
    let location = format!("{}:{}", record.chrom, record.pos);

    if record.alternates.len() != 1 {
        return Err(malformed(
            &location,
            line,
            &format!(
                "has {} alternate alleles; split multi-allelic records first",
                record.alternates.len()
            ),
        ));
    }

    let key = GenomicKey::new(
        record.pos,
        &record.reference,
        &record.alternates[0],
        genome_length,
    )
    .map_err(|e| malformed(&location, line, &e.to_string()))?;

    match site_table.site(key.site()) {
        Some(row) => {
            for field in &site_table.fields {
                if let Some(value) = row.get(&field.id) {
                    record.set_info(&field.id, &value.to_string());
                }
            }
        }
        None => debug!("No site annotation for {}", key.site()),
    }

    match variant_table.variant(&key) {
        Some(row) => {
            for field in &variant_table.fields {
                if let Some(value) = row.get(&field.id) {
                    record.set_info(&field.id, &value.to_string());
                }
            }
        }
        None => debug!("No variant annotation for {}", key),
    }

    let af = record
        .allele_fraction(0)
        .ok_or_else(|| malformed(&location, line, "has no sample AF value in [0, 1]"))?;
    let genotype = derive_genotype(af, threshold)?;
    record.set_genotype(0, genotype.gt());

    Ok(genotype)
}

///
/// Annotate a call-set held in memory.
///
/// Record order is preserved; records are numbered from 1 in error messages.
pub fn annotate(
    records: Vec<VariantRecord>,
    site_table: &UnifiedTable,
    variant_table: &UnifiedTable,
    threshold: f64,
    genome_length: u32,
) -> AnnotationResult<Vec<VariantRecord>> {
    check_threshold(threshold)?;

    let mut annotated = Vec::with_capacity(records.len());
    for (idx, mut record) in records.into_iter().enumerate() {
        annotate_record(
            &mut record,
            idx as u64 + 1,
            site_table,
            variant_table,
            threshold,
            genome_length,
        )?;
        annotated.push(record);
    }
    Ok(annotated)
}

///
/// Stream a VCF through the annotator, declaring one INFO header line per
/// injected field.
///
/// Returns the number of records written. `out_vcf` is only created once
/// every record is annotated; on error no output is left behind.
///
/// # Arguments
/// - in_vcf: input call-set (typically the snpEff output)
/// - out_vcf: annotated output
/// - store: loaded annotation tables
/// - threshold: homoplasmy threshold in [0, 1]
pub fn annotate_vcf(
    in_vcf: &Path,
    out_vcf: &Path,
    store: &AnnotationStore,
    threshold: f64,
) -> AnnotationResult<usize> {
    check_threshold(threshold)?;

    let mut reader = VcfReader::from_path(in_vcf)?;

    let mut header = reader.header().clone();
    for field in store.variant_fields().iter().chain(store.site_fields()) {
        header.add_info_line(field);
    }

    info!("Writing additional annotations...");
    let mut writer = VcfWriter::create(out_vcf, &header)?;
    let mut n_records = 0;

    while let Some(record) = reader.next() {
        let mut record = record?;
        annotate_record(
            &mut record,
            reader.line_no(),
            store.site(),
            store.variant(),
            threshold,
            store.genome_length(),
        )?;
        writer.write_record(&record)?;
        n_records += 1;
    }

    writer.finish()?;
    debug!("Annotated {} records into {}", n_records, out_vcf.display());

    Ok(n_records)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use mitors_core::consts::MT_GENOME_LENGTH;
    use mitors_core::{FieldDefinition, FieldType, FieldValue, SiteKey};

    use crate::registry::KeyType;
    use crate::report::{ReportLayout, flatten};
    use crate::store::merge_all;
    use crate::table::{AnnotationKey, AnnotationTable};

    fn record(pos: u32, reference: &str, alt: &str, af: &str) -> VariantRecord {
        VariantRecord::from_line(&format!(
            "chrM\t{}\t.\t{}\t{}\t.\tPASS\tDP=800\tGT:AF\t0/1:{}",
            pos, reference, alt, af
        ))
        .unwrap()
    }

    #[fixture]
    fn site_table() -> UnifiedTable {
        let table = AnnotationTable {
            name: "general".to_string(),
            key_type: KeyType::Site,
            fields: vec![
                FieldDefinition::new("LOCUS", FieldType::String, "locus"),
                FieldDefinition::new("BIOTYPE", FieldType::String, "biotype"),
            ],
            rows: [(
                AnnotationKey::Site(SiteKey { pos: 3243 }),
                vec![Some(FieldValue::String("MT-TL1".to_string())), None],
            )]
            .into_iter()
            .collect(),
        };
        merge_all(&[table], KeyType::Site).unwrap()
    }

    #[fixture]
    fn variant_table() -> UnifiedTable {
        let table = AnnotationTable {
            name: "mitotip".to_string(),
            key_type: KeyType::Variant,
            fields: vec![FieldDefinition::new("MitoTIP_Score", FieldType::Float, "score")],
            rows: [(
                AnnotationKey::Variant(GenomicKey::new(3243, "A", "G", MT_GENOME_LENGTH).unwrap()),
                vec![Some(FieldValue::Float(16.25))],
            )]
            .into_iter()
            .collect(),
        };
        merge_all(&[table], KeyType::Variant).unwrap()
    }

    #[rstest]
    #[case(0.97, 0.95, Genotype::Homoplasmic)]
    #[case(0.95, 0.95, Genotype::Homoplasmic)]
    #[case(0.9499, 0.95, Genotype::Heteroplasmic)]
    #[case(0.5, 0.95, Genotype::Heteroplasmic)]
    #[case(0.0, 0.0, Genotype::Homoplasmic)]
    #[case(1.0, 1.0, Genotype::Homoplasmic)]
    fn test_derive_genotype(#[case] af: f64, #[case] threshold: f64, #[case] expected: Genotype) {
        assert_eq!(derive_genotype(af, threshold).unwrap(), expected);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_invalid_threshold(#[case] threshold: f64) {
        assert!(matches!(
            derive_genotype(0.5, threshold),
            Err(AnnotationError::InvalidThreshold(_))
        ));
    }

    #[rstest]
    fn test_annotate_record_copies_fields(site_table: UnifiedTable, variant_table: UnifiedTable) {
        let mut rec = record(3243, "A", "G", "0.97");
        let genotype = annotate_record(&mut rec, 1, &site_table, &variant_table, 0.95, MT_GENOME_LENGTH).unwrap();

        assert_eq!(genotype, Genotype::Homoplasmic);
        assert_eq!(rec.info_value("LOCUS"), Some("MT-TL1"));
        assert_eq!(rec.info_value("BIOTYPE"), None);
        assert_eq!(rec.info_value("MitoTIP_Score"), Some("16.25"));
        assert_eq!(rec.genotype(0), Some("1/1"));
    }

    #[rstest]
    fn test_site_match_without_variant_match(site_table: UnifiedTable, variant_table: UnifiedTable) {
        // same site, different allele
        let mut rec = record(3243, "A", "T", "0.50");
        let genotype = annotate_record(&mut rec, 1, &site_table, &variant_table, 0.95, MT_GENOME_LENGTH).unwrap();

        assert_eq!(genotype, Genotype::Heteroplasmic);
        assert_eq!(rec.info_value("LOCUS"), Some("MT-TL1"));
        assert_eq!(rec.info_value("MitoTIP_Score"), None);
        assert_eq!(rec.genotype(0), Some("0/1"));
    }

    #[rstest]
    fn test_unresolved_key_is_not_an_error(site_table: UnifiedTable, variant_table: UnifiedTable) {
        let records = vec![record(16519, "T", "C", "0.99")];
        let annotated = annotate(records, &site_table, &variant_table, 0.95, MT_GENOME_LENGTH).unwrap();

        assert_eq!(annotated[0].info, vec![("DP".to_string(), Some("800".to_string()))]);
        assert_eq!(annotated[0].genotype(0), Some("1/1"));
    }

    #[rstest]
    fn test_multi_allelic_record_is_rejected(site_table: UnifiedTable, variant_table: UnifiedTable) {
        let records = vec![record(3243, "A", "G", "0.5"), record(3244, "G", "A,T", "0.3,0.2")];
        let result = annotate(records, &site_table, &variant_table, 0.95, MT_GENOME_LENGTH);

        assert!(matches!(
            result,
            Err(AnnotationError::MalformedRecord { line: 2, .. })
        ));
    }

    #[rstest]
    fn test_same_name_on_site_and_variant_keeps_both_values() {
        let score = || vec![FieldDefinition::new("SCORE", FieldType::Float, "score")];
        let site = AnnotationTable {
            name: "site_scores".to_string(),
            key_type: KeyType::Site,
            fields: score(),
            rows: [(AnnotationKey::Site(SiteKey { pos: 3243 }), vec![Some(FieldValue::Float(0.5))])]
                .into_iter()
                .collect(),
        };
        let variant = AnnotationTable {
            name: "variant_scores".to_string(),
            key_type: KeyType::Variant,
            fields: score(),
            rows: [(
                AnnotationKey::Variant(GenomicKey::new(3243, "A", "G", MT_GENOME_LENGTH).unwrap()),
                vec![Some(FieldValue::Float(9.9))],
            )]
            .into_iter()
            .collect(),
        };
        let store = AnnotationStore::from_tables(&[site], &[variant], MT_GENOME_LENGTH).unwrap();

        let annotated = annotate(
            vec![record(3243, "A", "G", "0.97")],
            store.site(),
            store.variant(),
            0.95,
            store.genome_length(),
        )
        .unwrap();
        assert_eq!(annotated[0].info_value("SITE_SCORE"), Some("0.5"));
        assert_eq!(annotated[0].info_value("VARIANT_SCORE"), Some("9.9"));
        assert_eq!(annotated[0].info_value("SCORE"), None);

        let report = flatten(&annotated, &ReportLayout::from_store(&store));
        assert!(!report.columns.contains(&"SCORE".to_string()));
        assert_eq!(report.column("SITE_SCORE").unwrap(), vec!["0.5"]);
        assert_eq!(report.column("VARIANT_SCORE").unwrap(), vec!["9.9"]);
    }

    #[rstest]
    fn test_missing_af_is_rejected(site_table: UnifiedTable, variant_table: UnifiedTable) {
        let mut rec = record(3243, "A", "G", ".");
        let result = annotate_record(&mut rec, 7, &site_table, &variant_table, 0.95, MT_GENOME_LENGTH);

        assert!(matches!(
            result,
            Err(AnnotationError::MalformedRecord { line: 7, .. })
        ));
    }

    #[rstest]
    #[case("nan")]
    #[case("inf")]
    #[case("-0.5")]
    #[case("1.2")]
    fn test_out_of_range_af_is_rejected(
        site_table: UnifiedTable,
        variant_table: UnifiedTable,
        #[case] af: &str,
    ) {
        let mut rec = record(3243, "A", "G", af);
        let result = annotate_record(&mut rec, 3, &site_table, &variant_table, 0.95, MT_GENOME_LENGTH);

        assert!(matches!(
            result,
            Err(AnnotationError::MalformedRecord { line: 3, .. })
        ));
        assert_eq!(rec.genotype(0), Some("0/1"));
    }

    #[rstest]
    fn test_position_past_configured_genome_length(
        site_table: UnifiedTable,
        variant_table: UnifiedTable,
    ) {
        let records = vec![record(3243, "A", "G", "0.5"), record(16519, "T", "C", "0.99")];

        assert!(annotate(records.clone(), &site_table, &variant_table, 0.95, MT_GENOME_LENGTH).is_ok());
        assert!(matches!(
            annotate(records, &site_table, &variant_table, 0.95, 16000),
            Err(AnnotationError::MalformedRecord { line: 2, .. })
        ));
    }
}
