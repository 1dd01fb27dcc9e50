use std::path::Path;

use mitors_core::FieldDefinition;

use crate::annotator::Genotype;
use crate::errors::AnnotationResult;
use crate::store::AnnotationStore;
use crate::vcf::VariantRecord;
use crate::vcf::record::{ALLELE_FRACTION_KEY, MISSING, decode_info_value};

pub const STANDARD_COLUMNS: [&str; 4] = ["CHROM", "POS", "REF", "ALT"];
pub const HETEROPLASMY_COLUMN: &str = "Heteroplasmy Fraction";
pub const VARIANT_TYPE_COLUMN: &str = "MT Variant Type";
pub const SNPEFF_INFO_KEY: &str = "ANN";

/// snpEff `ANN` sub-fields passed through to the report, with their index
/// in the pipe-delimited annotation.
pub const SNPEFF_COLUMNS: [(&str, usize); 9] = [
    ("snpEff_EFFECT", 1),
    ("snpEff_IMPACT", 2),
    ("snpEff_GENE", 3),
    ("snpEff_GENEID", 4),
    ("snpEff_FEATURE", 5),
    ("snpEff_FEATUREID", 6),
    ("snpEff_BIOTYPE", 7),
    ("snpEff_HGVS_C", 9),
    ("snpEff_HGVS_P", 10),
];

///
/// Column order of the report: standard columns, site fields, genotype
/// columns, snpEff columns, variant fields.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub site_fields: Vec<String>,
    pub variant_fields: Vec<String>,
}

impl ReportLayout {
    pub fn new(site_fields: &[FieldDefinition], variant_fields: &[FieldDefinition]) -> Self {
        ReportLayout {
            site_fields: site_fields.iter().map(|f| f.id.clone()).collect(),
            variant_fields: variant_fields.iter().map(|f| f.id.clone()).collect(),
        }
    }

    pub fn from_store(store: &AnnotationStore) -> Self {
        Self::new(store.site_fields(), store.variant_fields())
    }

    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = STANDARD_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(self.site_fields.iter().cloned());
        columns.push(HETEROPLASMY_COLUMN.to_string());
        columns.push(VARIANT_TYPE_COLUMN.to_string());
        columns.extend(SNPEFF_COLUMNS.iter().map(|(c, _)| c.to_string()));
        columns.extend(self.variant_fields.iter().cloned());
        columns
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    pub fn write_csv<T: AsRef<Path>>(&self, path: T) -> AnnotationResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

fn info_or_missing(record: &VariantRecord, key: &str) -> String {
    record
        .info_value(key)
        .map(decode_info_value)
        .unwrap_or_else(|| MISSING.to_string())
}

///
/// Pull the snpEff sub-fields out of the `ANN` entries of a record; one
/// value per annotation, joined with `,`.
///
fn snpeff_values(record: &VariantRecord) -> Vec<String> {
    let Some(ann) = record.info_value(SNPEFF_INFO_KEY) else {
        return vec![MISSING.to_string(); SNPEFF_COLUMNS.len()];
    };

    let entries: Vec<Vec<&str>> = ann.split(',').map(|e| e.split('|').collect()).collect();

    SNPEFF_COLUMNS
        .iter()
        .map(|(_, idx)| {
            entries
                .iter()
                .map(|entry| match entry.get(*idx) {
                    Some(value) if !value.is_empty() => decode_info_value(value),
                    _ => MISSING.to_string(),
                })
                .collect::<Vec<String>>()
                .join(",")
        })
        .collect()
}

///
/// Flatten annotated records into report rows, one per record.
///
/// Rows are driven by the call-set: a key only present in an annotation
/// table never produces a row.
///
/// # Arguments
/// - records: annotated records
/// - layout: report column order
pub fn flatten(records: &[VariantRecord], layout: &ReportLayout) -> Report {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let mut row = vec![
            record.chrom.clone(),
            record.pos.to_string(),
            record.reference.clone(),
            if record.alternates.is_empty() {
                MISSING.to_string()
            } else {
                record.alternates.join(",")
            },
        ];

        row.extend(layout.site_fields.iter().map(|f| info_or_missing(record, f)));

        row.push(
            record
                .sample_value(0, ALLELE_FRACTION_KEY)
                .unwrap_or(MISSING)
                .to_string(),
        );
        let genotype = record.genotype(0).map(Genotype::from_gt);
        row.push(genotype.unwrap_or(Genotype::Heteroplasmic).to_string());

        row.extend(snpeff_values(record));
        row.extend(layout.variant_fields.iter().map(|f| info_or_missing(record, f)));

        rows.push(row);
    }

    Report {
        columns: layout.columns(),
        rows,
    }
}
