use std::fmt::{self, Display};
use std::path::Path;

use fxhash::FxHashMap;
use log::{debug, warn};
use mitors_core::errors::CoreResult;
use mitors_core::utils::get_dynamic_reader;
use mitors_core::{CoreError, FieldDefinition, FieldType, FieldValue, GenomicKey, SiteKey};

use crate::errors::{AnnotationError, AnnotationResult};
use crate::registry::{AnnotationCategory, KeyType};

pub const POS_COLUMN: &str = "POS";
pub const REF_COLUMN: &str = "REF";
pub const ALT_COLUMN: &str = "ALT";

/// Join key of one annotation row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKey {
    Site(SiteKey),
    Variant(GenomicKey),
}

impl AnnotationKey {
    pub fn key_type(&self) -> KeyType {
        match self {
            AnnotationKey::Site(_) => KeyType::Site,
            AnnotationKey::Variant(_) => KeyType::Variant,
        }
    }
}

impl Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKey::Site(key) => write!(f, "{}", key),
            AnnotationKey::Variant(key) => write!(f, "{}", key),
        }
    }
}

///
/// One annotation source loaded into memory: a key per row and one nullable
/// value per declared field.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTable {
    pub name: String,
    pub key_type: KeyType,
    pub fields: Vec<FieldDefinition>,
    pub rows: FxHashMap<AnnotationKey, Vec<Option<FieldValue>>>,
}

impl AnnotationTable {
    ///
    /// Load the source table of a category.
    ///
    /// Comma separated unless the file ends in `.tsv` or `.txt` (optionally
    /// followed by `.gz`). The first row is the header; key columns are `POS`
    /// for site categories and `POS,REF,ALT` for variant categories.
    ///
    /// # Arguments
    /// - category: the category the table provides
    /// - path: path to the table
    /// - genome_length: positions must lie in `1..=genome_length`
    pub fn load(
        category: &AnnotationCategory,
        path: &Path,
        genome_length: u32,
    ) -> AnnotationResult<Self> {
        let missing = || AnnotationError::MissingAnnotationSource {
            category: category.name.clone(),
            path: path.to_path_buf(),
        };

        if !path.is_file() {
            return Err(missing());
        }

        let reader = get_dynamic_reader(path).map_err(|_| missing())?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_for(path))
            .flexible(false)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| -> AnnotationResult<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| AnnotationError::MissingColumn {
                    category: category.name.clone(),
                    column: name.to_string(),
                })
        };

        let pos_idx = column(POS_COLUMN)?;
        let allele_idx = match category.key_type {
            KeyType::Site => None,
            KeyType::Variant => Some((column(REF_COLUMN)?, column(ALT_COLUMN)?)),
        };
        let field_idx = category
            .fields
            .iter()
            .map(|f| column(&f.id))
            .collect::<AnnotationResult<Vec<usize>>>()?;

        let mut rows: FxHashMap<AnnotationKey, Vec<Option<FieldValue>>> = FxHashMap::default();
        let mut n_records = 0usize;

        for record in csv_reader.records() {
            let record = record?;
            n_records += 1;
            // header is line 1
            let line = record.position().map(|p| p.line()).unwrap_or(n_records as u64 + 1);
            let cell = |idx: usize| record.get(idx).unwrap_or("");

            let pos = parse_position(cell(pos_idx))
                .map_err(|e| AnnotationError::invalid_value(&category.name, line, e))?;
            let key = match allele_idx {
                None => SiteKey::new(pos, genome_length).map(AnnotationKey::Site),
                Some((ref_idx, alt_idx)) => {
                    GenomicKey::new(pos, cell(ref_idx), cell(alt_idx), genome_length)
                        .map(AnnotationKey::Variant)
                }
            }
            .map_err(|e| AnnotationError::invalid_value(&category.name, line, e))?;

            let mut values = Vec::with_capacity(field_idx.len());
            for (field, idx) in category.fields.iter().zip(&field_idx) {
                let value = FieldValue::parse(cell(*idx), field.field_type)
                    .map_err(|e| AnnotationError::invalid_value(&category.name, line, e))?;
                values.push(value);
            }

            if rows.contains_key(&key) {
                warn!(
                    "Duplicate key {} in '{}' at line {}, keeping the first row",
                    key, category.name, line
                );
                continue;
            }
            rows.insert(key, values);
        }

        if rows.is_empty() {
            return Err(missing());
        }

        debug!(
            "Loaded {} rows for '{}' from {}",
            rows.len(),
            category.name,
            path.display()
        );

        Ok(AnnotationTable {
            name: category.name.clone(),
            key_type: category.key_type,
            fields: category.fields.clone(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn delimiter_for(path: &Path) -> u8 {
    let name = path.to_string_lossy();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".tsv") || name.ends_with(".txt") {
        b'\t'
    } else {
        b','
    }
}

// positions are sometimes written as floats by dataframe exports, e.g. `3243.0`
fn parse_position(raw: &str) -> CoreResult<u32> {
    let invalid = || CoreError::InvalidValue {
        value: raw.to_string(),
        expected: "position".to_string(),
    };
    match FieldValue::parse(raw, FieldType::Integer)? {
        Some(FieldValue::Integer(pos)) => u32::try_from(pos).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mitors_core::consts::MT_GENOME_LENGTH;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::registry::CategoryGroup;

    #[fixture]
    fn mitotip() -> AnnotationCategory {
        AnnotationCategory::new(
            "mitotip",
            KeyType::Variant,
            CategoryGroup::Pathogenicity,
            "mitotip.csv",
            vec![
                FieldDefinition::new("MitoTIP_Score", FieldType::Float, "score"),
                FieldDefinition::new("MitoTIP_Prediction", FieldType::String, "prediction"),
            ],
        )
    }

    #[fixture]
    fn general() -> AnnotationCategory {
        AnnotationCategory::new(
            "general",
            KeyType::Site,
            CategoryGroup::General,
            "general_annot.csv",
            vec![FieldDefinition::new("LOCUS", FieldType::String, "locus")],
        )
    }

    fn variant_key(pos: u32, reference: &str, alternate: &str) -> AnnotationKey {
        AnnotationKey::Variant(GenomicKey::new(pos, reference, alternate, MT_GENOME_LENGTH).unwrap())
    }

    #[rstest]
    fn test_load_variant_table(mitotip: AnnotationCategory) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mitotip.csv");
        std::fs::write(
            &path,
            "POS,REF,ALT,MitoTIP_Score,MitoTIP_Prediction,Extra\n\
             3243,A,G,16.25,likely pathogenic,x\n\
             3244,G,A,,possibly benign,y\n",
        )
        .unwrap();

        let table = AnnotationTable::load(&mitotip, &path, MT_GENOME_LENGTH).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[&variant_key(3243, "A", "G")],
            vec![
                Some(FieldValue::Float(16.25)),
                Some(FieldValue::String("likely pathogenic".to_string()))
            ]
        );
        assert_eq!(table.rows[&variant_key(3244, "G", "A")][0], None);
    }

    #[rstest]
    fn test_load_tsv_site_table(general: AnnotationCategory) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("general_annot.tsv");
        std::fs::write(&path, "POS\tLOCUS\n3243\tMT-TL1\n3243.0\tMT-ND1\n").unwrap();

        let table = AnnotationTable::load(&general, &path, MT_GENOME_LENGTH).unwrap();

        // first row wins
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[&AnnotationKey::Site(SiteKey { pos: 3243 })],
            vec![Some(FieldValue::String("MT-TL1".to_string()))]
        );
    }

    #[rstest]
    fn test_missing_source(general: AnnotationCategory) {
        let result =
            AnnotationTable::load(&general, Path::new("does/not/exist.csv"), MT_GENOME_LENGTH);
        assert!(matches!(
            result,
            Err(AnnotationError::MissingAnnotationSource { .. })
        ));
    }

    #[rstest]
    fn test_empty_source(general: AnnotationCategory) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("general_annot.csv");
        std::fs::write(&path, "POS,LOCUS\n").unwrap();

        let result = AnnotationTable::load(&general, &path, MT_GENOME_LENGTH);
        assert!(matches!(
            result,
            Err(AnnotationError::MissingAnnotationSource { .. })
        ));
    }

    #[rstest]
    fn test_missing_declared_column(mitotip: AnnotationCategory) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mitotip.csv");
        std::fs::write(&path, "POS,REF,ALT,MitoTIP_Score\n3243,A,G,16.25\n").unwrap();

        let result = AnnotationTable::load(&mitotip, &path, MT_GENOME_LENGTH);
        assert!(matches!(
            result,
            Err(AnnotationError::MissingColumn { ref column, .. }) if column == "MitoTIP_Prediction"
        ));
    }

    #[rstest]
    #[case("POS,REF,ALT,MitoTIP_Score,MitoTIP_Prediction\n3243,A,G,high,x\n")]
    #[case("POS,REF,ALT,MitoTIP_Score,MitoTIP_Prediction\n0,A,G,1.0,x\n")]
    #[case("POS,REF,ALT,MitoTIP_Score,MitoTIP_Prediction\n3243,A,<DEL>,1.0,x\n")]
    fn test_invalid_values(mitotip: AnnotationCategory, #[case] content: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mitotip.csv");
        std::fs::write(&path, content).unwrap();

        let result = AnnotationTable::load(&mitotip, &path, MT_GENOME_LENGTH);
        assert!(matches!(
            result,
            Err(AnnotationError::InvalidValue { line: 2, .. })
        ));
    }

    #[rstest]
    fn test_positions_follow_configured_genome_length(general: AnnotationCategory) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("general_annot.csv");
        std::fs::write(&path, "POS,LOCUS\n16569,MT-CYB\n").unwrap();

        assert!(AnnotationTable::load(&general, &path, MT_GENOME_LENGTH).is_ok());
        assert!(matches!(
            AnnotationTable::load(&general, &path, 16000),
            Err(AnnotationError::InvalidValue { line: 2, .. })
        ));
    }
}
