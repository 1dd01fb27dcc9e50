use std::collections::BTreeMap;

use fxhash::{FxHashMap, FxHashSet};
use log::{debug, info};
use mitors_core::{AnnotationResources, FieldDefinition, FieldValue, GenomicKey, SiteKey};

use crate::errors::{AnnotationError, AnnotationResult};
use crate::registry::{AnnotationFlags, AnnotationRegistry, KeyType};
use crate::table::{AnnotationKey, AnnotationTable};

pub type FieldRow = FxHashMap<String, FieldValue>;

///
/// Full outer join of all annotation tables sharing a key type.
///
/// Rows are keyed and their values stored by field id, so the contents do
/// not depend on the order the tables were merged in. Only the order of
/// `fields` follows the input order. Null values are not stored.
///
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedTable {
    pub key_type: KeyType,
    pub fields: Vec<FieldDefinition>,
    rows: BTreeMap<AnnotationKey, FieldRow>,
}

impl UnifiedTable {
    pub fn empty(key_type: KeyType) -> Self {
        UnifiedTable {
            key_type,
            fields: vec![],
            rows: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &AnnotationKey) -> Option<&FieldRow> {
        self.rows.get(key)
    }

    pub fn site(&self, key: SiteKey) -> Option<&FieldRow> {
        self.get(&AnnotationKey::Site(key))
    }

    pub fn variant(&self, key: &GenomicKey) -> Option<&FieldRow> {
        // TODO: avoid the clone once lookups go through a borrowed key type
        self.get(&AnnotationKey::Variant(key.clone()))
    }

    pub fn value(&self, key: &AnnotationKey, field: &str) -> Option<&FieldValue> {
        self.rows.get(key).and_then(|row| row.get(field))
    }

    pub fn keys(&self) -> impl Iterator<Item = &AnnotationKey> {
        self.rows.keys()
    }

    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Move the fields named in `shared` to their namespaced ids.
    fn namespace(&mut self, shared: &FxHashSet<String>) {
        let key_type = self.key_type;
        for field in self.fields.iter_mut().filter(|f| shared.contains(&f.id)) {
            field.id = key_type.namespaced(&field.id);
        }
        for row in self.rows.values_mut() {
            for id in shared {
                if let Some(value) = row.remove(id) {
                    row.insert(key_type.namespaced(id), value);
                }
            }
        }
    }
}

///
/// Keep site and variant fields apart when both key types use the same
/// field name: each side is renamed with its key type prefix. Fails if a
/// renamed id clashes with another field.
///
pub fn separate_namespaces(site: &mut UnifiedTable, variant: &mut UnifiedTable) -> AnnotationResult<()> {
    let site_ids: FxHashSet<&str> = site.fields.iter().map(|f| f.id.as_str()).collect();
    let shared: FxHashSet<String> = variant
        .fields
        .iter()
        .filter(|f| site_ids.contains(f.id.as_str()))
        .map(|f| f.id.clone())
        .collect();

    if !shared.is_empty() {
        debug!("Namespacing fields shared by site and variant tables: {:?}", shared);
        site.namespace(&shared);
        variant.namespace(&shared);
    }

    let mut written: FxHashMap<&str, KeyType> = FxHashMap::default();
    for table in [&*site, &*variant] {
        for field in &table.fields {
            if let Some(first) = written.insert(field.id.as_str(), table.key_type) {
                return Err(AnnotationError::FieldCollision {
                    field: field.id.clone(),
                    first: first.to_string(),
                    second: table.key_type.to_string(),
                });
            }
        }
    }

    Ok(())
}

///
/// Outer-join annotation tables by key.
///
/// Every key present in any table is present in the result; a field whose
/// table lacks the key stays null.
///
/// # Arguments
/// - tables: the tables to join, all keyed by `key_type`
/// - key_type: expected key type of every table
pub fn merge_all(tables: &[AnnotationTable], key_type: KeyType) -> AnnotationResult<UnifiedTable> {
    let mut unified = UnifiedTable::empty(key_type);
    let mut providers: FxHashMap<&str, &str> = FxHashMap::default();

    for table in tables {
        if table.key_type != key_type {
            return Err(AnnotationError::KeyTypeMismatch {
                table: table.name.clone(),
                expected: key_type,
                found: table.key_type,
            });
        }

        for field in &table.fields {
            if let Some(first) = providers.insert(field.id.as_str(), table.name.as_str()) {
                return Err(AnnotationError::FieldCollision {
                    field: field.id.clone(),
                    first: first.to_string(),
                    second: table.name.clone(),
                });
            }
            unified.fields.push(field.clone());
        }

        for (key, values) in &table.rows {
            let row = unified.rows.entry(key.clone()).or_default();
            for (field, value) in table.fields.iter().zip(values) {
                if let Some(value) = value {
                    row.insert(field.id.clone(), value.clone());
                }
            }
        }
    }

    Ok(unified)
}

///
/// The site and variant annotation tables for one run.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStore {
    site: UnifiedTable,
    variant: UnifiedTable,
    genome_length: u32,
}

impl AnnotationStore {
    ///
    /// Load every enabled category and join the tables per key type.
    ///
    /// Fails on the first missing or empty source, so nothing is written when
    /// a required resource is absent.
    ///
    /// # Arguments
    /// - registry: known annotation categories
    /// - resources: where the category tables live
    /// - flags: which optional groups to load
    /// - genome_length: length of the reference the tables are keyed on
    pub fn load(
        registry: &AnnotationRegistry,
        resources: &AnnotationResources,
        flags: &AnnotationFlags,
        genome_length: u32,
    ) -> AnnotationResult<Self> {
        let mut site_tables = vec![];
        let mut variant_tables = vec![];

        for category in registry.enabled(flags) {
            let path = resources.table_path(&category.file_name);
            info!("Adding {} annotations...", category.name);

            let table = AnnotationTable::load(category, &path, genome_length)?;
            match table.key_type {
                KeyType::Site => site_tables.push(table),
                KeyType::Variant => variant_tables.push(table),
            }
        }

        Self::from_tables(&site_tables, &variant_tables, genome_length)
    }

    pub fn from_tables(
        site_tables: &[AnnotationTable],
        variant_tables: &[AnnotationTable],
        genome_length: u32,
    ) -> AnnotationResult<Self> {
        let mut site = merge_all(site_tables, KeyType::Site)?;
        let mut variant = merge_all(variant_tables, KeyType::Variant)?;
        separate_namespaces(&mut site, &mut variant)?;

        Ok(AnnotationStore {
            site,
            variant,
            genome_length,
        })
    }

    pub fn genome_length(&self) -> u32 {
        self.genome_length
    }

    pub fn site(&self) -> &UnifiedTable {
        &self.site
    }

    pub fn variant(&self) -> &UnifiedTable {
        &self.variant
    }

    pub fn site_fields(&self) -> &[FieldDefinition] {
        &self.site.fields
    }

    pub fn variant_fields(&self) -> &[FieldDefinition] {
        &self.variant.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use mitors_core::FieldType;
    use mitors_core::consts::MT_GENOME_LENGTH;

    fn key(pos: u32, reference: &str, alternate: &str) -> AnnotationKey {
        AnnotationKey::Variant(GenomicKey::new(pos, reference, alternate, MT_GENOME_LENGTH).unwrap())
    }

    fn table(
        name: &str,
        field: &str,
        rows: Vec<(AnnotationKey, Option<FieldValue>)>,
    ) -> AnnotationTable {
        AnnotationTable {
            name: name.to_string(),
            key_type: KeyType::Variant,
            fields: vec![FieldDefinition::new(field, FieldType::Float, field)],
            rows: rows.into_iter().map(|(k, v)| (k, vec![v])).collect(),
        }
    }

    #[fixture]
    fn tables() -> Vec<AnnotationTable> {
        vec![
            table(
                "gnomad",
                "GNOMAD_AF_HOM",
                vec![
                    (key(3243, "A", "G"), Some(FieldValue::Float(0.0001))),
                    (key(73, "A", "G"), Some(FieldValue::Float(0.8))),
                ],
            ),
            table(
                "mitotip",
                "MitoTIP_Score",
                vec![
                    (key(3243, "A", "G"), Some(FieldValue::Float(16.25))),
                    (key(3244, "G", "A"), None),
                ],
            ),
        ]
    }

    #[rstest]
    fn test_outer_join_keeps_every_key(tables: Vec<AnnotationTable>) {
        let unified = merge_all(&tables, KeyType::Variant).unwrap();

        assert_eq!(unified.len(), 3);
        assert_eq!(unified.field_ids(), vec!["GNOMAD_AF_HOM", "MitoTIP_Score"]);

        let both = unified.get(&key(3243, "A", "G")).unwrap();
        assert_eq!(both.len(), 2);

        // only in gnomad
        assert_eq!(
            unified.value(&key(73, "A", "G"), "GNOMAD_AF_HOM"),
            Some(&FieldValue::Float(0.8))
        );
        assert_eq!(unified.value(&key(73, "A", "G"), "MitoTIP_Score"), None);

        // present with only nulls
        assert!(unified.get(&key(3244, "G", "A")).unwrap().is_empty());
    }

    #[rstest]
    fn test_merge_order_does_not_change_contents(tables: Vec<AnnotationTable>) {
        let forward = merge_all(&tables, KeyType::Variant).unwrap();
        let reversed: Vec<AnnotationTable> = tables.into_iter().rev().collect();
        let backward = merge_all(&reversed, KeyType::Variant).unwrap();

        let forward_rows: Vec<_> = forward.keys().map(|k| forward.get(k)).collect();
        let backward_rows: Vec<_> = backward.keys().map(|k| backward.get(k)).collect();
        assert_eq!(forward_rows, backward_rows);
        assert_eq!(backward.field_ids(), vec!["MitoTIP_Score", "GNOMAD_AF_HOM"]);
    }

    #[rstest]
    fn test_field_collision(tables: Vec<AnnotationTable>) {
        let mut tables = tables;
        tables.push(table("gnomad_v4", "GNOMAD_AF_HOM", vec![]));

        let result = merge_all(&tables, KeyType::Variant);
        assert!(matches!(
            result,
            Err(AnnotationError::FieldCollision { ref first, ref second, .. })
                if first == "gnomad" && second == "gnomad_v4"
        ));
    }

    #[rstest]
    fn test_key_type_mismatch(tables: Vec<AnnotationTable>) {
        let result = merge_all(&tables, KeyType::Site);
        assert!(matches!(
            result,
            Err(AnnotationError::KeyTypeMismatch { .. })
        ));
    }

    #[rstest]
    fn test_empty_merge() {
        let unified = merge_all(&[], KeyType::Site).unwrap();
        assert!(unified.is_empty());
        assert!(unified.fields.is_empty());
    }
}
