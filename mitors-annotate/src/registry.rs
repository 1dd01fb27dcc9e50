//! Annotation categories known to the annotator.
//!
//! Each category names one source table, the key it is joined on and the
//! fields it contributes to the VCF. Categories are grouped so they can be
//! switched on and off together from the configuration.
use std::fmt::{self, Display};

use fxhash::FxHashMap;
use mitors_core::config::AnnotationSettings;
use mitors_core::{FieldDefinition, FieldType};

use crate::errors::{AnnotationError, AnnotationResult};

/// How a category is joined to a variant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// By position only; shared by every allele at the site.
    Site,
    /// By position, reference and alternate allele.
    Variant,
}

impl KeyType {
    pub fn other(&self) -> KeyType {
        match self {
            KeyType::Site => KeyType::Variant,
            KeyType::Variant => KeyType::Site,
        }
    }

    ///
    /// Id a field is written under when a field of the other key type has the
    /// same name, e.g. `SCORE` becomes `SITE_SCORE` and `VARIANT_SCORE`.
    ///
    pub fn namespaced(&self, id: &str) -> String {
        match self {
            KeyType::Site => format!("SITE_{}", id),
            KeyType::Variant => format!("VARIANT_{}", id),
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Site => write!(f, "site"),
            KeyType::Variant => write!(f, "variant"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
    General,
    Conservation,
    Pathogenicity,
    PopulationFrequency,
    Phenotype,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationCategory {
    pub name: String,
    pub key_type: KeyType,
    pub group: CategoryGroup,
    pub file_name: String,
    pub fields: Vec<FieldDefinition>,
}

impl AnnotationCategory {
    pub fn new(
        name: &str,
        key_type: KeyType,
        group: CategoryGroup,
        file_name: &str,
        fields: Vec<FieldDefinition>,
    ) -> Self {
        AnnotationCategory {
            name: name.to_string(),
            key_type,
            group,
            file_name: file_name.to_string(),
            fields,
        }
    }
}

///
/// Which optional category groups to load. The general group is always
/// loaded.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationFlags {
    pub population_freqs: bool,
    pub patho_predictions: bool,
    pub phenotype_annot: bool,
    pub conservation_scores: bool,
}

impl Default for AnnotationFlags {
    fn default() -> Self {
        AnnotationFlags {
            population_freqs: true,
            patho_predictions: true,
            phenotype_annot: true,
            conservation_scores: true,
        }
    }
}

impl AnnotationFlags {
    pub fn includes(&self, group: CategoryGroup) -> bool {
        match group {
            CategoryGroup::General => true,
            CategoryGroup::Conservation => self.conservation_scores,
            CategoryGroup::Pathogenicity => self.patho_predictions,
            CategoryGroup::PopulationFrequency => self.population_freqs,
            CategoryGroup::Phenotype => self.phenotype_annot,
        }
    }
}

impl From<&AnnotationSettings> for AnnotationFlags {
    fn from(settings: &AnnotationSettings) -> Self {
        AnnotationFlags {
            population_freqs: settings.population_freqs,
            patho_predictions: settings.patho_predictions,
            phenotype_annot: settings.phenotype_annot,
            conservation_scores: settings.conservation_scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRegistry {
    categories: Vec<AnnotationCategory>,
}

impl AnnotationRegistry {
    ///
    /// Build a registry from a list of categories.
    ///
    /// A field id may only be declared once per key type. A site field and a
    /// variant field may share a name; both are then written under their
    /// [`KeyType::namespaced`] ids, which must not clash with any other id.
    pub fn new(categories: Vec<AnnotationCategory>) -> AnnotationResult<Self> {
        let mut owners: FxHashMap<(KeyType, &str), &str> = FxHashMap::default();

        for category in &categories {
            for field in &category.fields {
                let owner = (category.key_type, field.id.as_str());
                if let Some(first) = owners.insert(owner, category.name.as_str()) {
                    return Err(AnnotationError::FieldCollision {
                        field: field.id.clone(),
                        first: first.to_string(),
                        second: category.name.clone(),
                    });
                }
            }
        }

        let mut written: FxHashMap<String, &str> = FxHashMap::default();
        for category in &categories {
            for field in &category.fields {
                let shared = owners.contains_key(&(category.key_type.other(), field.id.as_str()));
                let id = if shared {
                    category.key_type.namespaced(&field.id)
                } else {
                    field.id.clone()
                };
                if let Some(first) = written.insert(id.clone(), category.name.as_str()) {
                    return Err(AnnotationError::FieldCollision {
                        field: id,
                        first: first.to_string(),
                        second: category.name.clone(),
                    });
                }
            }
        }

        Ok(AnnotationRegistry { categories })
    }

    /// The categories shipped with the mitochondrial annotation bundle.
    pub fn mitochondrial() -> Self {
        use CategoryGroup::*;
        use FieldType::{Float, Integer, String as Str};
        use KeyType::*;

        let def = FieldDefinition::new;

        let categories = vec![
            AnnotationCategory::new(
                "general",
                Site,
                General,
                "general_annot.csv",
                vec![
                    def("LOCUS", Str, "Variant locus/gene"),
                    def("BIOTYPE", Str, "Locus/gene biotype"),
                ],
            ),
            AnnotationCategory::new(
                "conservation_scores",
                Site,
                Conservation,
                "conservation_scores.csv",
                vec![
                    def(
                        "phastCons100way",
                        Float,
                        "PhastCons conservation score (conserved: score > 0.7 [soft threshold])",
                    ),
                    def(
                        "phyloP100way",
                        Float,
                        "PhyloP conservation score (conserved: score > 0)",
                    ),
                ],
            ),
            AnnotationCategory::new(
                "sift",
                Variant,
                Pathogenicity,
                "sift.csv",
                vec![
                    def("SIFT", Str, "Pathogenicity classification from SIFT"),
                    def("SIFT_score", Float, "Pathogenicity prediction score from SIFT"),
                ],
            ),
            AnnotationCategory::new(
                "mitotip",
                Variant,
                Pathogenicity,
                "mitotip.csv",
                vec![
                    def("MitoTIP_Score", Float, "tRNA raw pathogenicity score from Mitotip"),
                    def(
                        "MitoTIP_Prediction",
                        Str,
                        "tRNA pathogenicity classification from Mitotip",
                    ),
                ],
            ),
            AnnotationCategory::new(
                "pon_mt_trna",
                Variant,
                Pathogenicity,
                "pon_mt_trna.csv",
                vec![
                    def(
                        "PONmttRNA_Probability",
                        Float,
                        "tRNA probability of pathogenicity from PON-mt-tRNA",
                    ),
                    def(
                        "PONmttRNA_Prediction",
                        Str,
                        "tRNA pathogenicity classification from PON-mt-tRNA",
                    ),
                ],
            ),
            AnnotationCategory::new(
                "gnomad",
                Variant,
                PopulationFrequency,
                "gnomad_freq.csv",
                vec![
                    def(
                        "GNOMAD_AC_HOM",
                        Float,
                        "Gnomad allele count restricted to variants with a heteroplasmy level >= 0.95",
                    ),
                    def(
                        "GNOMAD_AF_HOM",
                        Float,
                        "Gnomad allele frequency restricted to variants with a heteroplasmy level >= 0.95",
                    ),
                    def(
                        "GNOMAD_AF_HET",
                        Float,
                        "Gnomad allele frequency restricted to variants with a heteroplasmy level >= 0.10 and < 0.95",
                    ),
                    def(
                        "GNOMAD_AC_HET",
                        Float,
                        "Gnomad allele count restricted to variants with a heteroplasmy level >= 0.10 and < 0.95",
                    ),
                ],
            ),
            AnnotationCategory::new(
                "mitomap",
                Variant,
                Phenotype,
                "mitomap.csv",
                vec![
                    def(
                        "MITOMAP_GENBANK_AC",
                        Float,
                        "Allele count in GenBank out of 61168 full length (FL) human chrM sequences",
                    ),
                    def(
                        "MITOMAP_GENBANK_AF",
                        Float,
                        "Allele Frequency in full length (FL) Genbank sequence set",
                    ),
                    def("MITOMAP_PubmedIDs", Integer, "Pubmed IDs"),
                    def("MITOMAP_Disease", Str, "Putative Disease Association"),
                    def("MITOMAP_DiseaseStatus", Str, "Disease Association Status"),
                ],
            ),
            AnnotationCategory::new(
                "clinvar",
                Variant,
                Phenotype,
                "clinvar.csv",
                vec![
                    def("ClinVar_ID", Str, "ClinVar Variation ID"),
                    def("CLNDN", Str, "ClinVar disease name associated with variant"),
                    def("CLNSIG", Str, "Clinical significance for variant"),
                    def("CLNDISDB", Str, "Disease database name and identifier for variant"),
                ],
            ),
        ];

        AnnotationRegistry { categories }
    }

    pub fn categories(&self) -> &[AnnotationCategory] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Categories selected by `flags`, in registry order.
    pub fn enabled(&self, flags: &AnnotationFlags) -> Vec<&AnnotationCategory> {
        self.categories
            .iter()
            .filter(|c| flags.includes(c.group))
            .collect()
    }
}
