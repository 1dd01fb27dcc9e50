use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    CANONICAL_TRUSTED_END, CANONICAL_TRUSTED_START, DEFAULT_HOMOPLASMY_THRESHOLD, DEFAULT_SHIFT,
    MT_GENOME_LENGTH, SHIFTED_TRUSTED_END, SHIFTED_TRUSTED_START,
};
use crate::errors::CoreError;
use crate::reference::{AnnotationResources, MtReference, ReferenceConfig};

///
/// Paths (or names on `PATH`) of the external executables.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ToolPaths {
    pub gatk: String,
    pub bwamem2: String,
    pub samtools: String,
    pub snpeff: String,
    pub haplogrep3: String,
    pub haplocheck: String,
    pub mosdepth: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            gatk: "gatk".to_string(),
            bwamem2: "bwa-mem2".to_string(),
            samtools: "samtools".to_string(),
            snpeff: "snpeff".to_string(),
            haplogrep3: "haplogrep3".to_string(),
            haplocheck: "haplocheck".to_string(),
            mosdepth: "mosdepth".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CallingSettings {
    /// Extra arguments appended verbatim to the Mutect2 call.
    pub m2_extra_args: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PostprocessSettings {
    pub f_score_beta: f64,
    pub contamination_filter: bool,
    pub max_alt_allele_count: u32,
    pub vaf_threshold: f64,
    /// Median autosomal coverage; NuMT filtering runs when non-zero.
    pub autosomal_coverage: f64,
    /// Custom blacklist BED; the reference blacklist is used when unset.
    pub blacklisted_sites: Option<PathBuf>,
    pub remove_non_pass: bool,
    pub normalize: bool,
}

impl Default for PostprocessSettings {
    fn default() -> Self {
        PostprocessSettings {
            f_score_beta: 1.0,
            contamination_filter: true,
            max_alt_allele_count: 4,
            vaf_threshold: 0.0,
            autosomal_coverage: 0.0,
            blacklisted_sites: None,
            remove_non_pass: true,
            normalize: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnnotationSettings {
    pub min_hom_threshold: f64,
    pub population_freqs: bool,
    pub patho_predictions: bool,
    pub phenotype_annot: bool,
    pub conservation_scores: bool,
    pub create_report: bool,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        AnnotationSettings {
            min_hom_threshold: DEFAULT_HOMOPLASMY_THRESHOLD,
            population_freqs: true,
            patho_predictions: true,
            phenotype_annot: true,
            conservation_scores: true,
            create_report: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CoverageSettings {
    pub genome_length: u32,
    pub shift: u32,
    /// Closed interval in canonical coordinates.
    pub canonical_trusted: [u32; 2],
    /// Closed interval in shifted coordinates.
    pub shifted_trusted: [u32; 2],
}

impl Default for CoverageSettings {
    fn default() -> Self {
        CoverageSettings {
            genome_length: MT_GENOME_LENGTH,
            shift: DEFAULT_SHIFT,
            canonical_trusted: [CANONICAL_TRUSTED_START, CANONICAL_TRUSTED_END],
            shifted_trusted: [SHIFTED_TRUSTED_START, SHIFTED_TRUSTED_END],
        }
    }
}

///
/// Pipeline configuration, usually read from a TOML file. Every field has
/// a default so a partial (or empty) file is valid.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub reference: MtReference,
    pub data_dir: PathBuf,
    pub tmp_dir: String,
    pub remove_tmp: bool,
    pub ncores: i32,
    pub verbose: bool,
    pub tools: ToolPaths,
    pub calling: CallingSettings,
    pub postprocess: PostprocessSettings,
    pub annotation: AnnotationSettings,
    pub coverage: CoverageSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            reference: MtReference::default(),
            data_dir: PathBuf::from("data"),
            tmp_dir: "tmp".to_string(),
            remove_tmp: false,
            ncores: 1,
            verbose: false,
            tools: ToolPaths::default(),
            calling: CallingSettings::default(),
            postprocess: PostprocessSettings::default(),
            annotation: AnnotationSettings::default(),
            coverage: CoverageSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn reference_config(&self) -> ReferenceConfig {
        ReferenceConfig::resolve(&self.data_dir, self.reference)
    }

    pub fn annotation_resources(&self) -> AnnotationResources {
        AnnotationResources::resolve(&self.data_dir)
    }

    /// Length of the mitochondrial reference every stage validates positions against.
    pub fn genome_length(&self) -> u32 {
        self.coverage.genome_length
    }
}

impl TryFrom<&Path> for PipelineConfig {
    type Error = CoreError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
