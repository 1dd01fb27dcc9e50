//! Reference genome, blacklist and annotation resource lookup.
//!
//! All paths are resolved once from a data directory at pipeline start and
//! passed explicitly into every stage that needs them.
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::SNPEFF_DB;
use crate::errors::CoreError;

pub const REFERENCE_SUBFOLDER: &str = "mt_reference";
pub const FILTER_SUBFOLDER: &str = "filter_data";
pub const ANNOTATION_SUBFOLDER: &str = "annotation_data";

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MtReference {
    #[default]
    Rcrs,
    Rsrs,
}

impl MtReference {
    pub fn name(&self) -> &'static str {
        match self {
            MtReference::Rcrs => "rcrs",
            MtReference::Rsrs => "rsrs",
        }
    }

    /// Phylotree used by haplogrep3 for this reference.
    pub fn phylotree(&self) -> &'static str {
        match self {
            MtReference::Rcrs => "phylotree-rcrs@17.2",
            MtReference::Rsrs => "phylotree-rsrs@17.1",
        }
    }
}

impl FromStr for MtReference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rcrs" => Ok(MtReference::Rcrs),
            "rsrs" => Ok(MtReference::Rsrs),
            _ => Err(CoreError::UnknownReference(s.to_string())),
        }
    }
}

impl Display for MtReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// Files belonging to one mitochondrial reference.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceConfig {
    pub reference: MtReference,
    pub fasta: PathBuf,
    pub shifted_fasta: PathBuf,
    pub shift_back_chain: PathBuf,
    pub blacklist: PathBuf,
}

impl ReferenceConfig {
    ///
    /// Resolve the reference files under a data directory laid out as
    /// `mt_reference/<ref>/<ref>.fasta` and `filter_data/<ref>_blacklist.bed`.
    ///
    pub fn resolve(data_dir: &Path, reference: MtReference) -> Self {
        let name = reference.name();
        let ref_dir = data_dir.join(REFERENCE_SUBFOLDER).join(name);

        ReferenceConfig {
            reference,
            fasta: ref_dir.join(format!("{}.fasta", name)),
            shifted_fasta: ref_dir.join(format!("{}_shifted.fasta", name)),
            shift_back_chain: ref_dir.join(format!("{}.shift_back.chain", name)),
            blacklist: data_dir
                .join(FILTER_SUBFOLDER)
                .join(format!("{}_blacklist.bed", name)),
        }
    }

    pub fn fasta_for(&self, shifted: bool) -> &Path {
        if shifted {
            &self.shifted_fasta
        } else {
            &self.fasta
        }
    }

    /// Reference files that are expected to exist before any stage runs.
    pub fn required_files(&self) -> Vec<&Path> {
        vec![
            self.fasta.as_path(),
            self.shifted_fasta.as_path(),
            self.shift_back_chain.as_path(),
            self.blacklist.as_path(),
        ]
    }
}

///
/// Location of the annotation tables and the snpEff database.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationResources {
    pub annotation_dir: PathBuf,
    pub snpeff_config: PathBuf,
    pub snpeff_db: String,
}

impl AnnotationResources {
    pub fn resolve(data_dir: &Path) -> Self {
        let annotation_dir = data_dir.join(ANNOTATION_SUBFOLDER);
        AnnotationResources {
            snpeff_config: annotation_dir.join("snpeff").join("snpeff.config"),
            annotation_dir,
            snpeff_db: SNPEFF_DB.to_string(),
        }
    }

    /// Annotation tables live directly in a single directory.
    pub fn from_dir(annotation_dir: &Path) -> Self {
        AnnotationResources {
            annotation_dir: annotation_dir.to_path_buf(),
            snpeff_config: annotation_dir.join("snpeff").join("snpeff.config"),
            snpeff_db: SNPEFF_DB.to_string(),
        }
    }

    pub fn table_path(&self, file_name: &str) -> PathBuf {
        self.annotation_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("rcrs", MtReference::Rcrs)]
    #[case("RSRS", MtReference::Rsrs)]
    fn test_reference_from_str(#[case] name: &str, #[case] expected: MtReference) {
        assert_eq!(MtReference::from_str(name).unwrap(), expected);
    }

    #[rstest]
    fn test_unknown_reference() {
        assert!(matches!(
            MtReference::from_str("hg19"),
            Err(CoreError::UnknownReference(_))
        ));
    }

    #[rstest]
    fn test_resolve_reference_paths() {
        let config = ReferenceConfig::resolve(Path::new("/data"), MtReference::Rsrs);
        assert_eq!(
            config.fasta,
            PathBuf::from("/data/mt_reference/rsrs/rsrs.fasta")
        );
        assert_eq!(
            config.fasta_for(true),
            Path::new("/data/mt_reference/rsrs/rsrs_shifted.fasta")
        );
        assert_eq!(
            config.shift_back_chain,
            PathBuf::from("/data/mt_reference/rsrs/rsrs.shift_back.chain")
        );
        assert_eq!(
            config.blacklist,
            PathBuf::from("/data/filter_data/rsrs_blacklist.bed")
        );
    }

    #[rstest]
    fn test_annotation_table_path() {
        let resources = AnnotationResources::resolve(Path::new("/data"));
        assert_eq!(
            resources.table_path("gnomad_freq.csv"),
            PathBuf::from("/data/annotation_data/gnomad_freq.csv")
        );
        assert_eq!(resources.snpeff_db, "NC_012920");
    }
}
