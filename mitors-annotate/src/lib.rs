//! # Annotation of mitochondrial variant calls
//!
//! Loads the annotation sources of a run into two joined tables (one keyed
//! by position, one by allele), injects the matching fields into each
//! record of a single-sample call-set, assigns a homoplasmic or
//! heteroplasmic genotype from the allele fraction, and flattens the result
//! into a CSV report.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mitors_annotate::{AnnotationFlags, AnnotationRegistry, AnnotationStore, annotate_vcf};
//! use mitors_core::AnnotationResources;
//! use mitors_core::consts::MT_GENOME_LENGTH;
//!
//! let resources = AnnotationResources::resolve(Path::new("data"));
//! let store = AnnotationStore::load(
//!     &AnnotationRegistry::mitochondrial(),
//!     &resources,
//!     &AnnotationFlags::default(),
//!     MT_GENOME_LENGTH,
//! )
//! .unwrap();
//!
//! annotate_vcf(
//!     Path::new("sample_snpeff.vcf"),
//!     Path::new("sample_annotated.vcf"),
//!     &store,
//!     0.95,
//! )
//! .unwrap();
//! ```
pub mod annotator;
pub mod errors;
pub mod registry;
pub mod report;
pub mod store;
pub mod table;
pub mod vcf;

// re-exports
pub use annotator::{Genotype, annotate, annotate_record, annotate_vcf, derive_genotype};
pub use errors::{AnnotationError, AnnotationResult};
pub use registry::{AnnotationCategory, AnnotationFlags, AnnotationRegistry, CategoryGroup, KeyType};
pub use report::{Report, ReportLayout, flatten};
pub use store::{AnnotationStore, UnifiedTable, merge_all};
pub use table::{AnnotationKey, AnnotationTable};
pub use vcf::{VariantRecord, VcfHeader, VcfReader, VcfWriter};
