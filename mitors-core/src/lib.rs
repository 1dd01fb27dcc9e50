//! # Core types for mitochondrial variant analysis
//!
//! Shared building blocks for the other `mitors` crates:
//!
//! - genomic keys used to join annotation sources to variant calls
//! - nullable typed field values and their VCF header definitions
//! - reference and annotation resource configuration, resolved once per run
//! - the TOML pipeline configuration
//! - small file utilities (gzip-aware readers, output path helpers)
pub mod config;
pub mod consts;
pub mod errors;
pub mod models;
pub mod reference;
pub mod utils;

// re-exports
pub use config::PipelineConfig;
pub use errors::CoreError;
pub use models::{FieldDefinition, FieldType, FieldValue, GenomicKey, SiteKey};
pub use reference::{AnnotationResources, MtReference, ReferenceConfig};
