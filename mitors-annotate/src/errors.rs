use std::path::PathBuf;

use mitors_core::CoreError;
use thiserror::Error;

use crate::registry::KeyType;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Annotation source '{category}' is missing or empty: {path}")]
    MissingAnnotationSource { category: String, path: PathBuf },

    #[error("Annotation source '{category}' has no column '{column}'")]
    MissingColumn { category: String, column: String },

    #[error("Table '{table}' is keyed by {found}, expected {expected}")]
    KeyTypeMismatch {
        table: String,
        expected: KeyType,
        found: KeyType,
    },

    #[error("Field '{field}' is provided by both '{first}' and '{second}'")]
    FieldCollision {
        field: String,
        first: String,
        second: String,
    },

    #[error("Invalid value in '{category}' at line {line}: {message}")]
    InvalidValue {
        category: String,
        line: u64,
        message: String,
    },

    #[error("Malformed variant record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },

    #[error("Homoplasmy threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Invalid VCF {path}: {message}")]
    Vcf { path: PathBuf, message: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnnotationError {
    pub(crate) fn invalid_value(category: &str, line: u64, err: CoreError) -> Self {
        AnnotationError::InvalidValue {
            category: category.to_string(),
            line,
            message: err.to_string(),
        }
    }
}

pub type AnnotationResult<T> = std::result::Result<T, AnnotationError>;
