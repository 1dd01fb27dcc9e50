use std::path::{Path, PathBuf};

use thiserror::Error;

use mitors_annotate::AnnotationError;
use mitors_core::CoreError;
use mitors_coverage::CoverageError;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Executable '{0}' not found. Make sure it is installed and on PATH")]
    ExecutableNotFound(String),

    #[error("Command failed with {status}: {command}\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{stage} did not produce the expected outputs: {}", display_paths(.files))]
    MissingOutputs { stage: String, files: Vec<PathBuf> },

    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("A reference FASTA is required for CRAM input: {0}")]
    MissingCramReference(PathBuf),

    #[error("No mitochondrial contig (MT or chrM) in the header of {0}")]
    MtContigNotFound(PathBuf),

    #[error("Failed to read alignment header of {path}: {message}")]
    AlignmentHeader { path: PathBuf, message: String },

    #[error("Failed to read contamination estimate from {path}: {message}")]
    Contamination { path: PathBuf, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Coverage(#[from] CoverageError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn contamination(path: &Path, message: impl ToString) -> Self {
        PipelineError::Contamination {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
