//! # Mitochondrial variant-calling pipeline
//!
//! Thin orchestration around the external tools (GATK, bwa-mem2, samtools,
//! mosdepth, snpEff, haplocheck, haplogrep3): every stage builds the tool
//! invocations it needs and runs them through a [`CommandRunner`], then
//! checks that its outputs exist. Coverage stitching and annotation run
//! in-process through `mitors-coverage` and `mitors-annotate`.
//!
//! ```no_run
//! use std::path::Path;
//! use mitors_core::PipelineConfig;
//! use mitors_pipeline::{PipelineInput, SystemRunner, run_pipeline};
//!
//! let config = PipelineConfig::default();
//! let input = PipelineInput::new(Path::new("NA12878.bam"), Some(Path::new("out")), None);
//! let outputs = run_pipeline(&SystemRunner::new(false), &config, &input).unwrap();
//! println!("{}", outputs.results_dir.display());
//! ```
pub mod errors;
pub mod executable;
pub mod pipeline;
pub mod stages;

// re-exports
pub use errors::{PipelineError, PipelineResult};
pub use executable::{CommandRunner, Invocation, OptionValue, RecordingRunner, SystemRunner};
pub use pipeline::{PipelineInput, PipelineOutputs, run_pipeline};
pub use stages::{StageContext, output_location};
