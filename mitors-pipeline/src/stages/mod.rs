//! Pipeline stages. Each stage builds the tool invocations it needs, runs
//! them through a [`CommandRunner`] and checks that its outputs exist.
pub mod align;
pub mod annotate;
pub mod call;
pub mod coverage;
pub mod haplogroup;
pub mod merge;
pub mod postprocess;
pub mod preprocess;

use std::path::{Path, PathBuf};

use log::info;
use mitors_core::ReferenceConfig;
use mitors_core::config::ToolPaths;
use mitors_core::utils::{file_basename, file_directory, missing_files};

use crate::errors::{PipelineError, PipelineResult};
use crate::executable::{CommandRunner, Invocation};

///
/// What every stage needs besides its own inputs: a way to run tools,
/// where the tools are and the resolved reference files.
///
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub tools: &'a ToolPaths,
    pub reference: &'a ReferenceConfig,
}

impl<'a> StageContext<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        tools: &'a ToolPaths,
        reference: &'a ReferenceConfig,
    ) -> Self {
        StageContext {
            runner,
            tools,
            reference,
        }
    }

    pub fn gatk(&self, tool: &str) -> Invocation {
        Invocation::new(&self.tools.gatk).subcommand(tool)
    }

    pub fn run(&self, invocation: &Invocation) -> PipelineResult<()> {
        self.runner.run(invocation)
    }
}

///
/// Output directory and file prefix of a stage. Unset values default to
/// the directory and basename of the main input.
///
pub fn output_location(
    input: &Path,
    out_dir: Option<&Path>,
    prefix: Option<&str>,
) -> (PathBuf, String) {
    let out_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file_directory(input));
    let prefix = prefix
        .map(str::to_string)
        .unwrap_or_else(|| file_basename(input));
    (out_dir, prefix)
}

pub fn ensure_inputs<P: AsRef<Path>>(files: &[P]) -> PipelineResult<()> {
    match missing_files(files).into_iter().next() {
        Some(missing) => Err(PipelineError::MissingInput(missing)),
        None => Ok(()),
    }
}

pub(crate) fn ensure_outputs<P: AsRef<Path>>(stage: &str, files: &[P]) -> PipelineResult<()> {
    let missing = missing_files(files);
    if !missing.is_empty() {
        return Err(PipelineError::MissingOutputs {
            stage: stage.to_string(),
            files: missing,
        });
    }
    info!("{} completed successfully.", stage);
    Ok(())
}
