//! External tool invocation.
//!
//! Stages describe the commands they need as [`Invocation`]s and hand them
//! to a [`CommandRunner`]. [`SystemRunner`] spawns real processes;
//! [`RecordingRunner`] only records them.
use std::cell::RefCell;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error, info};

use crate::errors::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// `true` emits the bare key, `false` emits nothing.
    Flag(bool),
    Value(OsString),
    /// The key is repeated once per value.
    Repeated(Vec<OsString>),
}

///
/// One external command: `program [subcommand] [options] [positionals] [> redirect]`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub subcommand: Option<String>,
    pub options: Vec<(String, OptionValue)>,
    pub positionals: Vec<OsString>,
    pub redirect: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: &str) -> Self {
        Invocation {
            program: program.to_string(),
            subcommand: None,
            options: vec![],
            positionals: vec![],
            redirect: None,
        }
    }

    pub fn subcommand(mut self, subcommand: &str) -> Self {
        self.subcommand = Some(subcommand.to_string());
        self
    }

    pub fn flag(self, key: &str) -> Self {
        self.switch(key, true)
    }

    pub fn switch(mut self, key: &str, on: bool) -> Self {
        self.options.push((key.to_string(), OptionValue::Flag(on)));
        self
    }

    pub fn opt<V: AsRef<OsStr>>(mut self, key: &str, value: V) -> Self {
        self.options.push((
            key.to_string(),
            OptionValue::Value(value.as_ref().to_os_string()),
        ));
        self
    }

    pub fn repeated<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<OsStr>,
    {
        let values = values
            .into_iter()
            .map(|v| v.as_ref().to_os_string())
            .collect();
        self.options
            .push((key.to_string(), OptionValue::Repeated(values)));
        self
    }

    pub fn arg<V: AsRef<OsStr>>(mut self, value: V) -> Self {
        self.positionals.push(value.as_ref().to_os_string());
        self
    }

    pub fn args_from<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<OsStr>,
    {
        self.positionals
            .extend(values.into_iter().map(|v| v.as_ref().to_os_string()));
        self
    }

    /// Send standard output to a file.
    pub fn redirect<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.redirect = Some(path.as_ref().to_path_buf());
        self
    }

    ///
    /// Render the argument vector, without the program name.
    ///
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![];

        if let Some(subcommand) = &self.subcommand {
            args.push(subcommand.into());
        }

        for (key, value) in &self.options {
            match value {
                OptionValue::Flag(true) => args.push(key.into()),
                OptionValue::Flag(false) => {}
                OptionValue::Value(v) => {
                    args.push(key.into());
                    args.push(v.clone());
                }
                OptionValue::Repeated(values) => {
                    for v in values {
                        args.push(key.into());
                        args.push(v.clone());
                    }
                }
            }
        }

        args.extend(self.positionals.iter().cloned());
        args
    }

    /// Value of the last occurrence of an option.
    pub fn option_value(&self, key: &str) -> Option<&OsStr> {
        self.options.iter().rev().find_map(|(k, v)| match v {
            OptionValue::Value(v) if k == key => Some(v.as_os_str()),
            OptionValue::Repeated(values) if k == key => values.last().map(|v| v.as_os_str()),
            _ => None,
        })
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(redirect) = &self.redirect {
            write!(f, " > {}", redirect.display())?;
        }
        Ok(())
    }
}

///
/// Capability to execute external commands.
///
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> PipelineResult<()>;
}

///
/// Locate an executable the way a shell would: paths containing a separator
/// are used as given, bare names are searched on `PATH`.
///
pub fn resolve_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

/// Runs commands as child processes, without a shell.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Stream tool output to the terminal instead of capturing it.
    pub verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        SystemRunner { verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> PipelineResult<()> {
        let program = resolve_executable(&invocation.program)
            .ok_or_else(|| PipelineError::ExecutableNotFound(invocation.program.clone()))?;

        info!("Running command: {}", invocation);

        let mut command = Command::new(&program);
        command.args(invocation.args());

        let stdout = match &invocation.redirect {
            Some(path) => Stdio::from(File::create(path)?),
            None if self.verbose => Stdio::inherit(),
            None => Stdio::piped(),
        };
        let stderr = if self.verbose {
            Stdio::inherit()
        } else {
            Stdio::piped()
        };

        let output = command.stdout(stdout).stderr(stderr).output()?;

        if !output.stdout.is_empty() {
            debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Command failed: {}", invocation);
            return Err(PipelineError::CommandFailed {
                command: invocation.to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}

type Hook = Box<dyn Fn(&Invocation) -> std::io::Result<()>>;

///
/// Records every invocation instead of running it. An optional hook is
/// called for each one, e.g. to create the files a tool would have written.
///
#[derive(Default)]
pub struct RecordingRunner {
    invocations: RefCell<Vec<Invocation>>,
    hook: Option<Hook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook<F>(hook: F) -> Self
    where
        F: Fn(&Invocation) -> std::io::Result<()> + 'static,
    {
        RecordingRunner {
            invocations: RefCell::new(vec![]),
            hook: Some(Box::new(hook)),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Rendered command lines, in execution order.
    pub fn commands(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|i| i.to_string())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> PipelineResult<()> {
        debug!("Recording command: {}", invocation);
        self.invocations.borrow_mut().push(invocation.clone());
        if let Some(hook) = &self.hook {
            hook(invocation)?;
        }
        Ok(())
    }
}
