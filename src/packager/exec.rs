//! External command execution.
//!
//! Every subprocess the pipeline starts goes through [`CommandExecutor`].
//! Production code uses [`ProcessExecutor`]; tests substitute a recorder.

use crate::packager::{
    env::EnvMap,
    error::{Error, Result},
    stages::Stage,
};
use std::future::Future;
use std::path::{Path, PathBuf};

/// A single subprocess call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Full child environment. `None` inherits the ambient environment.
    pub env: Option<EnvMap>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: None,
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replaces the child environment entirely.
    pub fn env(mut self, env: EnvMap) -> Self {
        self.env = Some(env);
        self
    }

    /// Program name without directories, for matching in logs and tests.
    pub fn program_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `program arg1 arg2 ...` for diagnostics.
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status of a finished subprocess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Runs subprocesses to completion.
pub trait CommandExecutor {
    /// Runs `invocation` and waits for it to exit.
    ///
    /// Errors only when the program cannot be started; a non-zero exit is
    /// reported through the returned status.
    fn execute(&self, invocation: &Invocation) -> impl Future<Output = Result<CommandStatus>>;
}

/// Runs `invocation` and turns a non-zero exit into [`Error::ToolInvocation`].
pub async fn run_checked<E: CommandExecutor>(
    executor: &E,
    stage: Stage,
    invocation: Invocation,
) -> Result<()> {
    log::debug!("[{stage}] {}", invocation.display());
    let status = executor.execute(&invocation).await?;
    if !status.success() {
        return Err(Error::ToolInvocation {
            stage,
            command: invocation.display(),
            code: status.code,
        });
    }
    Ok(())
}

/// Spawns real processes with tokio, inheriting stdio.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandStatus> {
        // Resolves `npm` to `npm.cmd` and friends on Windows.
        let program = which::which(&invocation.program).unwrap_or_else(|_| invocation.program.clone());

        let mut command = tokio::process::Command::new(&program);
        command.args(&invocation.args).current_dir(&invocation.cwd);
        if let Some(env) = &invocation.env {
            command.env_clear().envs(env);
        }

        let status = command.status().await.map_err(|error| Error::ToolSpawn {
            command: invocation.display(),
            error,
        })?;
        Ok(status.into())
    }
}
