//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{bail, Context, Result};

use crate::core::error::SdkError;
use crate::core::platform::RuntimeVersion;

/// Interpreter names searched on PATH, in order.
pub const PYTHON_CANDIDATES: &[&str] = &["python", "python3"];

/// Snippet that prints the interpreter's `major.minor` version.
const PYTHON_VERSION_SNIPPET: &str = "import sys; print('%d.%d' % sys.version_info[:2])";

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command with captured output and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Execute with captured output and require success.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                stderr
            );
        }
        Ok(output)
    }

    /// Execute with inherited stdio and return status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }

    /// Execute with inherited stdio and require success.
    pub fn run(&self) -> Result<()> {
        tracing::debug!("Running `{}`", self.display_command());
        let status = self.status()?;
        if !status.success() {
            bail!(
                "`{}` failed with exit code {:?}",
                self.display_command(),
                status.code()
            );
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake, preferring an explicitly configured binary.
pub fn find_cmake(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    find_executable("cmake").ok_or_else(|| {
        anyhow::anyhow!(
            "CMake not found\n\
             \n\
             CMake is required to unpack the SDK and to configure the module.\n\
             Install CMake and ensure it's in your PATH, or set `[build] cmake` in the config."
        )
    })
}

/// Find the Python interpreter.
///
/// An explicit override wins unconditionally; otherwise the names in
/// [`PYTHON_CANDIDATES`] are searched on PATH.
pub fn find_python(explicit: Option<&Path>) -> Result<PathBuf, SdkError> {
    find_python_with(explicit, find_executable)
}

/// [`find_python`] with a custom PATH lookup.
pub fn find_python_with<F>(explicit: Option<&Path>, lookup: F) -> Result<PathBuf, SdkError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(path) = explicit {
        if !path.exists() {
            tracing::warn!(
                "Python3_EXECUTABLE points to {}, which does not exist",
                path.display()
            );
        }
        return Ok(path.to_path_buf());
    }

    PYTHON_CANDIDATES
        .iter()
        .find_map(|name| lookup(name))
        .ok_or_else(|| SdkError::RuntimeExecutableNotFound {
            searched: PYTHON_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        })
}

/// Ask an interpreter for its `major.minor` version.
pub fn probe_python_version(python: &Path) -> Result<RuntimeVersion> {
    let output = ProcessBuilder::new(python)
        .args(["-c", PYTHON_VERSION_SNIPPET])
        .exec_and_check()
        .with_context(|| format!("failed to query the version of {}", python.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.trim().parse::<RuntimeVersion>()?;
    tracing::debug!("{} reports Python {}", python.display(), version);
    Ok(version)
}
