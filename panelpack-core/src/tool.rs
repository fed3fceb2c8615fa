//! Discovery and invocation of external command-line tools

use crate::error::{PanelpackError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of one external tool run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Successful output with no captured text
    #[cfg(test)]
    pub(crate) fn ok() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        let err = self.stderr.trim_end();
        if !out.is_empty() && !err.is_empty() {
            out.push('\n');
        }
        out.push_str(err);
        out
    }

    /// Turn a non-zero exit into [`PanelpackError::ToolFailed`]
    pub fn into_result(self, tool: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(PanelpackError::ToolFailed {
                tool: tool.to_string(),
                code: self.code,
                output: self.combined(),
            })
        }
    }
}

/// Trait for running external programs
pub trait ToolRunner {
    /// Run `program` with `args`, blocking until it exits
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ToolOutput>;
}

/// Runs tools as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ToolOutput> {
        tracing::debug!("Running {:?} {:?}", program, args);

        let output = Command::new(program).args(args).output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ToolOutput> {
        (**self).run(program, args)
    }
}

/// Locate an executable.
///
/// Names containing a path separator are taken as paths and must point at an
/// existing file. Bare names are searched through `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    find_executable_in(name, std::env::var_os("PATH").as_deref())
}

/// [`find_executable`] against an explicit `PATH` value
pub fn find_executable_in(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let as_path = Path::new(name);
    if as_path.is_absolute() || as_path.components().count() > 1 {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }

    std::env::split_paths(path_var?)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut out = vec![dir.join(name)];
    if Path::new(name).extension().is_none() {
        for ext in ["exe", "bat", "cmd"] {
            out.push(dir.join(format!("{}.{}", name, ext)));
        }
    }
    out
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
