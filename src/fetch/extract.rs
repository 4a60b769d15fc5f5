//! Archive extraction capability.
//!
//! The fetch pipeline does not unpack archives itself. It hands the archive
//! path and destination directory to an [`Extractor`] and inspects the exit
//! code. [`TarExtractor`] shells out to the system `tar`; tests substitute
//! their own implementation.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured result of one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOutput {
    /// Process exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ExtractOutput {
    /// A clean exit with no output.
    pub fn success() -> Self {
        Self::default()
    }

    /// Whether the tool exited with status 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined for logging.
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Unpacks a gzip tar archive into a directory.
///
/// Implementations are called from a blocking thread and may block.
pub trait Extractor: Send + Sync {
    /// Extract `archive` into `dest`, the equivalent of `tar -xzf archive`
    /// run inside `dest`.
    ///
    /// # Errors
    ///
    /// Only failures to run the tool at all are errors; a tool that runs and
    /// fails reports it through [`ExtractOutput::exit_code`].
    fn extract(&self, archive: &Path, dest: &Path) -> io::Result<ExtractOutput>;
}

/// Extracts with the system `tar` binary.
#[derive(Debug, Clone)]
pub struct TarExtractor {
    program: PathBuf,
}

impl TarExtractor {
    /// Locate `tar` on `PATH`, falling back to the bare name.
    pub fn new() -> Self {
        let program = which::which("tar").unwrap_or_else(|e| {
            tracing::warn!(target: "quilt::fetch", "Could not locate tar on PATH: {}", e);
            PathBuf::from("tar")
        });
        Self { program }
    }

    /// Use a specific `tar` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The binary this extractor runs.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for TarExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for TarExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> io::Result<ExtractOutput> {
        // tar runs inside `dest`; a relative archive path would resolve against it
        let archive = std::path::absolute(archive)?;
        tracing::debug!(
            target: "quilt::fetch",
            "Executing command: {} -xzf {} (in {})",
            self.program.display(),
            archive.display(),
            dest.display()
        );

        let output = Command::new(&self.program)
            .arg("-xzf")
            .arg(&archive)
            .current_dir(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ExtractOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
