//! Common test utilities for Quilt integration tests
//!
//! Builds version archives, a mock archive store and services wired to it.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use httpmock::MockServer;
use quilt::config::QuiltConfig;
use quilt::fetch::{ExtractOutput, Extractor};
use quilt::service::Quilt;
use quilt::test_utils::VersionFixture;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// URL path the mock store serves archives under.
pub const ARCHIVE_PATH: &str = "/archives";

/// Pack a version fixture as a gzip tar archive with its files at the root.
///
/// `manifest.json` is written last so a version never looks complete before
/// all of its files are unpacked.
pub fn tgz(fixture: &VersionFixture) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let entries = fixture
        .files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .chain(std::iter::once(("manifest.json", fixture.manifest.as_str())));

    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, path, content.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to add {path} to archive: {e}"));
    }

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .expect("Failed to finish archive")
}

/// Unpacks archives in-process and counts how often it ran.
///
/// Failures are reported like a tool exiting with status 2.
#[derive(Debug, Default)]
pub struct CountingExtractor {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before unpacking, to widen race windows.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extractor for CountingExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> io::Result<ExtractOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let unpacked = File::open(archive)
            .and_then(|file| tar::Archive::new(GzDecoder::new(file)).unpack(dest));
        Ok(match unpacked {
            Ok(()) => ExtractOutput::success(),
            Err(e) => ExtractOutput {
                exit_code: 2,
                stderr: e.to_string(),
                ..ExtractOutput::default()
            },
        })
    }
}

/// A Quilt service over a temporary `local_path` and a mock archive store.
pub struct TestService {
    pub temp: TempDir,
    pub server: MockServer,
    pub extractor: Arc<CountingExtractor>,
    pub quilt: Arc<Quilt>,
}

impl TestService {
    pub async fn new() -> Result<Self> {
        Self::with_extractor(CountingExtractor::new()).await
    }

    pub async fn with_extractor(extractor: CountingExtractor) -> Result<Self> {
        quilt::test_utils::init_test_logging(None);

        let temp = TempDir::new()?;
        let server = MockServer::start_async().await;
        let extractor = Arc::new(extractor);

        let config = QuiltConfig::with_local_path(temp.path()).with_remote(
            server.host(),
            server.port(),
            ARCHIVE_PATH,
        );
        let quilt = Quilt::with_extractor(config, extractor.clone())?;

        Ok(Self {
            temp,
            server,
            extractor,
            quilt: Arc::new(quilt),
        })
    }

    pub fn local_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn version_dir(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    /// Write a version straight to `local_path`.
    pub fn install_local(&self, fixture: &VersionFixture) -> Result<PathBuf> {
        fixture.write_to(self.temp.path()).context("Failed to write version fixture")
    }

    /// Archive URL path for `name` on the mock store.
    pub fn archive_path(name: &str) -> String {
        format!("{ARCHIVE_PATH}/{name}.tgz")
    }
}

/// Output of one `quilt` invocation.
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert_eq!(
            self.code,
            Some(1),
            "Expected exit code 1\nStdout: {}\nStderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// A `local_path` plus a `quilt.toml` for driving the binary.
pub struct TestProject {
    pub temp: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("versions"))?;
        Ok(Self { temp })
    }

    pub fn versions_path(&self) -> PathBuf {
        self.temp.path().join("versions")
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("quilt.toml")
    }

    /// Write `quilt.toml` with `local_path` set and `extra` appended.
    pub fn write_config(&self, extra: &str) -> Result<()> {
        let content = format!(
            "local_path = {:?}\n{extra}",
            self.versions_path().display().to_string()
        );
        fs::write(self.config_path(), content)?;
        Ok(())
    }

    pub fn add_version(&self, fixture: &VersionFixture) -> Result<PathBuf> {
        Ok(fixture.write_to(&self.versions_path())?)
    }

    /// Run `quilt --config <project>/quilt.toml <args>` with `QUILT_*`
    /// variables cleared.
    pub fn run_quilt(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::cargo_bin("quilt")?;
        cmd.arg("--config").arg(self.config_path()).args(args).current_dir(self.temp.path());
        for var in [
            "QUILT_CONFIG",
            "QUILT_LOCAL_PATH",
            "QUILT_CACHE_SIZE",
            "QUILT_REMOTE_HOST",
            "QUILT_REMOTE_PORT",
            "QUILT_REMOTE_PATH",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }

        let output = cmd.output().context("Failed to run quilt")?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}
