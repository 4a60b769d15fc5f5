//! The `quilt` command line

use anyhow::Result;
use assert_cmd::Command;
use httpmock::Method::GET;
use httpmock::MockServer;
use predicates::prelude::*;
use quilt::test_utils::VersionFixture;

use crate::common::{TestProject, tgz};

#[test]
fn test_stitch_prints_artifact() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("")?;
    project.add_version(&VersionFixture::standard("1.0.0"))?;

    let output = project.run_quilt(&["stitch", "1.0.0", "0.js", "1.js"])?;
    output.assert_success();
    assert_eq!(output.stdout, "h\nc\n8\n0\n7\n9\n1\nf1.0.0\n");
    Ok(())
}

#[test]
fn test_stitch_all_with_overrides() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("")?;
    project.add_version(&VersionFixture::standard("1.0.0"))?;

    let output = project.run_quilt(&[
        "stitch",
        "1.0.0",
        "--all",
        "--before-header",
        "/* bundle */\n",
        "--prepend",
        "optional=5.js",
    ])?;
    output.assert_success();
    assert_eq!(output.stdout, "/* bundle */\nh\nc\n5\n8\n0\n7\n9\n1\n2\n3\n4\n6\nf1.0.0\n");
    Ok(())
}

#[test]
fn test_stitch_debug_flag() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("")?;
    project.add_version(&VersionFixture::standard_with_debug("1.0.0"))?;

    let output = project.run_quilt(&["stitch", "1.0.0", "3.js", "--debug"])?;
    output.assert_success();
    assert_eq!(output.stdout, "h\nc\n3\nf1.0.0-debug\n");
    Ok(())
}

#[test]
fn test_stitch_unknown_version_fails() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("")?;

    let output = project.run_quilt(&["stitch", "4.0.0", "0.js"])?;
    output.assert_failure().assert_stderr_contains("4.0.0");
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_stitch_fetches_from_remote() -> Result<()> {
    // The binary unpacks with the system tar
    if which::which("tar").is_err() {
        return Ok(());
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/quilt/2.0.0.tgz");
        then.status(200).body(tgz(&VersionFixture::standard("2.0.0")));
    });

    let project = TestProject::new()?;
    project.write_config(&format!(
        "\n[remote]\nhost = \"{}\"\nport = {}\npath = \"/quilt\"\n",
        server.host(),
        server.port()
    ))?;

    let output = project.run_quilt(&["stitch", "2.0.0", "2.js"])?;
    output.assert_success();
    assert_eq!(output.stdout, "h\nc\n8\n2\nf2.0.0\n");
    mock.assert_hits(1);
    assert!(project.versions_path().join("2.0.0").join("manifest.json").is_file());
    Ok(())
}

#[test]
fn test_status_output() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("cache_size = 3\n")?;
    project.add_version(&VersionFixture::standard("1.0.0"))?;

    let output = project.run_quilt(&["status", "--warm", "1.0.0"])?;
    output
        .assert_success()
        .assert_stdout_contains(&format!("local path: {}", project.versions_path().display()))
        .assert_stdout_contains("remote: not configured")
        .assert_stdout_contains("cached versions (1/3): 1.0.0");
    Ok(())
}

#[test]
fn test_health_without_remote() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("")?;

    project.run_quilt(&["health"])?.assert_success().assert_stdout_contains("healthy");
    Ok(())
}

#[test]
fn test_health_failing_remote() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quilt/health_check.txt");
        then.status(503);
    });

    let project = TestProject::new()?;
    project.write_config(&format!(
        "\n[remote]\nhost = \"{}\"\nport = {}\npath = \"/quilt\"\n",
        server.host(),
        server.port()
    ))?;

    project.run_quilt(&["health"])?.assert_failure().assert_stderr_contains("503");
    Ok(())
}

#[test]
fn test_missing_local_path_fails() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let config = temp.path().join("quilt.toml");
    std::fs::write(&config, "cache_size = 4\n")?;

    Command::cargo_bin("quilt")?
        .arg("--config")
        .arg(&config)
        .arg("status")
        .env_remove("QUILT_LOCAL_PATH")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("local_path"));
    Ok(())
}

#[test]
fn test_env_overrides_file() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("")?;
    project.add_version(&VersionFixture::standard("1.0.0"))?;

    Command::cargo_bin("quilt")?
        .arg("status")
        .current_dir(project.temp.path())
        .env("QUILT_CONFIG", project.config_path())
        .env("QUILT_CACHE_SIZE", "7")
        .env("QUILT_REMOTE_HOST", "archives.example")
        .env("QUILT_REMOTE_PATH", "/store/")
        .assert()
        .success()
        .stdout(predicate::str::contains("cached versions (0/7): none"))
        .stdout(predicate::str::contains("remote: http://archives.example:80/store/<version>.tgz"));
    Ok(())
}

#[test]
fn test_help_lists_commands() -> Result<()> {
    Command::cargo_bin("quilt")?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stitch"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("health"));
    Ok(())
}
