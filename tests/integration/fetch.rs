//! Fetching versions from the remote archive store

use anyhow::Result;
use httpmock::Method::GET;
use quilt::config::QuiltConfig;
use quilt::fetch::TarExtractor;
use quilt::service::Quilt;
use quilt::stitch::{Overrides, Selector};
use quilt::test_utils::VersionFixture;
use quilt::version::VariantKind;
use tempfile::TempDir;

use crate::common::{ARCHIVE_PATH, TestService, tgz};

#[tokio::test]
async fn test_fetch_remote_version_once() -> Result<()> {
    let service = TestService::new().await?;
    let mock = service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("2.0.0"));
            then.status(200).body(tgz(&VersionFixture::standard("2.0.0")));
        })
        .await;

    let out = service
        .quilt
        .stitch(&Selector::modules(["0.js"]), "2.0.0", VariantKind::Default, &Overrides::new())
        .await?;
    assert_eq!(out, "h\nc\n8\n0\nf2.0.0\n");

    // Served from memory the second time
    let again = service.quilt.get_version("2.0.0").await;
    assert!(again.is_some());

    mock.assert_hits_async(1).await;
    assert_eq!(service.extractor.calls(), 1);

    let dir = service.version_dir("2.0.0");
    assert!(dir.join("manifest.json").is_file());
    assert!(!dir.join("2.0.0.tgz").exists(), "archive should be removed after extraction");
    Ok(())
}

#[tokio::test]
async fn test_fetched_version_reloads_from_disk() -> Result<()> {
    let service = TestService::new().await?;
    let mock = service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("2.0.0"));
            then.status(200).body(tgz(&VersionFixture::standard("2.0.0")));
        })
        .await;

    let first = service.quilt.get_version("2.0.0").await.expect("fetched");
    assert!(service.quilt.cache().evict("2.0.0").await);

    let second = service.quilt.get_version("2.0.0").await.expect("loaded from disk");
    assert_eq!(*first, *second);

    mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_fetch_into_relative_local_path_with_tar() -> Result<()> {
    if which::which("tar").is_err() {
        return Ok(());
    }
    quilt::test_utils::init_test_logging(None);

    // A directory under the working directory, addressed by its bare name
    let temp = TempDir::new_in(std::env::current_dir()?)?;
    let relative = std::path::PathBuf::from(temp.path().file_name().unwrap_or_default());
    assert!(relative.is_relative());

    let server = httpmock::MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("2.0.0"));
            then.status(200).body(tgz(&VersionFixture::standard("2.0.0")));
        })
        .await;

    let config = QuiltConfig::with_local_path(&relative).with_remote(
        server.host(),
        server.port(),
        ARCHIVE_PATH,
    );
    let quilt = Quilt::with_extractor(config, std::sync::Arc::new(TarExtractor::new()))?;

    let out = quilt
        .stitch(&Selector::modules(["0.js"]), "2.0.0", VariantKind::Default, &Overrides::new())
        .await?;
    assert_eq!(out, "h\nc\n8\n0\nf2.0.0\n");
    mock.assert_hits_async(1).await;
    assert!(temp.path().join("2.0.0").join("manifest.json").is_file());
    Ok(())
}

#[tokio::test]
async fn test_missing_remote_version() -> Result<()> {
    let service = TestService::new().await?;
    let mock = service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("9.9.9"));
            then.status(404);
        })
        .await;

    assert!(service.quilt.get_version("9.9.9").await.is_none());

    mock.assert_hits_async(1).await;
    assert_eq!(service.extractor.calls(), 0);
    assert!(!service.version_dir("9.9.9").exists());
    Ok(())
}

#[tokio::test]
async fn test_non_ok_success_status_is_failure() -> Result<()> {
    let service = TestService::new().await?;
    service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("2.0.0"));
            then.status(204);
        })
        .await;

    assert!(service.quilt.get_version("2.0.0").await.is_none());
    assert_eq!(service.extractor.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_archive_is_cleaned_up() -> Result<()> {
    let service = TestService::new().await?;
    let mock = service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("2.0.0"));
            then.status(200).body("definitely not gzip");
        })
        .await;

    assert!(service.quilt.get_version("2.0.0").await.is_none());
    assert_eq!(service.extractor.calls(), 1);
    assert!(!service.version_dir("2.0.0").exists());

    // Failures are not remembered; the next request tries again
    assert!(service.quilt.get_version("2.0.0").await.is_none());
    mock.assert_hits_async(2).await;
    Ok(())
}

#[tokio::test]
async fn test_unloadable_archive_is_cleaned_up() -> Result<()> {
    let service = TestService::new().await?;
    let broken = VersionFixture::new("2.0.0").raw_manifest("{ not json").file("header.js", "h\n");
    service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("2.0.0"));
            then.status(200).body(tgz(&broken));
        })
        .await;

    assert!(service.quilt.get_version("2.0.0").await.is_none());
    assert_eq!(service.extractor.calls(), 1);
    assert!(!service.version_dir("2.0.0").exists());
    Ok(())
}

#[tokio::test]
async fn test_local_version_skips_network() -> Result<()> {
    let service = TestService::new().await?;
    service.install_local(&VersionFixture::standard("1.0.0"))?;
    let mock = service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("1.0.0"));
            then.status(500);
        })
        .await;

    assert!(service.quilt.get_version("1.0.0").await.is_some());
    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_unsafe_version_names_never_fetched() -> Result<()> {
    let service = TestService::new().await?;
    let mock = service
        .server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body(tgz(&VersionFixture::standard("x")));
        })
        .await;

    for name in ["", "..", "../etc", "a/b"] {
        assert!(service.quilt.get_version(name).await.is_none(), "{name:?} should be rejected");
    }
    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_without_remote_missing_version_is_unavailable() -> Result<()> {
    let temp = TempDir::new()?;
    let quilt = Quilt::new(QuiltConfig::with_local_path(temp.path()))?;

    assert!(quilt.get_version("2.0.0").await.is_none());
    assert!(!temp.path().join("2.0.0").exists());
    Ok(())
}

#[tokio::test]
async fn test_health_probe() -> Result<()> {
    let service = TestService::new().await?;
    let ok = service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{ARCHIVE_PATH}/health_check.txt"));
            then.status(200).body("ok");
        })
        .await;

    assert_eq!(service.quilt.health().await, (true, None));
    ok.assert_hits_async(1).await;
    ok.delete_async().await;

    service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{ARCHIVE_PATH}/health_check.txt"));
            then.status(500);
        })
        .await;

    let (healthy, problem) = service.quilt.health().await;
    assert!(!healthy);
    assert!(problem.unwrap_or_default().contains("500"));
    Ok(())
}

#[tokio::test]
async fn test_health_unreachable_remote() -> Result<()> {
    let temp = TempDir::new()?;
    // Nothing listens on port 9 of localhost in the test environment
    let config = QuiltConfig::with_local_path(temp.path()).with_remote("127.0.0.1", 9, "/archives");
    let quilt = Quilt::new(config)?;

    let (healthy, problem) = quilt.health().await;
    assert!(!healthy);
    assert!(problem.is_some());
    Ok(())
}

#[tokio::test]
async fn test_status_shows_remote_template() -> Result<()> {
    let service = TestService::new().await?;
    let status = service.quilt.status().await;

    let expected = format!(
        "remote: http://{}:{}/archives/<version>.tgz",
        service.server.host(),
        service.server.port()
    );
    assert!(status.contains(&expected), "status was:\n{status}");
    assert!(status.contains(&format!("local path: {}", service.local_path().display())));
    Ok(())
}
