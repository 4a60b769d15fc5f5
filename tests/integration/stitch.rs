//! Stitching through the service

use anyhow::Result;
use httpmock::Method::GET;
use quilt::config::QuiltConfig;
use quilt::core::QuiltError;
use quilt::manifest::Position;
use quilt::service::Quilt;
use quilt::stitch::{Overrides, Selector};
use quilt::test_utils::VersionFixture;
use quilt::version::VariantKind;
use tempfile::TempDir;

use crate::common::{TestService, tgz};

fn local_quilt(temp: &TempDir, cache_size: usize) -> Result<Quilt> {
    quilt::test_utils::init_test_logging(None);
    Ok(Quilt::new(QuiltConfig::with_local_path(temp.path()).with_cache_size(cache_size))?)
}

#[tokio::test]
async fn test_every_position_override() -> Result<()> {
    let temp = TempDir::new()?;
    VersionFixture::standard("1.0.0").write_to(temp.path())?;
    let quilt = local_quilt(&temp, 10)?;

    let overrides = Position::ALL
        .iter()
        .filter(|position| **position != Position::Optional)
        .fold(Overrides::new(), |overrides, position| {
            overrides.literal(*position, format!("[{}]\n", position.as_str()))
        });

    let out = quilt
        .stitch(&Selector::modules(["2.js"]), "1.0.0", VariantKind::Default, &overrides)
        .await?;
    assert_eq!(
        out,
        "[before_header]\nh\n[after_header]\n\
         [before_common]\nc\n[after_common]\n\
         [before_optional]\n8\n2\n[after_optional]\n\
         [before_footer]\nf1.0.0\n[after_footer]\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_positioned_modules_and_prepend() -> Result<()> {
    let temp = TempDir::new()?;
    VersionFixture::new("1.0.0")
        .raw_manifest(
            r#"{
                "header": "header.js",
                "common": ["common.js"],
                "optional": {
                    "optional/polyfill.js": { "dependancies": [], "position": "before_header" },
                    "optional/app.js": ["lib.js"],
                    "optional/lib.js": [],
                    "optional/banner.js": { "dependancies": [], "position": "after_footer" }
                },
                "footer": "footer.js"
            }"#,
        )
        .file("header.js", "h\n")
        .file("common.js", "c\n")
        .file("footer.js", "f\n")
        .file("optional/polyfill.js", "p\n")
        .file("optional/app.js", "a\n")
        .file("optional/lib.js", "l\n")
        .file("optional/banner.js", "b\n")
        .write_to(temp.path())?;
    let quilt = local_quilt(&temp, 10)?;

    let all = quilt
        .stitch(&Selector::all(), "1.0.0", VariantKind::Default, &Overrides::new())
        .await?;
    assert_eq!(all, "p\nh\nc\nl\na\nf\nb\n");

    // A prepend resolves extra modules ahead of the selection at its position
    let overrides = Overrides::new().prepend(Position::BeforeHeader, ["polyfill.js"]);
    let out = quilt
        .stitch(&Selector::modules(["app.js"]), "1.0.0", VariantKind::Default, &overrides)
        .await?;
    assert_eq!(out, "p\nh\nc\nl\na\nf\n");

    // Modules positioned elsewhere contribute nothing to a prepend
    let overrides = Overrides::new().prepend(Position::AfterHeader, ["lib.js"]);
    let out = quilt
        .stitch(&Selector::modules(["app.js"]), "1.0.0", VariantKind::Default, &overrides)
        .await?;
    assert_eq!(out, "h\nc\nl\na\nf\n");
    Ok(())
}

#[tokio::test]
async fn test_debug_falls_back_to_default() -> Result<()> {
    let temp = TempDir::new()?;
    VersionFixture::standard("1.0.0").write_to(temp.path())?;
    let quilt = local_quilt(&temp, 10)?;

    let out = quilt
        .stitch(&Selector::modules(["0.js"]), "1.0.0", VariantKind::Debug, &Overrides::new())
        .await?;
    assert_eq!(out, "h\nc\n8\n0\nf1.0.0\n");
    Ok(())
}

#[tokio::test]
async fn test_bad_references_shorten_output() -> Result<()> {
    let temp = TempDir::new()?;
    VersionFixture::standard("1.0.0").write_to(temp.path())?;
    let quilt = local_quilt(&temp, 10)?;

    let out = quilt
        .stitch(
            &Selector::modules(["3.js", "missing.js", "4.js"]),
            "1.0.0",
            VariantKind::Default,
            &Overrides::new(),
        )
        .await?;
    assert_eq!(out, "h\nc\n3\nf1.0.0\n");
    Ok(())
}

#[tokio::test]
async fn test_lru_eviction_reloads_from_disk() -> Result<()> {
    let temp = TempDir::new()?;
    for name in ["1.0.0", "1.1.0", "1.2.0"] {
        VersionFixture::standard(name).write_to(temp.path())?;
    }
    let quilt = local_quilt(&temp, 2)?;

    for name in ["1.0.0", "1.1.0", "1.2.0"] {
        assert!(quilt.get_version(name).await.is_some());
    }
    assert_eq!(quilt.cache().cached_names().await, ["1.1.0", "1.2.0"]);

    // Evicted versions come back from disk
    let out = quilt
        .stitch(&Selector::modules(["0.js"]), "1.0.0", VariantKind::Default, &Overrides::new())
        .await?;
    assert_eq!(out, "h\nc\n8\n0\nf1.0.0\n");
    assert_eq!(quilt.cache().cached_names().await, ["1.0.0", "1.2.0"]);
    Ok(())
}

#[tokio::test]
async fn test_stitch_fetches_debug_variant() -> Result<()> {
    let service = TestService::new().await?;
    service
        .server
        .mock_async(|when, then| {
            when.method(GET).path(TestService::archive_path("3.0.0"));
            then.status(200).body(tgz(&VersionFixture::standard_with_debug("3.0.0")));
        })
        .await;

    let selector = Selector::matching(|name| name.starts_with('1'));
    let debug = service
        .quilt
        .stitch(&selector, "3.0.0", VariantKind::Debug, &Overrides::new())
        .await?;
    assert_eq!(debug, "h\nc\n7\n9\n1\nf3.0.0-debug\n");
    Ok(())
}

#[tokio::test]
async fn test_unavailable_version_error() -> Result<()> {
    let service = TestService::new().await?;
    service
        .server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(404);
        })
        .await;

    let err = service
        .quilt
        .stitch(&Selector::all(), "0.0.1", VariantKind::Default, &Overrides::new())
        .await
        .unwrap_err();
    assert!(matches!(err, QuiltError::VersionUnavailable { ref name } if name == "0.0.1"));
    Ok(())
}
