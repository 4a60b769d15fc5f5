//! Test fixtures for version directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ten optional modules: `0.js` needs `8.js`, `1.js` needs `7.js` and `9.js`,
/// `2.js` needs `8.js`, the rest stand alone.
const STANDARD_OPTIONAL: &str = r#"{
        "optional/0.js": ["8.js"],
        "optional/1.js": ["7.js", "9.js"],
        "optional/2.js": "8.js",
        "optional/3.js": [],
        "optional/4.js": [],
        "optional/5.js": [],
        "optional/6.js": [],
        "optional/7.js": [],
        "optional/8.js": [],
        "optional/9.js": []
    }"#;

/// A version directory to write under a `local_path`.
#[derive(Clone, Debug)]
pub struct VersionFixture {
    /// Version name (directory name).
    pub name: String,
    /// Contents of `manifest.json`.
    pub manifest: String,
    /// Other files, relative to the version directory.
    pub files: Vec<(String, String)>,
}

impl VersionFixture {
    /// An empty version with a `{}` manifest.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            manifest: "{}".to_string(),
            files: Vec::new(),
        }
    }

    /// Header `h`, common `c`, modules `0.js`..`9.js` with a few
    /// dependencies and footer `f<name>`.
    ///
    /// Stitching `["0.js"]` yields `"h\nc\n8\n0\nf<name>\n"`.
    pub fn standard(name: &str) -> Self {
        let manifest = format!(
            r#"{{
    "header": "header.js",
    "common": ["common.js"],
    "optional": {STANDARD_OPTIONAL},
    "footer": "footer.js"
}}"#
        );
        let mut fixture = Self::new(name).raw_manifest(&manifest);
        fixture.add_standard_files("", &format!("f{name}\n"));
        fixture
    }

    /// Like [`standard`](Self::standard) with the default variant under
    /// `release/` and a debug variant under `debug/` whose footer is
    /// `f<name>-debug`.
    pub fn standard_with_debug(name: &str) -> Self {
        let manifest = format!(
            r#"{{
    "prefix": "release",
    "debug_prefix": "debug",
    "header": "header.js",
    "common": ["common.js"],
    "optional": {STANDARD_OPTIONAL},
    "footer": "footer.js"
}}"#
        );
        let mut fixture = Self::new(name).raw_manifest(&manifest);
        fixture.add_standard_files("release/", &format!("f{name}\n"));
        fixture.add_standard_files("debug/", &format!("f{name}-debug\n"));
        fixture
    }

    /// Replace the manifest text.
    #[must_use]
    pub fn raw_manifest(mut self, manifest: &str) -> Self {
        self.manifest = manifest.to_string();
        self
    }

    /// Add a file relative to the version directory.
    #[must_use]
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Write the version to `root/<name>/`, returning that directory.
    pub fn write_to(&self, root: &Path) -> io::Result<PathBuf> {
        let dir = root.join(&self.name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("manifest.json"), &self.manifest)?;
        for (path, content) in &self.files {
            let file = dir.join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(file, content)?;
        }
        Ok(dir)
    }

    fn add_standard_files(&mut self, prefix: &str, footer: &str) {
        self.files.push((format!("{prefix}header.js"), "h\n".to_string()));
        self.files.push((format!("{prefix}common.js"), "c\n".to_string()));
        self.files.push((format!("{prefix}footer.js"), footer.to_string()));
        for i in 0..10 {
            self.files.push((format!("{prefix}optional/{i}.js"), format!("{i}\n")));
        }
    }
}
