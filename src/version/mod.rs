//! In-memory representation of a loaded version.
//!
//! A [`Version`] is an immutable snapshot of one version directory. It holds a
//! `default` [`Variant`] and, when the manifest declares `debug_prefix`, a
//! `debug` one. Each variant owns its header, common block, footer and the
//! optional [`Module`]s keyed by name.
//!
//! Modules live in an arena (`Vec<Module>`) addressed by index, with a
//! name → index map on the side. The resolver walks that arena with a
//! parallel visit-state array, so a resolution never mutates the variant and
//! concurrent stitches over the same `Arc<Version>` never alias.
//!
//! Versions are built by [`loader::load_version`] and shared as
//! `Arc<Version>` through the [`VersionCache`](crate::cache::VersionCache).

pub mod loader;

pub use loader::{derive_module_name, load_version, manifest_exists};

use crate::manifest::Position;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A single named unit of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    source: String,
    dependencies: Vec<String>,
    position: Position,
}

impl Module {
    /// Create a module at [`Position::Optional`] with no dependencies.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            dependencies: Vec::new(),
            position: Position::Optional,
        }
    }

    /// Replace the dependency list.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the position the module's own text is emitted at.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Module name (final path segment of its manifest filename).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of modules emitted before this one.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Where this module's text is emitted.
    pub fn position(&self) -> Position {
        self.position
    }
}

/// One rendering (`default` or `debug`) of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variant {
    header: String,
    common: String,
    footer: String,
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl Variant {
    /// An empty variant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header text.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the common text.
    #[must_use]
    pub fn with_common(mut self, common: impl Into<String>) -> Self {
        self.common = common.into();
        self
    }

    /// Set the footer text.
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Add a module, see [`Variant::insert`].
    #[must_use]
    pub fn with_module(mut self, module: Module) -> Self {
        self.insert(module);
        self
    }

    /// Add a module.
    ///
    /// A module whose name is already present replaces the earlier one but
    /// keeps its slot in declaration order.
    pub fn insert(&mut self, module: Module) {
        match self.index.get(module.name()) {
            Some(&id) => {
                tracing::debug!(
                    target: "quilt::loader",
                    "Module {} declared twice, keeping the later entry",
                    module.name()
                );
                self.modules[id] = module;
            }
            None => {
                self.index.insert(module.name.clone(), self.modules.len());
                self.modules.push(module);
            }
        }
    }

    /// Header text (empty when absent).
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Concatenated common files (empty when absent).
    pub fn common(&self) -> &str {
        &self.common
    }

    /// Footer text (empty when absent).
    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.module_id(name).map(|id| &self.modules[id])
    }

    /// Arena index of the named module.
    pub fn module_id(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All modules in declaration order; indices match [`Variant::module_id`].
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Module names in declaration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(Module::name)
    }
}

/// Selects which variant of a version to stitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariantKind {
    /// The variant under `prefix` (or the version directory itself).
    #[default]
    Default,
    /// The variant under `debug_prefix`.
    Debug,
}

impl VariantKind {
    /// Lowercase name used in logs and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            VariantKind::Default => "default",
            VariantKind::Debug => "debug",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(VariantKind::Default),
            "debug" => Ok(VariantKind::Debug),
            other => Err(format!("unknown variant '{other}' (expected 'default' or 'debug')")),
        }
    }
}

/// A loaded, immutable version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    name: String,
    dir: PathBuf,
    default: Variant,
    debug: Option<Variant>,
}

impl Version {
    /// Assemble a version from already loaded variants.
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        default: Variant,
        debug: Option<Variant>,
    ) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            default,
            debug,
        }
    }

    /// Version name (also its directory and archive base name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the version was loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The requested variant, falling back to `default` when it is absent.
    pub fn variant(&self, kind: VariantKind) -> &Variant {
        match kind {
            VariantKind::Debug => self.debug.as_ref().unwrap_or(&self.default),
            VariantKind::Default => &self.default,
        }
    }

    /// Whether the requested variant was loaded.
    pub fn has_variant(&self, kind: VariantKind) -> bool {
        match kind {
            VariantKind::Default => true,
            VariantKind::Debug => self.debug.is_some(),
        }
    }
}
