//! Assembling the final artifact from a loaded version.
//!
//! A stitch takes a [`Selector`] (which optional modules the caller wants) and
//! a set of per-position [`Override`]s and produces twelve concatenated parts:
//!
//! ```text
//! before_header  HEADER  after_header
//! before_common  COMMON  after_common
//! before_optional  optional  after_optional
//! before_footer  FOOTER  after_footer
//! ```
//!
//! Every position is resolved with the same module selection; the
//! [resolver](crate::resolver) keeps only modules declared at that position.
//! A [`Override::Prepend`] adds names in front of the selection for its
//! position, a [`Override::Literal`] is emitted verbatim before the resolved
//! text.
//!
//! [`stitch_version`] works on an already loaded [`Version`]; the
//! [`Quilt`](crate::service::Quilt) service pairs it with the version cache.

use crate::manifest::Position;
use crate::resolver::resolve;
use crate::version::{VariantKind, Version};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Which optional modules to stitch.
#[derive(Clone)]
pub enum Selector {
    /// Explicit names, used verbatim and in order.
    Modules(Vec<String>),
    /// Evaluated against every optional module name in declaration order.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Selector {
    /// Select an explicit list of module names.
    pub fn modules<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::Modules(names.into_iter().map(Into::into).collect())
    }

    /// Select modules whose name satisfies `predicate`.
    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Selector::Predicate(Arc::new(predicate))
    }

    /// Select every optional module.
    pub fn all() -> Self {
        Self::matching(|_| true)
    }

    /// The module names this selector picks from `names` (declaration order).
    pub fn select<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            Selector::Modules(list) => list.clone(),
            Selector::Predicate(predicate) => {
                names.into_iter().filter(|name| predicate(name)).map(str::to_string).collect()
            }
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Modules(list) => f.debug_tuple("Modules").field(list).finish(),
            Selector::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Extra content for one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// Text emitted before the position's resolved modules.
    Literal(String),
    /// Module names resolved ahead of the selection at this position.
    Prepend(Vec<String>),
}

/// Per-position overrides for one stitch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    entries: HashMap<Position, Override>,
}

impl Overrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `text` before the modules resolved at `position`.
    #[must_use]
    pub fn literal(mut self, position: Position, text: impl Into<String>) -> Self {
        self.set(position, Override::Literal(text.into()));
        self
    }

    /// Resolve `names` ahead of the selection at `position`.
    #[must_use]
    pub fn prepend<I, S>(mut self, position: Position, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(position, Override::Prepend(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Replace the override for `position`.
    pub fn set(&mut self, position: Position, value: Override) {
        self.entries.insert(position, value);
    }

    /// The override for `position`, if any.
    pub fn get(&self, position: Position) -> Option<&Override> {
        self.entries.get(&position)
    }

    /// Whether no position has an override.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stitch `version` into a single artifact.
///
/// `kind` picks the variant; a missing debug variant falls back to default.
///
/// # Examples
///
/// ```rust
/// use quilt::manifest::Position;
/// use quilt::stitch::{Overrides, Selector, stitch_version};
/// use quilt::version::{Module, Variant, VariantKind, Version};
///
/// let variant = Variant::new()
///     .with_header("h\n")
///     .with_footer("f\n")
///     .with_module(Module::new("a.js", "a\n"));
/// let version = Version::new("1.0.0", "/srv/quilt/1.0.0", variant, None);
///
/// let overrides = Overrides::new().literal(Position::AfterFooter, "// end\n");
/// let out = stitch_version(&version, &Selector::all(), VariantKind::Default, &overrides);
/// assert_eq!(out, "h\na\nf\n// end\n");
/// ```
pub fn stitch_version(
    version: &Version,
    selector: &Selector,
    kind: VariantKind,
    overrides: &Overrides,
) -> String {
    if !version.has_variant(kind) {
        tracing::debug!(
            target: "quilt::resolver",
            "Version {} has no {} variant, using default",
            version.name(),
            kind
        );
    }
    let variant = version.variant(kind);
    let selection = selector.select(variant.module_names());

    let mut parts: HashMap<Position, String> = HashMap::with_capacity(Position::ALL.len());
    for position in Position::ALL {
        let text = match overrides.get(position) {
            Some(Override::Prepend(names)) => {
                let mut names = names.clone();
                names.extend(selection.iter().cloned());
                resolve(position, &names, variant)
            }
            Some(Override::Literal(literal)) => {
                let mut text = literal.clone();
                text.push_str(&resolve(position, &selection, variant));
                text
            }
            None => resolve(position, &selection, variant),
        };
        parts.insert(position, text);
    }

    let mut part = |position: Position| parts.remove(&position).unwrap_or_default();

    let mut output = String::new();
    output.push_str(&part(Position::BeforeHeader));
    output.push_str(variant.header());
    output.push_str(&part(Position::AfterHeader));
    output.push_str(&part(Position::BeforeCommon));
    output.push_str(variant.common());
    output.push_str(&part(Position::AfterCommon));
    output.push_str(&part(Position::BeforeOptional));
    output.push_str(&part(Position::Optional));
    output.push_str(&part(Position::AfterOptional));
    output.push_str(&part(Position::BeforeFooter));
    output.push_str(variant.footer());
    output.push_str(&part(Position::AfterFooter));

    tracing::debug!(
        target: "quilt::resolver",
        "Stitched {} ({} variant, {} selected modules, {} bytes)",
        version.name(),
        kind,
        selection.len(),
        output.len()
    );

    output
}
