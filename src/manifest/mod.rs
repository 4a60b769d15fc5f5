//! `manifest.json` parsing for version directories.
//!
//! Every version directory carries a manifest describing how its files are
//! assembled:
//!
//! ```json
//! {
//!   "prefix": "dist",
//!   "debug_prefix": "debug",
//!   "header": "header.js",
//!   "footer": "footer.js",
//!   "common": ["common.js"],
//!   "optional": {
//!     "optional/0.js": ["8.js"],
//!     "optional/5.js": { "dependancies": ["6.js"], "position": "before_header" },
//!     "optional/7.js": "9.js"
//!   }
//! }
//! ```
//!
//! All keys are optional. Parsing is strict about the top-level shape (the
//! file must be a JSON object and the filename keys must be strings) and
//! lenient about everything the original manifests got wrong in practice:
//!
//! - a `common` that is not an array, or an `optional` that is not an
//!   object, is ignored;
//! - a single dependency string becomes a one-element list, and any other
//!   non-list value becomes an empty list;
//! - the record key is spelled `dependancies`, `dependencies` is accepted too;
//! - an unknown `position` falls back to [`Position::Optional`].
//!
//! `optional` keeps declaration order (serde_json is built with
//! `preserve_order`), which is the order predicate selectors see modules in.

mod position;

pub use position::{Position, UnknownPosition};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parsed contents of a `manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Subdirectory holding the default variant.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Subdirectory holding the debug variant; the debug variant exists only
    /// when this is set.
    #[serde(default)]
    pub debug_prefix: Option<String>,

    /// Header filename.
    #[serde(default)]
    pub header: Option<String>,

    /// Footer filename.
    #[serde(default)]
    pub footer: Option<String>,

    /// Files concatenated, in order, into the common block.
    #[serde(default, deserialize_with = "string_list")]
    pub common: Vec<String>,

    /// Optional modules in declaration order.
    #[serde(default, deserialize_with = "optional_entries")]
    pub optional: Vec<OptionalEntry>,
}

/// One entry of the `optional` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalEntry {
    /// Filename as written in the manifest (relative to the variant directory).
    pub file: String,
    /// Names of modules that must be emitted before this one.
    pub dependencies: Vec<String>,
    /// Where the module's own text is emitted.
    pub position: Position,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let files = match Value::deserialize(deserializer)? {
        items @ Value::Array(_) => normalize_list(items),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(
                target: "quilt::manifest",
                "Ignoring 'common' section: expected an array, found {}",
                json_type(&other)
            );
            Vec::new()
        }
    };
    Ok(files)
}

fn optional_entries<'de, D>(deserializer: D) -> Result<Vec<OptionalEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().map(|(file, value)| parse_entry(file, value)).collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(
                target: "quilt::manifest",
                "Ignoring 'optional' section: expected an object, found {}",
                json_type(&other)
            );
            Vec::new()
        }
    };
    Ok(entries)
}

fn parse_entry(file: String, value: Value) -> OptionalEntry {
    match value {
        Value::Object(mut record) => {
            let dependencies = record
                .remove("dependancies")
                .or_else(|| record.remove("dependencies"))
                .map(normalize_list)
                .unwrap_or_default();
            let position = match record.remove("position") {
                None | Some(Value::Null) => Position::default(),
                Some(Value::String(name)) => name.parse().unwrap_or_else(|e| {
                    tracing::warn!(
                        target: "quilt::manifest",
                        "Module {}: {}, using 'optional'",
                        file,
                        e
                    );
                    Position::default()
                }),
                Some(other) => {
                    tracing::warn!(
                        target: "quilt::manifest",
                        "Module {}: position must be a string, found {}",
                        file,
                        json_type(&other)
                    );
                    Position::default()
                }
            };
            OptionalEntry {
                file,
                dependencies,
                position,
            }
        }
        other => OptionalEntry {
            file,
            dependencies: normalize_list(other),
            position: Position::default(),
        },
    }
}

/// A string becomes a one-element list, an array keeps its string elements,
/// anything else is empty.
fn normalize_list(value: Value) -> Vec<String> {
    match value {
        Value::String(single) => vec![single],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
