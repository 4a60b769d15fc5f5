//! The nine structural insertion points of a stitched artifact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a module's text lands in the stitched output.
///
/// The variants are declared in output order, so `Position::ALL` and the
/// derived `Ord` both follow the layout of the final artifact:
///
/// ```text
/// before_header, HEADER, after_header,
/// before_common, COMMON, after_common,
/// before_optional, optional, after_optional,
/// before_footer, FOOTER, after_footer
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Before the header text.
    BeforeHeader,
    /// Between the header and the common block.
    AfterHeader,
    /// Before the common block.
    BeforeCommon,
    /// After the common block.
    AfterCommon,
    /// Before the selected optional modules.
    BeforeOptional,
    /// The selected optional modules themselves.
    #[default]
    Optional,
    /// After the selected optional modules.
    AfterOptional,
    /// Before the footer text.
    BeforeFooter,
    /// After the footer text.
    AfterFooter,
}

impl Position {
    /// All positions in output order.
    pub const ALL: [Position; 9] = [
        Position::BeforeHeader,
        Position::AfterHeader,
        Position::BeforeCommon,
        Position::AfterCommon,
        Position::BeforeOptional,
        Position::Optional,
        Position::AfterOptional,
        Position::BeforeFooter,
        Position::AfterFooter,
    ];

    /// The manifest spelling of this position.
    pub const fn as_str(self) -> &'static str {
        match self {
            Position::BeforeHeader => "before_header",
            Position::AfterHeader => "after_header",
            Position::BeforeCommon => "before_common",
            Position::AfterCommon => "after_common",
            Position::BeforeOptional => "before_optional",
            Position::Optional => "optional",
            Position::AfterOptional => "after_optional",
            Position::BeforeFooter => "before_footer",
            Position::AfterFooter => "after_footer",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown position name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown position '{0}'")]
pub struct UnknownPosition(pub String);

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|position| position.as_str() == s)
            .ok_or_else(|| UnknownPosition(s.to_string()))
    }
}
