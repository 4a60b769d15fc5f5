//! `quilt stitch` - print a stitched artifact.

use crate::manifest::Position;
use crate::service::Quilt;
use crate::stitch::{Override, Overrides, Selector};
use crate::version::VariantKind;
use anyhow::{Context, Result, bail};
use clap::Args;
use std::io::Write;

/// Stitch modules of a version and print the artifact to stdout.
///
/// Literal options insert their text verbatim before the modules resolved at
/// that position; `--prepend` resolves extra modules ahead of the selection.
///
/// ```bash
/// quilt stitch 1.0.0 0.js
/// quilt stitch 1.0.0 --all --after-footer '//# sourceMappingURL=bundle.map'
/// quilt stitch 1.0.0 0.js --prepend after_header=6.js
/// ```
#[derive(Args, Debug)]
pub struct StitchCommand {
    /// Version to stitch
    version: String,

    /// Optional modules to include, in order
    #[arg(conflicts_with = "all")]
    modules: Vec<String>,

    /// Include every optional module in declaration order
    #[arg(long)]
    all: bool,

    /// Use the debug variant (falls back to default when absent)
    #[arg(long)]
    debug: bool,

    /// Text before the header
    #[arg(long, value_name = "TEXT")]
    before_header: Option<String>,

    /// Text after the header
    #[arg(long, value_name = "TEXT")]
    after_header: Option<String>,

    /// Text before the common block
    #[arg(long, value_name = "TEXT")]
    before_common: Option<String>,

    /// Text after the common block
    #[arg(long, value_name = "TEXT")]
    after_common: Option<String>,

    /// Text before the optional modules
    #[arg(long, value_name = "TEXT")]
    before_optional: Option<String>,

    /// Text after the optional modules
    #[arg(long, value_name = "TEXT")]
    after_optional: Option<String>,

    /// Text before the footer
    #[arg(long, value_name = "TEXT")]
    before_footer: Option<String>,

    /// Text after the footer
    #[arg(long, value_name = "TEXT")]
    after_footer: Option<String>,

    /// Resolve modules ahead of the selection at a position
    /// (replaces a literal for that position)
    #[arg(long, value_name = "POSITION=MODULE[,MODULE...]")]
    prepend: Vec<String>,
}

impl StitchCommand {
    /// Stitch and write the artifact to stdout.
    pub async fn execute(self, quilt: &Quilt) -> Result<()> {
        let selector = self.selector();
        let kind = if self.debug { VariantKind::Debug } else { VariantKind::Default };
        let overrides = self.overrides()?;

        let artifact = quilt.stitch(&selector, &self.version, kind, &overrides).await?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(artifact.as_bytes()).context("Failed to write artifact")?;
        stdout.flush().context("Failed to write artifact")?;
        Ok(())
    }

    fn selector(&self) -> Selector {
        if self.all {
            Selector::all()
        } else {
            Selector::modules(self.modules.iter().cloned())
        }
    }

    fn overrides(&self) -> Result<Overrides> {
        let mut overrides = Overrides::new();
        let literals = [
            (Position::BeforeHeader, &self.before_header),
            (Position::AfterHeader, &self.after_header),
            (Position::BeforeCommon, &self.before_common),
            (Position::AfterCommon, &self.after_common),
            (Position::BeforeOptional, &self.before_optional),
            (Position::AfterOptional, &self.after_optional),
            (Position::BeforeFooter, &self.before_footer),
            (Position::AfterFooter, &self.after_footer),
        ];
        for (position, text) in literals {
            if let Some(text) = text {
                overrides.set(position, Override::Literal(text.clone()));
            }
        }

        for arg in &self.prepend {
            let (position, names) = parse_prepend(arg)?;
            overrides.set(position, Override::Prepend(names));
        }
        Ok(overrides)
    }
}

fn parse_prepend(arg: &str) -> Result<(Position, Vec<String>)> {
    let Some((position, names)) = arg.split_once('=') else {
        bail!("Invalid --prepend '{arg}': expected POSITION=MODULE[,MODULE...]");
    };
    let position: Position = position
        .trim()
        .parse()
        .with_context(|| format!("Invalid --prepend '{arg}'"))?;
    let names = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    Ok((position, names))
}
