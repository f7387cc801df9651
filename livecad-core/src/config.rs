//! Viewer configuration

use crate::error::{Error, Result};
use crate::part::DEFAULT_PART_COLOR;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the viewer: fixed pixels or a CSS proportional string.
///
/// Integers are normalized to `"<n>px"`, strings are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WidthInput", into = "String")]
pub struct WidthSpec(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum WidthInput {
    Pixels(u32),
    Css(String),
}

impl From<WidthInput> for WidthSpec {
    fn from(input: WidthInput) -> Self {
        match input {
            WidthInput::Pixels(px) => WidthSpec::pixels(px),
            WidthInput::Css(css) => WidthSpec(css),
        }
    }
}

impl From<WidthSpec> for String {
    fn from(width: WidthSpec) -> Self {
        width.0
    }
}

impl WidthSpec {
    /// Fixed pixel width
    pub fn pixels(px: u32) -> Self {
        Self(format!("{}px", px))
    }

    /// CSS width string such as `"100%"` or `"800px"`
    pub fn css(css: impl Into<String>) -> Self {
        Self(css.into())
    }

    /// The CSS form
    pub fn as_css(&self) -> &str {
        &self.0
    }

    /// Pixel width for a container of `container_px`.
    ///
    /// Percentages scale the container, `px` values are absolute.
    pub fn resolve(&self, container_px: u32) -> Result<u32> {
        let css = self.0.trim();
        if let Some(percent) = css.strip_suffix('%') {
            let percent: f32 = percent
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid width '{}'", self.0)))?;
            if !percent.is_finite() || percent < 0.0 {
                return Err(Error::Config(format!("invalid width '{}'", self.0)));
            }
            return Ok((container_px as f32 * percent / 100.0).round() as u32);
        }
        let px = css.strip_suffix("px").unwrap_or(css);
        px.trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid width '{}'", self.0)))
    }
}

impl Default for WidthSpec {
    fn default() -> Self {
        Self("100%".to_string())
    }
}

impl fmt::Display for WidthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: WidthSpec,
    /// Fixed height in pixels
    pub height: u32,
    /// Color used when a part's color cannot be parsed
    pub default_color: String,
    /// Color of edge overlays
    pub edge_color: String,
    /// Tree levels expanded on first build
    pub tree_expansion_level: u32,
    /// Label of the assembly root in the tree view
    pub assembly_label: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: WidthSpec::default(),
            height: 600,
            default_color: DEFAULT_PART_COLOR.to_string(),
            edge_color: "#707070".to_string(),
            tree_expansion_level: 1,
            assembly_label: "Assembly".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Create a configuration with the given size
    pub fn with_size(width: WidthSpec, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Check that the configuration can produce a render surface
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 {
            return Err(Error::Config("height must be positive".to_string()));
        }
        // A nominal container is enough to catch malformed width strings.
        self.width.resolve(1000)?;
        if crate::color::Rgb::parse(&self.default_color).is_none() {
            return Err(Error::Config(format!(
                "invalid default color '{}'",
                self.default_color
            )));
        }
        if crate::color::Rgb::parse(&self.edge_color).is_none() {
            return Err(Error::Config(format!(
                "invalid edge color '{}'",
                self.edge_color
            )));
        }
        Ok(())
    }
}
