//! The part model: one named mesh within an assembly

use crate::color::{resolve_color, Rgb};
use crate::mesh::PartMesh;
use crate::transform::PartTransform;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

/// Default part color when none is given
pub const DEFAULT_PART_COLOR: &str = "#e8b024";

/// Color and opacity of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_opacity", alias = "alpha")]
    pub opacity: f32,
}

fn default_color() -> String {
    DEFAULT_PART_COLOR.to_string()
}

fn default_opacity() -> f32 {
    1.0
}

impl Appearance {
    /// Create an appearance; named colors are resolved, opacity is clamped
    pub fn new(color: &str, opacity: f32) -> Self {
        Self {
            color: resolve_color(color),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Parsed color, if the color string is understood
    pub fn rgb(&self) -> Option<Rgb> {
        Rgb::parse(&self.color)
    }

    /// Opacity clamped to the valid range; NaN counts as opaque
    pub fn effective_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }

    /// Whether the part must be drawn with blending
    pub fn is_transparent(&self) -> bool {
        self.effective_opacity() < 1.0
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: default_color(),
            opacity: default_opacity(),
        }
    }
}

/// Visibility of a part's shape and of its edge overlay.
///
/// On the wire this is the pair `[shape, edges]`, where each flag is written
/// as `0`/`1` and read from either a number or a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibilityState {
    pub shape: bool,
    pub edges: bool,
}

impl VisibilityState {
    /// Both shape and edges shown
    pub const VISIBLE: Self = Self {
        shape: true,
        edges: true,
    };

    /// Both shape and edges hidden
    pub const HIDDEN: Self = Self {
        shape: false,
        edges: false,
    };

    /// Create a visibility state
    pub fn new(shape: bool, edges: bool) -> Self {
        Self { shape, edges }
    }

    /// Pair of `0`/`1` flags as used by the tree view
    pub fn as_flags(&self) -> [u8; 2] {
        [self.shape as u8, self.edges as u8]
    }
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::VISIBLE
    }
}

impl Serialize for VisibilityState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let [shape, edges] = self.as_flags();
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&shape)?;
        tuple.serialize_element(&edges)?;
        tuple.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn into_bool<E: de::Error>(self) -> Result<bool, E> {
        match self {
            Flag::Bool(b) => Ok(b),
            Flag::Int(0) => Ok(false),
            Flag::Int(1) => Ok(true),
            Flag::Int(other) => Err(E::custom(format!(
                "visibility flag must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for VisibilityState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (shape, edges) = <(Flag, Flag)>::deserialize(deserializer)?;
        Ok(Self {
            shape: shape.into_bool::<D::Error>()?,
            edges: edges.into_bool::<D::Error>()?,
        })
    }
}

/// One named solid or surface of an assembly snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub mesh: PartMesh,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<PartTransform>,
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_state: Option<VisibilityState>,
}

impl Part {
    /// Create a part with an explicit identifier
    pub fn new(id: impl Into<String>, name: impl Into<String>, mesh: PartMesh) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            mesh,
            transform: None,
            appearance: Appearance::default(),
            visibility_state: None,
        }
    }

    /// Create a part identified by its name
    pub fn named(name: impl Into<String>, mesh: PartMesh) -> Self {
        Self {
            id: None,
            name: name.into(),
            mesh,
            transform: None,
            appearance: Appearance::default(),
            visibility_state: None,
        }
    }

    /// Stable identifier: the explicit id, or the name when no id was given
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Set the color (named or hex)
    pub fn with_color(mut self, color: &str) -> Self {
        self.appearance.color = resolve_color(color);
        self
    }

    /// Set the opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.appearance.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the placement
    pub fn with_transform(mut self, transform: PartTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Set an explicit visibility state
    pub fn with_visibility(mut self, visibility: VisibilityState) -> Self {
        self.visibility_state = Some(visibility);
        self
    }
}
