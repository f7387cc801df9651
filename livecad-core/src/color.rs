//! Color resolution for part appearances

use serde::{Deserialize, Serialize};

/// Named colors understood in part specs, resolved case-insensitively
pub const NAMED_COLORS: [(&str, &str); 11] = [
    ("blue", "#4a90d9"),
    ("red", "#e85454"),
    ("green", "#50e850"),
    ("yellow", "#e8b024"),
    ("orange", "#e87824"),
    ("purple", "#b024e8"),
    ("cyan", "#24e8b0"),
    ("pink", "#e824b0"),
    ("gray", "#888888"),
    ("white", "#ffffff"),
    ("black", "#333333"),
];

/// Resolve a color name to its hex form; anything else passes through unchanged
pub fn resolve_color(color: &str) -> String {
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(color))
        .map(|(_, hex)| (*hex).to_string())
        .unwrap_or_else(|| color.to_string())
}

/// Linear RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    /// Parse `#rrggbb`, `#rgb` or a named color
    pub fn parse(color: &str) -> Option<Self> {
        let resolved = resolve_color(color.trim());
        let hex = resolved.strip_prefix('#').filter(|h| h.is_ascii())?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();

        let [r, g, b] = match hex.len() {
            6 => [
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ],
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                out
            }
            _ => return None,
        };

        Some(Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]))
    }

    /// Components as 8-bit values
    pub fn to_bytes(self) -> [u8; 3] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// `#rrggbb` form
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}
