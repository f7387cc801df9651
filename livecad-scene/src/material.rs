//! Shared surface materials keyed by color and opacity

use livecad_core::{Appearance, Rgb};
use std::collections::HashMap;

/// Cache key: quantized color and opacity.
///
/// Opacity is stored in thousandths so that the key is hashable and two
/// parts with visually identical appearance share one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub rgb: [u8; 3],
    pub opacity_milli: u16,
}

impl MaterialKey {
    /// Build a key from a parsed color and an opacity in `0..=1`
    pub fn new(rgb: Rgb, opacity: f32) -> Self {
        Self {
            rgb: rgb.to_bytes(),
            opacity_milli: (opacity.clamp(0.0, 1.0) * 1000.0).round() as u16,
        }
    }

    /// Opacity as a float
    pub fn opacity(&self) -> f32 {
        self.opacity_milli as f32 / 1000.0
    }
}

/// A flat-shaded surface material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    /// Both faces are drawn so that clipped solids stay closed
    pub double_sided: bool,
}

impl Material {
    fn from_key(key: MaterialKey) -> Self {
        let opacity = key.opacity();
        Self {
            color: key.rgb.map(|c| c as f32 / 255.0),
            opacity,
            transparent: opacity < 1.0,
            double_sided: true,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    material: Material,
    users: usize,
}

/// Reference-counted material store owned by one scene
#[derive(Debug, Default)]
pub struct MaterialCache {
    entries: HashMap<MaterialKey, CacheEntry>,
}

impl MaterialCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the material for an appearance and take a reference to it.
    ///
    /// An unparsable color falls back to `fallback`; if that is unparsable too,
    /// mid gray is used.
    pub fn acquire(&mut self, appearance: &Appearance, fallback: &str) -> MaterialKey {
        let rgb = appearance.rgb().unwrap_or_else(|| {
            log::warn!(
                "material.acquire: unparsable color '{}', using '{}'",
                appearance.color,
                fallback
            );
            Rgb::parse(fallback).unwrap_or(Rgb([0.5, 0.5, 0.5]))
        });
        let key = MaterialKey::new(rgb, appearance.effective_opacity());
        self.entries
            .entry(key)
            .or_insert_with(|| CacheEntry {
                material: Material::from_key(key),
                users: 0,
            })
            .users += 1;
        key
    }

    /// Drop one reference. Returns `true` if the material was freed.
    pub fn release(&mut self, key: MaterialKey) -> bool {
        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        entry.users = entry.users.saturating_sub(1);
        if entry.users == 0 {
            self.entries.remove(&key);
            true
        } else {
            false
        }
    }

    /// Look up a live material
    pub fn get(&self, key: &MaterialKey) -> Option<&Material> {
        self.entries.get(key).map(|e| &e.material)
    }

    /// Number of parts referencing a material
    pub fn users(&self, key: &MaterialKey) -> usize {
        self.entries.get(key).map_or(0, |e| e.users)
    }

    /// Number of live materials
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no material is live
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
