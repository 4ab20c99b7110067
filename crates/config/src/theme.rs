//! Preset background themes offered by the color popup.

use serde::{Deserialize, Serialize};

/// CSS function prefixes that mark a background as a gradient literal.
const GRADIENT_PREFIXES: &[&str] = &["linear-gradient(", "radial-gradient(", "conic-gradient("];

/// A predefined background choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Card caption.
    pub name: String,
    /// A `#rrggbb` color or a CSS gradient literal.
    pub color: String,
}

impl Preset {
    /// True when the preset is a gradient rather than a flat color.
    pub fn is_gradient(&self) -> bool {
        is_gradient(&self.color)
    }
}

/// Literal prefix check distinguishing gradient literals from flat colors.
pub fn is_gradient(value: &str) -> bool {
    let v = value.trim_start();
    GRADIENT_PREFIXES.iter().any(|p| v.starts_with(p))
}
