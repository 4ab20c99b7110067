//! Resolved configuration types.

use serde::{Deserialize, Serialize};

use crate::{MenuGroup, Preset, UtilityAction, defaults};

/// Host selectors the overlay attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchors {
    /// Receives the menu bar.
    pub menu: String,
    /// Receives the secondary logo.
    pub logo: String,
    /// Receives the sidebar logo.
    pub sidebar: String,
    /// Receives the live clock.
    pub header: String,
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            menu: defaults::MENU_ANCHOR.to_string(),
            logo: defaults::LOGO_ANCHOR.to_string(),
            sidebar: defaults::SIDEBAR_ANCHOR.to_string(),
            header: defaults::HEADER_ANCHOR.to_string(),
        }
    }
}

/// Fully validated overlay configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fragment prefixes (case-sensitive) for which the overlay may mount.
    pub allowed_views: Vec<String>,
    /// Host selectors.
    pub anchors: Anchors,
    /// Navigation dropdowns, left to right.
    pub groups: Vec<MenuGroup>,
    /// Entries of the settings dropdown.
    pub utilities: Vec<UtilityAction>,
    /// Preset background themes.
    pub presets: Vec<Preset>,
    /// Icon font stylesheet.
    pub font_awesome_url: String,
    /// Target of the branding logo link.
    pub home_url: String,
    /// Image used for the settings button.
    pub settings_icon: String,
    /// Bound on the auxiliary-injection join, in milliseconds.
    pub aux_join_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_views: Vec::new(),
            anchors: Anchors::default(),
            groups: Vec::new(),
            utilities: Vec::new(),
            presets: Vec::new(),
            font_awesome_url: defaults::FONT_AWESOME_URL.to_string(),
            home_url: defaults::HOME_URL.to_string(),
            settings_icon: defaults::SETTINGS_ICON.to_string(),
            aux_join_timeout_ms: defaults::AUX_JOIN_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// True when `fragment` starts with one of the allowed view prefixes.
    pub fn is_allowed_view(&self, fragment: &str) -> bool {
        self.allowed_views.iter().any(|p| fragment.starts_with(p.as_str()))
    }

    /// Every navigation target reachable from the menu tree.
    pub fn navigation_targets(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for group in &self.groups {
            for item in &group.items {
                item.for_each_target(&mut |t| out.push(t));
            }
        }
        out
    }
}
