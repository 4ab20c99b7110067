//! Raw, all-optional shapes read from RON before validation.

use serde::Deserialize;
use tracing::warn;

use crate::{
    ActionKind, Anchors, Config, Error, FullscreenMode, MenuGroup, MenuItem, Preset, UtilityAction,
    defaults, sanitize_id,
};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub allowed_views: Vec<String>,
    #[serde(default)]
    pub anchors: RawAnchors,
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub utilities: Vec<RawUtility>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub font_awesome_url: Option<String>,
    #[serde(default)]
    pub home_url: Option<String>,
    #[serde(default)]
    pub settings_icon: Option<String>,
    #[serde(default)]
    pub aux_join_timeout_ms: Option<u64>,
}

/// Host selector overrides; omitted fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawAnchors {
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub sidebar: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawGroup {
    pub title: String,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// A menu entry whose variant is decided by which fields are populated.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawItem {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<RawItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawUtility {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub action: Option<ActionKind>,
    #[serde(default)]
    pub mode: Option<FullscreenMode>,
    #[serde(default)]
    pub submenu: Vec<RawUtility>,
}

impl RawItem {
    /// Resolve into a typed item: `url` wins, then non-empty `children`, then `hash`.
    fn into_item(self, path: &str) -> Result<MenuItem, Error> {
        let here = format!("{} > {}", path, self.text);
        let populated = [
            self.url.is_some(),
            !self.children.is_empty(),
            self.hash.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count();
        if populated > 1 {
            warn!(item = %here, "menu item sets more than one target; using url > children > hash");
        }

        if let Some(url) = self.url {
            return Ok(MenuItem::External {
                text: self.text,
                icon: self.icon,
                url,
            });
        }
        if !self.children.is_empty() {
            let children = self
                .children
                .into_iter()
                .map(|c| c.into_item(&here))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(MenuItem::Submenu {
                text: self.text,
                icon: self.icon,
                children,
            });
        }
        match self.hash {
            Some(target) => Ok(MenuItem::Navigation {
                text: self.text,
                icon: self.icon,
                target,
            }),
            None => Err(Error::Validation {
                path: None,
                message: format!("menu item '{}' needs one of hash, url, or children", here),
            }),
        }
    }
}

impl RawUtility {
    fn into_utility(self) -> UtilityAction {
        UtilityAction {
            text: self.text,
            icon: self.icon,
            action: self.action,
            mode: self.mode,
            submenu: self.submenu.into_iter().map(Self::into_utility).collect(),
        }
    }
}

impl RawConfig {
    /// Validate and resolve into a [`Config`], applying defaults for omitted fields.
    pub(crate) fn into_config(self) -> Result<Config, Error> {
        let mut groups = Vec::with_capacity(self.groups.len());
        let mut seen_ids: Vec<String> = Vec::new();
        for g in self.groups {
            let id = sanitize_id(&g.title);
            if seen_ids.contains(&id) {
                return Err(Error::Validation {
                    path: None,
                    message: format!("group '{}' collides with another group id '{}'", g.title, id),
                });
            }
            seen_ids.push(id);
            let items = g
                .items
                .into_iter()
                .map(|i| i.into_item(&g.title))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(MenuGroup {
                title: g.title,
                items,
            });
        }

        let anchors = Anchors {
            menu: self
                .anchors
                .menu
                .unwrap_or_else(|| defaults::MENU_ANCHOR.to_string()),
            logo: self
                .anchors
                .logo
                .unwrap_or_else(|| defaults::LOGO_ANCHOR.to_string()),
            sidebar: self
                .anchors
                .sidebar
                .unwrap_or_else(|| defaults::SIDEBAR_ANCHOR.to_string()),
            header: self
                .anchors
                .header
                .unwrap_or_else(|| defaults::HEADER_ANCHOR.to_string()),
        };

        Ok(Config {
            allowed_views: self.allowed_views,
            anchors,
            groups,
            utilities: self
                .utilities
                .into_iter()
                .map(RawUtility::into_utility)
                .collect(),
            presets: self.presets,
            font_awesome_url: self
                .font_awesome_url
                .unwrap_or_else(|| defaults::FONT_AWESOME_URL.to_string()),
            home_url: self
                .home_url
                .unwrap_or_else(|| defaults::HOME_URL.to_string()),
            settings_icon: self
                .settings_icon
                .unwrap_or_else(|| defaults::SETTINGS_ICON.to_string()),
            aux_join_timeout_ms: self
                .aux_join_timeout_ms
                .unwrap_or(defaults::AUX_JOIN_TIMEOUT_MS),
        })
    }
}
