//! Shared configuration types (menu tree, utility actions, presets) used by pivbar.
#![allow(missing_docs)]

use std::{
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

mod action;
mod defaults;
mod error;
mod loader;
mod menu;
mod raw;
mod theme;
mod types;

#[cfg(test)]
mod test_parse;

pub use action::{ActionKind, FullscreenMode, UtilityAction};
pub use error::Error;
pub use loader::{load_from_path, load_from_str};
pub use menu::{MenuGroup, MenuItem, sanitize_id};
pub use theme::{Preset, is_gradient};
pub use types::{Anchors, Config};

/// Source of the built-in configuration, embedded at compile time.
const BUILTIN_SOURCE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/default.ron"));

/// The built-in configuration: the production menu, allow-list, utilities, and presets.
///
/// Panics if the embedded source fails to parse; the test suite guards against that.
pub fn builtin() -> &'static Config {
    static BUILTIN: OnceLock<Config> = OnceLock::new();
    BUILTIN.get_or_init(|| match load_from_str(BUILTIN_SOURCE, None) {
        Ok(cfg) => cfg,
        Err(e) => panic!("invalid built-in configuration: {}", e.pretty()),
    })
}

/// Determine the preferred user config path (`~/.pivbar/config.ron`).
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".pivbar");
    p.push("config.ron");
    p
}

/// Resolve the effective config path.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `~/.pivbar/config.ron` when it exists.
/// 3) Else `None`: callers fall back to [`builtin`].
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let preferred = default_config_path();
    preferred.exists().then_some(preferred)
}

/// Load the config at `explicit` or the default path, falling back to the built-in one.
pub fn load_effective(explicit: Option<&Path>) -> Result<Config, Error> {
    match resolve_config_path(explicit) {
        Some(path) => load_from_path(&path),
        None => Ok(builtin().clone()),
    }
}
