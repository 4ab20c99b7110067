//! Persistent preferences over a flat key-value backend.
//!
//! Values are JSON-encoded individually. Backend failures never escape
//! [`Preferences`]: reads degrade to "absent" and writes report `false`.

use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, error};

/// Key holding the theme color (hex or gradient literal).
pub const THEME_COLOR_KEY: &str = "piv_theme_color";
/// Key holding the theme kind.
pub const THEME_TYPE_KEY: &str = "piv_theme_type";
/// Key reserved for the fullscreen display mode.
pub const FULLSCREEN_MODE_KEY: &str = "piv_fullscreen_mode";

/// Every key owned by the overlay.
pub const ALL_KEYS: &[&str] = &[THEME_COLOR_KEY, THEME_TYPE_KEY, FULLSCREEN_MODE_KEY];

/// Backend failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage is disabled or unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Filesystem failure.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Stored data could not be decoded.
    #[error("corrupt storage: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A flat string key-value store.
pub trait KvBackend: Send + Sync {
    /// Raw value for `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Store a raw value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete `key`.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend. Can be switched into a failing state to exercise
/// degraded paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Stored values.
    map: Mutex<HashMap<String, String>>,
    /// When set, every operation fails.
    failing: AtomicBool,
}

impl MemoryBackend {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    /// Error if failure injection is on.
    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("storage disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.map.lock().remove(key);
        Ok(())
    }
}

/// Backend persisting all keys in one JSON object file.
#[derive(Debug)]
pub struct FileBackend {
    /// Backing file.
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileBackend {
    /// Backend over `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole object; a missing file is empty.
    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => Ok(serde_json::from_str(&s)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write the whole object.
    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// How a theme was chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    /// One of the configured preset cards.
    #[default]
    Preset,
    /// Built in the color picker.
    Custom,
}

/// The persisted background choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePreference {
    /// Hex color or gradient literal.
    pub color: String,
    /// How it was chosen.
    pub kind: ThemeKind,
}

/// Typed, failure-tolerant access to the overlay's keys.
#[derive(Clone)]
pub struct Preferences {
    /// Backend.
    backend: Arc<dyn KvBackend>,
}

impl Preferences {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Preferences over a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// JSON-encode and store `value`. Returns `false` on failure.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let res = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|json| self.backend.set(key, &json));
        match res {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "preference write failed");
                false
            }
        }
    }

    /// Decode the value at `key`; absent, undecodable, or unreadable values
    /// yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                error!(key, error = %e, "preference read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                error!(key, error = %e, "preference decode failed");
                None
            }
        }
    }

    /// Decoded value or `default`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Delete `key`. Returns `false` on failure.
    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "preference remove failed");
                false
            }
        }
    }

    /// True when a value is stored at `key`.
    pub fn has(&self, key: &str) -> bool {
        matches!(self.backend.get(key), Ok(Some(_)))
    }

    /// Remove every overlay key.
    pub fn clear(&self) -> bool {
        ALL_KEYS.iter().all(|k| self.remove(k))
    }

    /// Persist a theme choice.
    pub fn save_theme(&self, color: &str, kind: ThemeKind) -> bool {
        let ok = self.set(THEME_COLOR_KEY, color) && self.set(THEME_TYPE_KEY, &kind);
        debug!(color, ?kind, ok, "theme saved");
        ok
    }

    /// The persisted theme, if a color is stored. The kind defaults to
    /// [`ThemeKind::Preset`].
    pub fn theme(&self) -> Option<ThemePreference> {
        let color: String = self.get(THEME_COLOR_KEY)?;
        Some(ThemePreference {
            color,
            kind: self.get_or(THEME_TYPE_KEY, ThemeKind::default()),
        })
    }

    /// Forget the theme.
    pub fn clear_theme(&self) -> bool {
        let a = self.remove(THEME_COLOR_KEY);
        let b = self.remove(THEME_TYPE_KEY);
        a && b
    }

    /// Stored fullscreen mode tag.
    pub fn fullscreen_mode(&self) -> Option<String> {
        self.get(FULLSCREEN_MODE_KEY)
    }

    /// Persist the fullscreen mode tag.
    pub fn save_fullscreen_mode(&self, mode: &str) -> bool {
        self.set(FULLSCREEN_MODE_KEY, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> (Arc<MemoryBackend>, Preferences) {
        let backend = Arc::new(MemoryBackend::new());
        (backend.clone(), Preferences::new(backend))
    }

    #[test]
    fn values_are_json_encoded() {
        let (backend, prefs) = prefs();
        assert!(prefs.save_theme("#0f172a", ThemeKind::Custom));
        assert_eq!(backend.raw(THEME_COLOR_KEY).as_deref(), Some("\"#0f172a\""));
        assert_eq!(backend.raw(THEME_TYPE_KEY).as_deref(), Some("\"custom\""));
        assert_eq!(
            prefs.theme(),
            Some(ThemePreference {
                color: "#0f172a".into(),
                kind: ThemeKind::Custom
            })
        );
    }

    #[test]
    fn kind_defaults_to_preset() {
        let (backend, prefs) = prefs();
        backend.set(THEME_COLOR_KEY, "\"#f3f4f6\"").unwrap();
        assert_eq!(prefs.theme().unwrap().kind, ThemeKind::Preset);
    }

    #[test]
    fn absent_color_means_no_theme() {
        let (backend, prefs) = prefs();
        backend.set(THEME_TYPE_KEY, "\"custom\"").unwrap();
        assert_eq!(prefs.theme(), None);
    }

    #[test]
    fn failures_degrade_to_absent() {
        let (backend, prefs) = prefs();
        assert!(prefs.save_theme("#111111", ThemeKind::Preset));
        backend.set_failing(true);
        assert_eq!(prefs.theme(), None);
        assert!(!prefs.has(THEME_COLOR_KEY));
        assert!(!prefs.save_theme("#222222", ThemeKind::Preset));
        assert!(!prefs.clear());
        backend.set_failing(false);
        assert_eq!(prefs.theme().unwrap().color, "#111111");
    }

    #[test]
    fn corrupt_values_are_ignored() {
        let (backend, prefs) = prefs();
        backend.set(THEME_COLOR_KEY, "{not json").unwrap();
        assert_eq!(prefs.theme(), None);
        assert!(prefs.has(THEME_COLOR_KEY));
    }

    #[test]
    fn clear_removes_every_key() {
        let (_, prefs) = prefs();
        prefs.save_theme("#111111", ThemeKind::Preset);
        prefs.save_fullscreen_mode("hide-all");
        assert_eq!(prefs.fullscreen_mode().as_deref(), Some("hide-all"));
        assert!(prefs.clear());
        for key in ALL_KEYS {
            assert!(!prefs.has(key));
        }
    }

    #[test]
    fn clear_theme_keeps_other_keys() {
        let (_, prefs) = prefs();
        prefs.save_theme("#111111", ThemeKind::Preset);
        prefs.save_fullscreen_mode("hide-all");
        assert!(prefs.clear_theme());
        assert_eq!(prefs.theme(), None);
        assert!(prefs.has(FULLSCREEN_MODE_KEY));
    }
}
