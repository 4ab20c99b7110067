//! Stylesheet and logo payloads: embedded defaults with per-file overrides.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use pivbar_engine::Resources;
use thiserror::Error;
use tracing::debug;

/// File names looked up in an override directory, paired with the embedded default.
const STYLESHEET: (&str, &str) = ("navbar.css", include_str!("../assets/navbar.css"));
/// Branding logo inside the menu bar.
const LOGO: (&str, &str) = ("ocp-logo.svg", include_str!("../assets/ocp-logo.svg"));
/// Logo placed in the host logo container.
const SECONDARY_LOGO: (&str, &str) = (
    "secondary-logo.svg",
    include_str!("../assets/secondary-logo.svg"),
);
/// Logo placed at the top of the host sidebar.
const SIDEBAR_LOGO: (&str, &str) = ("aveva-logo.svg", include_str!("../assets/aveva-logo.svg"));

/// Failure reading an override file.
#[derive(Debug, Error)]
#[error("failed to read asset {}: {source}", path.display())]
pub struct AssetError {
    /// File that could not be read.
    pub path: PathBuf,
    /// Underlying error.
    #[source]
    pub source: io::Error,
}

/// The embedded payloads.
pub fn embedded() -> Resources {
    Resources {
        stylesheet: STYLESHEET.1.trim_end().to_string(),
        logo: LOGO.1.trim_end().to_string(),
        secondary_logo: SECONDARY_LOGO.1.trim_end().to_string(),
        sidebar_logo: SIDEBAR_LOGO.1.trim_end().to_string(),
    }
}

/// Load payloads, preferring files present in `dir` over the embedded ones.
pub fn load(dir: Option<&Path>) -> Result<Resources, AssetError> {
    let Some(dir) = dir else {
        return Ok(embedded());
    };
    Ok(Resources {
        stylesheet: read_or(dir, STYLESHEET)?,
        logo: read_or(dir, LOGO)?,
        secondary_logo: read_or(dir, SECONDARY_LOGO)?,
        sidebar_logo: read_or(dir, SIDEBAR_LOGO)?,
    })
}

/// Contents of `dir/name`, or `default` when the file does not exist.
fn read_or(dir: &Path, (name, default): (&str, &str)) -> Result<String, AssetError> {
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(s) => {
            debug!(path = %path.display(), "asset override loaded");
            Ok(s.trim_end().to_string())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(default.trim_end().to_string()),
        Err(source) => Err(AssetError { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_payloads_are_present() {
        let r = embedded();
        assert!(r.stylesheet.contains(".piv-custom-header-bar"));
        for svg in [&r.logo, &r.secondary_logo, &r.sidebar_logo] {
            assert!(svg.starts_with("<svg"), "{svg}");
        }
    }

    #[test]
    fn directory_overrides_individual_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("aveva-logo.svg"), "<svg id=\"custom\"></svg>\n").unwrap();
        let r = load(Some(dir.path())).unwrap();
        assert_eq!(r.sidebar_logo, "<svg id=\"custom\"></svg>");
        assert_eq!(r.logo, embedded().logo);
    }

    #[test]
    fn unreadable_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("navbar.css")).unwrap();
        let err = load(Some(dir.path())).unwrap_err();
        assert!(err.path.ends_with("navbar.css"));
    }
}
