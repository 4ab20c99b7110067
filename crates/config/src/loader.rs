//! Parse and load overlay configuration.

use std::{ffi::OsStr, fs, path::Path};

use ron::{Options, extensions::Extensions};

use crate::{
    Config, Error,
    error::{excerpt_at, split_location},
    raw::RawConfig,
};

/// Load a fully resolved `Config` from a RON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    if path.extension() != Some(OsStr::new("ron")) {
        return Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: "Unsupported config format (expected a .ron file)".to_string(),
        });
    }
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}

/// Parse RON `source` into a `Config`. `path` is only used for error reporting.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Config, Error> {
    let options = Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
    let raw: RawConfig = options
        .from_str(source)
        .map_err(|e| parse_error(source, &e.to_string(), path))?;
    raw.into_config().map_err(|e| e.with_path(path))
}

/// Convert a RON error message into a located parse error.
fn parse_error(source: &str, rendered: &str, path: Option<&Path>) -> Error {
    let (line, col, message) = split_location(rendered).unwrap_or((1, 1, rendered));
    Error::Parse {
        path: path.map(Path::to_path_buf),
        line,
        col,
        message: message.to_string(),
        excerpt: excerpt_at(source, line, col),
    }
}
