//! Engine error type.

use std::result::Result as StdResult;

use pivbar_dom::SelectorError;
use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors surfaced while setting up the overlay. Once mounted, the overlay
/// degrades instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    /// A configured host anchor is not a usable selector.
    #[error("invalid {name} anchor: {source}")]
    Anchor {
        /// Which anchor.
        name: &'static str,
        /// Parse failure.
        #[source]
        source: SelectorError,
    },
}
