use thiserror::Error;

/// Errors produced while parsing a selector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector string was empty or only whitespace.
    #[error("empty selector")]
    Empty,
    /// An unexpected character at a byte offset.
    #[error("unexpected '{ch}' at offset {offset} in selector '{selector}'")]
    Unexpected {
        /// Offending selector.
        selector: String,
        /// Byte offset of the character.
        offset: usize,
        /// The character.
        ch: char,
    },
    /// A combinator with nothing after it.
    #[error("dangling combinator in selector '{selector}'")]
    Dangling {
        /// Offending selector.
        selector: String,
    },
    /// An attribute test that was not closed.
    #[error("unterminated attribute test in selector '{selector}'")]
    Unterminated {
        /// Offending selector.
        selector: String,
    },
}
