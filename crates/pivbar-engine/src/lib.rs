//! pivbar engine
//!
//! Builds the navigation overlay and keeps it alive on a host page:
//! - [`render`]: pure markup for the menu tree and the settings dropdown
//! - [`theme`]: color math and the background override style block
//! - [`store`]: preferences over a key-value backend
//! - [`Overlay`]: eligibility, one-time mount, auxiliary injections, and the
//!   fragment-change loop
//! - [`actions`] and [`picker`]: what the settings entries do
//!
//! The host page is reached only through [`pivbar_dom::Dom`] and [`Window`].

pub mod actions;
mod binder;
pub mod clock;
mod error;
mod mount;
pub mod picker;
pub mod render;
pub mod store;
pub mod theme;
mod window;


pub use error::{Error, Result};
pub use mount::{
    FONT_AWESOME_ID, Host, MountOutcome, Overlay, Resources, SECONDARY_LOGO_CLASS,
    SIDEBAR_LOGO_CLASS, STYLESHEET_ID,
};
pub use store::{
    FileBackend, KvBackend, MemoryBackend, Preferences, StoreError, ThemeKind, ThemePreference,
};
pub use window::{MemoryWindow, Window, is_dev_host};
