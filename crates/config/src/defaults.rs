// Defaults for host integration and resource locations.

/// Container that receives the menu bar as its first child.
pub(crate) const MENU_ANCHOR: &str = ".header-pane";
/// Container that receives the secondary logo.
pub(crate) const LOGO_ANCHOR: &str = ".c-app-logo";
/// Container that receives the sidebar logo.
pub(crate) const SIDEBAR_ANCHOR: &str = "#sidebar-pane";
/// Container that frames the live clock.
pub(crate) const HEADER_ANCHOR: &str = ".c-header";

pub(crate) const FONT_AWESOME_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/7.0.1/css/all.min.css";
pub(crate) const HOME_URL: &str = "/PIVision/#/";
pub(crate) const SETTINGS_ICON: &str = "/PIVision/Images/Settings64x64.png";

/// Upper bound on how long mount waits for auxiliary injections before binding handlers.
pub(crate) const AUX_JOIN_TIMEOUT_MS: u64 = 2_000;
