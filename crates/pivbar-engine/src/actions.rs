//! Utility action handlers.

use std::sync::Arc;

use config::{ActionKind, FullscreenMode};
use pivbar_dom::{Dom, NodeId};
use tracing::debug;

use crate::{
    mount::Shared,
    picker,
    render::{ACTIVE, DROPDOWN},
};

/// Class toggled on the overlay root by `hide-navbar`.
pub const MINIMIZED_CLASS: &str = "piv-minimized";
/// Class toggled on `<body>` by the hide-all display mode.
pub const FULLSCREEN_CLASS: &str = "piv-fullscreen-active";
/// Notice shown for the custom-select display mode.
pub const CUSTOM_SELECT_NOTICE: &str =
    "Selection Personnalisée: Cette fonctionnalité est en cours de développement.";

/// One state of a two-state menu entry: its label and the icon class swap
/// that leads into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconLabel {
    /// Label text.
    pub text: &'static str,
    /// Icon class removed.
    pub from: &'static str,
    /// Icon class added.
    pub to: &'static str,
}

impl IconLabel {
    /// Construct a state.
    pub const fn new(text: &'static str, from: &'static str, to: &'static str) -> Self {
        Self { text, from, to }
    }
}

/// `hide-navbar` while the bar is shown.
pub const NAVBAR_SHOWN: IconLabel = IconLabel::new("Masquer la Barre", "fa-eye", "fa-eye-slash");
/// `hide-navbar` while the bar is minimized.
pub const NAVBAR_MINIMIZED: IconLabel =
    IconLabel::new("Montrer la Barre", "fa-eye-slash", "fa-eye");
/// Hide-all entry while the page chrome is shown.
pub const CHROME_SHOWN: IconLabel = IconLabel::new("Masquer Tout", "fa-eye-slash", "fa-eye");
/// Hide-all entry while the page chrome is hidden.
pub const CHROME_HIDDEN: IconLabel = IconLabel::new("Afficher Tout", "fa-eye", "fa-eye-slash");

/// Update `item`'s first icon and label for a two-state toggle: `on` when
/// `condition` holds, else `off`. Entries without an icon or label are left
/// alone.
pub fn swap_icon_and_label(dom: &dyn Dom, item: NodeId, condition: bool, off: IconLabel, on: IconLabel) {
    let (Ok(Some(icon)), Ok(Some(label))) = (dom.query_in(item, "i"), dom.query_in(item, "span"))
    else {
        return;
    };
    let state = if condition { on } else { off };
    dom.set_text(label, state.text);
    dom.remove_class(icon, state.from);
    dom.add_class(icon, state.to);
}

/// Close the dropdown enclosing `item`.
pub(crate) fn close_dropdown(s: &Shared, item: NodeId) {
    if let Some(container) = s.closest(item, &format!(".{DROPDOWN}")) {
        s.dom.remove_class(container, ACTIVE);
    }
}

/// Run `action` for the clicked `item`. Unknown actions are ignored.
pub(crate) fn dispatch(s: &Arc<Shared>, action: &ActionKind, item: NodeId, mode: Option<FullscreenMode>) {
    match action {
        ActionKind::HideNavbar => {
            let Some(root) = s.root() else {
                return;
            };
            let minimized = s.dom.toggle_class(root, MINIMIZED_CLASS);
            swap_icon_and_label(s.dom.as_ref(), item, minimized, NAVBAR_SHOWN, NAVBAR_MINIMIZED);
        }
        ActionKind::OpenBgColorPicker => picker::open(s),
        ActionKind::SetFullscreenMode => set_fullscreen_mode(s, item, mode),
        ActionKind::RefreshPage => s.window.reload(),
        ActionKind::Unknown(id) => debug!(action = %id, "unknown utility action ignored"),
    }
}

/// Toggle the page-wide display mode, or announce that custom selection is
/// not available yet. Closes the dropdown except for custom selection.
fn set_fullscreen_mode(s: &Shared, item: NodeId, mode: Option<FullscreenMode>) {
    match mode {
        Some(FullscreenMode::CustomSelect) => {
            s.window.alert(CUSTOM_SELECT_NOTICE);
            return;
        }
        Some(FullscreenMode::HideAll) => {
            let body = s.dom.body();
            let hidden = s.dom.toggle_class(body, FULLSCREEN_CLASS);
            swap_icon_and_label(s.dom.as_ref(), item, hidden, CHROME_SHOWN, CHROME_HIDDEN);
            debug!(hidden, "display mode toggled");
        }
        None => debug!("display mode action without a mode"),
    }
    close_dropdown(s, item);
}
