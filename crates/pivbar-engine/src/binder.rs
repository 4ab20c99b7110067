//! Event binding for the mounted overlay: dropdown hover, delegated
//! navigation, and per-item utility clicks.

use std::sync::{Arc, Weak};

use config::{ActionKind, FullscreenMode};
use pivbar_dom::{DomEvent, EventKind, Handler, NodeId};
use tracing::{debug, info};

use crate::{
    actions,
    mount::Shared,
    render::{ACTIVE, DROPDOWN, MENU_BAR, MENU_ITEM, UTILITY_ITEM},
};

/// Wrap `f` as a listener holding only a weak reference to the overlay, so
/// listeners stored in the document do not keep the overlay alive.
pub(crate) fn handler<F>(shared: &Arc<Shared>, f: F) -> Handler
where
    F: Fn(&Arc<Shared>, &DomEvent) + Send + Sync + 'static,
{
    let weak: Weak<Shared> = Arc::downgrade(shared);
    Arc::new(move |ev: &DomEvent| {
        if let Some(shared) = weak.upgrade() {
            f(&shared, ev);
        }
    })
}

/// Bind every overlay listener under `root`. Called once, after insertion.
pub(crate) fn bind_all(shared: &Arc<Shared>, root: NodeId) {
    bind_hover(shared, root);
    bind_navigation(shared, root);
    bind_utilities(shared, root);
}

/// Toggle `active` on each dropdown as the pointer enters and leaves it.
fn bind_hover(shared: &Arc<Shared>, root: NodeId) {
    for container in shared.find_all_in(root, &format!(".{DROPDOWN}")) {
        shared.dom.listen(
            container,
            EventKind::MouseEnter,
            handler(shared, |s, ev| s.dom.add_class(ev.current, ACTIVE)),
        );
        shared.dom.listen(
            container,
            EventKind::MouseLeave,
            handler(shared, |s, ev| s.dom.remove_class(ev.current, ACTIVE)),
        );
    }
}

/// One delegated click listener on the menu bar.
fn bind_navigation(shared: &Arc<Shared>, root: NodeId) {
    let Some(bar) = shared.find_in(root, &format!(".{MENU_BAR}")) else {
        return;
    };
    shared
        .dom
        .listen(bar, EventKind::Click, handler(shared, navigate));
}

/// Handle a click inside the menu bar.
///
/// Entries without a target (submenu titles) are left alone so the click
/// keeps bubbling. Otherwise the default action is suppressed, the fragment
/// rewritten, and the enclosing dropdown closed.
fn navigate(s: &Arc<Shared>, ev: &DomEvent) {
    let Some(item) = s.closest(ev.target, &format!(".{MENU_ITEM}")) else {
        return;
    };
    let Some(target) = s.dom.attr(item, "data-hash").filter(|h| !h.is_empty()) else {
        return;
    };
    ev.prevent_default();
    s.window.set_fragment(&target);
    info!(target = %target, "navigating to display");
    actions::close_dropdown(s, item);
}

/// One click listener per settings entry.
fn bind_utilities(shared: &Arc<Shared>, root: NodeId) {
    for item in shared.find_all_in(root, &format!(".{UTILITY_ITEM}")) {
        shared
            .dom
            .listen(item, EventKind::Click, handler(shared, on_utility_click));
    }
}

/// Dispatch the action named by the clicked entry, then close the dropdown
/// unless the action manages that itself.
fn on_utility_click(s: &Arc<Shared>, ev: &DomEvent) {
    ev.prevent_default();
    let item = ev.current;
    let action = s.dom.attr(item, "data-action").map(ActionKind::from);
    let mode = s
        .dom
        .attr(item, "data-mode")
        .and_then(|m| m.parse::<FullscreenMode>().ok());
    debug!(action = ?action, mode = ?mode, "utility action triggered");
    if let Some(action) = &action {
        actions::dispatch(s, action, item, mode);
    }
    if !action.as_ref().is_some_and(ActionKind::manages_own_lifecycle) {
        actions::close_dropdown(s, item);
    }
}
