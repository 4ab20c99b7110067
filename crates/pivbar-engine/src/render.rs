//! Menu renderer: pure functions from configuration to markup.
//!
//! Nothing here touches a document. Identical input always yields identical
//! output, which is what makes re-renders idempotent and the output testable.

use config::{Config, MenuGroup, MenuItem, UtilityAction};
use pivbar_dom::{Element, Fragment, Node};

/// Id of the overlay root; its presence marks the overlay as mounted.
pub const ROOT_ID: &str = "piv-custom-header";
/// Container of the navigation dropdowns.
pub const MENU_BAR: &str = "piv-menu-bar";
/// A top-level dropdown container.
pub const DROPDOWN: &str = "piv-dropdown-item-container";
/// A navigable or titled entry inside a dropdown.
pub const MENU_ITEM: &str = "piv-menu-item";
/// An entry of the settings dropdown.
pub const UTILITY_ITEM: &str = "piv-utility-item";
/// Hover/open state of a dropdown.
pub const ACTIVE: &str = "active";

/// `<i class="fa-solid {icon} piv-icon">`.
pub fn icon(icon: &str) -> Element {
    Element::new("i").class("fa-solid").class(icon).class("piv-icon")
}

/// Icon followed by a label span.
fn labeled(el: Element, icon_class: &str, text: &str) -> Element {
    el.child(icon(icon_class))
        .child(Element::new("span").text(text))
}

/// Right-pointing chevron marking an expandable entry.
fn chevron_right() -> Element {
    Element::new("i").class("fa-solid fa-chevron-right piv-arrow-right")
}

/// Render one menu entry, recursing into submenus.
pub fn render_item(item: &MenuItem) -> Element {
    match item {
        MenuItem::External { text, icon, url } => labeled(
            Element::new("a")
                .class(MENU_ITEM)
                .attr("href", url)
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer"),
            icon,
            text,
        ),
        MenuItem::Submenu {
            text,
            icon,
            children,
        } => Element::new("div")
            .class("piv-menu-wrapper")
            .child(
                labeled(
                    Element::new("div").class(MENU_ITEM).class("piv-submenu-title"),
                    icon,
                    text,
                )
                .child(chevron_right()),
            )
            .child(
                Element::new("div")
                    .class("piv-nested-submenu")
                    .children(render_items(children)),
            ),
        MenuItem::Navigation { text, icon, target } => labeled(
            Element::new("a")
                .class(MENU_ITEM)
                .attr("href", target)
                .attr("data-hash", target),
            icon,
            text,
        ),
    }
}

/// Render a sequence of entries in order.
pub fn render_items(items: &[MenuItem]) -> Vec<Element> {
    items.iter().map(render_item).collect()
}

/// Render one top-level dropdown.
pub fn render_group(group: &MenuGroup) -> Element {
    Element::new("div")
        .class(DROPDOWN)
        .attr("data-id", group.dom_id())
        .child(
            Element::new("button")
                .class("piv-dropbtn")
                .text(&group.title)
                .child(Element::new("i").class("fa-solid fa-chevron-down piv-arrow")),
        )
        .child(
            Element::new("div")
                .class("piv-dropdown-content")
                .children(render_items(&group.items)),
        )
}

/// Render the menu bar: every group, with a divider between adjacent pairs.
pub fn render_menu_bar(groups: &[MenuGroup]) -> Element {
    let mut bar = Element::new("div").class(MENU_BAR);
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            bar = bar.child(Element::new("div").class("piv-menu-divider"));
        }
        bar = bar.child(render_group(group));
    }
    bar
}

/// Render one settings entry. Entries with a submenu render an expandable
/// affordance; `nested` marks entries inside such a submenu.
pub fn render_utility(action: &UtilityAction, nested: bool) -> Element {
    let mut link = Element::new("a")
        .class(UTILITY_ITEM)
        .attr("href", "#")
        .attr_opt("data-action", action.action.as_ref().map(|a| a.as_str().to_string()))
        .attr_opt("data-mode", action.mode.map(|m| m.as_str()));
    if nested {
        link = link.class("piv-submenu-item");
    }
    if !action.has_submenu() {
        return labeled(link, &action.icon, &action.text);
    }
    Element::new("div")
        .class("piv-utility-menu-wrapper")
        .child(labeled(link.class("piv-has-nested"), &action.icon, &action.text).child(chevron_right()))
        .child(
            Element::new("div")
                .class("piv-fullscreen-submenu")
                .children(action.submenu.iter().map(|a| render_utility(a, true))),
        )
}

/// Render the settings dropdown.
pub fn render_utility_dropdown(utilities: &[UtilityAction], settings_icon: &str) -> Element {
    Element::new("div")
        .class(DROPDOWN)
        .class("piv-utility-container")
        .child(
            Element::new("button")
                .class("piv-dropbtn piv-utility-btn")
                .child(Element::new("img").class("piv-btn-cog").attr("src", settings_icon)),
        )
        .child(
            Element::new("div")
                .class("piv-dropdown-content piv-utility-content")
                .children(utilities.iter().map(|u| render_utility(u, false))),
        )
}

/// Render the complete overlay: branding, menu bar, and settings dropdown.
pub fn render_overlay(config: &Config, logo_svg: &str) -> Fragment {
    Element::new("div")
        .id(ROOT_ID)
        .class("piv-custom-header-bar")
        .child(
            Element::new("div").class("piv-logo-container").child(
                Element::new("a")
                    .class("piv-ocp-logo")
                    .attr("href", &config.home_url)
                    .child(Node::Raw(logo_svg.to_string())),
            ),
        )
        .child(render_menu_bar(&config.groups))
        .child(
            Element::new("div")
                .class("piv-utility-wrapper")
                .child(render_utility_dropdown(&config.utilities, &config.settings_icon)),
        )
        .into()
}

/// The overlay as markup text.
pub fn overlay_html(config: &Config, logo_svg: &str) -> String {
    render_overlay(config, logo_svg).to_html()
}
