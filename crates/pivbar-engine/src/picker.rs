//! Background color popup: preset cards plus a live HSL picker.
//!
//! [`ColorPicker`] holds the picker state and is independent of any document.
//! The rest of the module builds the popup markup and wires it to the state.

use std::sync::Arc;

use config::Preset;
use pivbar_dom::{DomEvent, Element, EventKind, Fragment, NodeId, Position, Rect};
use tracing::debug;

use crate::{
    binder::handler,
    mount::Shared,
    render::ACTIVE,
    store::ThemeKind,
    theme::{self, Hsl, Rgb, hex_to_rgb, hsl_to_rgb, rgb_to_hex, rgb_to_hsl},
};

/// Id of the popup root.
pub const POPUP_ID: &str = "piv-bg-color-popup";
/// Highlight class for the persisted choice.
pub const SELECTED: &str = "selected";

/// Picker state: the current HSL color and whether the surface is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPicker {
    /// Current color.
    hsl: Hsl,
    /// True between pointer down and pointer up on the surface.
    dragging: bool,
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self {
            hsl: Hsl::new(210.0, 50.0, 50.0),
            dragging: false,
        }
    }
}

impl ColorPicker {
    /// Picker starting at `hex`, if it parses.
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_rgb(hex).map(|rgb| Self {
            hsl: rgb_to_hsl(rgb),
            dragging: false,
        })
    }

    /// Current color in HSL.
    pub fn hsl(&self) -> Hsl {
        self.hsl
    }

    /// Current color in RGB.
    pub fn rgb(&self) -> Rgb {
        hsl_to_rgb(self.hsl)
    }

    /// Current color as `#rrggbb`.
    pub fn hex(&self) -> String {
        rgb_to_hex(self.rgb())
    }

    /// Set the hue from the slider.
    pub fn set_hue(&mut self, hue: f64) {
        self.hsl = Hsl::new(hue, self.hsl.s, self.hsl.l);
    }

    /// Replace the color from hex input. Invalid input leaves the state
    /// unchanged and returns `false`.
    pub fn set_hex(&mut self, hex: &str) -> bool {
        match hex_to_rgb(hex.trim()) {
            Some(rgb) => {
                self.hsl = rgb_to_hsl(rgb);
                true
            }
            None => false,
        }
    }

    /// True while dragging.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Begin a drag at client position `(x, y)` over `surface`.
    pub fn pointer_down(&mut self, surface: Rect, x: f64, y: f64) {
        self.dragging = true;
        self.track(surface, x, y);
    }

    /// Continue a drag. Returns `false` (and does nothing) when not dragging.
    pub fn pointer_move(&mut self, surface: Rect, x: f64, y: f64) -> bool {
        if !self.dragging {
            return false;
        }
        self.track(surface, x, y);
        true
    }

    /// End a drag.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Horizontal position maps to saturation, vertical (inverted) to lightness.
    fn track(&mut self, surface: Rect, x: f64, y: f64) {
        let fx = ratio(x - surface.x, surface.width);
        let fy = ratio(y - surface.y, surface.height);
        self.hsl = Hsl::new(self.hsl.h, fx * 100.0, (1.0 - fy) * 100.0);
    }
}

/// `offset / extent` clamped to `[0, 1]`; zero for an empty extent.
fn ratio(offset: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        (offset / extent).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Popup markup with one card per preset and the custom picker section.
pub fn popup_fragment(presets: &[Preset], picker: &ColorPicker) -> Fragment {
    let hsl = picker.hsl();
    let hex = picker.hex();
    let cards = presets.iter().map(|p| {
        Element::new("div")
            .class("piv-theme-card")
            .attr("data-color", &p.color)
            .child(
                Element::new("div")
                    .class("piv-theme-swatch")
                    .attr("style", format!("background: {}", p.color)),
            )
            .child(Element::new("span").text(&p.name))
    });
    Element::new("div")
        .id(POPUP_ID)
        .class("piv-theme-popup")
        .child(
            Element::new("div")
                .class("piv-color-popup-header")
                .child(Element::new("span").text("Couleur de fond"))
                .child(Element::new("i").class("fa-solid fa-xmark piv-color-close")),
        )
        .child(Element::new("div").class("piv-theme-grid").children(cards))
        .child(
            Element::new("div")
                .class("piv-theme-footer piv-custom-picker")
                .child(
                    Element::new("div")
                        .class("piv-sl-surface")
                        .attr("style", surface_style(hsl))
                        .child(
                            Element::new("div")
                                .class("piv-sl-cursor")
                                .attr("style", cursor_style(hsl)),
                        ),
                )
                .child(
                    Element::new("input")
                        .class("piv-hue-slider")
                        .attr("type", "range")
                        .attr("min", "0")
                        .attr("max", "359")
                        .attr("value", format!("{:.0}", hsl.h)),
                )
                .child(
                    Element::new("div")
                        .class("piv-color-row")
                        .child(
                            Element::new("div")
                                .class("piv-color-preview")
                                .attr("style", format!("background: {hex}")),
                        )
                        .child(
                            Element::new("input")
                                .class("piv-hex-input")
                                .attr("type", "text")
                                .attr("maxlength", "7")
                                .attr("value", &hex),
                        )
                        .child(Element::new("button").class("piv-color-apply").text("Appliquer")),
                )
                .child(Element::new("span").text("Couleur personnalisée")),
        )
        .into()
}

/// Surface backdrop: the pure hue.
fn surface_style(hsl: Hsl) -> String {
    format!("background-color: hsl({:.0}, 100%, 50%)", hsl.h)
}

/// Cursor position on the surface.
fn cursor_style(hsl: Hsl) -> String {
    format!("left: {:.1}%; top: {:.1}%", hsl.s, 100.0 - hsl.l)
}

/// Show the popup, creating and binding it on first use, then restore the
/// highlighted choice from preferences.
pub(crate) fn open(s: &Arc<Shared>) {
    let popup = match s.find(&format!("#{POPUP_ID}")) {
        Some(popup) => popup,
        None => {
            let markup = popup_fragment(&s.config.presets, &s.picker.lock());
            let Some(popup) = s.dom.insert(s.dom.body(), Position::Last, &markup).first().copied()
            else {
                return;
            };
            bind(s, popup);
            popup
        }
    };
    s.dom.add_class(popup, ACTIVE);
    restore_selection(s, popup);
    debug!("color popup opened");
}

/// Highlight the card (or the custom section) matching the persisted theme.
fn restore_selection(s: &Shared, popup: NodeId) {
    let theme = s.prefs.theme();
    for card in s.find_all_in(popup, ".piv-theme-card") {
        let selected = theme.as_ref().is_some_and(|t| {
            t.kind == ThemeKind::Preset && s.dom.attr(card, "data-color").as_deref() == Some(t.color.as_str())
        });
        set_class(s, card, SELECTED, selected);
    }
    let custom = theme.as_ref().filter(|t| t.kind == ThemeKind::Custom);
    if let Some(section) = s.find_in(popup, ".piv-custom-picker") {
        set_class(s, section, SELECTED, custom.is_some());
    }
    if let Some(t) = custom {
        let restored = s.picker.lock().set_hex(&t.color);
        if restored {
            sync_controls(s, popup);
        }
    }
}

/// Add or remove `class` on `node`.
fn set_class(s: &Shared, node: NodeId, class: &str, on: bool) {
    if on {
        s.dom.add_class(node, class);
    } else {
        s.dom.remove_class(node, class);
    }
}

/// Reflect the picker state in the popup controls.
fn sync_controls(s: &Shared, popup: NodeId) {
    let (hsl, hex) = {
        let picker = s.picker.lock();
        (picker.hsl(), picker.hex())
    };
    let dom = &s.dom;
    if let Some(surface) = s.find_in(popup, ".piv-sl-surface") {
        dom.set_attr(surface, "style", &surface_style(hsl));
    }
    if let Some(cursor) = s.find_in(popup, ".piv-sl-cursor") {
        dom.set_attr(cursor, "style", &cursor_style(hsl));
    }
    if let Some(slider) = s.find_in(popup, ".piv-hue-slider") {
        dom.set_attr(slider, "value", &format!("{:.0}", hsl.h));
    }
    if let Some(preview) = s.find_in(popup, ".piv-color-preview") {
        dom.set_attr(preview, "style", &format!("background: {hex}"));
    }
    if let Some(input) = s.find_in(popup, ".piv-hex-input") {
        dom.set_attr(input, "value", &hex);
    }
}

/// Persist `color` with `kind`, apply it, and refresh the highlight.
fn choose(s: &Shared, popup: NodeId, color: &str, kind: ThemeKind) {
    s.prefs.save_theme(color, kind);
    theme::apply_background(s.dom.as_ref(), color);
    restore_selection(s, popup);
}

/// Wire the popup controls. Runs once, when the popup is created.
fn bind(s: &Arc<Shared>, popup: NodeId) {
    let dom = &s.dom;
    if let Some(close) = s.find_in(popup, ".piv-color-close") {
        dom.listen(
            close,
            EventKind::Click,
            handler(s, move |s, _| s.dom.remove_class(popup, ACTIVE)),
        );
    }
    for card in s.find_all_in(popup, ".piv-theme-card") {
        dom.listen(
            card,
            EventKind::Click,
            handler(s, move |s, ev| {
                if let Some(color) = s.dom.attr(ev.current, "data-color") {
                    choose(s, popup, &color, ThemeKind::Preset);
                }
            }),
        );
    }
    if let Some(surface) = s.find_in(popup, ".piv-sl-surface") {
        dom.listen(
            surface,
            EventKind::MouseDown,
            handler(s, move |s, ev| {
                let Some(p) = ev.pointer else {
                    return;
                };
                let rect = s.dom.rect(surface);
                s.picker.lock().pointer_down(rect, p.client_x, p.client_y);
                sync_controls(s, popup);
            }),
        );
        dom.listen(
            surface,
            EventKind::MouseMove,
            handler(s, move |s, ev| {
                let Some(p) = ev.pointer else {
                    return;
                };
                let rect = s.dom.rect(surface);
                let moved = s.picker.lock().pointer_move(rect, p.client_x, p.client_y);
                if moved {
                    sync_controls(s, popup);
                }
            }),
        );
        dom.listen(
            dom.body(),
            EventKind::MouseUp,
            handler(s, |s, _| s.picker.lock().pointer_up()),
        );
    }
    if let Some(slider) = s.find_in(popup, ".piv-hue-slider") {
        dom.listen(
            slider,
            EventKind::Input,
            handler(s, move |s, ev| {
                let Some(hue) = ev.value.as_deref().and_then(|v| v.trim().parse::<f64>().ok()) else {
                    return;
                };
                s.picker.lock().set_hue(hue);
                sync_controls(s, popup);
            }),
        );
    }
    if let Some(input) = s.find_in(popup, ".piv-hex-input") {
        dom.listen(
            input,
            EventKind::Change,
            handler(s, move |s, ev| {
                let value = ev.value.clone().unwrap_or_default();
                let valid = s.picker.lock().set_hex(&value);
                if !valid {
                    debug!(value = %value, "ignoring invalid hex input");
                }
                sync_controls(s, popup);
            }),
        );
    }
    if let Some(apply) = s.find_in(popup, ".piv-color-apply") {
        dom.listen(
            apply,
            EventKind::Click,
            handler(s, move |s, _| {
                let hex = s.picker.lock().hex();
                choose(s, popup, &hex, ThemeKind::Custom);
            }),
        );
    }
}
