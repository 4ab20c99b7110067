//! Utility actions offered from the settings dropdown.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Action identifiers carried in `data-action` attributes.
///
/// Unknown identifiers survive parsing so that a stale configuration or
/// markup never fails; dispatch treats them as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Toggle the minimized state of the overlay root.
    HideNavbar,
    /// Open the background color popup.
    OpenBgColorPicker,
    /// Toggle the page-wide display mode, or announce an unavailable mode.
    SetFullscreenMode,
    /// Reload the page.
    RefreshPage,
    /// Any other identifier.
    Unknown(String),
}

impl ActionKind {
    /// Wire identifier for this action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::HideNavbar => "hide-navbar",
            Self::OpenBgColorPicker => "open-bg-color-picker",
            Self::SetFullscreenMode => "set-fullscreen-mode",
            Self::RefreshPage => "refresh-page",
            Self::Unknown(s) => s,
        }
    }

    /// Actions that decide for themselves whether the dropdown stays open.
    pub fn manages_own_lifecycle(&self) -> bool {
        matches!(self, Self::SetFullscreenMode | Self::RefreshPage)
    }
}

impl FromStr for ActionKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "hide-navbar" => Self::HideNavbar,
            "open-bg-color-picker" => Self::OpenBgColorPicker,
            "set-fullscreen-mode" => Self::SetFullscreenMode,
            "refresh-page" => Self::RefreshPage,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument to [`ActionKind::SetFullscreenMode`], carried in `data-mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FullscreenMode {
    /// Hide all host chrome.
    HideAll,
    /// Pick individual panes to hide (not available yet).
    CustomSelect,
}

impl FullscreenMode {
    /// Wire identifier for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HideAll => "hide-all",
            Self::CustomSelect => "custom-select",
        }
    }
}

impl FromStr for FullscreenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hide-all" => Ok(Self::HideAll),
            "custom-select" => Ok(Self::CustomSelect),
            other => Err(format!("unknown fullscreen mode '{}'", other)),
        }
    }
}

impl TryFrom<String> for FullscreenMode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FullscreenMode> for String {
    fn from(mode: FullscreenMode) -> Self {
        mode.as_str().to_string()
    }
}

/// An entry in the utility dropdown. Entries with a submenu render an
/// expandable affordance; the rest are flat actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityAction {
    pub text: String,
    pub icon: String,
    /// Dispatched action; `None` for pure submenu headers.
    pub action: Option<ActionKind>,
    /// Optional mode argument for the action.
    pub mode: Option<FullscreenMode>,
    /// Nested entries.
    pub submenu: Vec<UtilityAction>,
}

impl UtilityAction {
    /// True when this entry expands into nested entries.
    pub fn has_submenu(&self) -> bool {
        !self.submenu.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_ids_round_trip_through_strings() {
        for kind in [
            ActionKind::HideNavbar,
            ActionKind::OpenBgColorPicker,
            ActionKind::SetFullscreenMode,
            ActionKind::RefreshPage,
        ] {
            let s: String = kind.clone().into();
            assert_eq!(ActionKind::from(s), kind);
        }
    }

    #[test]
    fn unknown_action_is_preserved() {
        let kind = ActionKind::from("launch-rockets".to_string());
        assert_eq!(kind, ActionKind::Unknown("launch-rockets".into()));
        assert_eq!(kind.as_str(), "launch-rockets");
        assert!(!kind.manages_own_lifecycle());
    }

    #[test]
    fn lifecycle_exemptions() {
        assert!(ActionKind::SetFullscreenMode.manages_own_lifecycle());
        assert!(ActionKind::RefreshPage.manages_own_lifecycle());
        assert!(!ActionKind::HideNavbar.manages_own_lifecycle());
        assert!(!ActionKind::OpenBgColorPicker.manages_own_lifecycle());
    }

    #[test]
    fn fullscreen_mode_rejects_unknown() {
        assert_eq!("hide-all".parse::<FullscreenMode>(), Ok(FullscreenMode::HideAll));
        assert!("sideways".parse::<FullscreenMode>().is_err());
    }
}
