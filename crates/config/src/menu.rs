//! The navigation menu tree: top-level groups holding nested items.

use serde::{Deserialize, Serialize};

/// A top-level dropdown in the menu bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    /// Button label; also the source of the group's DOM id.
    pub title: String,
    /// Ordered entries shown in the dropdown.
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    /// Deterministic DOM id for this group, derived from its title.
    pub fn dom_id(&self) -> String {
        sanitize_id(&self.title)
    }
}

/// A single entry in a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItem {
    /// Navigates the host application by rewriting the location fragment.
    Navigation {
        text: String,
        icon: String,
        /// Fragment written into the location, e.g. `#/Displays/305/Vue-Globale-Pipeline`.
        target: String,
    },
    /// Opens an external page in a new browsing context.
    External {
        text: String,
        icon: String,
        url: String,
    },
    /// A titled container for nested entries.
    Submenu {
        text: String,
        icon: String,
        children: Vec<MenuItem>,
    },
}

impl MenuItem {
    /// Visible label.
    pub fn text(&self) -> &str {
        match self {
            Self::Navigation { text, .. } | Self::External { text, .. } | Self::Submenu { text, .. } => {
                text
            }
        }
    }

    /// Icon class list.
    pub fn icon(&self) -> &str {
        match self {
            Self::Navigation { icon, .. } | Self::External { icon, .. } | Self::Submenu { icon, .. } => {
                icon
            }
        }
    }

    /// Visit every navigation target in this subtree, depth first.
    pub fn for_each_target<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::Navigation { target, .. } => f(target),
            Self::External { .. } => {}
            Self::Submenu { children, .. } => {
                for child in children {
                    child.for_each_target(f);
                }
            }
        }
    }

    /// Nesting depth of this subtree; leaves are depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Self::Submenu { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// Each Unicode scalar maps to exactly one `_`, so `"Station Tête"` becomes
/// `"Station_T_te"`.
pub fn sanitize_id(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
