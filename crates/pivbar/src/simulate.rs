//! Offline rehearsal: mount the overlay on a skeleton host page held in
//! memory, replay clicks, and report the resulting document.

use std::{sync::Arc, time::Duration};

use config::Config;
use pivbar_dom::{Dom, Element, Fragment, MemoryDom};
use pivbar_engine::{
    Host, MemoryWindow, MountOutcome, Overlay, Preferences, Resources, Window,
};
use thiserror::Error;
use tokio::time;
use tracing::{debug, info};

/// Production host the skeleton pretends to be served from.
pub const DEFAULT_HOST: &str = "pimining.ocpgroup.ma";

/// Why a simulation could not complete.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configured anchor selector is malformed.
    #[error(transparent)]
    Engine(#[from] pivbar_engine::Error),
    /// The menu anchor never appeared.
    #[error("overlay not mounted after {0:?}: menu anchor missing")]
    Timeout(Duration),
    /// A click selector is malformed.
    #[error(transparent)]
    Selector(#[from] pivbar_dom::SelectorError),
    /// A click selector matched nothing.
    #[error("no element matches {0:?}")]
    NoMatch(String),
}

/// Inputs of one simulation run.
pub struct Scenario {
    /// Hostname reported by the window.
    pub host: String,
    /// Initial route fragment.
    pub fragment: String,
    /// Selectors clicked in order after mounting.
    pub clicks: Vec<String>,
    /// Upper bound on the mount pass.
    pub timeout: Duration,
}

/// What the run produced.
#[derive(Debug)]
pub struct Report {
    /// Mount result.
    pub outcome: MountOutcome,
    /// Route fragment after the clicks.
    pub fragment: String,
    /// Page reloads requested.
    pub reloads: usize,
    /// Alert messages shown.
    pub alerts: Vec<String>,
    /// Final document markup.
    pub html: String,
}

/// The host shell the overlay expects: header with logo container, menu
/// pane and title, plus the sidebar.
pub fn host_page() -> Fragment {
    Element::new("div")
        .id("viewport")
        .child(
            Element::new("div")
                .class("c-header")
                .child(Element::new("div").class("c-app-logo"))
                .child(Element::new("div").class("header-pane"))
                .child(Element::new("div").class("t-header").text("PI Vision")),
        )
        .child(Element::new("div").id("sidebar-pane"))
        .child(Element::new("div").id("display-area"))
        .into()
}

/// Mount on a fresh skeleton, replay `scenario.clicks`, and shut down.
pub async fn run(
    config: Arc<Config>,
    resources: Resources,
    prefs: Preferences,
    scenario: Scenario,
) -> Result<Report, SimError> {
    let dom = Arc::new(MemoryDom::with_body(&host_page()));
    let window = Arc::new(MemoryWindow::new(&scenario.host, &scenario.fragment));
    let host = Host::new(dom.clone(), window.clone(), prefs);
    let overlay = Overlay::new(config, resources, host)?;

    let outcome = time::timeout(scenario.timeout, overlay.mount())
        .await
        .map_err(|_| SimError::Timeout(scenario.timeout))?;
    info!(?outcome, "mount finished");

    for selector in &scenario.clicks {
        let node = dom
            .query(selector)?
            .ok_or_else(|| SimError::NoMatch(selector.clone()))?;
        let ev = dom.click(node);
        debug!(selector, prevented = ev.default_prevented(), "clicked");
    }
    overlay.shutdown();

    Ok(Report {
        outcome,
        fragment: window.fragment(),
        reloads: window.reloads(),
        alerts: window.alerts(),
        html: dom.to_html(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(fragment: &str, clicks: &[&str]) -> Scenario {
        Scenario {
            host: DEFAULT_HOST.into(),
            fragment: fragment.into(),
            clicks: clicks.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(5),
        }
    }

    async fn simulate(s: Scenario) -> Result<Report, SimError> {
        run(
            Arc::new(config::builtin().clone()),
            crate::assets::embedded(),
            Preferences::in_memory(),
            s,
        )
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn mounts_and_navigates() {
        let report = simulate(scenario(
            "#/Displays/305/Vue-Globale-Pipeline",
            &[r##"a[data-hash="#/Displays/10938/Tonnage"]"##],
        ))
        .await
        .unwrap();
        assert_eq!(report.outcome, MountOutcome::Mounted);
        assert_eq!(report.fragment, "#/Displays/10938/Tonnage");
        assert!(report.html.contains(r#"id="piv-custom-header""#));
        assert!(report.html.contains("piv-live-date"));
    }

    #[tokio::test(start_paused = true)]
    async fn ineligible_view_is_reported() {
        let report = simulate(scenario("#/Displays/1/Other", &[])).await.unwrap();
        assert_eq!(report.outcome, MountOutcome::Ineligible);
        assert!(!report.html.contains("piv-custom-header"));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_click_target_fails() {
        let err = simulate(scenario("#/Displays/305/Vue-Globale-Pipeline", &[".nope"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SimError::NoMatch(s) if s == ".nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_is_recorded() {
        let report = simulate(scenario(
            "#/Displays/305/Vue-Globale-Pipeline",
            &[r#".piv-utility-item[data-action="refresh-page"]"#],
        ))
        .await
        .unwrap();
        assert_eq!(report.reloads, 1);
        assert!(report.alerts.is_empty());
    }
}
