//! Host-page fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use config::Config;
use parking_lot::Mutex;
use pivbar_dom::{Element, Fragment, MemoryDom};
use pivbar_engine::{
    Host, MemoryBackend, MemoryWindow, Overlay, Preferences, Resources, clock::Now,
};

/// An allowed view from the built-in configuration.
pub const ALLOWED: &str = "#/Displays/305/Vue-Globale-Pipeline";
/// A view outside the allow-list.
pub const UNKNOWN: &str = "#/Displays/99999/Unknown-View";
/// Production hostname.
pub const PROD_HOST: &str = "pimining.ocpgroup.ma";

/// Skeleton of the host shell. `with_menu_anchor` controls whether the
/// `.header-pane` exists yet.
pub fn host_page(with_menu_anchor: bool) -> Fragment {
    let mut header = Element::new("div")
        .class("c-header")
        .child(Element::new("div").class("c-app-logo").text("PI Vision"));
    if with_menu_anchor {
        header = header.child(Element::new("div").class("header-pane"));
    }
    header = header.child(Element::new("div").class("t-header"));
    Element::new("div")
        .id("viewport")
        .child(header)
        .child(Element::new("div").id("sidebar-pane"))
        .into()
}

/// Stub payloads.
pub fn resources() -> Resources {
    Resources {
        stylesheet: ".piv-custom-header-bar { display: flex; }".into(),
        logo: r#"<svg id="ocp"></svg>"#.into(),
        secondary_logo: r#"<svg id="secondary"></svg>"#.into(),
        sidebar_logo: r#"<svg id="aveva"></svg>"#.into(),
    }
}

/// A controllable clock starting at Friday 17 October 2025, 15:04:05.
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<NaiveDateTime>>);

impl TestClock {
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2025, 10, 17)
            .unwrap()
            .and_hms_opt(15, 4, 5)
            .unwrap();
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut t = self.0.lock();
        *t += chrono::Duration::seconds(secs);
    }

    pub fn now(&self) -> Now {
        let inner = self.0.clone();
        Arc::new(move || *inner.lock())
    }
}

/// Everything a test needs to drive an overlay.
pub struct Fixture {
    pub dom: Arc<MemoryDom>,
    pub window: Arc<MemoryWindow>,
    pub backend: Arc<MemoryBackend>,
    pub prefs: Preferences,
    pub clock: TestClock,
    pub overlay: Overlay,
}

impl Fixture {
    pub fn new(hostname: &str, fragment: &str) -> Self {
        Self::with_page(hostname, fragment, &host_page(true), Arc::new(MemoryBackend::new()))
    }

    pub fn with_page(
        hostname: &str,
        fragment: &str,
        page: &Fragment,
        backend: Arc<MemoryBackend>,
    ) -> Self {
        Self::build(hostname, fragment, page, backend, config::builtin().clone())
    }

    /// Standard host page driven by a custom configuration.
    pub fn with_config(hostname: &str, fragment: &str, config: Config) -> Self {
        Self::build(hostname, fragment, &host_page(true), Arc::new(MemoryBackend::new()), config)
    }

    fn build(
        hostname: &str,
        fragment: &str,
        page: &Fragment,
        backend: Arc<MemoryBackend>,
        config: Config,
    ) -> Self {
        let dom = Arc::new(MemoryDom::with_body(page));
        let window = Arc::new(MemoryWindow::new(hostname, fragment));
        let prefs = Preferences::new(backend.clone());
        let clock = TestClock::new();
        let host = Host::new(dom.clone(), window.clone(), prefs.clone()).with_clock(clock.now());
        let overlay = Overlay::new(Arc::new(config), resources(), host).unwrap();
        Self {
            dom,
            window,
            backend,
            prefs,
            clock,
            overlay,
        }
    }

    /// The overlay root.
    pub fn root(&self) -> pivbar_dom::NodeId {
        use pivbar_dom::Dom;
        self.dom.query("#piv-custom-header").unwrap().unwrap()
    }

    /// First element matching `selector`.
    pub fn node(&self, selector: &str) -> pivbar_dom::NodeId {
        use pivbar_dom::Dom;
        self.dom
            .query(selector)
            .unwrap()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
    }
}
