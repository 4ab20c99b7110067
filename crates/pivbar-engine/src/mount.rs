//! Overlay mount: eligibility, one-time injection, auxiliary fragments, and
//! the fragment-change loop.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use config::Config;
use futures::future;
use parking_lot::Mutex;
use pivbar_dom::{Dom, Element, NodeId, Position, Selector, wait_for_element};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{
    Error, Result, Window, binder,
    clock::{self, CLOCK_CLASS, Now},
    picker::ColorPicker,
    render::{self, ROOT_ID},
    store::Preferences,
    theme, window,
};

/// Id of the icon font `<link>`.
pub const FONT_AWESOME_ID: &str = "piv-fontawesome";
/// Id of the overlay stylesheet `<style>`.
pub const STYLESHEET_ID: &str = "piv-custom-style";
/// Marker class of the secondary logo.
pub const SECONDARY_LOGO_CLASS: &str = "piv-secondary-logo";
/// Marker class of the sidebar logo.
pub const SIDEBAR_LOGO_CLASS: &str = "piv-sidebar-logo";

/// Stylesheet and logo payloads injected with the overlay.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    /// Overlay CSS.
    pub stylesheet: String,
    /// Branding logo inside the menu bar (SVG markup).
    pub logo: String,
    /// Logo placed in the host logo container.
    pub secondary_logo: String,
    /// Logo placed at the top of the host sidebar.
    pub sidebar_logo: String,
}

/// Host capabilities the overlay runs against.
#[derive(Clone)]
pub struct Host {
    /// The page document.
    pub dom: Arc<dyn Dom>,
    /// The browsing context.
    pub window: Arc<dyn Window>,
    /// Persistent preferences.
    pub prefs: Preferences,
    /// Time source for the live clock.
    pub now: Now,
}

impl Host {
    /// A host using the system clock.
    pub fn new(dom: Arc<dyn Dom>, window: Arc<dyn Window>, prefs: Preferences) -> Self {
        Self {
            dom,
            window,
            prefs,
            now: clock::system_clock(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, now: Now) -> Self {
        self.now = now;
        self
    }
}

/// Result of one mount pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The overlay was injected by this pass.
    Mounted,
    /// The overlay root already exists; nothing was done.
    AlreadyMounted,
    /// The current view is not eligible, or the overlay could not be placed.
    Ineligible,
    /// Another pass is mounting right now.
    InFlight,
}

/// State shared by the overlay and its event handlers.
pub(crate) struct Shared {
    /// Loaded configuration.
    pub(crate) config: Arc<Config>,
    /// Injected payloads.
    pub(crate) resources: Resources,
    /// Page document.
    pub(crate) dom: Arc<dyn Dom>,
    /// Browsing context.
    pub(crate) window: Arc<dyn Window>,
    /// Persistent preferences.
    pub(crate) prefs: Preferences,
    /// Clock source.
    pub(crate) now: Now,
    /// Loopback host or local file.
    pub(crate) dev_mode: bool,
    /// Color picker state.
    pub(crate) picker: Mutex<ColorPicker>,
    /// Set while a mount pass is between its checks and its insertion.
    mounting: AtomicBool,
    /// Cancels background tasks.
    shutdown: CancellationToken,
}

impl Shared {
    /// First match for `selector`, logging malformed selectors.
    pub(crate) fn find(&self, selector: &str) -> Option<NodeId> {
        self.dom
            .query(selector)
            .inspect_err(|e| warn!(error = %e, "selector lookup failed"))
            .ok()
            .flatten()
    }

    /// First descendant of `scope` matching `selector`.
    pub(crate) fn find_in(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.dom
            .query_in(scope, selector)
            .inspect_err(|e| warn!(error = %e, "selector lookup failed"))
            .ok()
            .flatten()
    }

    /// All descendants of `scope` matching `selector`.
    pub(crate) fn find_all_in(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        self.dom
            .query_all_in(scope, selector)
            .inspect_err(|e| warn!(error = %e, "selector lookup failed"))
            .unwrap_or_default()
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    pub(crate) fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        self.dom
            .closest(node, selector)
            .inspect_err(|e| warn!(error = %e, "selector lookup failed"))
            .ok()
            .flatten()
    }

    /// The overlay root, when mounted.
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.find(&format!("#{ROOT_ID}"))
    }
}

/// Clears the in-flight flag when a mount pass ends, however it ends.
struct MountGuard<'a>(&'a AtomicBool);

impl<'a> MountGuard<'a> {
    /// Take the flag, or `None` if another pass holds it.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The navigation overlay bound to one host page.
#[derive(Clone)]
pub struct Overlay {
    /// Shared state.
    shared: Arc<Shared>,
}

impl Overlay {
    /// Prepare an overlay. Fails only when a configured anchor is not a valid
    /// selector.
    pub fn new(config: Arc<Config>, resources: Resources, host: Host) -> Result<Self> {
        let anchors = &config.anchors;
        for (name, sel) in [
            ("menu", &anchors.menu),
            ("logo", &anchors.logo),
            ("sidebar", &anchors.sidebar),
            ("header", &anchors.header),
        ] {
            Selector::parse(sel).map_err(|source| Error::Anchor { name, source })?;
        }
        let dev_mode = window::is_dev_host(&host.window.hostname(), &host.window.protocol());
        if dev_mode {
            info!("developer mode enabled");
        }
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                resources,
                dom: host.dom,
                window: host.window,
                prefs: host.prefs,
                now: host.now,
                dev_mode,
                picker: Mutex::new(ColorPicker::default()),
                mounting: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Whether developer mode is on.
    pub fn dev_mode(&self) -> bool {
        self.shared.dev_mode
    }

    /// Eligible iff `fragment` starts with an allowed prefix or developer mode is on.
    pub fn is_eligible(&self, fragment: &str) -> bool {
        self.shared.dev_mode || self.shared.config.is_allowed_view(fragment)
    }

    /// True once the overlay root exists in the document.
    pub fn is_mounted(&self) -> bool {
        self.shared.root().is_some()
    }

    /// Run one mount pass for the current fragment.
    ///
    /// Once mounted, every later pass is a no-op. An ineligible view leaves the
    /// document untouched. Otherwise, in order: ensure the icon font and the
    /// stylesheet, wait for the menu anchor, insert the overlay as its first
    /// child, run the auxiliary injections, bind handlers, restore the theme.
    pub async fn mount(&self) -> MountOutcome {
        let s = &self.shared;
        if self.is_mounted() {
            trace!("overlay already mounted");
            return MountOutcome::AlreadyMounted;
        }
        let fragment = s.window.fragment();
        let allowed = s.config.is_allowed_view(&fragment);
        if !allowed && !s.dev_mode {
            debug!(fragment, "overlay skipped: view is not a target view");
            return MountOutcome::Ineligible;
        }
        if !allowed {
            info!(fragment, "developer mode: view filtering bypassed");
        }
        let Some(_guard) = MountGuard::acquire(&s.mounting) else {
            debug!("mount already in flight");
            return MountOutcome::InFlight;
        };

        self.ensure_font_awesome();
        self.ensure_stylesheet();

        let anchor = match wait_for_element(s.dom.as_ref(), &s.config.anchors.menu).await {
            Ok(node) => node,
            Err(e) => {
                error!(error = %e, "menu anchor lookup failed");
                return MountOutcome::Ineligible;
            }
        };
        if self.is_mounted() {
            return MountOutcome::AlreadyMounted;
        }
        let overlay = render::render_overlay(&s.config, &s.resources.logo);
        let Some(root) = s.dom.insert(anchor, Position::First, &overlay).first().copied() else {
            error!("overlay insertion produced no root");
            return MountOutcome::Ineligible;
        };

        self.run_auxiliary().await;
        binder::bind_all(s, root);
        self.restore_theme();

        info!("overlay initialized");
        MountOutcome::Mounted
    }

    /// Mount now and again on every fragment change until [`Overlay::shutdown`].
    pub async fn run(&self) {
        let mut fragments = self.shared.window.subscribe_fragment();
        loop {
            tokio::select! {
                _ = self.shared.shutdown.cancelled() => return,
                outcome = self.mount() => trace!(?outcome, "mount pass"),
            }
            tokio::select! {
                _ = self.shared.shutdown.cancelled() => return,
                changed = fragments.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }

    /// Stop the mount loop and the clock.
    pub fn shutdown(&self) {
        self.shared.shutdown.cancel();
    }

    /// Insert the icon font `<link>` unless present.
    fn ensure_font_awesome(&self) {
        let s = &self.shared;
        if s.find(&format!("#{FONT_AWESOME_ID}")).is_some() {
            return;
        }
        let link = Element::new("link")
            .id(FONT_AWESOME_ID)
            .attr("rel", "stylesheet")
            .attr("href", &s.config.font_awesome_url)
            .attr("crossorigin", "anonymous");
        s.dom.insert(s.dom.head(), Position::Last, &link.into());
    }

    /// Insert the overlay stylesheet unless present.
    fn ensure_stylesheet(&self) {
        let s = &self.shared;
        if s.find(&format!("#{STYLESHEET_ID}")).is_some() {
            return;
        }
        let style = Element::new("style")
            .id(STYLESHEET_ID)
            .text(&s.resources.stylesheet);
        s.dom.insert(s.dom.head(), Position::Last, &style.into());
    }

    /// Launch the three auxiliary injections and wait for them, bounded by
    /// the configured timeout. Injections still waiting for their anchor keep
    /// running in the background.
    async fn run_auxiliary(&self) {
        let s = &self.shared;
        let anchors = &s.config.anchors;
        let tasks = vec![
            tokio::spawn(inject_logo(
                s.dom.clone(),
                anchors.logo.clone(),
                SECONDARY_LOGO_CLASS,
                s.resources.secondary_logo.clone(),
            )),
            tokio::spawn(inject_logo(
                s.dom.clone(),
                anchors.sidebar.clone(),
                SIDEBAR_LOGO_CLASS,
                s.resources.sidebar_logo.clone(),
            )),
            tokio::spawn(inject_clock(
                s.dom.clone(),
                anchors.header.clone(),
                s.now.clone(),
                s.shutdown.child_token(),
            )),
        ];
        let limit = Duration::from_millis(s.config.aux_join_timeout_ms);
        match time::timeout(limit, future::join_all(tasks)).await {
            Ok(results) => {
                for r in results {
                    if let Err(e) = r {
                        warn!(error = %e, "auxiliary injection failed");
                    }
                }
            }
            Err(_) => debug!(
                timeout_ms = s.config.aux_join_timeout_ms,
                "auxiliary injections still pending; continuing"
            ),
        }
    }

    /// Re-apply the persisted background, if any.
    fn restore_theme(&self) {
        let s = &self.shared;
        let Some(theme) = s.prefs.theme() else {
            return;
        };
        if theme::apply_background(s.dom.as_ref(), &theme.color) {
            if s.dev_mode {
                info!(kind = ?theme.kind, color = %theme.color, "restored theme");
            } else {
                debug!(kind = ?theme.kind, color = %theme.color, "restored theme");
            }
        }
    }
}

/// Wait for `selector`, then insert `svg` wrapped in a `class` div as its
/// first child unless one is already there.
async fn inject_logo(dom: Arc<dyn Dom>, selector: String, class: &'static str, svg: String) {
    let container = match wait_for_element(dom.as_ref(), &selector).await {
        Ok(node) => node,
        Err(e) => {
            warn!(error = %e, class, "logo anchor lookup failed");
            return;
        }
    };
    if matches!(dom.query_in(container, &format!(".{class}")), Ok(Some(_))) {
        return;
    }
    let wrapper = Element::new("div").class(class).raw(svg);
    dom.insert(container, Position::First, &wrapper.into());
    debug!(class, "logo injected");
}

/// Wait for the header, insert the clock as its second element child, and
/// start ticking.
async fn inject_clock(dom: Arc<dyn Dom>, selector: String, now: Now, cancel: CancellationToken) {
    let header = match wait_for_element(dom.as_ref(), &selector).await {
        Ok(node) => node,
        Err(e) => {
            warn!(error = %e, "header anchor lookup failed");
            return;
        }
    };
    if matches!(dom.query_in(header, &format!(".{CLOCK_CLASS}")), Ok(Some(_))) {
        return;
    }
    let position = dom
        .children(header)
        .get(1)
        .copied()
        .map_or(Position::Last, Position::Before);
    let el = Element::new("div")
        .class(CLOCK_CLASS)
        .text(clock::format_french_datetime(now()));
    let Some(node) = dom.insert(header, position, &el.into()).first().copied() else {
        return;
    };
    clock::spawn_ticker(dom, node, now, cancel);
    debug!("clock injected");
}
