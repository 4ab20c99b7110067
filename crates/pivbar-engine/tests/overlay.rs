mod support;

use std::{sync::Arc, time::Duration};

use pivbar_dom::{Dom, Element, MemoryDom, Position, SelectorError};
use pivbar_engine::{
    Error, Host, MemoryBackend, MemoryWindow, MountOutcome, Overlay, Preferences, ThemeKind,
    Window,
};
use support::{ALLOWED, Fixture, PROD_HOST, UNKNOWN, host_page, resources};

#[tokio::test(start_paused = true)]
async fn mounts_on_allowed_view() {
    let fx = Fixture::new(PROD_HOST, ALLOWED);
    assert!(!fx.overlay.dev_mode());
    assert_eq!(fx.overlay.mount().await, MountOutcome::Mounted);

    let pane = fx.node(".header-pane");
    assert_eq!(fx.dom.children(pane).first().copied(), Some(fx.root()));
    assert!(fx.dom.query("head > #piv-fontawesome").unwrap().is_some());
    assert!(fx.dom.query("head > #piv-custom-style").unwrap().is_some());
    assert_eq!(
        fx.dom.query_all(".piv-menu-bar > .piv-dropdown-item-container").unwrap().len(),
        config::builtin().groups.len()
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_mounts_inject_once_and_bind_once() {
    let fx = Fixture::new(PROD_HOST, ALLOWED);
    assert_eq!(fx.overlay.mount().await, MountOutcome::Mounted);
    let listeners = fx.dom.listener_count();

    assert_eq!(fx.overlay.mount().await, MountOutcome::AlreadyMounted);
    fx.window.set_fragment(UNKNOWN);
    assert_eq!(fx.overlay.mount().await, MountOutcome::AlreadyMounted);

    assert_eq!(fx.dom.query_all("#piv-custom-header").unwrap().len(), 1);
    assert_eq!(fx.dom.query_all("#piv-fontawesome").unwrap().len(), 1);
    assert_eq!(fx.dom.listener_count(), listeners);

    // A doubly bound toggle would flip twice and end where it started.
    let hide = fx.node(r#".piv-utility-item[data-action="hide-navbar"]"#);
    fx.dom.click(hide);
    assert!(fx.dom.has_class(fx.root(), "piv-minimized"));
    fx.dom.click(hide);
    assert!(!fx.dom.has_class(fx.root(), "piv-minimized"));
    assert_eq!(fx.dom.text(hide), "Masquer la Barre");
}

#[tokio::test(start_paused = true)]
async fn ineligible_view_leaves_document_untouched() {
    let fx = Fixture::new(PROD_HOST, UNKNOWN);
    let sub = fx.dom.observe();
    let generation = sub.generation();
    let before = fx.dom.to_html();
    assert!(!fx.overlay.is_eligible(UNKNOWN));
    assert_eq!(fx.overlay.mount().await, MountOutcome::Ineligible);
    assert_eq!(sub.generation(), generation);
    assert_eq!(fx.dom.to_html(), before);
}

#[tokio::test(start_paused = true)]
async fn developer_mode_bypasses_allow_list() {
    let fx = Fixture::new("localhost", UNKNOWN);
    assert!(fx.overlay.dev_mode());
    assert!(fx.overlay.is_eligible(UNKNOWN));
    assert_eq!(fx.overlay.mount().await, MountOutcome::Mounted);
}

#[tokio::test(start_paused = true)]
async fn waits_for_menu_anchor() {
    let fx = Fixture::with_page(
        PROD_HOST,
        ALLOWED,
        &host_page(false),
        Arc::new(MemoryBackend::new()),
    );
    let overlay = fx.overlay.clone();
    let task = tokio::spawn(async move { overlay.mount().await });
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(!task.is_finished());
    assert!(!fx.overlay.is_mounted());

    // A concurrent pass does not start a second mount.
    assert_eq!(fx.overlay.mount().await, MountOutcome::InFlight);

    let header = fx.node(".c-header");
    fx.dom.insert(
        header,
        Position::Last,
        &Element::new("div").class("header-pane").into(),
    );
    assert_eq!(task.await.unwrap(), MountOutcome::Mounted);
    assert_eq!(fx.dom.query_all("#piv-custom-header").unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn auxiliary_fragments_land_in_their_anchors() {
    let fx = Fixture::new(PROD_HOST, ALLOWED);
    fx.overlay.mount().await;

    let logo = fx.node(".c-app-logo");
    let secondary = fx.node(".piv-secondary-logo");
    assert_eq!(fx.dom.children(logo).first().copied(), Some(secondary));
    assert!(fx.dom.inner_html(secondary).contains(r#"<svg id="secondary">"#));

    let sidebar = fx.node("#sidebar-pane");
    let sidebar_logo = fx.node(".piv-sidebar-logo");
    assert_eq!(fx.dom.children(sidebar).first().copied(), Some(sidebar_logo));

    let header = fx.node(".c-header");
    let clock = fx.node(".piv-live-date");
    assert_eq!(fx.dom.children(header).get(1).copied(), Some(clock));
    assert_eq!(fx.dom.text(clock), "Vendredi 17 octobre - 03:04:05 PM");
}

#[tokio::test(start_paused = true)]
async fn clock_ticks_every_second_until_shutdown() {
    let fx = Fixture::new(PROD_HOST, ALLOWED);
    fx.overlay.mount().await;
    let clock = fx.node(".piv-live-date");

    fx.clock.advance_secs(1);
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(fx.dom.text(clock), "Vendredi 17 octobre - 03:04:06 PM");

    fx.overlay.shutdown();
    fx.clock.advance_secs(60);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(fx.dom.text(clock), "Vendredi 17 octobre - 03:04:06 PM");
}

#[tokio::test(start_paused = true)]
async fn missing_auxiliary_anchor_does_not_block_mount() {
    let page = pivbar_dom::Fragment::from(
        Element::new("div")
            .class("c-header")
            .child(Element::new("div").class("c-app-logo"))
            .child(Element::new("div").class("header-pane")),
    );
    let fx = Fixture::with_page(PROD_HOST, ALLOWED, &page, Arc::new(MemoryBackend::new()));
    let start = tokio::time::Instant::now();
    assert_eq!(fx.overlay.mount().await, MountOutcome::Mounted);
    assert!(start.elapsed() >= Duration::from_millis(2000));

    // Handlers are bound even though the sidebar never appeared.
    let hide = fx.node(r#".piv-utility-item[data-action="hide-navbar"]"#);
    fx.dom.click(hide);
    assert!(fx.dom.has_class(fx.root(), "piv-minimized"));

    // The pending injection completes whenever its anchor shows up.
    fx.dom.insert(
        fx.dom.body(),
        Position::Last,
        &Element::new("div").id("sidebar-pane").into(),
    );
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(fx.dom.query("#sidebar-pane > .piv-sidebar-logo").unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn run_mounts_after_navigation_to_allowed_view() {
    let fx = Fixture::new(PROD_HOST, UNKNOWN);
    let overlay = fx.overlay.clone();
    let task = tokio::spawn(async move { overlay.run().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!fx.overlay.is_mounted());

    fx.window.set_fragment(ALLOWED);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(fx.overlay.is_mounted());

    fx.overlay.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn restores_persisted_theme_on_mount() {
    let backend = Arc::new(MemoryBackend::new());
    let fx = Fixture::with_page(PROD_HOST, ALLOWED, &host_page(true), backend.clone());
    fx.prefs.save_theme("#f3f4f6", ThemeKind::Custom);
    fx.overlay.mount().await;
    let style = fx.node("#piv-bg-color-style");
    let first = fx.dom.text(style);
    assert!(first.contains("background: #f3f4f6 !important;"));
    assert!(first.contains("color: #000000cc !important;"));

    // A fresh page over the same storage reproduces the same block.
    let again = Fixture::with_page(PROD_HOST, ALLOWED, &host_page(true), backend);
    again.overlay.mount().await;
    assert_eq!(again.dom.text(again.node("#piv-bg-color-style")), first);
}

#[tokio::test(start_paused = true)]
async fn storage_failure_degrades_to_no_theme() {
    let backend = Arc::new(MemoryBackend::new());
    let fx = Fixture::with_page(PROD_HOST, ALLOWED, &host_page(true), backend.clone());
    fx.prefs.save_theme("#0f172a", ThemeKind::Preset);
    backend.set_failing(true);
    assert_eq!(fx.overlay.mount().await, MountOutcome::Mounted);
    assert!(fx.dom.query("#piv-bg-color-style").unwrap().is_none());
}

#[test]
fn malformed_anchor_is_rejected_up_front() {
    let mut cfg = config::builtin().clone();
    cfg.anchors.menu = "   ".into();
    let dom = Arc::new(MemoryDom::with_body(&host_page(true)));
    let window = Arc::new(MemoryWindow::new(PROD_HOST, ALLOWED));
    let prefs = Preferences::new(Arc::new(MemoryBackend::new()));
    let host = Host::new(dom, window, prefs);
    let err = Overlay::new(Arc::new(cfg), resources(), host).err().unwrap();
    assert!(matches!(
        err,
        Error::Anchor {
            name: "menu",
            source: SelectorError::Empty
        }
    ));
    assert!(err.to_string().starts_with("invalid menu anchor"));
}

#[tokio::test(start_paused = true)]
async fn fragment_is_read_from_window() {
    let fx = Fixture::new(PROD_HOST, ALLOWED);
    assert_eq!(fx.window.fragment(), ALLOWED);
    assert!(fx.overlay.is_eligible(&format!("{ALLOWED}?mode=kiosk")));
}
