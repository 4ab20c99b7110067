use std::{sync::Arc, time::Duration};

use pivbar_dom::{Dom, Element, Fragment, MemoryDom, Position, SelectorError, wait_for_element};
use tokio::time::timeout;

fn empty_page() -> Arc<MemoryDom> {
    Arc::new(MemoryDom::with_body(&Fragment::from(
        Element::new("div").id("shell"),
    )))
}

#[tokio::test]
async fn resolves_immediately_when_present() {
    let dom = empty_page();
    let shell = dom.query("#shell").unwrap().unwrap();
    assert_eq!(wait_for_element(dom.as_ref(), "#shell").await, Ok(shell));
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn resolves_when_element_is_inserted_later() {
    let dom = empty_page();
    let waiter = {
        let dom = dom.clone();
        tokio::spawn(async move { wait_for_element(dom.as_ref(), ".header-pane").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(dom.observer_count(), 1);

    // Unrelated mutations do not resolve the wait.
    let shell = dom.query("#shell").unwrap().unwrap();
    dom.set_attr(shell, "data-state", "loading");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    let inserted = dom.insert(
        shell,
        Position::Last,
        &Element::new("div").class("header-pane").into(),
    );
    let found = waiter.await.unwrap().unwrap();
    assert_eq!(found, inserted[0]);
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn never_times_out_and_unsubscribes_on_drop() {
    let dom = empty_page();
    let res = timeout(
        Duration::from_secs(3600),
        wait_for_element(dom.as_ref(), ".never"),
    )
    .await;
    assert!(res.is_err());
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test]
async fn malformed_selector_is_an_error() {
    let dom = empty_page();
    assert_eq!(
        wait_for_element(dom.as_ref(), "").await,
        Err(SelectorError::Empty)
    );
}
