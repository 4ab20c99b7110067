//! Waiting for host-page elements to appear.

use std::future;

use tracing::debug;

use crate::{Dom, NodeId, SelectorError};

/// Resolve with the first element matching `selector`.
///
/// Resolves immediately when a match already exists. Otherwise subscribes to
/// document mutations and re-checks after each one. There is no timeout: the
/// future stays pending until a match appears. Dropping the future drops the
/// subscription. If the document can no longer change, the future never
/// resolves.
pub async fn wait_for_element<D>(dom: &D, selector: &str) -> Result<NodeId, SelectorError>
where
    D: Dom + ?Sized,
{
    if let Some(id) = dom.query(selector)? {
        return Ok(id);
    }
    let mut sub = dom.observe();
    debug!(selector, "waiting for element");
    loop {
        // Re-check after subscribing so a mutation between the first query and
        // the subscription is not missed.
        if let Some(id) = dom.query(selector)? {
            debug!(selector, node = id.0, "element appeared");
            return Ok(id);
        }
        if !sub.changed().await {
            return future::pending().await;
        }
    }
}
