//! The browsing-context seam: location fragment, reload, alerts, and the
//! host/protocol pair used for developer-mode detection.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

/// The host window as seen by the overlay.
pub trait Window: Send + Sync {
    /// Current location fragment, including the leading `#`.
    fn fragment(&self) -> String;
    /// Rewrite the location fragment; the host router reacts to it.
    fn set_fragment(&self, fragment: &str);
    /// Reload the page.
    fn reload(&self);
    /// Show a blocking notice.
    fn alert(&self, message: &str);
    /// Location hostname.
    fn hostname(&self) -> String;
    /// Location protocol, including the trailing `:`.
    fn protocol(&self) -> String;
    /// Fragment-change notifications.
    fn subscribe_fragment(&self) -> watch::Receiver<String>;
}

/// An in-memory window that records reloads and alerts.
#[derive(Debug)]
pub struct MemoryWindow {
    /// Current fragment.
    fragment: watch::Sender<String>,
    /// Hostname.
    hostname: String,
    /// Protocol.
    protocol: String,
    /// Reload count.
    reloads: Mutex<usize>,
    /// Alert messages in order.
    alerts: Mutex<Vec<String>>,
}

impl MemoryWindow {
    /// A window on `https://<hostname>/` showing `fragment`.
    pub fn new(hostname: &str, fragment: &str) -> Self {
        Self::with_protocol("https:", hostname, fragment)
    }

    /// A window with an explicit protocol (e.g. `"file:"`).
    pub fn with_protocol(protocol: &str, hostname: &str, fragment: &str) -> Self {
        let (tx, _) = watch::channel(fragment.to_string());
        Self {
            fragment: tx,
            hostname: hostname.to_string(),
            protocol: protocol.to_string(),
            reloads: Mutex::new(0),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Number of reloads requested.
    pub fn reloads(&self) -> usize {
        *self.reloads.lock()
    }

    /// Alerts shown so far.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl Window for MemoryWindow {
    fn fragment(&self) -> String {
        self.fragment.borrow().clone()
    }

    fn set_fragment(&self, fragment: &str) {
        // Like the browser, assigning the current fragment is not a change.
        self.fragment.send_if_modified(|cur| {
            if cur == fragment {
                false
            } else {
                fragment.clone_into(cur);
                true
            }
        });
    }

    fn reload(&self) {
        *self.reloads.lock() += 1;
    }

    fn alert(&self, message: &str) {
        info!(message, "alert");
        self.alerts.lock().push(message.to_string());
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn protocol(&self) -> String {
        self.protocol.clone()
    }

    fn subscribe_fragment(&self) -> watch::Receiver<String> {
        self.fragment.subscribe()
    }
}

/// Developer mode: loopback hosts or local files.
pub fn is_dev_host(hostname: &str, protocol: &str) -> bool {
    matches!(hostname, "localhost" | "127.0.0.1") || protocol == "file:"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_mode_detection() {
        assert!(is_dev_host("localhost", "http:"));
        assert!(is_dev_host("127.0.0.1", "http:"));
        assert!(is_dev_host("", "file:"));
        assert!(!is_dev_host("pimining.ocpgroup.ma", "https:"));
        assert!(!is_dev_host("localhost.example", "https:"));
    }

    #[tokio::test]
    async fn fragment_changes_notify_subscribers() {
        let w = MemoryWindow::new("pimining.ocpgroup.ma", "#/");
        let mut rx = w.subscribe_fragment();
        w.set_fragment("#/");
        assert!(!rx.has_changed().unwrap());
        w.set_fragment("#/Displays/305/Vue-Globale-Pipeline");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "#/Displays/305/Vue-Globale-Pipeline");
        assert_eq!(w.fragment(), "#/Displays/305/Vue-Globale-Pipeline");
    }
}
