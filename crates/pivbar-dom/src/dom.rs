//! The [`Dom`] trait and its handle types.

use tokio::sync::watch;

use crate::{EventKind, Fragment, Handler, SelectorError};

/// Opaque handle to a node in a [`Dom`].
///
/// Handles stay valid until the node is removed; operations on a removed node
/// are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Where to place inserted nodes among a parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Before all existing children.
    First,
    /// After all existing children.
    Last,
    /// Immediately before this child; appended when it is not a child.
    Before(NodeId),
}

/// Layout box in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// A live subscription to document mutations.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    /// Mutation generation counter.
    rx: watch::Receiver<u64>,
}

impl Subscription {
    /// Wrap a generation receiver.
    pub fn new(rx: watch::Receiver<u64>) -> Self {
        Self { rx }
    }

    /// Wait for the next mutation. Returns `false` once the document is gone
    /// and no further mutations can happen.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Current mutation generation.
    pub fn generation(&self) -> u64 {
        *self.rx.borrow()
    }
}

/// The host page as seen by the overlay.
///
/// Selector arguments use the subset understood by [`crate::Selector`];
/// a malformed selector is reported as [`SelectorError`]. Operations on nodes
/// that no longer exist do nothing.
pub trait Dom: Send + Sync {
    /// The document `<head>`.
    fn head(&self) -> NodeId;

    /// The document `<body>`.
    fn body(&self) -> NodeId;

    /// First element in document order matching `selector`.
    fn query(&self, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// All elements in document order matching `selector`.
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// First descendant of `scope` matching `selector`.
    fn query_in(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// All descendants of `scope` matching `selector`.
    fn query_all_in(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError>;

    /// True while `node` exists.
    fn contains(&self, node: NodeId) -> bool;

    /// Parent element, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Element children in order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Insert `fragment` under `parent` at `position`. Returns the handles of
    /// the top-level elements that were inserted.
    fn insert(&self, parent: NodeId, position: Position, fragment: &Fragment) -> Vec<NodeId>;

    /// Detach and drop `node` with its subtree and listeners.
    fn remove(&self, node: NodeId);

    /// Lower-case tag name.
    fn tag(&self, node: NodeId) -> Option<String>;

    /// Attribute value.
    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute.
    fn set_attr(&self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attr(&self, node: NodeId, name: &str);

    /// Concatenated text content.
    fn text(&self, node: NodeId) -> String;

    /// Replace all children with a single text node.
    fn set_text(&self, node: NodeId, text: &str);

    /// Class membership.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add a class if absent.
    fn add_class(&self, node: NodeId, class: &str);

    /// Remove a class if present.
    fn remove_class(&self, node: NodeId, class: &str);

    /// Toggle a class; returns whether it is now present.
    fn toggle_class(&self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Layout box of `node`.
    fn rect(&self, node: NodeId) -> Rect;

    /// Register `handler` for `kind` events on `node`.
    fn listen(&self, node: NodeId, kind: EventKind, handler: Handler);

    /// Subscribe to document mutations.
    fn observe(&self) -> Subscription;
}
