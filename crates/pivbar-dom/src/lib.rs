//! Host-page DOM seam.
//!
//! The overlay never talks to a concrete browser API. Everything it needs from
//! the host page goes through the [`Dom`] trait:
//! - [`markup`]: typed markup fragments rendered to HTML text
//! - [`selector`]: the CSS selector subset used to address host and overlay nodes
//! - [`event`]: event kinds and the event record passed to handlers
//! - [`MemoryDom`]: an in-memory document used by tests and the CLI simulator
//! - [`wait_for_element`]: resolve once a selector matches

mod dom;
mod error;
pub mod event;
pub mod markup;
mod memory;
pub mod selector;
mod wait;

pub use dom::{Dom, NodeId, Position, Rect, Subscription};
pub use error::SelectorError;
pub use event::{DomEvent, EventKind, Handler, Pointer};
pub use markup::{Element, Fragment, Node};
pub use memory::MemoryDom;
pub use selector::Selector;
pub use wait::wait_for_element;
