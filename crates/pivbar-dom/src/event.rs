//! Event kinds and the event record handed to listeners.

use std::{cell::Cell, sync::Arc};

use crate::NodeId;

/// Event types the overlay listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Primary-button click.
    Click,
    /// Pointer entered the element. Does not bubble.
    MouseEnter,
    /// Pointer left the element. Does not bubble.
    MouseLeave,
    /// Pointer button pressed.
    MouseDown,
    /// Pointer moved.
    MouseMove,
    /// Pointer button released.
    MouseUp,
    /// Input value changed while editing.
    Input,
    /// Input value committed.
    Change,
}

impl EventKind {
    /// Whether the event propagates to ancestors after the target.
    pub fn bubbles(self) -> bool {
        !matches!(self, Self::MouseEnter | Self::MouseLeave)
    }
}

/// Pointer coordinates in client space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Horizontal client coordinate.
    pub client_x: f64,
    /// Vertical client coordinate.
    pub client_y: f64,
}

/// A dispatched event.
#[derive(Debug)]
pub struct DomEvent {
    /// Event type.
    pub kind: EventKind,
    /// Element the event was dispatched on.
    pub target: NodeId,
    /// Element whose listener is currently running.
    pub current: NodeId,
    /// Value of the target for input events.
    pub value: Option<String>,
    /// Pointer position for mouse events.
    pub pointer: Option<Pointer>,
    /// Set by [`DomEvent::prevent_default`].
    default_prevented: Cell<bool>,
    /// Set by [`DomEvent::stop_propagation`].
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    /// A new event targeted at `target`.
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current: target,
            value: None,
            pointer: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Attach an input value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach pointer coordinates.
    pub fn with_pointer(mut self, client_x: f64, client_y: f64) -> Self {
        self.pointer = Some(Pointer { client_x, client_y });
        self
    }

    /// Suppress the host's default action (e.g. following a link).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// True once a listener has called [`DomEvent::prevent_default`].
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop the event from reaching further ancestors.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// True once a listener has called [`DomEvent::stop_propagation`].
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// A listener callback.
pub type Handler = Arc<dyn Fn(&DomEvent) + Send + Sync>;
