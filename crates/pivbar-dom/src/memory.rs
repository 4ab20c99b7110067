//! In-memory document.
//!
//! A node arena behind a mutex. Every mutation bumps a generation counter on a
//! `watch` channel, which is what [`Dom::observe`] subscribes to.

use std::{collections::HashMap, mem};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::trace;

use crate::{
    Dom, DomEvent, Element, EventKind, Fragment, Handler, Node, NodeId, Position, Rect, Selector,
    SelectorError, Subscription,
    markup::{escape_attr, escape_text, is_raw_text_tag, is_void_tag},
    selector::ElementRef,
};

/// Stored node payload.
#[derive(Debug, Clone)]
enum Kind {
    /// Element with tag and attributes.
    Element {
        /// Lower-case tag.
        tag: String,
        /// Attributes in insertion order.
        attrs: Vec<(String, String)>,
    },
    /// Text node.
    Text(String),
    /// Opaque trusted markup.
    Raw(String),
}

/// One arena slot.
#[derive(Debug, Clone)]
struct Slot {
    /// Payload.
    kind: Kind,
    /// Parent node.
    parent: Option<NodeId>,
    /// Child nodes, elements and text alike.
    children: Vec<NodeId>,
}

/// Mutable document state.
#[derive(Default)]
struct State {
    /// Node arena; `None` marks a removed node.
    slots: Vec<Option<Slot>>,
    /// Listeners keyed by node.
    listeners: HashMap<NodeId, Vec<(EventKind, Handler)>>,
    /// Layout boxes set by tests.
    rects: HashMap<NodeId, Rect>,
}

impl State {
    /// Live slot for `id`.
    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable live slot for `id`.
    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Allocate a detached node.
    fn alloc(&mut self, kind: Kind, parent: Option<NodeId>) -> NodeId {
        self.slots.push(Some(Slot {
            kind,
            parent,
            children: Vec::new(),
        }));
        NodeId(self.slots.len() - 1)
    }

    /// Recursively build `node` under `parent`; returns the new id.
    fn build(&mut self, node: &Node, parent: NodeId) -> NodeId {
        match node {
            Node::Text(t) => self.alloc(Kind::Text(t.clone()), Some(parent)),
            Node::Raw(r) => self.alloc(Kind::Raw(r.clone()), Some(parent)),
            Node::Element(el) => {
                let id = self.alloc(
                    Kind::Element {
                        tag: el.tag.clone(),
                        attrs: el.attrs.clone(),
                    },
                    Some(parent),
                );
                let kids: Vec<NodeId> = el.children.iter().map(|c| self.build(c, id)).collect();
                if let Some(slot) = self.slot_mut(id) {
                    slot.children = kids;
                }
                id
            }
        }
    }

    /// True for element nodes.
    fn is_element(&self, id: NodeId) -> bool {
        matches!(self.slot(id), Some(Slot { kind: Kind::Element { .. }, .. }))
    }

    /// Element descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .slot(root)
            .map(|s| s.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.slot(id)
                && matches!(slot.kind, Kind::Element { .. })
            {
                out.push(id);
                stack.extend(slot.children.iter().rev().copied());
            }
        }
        out
    }

    /// Matching view of an element.
    fn view(&self, id: NodeId) -> Option<View<'_>> {
        self.is_element(id).then_some(View { state: self, id })
    }

    /// Selector test for one element.
    fn matches(&self, sel: &Selector, id: NodeId) -> bool {
        self.view(id).is_some_and(|v| {
            sel.matches_with(&v, |x| {
                x.state.slot(x.id).and_then(|s| s.parent).and_then(|p| x.state.view(p))
            })
        })
    }

    /// The only child of `id` when that child is a text node.
    fn sole_text_child(&self, id: NodeId) -> Option<NodeId> {
        match self.slot(id)?.children.as_slice() {
            [only] if matches!(self.slot(*only)?.kind, Kind::Text(_)) => Some(*only),
            _ => None,
        }
    }

    /// Drop `id` and its subtree. Its slots stay vacant so stale ids never
    /// alias a newer node.
    fn free(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(n.0).and_then(Option::take) {
                stack.extend(slot.children);
            }
            self.listeners.remove(&n);
            self.rects.remove(&n);
        }
    }

    /// Mutable attribute list of an element.
    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Vec<(String, String)>> {
        match self.slot_mut(id) {
            Some(Slot {
                kind: Kind::Element { attrs, .. },
                ..
            }) => Some(attrs),
            _ => None,
        }
    }

    /// True when `id` is a direct child of a `<style>` or `<script>` element.
    fn in_raw_text_element(&self, id: NodeId) -> bool {
        self.slot(id)
            .and_then(|s| s.parent)
            .and_then(|p| self.view(p))
            .is_some_and(|v| is_raw_text_tag(v.tag()))
    }

    /// Serialize `id` and its subtree.
    fn write(&self, out: &mut String, id: NodeId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        match &slot.kind {
            Kind::Text(t) if self.in_raw_text_element(id) => out.push_str(t),
            Kind::Text(t) => out.push_str(&escape_text(t)),
            Kind::Raw(r) => out.push_str(r),
            Kind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (n, v) in attrs {
                    out.push(' ');
                    out.push_str(n);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                if is_void_tag(tag) {
                    return;
                }
                for c in &slot.children {
                    self.write(out, *c);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Borrowed element used for selector matching.
#[derive(Clone, Copy)]
struct View<'a> {
    /// Document state.
    state: &'a State,
    /// Element id.
    id: NodeId,
}

impl ElementRef for View<'_> {
    fn tag(&self) -> &str {
        match self.state.slot(self.id) {
            Some(Slot {
                kind: Kind::Element { tag, .. },
                ..
            }) => tag,
            _ => "",
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match self.state.slot(self.id) {
            Some(Slot {
                kind: Kind::Element { attrs, .. },
                ..
            }) => attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// An in-memory [`Dom`] with `html`, `head`, and `body` elements.
pub struct MemoryDom {
    /// Document state.
    state: Mutex<State>,
    /// `<html>`.
    root: NodeId,
    /// `<head>`.
    head: NodeId,
    /// `<body>`.
    body: NodeId,
    /// Mutation generation.
    generation: watch::Sender<u64>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document.
    pub fn new() -> Self {
        let mut state = State::default();
        let root = state.alloc(
            Kind::Element {
                tag: "html".into(),
                attrs: Vec::new(),
            },
            None,
        );
        let head = state.build(&Element::new("head").into(), root);
        let body = state.build(&Element::new("body").into(), root);
        if let Some(slot) = state.slot_mut(root) {
            slot.children = vec![head, body];
        }
        let (generation, _) = watch::channel(0);
        Self {
            state: Mutex::new(state),
            root,
            head,
            body,
            generation,
        }
    }

    /// A document whose body holds `fragment`.
    pub fn with_body(fragment: &Fragment) -> Self {
        let dom = Self::new();
        dom.insert(dom.body, Position::Last, fragment);
        dom
    }

    /// Record a mutation.
    fn bump(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    /// Dispatch `event` to its target and, for bubbling kinds, each ancestor.
    ///
    /// Listeners run without the document lock held, so they may freely read
    /// and mutate the document. Returns the event for inspection.
    pub fn dispatch(&self, mut event: DomEvent) -> DomEvent {
        let path: Vec<NodeId> = {
            let state = self.state.lock();
            let mut path = vec![event.target];
            if event.kind.bubbles() {
                let mut cur = state.slot(event.target).and_then(|s| s.parent);
                while let Some(p) = cur {
                    path.push(p);
                    cur = state.slot(p).and_then(|s| s.parent);
                }
            }
            path
        };
        trace!(kind = ?event.kind, target = event.target.0, depth = path.len(), "dispatch");
        for node in path {
            let handlers: Vec<Handler> = {
                let state = self.state.lock();
                state
                    .listeners
                    .get(&node)
                    .map(|ls| {
                        ls.iter()
                            .filter(|(k, _)| *k == event.kind)
                            .map(|(_, h)| h.clone())
                            .collect()
                    })
                    .unwrap_or_default()
            };
            event.current = node;
            for h in handlers {
                h(&event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }

    /// Dispatch a click on `target`.
    pub fn click(&self, target: NodeId) -> DomEvent {
        self.dispatch(DomEvent::new(EventKind::Click, target))
    }

    /// Dispatch a non-bubbling event of `kind` on `target`.
    pub fn fire(&self, kind: EventKind, target: NodeId) -> DomEvent {
        self.dispatch(DomEvent::new(kind, target))
    }

    /// Arena size, counting removed nodes. Ids are never reused, so this
    /// only grows with insertions and structural rewrites.
    pub fn node_count(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Number of live mutation subscriptions.
    pub fn observer_count(&self) -> usize {
        self.generation.receiver_count()
    }

    /// Total registered listeners across live nodes.
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.values().map(Vec::len).sum()
    }

    /// Listeners registered on `node`.
    pub fn listeners_on(&self, node: NodeId) -> usize {
        self.state.lock().listeners.get(&node).map_or(0, Vec::len)
    }

    /// Set the layout box reported by [`Dom::rect`].
    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.state.lock().rects.insert(node, rect);
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.outer_html(self.root)
    }

    /// Serialize `node` including its own tag.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.state.lock().write(&mut out, node);
        out
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let state = self.state.lock();
        let mut out = String::new();
        if let Some(slot) = state.slot(node) {
            for c in &slot.children {
                state.write(&mut out, *c);
            }
        }
        out
    }

    /// Elements under `scope` matching `selector`, stopping at the first if `first`.
    fn select(&self, scope: NodeId, selector: &str, first: bool) -> Result<Vec<NodeId>, SelectorError> {
        let sel = Selector::parse(selector)?;
        let state = self.state.lock();
        let mut out = Vec::new();
        for id in state.descendants(scope) {
            if state.matches(&sel, id) {
                out.push(id);
                if first {
                    break;
                }
            }
        }
        Ok(out)
    }
}

impl Dom for MemoryDom {
    fn head(&self) -> NodeId {
        self.head
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn query(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.select(self.root, selector, true)?.first().copied())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.select(self.root, selector, false)
    }

    fn query_in(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.select(scope, selector, true)?.first().copied())
    }

    fn query_all_in(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.select(scope, selector, false)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let sel = Selector::parse(selector)?;
        let state = self.state.lock();
        let mut cur = Some(node);
        while let Some(id) = cur {
            if state.matches(&sel, id) {
                return Ok(Some(id));
            }
            cur = state.slot(id).and_then(|s| s.parent);
        }
        Ok(None)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.state.lock().slot(node).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.lock().slot(node).and_then(|s| s.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let state = self.state.lock();
        state
            .slot(node)
            .map(|s| {
                s.children
                    .iter()
                    .copied()
                    .filter(|c| state.is_element(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert(&self, parent: NodeId, position: Position, fragment: &Fragment) -> Vec<NodeId> {
        let inserted = {
            let mut state = self.state.lock();
            if state.slot(parent).is_none() {
                return Vec::new();
            }
            let ids: Vec<NodeId> = fragment
                .nodes()
                .iter()
                .map(|n| state.build(n, parent))
                .collect();
            let Some(slot) = state.slot_mut(parent) else {
                return Vec::new();
            };
            let at = match position {
                Position::First => 0,
                Position::Last => slot.children.len(),
                Position::Before(sibling) => slot
                    .children
                    .iter()
                    .position(|c| *c == sibling)
                    .unwrap_or(slot.children.len()),
            };
            slot.children.splice(at..at, ids.iter().copied());
            ids.into_iter()
                .filter(|id| state.is_element(*id))
                .collect::<Vec<_>>()
        };
        self.bump();
        inserted
    }

    fn remove(&self, node: NodeId) {
        {
            let mut state = self.state.lock();
            let Some(parent) = state.slot(node).map(|s| s.parent) else {
                return;
            };
            if let Some(p) = parent.and_then(|p| state.slot_mut(p)) {
                p.children.retain(|c| *c != node);
            }
            state.free(node);
        }
        self.bump();
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        self.state.lock().view(node).map(|v| v.tag().to_string())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.state
            .lock()
            .view(node)
            .and_then(|v| v.attr(name).map(str::to_string))
    }

    fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        {
            let mut state = self.state.lock();
            let Some(attrs) = state.attrs_mut(node) else {
                return;
            };
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
        self.bump();
    }

    fn remove_attr(&self, node: NodeId, name: &str) {
        {
            let mut state = self.state.lock();
            let Some(attrs) = state.attrs_mut(node) else {
                return;
            };
            attrs.retain(|(n, _)| n != name);
        }
        self.bump();
    }

    fn text(&self, node: NodeId) -> String {
        let state = self.state.lock();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(slot) = state.slot(id) else {
                continue;
            };
            match &slot.kind {
                Kind::Text(t) => out.push_str(t),
                Kind::Element { .. } => stack.extend(slot.children.iter().rev().copied()),
                Kind::Raw(_) => {}
            }
        }
        out
    }

    fn set_text(&self, node: NodeId, text: &str) {
        {
            let mut state = self.state.lock();
            if !state.is_element(node) {
                return;
            }
            // A sole text child is rewritten in place so repeated updates do
            // not grow the arena.
            let sole = state.sole_text_child(node);
            if let Some(Slot {
                kind: Kind::Text(t), ..
            }) = sole.and_then(|id| state.slot_mut(id))
            {
                text.clone_into(t);
            } else {
                let old = state
                    .slot_mut(node)
                    .map(|s| mem::take(&mut s.children))
                    .unwrap_or_default();
                for c in old {
                    state.free(c);
                }
                let t = state.alloc(Kind::Text(text.to_string()), Some(node));
                if let Some(slot) = state.slot_mut(node) {
                    slot.children.push(t);
                }
            }
        }
        self.bump();
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.state
            .lock()
            .view(node)
            .is_some_and(|v| v.has_class(class))
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let current = self.attr(node, "class").unwrap_or_default();
        let next = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {}", current.trim(), class)
        };
        self.set_attr(node, "class", &next);
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let current = self.attr(node, "class").unwrap_or_default();
        let next: Vec<&str> = current
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        self.set_attr(node, "class", &next.join(" "));
    }

    fn rect(&self, node: NodeId) -> Rect {
        self.state
            .lock()
            .rects
            .get(&node)
            .copied()
            .unwrap_or_default()
    }

    fn listen(&self, node: NodeId, kind: EventKind, handler: Handler) {
        let mut state = self.state.lock();
        if state.slot(node).is_none() {
            return;
        }
        state.listeners.entry(node).or_default().push((kind, handler));
    }

    fn observe(&self) -> Subscription {
        Subscription::new(self.generation.subscribe())
    }
}
