//! Typed markup fragments.
//!
//! Renderers build [`Element`] trees instead of concatenating strings; the
//! text form is produced by [`Fragment::to_html`]. Output is a pure function of
//! the tree, so identical trees always serialize identically.

use std::fmt::Write as _;

/// Elements that never carry children or a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// A markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Text content; escaped on output.
    Text(String),
    /// Trusted markup emitted verbatim (e.g. SVG payloads).
    Raw(String),
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-case tag name.
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set (or replace) an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Set an attribute only when `value` is present.
    pub fn attr_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    /// Set the `id` attribute.
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Append one or more space-separated classes.
    pub fn class(self, classes: &str) -> Self {
        let merged = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, classes.trim()),
            _ => classes.trim().to_string(),
        };
        self.attr("class", merged)
    }

    /// Append a child node.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append several children.
    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Append a text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// Append trusted raw markup.
    pub fn raw(self, markup: impl Into<String>) -> Self {
        self.child(Node::Raw(markup.into()))
    }

    /// Look up an attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// True when the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|x| x == class))
    }

    /// True for tags that have no closing tag.
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    /// Serialize this element.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, &Node::Element(self.clone()));
        out
    }
}

/// An ordered list of sibling nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment(Vec<Node>);

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.0.push(node.into());
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    /// Consume into the top-level nodes.
    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    /// True when the fragment has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize all nodes in order.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.0 {
            write_node(&mut out, node);
        }
        out
    }
}

impl From<Element> for Fragment {
    fn from(el: Element) -> Self {
        Self(vec![Node::Element(el)])
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Self(vec![node])
    }
}

impl<N: Into<Node>> FromIterator<N> for Fragment {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<N: Into<Node>> Extend<N> for Fragment {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// True for elements whose text content is emitted unescaped.
pub(crate) fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "style" | "script")
}

/// True for tags that have no closing tag.
pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Serialize one node into `out`.
pub(crate) fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(t) => out.push_str(&escape_text(t)),
        Node::Raw(r) => out.push_str(r),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                let _ignored = write!(out, " {}=\"{}\"", name, escape_attr(value));
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            for child in &el.children {
                match child {
                    Node::Text(t) if is_raw_text_tag(&el.tag) => out.push_str(t),
                    _ => write_node(out, child),
                }
            }
            let _ignored = write!(out, "</{}>", el.tag);
        }
    }
}

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
