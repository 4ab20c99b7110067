//! A small CSS selector subset.
//!
//! Supported: type selectors, `#id`, `.class`, `[attr]`, `[attr="value"]`,
//! compounds of those, and the descendant (whitespace) and child (`>`)
//! combinators. That covers every selector the overlay uses against the host
//! page and its own markup.

use std::{fmt, str::FromStr};

use crate::SelectorError;

/// Read access to an element, as needed for matching.
pub trait ElementRef {
    /// Lower-case tag name.
    fn tag(&self) -> &str;
    /// Attribute lookup.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Class membership.
    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|x| x == class))
    }
}

/// Relationship between a compound and the one to its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Any ancestor.
    Descendant,
    /// The direct parent.
    Child,
}

/// An attribute test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrTest {
    /// Attribute name.
    pub name: String,
    /// Required exact value, or `None` for a presence test.
    pub value: Option<String>,
}

/// A compound selector: every test must hold for the same element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Tag name, if constrained.
    pub tag: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Attribute tests.
    pub attrs: Vec<AttrTest>,
}

impl Compound {
    /// True when `el` satisfies every test.
    pub fn matches(&self, el: &impl ElementRef) -> bool {
        if let Some(tag) = &self.tag
            && !el.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.attr("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|t| match (&t.value, el.attr(&t.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        })
    }

    /// True when no test is present.
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

/// A parsed selector: compounds left to right, each joined to the previous one
/// by a combinator (the first combinator is unused).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Source text.
    source: String,
    /// `(combinator to previous, compound)` pairs.
    parts: Vec<(Combinator, Compound)>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Parser::new(source).parse()
    }

    /// The rightmost compound: the one the matched element itself must satisfy.
    pub fn subject(&self) -> &Compound {
        // parse() guarantees at least one part
        &self.parts[self.parts.len() - 1].1
    }

    /// All parts, left to right.
    pub fn parts(&self) -> &[(Combinator, Compound)] {
        &self.parts
    }

    /// Original selector text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match against an element given a way to walk to its parent.
    ///
    /// `parent` returns the parent element of its argument, or `None` at the root.
    pub fn matches_with<E, F>(&self, el: &E, parent: F) -> bool
    where
        E: ElementRef + Clone,
        F: Fn(&E) -> Option<E>,
    {
        let n = self.parts.len();
        if !self.parts[n - 1].1.matches(el) {
            return false;
        }
        self.match_left(n - 1, el.clone(), &parent)
    }

    /// Match parts `..idx` leftwards, starting from the element that matched part `idx`.
    fn match_left<E, F>(&self, idx: usize, el: E, parent: &F) -> bool
    where
        E: ElementRef + Clone,
        F: Fn(&E) -> Option<E>,
    {
        if idx == 0 {
            return true;
        }
        let (comb, _) = &self.parts[idx];
        let target = &self.parts[idx - 1].1;
        match comb {
            Combinator::Child => match parent(&el) {
                Some(p) if target.matches(&p) => self.match_left(idx - 1, p, parent),
                _ => false,
            },
            Combinator::Descendant => {
                let mut cur = parent(&el);
                while let Some(p) = cur {
                    if target.matches(&p) && self.match_left(idx - 1, p.clone(), parent) {
                        return true;
                    }
                    cur = parent(&p);
                }
                false
            }
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Single-pass selector parser.
struct Parser<'a> {
    /// Source text.
    src: &'a str,
    /// Characters with byte offsets.
    chars: Vec<(usize, char)>,
    /// Index into `chars`.
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Start parsing `src`.
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    /// Current character.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    /// Error for the character at the cursor.
    fn unexpected(&self) -> SelectorError {
        let (offset, ch) = self.chars.get(self.pos).copied().unwrap_or((self.src.len(), ' '));
        SelectorError::Unexpected {
            selector: self.src.to_string(),
            offset,
            ch,
        }
    }

    /// Skip whitespace; true if any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Read an identifier, possibly empty.
    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Parse the whole selector.
    fn parse(mut self) -> Result<Selector, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }
        let mut parts = Vec::new();
        let mut comb = Combinator::Descendant;
        loop {
            let compound = self.compound()?;
            if compound.is_empty() {
                return Err(self.unexpected());
            }
            parts.push((comb, compound));

            let had_ws = self.skip_ws();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek().is_none() {
                        return Err(SelectorError::Dangling {
                            selector: self.src.to_string(),
                        });
                    }
                    comb = Combinator::Child;
                }
                Some(_) if had_ws => comb = Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(Selector {
            source: self.src.trim().to_string(),
            parts,
        })
    }

    /// Parse one compound selector.
    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut out = Compound::default();
        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '*') {
            if self.peek() == Some('*') {
                self.pos += 1;
            } else {
                out.tag = Some(self.ident().to_ascii_lowercase());
            }
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.ident();
                    if id.is_empty() {
                        return Err(self.unexpected());
                    }
                    out.id = Some(id);
                }
                Some('.') => {
                    self.pos += 1;
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.unexpected());
                    }
                    out.classes.push(class);
                }
                Some('[') => {
                    self.pos += 1;
                    out.attrs.push(self.attr_test()?);
                }
                _ => break,
            }
        }
        Ok(out)
    }

    /// Parse an attribute test after the opening `[`.
    fn attr_test(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_ws();
        let name = self.ident();
        if name.is_empty() {
            return Err(self.unexpected());
        }
        self.skip_ws();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.pos += 1;
                self.skip_ws();
                Some(self.attr_value()?)
            }
            None => {
                return Err(SelectorError::Unterminated {
                    selector: self.src.to_string(),
                });
            }
            Some(_) => return Err(self.unexpected()),
        };
        self.skip_ws();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttrTest { name, value })
            }
            None => Err(SelectorError::Unterminated {
                selector: self.src.to_string(),
            }),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Parse a quoted or bare attribute value.
    fn attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut out = String::new();
                loop {
                    match self.peek() {
                        Some(c) if c == q => {
                            self.pos += 1;
                            return Ok(out);
                        }
                        Some(c) => {
                            out.push(c);
                            self.pos += 1;
                        }
                        None => {
                            return Err(SelectorError::Unterminated {
                                selector: self.src.to_string(),
                            });
                        }
                    }
                }
            }
            _ => {
                let v = self.ident();
                if v.is_empty() {
                    Err(self.unexpected())
                } else {
                    Ok(v)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Fake {
        tag: &'static str,
        attrs: Vec<(&'static str, &'static str)>,
        parent: Option<Box<Fake>>,
    }

    impl ElementRef for Fake {
        fn tag(&self) -> &str {
            self.tag
        }
        fn attr(&self, name: &str) -> Option<&str> {
            self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }
    }

    fn el(tag: &'static str, attrs: Vec<(&'static str, &'static str)>, parent: Option<Fake>) -> Fake {
        Fake {
            tag,
            attrs,
            parent: parent.map(Box::new),
        }
    }

    fn matches(sel: &str, e: &Fake) -> bool {
        Selector::parse(sel)
            .unwrap()
            .matches_with(e, |x| x.parent.as_deref().cloned())
    }

    #[test]
    fn parses_compounds_and_combinators() {
        let s = Selector::parse(r#"#shell-splitter-container > .k-pane a.piv-item[data-mode="hide-all"]"#)
            .unwrap();
        assert_eq!(s.parts().len(), 3);
        assert_eq!(s.parts()[1].0, Combinator::Child);
        assert_eq!(s.parts()[2].0, Combinator::Descendant);
        let subj = s.subject();
        assert_eq!(subj.tag.as_deref(), Some("a"));
        assert_eq!(subj.classes, ["piv-item"]);
        assert_eq!(subj.attrs[0].value.as_deref(), Some("hide-all"));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(Selector::parse(".a >"), Err(SelectorError::Dangling { .. })));
        assert!(matches!(Selector::parse("[data-x"), Err(SelectorError::Unterminated { .. })));
        assert!(matches!(Selector::parse(".a,.b"), Err(SelectorError::Unexpected { .. })));
        assert!(matches!(Selector::parse("#"), Err(SelectorError::Unexpected { .. })));
    }

    #[test]
    fn child_versus_descendant() {
        let root = el("div", vec![("id", "root")], None);
        let mid = el("section", vec![("class", "mid")], Some(root));
        let leaf = el("a", vec![("class", "item x"), ("data-hash", "#/a")], Some(mid));

        assert!(matches("#root a", &leaf));
        assert!(!matches("#root > a", &leaf));
        assert!(matches("#root > .mid > a.item", &leaf));
        assert!(matches("a[data-hash]", &leaf));
        assert!(matches("a[data-hash='#/a']", &leaf));
        assert!(!matches("a[data-hash=other]", &leaf));
        assert!(!matches(".item.y", &leaf));
        assert!(matches("*.x", &leaf));
    }
}
