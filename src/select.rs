//! Picking the element that holds a page's content.
//!
//! Only the simple selectors needed to name a content root are understood: a
//! tag name, `#id`, `.class`, `*`, and compounds of those such as
//! `div.entry-content`.  Combinators, attribute selectors and
//! pseudo-classes are rejected.

use std::str::FromStr;

use crate::error::SelectorError;
use crate::nodes::{Node, NodeElement, NodeValue};

/// A compound selector.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The tag name, lowercased; `None` matches any element.
    pub tag: Option<String>,
    /// Required `id`.
    pub id: Option<String>,
    /// Classes the element must all have.
    pub classes: Vec<String>,
}

impl Selector {
    /// Whether `element` matches.
    pub fn matches(&self, element: &NodeElement) -> bool {
        if let Some(ref tag) = self.tag {
            if *tag != element.name {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    /// ```
    /// # use mathscan::select::Selector;
    /// let s: Selector = "div.entry-content".parse().unwrap();
    /// assert_eq!(s.tag.as_deref(), Some("div"));
    /// assert_eq!(s.classes, vec!["entry-content"]);
    ///
    /// assert!("main > p".parse::<Selector>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| SelectorError {
            selector: s.to_string(),
            reason,
        };

        let source = s.trim();
        if source.is_empty() {
            return Err(err("empty selector"));
        }

        let mut selector = Selector::default();
        let bytes = source.as_bytes();
        let mut ix = 0;

        if bytes[0] == b'*' {
            ix = 1;
        } else if is_name_byte(bytes[0]) {
            let len = name_len(&bytes[ix..]);
            selector.tag = Some(source[..len].to_ascii_lowercase());
            ix = len;
        }

        while ix < bytes.len() {
            let sigil = bytes[ix];
            if sigil != b'.' && sigil != b'#' {
                return Err(err("only tag names, classes and ids are supported"));
            }
            ix += 1;
            let len = name_len(&bytes[ix..]);
            if len == 0 {
                return Err(err("expected a name"));
            }
            let name = source[ix..ix + len].to_string();
            ix += len;

            if sigil == b'.' {
                selector.classes.push(name);
            } else if selector.id.is_some() {
                return Err(err("more than one id"));
            } else {
                selector.id = Some(name);
            }
        }

        Ok(selector)
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn name_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| is_name_byte(b)).count()
}

/// The first element at or under `root`, in document order, that matches
/// `selector`.
pub fn query_selector<'a>(root: Node<'a>, selector: &Selector) -> Option<Node<'a>> {
    root.descendants().find(|n| match *n.data.borrow() {
        NodeValue::Element(ref el) => selector.matches(el),
        _ => false,
    })
}

/// Tries each selector in turn and returns the first element found, or
/// `root` itself if none match.  Selectors that don't parse are logged and
/// skipped.
pub fn select_root<'a, S: AsRef<str>>(root: Node<'a>, selectors: &[S]) -> Node<'a> {
    for source in selectors {
        let selector = match source.as_ref().parse::<Selector>() {
            Ok(selector) => selector,
            Err(e) => {
                log::warn!("{}", e);
                continue;
            }
        };
        if let Some(found) = query_selector(root, &selector) {
            log::debug!("using {:?} as the content root", source.as_ref());
            return found;
        }
    }
    root
}
