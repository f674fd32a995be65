//! The HTML fragment tree.

use crate::arena_tree::Node as ArenaNode;
use smallvec::SmallVec;
use std::cell::RefCell;

/// The core tree node enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    /// The root of every parsed fragment.  Never serialized itself.
    Fragment,

    /// An element such as `<p class="x">`.  Contains other nodes unless it is
    /// a void element.
    Element(NodeElement),

    /// Character data, with character references already decoded.
    ///
    /// This is what the delimiter scanner reads.
    Text(String),

    /// The body of a `<!-- comment -->`.
    Comment(String),

    /// The body of a markup declaration, e.g. `DOCTYPE html` for `<!DOCTYPE html>`.
    Doctype(String),

    /// Markup produced by a math renderer.  Written out verbatim and never
    /// scanned again, so rendered output can't be matched a second time.
    Raw(String),
}

/// The details of an element node.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeElement {
    /// The tag name, ASCII-lowercased.
    pub name: String,

    /// Attributes in source order.
    pub attrs: SmallVec<[Attribute; 4]>,
}

/// A single `name="value"` attribute; values are stored decoded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name, ASCII-lowercased.
    pub name: String,

    /// The decoded attribute value.  Empty for bare attributes.
    pub value: String,
}

impl NodeElement {
    /// An element with no attributes.
    pub fn new(name: &str) -> Self {
        NodeElement {
            name: name.to_ascii_lowercase(),
            attrs: SmallVec::new(),
        }
    }

    /// The value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Iterates the whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or("")
            .split(|c: char| c.is_ascii_whitespace())
            .filter(|c| !c.is_empty())
    }

    /// Whether the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

impl NodeValue {
    /// Indicates whether this node is an element with the given tag name.
    pub fn is_element(&self, name: &str) -> bool {
        matches!(self, NodeValue::Element(e) if e.name.eq_ignore_ascii_case(name))
    }

    /// Return a reference to the element details if this node is an element.
    pub fn element(&self) -> Option<&NodeElement> {
        match self {
            NodeValue::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Return a reference to the text if this node is a `Text` node.
    pub fn text(&self) -> Option<&String> {
        match self {
            NodeValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Return a mutable reference to the text if this node is a `Text` node.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            NodeValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<NodeElement> for NodeValue {
    fn from(e: NodeElement) -> Self {
        NodeValue::Element(e)
    }
}

/// A node in the fragment tree, allocated in an arena.
///
/// It is bound by the lifetime `'a`, which corresponds to the `Arena` nodes
/// are allocated in.  `RefCell` lets the tree be mutated through the shared
/// references the arena hands out.
pub type AstNode<'a> = ArenaNode<'a, RefCell<NodeValue>>;

/// A reference to a node in an arena.
pub type Node<'a> = &'a AstNode<'a>;

/// Collects the decoded text of `node` and its descendants, like the DOM's
/// `textContent`.
pub fn text_content<'a>(node: Node<'a>) -> String {
    let mut out = String::new();
    for n in node.descendants() {
        if let NodeValue::Text(ref t) = *n.data.borrow() {
            out.push_str(t);
        }
    }
    out
}
