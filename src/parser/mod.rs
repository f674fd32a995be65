//! A tolerant HTML fragment parser.
//!
//! This is not a conforming HTML5 tree builder.  It recovers from the
//! mistakes editors and templates actually produce (unclosed paragraphs,
//! stray end tags, unterminated markup) and keeps everything else as written,
//! so that a parse/format round trip of well-formed markup is lossless apart
//! from attribute quoting and void-element syntax.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::arena_tree::Node as ArenaNode;
use crate::entity;
use crate::nodes::{Attribute, Node, NodeElement, NodeValue};
use crate::Arena;

static VOID_ELEMENTS: phf::Set<&'static str> = phf::phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
};

/// Contents are kept verbatim: no tags, no character references.
static RAW_TEXT_ELEMENTS: phf::Set<&'static str> = phf::phf_set! {
    "script", "style", "xmp", "iframe", "noembed", "noframes",
};

/// Contents are text with character references, but no tags.
static ESCAPABLE_RAW_TEXT_ELEMENTS: phf::Set<&'static str> = phf::phf_set! {
    "textarea", "title",
};

/// Start tags that implicitly close an open `<p>`.
static CLOSES_PARAGRAPH: phf::Set<&'static str> = phf::phf_set! {
    "address", "article", "aside", "blockquote", "details", "div", "dl",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "main", "menu", "nav", "ol",
    "p", "pre", "section", "summary", "table", "ul",
};

/// Elements that stop the search for an open `<p>` or `<li>`.
static SCOPE_BOUNDARIES: phf::Set<&'static str> = phf::phf_set! {
    "applet", "button", "caption", "html", "marquee", "object", "table",
    "td", "template", "th",
};

/// Whether `name` is a void element, which has no contents and no end tag.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(name)
}

/// Whether the text of a `name` element is written without escaping.
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(name)
}

/// Parse an HTML fragment into a tree rooted at a `NodeValue::Fragment`.
///
/// ```
/// # use mathscan::{Arena, parse_fragment, html::format_html};
/// let arena = Arena::new();
/// let root = parse_fragment(&arena, "<p>a &amp; b<br/>c");
/// let mut out = String::new();
/// format_html(root, &mut out).unwrap();
/// assert_eq!(out, "<p>a &amp; b<br>c</p>");
/// ```
pub fn parse_fragment<'a>(arena: &'a Arena<'a>, html: &str) -> Node<'a> {
    let root = arena.alloc(ArenaNode::new(RefCell::new(NodeValue::Fragment)));
    Parser::new(arena, root, html).parse();
    root
}

/// Parse an HTML fragment and append the resulting nodes to `parent`, like
/// assigning the DOM's `innerHTML` on an empty element.
pub fn parse_fragment_into<'a>(arena: &'a Arena<'a>, parent: Node<'a>, html: &str) {
    Parser::new(arena, parent, html).parse();
}

struct Parser<'a, 'i> {
    arena: &'a Arena<'a>,
    // The bottom entry is the node being parsed into and is never popped.
    open: Vec<Node<'a>>,
    input: &'i str,
    pos: usize,
}

enum Markup<'i> {
    Start {
        name: String,
        attrs: SmallVec<[Attribute; 4]>,
    },
    End(String),
    Comment(&'i str),
    Declaration(&'i str),
}

impl<'a, 'i> Parser<'a, 'i> {
    fn new(arena: &'a Arena<'a>, root: Node<'a>, input: &'i str) -> Self {
        Parser {
            arena,
            open: vec![root],
            input,
            pos: 0,
        }
    }

    fn bytes(&self) -> &'i [u8] {
        self.input.as_bytes()
    }

    fn current(&self) -> Node<'a> {
        self.open[self.open.len() - 1]
    }

    fn parse(mut self) {
        let input = self.input;
        let end = input.len();
        let matcher = jetscii::bytes!(b'<');

        while self.pos < end {
            let lt = match matcher.find(&input.as_bytes()[self.pos..]) {
                Some(offset) => self.pos + offset,
                None => end,
            };
            if lt > self.pos {
                let text = &input[self.pos..lt];
                self.add_text(&entity::unescape_html(text));
                self.pos = lt;
            }
            if lt < end {
                self.handle_markup();
            }
        }
    }

    fn handle_markup(&mut self) {
        let start = self.pos;
        match self.scan_markup() {
            Some(Markup::Start { name, attrs }) => self.start_tag(name, attrs),
            Some(Markup::End(name)) => self.end_tag(&name),
            Some(Markup::Comment(body)) => {
                self.add_node(NodeValue::Comment(body.to_string()));
            }
            Some(Markup::Declaration(body)) => {
                self.add_node(NodeValue::Doctype(body.to_string()));
            }
            None => {
                // Not markup after all; the '<' is literal text.
                self.pos = start + 1;
                self.add_text("<");
            }
        }
    }

    fn scan_markup(&mut self) -> Option<Markup<'i>> {
        let input = self.input;
        let rest = &input[self.pos..];

        if let Some(body) = rest.strip_prefix("<!--") {
            let (body, consumed) = match body.find("-->") {
                Some(ix) => (&body[..ix], 4 + ix + 3),
                None => (body, rest.len()),
            };
            self.pos += consumed;
            return Some(Markup::Comment(body));
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let close = rest.find('>')?;
            self.pos += close + 1;
            return Some(if rest.as_bytes()[1] == b'?' {
                Markup::Comment(&rest[1..close])
            } else {
                Markup::Declaration(&rest[2..close])
            });
        }

        if let Some(after) = rest.strip_prefix("</") {
            if !after.bytes().next()?.is_ascii_alphabetic() {
                return None;
            }
            let close = after.find('>')?;
            let name = tag_name(&after[..close]);
            self.pos += 2 + close + 1;
            return Some(Markup::End(name));
        }

        if !rest.as_bytes().get(1)?.is_ascii_alphabetic() {
            return None;
        }

        let mut ix = self.pos + 1;
        let name_len = input.as_bytes()[ix..]
            .iter()
            .position(|&b| is_tag_name_end(b))
            .unwrap_or(input.len() - ix);
        let name = input[ix..ix + name_len].to_ascii_lowercase();
        ix += name_len;

        let (attrs, after) = self.scan_attributes(ix)?;
        self.pos = after;
        Some(Markup::Start { name, attrs })
    }

    /// Reads attributes up to and including the closing `>` of a start tag.
    /// Returns `None` if the tag never closes.
    fn scan_attributes(&self, mut ix: usize) -> Option<(SmallVec<[Attribute; 4]>, usize)> {
        let bytes = self.bytes();
        let mut attrs: SmallVec<[Attribute; 4]> = SmallVec::new();

        loop {
            while ix < bytes.len() && bytes[ix].is_ascii_whitespace() {
                ix += 1;
            }
            match bytes.get(ix)? {
                b'>' => return Some((attrs, ix + 1)),
                b'/' => {
                    ix += 1;
                    continue;
                }
                _ => {}
            }

            let name_start = ix;
            ix += 1;
            while ix < bytes.len() && !is_attribute_name_end(bytes[ix]) {
                ix += 1;
            }
            let name = self.input[name_start..ix].to_ascii_lowercase();

            while ix < bytes.len() && bytes[ix].is_ascii_whitespace() {
                ix += 1;
            }

            let mut value = String::new();
            if bytes.get(ix) == Some(&b'=') {
                ix += 1;
                while ix < bytes.len() && bytes[ix].is_ascii_whitespace() {
                    ix += 1;
                }
                let raw = match *bytes.get(ix)? {
                    quote @ (b'"' | b'\'') => {
                        let len = bytes[ix + 1..].iter().position(|&b| b == quote)?;
                        let raw = &self.input[ix + 1..ix + 1 + len];
                        ix += len + 2;
                        raw
                    }
                    _ => {
                        let start = ix;
                        while ix < bytes.len()
                            && !bytes[ix].is_ascii_whitespace()
                            && bytes[ix] != b'>'
                        {
                            ix += 1;
                        }
                        &self.input[start..ix]
                    }
                };
                value = entity::unescape_html(raw).into_owned();
            }

            if !attrs.iter().any(|a| a.name == name) {
                attrs.push(Attribute { name, value });
            }
        }
    }

    fn start_tag(&mut self, name: String, attrs: SmallVec<[Attribute; 4]>) {
        if CLOSES_PARAGRAPH.contains(name.as_str()) {
            self.close_in_scope("p");
        }
        if name == "li" {
            self.close_in_scope("li");
        }

        let node = self.add_node(NodeValue::Element(NodeElement {
            name: name.clone(),
            attrs,
        }));

        if is_void_element(&name) {
            return;
        }

        if RAW_TEXT_ELEMENTS.contains(name.as_str()) {
            let text = self.take_raw_text(&name);
            if !text.is_empty() {
                node.append(self.alloc(NodeValue::Text(text.to_string())));
            }
            return;
        }

        if ESCAPABLE_RAW_TEXT_ELEMENTS.contains(name.as_str()) {
            let text = self.take_raw_text(&name);
            if !text.is_empty() {
                let decoded = entity::unescape_html(text).into_owned();
                node.append(self.alloc(NodeValue::Text(decoded)));
            }
            return;
        }

        self.open.push(node);
    }

    fn end_tag(&mut self, name: &str) {
        if let Some(ix) = self.open[1..].iter().rposition(|n| n.data.borrow().is_element(name)) {
            self.open.truncate(ix + 1);
        }
    }

    /// Pops an open `name` element, unless a scope boundary is in the way.
    fn close_in_scope(&mut self, name: &str) {
        for ix in (1..self.open.len()).rev() {
            let node = self.open[ix];
            let value = node.data.borrow();
            let el = match value.element() {
                Some(el) => el,
                None => continue,
            };
            if el.name == name {
                self.open.truncate(ix);
                return;
            }
            if SCOPE_BOUNDARIES.contains(el.name.as_str())
                || (name == "li" && (el.name == "ul" || el.name == "ol"))
            {
                return;
            }
        }
    }

    /// Consumes everything up to the matching end tag of a raw text element
    /// (or the end of input) and returns it undecoded.
    fn take_raw_text(&mut self, name: &str) -> &'i str {
        let input = self.input;
        let bytes = self.bytes();
        let start = self.pos;
        let mut ix = start;

        while let Some(offset) = input[ix..].find("</") {
            let tag_start = ix + offset;
            let name_start = tag_start + 2;
            let name_end = name_start + name.len();
            if name_end <= bytes.len()
                && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
                && bytes.get(name_end).map_or(true, |&b| is_tag_name_end(b))
            {
                self.pos = match input[name_end..].find('>') {
                    Some(close) => name_end + close + 1,
                    None => input.len(),
                };
                return &input[start..tag_start];
            }
            ix = name_start;
        }

        self.pos = input.len();
        &input[start..]
    }

    fn alloc(&self, value: NodeValue) -> Node<'a> {
        self.arena.alloc(ArenaNode::new(RefCell::new(value)))
    }

    fn add_node(&mut self, value: NodeValue) -> Node<'a> {
        let node = self.alloc(value);
        self.current().append(node);
        node
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.current().last_child() {
            if let Some(existing) = last.data.borrow_mut().text_mut() {
                existing.push_str(text);
                return;
            }
        }
        self.add_node(NodeValue::Text(text.to_string()));
    }
}

fn is_tag_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

fn is_attribute_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>' || b == b'='
}

fn tag_name(s: &str) -> String {
    let len = s.bytes().position(is_tag_name_end).unwrap_or(s.len());
    s[..len].to_ascii_lowercase()
}
