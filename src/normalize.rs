//! Repairing display math that a rich-text editor split with `<br>` tags.
//!
//! Editors turn every newline typed inside a paragraph into a `<br>`, so
//!
//! ```text
//! $$
//! E=mc^2
//! $$
//! ```
//!
//! reaches the page as `$$<br>E=mc^2<br>$$`.  The text of the span then sits
//! in three separate text nodes and no delimiter scan can match it.  Putting
//! the newlines back makes the span one text node again.  Only display
//! delimiters are repaired: inline spans are rarely split, and treating a
//! lone `$` in prose as structure would do more harm than good.

use std::borrow::Cow;

use crate::html::inner_html;
use crate::nodes::Node;
use crate::options::Options;
use crate::parser::parse_fragment_into;
use crate::Arena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repair {
    /// Only spans whose content begins and ends with a break.
    Framed,
    /// Every span.
    All,
}

/// The repair passes, in order.  A later pass never re-breaks what an
/// earlier one fixed.
const PASSES: [(&str, &str, Repair); 4] = [
    ("$$", "$$", Repair::Framed),
    ("\\[", "\\]", Repair::Framed),
    ("$$", "$$", Repair::All),
    ("\\[", "\\]", Repair::All),
];

/// Replaces the `<br>` markers inside `$$…$$` and `\[…\]` spans of one
/// block of serialized HTML with newlines.
///
/// Everything outside a span, and everything inside other than the break
/// markers, is left byte for byte.  An opening delimiter pairs with the first
/// closing delimiter after it; one that is never closed is left alone.  The
/// input is returned borrowed when nothing changed.
///
/// ```
/// # use mathscan::normalize::normalize_breaks;
/// assert_eq!(
///     normalize_breaks("The formula $$<br>E=mc^2<br>$$ is famous."),
///     "The formula $$\nE=mc^2\n$$ is famous."
/// );
/// assert_eq!(normalize_breaks("a<br>b $x$"), "a<br>b $x$");
/// ```
pub fn normalize_breaks(block: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(block);
    for &(open, close, mode) in PASSES.iter() {
        if let Some(repaired) = repair(&text, open, close, mode) {
            text = Cow::Owned(repaired);
        }
    }
    text
}

/// Returns `None` when no span needed repairing.
///
/// Pairing sees serialized markup, not text: a delimiter inside an attribute
/// value pairs with one in the prose after it.
fn repair(block: &str, open: &str, close: &str, mode: Repair) -> Option<String> {
    let opener = jetscii::Substring::new(open);
    let closer = jetscii::Substring::new(close);

    let mut out = String::new();
    let mut copied = 0;
    let mut ix = 0;

    while let Some(offset) = opener.find(&block[ix..]) {
        let content_start = ix + offset + open.len();
        let content_end = match closer.find(&block[content_start..]) {
            Some(offset) => content_start + offset,
            None => {
                ix += offset + 1;
                continue;
            }
        };

        let content = &block[content_start..content_end];
        let wanted = match mode {
            Repair::All => find_break(content, 0).is_some(),
            Repair::Framed => is_framed(content),
        };
        if wanted {
            out.push_str(&block[copied..content_start]);
            replace_breaks(content, &mut out);
            copied = content_end;
        }

        ix = content_end + close.len();
    }

    if copied == 0 {
        return None;
    }
    out.push_str(&block[copied..]);
    Some(out)
}

/// Whether `content`, ignoring surrounding whitespace, starts with one break
/// marker and ends with another.
fn is_framed(content: &str) -> bool {
    let trimmed = content.trim();
    let first = match find_break(trimmed, 0) {
        Some((0, len)) => len,
        _ => return false,
    };

    let mut ix = first;
    while let Some((at, len)) = find_break(trimmed, ix) {
        if at + len == trimmed.len() {
            return true;
        }
        ix = at + len;
    }
    false
}

/// Appends `content` to `out` with every break marker replaced by `\n`.
fn replace_breaks(content: &str, out: &mut String) {
    let mut ix = 0;
    while let Some((at, len)) = find_break(content, ix) {
        out.push_str(&content[ix..at]);
        out.push('\n');
        ix = at + len;
    }
    out.push_str(&content[ix..]);
}

/// Finds the next `<br>`, `<br/>` or `<br />` (any case) at or after
/// `from`, returning its offset and length.
fn find_break(s: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let matcher = jetscii::bytes!(b'<');
    let mut ix = from;

    while ix < bytes.len() {
        let at = ix + matcher.find(&bytes[ix..])?;
        if let Some(len) = match_break(&bytes[at..]) {
            return Some((at, len));
        }
        ix = at + 1;
    }
    None
}

fn match_break(s: &[u8]) -> Option<usize> {
    if s.len() < 4 || !s[1..3].eq_ignore_ascii_case(b"br") {
        return None;
    }
    let mut ix = 3;
    while ix < s.len() && s[ix].is_ascii_whitespace() {
        ix += 1;
    }
    if s.get(ix) == Some(&b'/') {
        ix += 1;
    }
    match s.get(ix) {
        Some(b'>') => Some(ix + 1),
        _ => None,
    }
}

/// Applies [`normalize_breaks`] to the contents of every container element
/// (`normalize.containers`, `<p>` by default) under `root`, re-parsing the
/// containers whose markup changed.  Returns how many were rewritten.
///
/// Each container is a separate block: a span can't be repaired across two
/// paragraphs.
pub fn normalize_fragment<'a>(arena: &'a Arena<'a>, root: Node<'a>, options: &Options) -> usize {
    let is_container = |node: Node<'a>| {
        node.data
            .borrow()
            .element()
            .map_or(false, |el| {
                options
                    .normalize
                    .containers
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&el.name))
            })
    };

    let containers: Vec<Node<'a>> = root
        .descendants()
        .filter(|&n| is_container(n) && !has_container_ancestor(n, root, &is_container))
        .collect();

    let mut rewritten = 0;
    for container in containers {
        let html = inner_html(container);
        if let Cow::Owned(repaired) = normalize_breaks(&html) {
            while let Some(child) = container.first_child() {
                child.detach();
            }
            parse_fragment_into(arena, container, &repaired);
            rewritten += 1;
        }
    }

    if rewritten > 0 {
        log::debug!("repaired line breaks in {} block(s)", rewritten);
    }
    rewritten
}

/// Whether a container sits between `node` (exclusive) and `root`
/// (inclusive).
fn has_container_ancestor<'a, F>(node: Node<'a>, root: Node<'a>, is_container: &F) -> bool
where
    F: Fn(Node<'a>) -> bool,
{
    if node.same_node(root) {
        return false;
    }
    for ancestor in node.ancestors().skip(1) {
        if is_container(ancestor) {
            return true;
        }
        if ancestor.same_node(root) {
            break;
        }
    }
    false
}
