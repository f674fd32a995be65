//! HTML serialization of fragment trees.

use std::fmt::{self, Write};

use crate::arena_tree::NodeEdge;
use crate::nodes::{Attribute, Node, NodeValue};
use crate::parser::{is_raw_text_element, is_void_element};

const fn byte_set(bytes: &[u8]) -> [bool; 256] {
    let mut a = [false; 256];
    let mut i = 0;
    while i < bytes.len() {
        a[bytes[i] as usize] = true;
        i += 1;
    }
    a
}

// U+00A0 is escaped as well; it's matched on its UTF-8 lead byte and
// checked in full below.
const TEXT_UNSAFE: [bool; 256] = byte_set(b"&<>\xc2");
const ATTRIBUTE_UNSAFE: [bool; 256] = byte_set(b"&\"\xc2");

fn escape_with(output: &mut dyn Write, buffer: &str, unsafe_bytes: &[bool; 256]) -> fmt::Result {
    let bytes = buffer.as_bytes();
    let mut offset = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if !unsafe_bytes[byte as usize] {
            continue;
        }
        let esc = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            0xc2 if bytes.get(i + 1) == Some(&0xa0) => "&nbsp;",
            _ => continue,
        };
        output.write_str(&buffer[offset..i])?;
        output.write_str(esc)?;
        offset = if byte == 0xc2 { i + 2 } else { i + 1 };
    }

    output.write_str(&buffer[offset..])
}

/// Writes `buffer` as HTML character data, escaping `&`, `<`, `>` and
/// non-breaking spaces.
pub fn escape(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    escape_with(output, buffer, &TEXT_UNSAFE)
}

/// Writes `buffer` for use inside a double-quoted attribute value.
pub fn escape_attribute(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    escape_with(output, buffer, &ATTRIBUTE_UNSAFE)
}

/// Writes an opening tag with the given attributes, e.g. `<span class="x">`.
pub fn write_opening_tag<'i, I>(output: &mut dyn Write, tag: &str, attributes: I) -> fmt::Result
where
    I: IntoIterator<Item = &'i Attribute>,
{
    write!(output, "<{}", tag)?;
    for attr in attributes {
        write!(output, " {}=\"", attr.name)?;
        escape_attribute(output, &attr.value)?;
        output.write_str("\"")?;
    }
    output.write_str(">")
}

/// Formats a fragment tree as HTML.
///
/// An element root is written with its own tags; a `Fragment` root writes
/// only its children.
pub fn format_html<'a>(root: Node<'a>, output: &mut dyn Write) -> fmt::Result {
    HtmlFormatter::new(output).format(root)
}

/// Formats only the children of `node`, like the DOM's `innerHTML`.
pub fn format_inner_html<'a>(node: Node<'a>, output: &mut dyn Write) -> fmt::Result {
    let mut f = HtmlFormatter::new(output);
    for child in node.children() {
        f.format(child)?;
    }
    Ok(())
}

/// Convenience wrapper returning `format_inner_html` as a `String`.
pub fn inner_html<'a>(node: Node<'a>) -> String {
    let mut s = String::new();
    // Writing to a String can't fail.
    let _ = format_inner_html(node, &mut s);
    s
}

struct HtmlFormatter<'o> {
    output: &'o mut dyn Write,
}

impl<'o> HtmlFormatter<'o> {
    fn new(output: &'o mut dyn Write) -> Self {
        HtmlFormatter { output }
    }

    fn format<'a>(&mut self, node: Node<'a>) -> fmt::Result {
        for edge in node.traverse() {
            match edge {
                NodeEdge::Start(n) => self.enter(n)?,
                NodeEdge::End(n) => self.exit(n)?,
            }
        }
        Ok(())
    }

    fn enter<'a>(&mut self, node: Node<'a>) -> fmt::Result {
        match *node.data.borrow() {
            NodeValue::Fragment => Ok(()),
            NodeValue::Element(ref el) => write_opening_tag(self.output, &el.name, &el.attrs),
            NodeValue::Text(ref text) => {
                let in_raw_text = node
                    .parent()
                    .map_or(false, |p| match *p.data.borrow() {
                        NodeValue::Element(ref el) => is_raw_text_element(&el.name),
                        _ => false,
                    });
                if in_raw_text {
                    self.output.write_str(text)
                } else {
                    escape(self.output, text)
                }
            }
            NodeValue::Comment(ref c) => write!(self.output, "<!--{}-->", c),
            NodeValue::Doctype(ref d) => write!(self.output, "<!{}>", d),
            NodeValue::Raw(ref r) => self.output.write_str(r),
        }
    }

    fn exit<'a>(&mut self, node: Node<'a>) -> fmt::Result {
        match *node.data.borrow() {
            NodeValue::Element(ref el) if !is_void_element(&el.name) => {
                write!(self.output, "</{}>", el.name)
            }
            _ => Ok(()),
        }
    }
}
