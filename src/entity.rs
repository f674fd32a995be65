use std::borrow::Cow;
use std::char;
use std::cmp::min;

include!(concat!(env!("OUT_DIR"), "/entitydata.rs"));

pub const ENTITY_MIN_LENGTH: usize = 2;

fn isdigit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

fn isxdigit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}

/// Decodes a character reference whose leading `&` has already been
/// consumed.  Returns the replacement text and the number of bytes of `text`
/// consumed, including the terminating `;`.
pub fn unescape(text: &[u8]) -> Option<(Cow<'static, str>, usize)> {
    if text.len() >= 3 && text[0] == b'#' {
        let mut codepoint: u32 = 0;
        let mut i;

        let num_digits = if isdigit(text[1]) {
            i = 1;
            while i < text.len() && isdigit(text[i]) {
                codepoint = (codepoint * 10) + (text[i] as u32 - '0' as u32);
                codepoint = min(codepoint, 0x11_0000);
                i += 1;
            }
            i - 1
        } else if text[1] == b'x' || text[1] == b'X' {
            i = 2;
            while i < text.len() && isxdigit(text[i]) {
                codepoint = (codepoint * 16) + ((text[i] as u32 | 32) % 39 - 9);
                codepoint = min(codepoint, 0x11_0000);
                i += 1;
            }
            i - 2
        } else {
            return None;
        };

        if (1..=8).contains(&num_digits) && i < text.len() && text[i] == b';' {
            if codepoint == 0 || (0xD800..=0xDFFF).contains(&codepoint) || codepoint >= 0x11_0000
            {
                codepoint = 0xFFFD;
            }
            let c = char::from_u32(codepoint).unwrap_or('\u{FFFD}');
            return Some((Cow::Owned(c.to_string()), i + 1));
        }

        return None;
    }

    let size = min(text.len(), entitydata::MAX_NAME_LENGTH + 1);
    for i in ENTITY_MIN_LENGTH..size {
        if !text[i - 1].is_ascii_alphanumeric() {
            return None;
        }

        if text[i] == b';' {
            let name = std::str::from_utf8(&text[..i]).ok()?;
            return lookup(name).map(|e| (Cow::Borrowed(e), i + 1));
        }
    }

    None
}

fn lookup(name: &str) -> Option<&'static str> {
    entitydata::NAMED_REFERENCES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|ix| entitydata::NAMED_REFERENCES[ix].1)
}

/// Decodes every character reference in `src`.  References that don't
/// resolve are kept as written.
pub fn unescape_html(src: &str) -> Cow<'_, str> {
    let bytes = src.as_bytes();
    let size = bytes.len();
    let mut i = 0;
    let mut v = String::new();

    while i < size {
        let org = i;
        while i < size && bytes[i] != b'&' {
            i += 1;
        }

        if i == size && org == 0 {
            return Cow::Borrowed(src);
        }

        if i > org {
            v.push_str(&src[org..i]);
        }

        if i >= size {
            break;
        }

        i += 1;
        match unescape(&bytes[i..]) {
            Some((chs, consumed)) => {
                v.push_str(&chs);
                i += consumed;
            }
            None => v.push('&'),
        }
    }

    Cow::Owned(v)
}
