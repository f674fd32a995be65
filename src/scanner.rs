//! Finding delimiter-bounded math spans in text.

use smallvec::SmallVec;

/// An opening/closing delimiter pair that brackets math source in prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterPair {
    /// The opening delimiter, e.g. `\(`.
    pub open: String,
    /// The closing delimiter, e.g. `\)`.
    pub close: String,
    /// Whether spans are rendered in display mode.
    pub display: bool,
}

impl DelimiterPair {
    /// Construct a pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>, display: bool) -> Self {
        DelimiterPair {
            open: open.into(),
            close: close.into(),
            display,
        }
    }
}

/// The built-in delimiters in precedence order.
///
/// `$$` has to come before `$`, or the first `$` of a display span would
/// open an inline one.
pub fn default_delimiters() -> Vec<DelimiterPair> {
    vec![
        DelimiterPair::new("$$", "$$", true),
        DelimiterPair::new("\\[", "\\]", true),
        DelimiterPair::new("\\(", "\\)", false),
        DelimiterPair::new("$", "$", false),
    ]
}

/// One matched span within a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathSpan<'d, 't> {
    /// The pair that matched.
    pub delimiter: &'d DelimiterPair,
    /// The source between the delimiters, unmodified.
    pub content: &'t str,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
}

impl<'d, 't> MathSpan<'d, 't> {
    /// Whether the span is display math.
    pub fn display(&self) -> bool {
        self.delimiter.display
    }
}

/// Iterate the math spans of `text` in order.
///
/// At each position the delimiters are tried in the order given and the
/// first opening delimiter that matches wins.  Its close is searched at
/// brace depth zero, skipping backslash-escaped bytes.  An opening delimiter
/// without a close is literal text, and scanning resumes one byte after it.
/// Spans never nest or overlap.
///
/// ```
/// # use mathscan::scanner::{scan, default_delimiters};
/// let delimiters = default_delimiters();
/// let spans: Vec<_> = scan(r"Inline \(x+y\) and display \[x^2\]", &delimiters)
///     .map(|s| (s.content, s.display()))
///     .collect();
/// assert_eq!(spans, vec![("x+y", false), ("x^2", true)]);
/// ```
pub fn scan<'d, 't>(text: &'t str, delimiters: &'d [DelimiterPair]) -> Spans<'d, 't> {
    let mut first_bytes = [false; 256];
    for d in delimiters {
        if let Some(&b) = d.open.as_bytes().first() {
            first_bytes[b as usize] = true;
        }
    }
    // An opening delimiter after the last occurrence of its close can't be
    // closed; knowing where that is keeps runs of unclosed openers linear.
    let last_close = delimiters
        .iter()
        .map(|d| match d.close.as_str() {
            "" => None,
            close => text.rfind(close),
        })
        .collect();
    Spans {
        delimiters,
        text,
        pos: 0,
        first_bytes,
        last_close,
    }
}

/// Iterator returned by [`scan`].
#[derive(Debug, Clone)]
pub struct Spans<'d, 't> {
    delimiters: &'d [DelimiterPair],
    text: &'t str,
    pos: usize,
    first_bytes: [bool; 256],
    last_close: SmallVec<[Option<usize>; 4]>,
}

impl<'d, 't> Iterator for Spans<'d, 't> {
    type Item = MathSpan<'d, 't>;

    fn next(&mut self) -> Option<MathSpan<'d, 't>> {
        let text = self.text;
        let bytes = text.as_bytes();

        'candidates: while self.pos < bytes.len() {
            let at = match bytes[self.pos..]
                .iter()
                .position(|&b| self.first_bytes[b as usize])
            {
                Some(offset) => self.pos + offset,
                None => {
                    self.pos = bytes.len();
                    return None;
                }
            };

            for (delimiter, &last_close) in self.delimiters.iter().zip(self.last_close.iter()) {
                if delimiter.open.is_empty()
                    || delimiter.close.is_empty()
                    || !bytes[at..].starts_with(delimiter.open.as_bytes())
                {
                    continue;
                }

                let content_start = at + delimiter.open.len();
                let content_end = match last_close {
                    Some(last) if last >= content_start => {
                        find_end_of_math(bytes, content_start, delimiter.close.as_bytes())
                    }
                    _ => None,
                };
                match content_end {
                    Some(content_end) => {
                        let end = content_end + delimiter.close.len();
                        self.pos = end;
                        return Some(MathSpan {
                            delimiter,
                            content: &text[content_start..content_end],
                            start: at,
                            end,
                        });
                    }
                    None => {
                        self.pos = at + 1;
                        continue 'candidates;
                    }
                }
            }

            self.pos = at + 1;
        }

        None
    }
}

/// Returns the offset of `close` at or after `start`, outside any `{...}`
/// group and not preceded by an escaping backslash.
fn find_end_of_math(text: &[u8], start: usize, close: &[u8]) -> Option<usize> {
    let mut depth: isize = 0;
    let mut i = start;

    while i < text.len() {
        let c = text[i];
        if depth <= 0 && text[i..].starts_with(close) {
            return Some(i);
        } else if c == b'\\' {
            i += 1;
        } else if c == b'{' {
            depth += 1;
        } else if c == b'}' {
            depth -= 1;
        }
        i += 1;
    }

    None
}
