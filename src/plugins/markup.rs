//! A renderer that marks math up for client-side typesetting.
//!
//! It doesn't typeset anything.  Each span becomes an element carrying its
//! (macro-expanded) source, in the form Markdown renderers emit for math so
//! that a stylesheet or a later typesetting step can pick it up:
//!
//! ```html
//! <span data-math-style="inline">x^2</span>
//! ```
//!
//! Before that the source is checked the way a typesetter would reject it:
//! unbalanced braces, untrusted commands and, under `strict`, non-ASCII
//! letters.

use crate::adapters::{MathRenderer, RenderOptions, Strict};
use crate::error::RenderError;
use crate::html::escape;
use crate::macro_table::MacroTable;
use crate::render::error_marker;

/// Expansions allowed per span before giving up on a recursive macro.
pub const MAX_EXPANSIONS: usize = 1000;

/// Commands that can emit links, images or arbitrary attributes.
static TRUST_COMMANDS: phf::Set<&'static str> = phf::phf_set! {
    "\\href", "\\url", "\\includegraphics", "\\htmlClass", "\\htmlId",
    "\\htmlStyle", "\\htmlData",
};

#[derive(Debug, Default, Clone, Copy)]
/// The built-in [`MathRenderer`].
///
/// ```
/// # use mathscan::{MacroTable, MathRenderer, RenderOptions, Strict};
/// # use mathscan::plugins::markup::MarkupRenderer;
/// let macros = MacroTable::default();
/// let options = RenderOptions {
///     display_mode: false,
///     macros: &macros,
///     throw_on_error: true,
///     error_color: "#cc0000",
///     trust: true,
///     strict: Strict::Ignore,
/// };
/// assert_eq!(
///     MarkupRenderer::new().render("x \\in \\RR", &options).unwrap(),
///     "<span data-math-style=\"inline\">x \\in \\mathbb{R}</span>"
/// );
/// ```
pub struct MarkupRenderer;

impl MarkupRenderer {
    /// Construct a new `MarkupRenderer`.
    pub fn new() -> Self {
        MarkupRenderer
    }

    fn check(&self, tex: &str, options: &RenderOptions<'_>) -> Result<String, RenderError> {
        let expanded = expand_macros(tex, options.macros)?;
        check_trust(&expanded, options.trust)?;
        check_braces(&expanded)?;
        check_strict(&expanded, options.strict)?;
        Ok(expanded)
    }
}

impl MathRenderer for MarkupRenderer {
    fn render(&self, tex: &str, options: &RenderOptions<'_>) -> Result<String, RenderError> {
        let expanded = match self.check(tex, options) {
            Ok(expanded) => expanded,
            Err(err) if options.throw_on_error => return Err(err),
            Err(err) => return Ok(error_marker(tex, &err, options.error_color)),
        };

        let mut out = String::with_capacity(expanded.len() + 40);
        out.push_str("<span data-math-style=\"");
        out.push_str(if options.display_mode {
            "display"
        } else {
            "inline"
        });
        out.push_str("\">");
        // Writing to a String can't fail.
        let _ = escape(&mut out, &expanded);
        out.push_str("</span>");
        Ok(out)
    }
}

/// Returns the control word (`\name`) starting at `ix`, if any.
fn control_word(s: &str, ix: usize) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.get(ix) != Some(&b'\\') {
        return None;
    }
    let len = bytes[ix + 1..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if len == 0 {
        None
    } else {
        Some(&s[ix..ix + 1 + len])
    }
}

/// Iterates the control words of `s` with their offsets, skipping control
/// symbols like `\\` and `\{`.
fn control_words(s: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = s.as_bytes();
    let mut ix = 0;
    std::iter::from_fn(move || {
        while ix < bytes.len() {
            if bytes[ix] != b'\\' {
                ix += 1;
                continue;
            }
            match control_word(s, ix) {
                Some(word) => {
                    let at = ix;
                    ix += word.len();
                    return Some((at, word));
                }
                None => ix += 2,
            }
        }
        None
    })
}

fn expand_macros(tex: &str, macros: &MacroTable) -> Result<String, RenderError> {
    let mut s = tex.to_string();
    if macros.is_empty() {
        return Ok(s);
    }

    let mut expansions = 0;
    let mut ix = 0;

    while ix < s.len() {
        if s.as_bytes()[ix] != b'\\' {
            ix += 1;
            continue;
        }
        let word = match control_word(&s, ix) {
            Some(word) => word,
            None => {
                ix += 2;
                continue;
            }
        };
        match macros.get(word) {
            Some(expansion) => {
                expansions += 1;
                if expansions > MAX_EXPANSIONS {
                    return Err(RenderError::MacroExpansion(MAX_EXPANSIONS));
                }
                let end = ix + word.len();
                s.replace_range(ix..end, expansion);
                // The expansion is scanned again, so macros can use macros.
            }
            None => ix += word.len(),
        }
    }

    Ok(s)
}

fn check_trust(tex: &str, trust: bool) -> Result<(), RenderError> {
    if trust {
        return Ok(());
    }
    match control_words(tex).find(|(_, w)| TRUST_COMMANDS.contains(*w)) {
        Some((_, word)) => Err(RenderError::Untrusted(word.to_string())),
        None => Ok(()),
    }
}

fn check_braces(tex: &str) -> Result<(), RenderError> {
    let bytes = tex.as_bytes();
    let mut open = vec![];
    let mut ix = 0;

    while ix < bytes.len() {
        match bytes[ix] {
            b'\\' => ix += 1,
            b'{' => open.push(ix),
            b'}' if open.pop().is_none() => {
                return Err(RenderError::Parse {
                    message: "Extra }".to_string(),
                    position: Some(ix),
                });
            }
            _ => {}
        }
        ix += 1;
    }

    match open.pop() {
        Some(at) => Err(RenderError::Parse {
            message: "Expected '}', got 'EOF' at end of input".to_string(),
            position: Some(at),
        }),
        None => Ok(()),
    }
}

fn check_strict(tex: &str, strict: Strict) -> Result<(), RenderError> {
    if strict == Strict::Ignore {
        return Ok(());
    }
    let c = match tex.chars().find(|c| !c.is_ascii() && c.is_alphabetic()) {
        Some(c) => c,
        None => return Ok(()),
    };

    let message = format!("unicode text character {:?} used in math mode", c);
    match strict {
        Strict::Error => Err(RenderError::Strict(message)),
        _ => {
            log::warn!("{}", message);
            Ok(())
        }
    }
}
