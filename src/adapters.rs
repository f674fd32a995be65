//! Adapter traits for plugins.
//!
//! A math renderer is the one plugin this crate needs; without it a pass does
//! nothing.

use crate::error::RenderError;
use crate::macro_table::MacroTable;

/// How a renderer treats input that is valid but non-standard LaTeX.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Strict {
    /// Accept it silently.
    #[default]
    Ignore,
    /// Accept it and log a warning.
    Warn,
    /// Reject the span.
    Error,
}

/// Per-span settings passed to [`MathRenderer::render`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'r> {
    /// Render as a centered block rather than inline with the text.
    pub display_mode: bool,

    /// Macros to expand.
    pub macros: &'r MacroTable,

    /// When `false`, a renderer may return its own error markup as `Ok`
    /// instead of failing.  When `true` it must return `Err`.
    pub throw_on_error: bool,

    /// CSS color for error markup.
    pub error_color: &'r str,

    /// Allow commands that can produce links, images or arbitrary HTML
    /// attributes.
    pub trust: bool,

    /// How to treat non-standard input.
    pub strict: Strict,
}

/// Implement this adapter to plug a math typesetting engine into the pass.
pub trait MathRenderer {
    /// Renders the TeX source of one span (delimiters already stripped) to
    /// HTML.
    fn render(&self, tex: &str, options: &RenderOptions<'_>) -> Result<String, RenderError>;
}

impl<F> MathRenderer for F
where
    F: Fn(&str, &RenderOptions<'_>) -> Result<String, RenderError>,
{
    fn render(&self, tex: &str, options: &RenderOptions<'_>) -> Result<String, RenderError> {
        self(tex, options)
    }
}
