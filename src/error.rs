//! Error types.

use thiserror::Error;

/// An error a [`MathRenderer`](crate::adapters::MathRenderer) reports for a
/// single span.
///
/// Span errors never abort a pass; the span is replaced with an error marker
/// or left as written, depending on `render.display_errors`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The TeX source could not be parsed.
    #[error("ParseError: {message}")]
    Parse {
        /// What went wrong.
        message: String,
        /// Byte offset into the span's content, when known.
        position: Option<usize>,
    },

    /// A command that needs `render.trust` was used without it.
    #[error("command {0} requires trust")]
    Untrusted(String),

    /// Rejected by `render.strict`.
    #[error("strict mode: {0}")]
    Strict(String),

    /// Macro expansion didn't terminate within the given number of steps.
    #[error("too many macro expansions (limit {0})")]
    MacroExpansion(usize),

    /// Anything else the renderer wants to report.
    #[error("{0}")]
    Other(String),
}

/// Why a rendering pass didn't run to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    /// No math renderer was supplied, so the pass was skipped entirely.
    #[error("no math renderer is available")]
    MissingRenderer,

    /// The pass stopped early.  Spans replaced before the failure stay
    /// replaced.
    #[error("math rendering stopped unexpectedly: {0}")]
    Unexpected(String),
}

/// A root selector that couldn't be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    /// The selector as given.
    pub selector: String,
    /// What's wrong with it.
    pub reason: &'static str,
}
