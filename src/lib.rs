//! A pass that finds TeX math in rendered HTML and hands it to a math
//! renderer.
//!
//! Content written in a rich-text editor arrives as HTML with the math still
//! in its source form, between delimiters: `$$…$$` and `\[…\]` for display
//! math, `\(…\)` and `$…$` for inline math.  This crate parses such a
//! fragment, repairs display spans the editor broke apart with `<br>` tags,
//! and replaces every span with whatever a [`MathRenderer`] makes of it.
//!
//! ```
//! use mathscan::{render_math_in_html, Options, Plugins};
//! use mathscan::plugins::markup::MarkupRenderer;
//!
//! let renderer = MarkupRenderer::new();
//! let mut plugins = Plugins::default();
//! plugins.render.math_renderer = Some(&renderer);
//!
//! assert_eq!(
//!     render_math_in_html("<p>Let $x \\in \\RR$.</p>", &Options::default(), &plugins),
//!     "<p>Let <span data-math-style=\"inline\">x \\in \\mathbb{R}</span>.</p>"
//! );
//! ```
//!
//! Working on a tree directly gives access to the pass's report:
//!
//! ```
//! use mathscan::{format_html, parse_fragment, Arena, AutoRender, Options, Plugins};
//! use mathscan::plugins::markup::MarkupRenderer;
//!
//! let arena = Arena::new();
//! let root = parse_fragment(&arena, "<article><p>\\[a^2\\] and \\(b\\)</p></article>");
//!
//! let renderer = MarkupRenderer::new();
//! let mut plugins = Plugins::default();
//! plugins.render.math_renderer = Some(&renderer);
//! let options = Options::default();
//!
//! let report = AutoRender::new(&options, &plugins).run(&arena, root).unwrap();
//! assert_eq!(report.rendered, 2);
//!
//! let mut html = String::new();
//! format_html(root, &mut html).unwrap();
//! assert!(html.starts_with("<article><p><span data-math-style=\"display\">a^2</span>"));
//! ```

#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]
#![allow(
    unknown_lints,
    clippy::doc_markdown,
    clippy::bool_to_int_with_if,
    clippy::too_many_arguments
)]

pub mod adapters;
pub mod arena_tree;
mod entity;
pub mod error;
pub mod html;
pub mod macro_table;
pub mod nodes;
pub mod normalize;
pub mod options;
pub mod parser;
pub mod plugins;
pub mod render;
pub mod scanner;
pub mod select;

pub use crate::adapters::{MathRenderer, RenderOptions, Strict};
pub use crate::error::{PassError, RenderError, SelectorError};
pub use crate::html::{format_html, format_inner_html};
pub use crate::macro_table::MacroTable;
pub use crate::nodes::{AstNode, Node, NodeValue};
pub use crate::normalize::{normalize_breaks, normalize_fragment};
pub use crate::options::{Normalize, Options, Plugins, Render, RenderPlugins, Scan};
pub use crate::parser::parse_fragment;
pub use crate::render::{render_math, AutoRender, RenderReport};
pub use crate::scanner::{scan, DelimiterPair, MathSpan};
pub use crate::select::select_root;

/// Convenience type alias for arena types used by this crate.
pub type Arena<'a> = typed_arena::Arena<AstNode<'a>>;

/// Parses `html`, runs the full pass over it and formats the result.
///
/// Problems are logged and never returned; with no renderer plugin the
/// output is the input's parse/format round trip.
pub fn render_math_in_html(html: &str, options: &Options, plugins: &Plugins) -> String {
    let arena = Arena::new();
    let root = parse_fragment(&arena, html);
    AutoRender::new(options, plugins).run(&arena, root);

    let mut out = String::with_capacity(html.len());
    // Writing to a String can't fail.
    let _ = format_html(root, &mut out);
    out
}
