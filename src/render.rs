//! Handing math spans to the renderer and splicing in its output.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashSet;

use crate::adapters::{MathRenderer, RenderOptions};
use crate::arena_tree::Node as ArenaNode;
use crate::error::{PassError, RenderError};
use crate::html::{escape, escape_attribute};
use crate::nodes::{Node, NodeValue};
use crate::normalize::normalize_fragment;
use crate::options::{Options, Plugins, Scan};
use crate::scanner::{scan, MathSpan};
use crate::select::select_root;
use crate::Arena;

/// What a pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    /// Spans found.
    pub spans: usize,
    /// Spans the renderer accepted.
    pub rendered: usize,
    /// Spans the renderer rejected.
    pub failed: usize,
}

/// Finds the math in every scannable text node under `root` and replaces
/// it with the renderer's output.
///
/// Text nodes are visited in document order.  Each span is rendered on its
/// own: a failing span becomes an error marker (or stays as source, with
/// `render.display_errors` off) and the pass carries on.  Rendered output is
/// inserted as [`NodeValue::Raw`] and is not scanned again.
///
/// A panic in the renderer stops the pass with [`PassError::Unexpected`].
/// Spans replaced before it stay replaced.
///
/// Running a second pass over an already rendered tree is not supported: the
/// output of a renderer may well contain text that looks like delimiters.
pub fn render_math<'a>(
    arena: &'a Arena<'a>,
    root: Node<'a>,
    options: &Options,
    plugins: &Plugins,
) -> Result<RenderReport, PassError> {
    let renderer = match plugins.render.math_renderer {
        Some(renderer) => renderer,
        None => {
            log::error!("math renderer not available; skipping math rendering");
            return Err(PassError::MissingRenderer);
        }
    };

    let mut dispatcher = Dispatcher::new(arena, options, renderer);
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| dispatcher.run(root))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(panic_message(payload.as_ref())),
    };

    match outcome {
        Ok(()) => {
            let report = dispatcher.report;
            log::debug!(
                "math rendering completed: {} span(s), {} rendered, {} failed",
                report.spans,
                report.rendered,
                report.failed
            );
            Ok(report)
        }
        Err(message) => {
            log::error!(
                "error rendering math after {} span(s): {}",
                dispatcher.report.spans,
                message
            );
            Err(PassError::Unexpected(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The text nodes under `root` the scanner reads, in document order.
///
/// Subtrees of `scan.ignored_tags` and of elements with one of
/// `scan.ignored_classes` are skipped, unless the subtree is `root` itself.
/// [`NodeValue::Raw`] nodes are never returned.
pub fn scannable_text_nodes<'a>(root: Node<'a>, scan: &Scan) -> Vec<Node<'a>> {
    let ignored_tags: FxHashSet<String> = scan
        .ignored_tags
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    let is_ignored = |node: Node<'a>| match *node.data.borrow() {
        NodeValue::Element(ref el) => {
            ignored_tags.contains(&el.name)
                || scan.ignored_classes.iter().any(|c| el.has_class(c))
        }
        _ => false,
    };

    let mut found = vec![];
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if matches!(*node.data.borrow(), NodeValue::Text(..)) {
            found.push(node);
            continue;
        }
        if !node.same_node(root) && is_ignored(node) {
            continue;
        }
        let mut child = node.last_child();
        while let Some(c) = child {
            stack.push(c);
            child = c.previous_sibling();
        }
    }

    found
}

struct Dispatcher<'a, 'o> {
    arena: &'a Arena<'a>,
    options: &'o Options,
    renderer: &'o dyn MathRenderer,
    report: RenderReport,
}

impl<'a, 'o> Dispatcher<'a, 'o> {
    fn new(arena: &'a Arena<'a>, options: &'o Options, renderer: &'o dyn MathRenderer) -> Self {
        Dispatcher {
            arena,
            options,
            renderer,
            report: RenderReport::default(),
        }
    }

    /// Stops at the first renderer panic, with its message.
    fn run(&mut self, root: Node<'a>) -> Result<(), String> {
        // Collected up front: the nodes inserted while rendering must not be
        // visited.
        for text in scannable_text_nodes(root, &self.options.scan) {
            self.render_text(text)?;
        }
        Ok(())
    }

    fn render_text(&mut self, node: Node<'a>) -> Result<(), String> {
        let text = match node.data.borrow().text() {
            Some(text) => text.clone(),
            None => return Ok(()),
        };

        let mut pending = String::new();
        let mut last = 0;
        let mut any = false;
        let mut stopped = None;

        for span in scan(&text, &self.options.scan.delimiters) {
            any = true;
            self.report.spans += 1;
            pending.push_str(&text[last..span.start]);

            match self.render_span(&span) {
                Ok(Some(html)) => {
                    if !pending.is_empty() {
                        let before = std::mem::take(&mut pending);
                        node.insert_before(self.alloc(NodeValue::Text(before)));
                    }
                    node.insert_before(self.alloc(NodeValue::Raw(html)));
                    last = span.end;
                }
                Ok(None) => {
                    pending.push_str(&text[span.start..span.end]);
                    last = span.end;
                }
                Err(message) => {
                    last = span.start;
                    stopped = Some(message);
                    break;
                }
            }
        }

        if !any {
            return Ok(());
        }

        // The node keeps whatever follows the last replaced span, so the
        // tree is consistent even when the pass stops here.
        pending.push_str(&text[last..]);
        if pending.is_empty() {
            node.detach();
        } else {
            *node.data.borrow_mut() = NodeValue::Text(pending);
        }

        match stopped {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }

    /// Returns the markup to put in place of the span, or `None` to leave
    /// its source as text.  A panicking renderer is an `Err`.
    fn render_span(&mut self, span: &MathSpan<'_, '_>) -> Result<Option<String>, String> {
        let render = &self.options.render;
        let opts = RenderOptions {
            display_mode: span.display(),
            macros: &render.macros,
            throw_on_error: !render.display_errors,
            error_color: &render.error_color,
            trust: render.trust,
            strict: render.strict,
        };

        let renderer = self.renderer;
        let result = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(span.content, &opts)))
            .map_err(|payload| panic_message(payload.as_ref()))?;

        match result {
            Ok(html) => {
                self.report.rendered += 1;
                Ok(Some(html))
            }
            Err(err) => {
                self.report.failed += 1;
                log::warn!(
                    "failed to render {} math {:?}: {}",
                    if span.display() { "display" } else { "inline" },
                    span.content,
                    err
                );
                if render.display_errors {
                    Ok(Some(error_marker(span.content, &err, &render.error_color)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn alloc(&self, value: NodeValue) -> Node<'a> {
        self.arena.alloc(ArenaNode::new(RefCell::new(value)))
    }
}

/// Writes the marker shown in place of a span that failed to render: the
/// span's source in the error color, with the error as a tooltip.
///
/// A `color` that isn't a plain CSS color value is replaced with `#cc0000`.
pub fn write_error_marker(
    output: &mut dyn Write,
    tex: &str,
    err: &RenderError,
    color: &str,
) -> fmt::Result {
    output.write_str("<span class=\"katex-error\" title=\"")?;
    escape_attribute(output, &err.to_string())?;
    output.write_str("\" style=\"color:")?;
    escape_attribute(output, sanitize_color(color))?;
    output.write_str("\">")?;
    escape(output, tex)?;
    output.write_str("</span>")
}

/// [`write_error_marker`] into a new `String`.
pub fn error_marker(tex: &str, err: &RenderError, color: &str) -> String {
    let mut s = String::new();
    // Writing to a String can't fail.
    let _ = write_error_marker(&mut s, tex, err, color);
    s
}

fn sanitize_color(color: &str) -> &str {
    let plain = !color.is_empty()
        && color
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"#(),.% ".contains(&b));
    if plain {
        color
    } else {
        "#cc0000"
    }
}

/// The entry point a host calls once its document is complete.
///
/// Picks the content root, repairs broken display math, then renders.  It
/// runs at most once per value and never fails: every problem is logged and
/// the document is left as far as the pass got.
///
/// ```
/// # use mathscan::{Arena, AutoRender, Options, Plugins, parse_fragment};
/// # use mathscan::plugins::markup::MarkupRenderer;
/// let arena = Arena::new();
/// let root = parse_fragment(&arena, "<main><p>$x$</p></main>");
///
/// let renderer = MarkupRenderer::new();
/// let mut plugins = Plugins::default();
/// plugins.render.math_renderer = Some(&renderer);
/// let options = Options::default();
///
/// let auto = AutoRender::new(&options, &plugins);
/// assert_eq!(auto.run(&arena, root).map(|r| r.rendered), Some(1));
/// assert_eq!(auto.run(&arena, root), None);
/// ```
#[derive(Debug)]
pub struct AutoRender<'o, 'p> {
    options: &'o Options,
    plugins: &'o Plugins<'p>,
    ran: Cell<bool>,
}

impl<'o, 'p> AutoRender<'o, 'p> {
    /// Prepare a pass.
    pub fn new(options: &'o Options, plugins: &'o Plugins<'p>) -> Self {
        AutoRender {
            options,
            plugins,
            ran: Cell::new(false),
        }
    }

    /// Whether [`AutoRender::run`] has been called.
    pub fn has_run(&self) -> bool {
        self.ran.get()
    }

    /// Runs the pass over the document rooted at `document`.  Returns `None`
    /// if it was skipped or failed; see the log for why.
    pub fn run<'a>(&self, arena: &'a Arena<'a>, document: Node<'a>) -> Option<RenderReport> {
        if self.ran.replace(true) {
            log::debug!("math rendering already ran; skipping");
            return None;
        }

        if self.plugins.render.math_renderer.is_none() {
            log::error!("math renderer not available; skipping math rendering");
            return None;
        }

        let root = select_root(document, &self.options.scan.root_selectors);
        if self.options.normalize.enabled {
            normalize_fragment(arena, root, self.options);
        }

        render_math(arena, root, self.options, self.plugins).ok()
    }
}
