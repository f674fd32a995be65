//! Configuration for the normalizer, the scanner and the renderer.

#[cfg(feature = "bon")]
use bon::Builder;
use std::fmt::{self, Debug, Formatter};

use crate::adapters::{MathRenderer, Strict};
use crate::macro_table::MacroTable;
use crate::scanner::{default_delimiters, DelimiterPair};

#[derive(Default, Debug, Clone)]
/// Umbrella options struct.
pub struct Options {
    /// Configure the line-break repair step.
    pub normalize: Normalize,

    /// Configure which text is scanned for math.
    pub scan: Scan,

    /// Configure what the renderer is asked to do.
    pub render: Render,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options for the line-break repair step.
pub struct Normalize {
    /// Repair `$$…$$` and `\[…\]` spans split by `<br>` before scanning.
    ///
    /// ```rust
    /// # use mathscan::{render_math_in_html, Options, Plugins, RenderError, RenderOptions};
    /// let renderer = |tex: &str, _: &RenderOptions| -> Result<String, RenderError> {
    ///     Ok(format!("[{}]", tex.trim()))
    /// };
    /// let mut plugins = Plugins::default();
    /// plugins.render.math_renderer = Some(&renderer);
    ///
    /// let mut options = Options::default();
    /// assert_eq!(render_math_in_html("<p>$$<br>x<br>$$</p>", &options, &plugins),
    ///            "<p>[x]</p>");
    ///
    /// options.normalize.enabled = false;
    /// assert_eq!(render_math_in_html("<p>$$<br>x<br>$$</p>", &options, &plugins),
    ///            "<p>$$<br>x<br>$$</p>");
    /// ```
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub enabled: bool,

    /// Tag names of the elements whose contents are repaired, each as one
    /// block.  Defaults to `p`.
    #[cfg_attr(feature = "bon", builder(default = default_containers()))]
    pub containers: Vec<String>,
}

impl Default for Normalize {
    fn default() -> Self {
        Normalize {
            enabled: true,
            containers: default_containers(),
        }
    }
}

fn default_containers() -> Vec<String> {
    vec!["p".to_string()]
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options for finding math.
pub struct Scan {
    /// Delimiter pairs in precedence order.  Defaults to `$$…$$`, `\[…\]`,
    /// `\(…\)`, `$…$`.
    #[cfg_attr(feature = "bon", builder(default = default_delimiters()))]
    pub delimiters: Vec<DelimiterPair>,

    /// Elements whose text is never scanned.
    #[cfg_attr(feature = "bon", builder(default = default_ignored_tags()))]
    pub ignored_tags: Vec<String>,

    /// Elements with any of these classes are never scanned.
    #[cfg_attr(feature = "bon", builder(default))]
    pub ignored_classes: Vec<String>,

    /// Selectors tried in order to find the content root; the first that
    /// matches an element wins.  When none match, the whole fragment is
    /// used.
    ///
    /// ```rust
    /// # use mathscan::Options;
    /// let options = Options::default();
    /// assert_eq!(options.scan.root_selectors,
    ///            vec![".entry-content", "article", "main", "body"]);
    /// ```
    #[cfg_attr(feature = "bon", builder(default = default_root_selectors()))]
    pub root_selectors: Vec<String>,
}

impl Default for Scan {
    fn default() -> Self {
        Scan {
            delimiters: default_delimiters(),
            ignored_tags: default_ignored_tags(),
            ignored_classes: vec![],
            root_selectors: default_root_selectors(),
        }
    }
}

fn default_ignored_tags() -> Vec<String> {
    ["script", "noscript", "style", "textarea", "pre", "code", "option"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_root_selectors() -> Vec<String> {
    [".entry-content", "article", "main", "body"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options passed through to the renderer, and what to do when it fails.
pub struct Render {
    /// Macros available to every span.  Defaults to `\RR`, `\NN`, `\ZZ`,
    /// `\QQ` and `\CC` for the blackboard-bold number sets.
    #[cfg_attr(feature = "bon", builder(default))]
    pub macros: MacroTable,

    /// Replace a span that fails to render with an error marker showing its
    /// source.  When off, the span's source is left as it was.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub display_errors: bool,

    /// CSS color of error markers.
    #[cfg_attr(feature = "bon", builder(default = default_error_color()))]
    pub error_color: String,

    /// Allow commands like `\href` and `\includegraphics`.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub trust: bool,

    /// How to treat non-standard LaTeX.
    #[cfg_attr(feature = "bon", builder(default))]
    pub strict: Strict,
}

impl Default for Render {
    fn default() -> Self {
        Render {
            macros: MacroTable::default(),
            display_errors: true,
            error_color: default_error_color(),
            trust: true,
            strict: Strict::Ignore,
        }
    }
}

fn default_error_color() -> String {
    "#cc0000".to_string()
}

#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Umbrella plugins struct.
pub struct Plugins<'p> {
    /// Configure render-time plugins.
    #[cfg_attr(feature = "bon", builder(default))]
    pub render: RenderPlugins<'p>,
}

#[derive(Default, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Plugins for rendering.
pub struct RenderPlugins<'p> {
    /// The math typesetting engine.  A pass without one is skipped.
    pub math_renderer: Option<&'p dyn MathRenderer>,
}

impl Debug for RenderPlugins<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPlugins")
            .field(
                "math_renderer",
                &self.math_renderer.map(|_| "impl MathRenderer"),
            )
            .finish()
    }
}
