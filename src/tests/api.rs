use crate::adapters::Strict;
use crate::plugins::markup::MarkupRenderer;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn exercise_full_api() {
    let arena = Arena::new();
    let default_options = Options::default();
    let default_plugins = Plugins::default();

    // Use every member of the exposed API without any defaults.
    // Not looking for specific outputs, just want to know if the API changes shape.

    let node: &AstNode = parse_fragment(&arena, "<p>$x$</p>");
    crate::parser::parse_fragment_into(&arena, node, "<p>\\(y\\)</p>");

    let mut buffer = String::new();
    let _: std::fmt::Result = format_html(node, &mut buffer);
    let _: std::fmt::Result = format_inner_html(node, &mut buffer);
    let _: String = html::inner_html(node);
    let _: std::fmt::Result = html::escape(&mut buffer, "<");
    let _: std::fmt::Result = html::escape_attribute(&mut buffer, "\"");

    let _: std::borrow::Cow<str> = normalize_breaks("$$<br>$$");
    let _: usize = normalize_fragment(&arena, node, &default_options);

    let delimiters: Vec<DelimiterPair> = crate::scanner::default_delimiters();
    for span in scan("$x$", &delimiters) {
        let _: &DelimiterPair = span.delimiter;
        let _: &str = span.content;
        let _: usize = span.start;
        let _: usize = span.end;
        let _: bool = span.display();
    }

    let _: Node = select_root(node, &default_options.scan.root_selectors);
    let _: Result<crate::select::Selector, SelectorError> = "div.a#b".parse();

    let _: Result<RenderReport, PassError> =
        render_math(&arena, node, &default_options, &default_plugins);
    let auto = AutoRender::new(&default_options, &default_plugins);
    let _: Option<RenderReport> = auto.run(&arena, node);
    let _: bool = auto.has_run();
    let _: String = render_math_in_html("", &default_options, &default_plugins);
    let _: String = crate::render::error_marker("x", &RenderError::Other("e".into()), "red");
    let _: Vec<Node> = crate::render::scannable_text_nodes(node, &default_options.scan);

    let mut macros = MacroTable::new();
    macros.insert("\\a", "b");
    let _: Option<&str> = macros.get("\\a");
    let _: Option<String> = macros.remove("\\a");
    let _: bool = macros.is_empty();
    let _: usize = macros.len();
    for (_name, _expansion) in macros.iter() {}

    let options = Options {
        normalize: Normalize {
            enabled: true,
            containers: vec!["p".to_string()],
        },
        scan: Scan {
            delimiters,
            ignored_tags: vec!["pre".to_string()],
            ignored_classes: vec!["no-math".to_string()],
            root_selectors: vec!["main".to_string()],
        },
        render: Render {
            macros,
            display_errors: true,
            error_color: "#cc0000".to_string(),
            trust: false,
            strict: Strict::Warn,
        },
    };

    let renderer = MarkupRenderer::new();
    let plugins = Plugins {
        render: RenderPlugins {
            math_renderer: Some(&renderer),
        },
    };
    let _: String = render_math_in_html("<p>$x$</p>", &options, &plugins);

    let render_options = RenderOptions {
        display_mode: false,
        macros: &options.render.macros,
        throw_on_error: false,
        error_color: &options.render.error_color,
        trust: options.render.trust,
        strict: options.render.strict,
    };
    let _: Result<String, RenderError> = renderer.render("x", &render_options);

    for e in [
        RenderError::Parse {
            message: "m".into(),
            position: Some(0),
        },
        RenderError::Untrusted("\\href".into()),
        RenderError::Strict("s".into()),
        RenderError::MacroExpansion(1000),
        RenderError::Other("o".into()),
    ] {
        let _: String = e.to_string();
    }
    for e in [PassError::MissingRenderer, PassError::Unexpected("u".into())] {
        let _: String = e.to_string();
    }

    let ast = node.data.borrow();
    match &*ast {
        NodeValue::Fragment => {}
        NodeValue::Element(el) => {
            let _: &String = &el.name;
            for attr in &el.attrs {
                let _: &String = &attr.name;
                let _: &String = &attr.value;
            }
            let _: Option<&str> = el.attr("class");
            let _: bool = el.has_class("a");
        }
        NodeValue::Text(text) => {
            let _: &String = text;
        }
        NodeValue::Comment(text) | NodeValue::Doctype(text) | NodeValue::Raw(text) => {
            let _: &String = text;
        }
    }
}

#[cfg(feature = "bon")]
#[test]
fn builders() {
    let renderer = MarkupRenderer::new();
    let plugins = Plugins::builder()
        .render(RenderPlugins::builder().math_renderer(&renderer).build())
        .build();

    let options = Options {
        normalize: Normalize::builder().enabled(false).build(),
        scan: Scan::builder()
            .root_selectors(vec!["article".to_string()])
            .build(),
        render: Render::builder().error_color("blue".to_string()).build(),
    };

    assert!(!options.normalize.enabled);
    assert_eq!(options.normalize.containers, vec!["p"]);
    assert_eq!(options.scan.delimiters, crate::scanner::default_delimiters());
    assert_eq!(options.scan.ignored_tags.len(), 7);
    assert_eq!(options.render.macros, MacroTable::default());
    assert!(options.render.display_errors);
    assert!(options.render.trust);
    assert_eq!(options.render.strict, Strict::Ignore);

    assert_eq!(
        render_math_in_html(
            "<p>$x$</p><article><p>$$<br>y<br>$$</p></article>",
            &options,
            &plugins
        ),
        "<p>$x$</p><article><p>$$<br>y<br>$$</p></article>"
    );
}

#[test]
fn markup_renderer_end_to_end() {
    let renderer = MarkupRenderer::new();
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&renderer);

    let mut options = Options::default();
    options.render.macros.insert("\\eps", "\\varepsilon");

    assert_eq!(
        render_math_in_html(
            "<div class=\"entry-content\"><p>Take $\\eps > 0$ and $x}$.</p></div>",
            &options,
            &plugins
        ),
        concat!(
            "<div class=\"entry-content\"><p>Take ",
            "<span data-math-style=\"inline\">\\varepsilon &gt; 0</span> and ",
            "<span class=\"katex-error\" title=\"ParseError: Extra }\" ",
            "style=\"color:#cc0000\">x}</span>.</p></div>"
        )
    );
}
