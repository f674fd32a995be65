use super::*;
use ntest::test_case;
use pretty_assertions::assert_eq;

#[test]
fn no_delimiters() {
    let calls = render(
        "<p>Plain text, <em>no</em> math &amp; nothing else.</p>",
        "<p>Plain text, <em>no</em> math &amp; nothing else.</p>",
    );
    assert!(calls.is_empty());
}

#[test_case("<p>Let $x$ be.</p>", "<p>Let [x] be.</p>", 1)]
#[test_case("<p>$$x$$</p>", "<p>[[x]]</p>", 1)]
#[test_case("<p>\\(x\\)</p>", "<p>[x]</p>", 1)]
#[test_case("<p>\\[x\\]</p>", "<p>[[x]]</p>", 1)]
#[test_case("<p>$a$$b$</p>", "<p>[a][b]</p>", 2)]
#[test_case("<p>x &amp; $y$ &lt; z</p>", "<p>x &amp; [y] &lt; z</p>", 1)]
fn single_delimiters(input: &str, expected: &str, count: usize) {
    assert_eq!(render(input, expected).len(), count);
}

#[test]
fn one_call_per_span() {
    let calls = render(
        "<p>First $a$, then $$b$$,</p><p>\\(c\\) and \\[d\\].</p>",
        "<p>First [a], then [[b]],</p><p>[c] and [[d]].</p>",
    );
    assert_eq!(
        calls,
        super::calls(&[("a", false), ("b", true), ("c", false), ("d", true)])
    );
}

#[test]
fn display_dollars_win_over_inline() {
    let calls = render("<p>$$a $ b$$</p>", "<p>[[a $ b]]</p>");
    assert_eq!(calls, super::calls(&[("a $ b", true)]));
}

#[test]
fn mixed_parens_and_brackets() {
    let calls = render(
        "<p>Inline \\(x+y\\) and display \\[x^2\\]</p>",
        "<p>Inline [x+y] and display [[x^2]]</p>",
    );
    assert_eq!(calls, super::calls(&[("x+y", false), ("x^2", true)]));
}

#[test]
fn unterminated_is_literal() {
    let input = "<p>Some $x unterminated text with no closing</p>";
    let calls = render(input, input);
    assert!(calls.is_empty());
}

#[test]
fn unterminated_display_falls_back_to_inline() {
    // `$$` never closes, but from its second `$` an inline span does.
    let calls = render("<p>$$a$ b</p>", "<p>$[a] b</p>");
    assert_eq!(calls, super::calls(&[("a", false)]));
}

#[test]
fn content_is_passed_verbatim() {
    let calls = render("<p>$  x  $</p>", "<p>[  x  ]</p>");
    assert_eq!(calls, super::calls(&[("  x  ", false)]));
}

#[test]
fn escaped_and_braced_closers() {
    let calls = render(
        "<p>$a\\$b$ and $\\text{$x$}$</p>",
        "<p>[a\\$b] and [\\text{$x$}]</p>",
    );
    assert_eq!(
        calls,
        super::calls(&[("a\\$b", false), ("\\text{$x$}", false)])
    );
}

#[test]
fn entities_are_decoded_before_scanning() {
    // The renderer sees the decoded text; its output is inserted as is.
    let calls = render("<p>$a &lt; b$</p>", "<p>[a < b]</p>");
    assert_eq!(calls, super::calls(&[("a < b", false)]));
}

#[test]
fn spans_do_not_cross_elements() {
    let input = "<p>$a <em>b</em> c$</p>";
    let calls = render(input, input);
    assert!(calls.is_empty());
}

#[test]
fn isolated_failure() {
    let calls = render(
        "<p>$FAIL$ and $y$</p>",
        concat!(
            "<p><span class=\"katex-error\" title=\"ParseError: Undefined control sequence\" ",
            "style=\"color:#cc0000\">FAIL</span> and [y]</p>"
        ),
    );
    assert_eq!(calls, super::calls(&[("FAIL", false), ("y", false)]));
}

#[test]
fn hidden_failure_leaves_source() {
    let calls = render_opts!(
        [render.display_errors = false],
        "<p>$FAIL$ and $y$</p>",
        "<p>$FAIL$ and [y]</p>"
    );
    assert_eq!(calls.len(), 2);
}

#[test]
fn error_marker_escapes() {
    render_opts!(
        [render.error_color = "red\" onclick=\"x".to_string()],
        "<p>$FAIL &lt;b&gt;$</p>",
        concat!(
            "<p><span class=\"katex-error\" title=\"ParseError: Undefined control sequence\" ",
            "style=\"color:#cc0000\">FAIL &lt;b&gt;</span></p>"
        )
    );
}

#[test]
fn throw_on_error_follows_display_errors() {
    let seen = RefCell::new(vec![]);
    let renderer = |_: &str, o: &RenderOptions| -> Result<String, RenderError> {
        seen.borrow_mut().push(o.throw_on_error);
        Ok(String::new())
    };
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&renderer);

    let mut options = Options::default();
    render_math_in_html("<p>$a$</p>", &options, &plugins);
    options.render.display_errors = false;
    render_math_in_html("<p>$a$</p>", &options, &plugins);

    assert_eq!(*seen.borrow(), vec![false, true]);
}

#[test]
fn render_options_are_passed_through() {
    let renderer = |_: &str, o: &RenderOptions| -> Result<String, RenderError> {
        Ok(format!(
            "{}|{}|{:?}|{}|{}",
            o.error_color,
            o.trust,
            o.strict,
            o.macros.len(),
            o.macros.get("\\RR").unwrap_or("-")
        ))
    };
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&renderer);

    let mut options = Options::default();
    assert_eq!(
        render_math_in_html("<p>$a$</p>", &options, &plugins),
        "<p>#cc0000|true|Ignore|5|\\mathbb{R}</p>"
    );

    options.render.error_color = "blue".to_string();
    options.render.trust = false;
    options.render.strict = Strict::Error;
    options.render.macros = MacroTable::new();
    assert_eq!(
        render_math_in_html("<p>$a$</p>", &options, &plugins),
        "<p>blue|false|Error|0|-</p>"
    );
}

#[test]
fn ignored_tags() {
    let calls = render(
        concat!(
            "<p>$a$</p><pre>$b$</pre><code>$c$</code>",
            "<script>var x = \"$d$\";</script><textarea>$e$</textarea>"
        ),
        concat!(
            "<p>[a]</p><pre>$b$</pre><code>$c$</code>",
            "<script>var x = \"$d$\";</script><textarea>$e$</textarea>"
        ),
    );
    assert_eq!(calls, super::calls(&[("a", false)]));
}

#[test]
fn ignored_tags_are_configurable() {
    render_opts!(
        [scan.ignored_tags = vec!["p".to_string()]],
        "<p>$a$</p><pre>$b$</pre>",
        "<p>$a$</p><pre>[b]</pre>"
    );
}

#[test]
fn ignored_classes() {
    render_opts!(
        [scan.ignored_classes = vec!["no-math".to_string()]],
        "<div class=\"x no-math\"><p>$a$</p></div><p class=\"no-mathx\">$b$</p>",
        "<div class=\"x no-math\"><p>$a$</p></div><p class=\"no-mathx\">[b]</p>"
    );
}

#[test]
fn custom_delimiters() {
    let calls = render_opts!(
        [scan.delimiters = vec![
            DelimiterPair::new("@@", "@@", true),
            DelimiterPair::new("", "x", false),
        ]],
        "<p>@@a@@ $b$</p>",
        "<p>[[a]] $b$</p>"
    );
    assert_eq!(calls, super::calls(&[("a", true)]));
}

#[test]
fn rendered_output_is_not_rescanned() {
    let renderer = |tex: &str, _: &RenderOptions| -> Result<String, RenderError> {
        Ok(format!("${}$", tex))
    };
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&renderer);

    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>$a$ $b$</p>");
    let report = render_math(&arena, root, &Options::default(), &plugins).unwrap();
    assert_eq!(
        report,
        RenderReport {
            spans: 2,
            rendered: 2,
            failed: 0
        }
    );

    let mut out = String::new();
    format_html(root, &mut out).unwrap();
    assert_eq!(out, "<p>$a$ $b$</p>");

    let p = root.first_child().unwrap();
    let kinds: Vec<_> = p
        .children()
        .map(|n| match *n.data.borrow() {
            NodeValue::Raw(..) => "raw",
            NodeValue::Text(..) => "text",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["raw", "text", "raw"]);
}

#[test]
fn untouched_text_nodes_keep_identity() {
    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>no math</p><p>$x$</p>");
    let first = root.first_child().unwrap().first_child().unwrap();

    let recorder = Recorder::default();
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&recorder);
    render_math(&arena, root, &Options::default(), &plugins).unwrap();

    let still = root.first_child().unwrap().first_child().unwrap();
    assert!(first.same_node(still));
    assert_eq!(*still.data.borrow(), NodeValue::Text("no math".to_string()));
}

#[test]
fn report_counts() {
    let recorder = Recorder::default();
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&recorder);

    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>$a$ $FAIL$ \\[c\\] $d</p>");
    let report = render_math(&arena, root, &Options::default(), &plugins).unwrap();
    assert_eq!(
        report,
        RenderReport {
            spans: 3,
            rendered: 2,
            failed: 1
        }
    );
}

#[test]
fn missing_renderer() {
    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>$x$</p>");
    assert_eq!(
        render_math(&arena, root, &Options::default(), &Plugins::default()),
        Err(PassError::MissingRenderer)
    );

    let mut out = String::new();
    format_html(root, &mut out).unwrap();
    assert_eq!(out, "<p>$x$</p>");

    assert_eq!(
        render_math_in_html("<p>$$<br>x<br>$$</p>", &Options::default(), &Plugins::default()),
        "<p>$$<br>x<br>$$</p>"
    );
}

#[test]
fn panicking_renderer_stops_the_pass() {
    let renderer = |tex: &str, _: &RenderOptions| -> Result<String, RenderError> {
        if tex == "PANIC" {
            panic!("renderer exploded");
        }
        Ok(format!("[{}]", tex))
    };
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&renderer);

    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>$a$ $PANIC$ $c$</p><p>$d$</p>");
    assert_eq!(
        render_math(&arena, root, &Options::default(), &plugins),
        Err(PassError::Unexpected("renderer exploded".to_string()))
    );

    let mut out = String::new();
    format_html(root, &mut out).unwrap();
    assert_eq!(out, "<p>[a] $PANIC$ $c$</p><p>$d$</p>");
}

#[test]
fn auto_render_runs_once() {
    let recorder = Recorder::default();
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&recorder);
    let options = Options::default();

    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>$x$</p>");
    let auto = AutoRender::new(&options, &plugins);
    assert!(!auto.has_run());

    let report = auto.run(&arena, root).unwrap();
    assert_eq!(report.rendered, 1);
    assert!(auto.has_run());

    assert_eq!(auto.run(&arena, root), None);
    assert_eq!(recorder.calls().len(), 1);
}

#[test]
fn auto_render_without_renderer() {
    let options = Options::default();
    let plugins = Plugins::default();

    let arena = Arena::new();
    let root = parse_fragment(&arena, "<p>$$<br>x<br>$$</p>");
    let auto = AutoRender::new(&options, &plugins);
    assert_eq!(auto.run(&arena, root), None);
    assert!(auto.has_run());

    // Not even normalized.
    let mut out = String::new();
    format_html(root, &mut out).unwrap();
    assert_eq!(out, "<p>$$<br>x<br>$$</p>");
}

#[test]
fn error_marker_color_is_sanitized() {
    let err = RenderError::Other("bad \"thing\"".to_string());
    assert_eq!(
        crate::render::error_marker("a<b", &err, "rgb(0, 0, 255)"),
        "<span class=\"katex-error\" title=\"bad &quot;thing&quot;\" \
         style=\"color:rgb(0, 0, 255)\">a&lt;b</span>"
    );
    assert_eq!(
        crate::render::error_marker("x", &err, "red;background:url(x)"),
        "<span class=\"katex-error\" title=\"bad &quot;thing&quot;\" \
         style=\"color:#cc0000\">x</span>"
    );
}
