use super::*;
use ntest::timeout;
use pretty_assertions::assert_eq;

fn count_calls(input: &str) -> (String, usize) {
    let recorder = Recorder::default();
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&recorder);
    let output = render_math_in_html(input, &Options::default(), &plugins);
    let calls = recorder.calls().len();
    (output, calls)
}

// input: python3 -c 'n = 100000; print("$" * n)'
#[test]
#[timeout(4000)]
fn pathological_dollars() {
    let n = 100_000;
    let input = "$".repeat(n);
    let (output, calls) = count_calls(&input);
    // Every `$$` closes on the next `$$`.
    assert_eq!(calls, n / 4);
    assert_eq!(output, "[[]]".repeat(n / 4));
}

// input: python3 -c 'n = 50000; print("\\(a \\[b $" * n)'
#[test]
#[timeout(4000)]
fn pathological_unclosed_openers() {
    let n = 50_000;
    let input = "\\(a \\[b $".repeat(n);
    let (output, calls) = count_calls(&input);
    assert_eq!(calls, n / 2);
    // Only the `$`s pair up.
    assert_eq!(output, "\\(a \\[b [\\(a \\[b ]".repeat(n / 2));
}

#[test]
#[timeout(4000)]
fn pathological_braces() {
    let n = 100_000;
    let input = format!("${}$", "{".repeat(n));
    let (output, calls) = count_calls(&input);
    assert_eq!(calls, 0);
    assert_eq!(output, input);
}

#[test]
#[timeout(4000)]
fn pathological_breaks() {
    let n = 50_000;
    let input = format!("<p>$${}$$</p>", "x<br>".repeat(n));
    let (output, calls) = count_calls(&input);
    assert_eq!(calls, 1);
    assert_eq!(output, format!("<p>[[{}]]</p>", "x\n".repeat(n)));
}

#[test]
#[timeout(4000)]
fn pathological_many_paragraphs() {
    let n = 20_000;
    let input = "<p>$$<br>a<br>$$ and $b$</p>".repeat(n);
    let (output, calls) = count_calls(&input);
    assert_eq!(calls, 2 * n);
    assert_eq!(output, "<p>[[\na\n]] and [b]</p>".repeat(n));
}

#[test]
#[timeout(4000)]
fn pathological_nesting() {
    let n = 5_000;
    let input = format!("{}$x${}", "<div>".repeat(n), "</div>".repeat(n));
    let (output, calls) = count_calls(&input);
    assert_eq!(calls, 1);
    assert_eq!(
        output,
        format!("{}[x]{}", "<div>".repeat(n), "</div>".repeat(n))
    );
}
