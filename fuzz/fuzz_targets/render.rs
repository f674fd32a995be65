#![no_main]

use libfuzzer_sys::fuzz_target;

use mathscan::plugins::markup::MarkupRenderer;
use mathscan::{render_math_in_html, Options, Plugins, RenderPlugins, Strict};

fuzz_target!(|s: &str| {
    let renderer = MarkupRenderer::new();
    let plugins = Plugins {
        render: RenderPlugins {
            math_renderer: Some(&renderer),
        },
    };

    let mut options = Options::default();
    render_math_in_html(s, &options, &plugins);

    options.render.display_errors = false;
    options.render.trust = false;
    options.render.strict = Strict::Error;
    options.normalize.containers.push("div".to_string());
    render_math_in_html(s, &options, &plugins);
});
