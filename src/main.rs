//! The `mathscan` binary.

use mathscan::plugins::markup::MarkupRenderer;
use mathscan::render::scannable_text_nodes;
use mathscan::{
    format_html, normalize_fragment, parse_fragment, scan, select_root, Arena, AutoRender,
    MacroTable, Options, Plugins, Strict,
};

use std::boxed::Box;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};

const EXIT_PARSING_CONFIG: i32 = 2;
const EXIT_READ_INPUT: i32 = 3;

#[derive(Debug, Parser)]
#[command(
    about,
    author,
    version,
    after_help = "By default, mathscan will attempt to read command-line options from a config file specified by --config-file.  This behaviour can be disabled by passing --config-file none.  It is not an error if the file does not exist."
)]
struct Cli {
    /// The HTML files to process; or standard input if none passed
    #[arg(value_name = "FILE")]
    files: Option<Vec<PathBuf>>,

    /// Path to config file containing command-line arguments, or 'none'
    #[arg(short, long, value_name = "PATH", default_value = get_default_config_path())]
    config_file: String,

    /// Selector of the element holding the content, tried in order [default:
    /// .entry-content, article, main, body]
    #[arg(long = "selector", value_name = "SELECTOR")]
    selectors: Vec<String>,

    /// Tag whose contents are repaired as one block [default: p]
    #[arg(long = "container", value_name = "TAG")]
    containers: Vec<String>,

    /// Don't repair display math split by <br> tags
    #[arg(long)]
    no_normalize: bool,

    /// Define a macro, e.g. --macro '\eps=\varepsilon'
    #[arg(long = "macro", value_name = "NAME=EXPANSION", value_parser = parse_macro)]
    macros: Vec<(String, String)>,

    /// Don't define \RR, \NN, \ZZ, \QQ and \CC
    #[arg(long)]
    no_default_macros: bool,

    /// Leave math that fails to render as written instead of marking it
    #[arg(long)]
    hide_errors: bool,

    /// CSS color of error markers
    #[arg(long, value_name = "COLOR", default_value = "#cc0000")]
    error_color: String,

    /// Reject commands that can produce links, images or HTML attributes
    #[arg(long)]
    no_trust: bool,

    /// How to treat non-standard LaTeX
    #[arg(long, value_enum, value_name = "MODE", default_value = "ignore")]
    strict: Strict,

    /// Additional tag whose text is never scanned
    #[arg(long = "ignore-tag", value_name = "TAG")]
    ignore_tags: Vec<String>,

    /// Class marking elements whose text is never scanned
    #[arg(long = "ignore-class", value_name = "CLASS")]
    ignore_classes: Vec<String>,

    /// Specify output format
    #[arg(short = 't', long = "to", value_enum, default_value = "html")]
    format: Format,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log more; repeat for more detail.  RUST_LOG overrides this
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// The processed HTML fragment
    Html,
    /// One line per math span found, without rendering
    Spans,
}

fn parse_macro(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, expansion)) if !name.is_empty() => {
            Ok((name.to_string(), expansion.to_string()))
        }
        _ => Err(format!("expected NAME=EXPANSION, got {:?}", s)),
    }
}

fn cli_with_config() -> Cli {
    let cli = Cli::parse();
    let config_file_path = &cli.config_file;

    if config_file_path == "none" {
        return cli;
    }

    match fs::read_to_string(config_file_path) {
        Ok(config) => {
            let mut args = vec![env::args_os()
                .next()
                .unwrap_or_else(|| "mathscan".into())];
            match shell_words::split(&config) {
                Ok(config_args) => args.extend(config_args.into_iter().map(Into::into)),
                Err(e) => {
                    eprintln!("failed to parse {}: {}", config_file_path, e);
                    process::exit(EXIT_PARSING_CONFIG);
                }
            }
            args.extend(env::args_os().skip(1));
            Cli::parse_from(args)
        }
        Err(_) => cli,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init()
        .ok();
}

fn options_from(cli: &Cli) -> Options {
    let mut options = Options::default();

    if !cli.selectors.is_empty() {
        options.scan.root_selectors = cli.selectors.clone();
    }
    options
        .scan
        .ignored_tags
        .extend(cli.ignore_tags.iter().cloned());
    options.scan.ignored_classes = cli.ignore_classes.clone();

    options.normalize.enabled = !cli.no_normalize;
    if !cli.containers.is_empty() {
        options.normalize.containers = cli.containers.clone();
    }

    options.render.macros = if cli.no_default_macros {
        MacroTable::new()
    } else {
        MacroTable::default()
    };
    for (name, expansion) in &cli.macros {
        options.render.macros.insert(name.as_str(), expansion.as_str());
    }
    options.render.display_errors = !cli.hide_errors;
    options.render.error_color = cli.error_color.clone();
    options.render.trust = !cli.no_trust;
    options.render.strict = cli.strict;

    options
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = cli_with_config();
    init_logging(cli.verbose);

    let options = options_from(&cli);

    let s: String = if let Some(ref paths) = cli.files {
        let mut bs = vec![];
        for path in paths {
            match fs::read(path) {
                Ok(mut contents) => bs.append(&mut contents),
                Err(e) => {
                    eprintln!("failed to read {}: {}", path.display(), e);
                    process::exit(EXIT_READ_INPUT);
                }
            }
        }
        String::from_utf8(bs)?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let arena = Arena::new();
    let root = parse_fragment(&arena, &s);

    let renderer = MarkupRenderer::new();
    let mut plugins = Plugins::default();
    plugins.render.math_renderer = Some(&renderer);

    let mut bw: Box<dyn Write> = match cli.output {
        Some(ref path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    match cli.format {
        Format::Html => {
            AutoRender::new(&options, &plugins).run(&arena, root);
            fmt2io::write(&mut bw, |writer| format_html(root, writer))?;
        }
        Format::Spans => {
            let content = select_root(root, &options.scan.root_selectors);
            if options.normalize.enabled {
                normalize_fragment(&arena, content, &options);
            }
            for node in scannable_text_nodes(content, &options.scan) {
                let data = node.data.borrow();
                let text = match data.text() {
                    Some(text) => text,
                    None => continue,
                };
                for span in scan(text, &options.scan.delimiters) {
                    let style = if span.display() { "display" } else { "inline" };
                    writeln!(bw, "{}\t{:?}", style, span.content)?;
                }
            }
        }
    }

    bw.flush()?;
    Ok(())
}

#[cfg(all(not(windows), not(target_arch = "wasm32")))]
fn get_default_config_path() -> String {
    if let Ok(xdg_dirs) = xdg::BaseDirectories::with_prefix("mathscan") {
        if let Ok(path) = xdg_dirs.place_config_file("config") {
            if let Some(path_str) = path.to_str() {
                return path_str.into();
            }
        }
    }

    "none".into()
}

#[cfg(any(windows, target_arch = "wasm32"))]
fn get_default_config_path() -> String {
    "none".into()
}
