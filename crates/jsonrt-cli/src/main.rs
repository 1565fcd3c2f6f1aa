//! `jsonrt` CLI — validate, format, and minify JSON from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Check a document (prints "valid" or the error location)
//! jsonrt check -i data.json
//!
//! # Pretty-print with two-space indentation (stdin → stdout)
//! echo '{"name":"Alice","tags":["a"]}' | jsonrt format
//!
//! # Tab indentation, keeping only some keys
//! jsonrt format --tab --allow name,tags -i data.json -o out.json
//!
//! # Drop keys at every depth
//! echo '{"id":1,"etag":"x","nested":{"etag":"y"}}' | jsonrt format --drop etag
//!
//! # Minify, retrying with serde_json if the built-in parser rejects the input
//! jsonrt --fallback minify -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jsonrt_core::{
    stringify, Node, RecoveringParser, Replacer, SerdeJsonFallback, Space,
    TracingObserver, Value, MAX_INDENT,
};
use std::io::{self, IsTerminal, Read};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonrt", version, about = "Validate, format and minify JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Retry with serde_json when the built-in parser rejects the input
    #[arg(long, global = true)]
    fallback: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pretty-print JSON
    Format {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Spaces per indentation level, 0 to 10 (0 for compact output)
        #[arg(
            long,
            default_value_t = 2,
            conflicts_with = "tab",
            value_parser = clap::value_parser!(u16).range(0..=MAX_INDENT as i64)
        )]
        indent: u16,
        /// Indent with tabs
        #[arg(long)]
        tab: bool,
        /// Comma-separated object keys to keep; all others are omitted
        #[arg(long, conflicts_with = "drop")]
        allow: Option<String>,
        /// Comma-separated object keys to remove at every depth
        #[arg(long)]
        drop: Option<String>,
    },
    /// Strip all insignificant whitespace
    Minify {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Validate JSON and report the first error
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Format {
            input,
            output,
            indent,
            tab,
            allow,
            drop,
        } => {
            let text = read_input(input.as_deref())?;
            let value = parse_input(&text, cli.fallback).context("Failed to parse JSON")?;

            let space = if tab {
                Space::Text("\t".to_string())
            } else {
                Space::Count(usize::from(indent))
            };

            let allowed = split_keys(allow.as_deref());
            let dropped = split_keys(drop.as_deref());
            let mut replacer = if allow.is_some() {
                Some(Replacer::allow_list(allowed))
            } else if !dropped.is_empty() {
                Some(drop_keys(dropped))
            } else {
                None
            };

            let formatted = stringify(&Node::from(value), replacer.as_mut(), Some(&space));
            write_output(output.as_deref(), &formatted)?;
        }
        Commands::Minify { input, output } => {
            let text = read_input(input.as_deref())?;
            let value = parse_input(&text, cli.fallback).context("Failed to parse JSON")?;
            debug!(input_bytes = text.len(), "minifying");
            write_output(output.as_deref(), &value.to_string())?;
        }
        Commands::Check { input } => {
            let text = read_input(input.as_deref())?;
            match parse_input(&text, cli.fallback) {
                Ok(_) => println!("valid"),
                Err(err) => {
                    eprintln!(
                        "invalid: {} at line {}, column {}",
                        err.kind, err.line, err.column
                    );
                    process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins when set; otherwise
/// warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn parse_input(text: &str, fallback: bool) -> jsonrt_core::Result<Value> {
    let mut parser = RecoveringParser::new().observer(TracingObserver);
    if fallback {
        parser = parser.fallback(SerdeJsonFallback);
    }
    parser.parse(text)
}

/// Split a `--allow`/`--drop` argument.
///
/// - `a,b` produces `["a", "b"]`
/// - blanks around and between commas are ignored
/// - `None` or an empty string produces no keys
fn split_keys(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// A replacer that omits the named members wherever they appear.
fn drop_keys(keys: Vec<String>) -> Replacer<'static> {
    Replacer::function(move |_holder: &Node, key: &str, value: &Node| {
        if !key.is_empty() && keys.iter().any(|k| k == key) {
            Node::Undefined
        } else {
            value.clone()
        }
    })
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Write to `path`, or stdout. Output always ends with a newline.
fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{content}\n"))
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
