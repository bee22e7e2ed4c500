// ABOUTME: CLI binary for the storefront extractor.
// ABOUTME: Extracts a record from a local HTML file or stdin and prints it as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use storefront::{builtin_schema_names, ExtractError, ExtractionSchema, Extractor, Product};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for a page that is a block/challenge page.
const EXIT_BLOCKED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Extract structured product data from a saved listing page")]
struct Args {
    /// HTML file to extract from. Use "-" to read from stdin.
    #[arg(required_unless_present = "list_builtins")]
    input: Option<String>,

    /// JSON schema file (overrides --builtin)
    #[arg(long, conflicts_with = "builtin")]
    schema: Option<PathBuf>,

    /// Built-in schema name
    #[arg(long, default_value = storefront::loader::DEFAULT_SCHEMA)]
    builtin: String,

    /// URL the page was fetched from; used for the record URL and absolute links
    #[arg(long)]
    url: Option<String>,

    /// Print the typed product view instead of the generic record
    #[arg(long)]
    typed: bool,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print the built-in schema names and exit
    #[arg(long)]
    list_builtins: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.list_builtins {
        for name in builtin_schema_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // ExtractError already prints its source.
            let blocked = match err.downcast_ref::<ExtractError>() {
                Some(e) => {
                    eprintln!("error: {}", e);
                    e.is_blocked()
                }
                None => {
                    eprintln!("error: {:#}", err);
                    false
                }
            };
            if blocked {
                ExitCode::from(EXIT_BLOCKED)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let extractor = build_extractor(args)?;
    let input = args.input.as_deref().unwrap_or("-");
    let html = load_html(input)?;
    debug!(input, bytes = html.len(), "loaded page");

    let record = extractor.extract_html(&html, args.url.as_deref())?;

    let url = record.url.as_deref();
    let rendered = if args.typed {
        render(url, &Product::from_record(&record), args.compact)?
    } else {
        render(url, &record, args.compact)?
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Output envelope; field order follows the schema.
#[derive(Serialize)]
struct Output<'a, T: Serialize> {
    url: Option<&'a str>,
    record: &'a T,
}

fn render<T: Serialize>(url: Option<&str>, record: &T, compact: bool) -> Result<String> {
    let output = Output { url, record };
    let rendered = if compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    Ok(rendered)
}

fn build_extractor(args: &Args) -> Result<Extractor> {
    let builder = match &args.schema {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            Extractor::builder().schema(ExtractionSchema::from_json(&text)?)
        }
        None => Extractor::builder().builtin(args.builtin.as_str()),
    };
    Ok(builder.build()?)
}

fn load_html(target: &str) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        bail!("file not found: {}", target);
    }
    fs::read_to_string(&path).with_context(|| format!("reading {}", target))
}
