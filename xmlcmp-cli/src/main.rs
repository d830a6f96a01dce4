//! xcmp - structural XML comparison from the command line
//!
//! Compares an expected and an actual XML document and prints every
//! difference that is not tolerated. Exit status is 0 when the documents
//! match, 1 when they differ and 2 on errors.

mod profile;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use xmlcmp::xml::parse_file;
use xmlcmp::{XmlComparator, XmlComparisonSettings};

use profile::{Profile, ToleranceRule};

/// Structural XML comparison with tolerance rules
#[derive(Parser)]
#[command(name = "xcmp")]
#[command(version)]
#[command(about = "Structural XML comparison with tolerance rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log comparison progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an expected document with an actual one
    #[command(visible_alias = "c")]
    Compare(CompareArgs),
}

#[derive(Args)]
struct CompareArgs {
    /// Expected document
    expected: PathBuf,
    /// Actual document
    actual: PathBuf,

    /// TOML profile with relevance switches, keys and tolerance rules
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Tolerate diffs, as KIND or KIND:PATH (kinds: different, missing,
    /// unexpected, moved, any)
    #[arg(short, long = "tolerate", value_name = "KIND:PATH")]
    tolerate: Vec<ToleranceRule>,

    /// Key expression for an element, as NAME=EXPR
    #[arg(short, long = "key", value_name = "NAME=EXPR", value_parser = parse_key)]
    key: Vec<(String, String)>,

    /// Compare element namespaces
    #[arg(long)]
    namespace: bool,

    /// Treat whitespace-only text as content
    #[arg(long)]
    whitespace: bool,

    /// Compare comments
    #[arg(long)]
    comments: bool,

    /// Read CDATA sections as plain text
    #[arg(long)]
    no_cdata: bool,

    /// Compare processing instructions
    #[arg(long)]
    pi: bool,

    /// Compare document encodings
    #[arg(long)]
    encoding: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare(args) => run_compare(&args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so that the report on stdout stays clean.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Runs a comparison. Returns true if the documents match.
fn run_compare(args: &CompareArgs) -> anyhow::Result<bool> {
    let settings = build_settings(args)?;

    let expected = parse_file(&args.expected)
        .with_context(|| format!("failed to parse {}", args.expected.display()))?;
    let actual = parse_file(&args.actual)
        .with_context(|| format!("failed to parse {}", args.actual.display()))?;

    let comparator = XmlComparator::new(settings);
    let diff = comparator.compare(&expected, &actual);
    println!("{}", comparator.report(&diff));

    info!(differences = diff.detail_count(), "comparison complete");
    Ok(diff.is_empty())
}

/// Layers command line flags over the profile, if any.
fn build_settings(args: &CompareArgs) -> anyhow::Result<XmlComparisonSettings> {
    let mut settings = XmlComparisonSettings::default();
    if let Some(path) = &args.profile {
        Profile::load(path)?.apply(&mut settings)?;
    }

    if args.namespace {
        settings.set_namespace_relevant(true);
    }
    if args.whitespace {
        settings.set_whitespace_relevant(true);
    }
    if args.comments {
        settings.set_comment_relevant(true);
    }
    if args.no_cdata {
        settings.set_cdata_relevant(false);
    }
    if args.pi {
        settings.set_processing_instruction_relevant(true);
    }
    if args.encoding {
        settings.set_encoding_relevant(true);
    }

    for (element, expression) in &args.key {
        settings
            .add_key_expression(element, expression)
            .with_context(|| format!("invalid key for <{}>", element))?;
    }
    for rule in &args.tolerate {
        rule.apply(&mut settings)
            .with_context(|| format!("invalid tolerance rule {}", rule))?;
    }
    debug!(rules = settings.tolerated_diffs().len(), "settings ready");
    Ok(settings)
}

fn parse_key(s: &str) -> Result<(String, String), String> {
    let (name, expression) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=EXPR, got '{}'", s))?;
    if name.is_empty() || expression.is_empty() {
        return Err(format!("expected NAME=EXPR, got '{}'", s));
    }
    Ok((name.to_string(), expression.to_string()))
}
