//! lore - merge documentation sources into a page template

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lore::{Config, MungeOptions, Processor, SourceFormat};

#[derive(Parser)]
#[command(name = "lore")]
#[command(version, about = "Merge XHTML documentation into a page template", long_about = None)]
#[command(after_help = "EXAMPLES:
    lore -t template.tpl howto/*.xhtml           Write howto/*.html
    lore -t template.tpl -e .xhtml -l ../ a.xhtml  Keep .xhtml links, relocate assets
    lore -t template.tpl --set version=1.3 *.xhtml Stamp a version string")]
struct Cli {
    /// Source documents
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Page template (XHTML)
    #[arg(short, long, value_name = "PATH")]
    template: PathBuf,

    /// Output file extension
    #[arg(short, long, default_value = ".html")]
    ext: String,

    /// Prefix for relative links in the template
    #[arg(short, long, value_name = "PREFIX", default_value = "")]
    linkrel: String,

    /// API reference URL, with %name% standing for the dotted name
    #[arg(short = 'u', long, value_name = "TEMPLATE", default_value = "%name%")]
    api_url: String,

    /// JSON file of configuration options
    #[arg(short, long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Set a configuration option (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Version string for the template's version slots
    #[arg(long, value_name = "VERSION")]
    version_string: Option<String>,

    /// Parse sources as tag soup instead of strict XHTML
    #[arg(long)]
    html: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// More logging (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> lore::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };
    for assignment in &cli.overrides {
        config.apply_override(assignment)?;
    }
    if let Some(version) = &cli.version_string {
        config.set("version", version.as_str());
    }
    Ok(config)
}

/// Returns whether every file converted.
fn run(cli: &Cli) -> lore::Result<bool> {
    let options = MungeOptions::new("")
        .with_ext(cli.ext.as_str())
        .with_linkrel(cli.linkrel.as_str())
        .with_api_url(cli.api_url.as_str())
        .with_config(build_config(cli)?);

    let format = if cli.html {
        SourceFormat::Html
    } else {
        SourceFormat::Xhtml
    };
    let processor = Processor::from_template_file(&cli.template, options)?.with_format(format);

    let report = processor.process_all(&cli.files);
    for (path, err) in &report.failures {
        tracing::error!("{}: {err}", path.display());
    }
    if !cli.quiet {
        tracing::info!(
            converted = report.converted.len(),
            failed = report.failures.len(),
            "done"
        );
    }
    Ok(report.is_success())
}
