//! # Tank Inspection CLI
//!
//! Reads an inspection request (JSON), runs the report pipeline, and prints
//! or writes the rendered document or the analytics summary.
//!
//! ```text
//! tank_cli tank-101.json --format typst --output tank-101.typ
//! tank_cli tank-101.json --layout a4 --format summary -v
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tank_core::config::EngineConfig;
use tank_core::errors::{CalcError, CalcResult};
use tank_core::file_io::{load_config, load_request, save_text_atomic};
use tank_core::pipeline::generate_report;
use tank_core::report::{renderer_for, PageLayout, RenderFormat, RenderStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Fixed-width text
    Text,
    /// Typst markup
    Typst,
    /// Full document model as JSON
    Json,
    /// Analytics summary as JSON
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutPreset {
    /// US Letter, 1 in margins
    Letter,
    /// ISO A4, 20 mm margins
    A4,
    /// US Letter, half-inch margins and tighter rows
    Compact,
}

impl LayoutPreset {
    fn page_layout(self) -> PageLayout {
        match self {
            LayoutPreset::Letter => PageLayout::letter(),
            LayoutPreset::A4 => PageLayout::a4(),
            LayoutPreset::Compact => PageLayout::compact(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tank_cli")]
#[command(version, about = "API 653 tank inspection report generator")]
struct Args {
    /// Inspection request JSON
    input: PathBuf,

    /// Engine configuration JSON (policy and layout)
    #[arg(short, long, env = "TANK_CONFIG")]
    config: Option<PathBuf>,

    /// Page layout preset (overrides the config layout)
    #[arg(short, long, value_enum)]
    layout: Option<LayoutPreset>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn to_json<T: serde::Serialize>(value: &T) -> CalcResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })
}

fn run(args: &Args) -> CalcResult<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(preset) = args.layout {
        config.layout = preset.page_layout();
    }

    let request = load_request(&args.input)?;
    let output = generate_report(&request, &config)?;

    for warning in &output.warnings {
        eprintln!("warning: [{}] {}: {}", warning.code.label(), warning.subject, warning.message);
    }

    let rendered = match args.format {
        OutputFormat::Summary => to_json(&output.summary)?,
        OutputFormat::Text => renderer_for(RenderFormat::Text).render(&output.document)?,
        OutputFormat::Typst => renderer_for(RenderFormat::Typst).render(&output.document)?,
        OutputFormat::Json => renderer_for(RenderFormat::Json).render(&output.document)?,
    };

    match &args.output {
        Some(path) => {
            save_text_atomic(path, &rendered)?;
            tracing::info!(path = %path.display(), pages = output.summary.total_pages, "report written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Ok(json) = serde_json::to_string(&e) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
