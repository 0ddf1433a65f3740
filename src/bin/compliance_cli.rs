//! Creative Compliance CLI - bridge interface for the editor backend
//!
//! Commands: validate, check-text, rules, formats
//! Outputs JSON to stdout, logs to stderr
//! Exit codes: 0 compliant, 2 non-compliant, 1 malformed input or config error

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use creative_compliance::{Category, ComplianceEngine, CreativeDocument, EngineConfig, EngineError};

#[derive(Parser)]
#[command(name = "creative-compliance-cli")]
#[command(about = "Creative Compliance CLI - retail-media guideline checks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to an engine config JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a creative document
    Validate {
        /// JSON payload (CreativeDocument)
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        payload: Option<String>,

        /// Read the payload from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only run rules in these categories (comma separated)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
    },

    /// Screen a piece of copy against the text rules
    CheckText {
        #[arg(short, long)]
        text: String,
    },

    /// List all rules
    Rules,

    /// List supported formats
    Formats,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Prints `value`; exit 2 when it is not compliant.
fn report_json<T: Serialize>(value: &T, compliant: bool) -> ExitCode {
    match print_json(value) {
        Err(e) => fail(&e),
        Ok(()) if compliant => ExitCode::SUCCESS,
        Ok(()) => ExitCode::from(2),
    }
}

fn list_json<T: Serialize>(value: &T) -> ExitCode {
    report_json(value, true)
}

fn fail(message: &str) -> ExitCode {
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn build_engine(config: Option<&PathBuf>) -> Result<ComplianceEngine, String> {
    let Some(path) = config else {
        return Ok(ComplianceEngine::new());
    };
    let config = EngineConfig::load(path).map_err(|e| e.to_string())?;
    ComplianceEngine::with_config(config).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let engine = match build_engine(cli.config.as_ref()) {
        Ok(engine) => engine,
        Err(e) => return fail(&e),
    };

    match cli.command {
        Commands::Validate { payload, file, categories } => {
            let payload = match (payload, file) {
                (Some(p), _) => p,
                (None, Some(path)) => match fs::read_to_string(&path) {
                    Ok(p) => p,
                    Err(e) => return fail(&format!("Failed to read {}: {}", path.display(), e)),
                },
                (None, None) => return fail("Either --payload or --file is required"),
            };

            let mut selected = vec![];
            for name in &categories {
                match Category::parse(name) {
                    Some(category) => selected.push(category),
                    None => return fail(&format!("Unknown category: {}", name)),
                }
            }

            let result = CreativeDocument::from_json(&payload)
                .map_err(EngineError::from)
                .and_then(|doc| {
                    if selected.is_empty() {
                        engine.validate(&doc)
                    } else {
                        engine.validate_categories(&doc, &selected)
                    }
                });

            match result {
                Ok(report) => report_json(&report, report.is_compliant),
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::CheckText { text } => {
            let screening = engine.screen_text(&text);
            report_json(&screening, screening.is_compliant)
        }

        Commands::Rules => list_json(&engine.rule_catalog()),

        Commands::Formats => list_json(&engine.supported_formats()),
    }
}
