//! Output formatting utilities

use crate::error::CliResult;
use chestlock_registry::{OutcomeTone, RegistrationOutcome};
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Machine-readable form of a registry outcome
#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub outcome: RegistrationOutcome,
    pub message: &'static str,
    pub success: bool,
}

impl From<RegistrationOutcome> for OutcomeReport {
    fn from(outcome: RegistrationOutcome) -> Self {
        Self {
            outcome,
            message: outcome.message(),
            success: outcome.is_success(),
        }
    }
}

/// Print a vector of items in the specified format
pub fn print_output<T: Serialize + Tabled>(data: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }
    Ok(())
}

/// Print a single item as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a registry outcome, coloured by its tone
pub fn print_outcome(outcome: RegistrationOutcome, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            match outcome.tone() {
                OutcomeTone::Success => print_success(outcome.message()),
                OutcomeTone::Warning => print_warning(outcome.message()),
                OutcomeTone::Error => print_error(outcome.message()),
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&OutcomeReport::from(outcome)),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

/// Print an error message
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red(), message.red());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message.yellow());
}
