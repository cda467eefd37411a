//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated human
//! renderings for validation results and batch outcomes.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use fieldmap_core::{BatchOutcome, CompatibilityLevel, ValidationResult};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation result
    fn format_validation_result(&self, result: &ValidationResult, use_color: bool) -> Result<String>;

    /// Format the outcome of a batch run
    fn format_batch_outcome(&self, outcome: &BatchOutcome, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_validation_result(&self, result: &ValidationResult, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_result_human(result, use_color)),
            _ => self.format(result),
        }
    }

    fn format_batch_outcome(&self, outcome: &BatchOutcome, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_batch_outcome_human(outcome, use_color)),
            _ => self.format(outcome),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        let show_progress = !quiet && io::stdout().is_terminal();
        Self {
            show_progress,
            ..Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            verbose,
            writer,
        }
    }

    /// Turn progress indicators off regardless of the terminal
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        trace!("Outputting data in {:?} format", self.format);

        let formatted = self.format.format(value)?;

        if self.format == OutputFormat::Human || self.format == OutputFormat::JsonPretty {
            self.writeln(&formatted)
        } else {
            // Machine formats are written as-is; JSON gets a trailing newline
            self.write(&formatted)?;
            if self.format == OutputFormat::Json {
                self.writeln("")?;
            }
            Ok(())
        }
    }

    /// Write a validation result with specialized formatting
    pub fn validation_result(&mut self, result: &ValidationResult) -> Result<()> {
        let formatted = self.format.format_validation_result(result, self.use_color)?;
        self.writeln(&formatted)
    }

    /// Write a batch outcome with specialized formatting
    pub fn batch_outcome(&mut self, outcome: &BatchOutcome) -> Result<()> {
        let formatted = self.format.format_batch_outcome(outcome, self.use_color)?;
        self.writeln(&formatted)
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Write debug information if verbose mode is enabled
    pub fn debug(&mut self, message: &str) -> Result<()> {
        if self.verbose > 0 && self.format == OutputFormat::Human {
            if self.use_color {
                self.writeln(&format!("{} {}", "DEBUG:".dimmed(), message.dimmed()))
            } else {
                self.writeln(&format!("DEBUG: {}", message))
            }
        } else {
            Ok(())
        }
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        // Widths count characters; cells must not carry ANSI codes
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(&row_str)?;
        }

        Ok(())
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Compatibility level label, colored by how safe the mapping is
pub fn level_label(level: CompatibilityLevel, use_color: bool) -> String {
    let label = level.as_str();
    if !use_color {
        return label.to_string();
    }
    match level {
        CompatibilityLevel::Perfect | CompatibilityLevel::High => label.green().to_string(),
        CompatibilityLevel::Medium => label.yellow().to_string(),
        CompatibilityLevel::Low => label.bright_red().to_string(),
        CompatibilityLevel::None => label.red().bold().to_string(),
    }
}

/// Format a ValidationResult for human reading
fn format_validation_result_human(result: &ValidationResult, use_color: bool) -> String {
    let mut output = String::new();

    let verdict = match (result.is_valid, use_color) {
        (true, true) => "✓ valid".green().bold().to_string(),
        (true, false) => "✓ valid".to_string(),
        (false, true) => "✗ invalid".red().bold().to_string(),
        (false, false) => "✗ invalid".to_string(),
    };
    output.push_str(&format!("{} ({})\n", verdict, level_label(result.compatibility_level, use_color)));

    match &result.transformation_id {
        Some(id) => output.push_str(&format!("  Transformation: {}\n", id)),
        None if result.is_valid => output.push_str("  Direct mapping, no transformation\n"),
        None => {}
    }

    if let Some(message) = result.error_message() {
        output.push_str(&format!("  Reason: {}\n", message));
    }
    if let Some(suggestion) = &result.suggestion {
        output.push_str(&format!("  Suggestion: {}\n", suggestion));
    }

    if let Some(sample) = &result.sample {
        output.push_str(&format!("  Sample input: {}\n", format_value_compact(&sample.input)));
        if let Some(value) = &sample.output {
            output.push_str(&format!("  Sample output: {}\n", format_value_compact(value)));
        }
        if let Some(error) = &sample.error {
            output.push_str(&format!("  Sample failed: {}\n", error));
        }
    }

    output.trim_end().to_string()
}

/// Format a BatchOutcome for human reading
fn format_batch_outcome_human(outcome: &BatchOutcome, use_color: bool) -> String {
    let mut output = String::new();

    for (index, record) in outcome.records.iter().enumerate() {
        output.push_str(&format!("Record {}:\n", index + 1));
        for (target, value) in &record.values {
            output.push_str(&format!("  {}: {}\n", target, format_value_compact(value)));
        }
        for failure in &record.errors {
            let line = format!(
                "  {} ✗ {} ({})",
                failure.target_field_id, failure.error, failure.mapping_id
            );
            if use_color {
                output.push_str(&line.red().to_string());
            } else {
                output.push_str(&line);
            }
            output.push('\n');
        }
    }

    let summary = format!(
        "{} record(s), {} failed field(s)",
        outcome.records.len(),
        outcome.failed_fields
    );
    if use_color && outcome.failed_fields > 0 {
        output.push_str(&summary.yellow().to_string());
    } else {
        output.push_str(&summary);
    }

    output
}

/// Render a JSON value on one line, shortening long strings
pub fn format_value_compact(value: &Value) -> String {
    const MAX_CHARS: usize = 80;

    let text = match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    };
    if text.chars().count() <= MAX_CHARS {
        text
    } else {
        let mut shortened: String = text.chars().take(MAX_CHARS - 1).collect();
        shortened.push('…');
        shortened
    }
}
