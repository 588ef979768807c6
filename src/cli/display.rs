//! Terminal output for ollamactl commands
//!
//! Colored messages, model tables, generation stats and pull/push progress.

use crate::models::{ModelDescriptor, ProgressChunk, ShowResponse};
use crate::types::GenerationMetrics;
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Display error message
pub fn show_error(error: &str) {
    eprintln!("{} {}", "Error:".red().bold(), error.red());
}

/// Display warning message
pub fn show_warning(warning: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), warning.yellow());
}

pub fn show_info(info: &str) {
    println!("{}", info.cyan());
}

pub fn show_success(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

/// Print one streamed text fragment without a newline
pub fn stream_fragment(fragment: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(fragment.as_bytes())?;
    stdout.flush()
}

/// Print installed models as an aligned table
pub fn print_model_table(models: &[ModelDescriptor]) {
    let name_width = models
        .iter()
        .map(|m| m.resolved_name().chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!(
        "{}  {:>10}  {:<14}  {}",
        format!("{:<width$}", "NAME", width = name_width).bold(),
        "SIZE".bold(),
        "DETAILS".bold(),
        "MODIFIED".bold()
    );

    for model in models {
        let modified = model
            .modified_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| model.modified_at.clone());
        let details = match model.details {
            Some(_) => model.description(),
            None => "-".to_string(),
        };

        println!(
            "{}  {:>10}  {:<14}  {}",
            format!("{:<width$}", model.resolved_name(), width = name_width).cyan(),
            model.formatted_size().green(),
            details,
            modified.blue()
        );
    }
}

/// Print the details of one model
pub fn print_model_info(name: &str, info: &ShowResponse) {
    println!("\n{}\n", format!("Model: {}", name).bold().cyan());

    if let Some(details) = &info.details {
        println!("{}", "Details:".bold());
        if let Some(family) = &details.family {
            println!("  Family: {}", family);
        }
        if let Some(size) = &details.parameter_size {
            println!("  Parameters: {}", size);
        }
        if let Some(level) = &details.quantization_level {
            println!("  Quantization: {}", level);
        }
        if let Some(format) = &details.format {
            println!("  Format: {}", format);
        }
    }

    if let Some(modelfile) = info.modelfile.as_deref().filter(|m| !m.is_empty()) {
        println!("\n{}", "Modelfile:".bold());
        println!("{}", modelfile);
    }

    if let Some(parameters) = info.parameters.as_deref().filter(|p| !p.is_empty()) {
        println!("\n{}", "Parameters:".bold());
        println!("{}", parameters);
    }
}

/// Print timing counters from a final generation chunk
pub fn print_stats(metrics: &GenerationMetrics) {
    let mut parts = Vec::new();

    if metrics.total_duration.is_some() {
        parts.push(format!("total {}", format_duration(metrics.total_duration)));
    }
    if let Some(count) = metrics.eval_count {
        parts.push(format!("{} tokens", count));
    }
    if let Some(rate) = metrics.tokens_per_second() {
        parts.push(format!("{:.1} tokens/s", rate));
    }

    if !parts.is_empty() {
        println!("{}", parts.join(" | ").dimmed());
    }
}

/// Format a server-reported duration (nanoseconds)
pub fn format_duration(nanos: Option<u64>) -> String {
    let Some(nanos) = nanos else {
        return "N/A".to_string();
    };
    let micros = nanos / 1_000;

    if micros < 1_000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1_000.0)
    } else {
        let seconds = micros as f64 / 1_000_000.0;
        if seconds < 60.0 {
            format!("{:.2}s", seconds)
        } else {
            let minutes = (seconds / 60.0).floor();
            format!("{}m {:.1}s", minutes as u64, seconds - minutes * 60.0)
        }
    }
}

/// Truncate to `max_len` characters, ending with "..." when cut
pub fn truncate(text: &str, max_len: usize) -> String {
    const SUFFIX: &str = "...";

    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let keep = max_len.saturating_sub(SUFFIX.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(SUFFIX);
    out
}

/// Progress display for pull and push
///
/// Starts as a spinner and switches to a byte bar once the server reports
/// a total for the current layer.
pub struct TransferProgress {
    bar: ProgressBar,
    digest: Option<String>,
}

impl TransferProgress {
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, digest: None }
    }

    /// Apply one progress chunk
    pub fn update(&mut self, chunk: &ProgressChunk) {
        match (chunk.total, chunk.completed) {
            (Some(total), completed) if total > 0 => {
                if self.digest != chunk.digest || self.bar.length() != Some(total) {
                    self.digest = chunk.digest.clone();
                    self.bar.set_style(bar_style());
                    self.bar.set_length(total);
                }
                self.bar.set_position(completed.unwrap_or(0));
                self.bar.set_message(truncate(&chunk.status, 40));
            }
            _ => {
                if self.digest.take().is_some() {
                    self.bar.set_style(spinner_style());
                }
                self.bar.set_message(chunk.status.clone());
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.green/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(None), "N/A");
        assert_eq!(format_duration(Some(500_000)), "500µs");
        assert_eq!(format_duration(Some(12_300_000)), "12.3ms");
        assert_eq!(format_duration(Some(4_935_886_000)), "4.94s");
        assert_eq!(format_duration(Some(125_000_000_000)), "2m 5.0s");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("pulling manifest", 10), "pulling...");
        assert_eq!(truncate("αβγδεζηθ", 5), "αβ...");
    }

    #[test]
    fn test_transfer_progress_switches_to_bar() {
        let mut progress = TransferProgress::new(false);
        progress.update(&ProgressChunk {
            status: "pulling manifest".to_string(),
            ..Default::default()
        });
        assert_eq!(progress.bar.length(), None);

        progress.update(&ProgressChunk {
            status: "downloading".to_string(),
            digest: Some("sha256:abc".to_string()),
            total: Some(1000),
            completed: Some(250),
            done: false,
        });
        assert_eq!(progress.bar.length(), Some(1000));
        assert_eq!(progress.bar.position(), 250);
        progress.finish();
    }
}
