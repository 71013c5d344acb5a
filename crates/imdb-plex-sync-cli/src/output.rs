use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;
use watchlist_sync_core::SyncResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// User-facing results on stdout. Diagnostics go through `tracing` on stderr.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "✓".green(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "success",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "⚠".yellow(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "warning",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    /// Final report of a run. JSON formats print it even when quiet.
    pub fn summary(&self, result: &SyncResult) {
        match self.format {
            OutputFormat::Human => {
                let unmatched = result.requested.saturating_sub(result.resolved);
                if unmatched > 0 {
                    self.warn(format!("{} IMDb titles have no Plex match", unmatched));
                }
                self.success(summary_line(result));
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let data = serde_json::to_value(result).unwrap_or_else(|e| json!({ "error": e.to_string() }));
                self.print_json(&data);
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }
}

fn summary_line(result: &SyncResult) -> String {
    let verb = if result.dry_run { "Would add" } else { "Added" };
    let removed = if result.dry_run { "would remove" } else { "removed" };
    format!(
        "{} {}, {} {} ({} on IMDb, {} matched, {} on Plex) in {:.1}s via {}",
        verb,
        result.added,
        removed,
        result.removed,
        result.requested,
        result.resolved,
        result.plex_items,
        result.duration.as_secs_f64(),
        result.strategy
    )
}
