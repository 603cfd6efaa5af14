use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use mediconnect_core::{AppointmentStatus, ApprovalStatus, ReviewStatus};
use owo_colors::OwoColorize;
use rustyline_async::SharedWriter;
use std::fmt::Display;
use std::io::Write;

/// Standard output formatting for the CLI
///
/// Inside the shell every line goes through the readline `SharedWriter` so
/// that output doesn't trample the prompt.
#[derive(Clone, Default)]
pub struct Output {
    writer: Option<SharedWriter>,
}

impl Output {
    pub fn new() -> Self {
        Self { writer: None }
    }

    pub fn with_writer(self, writer: SharedWriter) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    fn line(&self, text: impl Display) {
        match &self.writer {
            Some(writer) => {
                let mut writer = writer.clone();
                let _ = writeln!(writer, "{}", text);
            }
            None => println!("{}", text),
        }
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        self.line(format!("  {}", message.dimmed()));
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        self.line(format!("  {} {}", label.bright_blue(), value));
    }

    /// Print a success message (indented)
    pub fn success(&self, message: &str) {
        self.line(format!("  {} {}", "✓".bright_green(), message));
    }

    /// Print an error message (indented)
    pub fn error(&self, message: &str) {
        self.line(format!("  {} {}", "✗".bright_red(), message));
    }

    /// Print a warning message (indented)
    pub fn warning(&self, message: &str) {
        self.line(format!("  {} {}", "⚠".yellow(), message));
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        self.line("");
        self.line(title.bright_cyan().bold());
        self.line("─".repeat(40).dimmed());
    }

    /// Print a list item (already indented)
    pub fn list_item(&self, item: &str) {
        self.line(format!("    • {}", item));
    }

    /// Print a key-value pair (indented)
    pub fn kv(&self, key: &str, value: &str) {
        self.line(format!("  {} {}", format!("{}:", key).dimmed(), value));
    }

    /// Print raw text, e.g. TOML or JSON
    pub fn raw(&self, text: &str) {
        self.line(text);
    }

    /// Print a table with a bold header row
    pub fn table(&self, header: &[&str], rows: Vec<Vec<String>>) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header.iter().map(|h| h.to_string()));
        for row in rows {
            table.add_row(row);
        }
        self.line(table);
    }
}

pub fn format_appointment_status(status: AppointmentStatus, completed: bool) -> String {
    match (status, completed) {
        (_, true) => "completed".bright_blue().to_string(),
        (AppointmentStatus::Pending, false) => "pending".yellow().to_string(),
        (AppointmentStatus::Confirmed, false) => "confirmed".bright_green().to_string(),
        (AppointmentStatus::Cancelled, false) => "cancelled".bright_red().to_string(),
    }
}

pub fn format_approval(approval: ApprovalStatus) -> String {
    match approval {
        ApprovalStatus::Pending => "pending".yellow().to_string(),
        ApprovalStatus::Approved => "approved".bright_green().to_string(),
        ApprovalStatus::Rejected => "rejected".bright_red().to_string(),
    }
}

pub fn format_review_status(status: ReviewStatus) -> String {
    match status {
        ReviewStatus::Pending => "pending".yellow().to_string(),
        ReviewStatus::Approved => "approved".bright_green().to_string(),
        ReviewStatus::Flagged => "flagged".bright_red().to_string(),
    }
}

/// Star rating, e.g. "★★★★☆"
pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
