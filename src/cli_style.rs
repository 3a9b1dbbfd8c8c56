/*!
 * CLI Style System
 *
 * Themed text, tables and byte formatting for the command-line front end.
 */

use crate::status::{ContentSummary, FileStatus, SummaryField};
use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::{style, StyledObject};

// ============================================================================
// THEME COLORS
// ============================================================================

/// Brand colors for consistent styling
pub struct Theme;

impl Theme {
    /// Primary accent color (cyan/blue)
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    /// Warning color (yellow)
    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    /// Error color (red)
    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    /// Muted/secondary text (dim)
    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }
}

// ============================================================================
// TABLES
// ============================================================================

/// Create a minimal table (no outer borders)
pub fn create_minimal_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled);
    table
}

/// `ls -l` style listing: mode, replication, owner, group, size, date, name
pub fn listing_table<'a>(entries: impl IntoIterator<Item = &'a FileStatus>, full: bool) -> Table {
    let mut table = create_minimal_table();

    for entry in entries {
        let name = if full { entry.full() } else { entry.name().to_string() };
        let name = if entry.is_dir() {
            Cell::new(name).fg(Color::Cyan).add_attribute(Attribute::Bold)
        } else {
            Cell::new(name)
        };

        table.add_row(vec![
            Cell::new(entry.mode()),
            Cell::new(entry.replication()).set_alignment(CellAlignment::Right),
            Cell::new(entry.owner()),
            Cell::new(entry.group()),
            Cell::new(entry.length()).set_alignment(CellAlignment::Right),
            Cell::new(entry.modified().format("%b %d %Y %H:%M:%S")),
            name,
        ]);
    }

    table
}

/// Key-value table of every summary field
pub fn summary_table(summary: &ContentSummary) -> Table {
    let mut table = create_minimal_table();

    for field in SummaryField::ALL {
        let value = summary.get(field);
        let rendered = match field {
            SummaryField::HdfsUsage | SummaryField::DiskUsage => {
                format!("{} ({})", value, format_bytes(value.max(0) as u64))
            }
            _ => value.to_string(),
        };
        table.add_row(vec![
            Cell::new(field.name()).fg(Color::Cyan),
            Cell::new(rendered).add_attribute(Attribute::Bold),
        ]);
    }

    table
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let base = 1024.0_f64;
    let exp = (bytes_f.ln() / base.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f / base.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.2} {}", value, UNITS[exp])
    }
}

/// Print a styled error message with optional suggestion
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!("{} {}", Theme::error("✗ Error:"), message);

    if let Some(hint) = suggestion {
        eprintln!("  {} {}", Theme::muted("→"), Theme::muted(hint));
    }
}

/// Print a styled warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", Theme::warning("⚠"), Theme::warning(message));
}

// ============================================================================
// TESTS
// ============================================================================
