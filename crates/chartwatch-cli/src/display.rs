//! Report rendering
//!
//! The table layout is fixed-width: every cell is cut to its column width
//! (with a trailing `...`) and padded, except the UPDATE label which is
//! only padded and the final SOURCES column which is only cut.

use console::Style;
use std::io::{self, Write};

use chartwatch_core::{ResolvedApplication, UpdateStatus};

use crate::error::Result;

const COLUMN_SEPARATOR: &str = " | ";
const RULE_WIDTH: usize = 160;

/// Titles and widths of the padded columns, in display order
const COLUMNS: [(&str, usize); 9] = [
    ("CLUSTER", 15),
    ("NAMESPACE", 12),
    ("RELEASE", 20),
    ("REPO", 15),
    ("CHART", 20),
    ("CURRENT", 12),
    ("LATEST", 12),
    ("STATUS", 8),
    ("UPDATE", 15),
];

const SOURCES_TITLE: &str = "SOURCES";
const SOURCES_WIDTH: usize = 50;

/// Cut `value` to at most `max` characters, ending in `...` when cut
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Label shown in the UPDATE column
pub fn update_label(status: UpdateStatus) -> &'static str {
    match status {
        UpdateStatus::Managed => "MANAGED",
        UpdateStatus::Internal => "INTERNAL",
        UpdateStatus::NotFound => "? NOT FOUND",
        UpdateStatus::UpdateAvailable => "⚠ UPDATE AVAILABLE",
        UpdateStatus::UpToDate => "✓ UP-TO-DATE",
    }
}

fn label_style(status: UpdateStatus) -> Style {
    match status {
        UpdateStatus::Managed | UpdateStatus::Internal => Style::new().cyan(),
        UpdateStatus::NotFound => Style::new().dim(),
        UpdateStatus::UpdateAvailable => Style::new().yellow().bold(),
        UpdateStatus::UpToDate => Style::new().green(),
    }
}

fn header_row() -> String {
    let mut cells: Vec<String> = COLUMNS
        .iter()
        .map(|(title, width)| format!("{:<width$}", title, width = *width))
        .collect();
    cells.push(SOURCES_TITLE.to_string());
    cells.join(COLUMN_SEPARATOR)
}

fn application_row(app: &ResolvedApplication, color: bool) -> String {
    let release = &app.release;
    let values = [
        app.cluster.as_str(),
        release.namespace.as_str(),
        release.name.as_str(),
        release.chart_repo.as_str(),
        release.chart_name.as_str(),
        app.current_version.as_str(),
        app.latest_version.as_str(),
        release.status.as_str(),
    ];

    let mut cells: Vec<String> = values
        .iter()
        .zip(COLUMNS.iter())
        .map(|(value, (_, width))| format!("{:<width$}", truncate(value, *width), width = *width))
        .collect();

    let status = app.update_status();
    let (_, update_width) = COLUMNS[COLUMNS.len() - 1];
    let label = format!("{:<width$}", update_label(status), width = update_width);
    cells.push(
        label_style(status)
            .force_styling(color)
            .apply_to(label)
            .to_string(),
    );
    cells.push(truncate(&release.sources.join(", "), SOURCES_WIDTH));

    cells.join(COLUMN_SEPARATOR)
}

/// Number of applications with a newer chart available
pub fn count_updates(apps: &[ResolvedApplication]) -> usize {
    apps.iter()
        .filter(|app| app.update_status() == UpdateStatus::UpdateAvailable)
        .count()
}

/// Write the table and its summary
pub fn write_table<W: Write>(
    out: &mut W,
    apps: &[ResolvedApplication],
    color: bool,
) -> io::Result<()> {
    if apps.is_empty() {
        return writeln!(out, "No Helm applications found");
    }

    let rule = "=".repeat(RULE_WIDTH);
    let bold = Style::new().bold().force_styling(color);

    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", bold.apply_to(header_row()))?;
    writeln!(out, "{}", rule)?;

    for app in apps {
        writeln!(out, "{}", application_row(app, color))?;
    }

    writeln!(out)?;
    writeln!(out, "Total applications: {}", apps.len())?;
    writeln!(out, "Updates available: {}", count_updates(apps))?;
    Ok(())
}

/// Write the applications as a pretty-printed JSON array
pub fn write_json<W: Write>(out: &mut W, apps: &[ResolvedApplication]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, apps)?;
    writeln!(out)?;
    Ok(())
}

/// Print the report to stdout
pub fn print_results(apps: &[ResolvedApplication], json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        write_json(&mut out, apps)
    } else {
        write_table(&mut out, apps, console::colors_enabled())?;
        Ok(())
    }
}
