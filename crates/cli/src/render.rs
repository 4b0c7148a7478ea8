//! Text rendering of the resource table and summary cards.

use chrono::{DateTime, Utc};
use dash_core::dashboard::{ReadyView, LOADING_LABEL};
use dash_core::progress::{percent_label, text_bar};
use dash_core::{ResourceStats, SortColumn, SortSpec, TableView};
use ehr_resource::ResourceWrapper;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub const COLUMNS: [&str; 8] = [
    "Patient ID",
    "Resource Type",
    "Status",
    "Created",
    "Fetched",
    "Processed",
    "Description",
    "AI Summary",
];

/// Longest text cell, in characters, before it is cut with an ellipsis.
pub const TEXT_LIMIT: usize = 48;

pub const EMPTY_MESSAGE: &str = "No resource data available.";
pub const PENDING: &str = "Pending";
pub const NO_SUMMARY: &str = "No summary available";

const BAR_WIDTH: usize = 30;
const COLUMN_GAP: &str = "  ";

pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// `"Jan 15, 10:30 AM"`.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%b %-d, %I:%M %p").to_string()
}

pub fn row_cells(record: &ResourceWrapper) -> [String; 8] {
    let metadata = record.metadata();
    [
        metadata.identifier.patient_id.clone(),
        metadata.resource_type.clone(),
        metadata.state.label().to_string(),
        format_time(&metadata.created_time),
        format_time(&metadata.fetch_time),
        metadata
            .processed_time
            .as_ref()
            .map_or_else(|| PENDING.to_string(), format_time),
        truncate(record.description(), TEXT_LIMIT),
        truncate(record.ai_summary().unwrap_or(NO_SUMMARY), TEXT_LIMIT),
    ]
}

/// Column headers, with the active sort's direction marker.
pub fn header_cells(sort: Option<SortSpec>) -> [String; 8] {
    COLUMNS.map(|title| {
        let sorted = sort.filter(|spec| spec.column.header() == title);
        match sorted {
            Some(spec) => format!("{title} {}", spec.indicator()),
            None => title.to_string(),
        }
    })
}

/// Render any table state as terminal text.
pub fn render(view: &TableView<'_>) -> String {
    let lines = match view {
        TableView::Loading { progress } => vec![
            LOADING_LABEL.to_string(),
            format!(
                "{} {}",
                text_bar(f64::from(*progress), BAR_WIDTH),
                percent_label(f64::from(*progress))
            ),
        ],
        TableView::Error { message } => vec![
            format!("Error: {message}"),
            "Type 'retry' to try again.".to_string(),
        ],
        TableView::Ready(ready) => render_ready(ready),
    };
    lines.join("\n")
}

fn render_ready(view: &ReadyView<'_>) -> Vec<String> {
    let mut lines = vec![view.count_label()];
    if !view.query.is_empty() {
        lines.push(format!("Search: \"{}\"", view.query));
    }

    if view.is_empty() {
        lines.push(EMPTY_MESSAGE.to_string());
    } else {
        let header = header_cells(view.sort);
        let rows: Vec<[String; 8]> = view.rows.iter().map(|r| row_cells(r)).collect();

        let mut widths = header.clone().map(|cell| cell.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        lines.push(join_padded(&header, &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP),
        );

        let above = view.window.range.start;
        let below = view.page_rows - view.window.range.end;
        if above > 0 {
            lines.push(format!("  ⋮ {above} rows above"));
        }
        lines.extend(rows.iter().map(|row| join_padded(row, &widths)));
        if below > 0 {
            lines.push(format!("  ⋮ {below} rows below"));
        }
    }

    lines.push(footer(view));
    lines
}

fn join_padded(cells: &[String; 8], widths: &[usize; 8]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

fn footer(view: &ReadyView<'_>) -> String {
    let prev = if view.has_prev { "< prev" } else { "      " };
    let next = if view.has_next { "next >" } else { "      " };
    format!(
        "{prev}  {}  {next}   Rows per page: {}",
        view.page_label(),
        view.page_size
    )
}

pub fn render_stats(stats: &ResourceStats) -> String {
    [
        format!("Total Resources:  {}", stats.total),
        format!("Completed:        {}", stats.completed),
        format!("Processing:       {}", stats.processing),
        format!("Failed:           {}", stats.failed),
        format!("Not Started:      {}", stats.not_started),
        format!("Unique Patients:  {}", stats.unique_patients),
        format!("Success Rate:     {}%", stats.success_rate()),
    ]
    .join("\n")
}

/// Help text listing the sortable column names.
pub fn sort_columns_hint() -> String {
    SortColumn::ALL
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Percentage bar drawn on stderr while records load.
pub fn progress_bar(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_draw_target(ProgressDrawTarget::stderr());
    bar.set_style(
        ProgressStyle::with_template(":: {msg} [{bar:40}] {pos}% :: [{elapsed_precise}]")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(message);
    bar
}
