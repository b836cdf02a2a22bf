use crate::task::Task;
use chrono::{DateTime, Utc};

const HEADERS: [&str; 5] = ["ID", "Description", "Status", "Created", "Updated"];
const SEPARATOR: &str = " | ";

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Renders tasks as a pipe-separated table, each column padded to its widest cell.
pub fn render(tasks: &[Task]) -> String {
    let rows: Vec<[String; 5]> = tasks
        .iter()
        .map(|task| {
            [
                task.id().to_string(),
                task.description().to_string(),
                task.status().to_string(),
                format_timestamp(task.created_at()),
                format_timestamp(task.updated_at()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
            .trim_end()
            .to_string()
    };

    let rule_width = widths.iter().sum::<usize>() + SEPARATOR.len() * (widths.len() - 1);
    let mut lines = vec![format_row(&HEADERS), "-".repeat(rule_width)];
    lines.extend(
        rows.iter()
            .map(|row| format_row(&row.each_ref().map(String::as_str))),
    );
    lines.join("\n")
}
