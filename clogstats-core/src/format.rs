//! Formatting helpers for terminal reports.

use crate::types::ActivityRecord;

/// Most active participants as `nick: count, nick: count`.
pub fn format_top_participants(record: &ActivityRecord, max: usize) -> String {
    record
        .top_participants(max)
        .iter()
        .map(|(nick, count)| format!("{}: {}", nick, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Align rows into columns like `column -t`.
///
/// The last column is never padded, so long trailing cells don't widen the table.
pub fn align_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            if col + 1 == columns {
                0
            } else {
                rows.iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            }
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
