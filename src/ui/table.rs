//! Plain-text rendering of the customer list and status line.

use crate::application::{DeskView, Status, StatusLevel};
use crate::domain::{CustomerRecord, Summary};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

const HEADERS: [&str; 4] = ["Daily #", "Customer ID", "Name", "Created"];

pub fn render_rows(out: &mut impl Write, rows: &[CustomerRecord]) -> io::Result<()> {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.sequence_label(),
                row.id.clone(),
                row.name.clone(),
                row.created_at.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.width());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    write_line(out, &HEADERS.map(String::from), &widths)?;
    let rule = widths.map(|w| "-".repeat(w));
    write_line(out, &rule, &widths)?;
    for row in &cells {
        write_line(out, row, &widths)?;
    }
    Ok(())
}

fn write_line(out: &mut impl Write, cells: &[String; 4], widths: &[usize; 4]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

// Pads to terminal columns; combining marks take no column of their own.
fn pad(cell: &str, width: usize) -> String {
    format!("{cell}{}", " ".repeat(width.saturating_sub(cell.width())))
}

pub fn render_summary(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    writeln!(out, "Total: {}  Today: {}", summary.total, summary.today)
}

pub fn render_status(out: &mut impl Write, status: &Status) -> io::Result<()> {
    let prefix = match status.level {
        StatusLevel::Info => "info",
        StatusLevel::Success => "ok",
        StatusLevel::Warning => "warning",
        StatusLevel::Error => "error",
    };
    writeln!(out, "{prefix}: {}", status.message)
}

pub fn render_view(out: &mut impl Write, view: &DeskView) -> io::Result<()> {
    render_summary(out, &view.summary)?;
    if !view.rows.is_empty() {
        render_rows(out, &view.rows)?;
    }
    render_status(out, &view.status)
}

pub fn render_added(out: &mut impl Write, customer: &CustomerRecord) -> io::Result<()> {
    writeln!(
        out,
        "Customer '{}' has been added successfully!",
        customer.name
    )?;
    writeln!(out, "  Customer ID:  {}", customer.id)?;
    writeln!(out, "  Daily Number: {}", customer.sequence_label())?;
    writeln!(out, "  Date:         {}", customer.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seq: i64, id: &str, name: &str) -> CustomerRecord {
        CustomerRecord {
            id: id.into(),
            name: name.into(),
            created_at: "2024-06-01 09:00:00".into(),
            daily_sequence: seq,
            date_added: "2024-06-01".into(),
        }
    }

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_rows_aligns_columns() {
        let rows = vec![
            record(2, "ZX81AB00", "Bartholomew"),
            record(1, "AB12CD34", "Al"),
            record(0, "LEGACY01", "Old"),
        ];
        let text = rendered(|out| render_rows(out, &rows));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Daily #  Customer ID  Name         Created");
        assert_eq!(lines[2], "#02      ZX81AB00     Bartholomew  2024-06-01 09:00:00");
        assert_eq!(lines[3], "#01      AB12CD34     Al           2024-06-01 09:00:00");
        assert!(lines[4].starts_with("#00 "));
    }

    #[test]
    fn test_render_rows_aligns_combining_marks() {
        // The al-lakuna signs are combining marks with no width of their own.
        let rows = vec![
            record(1, "AB12CD34", "සමන්ත් කමල්"),
            record(2, "EF56GH78", "Anne"),
        ];
        let text = rendered(|out| render_rows(out, &rows));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[2].width(), lines[3].width());
        assert_eq!(lines[3], "#02      EF56GH78     Anne      2024-06-01 09:00:00");
    }

    #[test]
    fn test_render_view_empty_rows() {
        let view = DeskView {
            rows: vec![],
            summary: Summary { total: 5, today: 0 },
            status: Status::new(StatusLevel::Info, "No customers added today yet."),
        };
        let text = rendered(|out| render_view(out, &view));
        assert_eq!(text, "Total: 5  Today: 0\ninfo: No customers added today yet.\n");
    }

    #[test]
    fn test_render_added() {
        let text = rendered(|out| render_added(out, &record(7, "AB12CD34", "Kasun")));
        assert!(text.starts_with("Customer 'Kasun' has been added successfully!"));
        assert!(text.contains("Daily Number: #07"));
    }
}
