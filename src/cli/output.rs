//! Rendering of report rows for the terminal and for scripts.

use std::io::{self, Write};

use clap::ValueEnum;
use gradebook::Row;
use serde::Serialize;

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Writes each student as a `Name`/`ID`/`Total` block, as the shell does.
pub fn write_details<W: Write>(writer: &mut W, rows: &[Row<'_>]) -> io::Result<()> {
    for row in rows {
        writeln!(writer)?;
        writeln!(writer, "Name: {}", row.name)?;
        writeln!(writer, "ID: {}", row.id)?;
        writeln!(writer, "Total: {}", row.total)?;
    }
    Ok(())
}

/// Writes a numbered ranking, one student per line.
pub fn write_ranking<W: Write>(writer: &mut W, rows: &[Row<'_>]) -> io::Result<()> {
    writeln!(writer, "Ranking List:")?;
    for row in rows {
        writeln!(writer, "{}. {} (Total: {})", row.position, row.name, row.total)?;
    }
    Ok(())
}

/// Writes rows as an aligned table.
///
/// Narrow terminals get one compact line per student instead.
pub fn write_table<W: Write>(writer: &mut W, rows: &[Row<'_>], narrow: bool) -> io::Result<()> {
    if narrow {
        for row in rows {
            writeln!(writer, "{} {} {}", row.id, row.name, row.total)?;
        }
        return Ok(());
    }

    let headers = ["#", "ID", "NAME", "SCORES", "TOTAL", "STATUS"];
    let data: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.position.to_string(),
                row.id.to_string(),
                row.name.to_string(),
                row.scores
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
                row.total.to_string(),
                if row.failed { "FAIL" } else { "PASS" }.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for cells in &data {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_cells(writer, &headers.map(str::to_string), &widths)?;
    for cells in &data {
        write_cells(writer, cells, &widths)?;
    }
    Ok(())
}

fn write_cells<W: Write>(writer: &mut W, cells: &[String; 6], widths: &[usize; 6]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{}", line.trim_end())
}

/// Writes any serializable value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use gradebook::{Report, Store};

    use super::*;

    fn store() -> Store {
        let mut store = Store::new();
        store
            .add("Alice".parse().unwrap(), "S1".parse().unwrap(), vec![90.0, 55.0])
            .unwrap();
        store
            .add("Bob".parse().unwrap(), "S2".parse().unwrap(), vec![70.0, 80.0])
            .unwrap();
        store
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn details_blocks() {
        let store = store();
        let rows = Report::new(&store).listing();

        let text = render(|w| write_details(w, &rows));

        assert_eq!(
            text,
            "\nName: Alice\nID: S1\nTotal: 145\n\nName: Bob\nID: S2\nTotal: 150\n"
        );
    }

    #[test]
    fn ranking_lines() {
        let store = store();
        let report = Report::new(&store);
        let rows = report.rows(report.ranking(0));

        let text = render(|w| write_ranking(w, &rows));

        assert_eq!(
            text,
            "Ranking List:\n1. Bob (Total: 150)\n2. Alice (Total: 145)\n"
        );
    }

    #[test]
    fn table_is_aligned() {
        let store = store();
        let rows = Report::new(&store).listing();

        let text = render(|w| write_table(w, &rows, false));

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "#  ID  NAME   SCORES  TOTAL  STATUS");
        assert_eq!(lines[1], "1  S1  Alice  90 55   145    FAIL");
        assert_eq!(lines[2], "2  S2  Bob    70 80   150    PASS");
    }

    #[test]
    fn narrow_table_is_compact() {
        let store = store();
        let rows = Report::new(&store).listing();

        let text = render(|w| write_table(w, &rows, true));

        assert_eq!(text, "S1 Alice 145\nS2 Bob 150\n");
    }

    #[test]
    fn json_rows() {
        let store = store();
        let rows = Report::new(&store).listing();

        let text = render(|w| write_json(w, &rows));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["id"], "S1");
        assert_eq!(value[0]["failed"], true);
        assert_eq!(value[1]["total"], 150.0);
    }
}
