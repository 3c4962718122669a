// Aligned plain-text tables.

use std::io::Write;

use formdash_core::DashboardTable;

use super::{Column, RenderError, ReportRenderer};

/// Prints each sheet as a fixed-width table.
pub struct TextTable<W: Write> {
    out: W,
}

impl<W: Write> TextTable<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextTable<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ReportRenderer for TextTable<W> {
    fn render(&mut self, sheets: &[DashboardTable]) -> Result<(), RenderError> {
        for (i, sheet) in sheets.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            self.out.write_all(format_sheet(sheet).as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Format one sheet: a title line, a header row, a rule, then one line per
/// player. Text columns are left-aligned, numbers right-aligned.
pub fn format_sheet(sheet: &DashboardTable) -> String {
    let cells: Vec<Vec<String>> = sheet
        .rows
        .iter()
        .map(|row| Column::ALL.iter().map(|c| c.cell(row).display()).collect())
        .collect();

    let widths: Vec<usize> = Column::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.header().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| -> String {
        let mut parts = Vec::with_capacity(values.len());
        for ((value, column), &width) in values.iter().zip(Column::ALL).zip(&widths) {
            if column.is_text() {
                parts.push(format!("{value:<width$}"));
            } else {
                parts.push(format!("{value:>width$}"));
            }
        }
        parts.join("  ").trim_end().to_string()
    };

    let headers: Vec<String> = Column::ALL.iter().map(|c| c.header().to_string()).collect();
    let total_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

    let mut out = format!(
        "{} ({} players, {} significant)\n",
        sheet.position.display_str(),
        sheet.rows.len(),
        sheet.significant_count()
    );
    out.push_str(&line(&headers));
    out.push('\n');
    out.push_str(&"-".repeat(total_width));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}
