// Styled HTML workbook: one section ("sheet") per position.

use std::fs;
use std::path::{Path, PathBuf};

use formdash_core::DashboardTable;
use tracing::info;

use super::{cell_style, Column, HighlightRule, RenderError, ReportRenderer};

/// Writes every sheet into a single self-contained HTML file.
#[derive(Debug, Clone)]
pub struct HtmlWorkbook {
    path: PathBuf,
    rules: Vec<HighlightRule>,
}

impl HtmlWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rules: HighlightRule::dashboard_rules(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<HighlightRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportRenderer for HtmlWorkbook {
    fn render(&mut self, sheets: &[DashboardTable]) -> Result<(), RenderError> {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        let html = render_document(sheets, &self.rules, &generated);

        let io_err = |e: std::io::Error| RenderError::Io {
            path: self.path.display().to_string(),
            source: e,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(&self.path, html).map_err(io_err)?;
        info!("wrote workbook with {} sheets to {}", sheets.len(), self.path.display());
        Ok(())
    }
}

/// Build the full HTML document.
pub fn render_document(sheets: &[DashboardTable], rules: &[HighlightRule], generated: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Player Analysis Dashboard</title>\n");
    out.push_str(
        "<style>\n\
         body { font-family: sans-serif; }\n\
         table { border-collapse: collapse; margin-bottom: 2em; }\n\
         th, td { border: 1px solid #ccc; padding: 2px 6px; }\n\
         td.num { text-align: right; }\n\
         nav a { margin-right: 1em; }\n\
         </style>\n",
    );
    out.push_str("</head>\n<body>\n<h1>Player Analysis Dashboard</h1>\n");
    out.push_str(&format!("<p>Generated {}</p>\n", escape(generated)));

    out.push_str("<nav>");
    for sheet in sheets {
        let tag = sheet.position.display_str();
        out.push_str(&format!("<a href=\"#{tag}\">{tag}</a>"));
    }
    out.push_str("</nav>\n");

    for sheet in sheets {
        render_sheet(&mut out, sheet, rules);
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn render_sheet(out: &mut String, sheet: &DashboardTable, rules: &[HighlightRule]) {
    let tag = sheet.position.display_str();
    out.push_str(&format!("<h2 id=\"{tag}\">{tag}</h2>\n<table>\n<thead><tr>"));
    for column in Column::ALL {
        out.push_str(&format!("<th>{}</th>", escape(column.header())));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for (i, row) in sheet.rows.iter().enumerate() {
        out.push_str("<tr>");
        for column in Column::ALL {
            let text = escape(&column.cell(row).display());
            let class = if column.is_text() { "" } else { " class=\"num\"" };
            match cell_style(rules, sheet, i, column) {
                Some(style) => {
                    out.push_str(&format!("<td{class} style=\"{}\">{text}</td>", style.css()))
                }
                None => out.push_str(&format!("<td{class}>{text}</td>")),
            }
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{row, sample_table};
    use crate::render::{HIGHLIGHT_YELLOW, NEGATIVE_RED};
    use formdash_core::Position;

    #[test]
    fn document_has_one_section_per_sheet() {
        let gk = DashboardTable {
            position: Position::Goalkeeper,
            rows: vec![row("Keeper")],
        };
        let html = render_document(
            &[gk, sample_table()],
            &HighlightRule::dashboard_rules(),
            "2024-01-01 12:00",
        );

        assert!(html.contains("<h2 id=\"GK\">GK</h2>"));
        assert!(html.contains("<h2 id=\"MID\">MID</h2>"));
        assert!(html.find("id=\"GK\"").unwrap() < html.find("id=\"MID\"").unwrap());
        assert!(html.contains("Generated 2024-01-01 12:00"));
        assert!(html.contains("<th>BH Stat Signf</th>"));
        assert_eq!(html.matches("<table>").count(), 2);
        assert_eq!(html.matches("<tr>").count(), 2 + 1 + 3);
    }

    #[test]
    fn styled_cells_carry_inline_css() {
        let html = render_document(&[sample_table()], &HighlightRule::dashboard_rules(), "now");
        assert!(html.contains(&format!(
            "style=\"color:black;background-color:{HIGHLIGHT_YELLOW}\">5.12</td>"
        )));
        assert!(html.contains(&format!(
            "style=\"color:white;background-color:{NEGATIVE_RED}\">2.00</td>"
        )));
        // Name cells are never styled.
        assert!(html.contains("<td>Steady</td>"));
    }

    #[test]
    fn names_are_escaped() {
        let table = DashboardTable {
            position: Position::Defender,
            rows: vec![row("Gabriel <Dos> O'Brien & Co")],
        };
        let html = render_document(&[table], &[], "now");
        assert!(html.contains("Gabriel &lt;Dos&gt; O&#39;Brien &amp; Co"));
        assert!(!html.contains("<Dos>"));
    }

    #[test]
    fn render_writes_file() {
        let tmp = std::env::temp_dir().join("formdash_html_workbook");
        let _ = fs::remove_dir_all(&tmp);
        let path = tmp.join("nested").join("book.html");

        let mut workbook = HtmlWorkbook::new(&path);
        workbook.render(&[sample_table()]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.contains("Slumping"));

        let _ = fs::remove_dir_all(&tmp);
    }
}
