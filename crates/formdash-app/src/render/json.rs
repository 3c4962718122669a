// Machine-readable output: the sheets as a JSON array.

use std::io::Write;

use formdash_core::DashboardTable;

use super::{RenderError, ReportRenderer};

/// Serializes the raw (unrounded) tables. Undefined statistics become `null`.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonReport<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ReportRenderer for JsonReport<W> {
    fn render(&mut self, sheets: &[DashboardTable]) -> Result<(), RenderError> {
        serde_json::to_writer_pretty(&mut self.out, sheets)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_table;

    #[test]
    fn sheets_serialize_with_nulls_for_undefined_values() {
        let mut report = JsonReport::new(Vec::new());
        report.render(&[sample_table()]).unwrap();
        let bytes = report.into_inner();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let sheets = value.as_array().unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0]["position"], "Midfielder");

        let rows = sheets[0]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["name"], "Steady");
        assert_eq!(rows[0]["effect_label"], "Small");
        assert_eq!(rows[1]["effect_label"], "Large");
        assert_eq!(rows[1]["significant"], true);

        let absent = &rows[2];
        assert!(absent["current_mean"].is_null());
        assert!(absent["p_value"].is_null());
        assert!(absent["current_appearances"].is_null());
        assert!(absent["effect_label"].is_null());
        assert!(absent["current_price"].is_null());
    }
}
