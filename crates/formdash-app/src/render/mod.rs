// Report rendering: the column model shared by every output format, the
// highlight rules applied to styled outputs, and the renderer trait.

pub mod html;
pub mod json;
pub mod text;

pub use html::HtmlWorkbook;
pub use json::JsonReport;
pub use text::TextTable;

use formdash_core::{ComparisonRow, DashboardTable, EffectSizeLabel};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write report output: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Something that turns finished dashboard tables into an output artifact.
pub trait ReportRenderer {
    fn render(&mut self, sheets: &[DashboardTable]) -> Result<(), RenderError>;
}

// ---------------------------------------------------------------------------
// Columns and cells
// ---------------------------------------------------------------------------

/// Dashboard columns in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    BaselineAppearances,
    BaselineMean,
    BaselineStd,
    CurrentAppearances,
    CurrentMean,
    EffectSize,
    StandardError,
    TStatistic,
    PValue,
    Significant,
    EffectLabel,
    Price,
    OpponentStrength,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::Name,
        Column::BaselineAppearances,
        Column::BaselineMean,
        Column::BaselineStd,
        Column::CurrentAppearances,
        Column::CurrentMean,
        Column::EffectSize,
        Column::StandardError,
        Column::TStatistic,
        Column::PValue,
        Column::Significant,
        Column::EffectLabel,
        Column::Price,
        Column::OpponentStrength,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Name => "Player",
            Column::BaselineAppearances => "Appearances (baseline)",
            Column::BaselineMean => "Mean pts - bonus (baseline)",
            Column::BaselineStd => "Std pts - bonus (baseline)",
            Column::CurrentAppearances => "Appearances (current)",
            Column::CurrentMean => "Mean pts - bonus (current)",
            Column::EffectSize => "Effect size",
            Column::StandardError => "SE",
            Column::TStatistic => "t",
            Column::PValue => "p-value",
            Column::Significant => "BH Stat Signf",
            Column::EffectLabel => "Effect size label",
            Column::Price => "Current Price (M)",
            Column::OpponentStrength => "Average opposition strength",
        }
    }

    pub fn cell(&self, row: &ComparisonRow) -> Cell {
        match self {
            Column::Name => Cell::Text(row.name.clone()),
            Column::BaselineAppearances => Cell::Count(Some(row.baseline_appearances)),
            Column::BaselineMean => Cell::Number(row.baseline_mean),
            Column::BaselineStd => Cell::Number(row.baseline_stdev),
            Column::CurrentAppearances => Cell::Count(row.current_appearances),
            Column::CurrentMean => Cell::Number(row.current_mean),
            Column::EffectSize => Cell::Number(row.effect_size),
            Column::StandardError => Cell::Number(row.standard_error),
            Column::TStatistic => Cell::Number(row.t_statistic),
            Column::PValue => Cell::Number(row.p_value),
            Column::Significant => Cell::Flag(row.significant),
            Column::EffectLabel => Cell::Label(row.effect_label),
            Column::Price => Cell::Number(row.current_price.unwrap_or(f64::NAN)),
            Column::OpponentStrength => {
                Cell::Number(row.avg_opponent_strength.unwrap_or(f64::NAN))
            }
        }
    }

    /// Text-like columns are left-aligned in plain-text output.
    pub fn is_text(&self) -> bool {
        matches!(self, Column::Name | Column::EffectLabel)
    }
}

/// One formatted table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Count(Option<u32>),
    Number(f64),
    Flag(bool),
    Label(Option<EffectSizeLabel>),
}

impl Cell {
    /// Export formatting: numbers rounded to 2 decimals, counts as integers,
    /// missing values of any kind shown as 0.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Count(n) => n.unwrap_or(0).to_string(),
            Cell::Number(v) => format_number(*v),
            Cell::Flag(true) => "True".to_string(),
            Cell::Flag(false) => "False".to_string(),
            Cell::Label(label) => label.map_or_else(|| "0".to_string(), |l| l.label().to_string()),
        }
    }

    /// Numeric value as displayed, so missing values read as 0.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Cell::Count(n) => Some(f64::from(n.unwrap_or(0))),
            Cell::Number(v) => Some(round2(*v)),
            _ => None,
        }
    }
}

/// Round to 2 decimals, mapping undefined values to 0.
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        let r = (value * 100.0).round() / 100.0;
        // Avoid printing "-0.00".
        if r == 0.0 {
            0.0
        } else {
            r
        }
    } else {
        0.0
    }
}

pub fn format_number(value: f64) -> String {
    format!("{:.2}", round2(value))
}

// ---------------------------------------------------------------------------
// Highlighting
// ---------------------------------------------------------------------------

pub const HIGHLIGHT_YELLOW: &str = "#ffffb3";
pub const POSITIVE_GREEN: &str = "forestgreen";
pub const NEGATIVE_RED: &str = "crimson";

/// Seven-step blue-green sequential palette, one colour per effect-size label.
pub const EFFECT_LABEL_PALETTE: [&str; 7] = [
    "#edf8fb", "#ccece6", "#99d8c9", "#66c2a4", "#41ae76", "#238b45", "#005824",
];

// Diverging green -> light -> red ramp used by `HighlightRule::Gradient`.
const GRADIENT_LOW: (u8, u8, u8) = (0x3a, 0x8c, 0x56);
const GRADIENT_MID: (u8, u8, u8) = (0xf2, 0xf2, 0xf2);
const GRADIENT_HIGH: (u8, u8, u8) = (0xd6, 0x4a, 0x5b);

/// Foreground and background colour for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub color: String,
    pub background: String,
}

impl Style {
    pub fn new(color: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            background: background.into(),
        }
    }

    pub fn css(&self) -> String {
        format!("color:{};background-color:{}", self.color, self.background)
    }
}

/// A rule deciding the style of cells in one or more columns.
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightRule {
    /// Fixed style on every cell of the listed columns.
    Static { columns: Vec<Column>, style: Style },
    /// Green when the row's effect size is >= 0, red otherwise.
    SignedEffect { column: Column },
    /// Green for a significant row, red otherwise.
    Significance { column: Column },
    /// One palette colour per effect-size label; rows without a label are
    /// left unstyled.
    EffectLabelPalette { column: Column },
    /// Diverging gradient scaled to the column's range within the table.
    Gradient { column: Column },
}

impl HighlightRule {
    /// The dashboard's standard highlighting.
    pub fn dashboard_rules() -> Vec<HighlightRule> {
        vec![
            HighlightRule::Static {
                columns: vec![Column::BaselineMean, Column::Price],
                style: Style::new("black", HIGHLIGHT_YELLOW),
            },
            HighlightRule::Gradient {
                column: Column::OpponentStrength,
            },
            HighlightRule::Significance {
                column: Column::Significant,
            },
            HighlightRule::SignedEffect {
                column: Column::CurrentMean,
            },
            HighlightRule::EffectLabelPalette {
                column: Column::EffectLabel,
            },
        ]
    }

    /// Style for cell (`row`, `column`) of `table`, if this rule covers it.
    pub fn style_for(&self, table: &DashboardTable, row: usize, column: Column) -> Option<Style> {
        let r = table.rows.get(row)?;
        match self {
            HighlightRule::Static { columns, style } => {
                columns.contains(&column).then(|| style.clone())
            }
            HighlightRule::SignedEffect { column: target } if *target == column => {
                Some(signed_style(round2(r.effect_size) >= 0.0))
            }
            HighlightRule::Significance { column: target } if *target == column => {
                Some(signed_style(r.significant))
            }
            HighlightRule::EffectLabelPalette { column: target } if *target == column => {
                let label = r.effect_label?;
                let text = if label.rank() == 0 { "black" } else { "white" };
                Some(Style::new(text, EFFECT_LABEL_PALETTE[label.rank()]))
            }
            HighlightRule::Gradient { column: target } if *target == column => {
                gradient_style(table, row, column)
            }
            _ => None,
        }
    }
}

/// Resolve a cell's style; later rules win when several match.
pub fn cell_style(
    rules: &[HighlightRule],
    table: &DashboardTable,
    row: usize,
    column: Column,
) -> Option<Style> {
    rules
        .iter()
        .filter_map(|rule| rule.style_for(table, row, column))
        .last()
}

fn signed_style(positive: bool) -> Style {
    Style::new(
        "white",
        if positive {
            POSITIVE_GREEN
        } else {
            NEGATIVE_RED
        },
    )
}

fn gradient_style(table: &DashboardTable, row: usize, column: Column) -> Option<Style> {
    let values: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|r| column.cell(r).numeric())
        .collect();
    let value = column.cell(table.rows.get(row)?).numeric()?;

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };

    let rgb = if t <= 0.5 {
        lerp_rgb(GRADIENT_LOW, GRADIENT_MID, t * 2.0)
    } else {
        lerp_rgb(GRADIENT_MID, GRADIENT_HIGH, (t - 0.5) * 2.0)
    };
    let text = if relative_luminance(rgb) < 0.408 {
        "white"
    } else {
        "black"
    };
    Some(Style::new(
        text,
        format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2),
    ))
}

fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// WCAG relative luminance of an sRGB colour.
fn relative_luminance(rgb: (u8, u8, u8)) -> f64 {
    let channel = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(rgb.0) + 0.7152 * channel(rgb.1) + 0.0722 * channel(rgb.2)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
