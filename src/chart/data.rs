//! Decides whether a chart has anything to plot.

use crate::aggregation::CategoryTotals;

/// The colours used for the chart series, in order.
///
/// The legend on the charts page uses the same colours, so both read from here.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (0x36, 0x7f, 0xe3),
    (0xe3, 0x5d, 0x4c),
    (0x4c, 0xb0, 0x5a),
    (0xf2, 0xa9, 0x2e),
    (0x8e, 0x5c, 0xd9),
    (0x2e, 0xb8, 0xb8),
    (0xd9, 0x5c, 0xa8),
    (0x7a, 0x86, 0x99),
    (0xb8, 0x8a, 0x2e),
    (0x5c, 0x6b, 0xd9),
];

/// The palette colour for the series at `index`, wrapping around when
/// there are more series than colours.
pub fn palette_colour(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

/// The palette colour at `index` as a CSS hex string, e.g. "#367fe3".
pub fn palette_hex(index: usize) -> String {
    let (red, green, blue) = palette_colour(index);
    format!("#{red:02x}{green:02x}{blue:02x}")
}

/// The kinds of chart image that can be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

/// What a chart should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// There is nothing to plot, a placeholder is shown instead.
    NoData,
    /// One value per label, in the same order.
    Series {
        labels: Vec<String>,
        values: Vec<f64>,
    },
}

impl ChartData {
    /// Build chart data from category totals, keeping their sorted order.
    pub fn from_totals(totals: &CategoryTotals) -> Self {
        if totals.is_empty() {
            return Self::NoData;
        }

        let (labels, values) = totals
            .iter()
            .map(|(label, value)| (label.clone(), *value))
            .unzip();

        Self::Series { labels, values }
    }

    /// The labels to show in the legend, empty when there is no data.
    pub fn labels(&self) -> &[String] {
        match self {
            Self::NoData => &[],
            Self::Series { labels, .. } => labels,
        }
    }
}
