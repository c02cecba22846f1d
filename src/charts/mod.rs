//! PNG line charts over offsets.
mod format;
mod line;

#[cfg(test)]
mod tests;

pub use format::{format_ms_as_s, format_offset, format_plain};
pub use line::{
    AxisBounds, ChartSeries, LineChart, PALETTE, draw_line_chart, palette_color, parse_color,
};
