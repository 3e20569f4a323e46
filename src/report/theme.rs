//! Color themes for the charts.
//!
//! The default is a dark neon look; a light theme suits printed reports.

use plotters::style::RGBColor;

/// Colors used when rendering a chart.
#[derive(Debug, Clone)]
pub struct ChartTheme {
    /// Plot background.
    pub background: RGBColor,
    /// Text, axes and legend borders.
    pub foreground: RGBColor,
    /// Mesh lines.
    pub grid: RGBColor,
    /// Series colors, cycled when there are more series than colors.
    pub palette: Vec<RGBColor>,
    /// Draw translucent halos under line series.
    pub glow: bool,
}

impl ChartTheme {
    /// Dark navy background with neon series.
    pub fn cyberpunk() -> Self {
        Self {
            background: RGBColor(0x21, 0x29, 0x46),
            foreground: RGBColor(0xE6, 0xE6, 0xE6),
            grid: RGBColor(0x2A, 0x34, 0x59),
            palette: vec![
                RGBColor(0x08, 0xF7, 0xFE), // Cyan
                RGBColor(0xFE, 0x53, 0xBB), // Pink
                RGBColor(0xF5, 0xD3, 0x00), // Yellow
                RGBColor(0x00, 0xFF, 0x41), // Green
                RGBColor(0xFF, 0x00, 0x00), // Red
                RGBColor(0x94, 0x67, 0xBD), // Purple
            ],
            glow: true,
        }
    }

    /// White background with the usual plotting palette.
    pub fn light() -> Self {
        Self {
            background: RGBColor(0xFF, 0xFF, 0xFF),
            foreground: RGBColor(0x00, 0x00, 0x00),
            grid: RGBColor(0xDD, 0xDD, 0xDD),
            palette: vec![
                RGBColor(31, 119, 180),  // Blue
                RGBColor(255, 127, 14),  // Orange
                RGBColor(44, 160, 44),   // Green
                RGBColor(214, 39, 40),   // Red
                RGBColor(148, 103, 189), // Purple
                RGBColor(140, 86, 75),   // Brown
            ],
            glow: false,
        }
    }

    /// Color for the `index`-th series. Falls back to the foreground color
    /// when the palette is empty.
    pub fn series_color(&self, index: usize) -> RGBColor {
        if self.palette.is_empty() {
            return self.foreground;
        }
        self.palette[index % self.palette.len()]
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::cyberpunk()
    }
}
