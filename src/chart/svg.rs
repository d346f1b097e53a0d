// SVG rendering of bar charts
// Author: Gabriel Demetrios Lafis

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use super::BarChart;
use crate::processing::ProcessingError;

const BACKGROUND: RGBColor = RGBColor(17, 17, 17);
const FOREGROUND: RGBColor = RGBColor(242, 245, 250);

/// Parse a `#RRGGBB` palette entry
fn hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

impl BarChart {
    /// Lowest and highest point of the stacked bars, padded, always
    /// including zero
    fn value_range(&self) -> (f64, f64) {
        let mut low = 0.0_f64;
        let mut high = 0.0_f64;
        for series in &self.series {
            let mut top = 0.0;
            for value in &series.values {
                top += value;
                low = low.min(top);
                high = high.max(top);
            }
        }

        let span = high - low;
        if span <= 0.0 {
            return (0.0, 1.0);
        }
        let pad = span * 0.1;
        (if low < 0.0 { low - pad } else { 0.0 }, if high > 0.0 { high + pad } else { 0.0 })
    }

    fn draw(
        &self,
        root: DrawingArea<SVGBackend<'_>, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
        root.fill(&BACKGROUND)?;

        let categories: Vec<&str> = self.series.iter().map(|s| s.category.as_str()).collect();
        let (low, high) = self.value_range();

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 22).into_font().color(&FOREGROUND))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0..categories.len().max(1)).into_segmented(), low..high)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len().max(1))
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) => {
                    categories.get(*i).map(|c| c.to_string()).unwrap_or_default()
                }
                _ => String::new(),
            })
            .x_desc(self.x.as_str())
            .y_desc(self.y.as_str())
            .label_style(("sans-serif", 12).into_font().color(&FOREGROUND))
            .axis_desc_style(("sans-serif", 14).into_font().color(&FOREGROUND))
            .draw()?;

        // One rectangle per value, stacked within its category
        for (i, series) in self.series.iter().enumerate() {
            let color = hex_color(&series.color).unwrap_or(FOREGROUND);
            let mut base = 0.0;
            chart.draw_series(series.values.iter().map(|value| {
                let bottom = base;
                base += value;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), bottom), (SegmentValue::Exact(i + 1), base)],
                    color.filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            }))?;
        }

        root.present()
    }

    /// Render the chart as an SVG document
    pub fn render_svg(&self) -> Result<String, ProcessingError> {
        let mut svg = String::new();
        let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
        self.draw(root)
            .map_err(|e| ProcessingError::Render(e.to_string()))?;
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::PALETTE;
    use crate::data::ingest;

    fn chart(csv: &[u8]) -> BarChart {
        let dataset = ingest(csv, "sales.csv").unwrap().unwrap();
        BarChart::build(&dataset, "region", "units").unwrap()
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(PALETTE[0]), Some(RGBColor(0x63, 0x6E, 0xFA)));
        assert_eq!(hex_color("636EFA"), None);
        assert_eq!(hex_color("#12345"), None);
        assert_eq!(hex_color("#GG0000"), None);
    }

    #[test]
    fn test_render_svg() {
        let svg = chart(b"region,units\nnorth,3\nsouth,5\nnorth,2\n")
            .render_svg()
            .unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("region vs units"));
        assert!(svg.contains("north"));
        assert!(svg.contains("south"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_value_range_covers_stacks() {
        let stacked = chart(b"region,units\nnorth,3\nsouth,5\nnorth,4\n");
        let (low, high) = stacked.value_range();
        assert_eq!(low, 0.0);
        assert!((high - 7.7).abs() < 1e-9);

        let negative = chart(b"region,units\nnorth,-2\nsouth,-2\n");
        let (low, high) = negative.value_range();
        assert!(low < -2.0);
        assert_eq!(high, 0.0);

        let empty = chart(b"region,units\n,4\n");
        assert_eq!(empty.value_range(), (0.0, 1.0));
    }

    #[test]
    fn test_render_without_bars() {
        let svg = chart(b"region,units\n,4\n").render_svg().unwrap();
        assert!(svg.contains("region vs units"));
    }
}
