//! Static Chart Renderer
//! Draws the dashboard figures off-screen with plotters and encodes them as PNG
//! for the slide report.

use super::palette::{self, BRAND};
use crate::stats::{BoxStats, CorrelationMatrix, CountEntry, Histogram, ScatterPoint};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use thiserror::Error;

/// Default figure size in pixels (16:9, fits half a slide).
pub const FIGURE_SIZE: (u32, u32) = (1000, 560);

const FONT: &str = "sans-serif";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to plot for '{0}'")]
    Empty(String),

    #[error("Chart drawing failed: {0}")]
    Drawing(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render into an RGB buffer and return PNG bytes.
    fn render<F>(size: (u32, u32), draw: F) -> Result<Vec<u8>, RenderError>
    where
        F: FnOnce(&Area<'_>) -> Result<(), RenderError>,
    {
        let (width, height) = size;
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;
            draw(&root)?;
            root.present().map_err(drawing)?;
        }
        Self::encode_png(width, height, buffer)
    }

    /// Encode a raw RGB buffer as PNG.
    pub fn encode_png(width: u32, height: u32, rgb: Vec<u8>) -> Result<Vec<u8>, RenderError> {
        let img = RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| RenderError::Drawing("pixel buffer does not match image size".into()))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Range covering `values` with 5% padding on each side.
    pub fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        let (lo, hi) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            return None;
        }
        let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
        Some((lo - pad, hi + pad))
    }

    /// Horizontal bars, first entry on top.
    pub fn bar_chart(
        title: &str,
        entries: &[CountEntry],
        value_label: &str,
    ) -> Result<Vec<u8>, RenderError> {
        if entries.is_empty() {
            return Err(RenderError::Empty(title.to_string()));
        }

        let n = entries.len() as i32;
        let max = entries.iter().map(|e| e.count).max().unwrap_or(1) as f64;
        let min = entries.iter().map(|e| e.count).min().unwrap_or(0) as f64;

        Self::render(FIGURE_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, (FONT, 28))
                .margin(16)
                .x_label_area_size(40)
                .y_label_area_size(220)
                .build_cartesian_2d(0.0..max * 1.08, (0..n).into_segmented())
                .map_err(drawing)?;

            let label_of = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(y) => entries
                    .get((n - 1 - y) as usize)
                    .map(|e| e.label.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            };

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(entries.len())
                .y_label_formatter(&label_of)
                .x_desc(value_label)
                .label_style((FONT, 15))
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(entries.iter().enumerate().map(|(i, e)| {
                    let y = n - 1 - i as i32;
                    let color = palette::scaled(e.count as f64, min, max).to_plotters();
                    let mut bar = Rectangle::new(
                        [
                            (0.0, SegmentValue::Exact(y)),
                            (e.count as f64, SegmentValue::Exact(y + 1)),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(4, 4, 0, 0);
                    bar
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Donut chart with percentage labels.
    pub fn donut_chart(title: &str, entries: &[CountEntry], hole: f64) -> Result<Vec<u8>, RenderError> {
        let sizes: Vec<f64> = entries.iter().map(|e| e.count as f64).collect();
        if sizes.iter().sum::<f64>() <= 0.0 {
            return Err(RenderError::Empty(title.to_string()));
        }
        let colors: Vec<RGBColor> = (0..entries.len())
            .map(|i| palette::categorical(i).to_plotters())
            .collect();
        let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();

        Self::render(FIGURE_SIZE, |root| {
            let area = root.titled(title, (FONT, 28)).map_err(drawing)?;
            let (w, h) = area.dim_in_pixel();
            let center = (w as i32 / 2, h as i32 / 2);
            let radius = w.min(h) as f64 * 0.36;

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.start_angle(-90.0);
            pie.donut_hole(radius * hole);
            pie.label_style((FONT, 16).into_font().color(&BLACK));
            pie.percentages((FONT, 14).into_font().color(&WHITE));
            area.draw(&pie).map_err(drawing)?;
            Ok(())
        })
    }

    /// Histogram of equal-width bins.
    pub fn histogram_chart(
        title: &str,
        histogram: Option<&Histogram>,
        x_label: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let Some(h) = histogram else {
            return Err(RenderError::Empty(title.to_string()));
        };
        let (x_min, x_max) = (h.min, h.max());
        let y_max = h.counts.iter().copied().max().unwrap_or(1).max(1) as f64;

        Self::render(FIGURE_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, (FONT, 28))
                .margin(16)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.08)
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(x_label)
                .y_desc("Frequency")
                .label_style((FONT, 15))
                .draw()
                .map_err(drawing)?;

            let color = palette::PALETTE[1].to_plotters();
            chart
                .draw_series(h.counts.iter().enumerate().map(|(i, &count)| {
                    let (lo, hi) = h.bin_edges(i);
                    let mut bar = Rectangle::new([(lo, 0.0), (hi, count as f64)], color.filled());
                    bar.set_margin(0, 0, 1, 1);
                    bar
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Cost vs rating bubbles, radius and color by votes.
    pub fn scatter_chart(title: &str, points: &[ScatterPoint]) -> Result<Vec<u8>, RenderError> {
        let (Some((x_min, x_max)), Some((y_min, y_max))) = (
            Self::padded_range(points.iter().map(|p| p.cost)),
            Self::padded_range(points.iter().map(|p| p.rate)),
        ) else {
            return Err(RenderError::Empty(title.to_string()));
        };
        let max_votes = points.iter().map(|p| p.votes).fold(0.0, f64::max).max(1.0);

        Self::render(FIGURE_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, (FONT, 28))
                .margin(16)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .x_desc("Cost for two (INR)")
                .y_desc("Rating")
                .label_style((FONT, 15))
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(points.iter().map(|p| {
                    let t = (p.votes / max_votes).sqrt();
                    let radius = (2.0 + t * 14.0) as i32;
                    let color = palette::sequential(t).to_plotters();
                    Circle::new((p.cost, p.rate), radius, color.mix(0.45).filled())
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Correlation heat-map with the coefficient printed in each cell.
    pub fn heatmap_chart(title: &str, matrix: &CorrelationMatrix) -> Result<Vec<u8>, RenderError> {
        let k = matrix.labels.len() as i32;
        if k == 0 || matrix.values.iter().flatten().all(Option::is_none) {
            return Err(RenderError::Empty(title.to_string()));
        }

        Self::render((800, 640), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, (FONT, 28))
                .margin(16)
                .x_label_area_size(45)
                .y_label_area_size(140)
                .build_cartesian_2d((0..k).into_segmented(), (0..k).into_segmented())
                .map_err(drawing)?;

            let x_label = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(c) => matrix.labels.get(*c as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            };
            let y_label = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(y) => matrix
                    .labels
                    .get((k - 1 - y) as usize)
                    .cloned()
                    .unwrap_or_default(),
                _ => String::new(),
            };

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(matrix.labels.len())
                .y_labels(matrix.labels.len())
                .x_label_formatter(&x_label)
                .y_label_formatter(&y_label)
                .label_style((FONT, 16))
                .draw()
                .map_err(drawing)?;

            let cells: Vec<(i32, i32, Option<f64>)> = matrix
                .values
                .iter()
                .enumerate()
                .flat_map(|(r, row)| {
                    row.iter()
                        .enumerate()
                        .map(move |(c, v)| (c as i32, k - 1 - r as i32, *v))
                })
                .collect();

            chart
                .draw_series(cells.iter().map(|&(c, y, v)| {
                    let fill = v
                        .map(|r| palette::diverging(r).to_plotters())
                        .unwrap_or(RGBColor(200, 200, 200));
                    Rectangle::new(
                        [
                            (SegmentValue::Exact(c), SegmentValue::Exact(y)),
                            (SegmentValue::Exact(c + 1), SegmentValue::Exact(y + 1)),
                        ],
                        fill.filled(),
                    )
                }))
                .map_err(drawing)?;

            let style = TextStyle::from((FONT, 22).into_font())
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart
                .draw_series(cells.iter().map(|&(c, y, v)| {
                    Text::new(
                        v.map(|r| format!("{:.3}", r)).unwrap_or_else(|| "n/a".into()),
                        (SegmentValue::CenterOf(c), SegmentValue::CenterOf(y)),
                        style.clone(),
                    )
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Box plots with 1.5 IQR whiskers, outliers and mean markers.
    pub fn box_chart(title: &str, boxes: &[BoxStats], y_label: &str) -> Result<Vec<u8>, RenderError> {
        let Some((y_min, y_max)) = Self::padded_range(
            boxes
                .iter()
                .flat_map(|b| [b.whisker_low, b.whisker_high].into_iter().chain(b.outliers.iter().copied())),
        ) else {
            return Err(RenderError::Empty(title.to_string()));
        };
        let n = boxes.len();

        Self::render(FIGURE_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, (FONT, 28))
                .margin(16)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(-0.5..n as f64 - 0.5, y_min..y_max)
                .map_err(drawing)?;

            let label_of = |v: &f64| {
                let idx = v.round();
                if (v - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                boxes.get(idx as usize).map(|b| b.label.clone()).unwrap_or_default()
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&label_of)
                .y_desc(y_label)
                .label_style((FONT, 15))
                .draw()
                .map_err(drawing)?;

            for (i, b) in boxes.iter().enumerate() {
                let x = i as f64;
                let color = palette::categorical(i).to_plotters();
                let line = color.stroke_width(2);

                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x - 0.25, b.q1), (x + 0.25, b.q3)],
                        color.mix(0.35).filled(),
                    )))
                    .map_err(drawing)?;
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x - 0.25, b.q1), (x + 0.25, b.q3)],
                        line,
                    )))
                    .map_err(drawing)?;
                chart
                    .draw_series(
                        [
                            vec![(x - 0.25, b.median), (x + 0.25, b.median)],
                            vec![(x, b.whisker_low), (x, b.q1)],
                            vec![(x, b.q3), (x, b.whisker_high)],
                            vec![(x - 0.1, b.whisker_low), (x + 0.1, b.whisker_low)],
                            vec![(x - 0.1, b.whisker_high), (x + 0.1, b.whisker_high)],
                        ]
                        .into_iter()
                        .map(|path| PathElement::new(path, line)),
                    )
                    .map_err(drawing)?;
                chart
                    .draw_series(b.outliers.iter().map(|&v| Circle::new((x, v), 2, color.filled())))
                    .map_err(drawing)?;
                chart
                    .draw_series(std::iter::once(Circle::new((x, b.mean), 5, BRAND.to_plotters().filled())))
                    .map_err(drawing)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_signature() {
        let png = StaticChartRenderer::encode_png(2, 2, vec![255u8; 12]).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        let err = StaticChartRenderer::encode_png(4, 4, vec![0u8; 10]).unwrap_err();
        assert!(matches!(err, RenderError::Drawing(_)));
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = StaticChartRenderer::padded_range([1.0, 3.0, f64::NAN].into_iter()).unwrap();
        assert!((lo - 0.9).abs() < 1e-9);
        assert!((hi - 3.1).abs() < 1e-9);

        let (lo, hi) = StaticChartRenderer::padded_range([2.0].into_iter()).unwrap();
        assert_eq!((lo, hi), (1.5, 2.5));

        assert!(StaticChartRenderer::padded_range(std::iter::empty()).is_none());
    }

    #[test]
    fn test_empty_inputs_are_reported() {
        assert!(matches!(
            StaticChartRenderer::bar_chart("Cuisines", &[], "Count"),
            Err(RenderError::Empty(t)) if t == "Cuisines"
        ));
        assert!(matches!(
            StaticChartRenderer::histogram_chart("Ratings", None, "Rating"),
            Err(RenderError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::scatter_chart("Cost", &[]),
            Err(RenderError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::box_chart("Boxes", &[], "Rating"),
            Err(RenderError::Empty(_))
        ));
    }

    #[test]
    fn test_bar_chart_renders_png_at_figure_size() {
        let entries = vec![
            CountEntry { label: "BTM".into(), count: 12 },
            CountEntry { label: "HSR".into(), count: 7 },
            CountEntry { label: "Koramangala 5th Block".into(), count: 3 },
        ];
        let png = StaticChartRenderer::bar_chart("Top locations", &entries, "Restaurants").unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), FIGURE_SIZE);
    }
}
