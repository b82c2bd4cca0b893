//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use super::palette::{self, BRAND};
use crate::stats::{
    BoxStats, CorrelationMatrix, CountEntry, Histogram, LocationProfile, RestaurantSummary,
    ScatterPoint, ServiceComparison,
};
use egui::{Color32, RichText};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoint, PlotPoints, Points,
    Polygon, Text,
};
use std::f64::consts::TAU;

/// Scatter points are bucketed into this many marker sizes.
const SIZE_CLASSES: usize = 5;

/// Creates the dashboard figures using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    fn format_count(v: f64) -> String {
        format!("{:.0}", v)
    }

    /// Horizontal bar chart, most frequent entry on top, colored by count.
    pub fn draw_horizontal_bars(
        ui: &mut egui::Ui,
        id: &str,
        entries: &[CountEntry],
        value_label: &str,
        height: f32,
    ) {
        if entries.is_empty() {
            Self::draw_empty(ui, height);
            return;
        }

        let n = entries.len();
        let max = entries.iter().map(|e| e.count).max().unwrap_or(1) as f64;
        let min = entries.iter().map(|e| e.count).min().unwrap_or(0) as f64;

        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let color = palette::scaled(e.count as f64, min, max).to_egui();
                Bar::new((n - 1 - i) as f64, e.count as f64)
                    .name(&e.label)
                    .fill(color)
                    .width(0.7)
            })
            .collect();

        let labels: Vec<String> = entries.iter().rev().map(|e| e.label.clone()).collect();

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_grid([true, false])
            .x_axis_label(value_label)
            .y_axis_min_width(140.0)
            .include_x(0.0)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .element_formatter(Box::new(|bar, _chart| {
                            format!("{}: {}", bar.name, Self::format_count(bar.value))
                        })),
                );
            });
    }

    /// Donut chart built from polygon wedges, with a legend.
    pub fn draw_donut(ui: &mut egui::Ui, id: &str, entries: &[CountEntry], hole: f64, height: f32) {
        let total: usize = entries.iter().map(|e| e.count).sum();
        if total == 0 {
            Self::draw_empty(ui, height);
            return;
        }

        Plot::new(id)
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut start = 0.0;
                for (i, e) in entries.iter().enumerate() {
                    let share = e.count as f64 / total as f64;
                    let end = start + share * TAU;
                    let color = palette::categorical(i).to_egui();

                    let name = format!("{} ({})", e.label, e.count);
                    for (k, piece) in Self::wedge(start, end, hole).into_iter().enumerate() {
                        // Polygon only fills convex shapes, so the ring is drawn piecewise.
                        let mut polygon = Polygon::new(PlotPoints::new(piece))
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(egui::Stroke::new(0.5, color.gamma_multiply(0.85)));
                        if k == 0 {
                            polygon = polygon.name(&name);
                        }
                        plot_ui.polygon(polygon);
                    }

                    if share >= 0.04 {
                        let mid = (start + end) / 2.0;
                        let r = (1.0 + hole) / 2.0;
                        plot_ui.text(Text::new(
                            PlotPoint::new(r * mid.cos(), r * mid.sin()),
                            RichText::new(format!("{:.1}%", share * 100.0))
                                .size(11.0)
                                .color(Color32::WHITE),
                        ));
                    }
                    start = end;
                }
            });
    }

    /// Ring segment between two angles (radians, counter-clockwise from +x),
    /// split into convex quads, or triangles when there is no hole.
    pub fn wedge(start: f64, end: f64, hole: f64) -> Vec<Vec<[f64; 2]>> {
        let steps = (((end - start) / TAU) * 120.0).ceil().max(2.0) as usize;
        let point = |radius: f64, s: usize| {
            let a = start + (end - start) * s as f64 / steps as f64;
            [radius * a.cos(), radius * a.sin()]
        };

        (0..steps)
            .map(|s| {
                if hole > 0.0 {
                    vec![point(1.0, s), point(1.0, s + 1), point(hole, s + 1), point(hole, s)]
                } else {
                    vec![point(1.0, s), point(1.0, s + 1), [0.0, 0.0]]
                }
            })
            .collect()
    }

    /// Rating histogram.
    pub fn draw_histogram(ui: &mut egui::Ui, id: &str, histogram: Option<&Histogram>, height: f32) {
        let Some(h) = histogram else {
            Self::draw_empty(ui, height);
            return;
        };

        let bars: Vec<Bar> = h
            .counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let (lo, hi) = h.bin_edges(i);
                Bar::new((lo + hi) / 2.0, count as f64)
                    .width(h.bin_width * 0.95)
                    .fill(palette::PALETTE[1].to_egui())
                    .name(format!("{:.2} - {:.2}", lo, hi))
            })
            .collect();

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label("Rating")
            .y_axis_label("Frequency")
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Restaurants"));
            });
    }

    /// Cost vs rating bubble chart, marker size and color by votes.
    pub fn draw_scatter(ui: &mut egui::Ui, id: &str, points: &[ScatterPoint], height: f32) {
        if points.is_empty() {
            Self::draw_empty(ui, height);
            return;
        }

        let max_votes = points.iter().map(|p| p.votes).fold(0.0, f64::max).max(1.0);
        let mut classes: Vec<Vec<[f64; 2]>> = vec![Vec::new(); SIZE_CLASSES];
        for p in points {
            let t = (p.votes / max_votes).sqrt();
            let class = ((t * SIZE_CLASSES as f64) as usize).min(SIZE_CLASSES - 1);
            classes[class].push([p.cost, p.rate]);
        }

        Plot::new(id)
            .height(height)
            .x_axis_label("Cost for two (INR)")
            .y_axis_label("Rating")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (class, pts) in classes.into_iter().enumerate() {
                    if pts.is_empty() {
                        continue;
                    }
                    let t = (class as f64 + 0.5) / SIZE_CLASSES as f64;
                    let upper = (t * t * max_votes).round();
                    plot_ui.points(
                        Points::new(PlotPoints::new(pts))
                            .radius(2.0 + class as f32 * 2.0)
                            .color(palette::sequential(t).to_egui().gamma_multiply(0.7))
                            .name(format!("~{} votes", upper)),
                    );
                }
            });
    }

    /// Box plots side by side, one per group, with mean markers.
    pub fn draw_box_plots(ui: &mut egui::Ui, id: &str, boxes: &[BoxStats], height: f32) {
        if boxes.is_empty() {
            Self::draw_empty(ui, height);
            return;
        }

        let labels: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Rating")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (i, b) in boxes.iter().enumerate() {
                    let color = palette::categorical(i).to_egui();
                    let elem = BoxElem::new(
                        i as f64,
                        BoxSpread::new(b.whisker_low, b.q1, b.median, b.q3, b.whisker_high),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color))
                    .name(format!("{} (n={})", b.label, b.count));
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.label));

                    if !b.outliers.is_empty() {
                        let pts: Vec<[f64; 2]> = b.outliers.iter().map(|&v| [i as f64, v]).collect();
                        plot_ui.points(Points::new(PlotPoints::new(pts)).radius(2.0).color(color));
                    }

                    plot_ui.points(
                        Points::new(PlotPoints::new(vec![[i as f64, b.mean]]))
                            .radius(4.0)
                            .shape(egui_plot::MarkerShape::Diamond)
                            .color(Color32::BLACK)
                            .name(format!("{} mean {:.2} (sd {:.2})", b.label, b.mean, b.std)),
                    );
                }
            });
    }

    /// Correlation heat-map as a colored grid.
    pub fn draw_correlation(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        egui::Grid::new("correlation_matrix")
            .spacing([4.0, 4.0])
            .show(ui, |ui| {
                ui.label("");
                for label in &matrix.labels {
                    ui.label(RichText::new(label).strong());
                }
                ui.end_row();

                for (row_label, row) in matrix.labels.iter().zip(&matrix.values) {
                    ui.label(RichText::new(row_label).strong());
                    for value in row {
                        let (fill, text) = match value {
                            Some(r) => (palette::diverging(*r).to_egui(), format!("{:.3}", r)),
                            None => (Color32::GRAY, "n/a".to_string()),
                        };
                        egui::Frame::none()
                            .fill(fill)
                            .rounding(3.0)
                            .inner_margin(egui::Margin::symmetric(14.0, 8.0))
                            .show(ui, |ui| {
                                ui.label(RichText::new(text).color(Color32::BLACK).monospace());
                            });
                    }
                    ui.end_row();
                }
            });
    }

    fn header(ui: &mut egui::Ui, columns: &[&str]) {
        for c in columns {
            ui.label(RichText::new(*c).strong().size(11.0));
        }
        ui.end_row();
    }

    fn opt(v: Option<f64>, decimals: usize) -> String {
        v.map(|v| format!("{:.*}", decimals, v))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Location profile table.
    pub fn draw_location_profiles(ui: &mut egui::Ui, profiles: &[LocationProfile]) {
        egui::Grid::new("location_profiles")
            .striped(true)
            .min_col_width(70.0)
            .show(ui, |ui| {
                Self::header(ui, &["Location", "Count", "Avg rating", "Avg votes", "Avg cost (INR)"]);
                for p in profiles {
                    ui.label(&p.location);
                    ui.label(p.count.to_string());
                    ui.label(Self::opt(p.mean_rating, 2));
                    ui.label(Self::opt(p.mean_votes, 2));
                    ui.label(Self::opt(p.mean_cost, 2));
                    ui.end_row();
                }
            });
    }

    /// Ranked restaurant table. `detailed` adds cuisines and type columns.
    pub fn draw_restaurant_table(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[RestaurantSummary],
        detailed: bool,
    ) {
        egui::Grid::new(id)
            .striped(true)
            .min_col_width(40.0)
            .show(ui, |ui| {
                if detailed {
                    Self::header(
                        ui,
                        &["#", "Name", "Location", "Cuisines", "Rating", "Votes", "Cost", "Type"],
                    );
                } else {
                    Self::header(ui, &["#", "Name", "Location", "Rating", "Votes", "Cost"]);
                }
                for r in rows {
                    ui.label(r.rank.to_string());
                    ui.label(RichText::new(&r.name).strong());
                    ui.label(&r.location);
                    if detailed {
                        ui.label(&r.cuisines);
                    }
                    ui.label(Self::opt(r.rate, 1));
                    ui.label(Self::opt(r.votes, 0));
                    ui.label(Self::opt(r.cost, 0));
                    if detailed {
                        ui.label(&r.rest_type);
                    }
                    ui.end_row();
                }
            });
    }

    /// Service comparison table, significant rows highlighted.
    pub fn draw_service_table(ui: &mut egui::Ui, services: &[ServiceComparison]) {
        egui::Grid::new("service_comparison")
            .striped(true)
            .min_col_width(60.0)
            .show(ui, |ui| {
                Self::header(
                    ui,
                    &["Service", "N with", "Avg with", "N without", "Avg without", "P-value"],
                );
                let default_color = ui.visuals().text_color();
                for s in services {
                    let mean = |v: f64| if v.is_nan() { "-".to_string() } else { format!("{:.2}", v) };
                    ui.label(&s.service);
                    ui.label(s.with.count.to_string());
                    ui.label(mean(s.with.mean));
                    ui.label(s.without.count.to_string());
                    ui.label(mean(s.without.mean));
                    let color = if s.is_significant { BRAND.to_egui() } else { default_color };
                    ui.label(RichText::new(Self::opt(s.p_value, 4)).color(color));
                    ui.end_row();
                }
            });
    }

    fn draw_empty(ui: &mut egui::Ui, height: f32) {
        ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data for the current filters").color(Color32::GRAY));
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_convex(piece: &[[f64; 2]]) -> bool {
        let n = piece.len();
        let mut sign = 0.0;
        for i in 0..n {
            let [ax, ay] = piece[i];
            let [bx, by] = piece[(i + 1) % n];
            let [cx, cy] = piece[(i + 2) % n];
            let cross = (bx - ax) * (cy - by) - (by - ay) * (cx - bx);
            if cross.abs() < 1e-12 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_wedge_pieces_are_convex_and_stay_off_the_hole() {
        let pieces = ChartPlotter::wedge(0.0, 0.8 * TAU, 0.4);
        assert!(pieces.len() > 2);
        for piece in &pieces {
            assert_eq!(piece.len(), 4);
            assert!(is_convex(piece));
            for p in piece {
                let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
                assert!(r >= 0.4 - 1e-9 && r <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_wedge_pieces_are_contiguous() {
        let pieces = ChartPlotter::wedge(0.0, TAU / 4.0, 0.5);
        let first = &pieces[0];
        assert!((first[0][0] - 1.0).abs() < 1e-9 && first[0][1].abs() < 1e-9);
        assert!((first[3][0] - 0.5).abs() < 1e-9 && first[3][1].abs() < 1e-9);
        for pair in pieces.windows(2) {
            assert_eq!(pair[0][1], pair[1][0]);
            assert_eq!(pair[0][2], pair[1][3]);
        }
        let last = &pieces[pieces.len() - 1];
        assert!(last[1][0].abs() < 1e-9 && (last[1][1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wedge_without_hole_fans_from_center() {
        let pieces = ChartPlotter::wedge(0.0, TAU / 2.0, 0.0);
        for piece in &pieces {
            assert_eq!(piece.len(), 3);
            assert_eq!(piece[2], [0.0, 0.0]);
            for p in &piece[..2] {
                assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 1.0).abs() < 1e-9);
            }
        }
    }
}
