//! Filter Panel Widget
//! Left side panel: dataset source, filters and exports.

use crate::charts::palette::BRAND;
use crate::data::{
    Dataset, Filters, PriceCategory, MIN_RATING_CEIL, MIN_RATING_FLOOR, MIN_RATING_STEP,
};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

const LABEL_WIDTH: f32 = 90.0;
const COMBO_WIDTH: f32 = 170.0;

/// Left side panel holding the current filter selection.
pub struct FilterPanel {
    pub filters: Filters,
    pub dataset_path: Option<PathBuf>,
    locations: Vec<String>,
    prices: Vec<PriceCategory>,
    shown: usize,
    total: usize,
    status: String,
    pub busy: bool,
    /// Dashboard recompute in flight; the filtered rows are not settled yet.
    pub calculating: bool,
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            dataset_path: None,
            locations: Vec::new(),
            prices: Vec::new(),
            shown: 0,
            total: 0,
            status: "Ready".to_string(),
            busy: false,
            calculating: false,
        }
    }
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the choices for a freshly loaded dataset.
    pub fn set_dataset(&mut self, dataset: &Dataset) {
        self.dataset_path = Some(dataset.source.clone());
        self.locations = dataset.locations();
        self.prices = dataset.price_categories();
        self.filters = Filters::default();
        self.shown = dataset.len();
        self.total = dataset.len();
    }

    pub fn set_counts(&mut self, shown: usize, total: usize) {
        self.shown = shown;
        self.total = total;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn has_data(&self) -> bool {
        self.total > 0
    }

    pub fn exports_enabled(&self) -> bool {
        self.has_data() && !self.busy && !self.calculating
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(6.0);
        ui.label(RichText::new(title).size(14.0).strong());
        ui.add_space(5.0);
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> FilterPanelAction {
        let mut action = FilterPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(RichText::new("Zomato Explorer").size(22.0).color(BRAND.to_egui()));
            ui.label(
                RichText::new("Bengaluru restaurants")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });

        Self::section(ui, "Dataset");
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = self
                        .dataset_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No dataset".to_string());
                    ui.label(RichText::new(name).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(!self.busy, egui::Button::new("Browse")).clicked() {
                            action = FilterPanelAction::BrowseDataset;
                        }
                    });
                });
            });

        Self::section(ui, "Filters");
        let before = self.filters.clone();

        ui.add_enabled_ui(self.has_data(), |ui| {
            ui.horizontal(|ui| {
                ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Location:"));
                ComboBox::from_id_salt("location_filter")
                    .width(COMBO_WIDTH)
                    .selected_text(self.filters.location.as_deref().unwrap_or("All"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.filters.location, None, "All");
                        for loc in &self.locations {
                            ui.selectable_value(&mut self.filters.location, Some(loc.clone()), loc);
                        }
                    });
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Price:"));
                ComboBox::from_id_salt("price_filter")
                    .width(COMBO_WIDTH)
                    .selected_text(self.filters.price.map(|p| p.label()).unwrap_or("All"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.filters.price, None, "All");
                        for price in &self.prices {
                            ui.selectable_value(&mut self.filters.price, Some(*price), price.label());
                        }
                    });
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Min rating:"));
                let mut rating = self.filters.min_rating;
                ui.add(
                    egui::Slider::new(&mut rating, MIN_RATING_FLOOR..=MIN_RATING_CEIL)
                        .step_by(MIN_RATING_STEP)
                        .fixed_decimals(1),
                );
                self.filters.set_min_rating(rating);
            });

            ui.add_space(5.0);
            if ui.small_button("Reset filters").clicked() {
                self.filters = Filters::default();
            }
        });

        if self.filters != before {
            action = FilterPanelAction::FiltersChanged;
        }

        ui.add_space(8.0);
        ui.label(
            RichText::new(format!("Shown: {} / {} restaurants", self.shown, self.total))
                .size(12.0)
                .strong(),
        );

        Self::section(ui, "Export");
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.exports_enabled(), |ui| {
                let report = egui::Button::new(RichText::new("Export report (PPTX)").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(report).clicked() {
                    action = FilterPanelAction::ExportReport;
                }
                ui.add_space(5.0);
                let csv = egui::Button::new(RichText::new("Export table (CSV)").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(csv).clicked() {
                    action = FilterPanelAction::ExportCsv;
                }
            });
        });

        ui.add_space(12.0);
        if self.busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let color = if self.status.starts_with("Error") {
                BRAND.to_egui()
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(color));
        }

        action
    }
}

/// Actions triggered by the filter panel
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPanelAction {
    None,
    BrowseDataset,
    FiltersChanged,
    ExportReport,
    ExportCsv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Restaurant;

    fn dataset(n: usize) -> Dataset {
        let rows = (0..n)
            .map(|i| Restaurant {
                name: Some(format!("Place {}", i)),
                location: Some("BTM".into()),
                rate: Some(4.0),
                ..Default::default()
            })
            .collect();
        Dataset::new(PathBuf::from("zomato.csv"), rows)
    }

    #[test]
    fn test_exports_wait_for_recompute() {
        let mut panel = FilterPanel::new();
        assert!(!panel.exports_enabled());

        panel.set_dataset(&dataset(3));
        panel.calculating = true;
        assert!(!panel.exports_enabled());

        panel.calculating = false;
        assert!(panel.exports_enabled());

        panel.busy = true;
        assert!(!panel.exports_enabled());
    }

    #[test]
    fn test_set_dataset_resets_filters() {
        let mut panel = FilterPanel::new();
        panel.filters.set_min_rating(4.0);
        panel.set_dataset(&dataset(2));
        assert_eq!(panel.filters, Filters::default());
        assert_eq!(panel.locations, vec!["BTM".to_string()]);
    }
}
