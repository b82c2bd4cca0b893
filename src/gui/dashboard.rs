//! Dashboard View
//! Central panel: headline metrics and one tab per group of charts.

use crate::charts::palette::BRAND;
use crate::charts::ChartPlotter;
use crate::stats::{Dashboard, RestaurantSummary};
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 380.0;
/// Search results shown in the table; the count above it is always exact.
const MAX_SEARCH_ROWS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Geography,
    TypesCuisines,
    PricePopularity,
    Comparisons,
    TopRestaurants,
    Search,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Geography,
        Tab::TypesCuisines,
        Tab::PricePopularity,
        Tab::Comparisons,
        Tab::TopRestaurants,
        Tab::Search,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Geography => "Geography",
            Tab::TypesCuisines => "Types & Cuisines",
            Tab::PricePopularity => "Price & Popularity",
            Tab::Comparisons => "Comparisons",
            Tab::TopRestaurants => "Top Restaurants",
            Tab::Search => "Search",
        }
    }
}

/// Central dashboard state.
#[derive(Default)]
pub struct DashboardView {
    pub dashboard: Option<Dashboard>,
    pub tab: Tab,
    pub search: String,
    search_total: usize,
    search_results: Vec<RestaurantSummary>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dashboard(&mut self, dashboard: Dashboard) {
        self.dashboard = Some(dashboard);
    }

    pub fn clear(&mut self) {
        self.dashboard = None;
        self.search.clear();
        self.search_total = 0;
        self.search_results.clear();
    }

    pub fn set_search_results(&mut self, results: Vec<RestaurantSummary>) {
        self.search_total = results.len();
        self.search_results = results;
        self.search_results.truncate(MAX_SEARCH_ROWS);
    }

    /// Draw the dashboard. Returns true when the search query changed.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let Some(dashboard) = &self.dashboard else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data").size(20.0));
            });
            return false;
        };

        Self::draw_overview(ui, dashboard);
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.label()).size(14.0));
            }
        });
        ui.separator();

        let mut search_changed = false;
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                Tab::Geography => Self::draw_geography(ui, dashboard),
                Tab::TypesCuisines => Self::draw_types(ui, dashboard),
                Tab::PricePopularity => Self::draw_price(ui, dashboard),
                Tab::Comparisons => Self::draw_comparisons(ui, dashboard),
                Tab::TopRestaurants => Self::draw_top(ui, dashboard),
                Tab::Search => {
                    search_changed = Self::draw_search(
                        ui,
                        &mut self.search,
                        self.search_total,
                        &self.search_results,
                    );
                }
            });
        search_changed
    }

    fn metric_card(ui: &mut egui::Ui, title: &str, value: String) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, BRAND.to_egui()))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_width(170.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(22.0).strong());
                });
            });
    }

    fn draw_overview(ui: &mut egui::Ui, d: &Dashboard) {
        let o = &d.overview;
        ui.label(RichText::new(&d.filters).size(12.0).color(Color32::GRAY));
        ui.horizontal_wrapped(|ui| {
            Self::metric_card(ui, "Restaurants", format!("{} / {}", o.restaurants, o.total));
            Self::metric_card(
                ui,
                "Average rating",
                o.mean_rating
                    .map(|v| format!("{:.2} / 5", v))
                    .unwrap_or_else(|| "-".into()),
            );
            Self::metric_card(
                ui,
                "Average cost for two",
                o.mean_cost
                    .map(|v| format!("{:.0} INR", v))
                    .unwrap_or_else(|| "-".into()),
            );
            Self::metric_card(ui, "Total votes", format!("{:.0}", o.total_votes));
        });
    }

    fn heading(ui: &mut egui::Ui, text: &str) {
        ui.add_space(10.0);
        ui.label(RichText::new(text).size(16.0).strong());
        ui.add_space(4.0);
    }

    fn draw_geography(ui: &mut egui::Ui, d: &Dashboard) {
        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "Top locations");
            ChartPlotter::draw_horizontal_bars(
                &mut cols[0],
                "top_locations",
                &d.top_locations,
                "Restaurants",
                CHART_HEIGHT,
            );
            Self::heading(&mut cols[1], "Listings by city");
            ChartPlotter::draw_donut(&mut cols[1], "cities", &d.city_distribution, 0.4, CHART_HEIGHT);
        });
        Self::heading(ui, "Location profiles");
        ChartPlotter::draw_location_profiles(ui, &d.location_profiles);
    }

    fn draw_types(ui: &mut egui::Ui, d: &Dashboard) {
        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "Restaurant types");
            ChartPlotter::draw_horizontal_bars(
                &mut cols[0],
                "rest_types",
                &d.rest_types,
                "Restaurants",
                CHART_HEIGHT,
            );
            Self::heading(&mut cols[1], "Cuisines");
            ChartPlotter::draw_horizontal_bars(
                &mut cols[1],
                "cuisines",
                &d.cuisines,
                "Restaurants",
                CHART_HEIGHT,
            );
        });
    }

    fn draw_price(ui: &mut egui::Ui, d: &Dashboard) {
        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "Rating distribution");
            ChartPlotter::draw_histogram(
                &mut cols[0],
                "rating_histogram",
                d.rating_histogram.as_ref(),
                CHART_HEIGHT,
            );
            let s = &d.rating_stats;
            if s.count > 0 {
                cols[0].label(
                    RichText::new(format!(
                        "n = {}   mean {:.2}   median {:.2}   sd {:.2}   p05 {:.2}   p95 {:.2}",
                        s.count, s.mean, s.median, s.std, s.p05, s.p95
                    ))
                    .size(11.0)
                    .color(Color32::GRAY),
                );
            }
            Self::heading(&mut cols[1], "Price categories");
            ChartPlotter::draw_donut(&mut cols[1], "prices", &d.price_distribution, 0.4, CHART_HEIGHT);
        });
        Self::heading(ui, "Cost for two vs rating (marker size: votes)");
        ChartPlotter::draw_scatter(ui, "cost_rating", &d.scatter, CHART_HEIGHT + 60.0);
    }

    fn draw_comparisons(ui: &mut egui::Ui, d: &Dashboard) {
        Self::heading(ui, "Correlation: rating, votes, cost");
        ChartPlotter::draw_correlation(ui, &d.correlation);

        ui.columns(2, |cols| {
            Self::heading(&mut cols[0], "Rating by price category");
            ChartPlotter::draw_box_plots(&mut cols[0], "price_boxes", &d.price_boxes, CHART_HEIGHT);
            Self::heading(&mut cols[1], "Rating in the top locations");
            ChartPlotter::draw_box_plots(
                &mut cols[1],
                "location_boxes",
                &d.location_boxes,
                CHART_HEIGHT,
            );
        });

        Self::heading(ui, "Services and rating (Welch t-test)");
        ChartPlotter::draw_service_table(ui, &d.services);
    }

    fn draw_top(ui: &mut egui::Ui, d: &Dashboard) {
        Self::heading(ui, "Most popular (votes)");
        ChartPlotter::draw_restaurant_table(ui, "top_popular", &d.top_popular, false);
        Self::heading(ui, "Best rated");
        ChartPlotter::draw_restaurant_table(ui, "top_rated", &d.top_rated, false);
    }

    fn draw_search(
        ui: &mut egui::Ui,
        query: &mut String,
        total: usize,
        results: &[RestaurantSummary],
    ) -> bool {
        Self::heading(ui, "Search by name");
        let changed = ui
            .add(
                egui::TextEdit::singleline(query)
                    .hint_text("Restaurant name")
                    .desired_width(320.0),
            )
            .changed();

        if query.trim().is_empty() {
            return changed;
        }

        ui.add_space(6.0);
        let note = if total > results.len() {
            format!("{} restaurants found (first {} shown)", total, results.len())
        } else {
            format!("{} restaurants found", total)
        };
        ui.label(RichText::new(note).size(12.0).color(Color32::GRAY));
        ui.add_space(4.0);
        ChartPlotter::draw_restaurant_table(ui, "search_results", results, true);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_labels_unique() {
        let mut labels: Vec<&str> = Tab::ALL.iter().map(|t| t.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Tab::ALL.len());
    }

    #[test]
    fn test_search_results_truncated_but_counted() {
        let mut view = DashboardView::new();
        let rows: Vec<RestaurantSummary> = (0..MAX_SEARCH_ROWS + 5)
            .map(|i| RestaurantSummary {
                rank: i + 1,
                name: format!("Cafe {}", i),
                location: "BTM".into(),
                cuisines: String::new(),
                rest_type: String::new(),
                rate: None,
                votes: None,
                cost: None,
            })
            .collect();
        view.set_search_results(rows);
        assert_eq!(view.search_total, MAX_SEARCH_ROWS + 5);
        assert_eq!(view.search_results.len(), MAX_SEARCH_ROWS);
    }
}
