//! Zomato Explorer Main Application
//! Main window with the filter panel and the dashboard.

use crate::data::{search_by_name, DataLoader, Dataset, Restaurant, DEFAULT_DATASET};
use crate::gui::{DashboardView, FilterPanel, FilterPanelAction};
use crate::report::ReportGenerator;
use crate::stats::{Dashboard, RestaurantSummary};
use egui::{RichText, SidePanel};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Dataset loading result from background thread
enum LoadResult {
    Complete(Dataset),
    Error(String),
}

/// Dashboard computation result from background thread
struct CalcResult {
    generation: u64,
    indices: Vec<usize>,
    dashboard: Dashboard,
}

/// Rows at `indices`; indices past the end of `dataset` are skipped.
fn rows_at<'a>(dataset: &'a Dataset, indices: &[usize]) -> Vec<&'a Restaurant> {
    indices.iter().filter_map(|&i| dataset.rows.get(i)).collect()
}

/// Main application window.
pub struct ExplorerApp {
    dataset: Option<Arc<Dataset>>,
    /// Dataset rows passing the current filters.
    filtered: Vec<usize>,
    filter_panel: FilterPanel,
    view: DashboardView,
    load_error: Option<String>,

    load_rx: Option<Receiver<LoadResult>>,
    calc_rx: Option<Receiver<CalcResult>>,
    /// Bumped on every filter change; stale results are dropped.
    generation: u64,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dataset_path: PathBuf) -> Self {
        let mut app = Self {
            dataset: None,
            filtered: Vec::new(),
            filter_panel: FilterPanel::new(),
            view: DashboardView::new(),
            load_error: None,
            load_rx: None,
            calc_rx: None,
            generation: 0,
        };
        app.start_loading(dataset_path);
        app
    }

    fn is_loading(&self) -> bool {
        self.load_rx.is_some()
    }

    fn is_calculating(&self) -> bool {
        self.calc_rx.is_some()
    }

    /// Load the dataset in a background thread.
    fn start_loading(&mut self, path: PathBuf) {
        if self.is_loading() {
            return;
        }

        self.view.clear();
        self.filter_panel.dataset_path = Some(path.clone());
        self.filter_panel.busy = true;
        self.filter_panel.set_status("Loading dataset...");
        self.load_error = None;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match DataLoader::load_dataset(&path) {
                Ok(dataset) => LoadResult::Complete(dataset),
                Err(e) => {
                    log::error!("{}", e);
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    fn handle_browse_dataset(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(dataset)) => {
                self.filter_panel.set_dataset(&dataset);
                if dataset.is_empty() {
                    log::warn!("{} has no restaurant rows", dataset.source.display());
                    self.filter_panel.set_status("Error: the dataset has no rows");
                } else {
                    self.filter_panel
                        .set_status(format!("Loaded {} restaurants", dataset.len()));
                }
                self.filter_panel.busy = false;
                self.filtered.clear();
                self.dataset = Some(Arc::new(dataset));
                self.start_calculation();
            }
            Ok(LoadResult::Error(error)) => {
                self.filter_panel.set_status(format!("Error: {}", error));
                self.filter_panel.busy = false;
                self.load_error = Some(error);
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.filter_panel.set_status("Error: dataset loader stopped");
                self.filter_panel.busy = false;
            }
        }
    }

    /// Recompute the dashboard for the current filters in a background thread.
    fn start_calculation(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        let filters = self.filter_panel.filters.clone();

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.filter_panel.calculating = true;

        thread::spawn(move || {
            let started = Instant::now();
            let indices: Vec<usize> = dataset
                .rows
                .iter()
                .enumerate()
                .filter(|(_, r)| filters.matches(r))
                .map(|(i, _)| i)
                .collect();
            let rows: Vec<&Restaurant> = indices.iter().map(|&i| &dataset.rows[i]).collect();
            let dashboard = Dashboard::compute(dataset.len(), &rows, &filters);
            log::debug!("dashboard recomputed in {:.2?}", started.elapsed());

            let _ = tx.send(CalcResult {
                generation,
                indices,
                dashboard,
            });
        });
    }

    /// Check for dashboard results
    fn check_calculation_results(&mut self) {
        let Some(rx) = self.calc_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(result) if result.generation == self.generation => {
                self.filter_panel.calculating = false;
                let total = result.dashboard.overview.total;
                self.filter_panel.set_counts(result.indices.len(), total);
                self.filtered = result.indices;
                self.view.set_dashboard(result.dashboard);
                self.refresh_search();
            }
            Ok(_) => log::debug!("dropping stale dashboard"),
            Err(TryRecvError::Empty) => self.calc_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.filter_panel.calculating = false;
                log::error!("dashboard worker stopped");
            }
        }
    }

    fn filtered_rows(&self) -> Vec<&Restaurant> {
        match &self.dataset {
            Some(dataset) => rows_at(dataset, &self.filtered),
            None => Vec::new(),
        }
    }

    fn refresh_search(&mut self) {
        let rows = self.filtered_rows();
        let results = RestaurantSummary::from_rows(&search_by_name(&rows, &self.view.search));
        self.view.set_search_results(results);
    }

    /// Render every chart for the current filters into a PowerPoint file.
    fn handle_export_report(&mut self) {
        let Some(dashboard) = &self.view.dashboard else {
            self.filter_panel.set_status("Nothing to export");
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .set_file_name("zomato_report.pptx")
            .save_file()
        else {
            return;
        };

        match ReportGenerator::generate(dashboard, &output_path) {
            Ok(slides) => {
                self.filter_panel
                    .set_status(format!("Report exported: {} slides", slides));
                if let Err(e) = open::that(&output_path) {
                    log::warn!("Could not open {}: {}", output_path.display(), e);
                }
            }
            Err(e) => {
                log::error!("{}", e);
                self.filter_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Write the filtered table as CSV.
    fn handle_export_csv(&mut self) {
        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("zomato_filtered.csv")
            .save_file()
        else {
            return;
        };

        let status = match DataLoader::write_csv(self.filtered_rows(), &output_path) {
            Ok(n) => format!("Exported {} rows", n),
            Err(e) => {
                log::error!("{}", e);
                format!("Error: {}", e)
            }
        };
        self.filter_panel.set_status(status);
    }

    fn draw_missing_dataset(&mut self, ui: &mut egui::Ui, error: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(RichText::new("Dataset unavailable").size(22.0).strong());
            ui.add_space(10.0);
            ui.label(RichText::new(error).size(14.0));
            ui.add_space(6.0);
            ui.label(
                RichText::new(format!(
                    "Place the Zomato Bengaluru export at {} or pick the file manually.",
                    DEFAULT_DATASET
                ))
                .size(12.0)
                .color(egui::Color32::GRAY),
            );
            ui.add_space(12.0);
            if ui.button(RichText::new("Browse for zomato.csv").size(14.0)).clicked() {
                self.handle_browse_dataset();
            }
        });
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        self.check_calculation_results();

        if self.is_loading() || self.is_calculating() {
            ctx.request_repaint();
        }

        SidePanel::left("filter_panel")
            .min_width(300.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.filter_panel.show(ui) {
                        FilterPanelAction::BrowseDataset => self.handle_browse_dataset(),
                        FilterPanelAction::FiltersChanged => {
                            log::info!("filters: {}", self.filter_panel.filters.describe());
                            self.start_calculation();
                        }
                        FilterPanelAction::ExportReport => self.handle_export_report(),
                        FilterPanelAction::ExportCsv => self.handle_export_csv(),
                        FilterPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = self.load_error.clone() {
                self.draw_missing_dataset(ui, &error);
                return;
            }
            if self.is_loading() {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }
            if self.view.show(ui) {
                self.refresh_search();
            }
        });
    }
}
