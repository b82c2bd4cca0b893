//! Zomato Explorer - Bengaluru restaurant listings dashboard
//!
//! Loads the Zomato export, cleans it, and shows interactive charts. Headless
//! commands print a JSON summary, write a PowerPoint report or export the
//! filtered table.

mod charts;
mod cli;
mod data;
mod gui;
mod report;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, FilterArgs};
use data::{default_candidates, resolve_dataset_path, search_by_name, DataLoader, Dataset};
use eframe::egui;
use gui::ExplorerApp;
use report::ReportGenerator;
use stats::{Dashboard, RestaurantSummary};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args = Cli::parse();
    let dataset_path = resolve_dataset_path(args.data.as_deref(), &default_candidates());
    log::debug!("dataset path: {}", dataset_path.display());

    match args.command {
        None => run_gui(dataset_path),
        Some(Command::Summary { filters, search }) => {
            run_summary(&dataset_path, &filters, search.as_deref())
        }
        Some(Command::Report { filters, output }) => run_report(&dataset_path, &filters, &output),
        Some(Command::Export { filters, output }) => run_export(&dataset_path, &filters, &output),
    }
}

fn run_gui(dataset_path: PathBuf) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Zomato Bengaluru Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Zomato Bengaluru Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, dataset_path)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

fn load(path: &Path) -> Result<Dataset> {
    DataLoader::load_dataset(path).context("Cannot start the analysis")
}

fn run_summary(path: &Path, filter_args: &FilterArgs, search: Option<&str>) -> Result<()> {
    let dataset = load(path)?;
    let filters = filter_args.to_filters();
    let rows = filters.apply(&dataset.rows);
    let dashboard = Dashboard::compute(dataset.len(), &rows, &filters);

    let mut value = serde_json::to_value(&dashboard).context("Failed to serialize summary")?;
    if let Some(query) = search {
        let matches = RestaurantSummary::from_rows(&search_by_name(&rows, query));
        value["search"] = serde_json::to_value(matches).context("Failed to serialize search")?;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&value).context("Failed to serialize summary")?
    );
    Ok(())
}

fn run_report(path: &Path, filter_args: &FilterArgs, output: &Path) -> Result<()> {
    let dataset = load(path)?;
    let filters = filter_args.to_filters();
    let rows = filters.apply(&dataset.rows);
    let dashboard = Dashboard::compute(dataset.len(), &rows, &filters);

    let slides = ReportGenerator::generate(&dashboard, output)
        .with_context(|| format!("Failed to write report {}", output.display()))?;
    println!("Report written: {} ({} slides)", output.display(), slides);
    Ok(())
}

fn run_export(path: &Path, filter_args: &FilterArgs, output: &Path) -> Result<()> {
    let dataset = load(path)?;
    let rows = filter_args.to_filters().apply(&dataset.rows);

    let written = DataLoader::write_csv(rows, output)
        .with_context(|| format!("Failed to export {}", output.display()))?;
    println!("Exported {} rows to {}", written, output.display());
    Ok(())
}
