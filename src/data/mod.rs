//! Data module - CSV loading, cleaning and filtering

mod filter;
mod loader;
mod model;
mod processor;

pub use filter::{search_by_name, Filters, MIN_RATING_CEIL, MIN_RATING_FLOOR, MIN_RATING_STEP};
pub use loader::{default_candidates, resolve_dataset_path, DataLoader, DEFAULT_DATASET};
pub use model::{Dataset, PriceCategory, Restaurant};
#[cfg(test)]
pub use processor::categorize_price;
