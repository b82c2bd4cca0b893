//! Stats module - aggregations behind the dashboard

mod calculator;
mod dashboard;

pub use calculator::{BoxStats, CorrelationMatrix, CountEntry, DescriptiveStats, Histogram};
pub use dashboard::{
    Dashboard, LocationProfile, RestaurantSummary, ScatterPoint, ServiceComparison,
};
