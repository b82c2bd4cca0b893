//! Dashboard Aggregates
//! Everything the dashboard and the report draw, computed once per filter change.

use super::calculator::{
    BoxStats, CorrelationMatrix, CountEntry, DescriptiveStats, Histogram, StatsCalculator,
};
use crate::data::{Filters, PriceCategory, Restaurant};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

pub const HISTOGRAM_BINS: usize = 30;
pub const TOP_LOCATIONS: usize = 15;
pub const TOP_CITIES: usize = 10;
pub const TOP_REST_TYPES: usize = 15;
pub const TOP_CUISINES: usize = 15;
pub const PROFILE_LOCATIONS: usize = 10;
pub const BOX_LOCATIONS: usize = 5;
pub const TOP_RESTAURANTS: usize = 10;

/// Headline metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub restaurants: usize,
    pub total: usize,
    pub mean_rating: Option<f64>,
    pub mean_cost: Option<f64>,
    pub total_votes: f64,
}

/// Per-location aggregate row.
#[derive(Debug, Clone, Serialize)]
pub struct LocationProfile {
    pub location: String,
    pub count: usize,
    pub mean_rating: Option<f64>,
    pub mean_votes: Option<f64>,
    pub mean_cost: Option<f64>,
}

/// Point of the cost / rating / popularity scatter.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub location: String,
    pub cost: f64,
    pub rate: f64,
    pub votes: f64,
}

/// Row of a restaurant table (top lists, search results).
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantSummary {
    pub rank: usize,
    pub name: String,
    pub location: String,
    pub cuisines: String,
    pub rest_type: String,
    pub rate: Option<f64>,
    pub votes: Option<f64>,
    pub cost: Option<f64>,
}

impl RestaurantSummary {
    pub fn from_rows(rows: &[&Restaurant]) -> Vec<Self> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| Self {
                rank: i + 1,
                name: r.display_name().to_string(),
                location: r.display_location().to_string(),
                cuisines: r.cuisines.join(", "),
                rest_type: r.rest_type.clone().unwrap_or_default(),
                rate: r.rate,
                votes: r.votes,
                cost: r.cost_for_two,
            })
            .collect()
    }
}

/// Rating comparison between restaurants offering a service and those that do not.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceComparison {
    pub service: String,
    pub with: DescriptiveStats,
    pub without: DescriptiveStats,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

/// Data behind every dashboard figure for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub filters: String,
    pub overview: Overview,
    pub top_locations: Vec<CountEntry>,
    pub city_distribution: Vec<CountEntry>,
    pub location_profiles: Vec<LocationProfile>,
    pub rest_types: Vec<CountEntry>,
    pub cuisines: Vec<CountEntry>,
    pub rating_stats: DescriptiveStats,
    pub rating_histogram: Option<Histogram>,
    pub price_distribution: Vec<CountEntry>,
    #[serde(skip)]
    pub scatter: Vec<ScatterPoint>,
    pub correlation: CorrelationMatrix,
    pub price_boxes: Vec<BoxStats>,
    pub location_boxes: Vec<BoxStats>,
    pub top_popular: Vec<RestaurantSummary>,
    pub top_rated: Vec<RestaurantSummary>,
    pub services: Vec<ServiceComparison>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn ratings(rows: &[&Restaurant]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.rate).collect()
}

impl Dashboard {
    /// Aggregate the filtered rows. `total` is the size of the unfiltered dataset.
    pub fn compute(total: usize, rows: &[&Restaurant], filters: &Filters) -> Self {
        let overview = Overview {
            restaurants: rows.len(),
            total,
            mean_rating: StatsCalculator::mean(rows.iter().filter_map(|r| r.rate)),
            mean_cost: StatsCalculator::mean(rows.iter().filter_map(|r| r.cost_for_two)),
            total_votes: rows.iter().filter_map(|r| r.votes).sum(),
        };

        let location_counts =
            StatsCalculator::value_counts(rows.iter().filter_map(|r| r.location.as_deref()), None);

        let mut by_location: HashMap<&str, Vec<&Restaurant>> = HashMap::new();
        for r in rows {
            if let Some(loc) = r.location.as_deref() {
                by_location.entry(loc).or_default().push(r);
            }
        }

        let location_profiles: Vec<LocationProfile> = location_counts
            .iter()
            .take(PROFILE_LOCATIONS)
            .collect::<Vec<_>>()
            .par_iter()
            .map(|entry| {
                let group = by_location
                    .get(entry.label.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                LocationProfile {
                    location: entry.label.clone(),
                    count: entry.count,
                    mean_rating: StatsCalculator::mean(group.iter().filter_map(|r| r.rate))
                        .map(round2),
                    mean_votes: StatsCalculator::mean(group.iter().filter_map(|r| r.votes))
                        .map(round2),
                    mean_cost: StatsCalculator::mean(group.iter().filter_map(|r| r.cost_for_two))
                        .map(round2),
                }
            })
            .collect();

        let location_groups: Vec<(String, Vec<f64>)> = location_counts
            .iter()
            .take(BOX_LOCATIONS)
            .map(|entry| {
                let group = by_location
                    .get(entry.label.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                (entry.label.clone(), ratings(group))
            })
            .collect();

        let price_groups: Vec<(String, Vec<f64>)> = PriceCategory::KNOWN
            .iter()
            .map(|cat| {
                let values = rows
                    .iter()
                    .filter(|r| r.price_category == *cat)
                    .filter_map(|r| r.rate)
                    .collect();
                (cat.label().to_string(), values)
            })
            .collect();

        let rating_values = ratings(rows);

        let scatter = rows
            .iter()
            .filter_map(|r| {
                Some(ScatterPoint {
                    name: r.display_name().to_string(),
                    location: r.display_location().to_string(),
                    cost: r.cost_for_two?,
                    rate: r.rate?,
                    votes: r.votes?,
                })
            })
            .collect();

        let dashboard = Self {
            filters: filters.describe(),
            overview,
            top_locations: location_counts.iter().take(TOP_LOCATIONS).cloned().collect(),
            city_distribution: StatsCalculator::value_counts(
                rows.iter().filter_map(|r| r.city.as_deref()),
                Some(TOP_CITIES),
            ),
            location_profiles,
            rest_types: StatsCalculator::value_counts(
                rows.iter().filter_map(|r| r.rest_type.as_deref()),
                Some(TOP_REST_TYPES),
            ),
            cuisines: StatsCalculator::value_counts(
                rows.iter().flat_map(|r| r.cuisines.iter()),
                Some(TOP_CUISINES),
            ),
            rating_stats: StatsCalculator::compute_descriptive_stats(&rating_values),
            rating_histogram: StatsCalculator::histogram(&rating_values, HISTOGRAM_BINS),
            price_distribution: StatsCalculator::value_counts(
                rows.iter().map(|r| r.price_category.label()),
                None,
            ),
            scatter,
            correlation: StatsCalculator::correlation_matrix(
                rows,
                &[
                    ("Rating", |r| r.rate),
                    ("Votes", |r| r.votes),
                    ("Cost for two", |r| r.cost_for_two),
                ],
            ),
            price_boxes: StatsCalculator::box_stats_parallel(&price_groups),
            location_boxes: StatsCalculator::box_stats_parallel(&location_groups),
            top_popular: RestaurantSummary::from_rows(&Self::top_by(rows, |r| r.votes)),
            top_rated: RestaurantSummary::from_rows(&Self::top_by(rows, |r| r.rate)),
            services: vec![
                Self::compare_service(rows, "Online ordering", |r| r.online_order),
                Self::compare_service(rows, "Table booking", |r| r.book_table),
            ],
        };

        log::debug!(
            "dashboard computed for {} / {} restaurants ({})",
            dashboard.overview.restaurants,
            total,
            dashboard.filters
        );
        dashboard
    }

    /// Largest `TOP_RESTAURANTS` rows by `key`, ignoring rows without it; ties keep dataset order.
    pub fn top_by<'a>(rows: &[&'a Restaurant], key: fn(&Restaurant) -> Option<f64>) -> Vec<&'a Restaurant> {
        let mut keyed: Vec<(f64, &'a Restaurant)> =
            rows.iter().filter_map(|r| Some((key(r)?, *r))).collect();
        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        keyed
            .into_iter()
            .take(TOP_RESTAURANTS)
            .map(|(_, r)| r)
            .collect()
    }

    fn compare_service(
        rows: &[&Restaurant],
        service: &str,
        flag: fn(&Restaurant) -> Option<bool>,
    ) -> ServiceComparison {
        let with: Vec<f64> = rows
            .iter()
            .filter(|r| flag(r) == Some(true))
            .filter_map(|r| r.rate)
            .collect();
        let without: Vec<f64> = rows
            .iter()
            .filter(|r| flag(r) == Some(false))
            .filter_map(|r| r.rate)
            .collect();

        let (p_value, is_significant) = StatsCalculator::perform_ttest(&with, &without);

        ServiceComparison {
            service: service.to_string(),
            with: StatsCalculator::compute_descriptive_stats(&with),
            without: StatsCalculator::compute_descriptive_stats(&without),
            p_value: (!p_value.is_nan()).then_some(p_value),
            is_significant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::categorize_price;

    fn row(
        name: &str,
        location: &str,
        rate: Option<f64>,
        votes: Option<f64>,
        cost: Option<f64>,
        online: bool,
    ) -> Restaurant {
        Restaurant {
            name: Some(name.into()),
            location: Some(location.into()),
            city: Some("Koramangala".into()),
            rest_type: Some("Casual Dining".into()),
            cuisines: vec!["North Indian".into(), "Chinese".into()],
            rate,
            votes,
            cost_for_two: cost,
            online_order: Some(online),
            book_table: Some(false),
            price_category: categorize_price(cost),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Restaurant> {
        vec![
            row("A", "BTM", Some(4.0), Some(100.0), Some(400.0), true),
            row("B", "BTM", Some(3.0), Some(50.0), Some(200.0), false),
            row("C", "HSR", Some(4.5), Some(300.0), Some(1600.0), true),
            row("D", "HSR", None, Some(0.0), None, false),
            row("E", "BTM", Some(4.5), Some(20.0), Some(800.0), true),
        ]
    }

    #[test]
    fn test_overview_metrics() {
        let rows = sample();
        let refs: Vec<&Restaurant> = rows.iter().collect();
        let d = Dashboard::compute(10, &refs, &Filters::default());

        assert_eq!(d.overview.restaurants, 5);
        assert_eq!(d.overview.total, 10);
        assert!((d.overview.mean_rating.unwrap() - 4.0).abs() < 1e-9);
        assert!((d.overview.mean_cost.unwrap() - 750.0).abs() < 1e-9);
        assert_eq!(d.overview.total_votes, 470.0);
    }

    #[test]
    fn test_empty_selection_has_no_means() {
        let d = Dashboard::compute(5, &[], &Filters::default());
        assert_eq!(d.overview.restaurants, 0);
        assert_eq!(d.overview.mean_rating, None);
        assert_eq!(d.overview.total_votes, 0.0);
        assert!(d.rating_histogram.is_none());
        assert!(d.top_rated.is_empty());
        assert!(d.price_boxes.is_empty());
    }

    #[test]
    fn test_location_profiles_and_counts() {
        let rows = sample();
        let refs: Vec<&Restaurant> = rows.iter().collect();
        let d = Dashboard::compute(5, &refs, &Filters::default());

        assert_eq!(d.top_locations[0].label, "BTM");
        assert_eq!(d.top_locations[0].count, 3);

        let btm = &d.location_profiles[0];
        assert_eq!(btm.location, "BTM");
        assert_eq!(btm.mean_rating, Some(3.83));
        assert_eq!(btm.mean_votes, Some(56.67));
        assert_eq!(btm.mean_cost, Some(466.67));

        let hsr = &d.location_profiles[1];
        assert_eq!(hsr.mean_rating, Some(4.5));
        assert_eq!(hsr.mean_cost, Some(1600.0));

        assert_eq!(d.cuisines.len(), 2);
        assert_eq!(d.cuisines[0].count, 5);
    }

    #[test]
    fn test_top_lists_skip_missing_and_keep_order_on_ties() {
        let rows = sample();
        let refs: Vec<&Restaurant> = rows.iter().collect();
        let d = Dashboard::compute(5, &refs, &Filters::default());

        let rated: Vec<&str> = d.top_rated.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(rated, vec!["C", "E", "A", "B"]);
        assert_eq!(d.top_rated[0].rank, 1);

        let popular: Vec<&str> = d.top_popular.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(popular, vec!["C", "A", "B", "E", "D"]);
    }

    #[test]
    fn test_price_boxes_only_for_rated_known_categories() {
        let rows = sample();
        let refs: Vec<&Restaurant> = rows.iter().collect();
        let d = Dashboard::compute(5, &refs, &Filters::default());

        let labels: Vec<&str> = d.price_boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Budget", "Moderate", "Expensive", "Luxury"]);
        assert_eq!(d.scatter.len(), 4);
        assert_eq!(d.location_boxes.len(), 2);
        assert_eq!(d.location_boxes[1].count, 1);
    }

    #[test]
    fn test_service_comparison_counts() {
        let rows = sample();
        let refs: Vec<&Restaurant> = rows.iter().collect();
        let d = Dashboard::compute(5, &refs, &Filters::default());

        let online = &d.services[0];
        assert_eq!(online.with.count, 3);
        assert_eq!(online.without.count, 1);
        assert!(online.p_value.is_none());

        let booking = &d.services[1];
        assert_eq!(booking.with.count, 0);
        assert_eq!(booking.without.count, 4);
    }
}
