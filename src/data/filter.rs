//! Filter Module
//! Sidebar filters and name search over cleaned restaurant rows.

use super::model::{PriceCategory, Restaurant};
use serde::Serialize;

/// Rating slider bounds.
pub const MIN_RATING_FLOOR: f64 = 0.0;
pub const MIN_RATING_CEIL: f64 = 5.0;
pub const MIN_RATING_STEP: f64 = 0.5;
/// Stand-in rating for unrated restaurants when comparing against the threshold.
const UNRATED: f64 = -1.0;

/// Case-insensitive literal name search. A blank query matches nothing.
pub fn search_by_name<'a>(rows: &[&'a Restaurant], query: &str) -> Vec<&'a Restaurant> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .copied()
        .filter(|r| {
            r.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Dashboard filter selection. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    pub location: Option<String>,
    pub price: Option<PriceCategory>,
    pub min_rating: f64,
}

impl Filters {
    /// True when no filter narrows the dataset.
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.price.is_none()
            && self.min_rating <= MIN_RATING_FLOOR
    }

    /// Snap the rating threshold onto the slider grid.
    pub fn set_min_rating(&mut self, value: f64) {
        if !value.is_finite() {
            self.min_rating = MIN_RATING_FLOOR;
            return;
        }
        let snapped = (value / MIN_RATING_STEP).round() * MIN_RATING_STEP;
        self.min_rating = snapped.clamp(MIN_RATING_FLOOR, MIN_RATING_CEIL);
    }

    /// Whether a single restaurant passes every active filter.
    ///
    /// Unrated restaurants compare as -1 and never pass, even at threshold 0.
    pub fn matches(&self, r: &Restaurant) -> bool {
        if let Some(loc) = &self.location {
            if r.location.as_deref() != Some(loc.as_str()) {
                return false;
            }
        }
        if let Some(price) = self.price {
            if r.price_category != price {
                return false;
            }
        }
        match r.rate {
            Some(rate) => rate >= self.min_rating,
            None => UNRATED >= self.min_rating,
        }
    }

    /// Rows passing the filters, in dataset order.
    pub fn apply<'a>(&self, rows: &'a [Restaurant]) -> Vec<&'a Restaurant> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }

    /// Short human readable description, used in report titles and logs.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "All restaurants".to_string();
        }
        let mut parts = Vec::new();
        if let Some(loc) = &self.location {
            parts.push(format!("Location: {}", loc));
        }
        if let Some(price) = self.price {
            parts.push(format!("Price: {}", price));
        }
        if self.min_rating > MIN_RATING_FLOOR {
            parts.push(format!("Rating >= {:.1}", self.min_rating));
        }
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant(name: &str, location: &str, rate: Option<f64>, cost: Option<f64>) -> Restaurant {
        Restaurant {
            name: Some(name.to_string()),
            location: Some(location.to_string()),
            rate,
            cost_for_two: cost,
            price_category: crate::data::categorize_price(cost),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Restaurant> {
        vec![
            restaurant("Jalsa", "Banashankari", Some(4.1), Some(800.0)),
            restaurant("Cafe Coffee Day", "Koramangala", Some(3.2), Some(250.0)),
            restaurant("New Place", "Koramangala", None, Some(400.0)),
            restaurant("Toit", "Indiranagar", Some(4.7), Some(1500.0)),
        ]
    }

    #[test]
    fn test_default_filters_drop_unrated() {
        let rows = sample();
        let filters = Filters::default();
        assert!(filters.is_empty());
        let names: Vec<_> = filters.apply(&rows).iter().map(|r| r.display_name()).collect();
        assert_eq!(names, vec!["Jalsa", "Cafe Coffee Day", "Toit"]);
    }

    #[test]
    fn test_rating_threshold_drops_unrated() {
        let rows = sample();
        let mut filters = Filters::default();
        filters.set_min_rating(3.5);
        let names: Vec<_> = filters.apply(&rows).iter().map(|r| r.display_name()).collect();
        assert_eq!(names, vec!["Jalsa", "Toit"]);
    }

    #[test]
    fn test_location_and_price_combine() {
        let rows = sample();
        let filters = Filters {
            location: Some("Koramangala".into()),
            price: Some(PriceCategory::Budget),
            ..Default::default()
        };
        let out = filters.apply(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_name(), "Cafe Coffee Day");
    }

    #[test]
    fn test_search_is_case_insensitive_literal() {
        let rows = sample();
        let all: Vec<&Restaurant> = rows.iter().collect();
        let hits = search_by_name(&all, "  COFFEE ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name(), "Cafe Coffee Day");
        assert!(search_by_name(&all, "caf.").is_empty());
        assert!(search_by_name(&all, "   ").is_empty());
    }

    #[test]
    fn test_set_min_rating_snaps_and_clamps() {
        let mut filters = Filters::default();
        filters.set_min_rating(3.7);
        assert_eq!(filters.min_rating, 3.5);
        filters.set_min_rating(9.0);
        assert_eq!(filters.min_rating, 5.0);
        filters.set_min_rating(-1.0);
        assert_eq!(filters.min_rating, 0.0);
    }

    #[test]
    fn test_set_min_rating_ignores_non_finite() {
        let mut filters = Filters::default();
        filters.set_min_rating(f64::NAN);
        assert_eq!(filters.min_rating, MIN_RATING_FLOOR);
        filters.set_min_rating(f64::INFINITY);
        assert_eq!(filters.min_rating, MIN_RATING_FLOOR);
        assert_eq!(filters.apply(&sample()).len(), 3);
    }

    #[test]
    fn test_describe_lists_active_filters() {
        let filters = Filters {
            location: Some("BTM".into()),
            min_rating: 4.0,
            ..Default::default()
        };
        assert_eq!(filters.describe(), "Location: BTM | Rating >= 4.0");
        assert_eq!(Filters::default().describe(), "All restaurants");
    }
}
