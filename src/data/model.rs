//! Restaurant Data Model
//! Typed rows produced by the cleaning step.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Price band derived from the approximate cost for two people (INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PriceCategory {
    Budget,
    Moderate,
    Expensive,
    Luxury,
    Unknown,
}

impl PriceCategory {
    pub const ALL: [PriceCategory; 5] = [
        PriceCategory::Budget,
        PriceCategory::Moderate,
        PriceCategory::Expensive,
        PriceCategory::Luxury,
        PriceCategory::Unknown,
    ];

    /// Categories backed by an actual cost value.
    pub const KNOWN: [PriceCategory; 4] = [
        PriceCategory::Budget,
        PriceCategory::Moderate,
        PriceCategory::Expensive,
        PriceCategory::Luxury,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PriceCategory::Budget => "Budget",
            PriceCategory::Moderate => "Moderate",
            PriceCategory::Expensive => "Expensive",
            PriceCategory::Luxury => "Luxury",
            PriceCategory::Unknown => "Unknown",
        }
    }

    /// Parse a category from its label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single cleaned restaurant listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Restaurant {
    pub name: Option<String>,
    pub location: Option<String>,
    /// Zone the listing was published under (`listed_in(city)`).
    pub city: Option<String>,
    /// Listing type such as "Delivery" or "Dine-out" (`listed_in(type)`).
    pub listing_type: Option<String>,
    pub rest_type: Option<String>,
    pub cuisines: Vec<String>,
    pub rate: Option<f64>,
    pub votes: Option<f64>,
    pub cost_for_two: Option<f64>,
    pub online_order: Option<bool>,
    pub book_table: Option<bool>,
    pub price_category: PriceCategory,
}

impl Default for PriceCategory {
    fn default() -> Self {
        PriceCategory::Unknown
    }
}

impl Restaurant {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    pub fn display_location(&self) -> &str {
        self.location.as_deref().unwrap_or("-")
    }
}

/// Cleaned dataset together with where it came from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub source: PathBuf,
    pub rows: Vec<Restaurant>,
}

impl Dataset {
    pub fn new(source: PathBuf, rows: Vec<Restaurant>) -> Self {
        Self { source, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct locations, sorted.
    pub fn locations(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| r.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Price categories that occur in the data, in band order.
    pub fn price_categories(&self) -> Vec<PriceCategory> {
        self.rows
            .iter()
            .map(|r| r.price_category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
