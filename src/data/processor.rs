//! Data Processor Module
//! Cleans raw Zomato columns into typed restaurant rows and back into a DataFrame.

use super::model::{PriceCategory, Restaurant};
use polars::prelude::*;

/// Raw column names of the Zomato Bengaluru export.
pub mod columns {
    pub const NAME: &str = "name";
    pub const LOCATION: &str = "location";
    pub const CITY: &str = "listed_in(city)";
    pub const LISTING_TYPE: &str = "listed_in(type)";
    pub const REST_TYPE: &str = "rest_type";
    pub const CUISINES: &str = "cuisines";
    pub const RATE: &str = "rate";
    pub const VOTES: &str = "votes";
    pub const COST: &str = "approx_cost(for two people)";
    pub const ONLINE_ORDER: &str = "online_order";
    pub const BOOK_TABLE: &str = "book_table";
}

/// Rating placeholders used by Zomato for unrated venues.
const RATE_PLACEHOLDERS: [&str; 4] = ["NEW", "-", "nan", ""];

/// Parse a rating such as `"4.1/5"` into `4.1`.
pub fn parse_rate(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if RATE_PLACEHOLDERS.contains(&raw) {
        return None;
    }
    let score = raw.split('/').next()?.trim();
    score.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a cost such as `"1,200"` into `1200.0`.
pub fn parse_cost(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?.replace(',', "");
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric coercion for vote counts, invalid input becomes missing.
pub fn parse_votes(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_yes_no(raw: Option<&str>) -> Option<bool> {
    match raw?.trim() {
        v if v.eq_ignore_ascii_case("yes") => Some(true),
        v if v.eq_ignore_ascii_case("no") => Some(false),
        _ => None,
    }
}

fn yes_no_label(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Split a comma separated cuisine list, dropping blanks.
pub fn split_cuisines(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Bucket a cost for two into a price band.
pub fn categorize_price(cost: Option<f64>) -> PriceCategory {
    match cost {
        None => PriceCategory::Unknown,
        Some(c) if c < 300.0 => PriceCategory::Budget,
        Some(c) if c < 700.0 => PriceCategory::Moderate,
        Some(c) if c < 1500.0 => PriceCategory::Expensive,
        Some(_) => PriceCategory::Luxury,
    }
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Read a column as trimmed optional text. Missing columns read as all-null.
    fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let Ok(column) = df.column(name) else {
            log::debug!("column '{}' absent, treating as empty", name);
            return Ok(vec![None; df.height()]);
        };
        let column = column.cast(&DataType::String)?;
        let ca = column.str()?;
        Ok(ca
            .into_iter()
            .map(|v| {
                v.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect())
    }

    /// Clean a raw DataFrame into restaurant rows.
    pub fn clean(df: &DataFrame) -> PolarsResult<Vec<Restaurant>> {
        let names = Self::text_column(df, columns::NAME)?;
        let locations = Self::text_column(df, columns::LOCATION)?;
        let cities = Self::text_column(df, columns::CITY)?;
        let listing_types = Self::text_column(df, columns::LISTING_TYPE)?;
        let rest_types = Self::text_column(df, columns::REST_TYPE)?;
        let cuisines = Self::text_column(df, columns::CUISINES)?;
        let rates = Self::text_column(df, columns::RATE)?;
        let votes = Self::text_column(df, columns::VOTES)?;
        let costs = Self::text_column(df, columns::COST)?;
        let online = Self::text_column(df, columns::ONLINE_ORDER)?;
        let booking = Self::text_column(df, columns::BOOK_TABLE)?;

        let rows = (0..df.height())
            .map(|i| {
                let cost_for_two = parse_cost(costs[i].as_deref());
                Restaurant {
                    name: names[i].clone(),
                    location: locations[i].clone(),
                    city: cities[i].clone(),
                    listing_type: listing_types[i].clone(),
                    rest_type: rest_types[i].clone(),
                    cuisines: split_cuisines(cuisines[i].as_deref()),
                    rate: parse_rate(rates[i].as_deref()),
                    votes: parse_votes(votes[i].as_deref()),
                    cost_for_two,
                    online_order: parse_yes_no(online[i].as_deref()),
                    book_table: parse_yes_no(booking[i].as_deref()),
                    price_category: categorize_price(cost_for_two),
                }
            })
            .collect();

        Ok(rows)
    }

    /// Build a cleaned DataFrame from rows, keeping the original column names.
    pub fn to_dataframe<'a, I>(rows: I) -> PolarsResult<DataFrame>
    where
        I: IntoIterator<Item = &'a Restaurant>,
    {
        let mut names: Vec<Option<String>> = Vec::new();
        let mut locations: Vec<Option<String>> = Vec::new();
        let mut cities: Vec<Option<String>> = Vec::new();
        let mut listing_types: Vec<Option<String>> = Vec::new();
        let mut rest_types: Vec<Option<String>> = Vec::new();
        let mut cuisines: Vec<Option<String>> = Vec::new();
        let mut rates: Vec<Option<f64>> = Vec::new();
        let mut votes: Vec<Option<f64>> = Vec::new();
        let mut costs: Vec<Option<f64>> = Vec::new();
        let mut online: Vec<Option<&str>> = Vec::new();
        let mut booking: Vec<Option<&str>> = Vec::new();
        let mut categories: Vec<String> = Vec::new();

        for r in rows {
            names.push(r.name.clone());
            locations.push(r.location.clone());
            cities.push(r.city.clone());
            listing_types.push(r.listing_type.clone());
            rest_types.push(r.rest_type.clone());
            cuisines.push((!r.cuisines.is_empty()).then(|| r.cuisines.join(", ")));
            rates.push(r.rate);
            votes.push(r.votes);
            costs.push(r.cost_for_two);
            online.push(r.online_order.map(yes_no_label));
            booking.push(r.book_table.map(yes_no_label));
            categories.push(r.price_category.label().to_string());
        }

        DataFrame::new(vec![
            Column::new(columns::NAME.into(), names),
            Column::new(columns::LOCATION.into(), locations),
            Column::new(columns::CITY.into(), cities),
            Column::new(columns::LISTING_TYPE.into(), listing_types),
            Column::new(columns::REST_TYPE.into(), rest_types),
            Column::new(columns::CUISINES.into(), cuisines),
            Column::new(columns::RATE.into(), rates),
            Column::new(columns::VOTES.into(), votes),
            Column::new(columns::COST.into(), costs),
            Column::new(columns::ONLINE_ORDER.into(), online),
            Column::new(columns::BOOK_TABLE.into(), booking),
            Column::new("price_category".into(), categories),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_variants() {
        assert_eq!(parse_rate(Some("4.1/5")), Some(4.1));
        assert_eq!(parse_rate(Some("3.9 /5")), Some(3.9));
        assert_eq!(parse_rate(Some(" 2.5/5 ")), Some(2.5));
        assert_eq!(parse_rate(Some("NEW")), None);
        assert_eq!(parse_rate(Some("-")), None);
        assert_eq!(parse_rate(Some("nan")), None);
        assert_eq!(parse_rate(Some("")), None);
        assert_eq!(parse_rate(Some("great")), None);
        assert_eq!(parse_rate(None), None);
    }

    #[test]
    fn test_parse_cost_strips_thousands_separator() {
        assert_eq!(parse_cost(Some("1,200")), Some(1200.0));
        assert_eq!(parse_cost(Some(" 800 ")), Some(800.0));
        assert_eq!(parse_cost(Some("n/a")), None);
        assert_eq!(parse_cost(None), None);
    }

    #[test]
    fn test_parse_votes_and_flags() {
        assert_eq!(parse_votes(Some("775")), Some(775.0));
        assert_eq!(parse_votes(Some("many")), None);
        assert_eq!(parse_yes_no(Some("Yes")), Some(true));
        assert_eq!(parse_yes_no(Some("no")), Some(false));
        assert_eq!(parse_yes_no(Some("maybe")), None);
    }

    #[test]
    fn test_split_cuisines_trims_and_drops_blanks() {
        assert_eq!(
            split_cuisines(Some("North Indian, Mughlai,, Chinese ")),
            vec!["North Indian", "Mughlai", "Chinese"]
        );
        assert!(split_cuisines(None).is_empty());
    }

    #[test]
    fn test_categorize_price_boundaries() {
        assert_eq!(categorize_price(None), PriceCategory::Unknown);
        assert_eq!(categorize_price(Some(299.0)), PriceCategory::Budget);
        assert_eq!(categorize_price(Some(300.0)), PriceCategory::Moderate);
        assert_eq!(categorize_price(Some(699.0)), PriceCategory::Moderate);
        assert_eq!(categorize_price(Some(700.0)), PriceCategory::Expensive);
        assert_eq!(categorize_price(Some(1499.0)), PriceCategory::Expensive);
        assert_eq!(categorize_price(Some(1500.0)), PriceCategory::Luxury);
    }

    #[test]
    fn test_clean_treats_missing_columns_as_null() {
        let df = DataFrame::new(vec![
            Column::new("name".into(), vec![Some("Jalsa"), Some("  ")]),
            Column::new("rate".into(), vec![Some("4.1/5"), Some("NEW")]),
            Column::new(
                "approx_cost(for two people)".into(),
                vec![Some("1,500"), None],
            ),
        ])
        .unwrap();

        let rows = DataProcessor::clean(&df).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("Jalsa"));
        assert_eq!(rows[0].rate, Some(4.1));
        assert_eq!(rows[0].cost_for_two, Some(1500.0));
        assert_eq!(rows[0].price_category, PriceCategory::Luxury);
        assert_eq!(rows[0].location, None);
        assert!(rows[0].cuisines.is_empty());
        assert_eq!(rows[1].name, None);
        assert_eq!(rows[1].rate, None);
        assert_eq!(rows[1].price_category, PriceCategory::Unknown);
    }

    #[test]
    fn test_to_dataframe_keeps_columns() {
        let rows = vec![Restaurant {
            name: Some("Spice Elephant".into()),
            cuisines: vec!["Chinese".into(), "Thai".into()],
            rate: Some(4.1),
            price_category: PriceCategory::Moderate,
            ..Default::default()
        }];
        let df = DataProcessor::to_dataframe(&rows).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 12);
        let cuisines = df.column(columns::CUISINES).unwrap();
        assert_eq!(cuisines.str().unwrap().get(0), Some("Chinese, Thai"));
    }
}
