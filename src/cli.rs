//! CLI argument parsing for Zomato Explorer

use crate::data::{Filters, PriceCategory};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zomato_explorer")]
#[command(version)]
#[command(about = "Bengaluru restaurant listings explorer", long_about = None)]
pub struct Cli {
    /// Path to the Zomato CSV export (defaults to data/zomato.csv)
    #[arg(long = "data", value_name = "PATH", env = "ZOMATO_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Headless command; the dashboard window opens when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the dashboard metrics as JSON
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        /// Also list restaurants whose name contains this text
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,
    },
    /// Render all charts into a PowerPoint report
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output .pptx file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Write the cleaned, filtered table as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output .csv file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only this location (exact name)
    #[arg(long, value_name = "NAME")]
    pub location: Option<String>,

    /// Keep only this price category (budget, moderate, expensive, luxury, unknown)
    #[arg(long, value_name = "CATEGORY", value_parser = parse_price)]
    pub price: Option<PriceCategory>,

    /// Minimum rating, 0 to 5 in steps of 0.5
    #[arg(long = "min-rating", value_name = "RATING", default_value_t = 0.0, value_parser = parse_min_rating)]
    pub min_rating: f64,
}

fn parse_price(raw: &str) -> Result<PriceCategory, String> {
    PriceCategory::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = PriceCategory::ALL.iter().map(|p| p.label()).collect();
        format!("unknown price category '{}' (expected one of: {})", raw, known.join(", "))
    })
}

fn parse_min_rating(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !value.is_finite() {
        return Err(format!("minimum rating must be a finite number, got '{}'", raw));
    }
    Ok(value)
}

impl FilterArgs {
    pub fn to_filters(&self) -> Filters {
        let mut filters = Filters {
            location: self.location.clone(),
            price: self.price,
            ..Default::default()
        };
        filters.set_min_rating(self.min_rating);
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_opens_gui() {
        let cli = Cli::try_parse_from(["zomato_explorer"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_summary_with_filters() {
        let cli = Cli::try_parse_from([
            "zomato_explorer",
            "summary",
            "--location",
            "BTM",
            "--price",
            "moderate",
            "--min-rating",
            "3.7",
            "--search",
            "cafe",
            "--data",
            "x.csv",
        ])
        .unwrap();

        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
        match cli.command {
            Some(Command::Summary { filters, search }) => {
                let f = filters.to_filters();
                assert_eq!(f.location.as_deref(), Some("BTM"));
                assert_eq!(f.price, Some(PriceCategory::Moderate));
                assert_eq!(f.min_rating, 3.5);
                assert_eq!(search.as_deref(), Some("cafe"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_report_requires_output() {
        assert!(Cli::try_parse_from(["zomato_explorer", "report"]).is_err());
        let cli =
            Cli::try_parse_from(["zomato_explorer", "report", "-o", "deck.pptx"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Report { .. })));
    }

    #[test]
    fn test_non_finite_min_rating_rejected() {
        for bad in ["NaN", "inf", "abc"] {
            assert!(
                Cli::try_parse_from(["zomato_explorer", "summary", "--min-rating", bad]).is_err(),
                "{} should be rejected",
                bad
            );
        }
        let cli = Cli::try_parse_from(["zomato_explorer", "summary", "--min-rating", "4"]).unwrap();
        match cli.command {
            Some(Command::Summary { filters, .. }) => assert_eq!(filters.to_filters().min_rating, 4.0),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_price_rejected() {
        assert!(Cli::try_parse_from(["zomato_explorer", "export", "-o", "a.csv", "--price", "cheap"]).is_err());
    }
}
