//! Used-car classified listing scraper
//!
//! Walks the result pages of a classified site, turns each card into a
//! normalized [`domain::CarListing`], drops duplicates and exports the
//! collected listings.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CrawlLoop, CrawlOptions, CrawlOutcome, ListingNormalizer};
pub use domain::{CarListing, ResultSet, StopReason};
pub use infrastructure::{ScrapeError, SiteProfile};
