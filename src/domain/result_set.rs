//! Accumulated listings of one crawl and their summary statistics.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::listing::CarListing;

/// Accepted listings in encounter order. Only the crawl loop appends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    listings: Vec<CarListing>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, listing: CarListing) {
        self.listings.push(listing);
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CarListing> {
        self.listings.iter()
    }

    pub fn as_slice(&self) -> &[CarListing] {
        &self.listings
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_listings(&self.listings)
    }
}

impl From<Vec<CarListing>> for ResultSet {
    fn from(listings: Vec<CarListing>) -> Self {
        Self { listings }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CarListing;
    type IntoIter = std::slice::Iter<'a, CarListing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

/// Price statistics over listings with a known price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub average: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
}

/// Overview of a result set, printed after a crawl.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub total: usize,
    pub unique_brands: usize,
    pub unique_models: usize,
    pub prices: Option<PriceStats>,
    pub year_range: Option<(u16, u16)>,
    /// Most frequent brands, at most five, by descending count then name.
    pub top_brands: Vec<(String, usize)>,
}

impl ResultSummary {
    pub fn from_listings(listings: &[CarListing]) -> Self {
        let unique_brands = listings.iter().map(|l| l.brand.as_str()).collect::<HashSet<_>>().len();
        let unique_models = listings.iter().map(|l| l.model.as_str()).collect::<HashSet<_>>().len();

        let mut prices: Vec<u32> = listings.iter().filter_map(|l| l.price_eur).collect();
        prices.sort_unstable();
        let prices = price_stats(&prices);

        let years = listings.iter().filter_map(|l| l.year);
        let year_range = years.clone().min().zip(years.max());

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for listing in listings {
            *counts.entry(listing.brand.as_str()).or_default() += 1;
        }
        let mut top_brands: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(brand, count)| (brand.to_string(), count))
            .collect();
        top_brands.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_brands.truncate(5);

        Self {
            total: listings.len(),
            unique_brands,
            unique_models,
            prices,
            year_range,
            top_brands,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn price_stats(sorted: &[u32]) -> Option<PriceStats> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let sum: u64 = sorted.iter().map(|&p| u64::from(p)).sum();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
    } else {
        f64::from(sorted[mid])
    };
    Some(PriceStats {
        average: sum as f64 / sorted.len() as f64,
        median,
        min,
        max,
    })
}
