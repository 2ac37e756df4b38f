//! Listing records and the value types they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when a brand or model cannot be recognised.
pub const UNKNOWN: &str = "Unknown";

/// Valid model years, inclusive.
pub const YEAR_RANGE: std::ops::RangeInclusive<u16> = 1990..=2026;

/// Valid odometer readings in kilometres, inclusive.
pub const MILEAGE_RANGE: std::ops::RangeInclusive<u32> = 0..=500_000;

/// Canonical fuel types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Essence,
    Diesel,
    #[serde(rename = "Électrique")]
    Electrique,
    Hybride,
    #[serde(rename = "GPL")]
    Gpl,
}

impl FuelType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Essence => "Essence",
            Self::Diesel => "Diesel",
            Self::Electrique => "Électrique",
            Self::Hybride => "Hybride",
            Self::Gpl => "GPL",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive price window in euros. Varies per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceWindow {
    pub min: u32,
    pub max: u32,
}

impl PriceWindow {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: u64) -> bool {
        price >= u64::from(self.min) && price <= u64::from(self.max)
    }
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self::new(500, 200_000)
    }
}

/// Raw text fragments of one card as read from a page source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: Option<String>,
    /// Usually the location line.
    pub subtitle: Option<String>,
    /// Description or criteria text (year, mileage, fuel...).
    pub body: Option<String>,
    pub price_text: Option<String>,
    pub href: Option<String>,
}

impl RawCard {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_price(mut self, price_text: impl Into<String>) -> Self {
        self.price_text = Some(price_text.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// A normalized card that passed the filters but has not been accepted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCandidate {
    pub title: String,
    pub brand: String,
    pub model: String,
    pub year: Option<u16>,
    pub mileage_km: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub price_eur: Option<u32>,
    pub location: String,
    pub url: Option<String>,
}

impl ListingCandidate {
    /// Materializes the record. Called only once the ledger accepted the candidate.
    pub fn into_listing(self, scraped_at: DateTime<Utc>) -> CarListing {
        CarListing {
            title: self.title,
            brand: self.brand,
            model: self.model,
            year: self.year,
            mileage_km: self.mileage_km,
            fuel_type: self.fuel_type,
            price_eur: self.price_eur,
            location: self.location,
            url: self.url,
            scraped_at,
        }
    }
}

/// Accepted used-car listing. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarListing {
    pub title: String,
    pub brand: String,
    pub model: String,
    pub year: Option<u16>,
    pub mileage_km: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub price_eur: Option<u32>,
    pub location: String,
    pub url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl fmt::Display for CarListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.brand, self.model)?;
        if let Some(year) = self.year {
            write!(f, " ({year})")?;
        }
        if let Some(price) = self.price_eur {
            write!(f, " - {price} €")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_type_serializes_to_french_labels() {
        let json = serde_json::to_string(&FuelType::Electrique).unwrap();
        assert_eq!(json, "\"Électrique\"");
        assert_eq!(FuelType::Gpl.to_string(), "GPL");
    }

    #[test]
    fn default_price_window_bounds_are_inclusive() {
        let window = PriceWindow::default();
        assert!(window.contains(500));
        assert!(window.contains(200_000));
        assert!(!window.contains(499));
        assert!(!window.contains(200_001));
    }

    #[test]
    fn display_includes_year_and_price_when_known() {
        let listing = ListingCandidate {
            title: "Peugeot 208".into(),
            brand: "Peugeot".into(),
            model: "208".into(),
            year: Some(2019),
            mileage_km: None,
            fuel_type: None,
            price_eur: Some(12_500),
            location: String::new(),
            url: None,
        }
        .into_listing(Utc::now());

        assert_eq!(listing.to_string(), "Peugeot 208 (2019) - 12500 €");
    }
}
