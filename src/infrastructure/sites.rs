//! Site profiles
//!
//! Everything that differs between classified sites: where the search
//! starts, how cards are marked up, which URL paths are vehicle listings and
//! which prices are plausible.

use anyhow::{Context, Result};
use url::Url;

use crate::application::ListingNormalizer;
use crate::domain::PriceWindow;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::parsing::CardSelectors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub name: &'static str,
    pub display_name: &'static str,
    pub origin: &'static str,
    pub search_url: &'static str,
    pub selectors: CardSelectors,
    pub listing_path_patterns: Vec<&'static str>,
    pub price_window: PriceWindow,
    /// Accepts `price=0-N` in the search URL
    pub supports_max_price: bool,
    /// Only meaningful for "load more" listings: a fixed page size repeats
    /// the same card count on every page.
    pub stuck_detection: bool,
}

impl SiteProfile {
    pub fn leboncoin() -> Self {
        Self {
            name: "leboncoin",
            display_name: "LeBonCoin",
            origin: "https://www.leboncoin.fr",
            search_url: "https://www.leboncoin.fr/recherche?category=2&locations=France",
            selectors: CardSelectors::leboncoin(),
            listing_path_patterns: vec!["/ad/voitures/", "/voitures/"],
            price_window: PriceWindow::new(500, 200_000),
            supports_max_price: true,
            stuck_detection: false,
        }
    }

    pub fn topannonces() -> Self {
        Self {
            name: "topannonces",
            display_name: "TopAnnonces",
            origin: "https://www.topannonces.fr",
            search_url: "https://www.topannonces.fr/voitures",
            selectors: CardSelectors::generic(),
            listing_path_patterns: vec!["/voiture", "/annonce-voiture"],
            price_window: PriceWindow::new(500, 200_000),
            supports_max_price: false,
            stuck_detection: false,
        }
    }

    pub fn paruvendu() -> Self {
        Self {
            name: "paruvendu",
            display_name: "ParuVendu",
            origin: "https://www.paruvendu.fr",
            search_url: "https://www.paruvendu.fr/voiture-occasion/",
            selectors: CardSelectors::generic(),
            listing_path_patterns: vec!["/auto-moto/", "/voiture-occasion/", "/a/voiture"],
            price_window: PriceWindow::new(300, 250_000),
            supports_max_price: false,
            stuck_detection: false,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::leboncoin(), Self::topannonces(), Self::paruvendu()]
    }

    pub fn by_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::all().into_iter().find(|site| site.name == name)
    }

    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(self.origin).with_context(|| format!("Invalid origin for {}", self.name))
    }

    /// Search URL, with the price bound appended where the site supports it
    pub fn start_url(&self, max_price: Option<u32>) -> Result<Url> {
        let mut url = Url::parse(self.search_url)
            .with_context(|| format!("Invalid search URL for {}", self.name))?;
        if let Some(max) = max_price.filter(|_| self.supports_max_price) {
            url.query_pairs_mut().append_pair("price", &format!("0-{max}"));
        }
        Ok(url)
    }

    /// Normalizer tuned for this site and the configured filters/vocabulary
    pub fn normalizer(&self, config: &AppConfig) -> Result<ListingNormalizer> {
        Ok(ListingNormalizer::new(Some(self.origin_url()?))
            .with_price_window(self.price_window)
            .with_listing_path_patterns(&self.listing_path_patterns)
            .with_brand_allow_list(&config.filters.brand_allow_list)
            .with_vocabulary(
                config.vocabulary.brand_matcher()?,
                config.vocabulary.car_keywords.clone(),
            ))
    }
}
