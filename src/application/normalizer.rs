//! Listing normalizer
//!
//! Turns the raw fragments of one card into a [`ListingCandidate`] or says
//! why the card is not one. Checks run in a fixed order:
//! empty title, brand allow-list, inclusion filter, then field extraction.
//!
//! Year, mileage and fuel are read from the card body (the criteria line)
//! and only fall back to the title when the body has none, so a model
//! number such as "2008" in the title never stands in for the year.

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::constants::keywords::{CAR_KEYWORDS, LISTING_PATH_PATTERNS};
use crate::domain::extractors::{
    BrandMatcher, extract_fuel_type, extract_mileage, extract_price, extract_year,
};
use crate::domain::{ListingCandidate, PriceWindow, RawCard};
use crate::infrastructure::scrape_error::ScrapeError;

/// Why a card did not become a candidate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    #[error("card has no title")]
    EmptyTitle,
    #[error("brand not in allow-list")]
    BrandFiltered,
    #[error("not a car listing")]
    NotACarListing,
}

#[derive(Debug, Clone)]
pub struct ListingNormalizer {
    origin: Option<Url>,
    listing_path_patterns: Vec<String>,
    price_window: PriceWindow,
    /// Lowercased allow-list; empty means every brand passes.
    brand_allow_list: Vec<String>,
    brands: BrandMatcher,
    car_keywords: Vec<String>,
}

impl ListingNormalizer {
    /// Normalizer with the built-in vocabulary. Relative hrefs are joined
    /// with `origin`; without one they are dropped.
    pub fn new(origin: Option<Url>) -> Self {
        Self {
            origin,
            listing_path_patterns: LISTING_PATH_PATTERNS.iter().map(|p| p.to_string()).collect(),
            price_window: PriceWindow::default(),
            brand_allow_list: Vec::new(),
            brands: BrandMatcher::builtin().clone(),
            car_keywords: CAR_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn with_price_window(mut self, window: PriceWindow) -> Self {
        self.price_window = window;
        self
    }

    pub fn with_listing_path_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.listing_path_patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        self
    }

    pub fn with_brand_allow_list<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brand_allow_list = brands
            .into_iter()
            .map(|b| b.as_ref().trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        self
    }

    pub fn with_vocabulary(mut self, brands: BrandMatcher, car_keywords: Vec<String>) -> Self {
        self.brands = brands;
        self.car_keywords = car_keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Pure: the same card always yields the same result.
    pub fn normalize(&self, card: RawCard) -> Result<ListingCandidate, Rejection> {
        let title = card
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::EmptyTitle)?
            .to_string();

        if !self.passes_brand_filter(&title) {
            return Err(Rejection::BrandFiltered);
        }

        let body = card.body.as_deref().unwrap_or_default().trim();
        let url = card.href.as_deref().and_then(|href| self.resolve_url(href));
        if !self.looks_like_car_listing(&title, body, url.as_deref()) {
            return Err(Rejection::NotACarListing);
        }

        let (brand, model) = self.brands.brand_model(&title);
        let price_eur = self.price(card.price_text.as_deref());

        Ok(ListingCandidate {
            brand,
            model,
            year: extract_year(body).or_else(|| extract_year(&title)),
            mileage_km: extract_mileage(body).or_else(|| extract_mileage(&title)),
            fuel_type: extract_fuel_type(body).or_else(|| extract_fuel_type(&title)),
            price_eur,
            location: card.subtitle.as_deref().unwrap_or_default().trim().to_string(),
            url,
            title,
        })
    }

    /// A price text that yields no amount degrades to an absent price.
    fn price(&self, price_text: Option<&str>) -> Option<u32> {
        let text = price_text.map(str::trim).filter(|t| !t.is_empty())?;
        let price = extract_price(text, self.price_window);
        if price.is_none() {
            debug!("{}", ScrapeError::extraction("price_eur", text));
        }
        price
    }

    fn passes_brand_filter(&self, title: &str) -> bool {
        if self.brand_allow_list.is_empty() {
            return true;
        }
        let lower = title.to_lowercase();
        self.brand_allow_list.iter().any(|brand| lower.contains(brand.as_str()))
    }

    fn looks_like_car_listing(&self, title: &str, body: &str, url: Option<&str>) -> bool {
        if let Some(url) = url {
            let path = Url::parse(url)
                .map(|u| u.path().to_lowercase())
                .unwrap_or_else(|_| url.to_lowercase());
            if self.listing_path_patterns.iter().any(|p| path.contains(p.as_str())) {
                return true;
            }
        }

        let text = format!("{title} {body}").to_lowercase();
        self.car_keywords.iter().any(|k| text.contains(k.as_str()))
            || self.brands.brand(&text).is_some()
    }

    /// Absolute hrefs pass through unchanged, relative ones are joined with
    /// the origin.
    fn resolve_url(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        match Url::parse(href) {
            Ok(_) => Some(href.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.origin.as_ref()?.join(href).ok().map(String::from)
            }
            Err(_) if href.starts_with("http://") || href.starts_with("https://") => {
                Some(href.to_string())
            }
            Err(_) => None,
        }
    }
}

impl Default for ListingNormalizer {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FuelType;

    fn normalizer() -> ListingNormalizer {
        ListingNormalizer::new(Url::parse("https://www.leboncoin.fr").ok())
    }

    #[test]
    fn full_card_is_normalized() {
        let card = RawCard::titled("  Renault Clio 1.5 dCi  ")
            .with_subtitle(" Lyon 69003 ")
            .with_body("2016 · 98 000 km · Diesel · Manuelle")
            .with_price("9 490 €")
            .with_href("/ad/voitures/2456789012");

        let candidate = normalizer().normalize(card).unwrap();
        assert_eq!(candidate.title, "Renault Clio 1.5 dCi");
        assert_eq!(candidate.brand, "Renault");
        assert_eq!(candidate.model, "Clio");
        assert_eq!(candidate.year, Some(2016));
        assert_eq!(candidate.mileage_km, Some(98_000));
        assert_eq!(candidate.fuel_type, Some(FuelType::Diesel));
        assert_eq!(candidate.price_eur, Some(9_490));
        assert_eq!(candidate.location, "Lyon 69003");
        assert_eq!(
            candidate.url.as_deref(),
            Some("https://www.leboncoin.fr/ad/voitures/2456789012")
        );
    }

    #[test]
    fn empty_title_is_rejected_first() {
        let card = RawCard::default().with_body("voiture diesel");
        assert_eq!(normalizer().normalize(card), Err(Rejection::EmptyTitle));
        assert_eq!(normalizer().normalize(RawCard::titled("   ")), Err(Rejection::EmptyTitle));
    }

    #[test]
    fn brand_filter_runs_before_inclusion_filter() {
        let n = normalizer().with_brand_allow_list(["Peugeot"]);
        assert_eq!(n.normalize(RawCard::titled("BMW Serie 3")), Err(Rejection::BrandFiltered));
        // would fail the inclusion filter, but the brand filter answers first
        assert_eq!(n.normalize(RawCard::titled("Canapé cuir")), Err(Rejection::BrandFiltered));
        assert!(n.normalize(RawCard::titled("peugeot 208")).is_ok());
    }

    #[test]
    fn non_car_cards_are_rejected() {
        let card = RawCard::titled("Canapé 3 places").with_href("/ad/ameublement/123");
        assert_eq!(normalizer().normalize(card), Err(Rejection::NotACarListing));
    }

    #[test]
    fn listing_path_alone_passes_inclusion() {
        let card = RawCard::titled("Belle affaire").with_href("/ad/voitures/42");
        let candidate = normalizer().normalize(card).unwrap();
        assert_eq!(candidate.brand, "Unknown");
        assert_eq!(candidate.model, "Unknown");
    }

    #[test]
    fn keyword_alone_passes_inclusion() {
        assert!(normalizer().normalize(RawCard::titled("Citadine très propre")).is_ok());
    }

    #[test]
    fn absolute_href_passes_through() {
        let card = RawCard::titled("Peugeot 208").with_href("https://other.example/voiture/1?x=2");
        let url = normalizer().normalize(card).unwrap().url;
        assert_eq!(url.as_deref(), Some("https://other.example/voiture/1?x=2"));
    }

    #[test]
    fn relative_href_without_origin_is_dropped() {
        let card = RawCard::titled("Peugeot 208").with_href("/ad/voitures/1");
        assert_eq!(ListingNormalizer::default().normalize(card).unwrap().url, None);
    }

    #[test]
    fn criteria_win_over_model_numbers_in_the_title() {
        let card = RawCard::titled("Peugeot 2008 Allure")
            .with_body("2019 · 45 000 km · Essence")
            .with_price("17 900 €")
            .with_href("/ad/voitures/77");

        let candidate = normalizer().normalize(card).unwrap();
        assert_eq!(candidate.model, "2008 Allure");
        assert_eq!(candidate.year, Some(2019));
        assert_eq!(candidate.mileage_km, Some(45_000));
        assert_eq!(candidate.fuel_type, Some(FuelType::Essence));
    }

    #[test]
    fn model_number_is_not_glued_to_the_mileage() {
        let card = RawCard::titled("Peugeot 308").with_body("120 000 km · Diesel");
        let candidate = normalizer().normalize(card).unwrap();
        assert_eq!(candidate.model, "308");
        assert_eq!(candidate.mileage_km, Some(120_000));
        assert_eq!(candidate.year, None);
    }

    #[test]
    fn title_is_the_fallback_when_the_body_is_silent() {
        let card = RawCard::titled("Renault Megane 2017 1.5 dCi 110000 km").with_body("Très bon état");
        let candidate = normalizer().normalize(card).unwrap();
        assert_eq!(candidate.year, Some(2017));
        assert_eq!(candidate.mileage_km, Some(110_000));
        assert_eq!(candidate.fuel_type, Some(FuelType::Diesel));
    }

    #[test]
    fn first_amount_of_a_discounted_price_is_kept() {
        let card = RawCard::titled("Peugeot 208").with_price("9 490 € 10 500 €");
        assert_eq!(normalizer().normalize(card).unwrap().price_eur, Some(9_490));
    }

    #[test]
    fn out_of_window_price_is_absent() {
        let card = RawCard::titled("Peugeot 208").with_price("150 €");
        assert_eq!(normalizer().normalize(card.clone()).unwrap().price_eur, None);

        let cheap = normalizer().with_price_window(PriceWindow::new(100, 1000));
        assert_eq!(cheap.normalize(card).unwrap().price_eur, Some(150));
    }
}
