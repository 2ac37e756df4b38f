//! Selector configuration for listing cards
//!
//! Every field has an ordered list of CSS selectors; the first one that
//! matches inside a card wins.

use serde::{Deserialize, Serialize};

/// CSS selectors for one results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSelectors {
    /// Card containers - the first selector that matches anything is used
    pub card: Vec<String>,

    pub title: Vec<String>,

    /// Location line
    pub subtitle: Vec<String>,

    /// Criteria / description text (year, mileage, fuel...)
    pub body: Vec<String>,

    pub price: Vec<String>,

    /// Link to the listing; the card itself is tried when it is an `<a>`
    pub link: Vec<String>,

    /// "Next page" control, searched in the whole document
    pub next_page: Vec<String>,
}

fn owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| s.to_string()).collect()
}

impl CardSelectors {
    /// LeBonCoin marks its result cards with `data-qa-id` attributes
    pub fn leboncoin() -> Self {
        Self {
            card: owned(&["[data-qa-id='aditem_container']", "a[data-test-id='ad']"]),
            title: owned(&["[data-qa-id='aditem_title']", "p[data-test-id='adcard-title']", "h2"]),
            subtitle: owned(&["[data-qa-id='aditem_location']", "p[aria-label*='Située']"]),
            body: owned(&["[data-qa-id='aditem_criteria']", "[data-test-id='ad-params-labels']"]),
            price: owned(&["[data-qa-id='aditem_price']", "[data-test-id='price']"]),
            link: owned(&["a[href*='/ad/']", "a[href]"]),
            next_page: owned(&[
                "[data-qa-id='pagination_next_page']",
                "a[aria-label='Page suivante']",
                "a[rel='next']",
            ]),
        }
    }

    /// Fallback selectors for classified sites without stable hooks
    pub fn generic() -> Self {
        Self {
            card: owned(&[
                "article",
                "div[class*='card']",
                "div[class*='annonce']",
                "li[class*='result']",
                "a[href*='voiture']",
            ]),
            title: owned(&["h2", "h3", "[class*='title']", "[class*='titre']"]),
            subtitle: owned(&["[class*='location']", "[class*='localisation']", "[class*='city']", "[class*='ville']"]),
            body: owned(&["[class*='description']", "[class*='criteria']", "[class*='details']", "ul", "p"]),
            price: owned(&["[class*='price']", "[class*='prix']"]),
            link: owned(&["a[href*='voiture']", "a[href*='annonce']", "a[href]"]),
            next_page: owned(&[
                "a[rel='next']",
                "a[class*='next']",
                "a[class*='suivant']",
                "a[aria-label*='suivante']",
            ]),
        }
    }
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self::generic()
    }
}

/// Markers of anti-bot challenge pages, lowercase
pub const BLOCK_MARKERS: &[&str] = &[
    "captcha",
    "datadome",
    "cloudflare",
    "recaptcha",
    "bot protection",
    "access denied",
    "accès refusé",
    "verify you are human",
];
