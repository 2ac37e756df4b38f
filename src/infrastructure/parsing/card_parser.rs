//! Results page parser
//!
//! Turns one HTML snapshot into owned card fragments and the href of the
//! "next page" control. `scraper::Html` is not `Send`, so everything is
//! extracted synchronously and the document is dropped before returning.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::config::{BLOCK_MARKERS, CardSelectors};
use crate::application::{CardField, CardHandle};
use crate::domain::RawCard;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

/// Owned extraction result of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub cards: Vec<RawCard>,
    pub next_href: Option<String>,
    /// Anti-bot marker found on a page without cards
    pub block_marker: Option<String>,
}

impl ParsedPage {
    pub fn handles(&self) -> Vec<CardHandle> {
        (0..self.cards.len()).map(CardHandle).collect()
    }

    fn card(&self, handle: CardHandle) -> ScrapeResult<&RawCard> {
        self.cards
            .get(handle.0)
            .ok_or_else(|| ScrapeError::card(handle.0, "handle does not belong to the current page"))
    }

    pub fn card_text(&self, handle: CardHandle, field: CardField) -> ScrapeResult<Option<String>> {
        let card = self.card(handle)?;
        Ok(match field {
            CardField::Title => card.title.clone(),
            CardField::Subtitle => card.subtitle.clone(),
            CardField::Body => card.body.clone(),
            CardField::Price => card.price_text.clone(),
        })
    }

    pub fn card_href(&self, handle: CardHandle) -> ScrapeResult<Option<String>> {
        Ok(self.card(handle)?.href.clone())
    }
}

#[derive(Debug, Clone)]
pub struct CardListParser {
    card: Vec<Selector>,
    title: Vec<Selector>,
    subtitle: Vec<Selector>,
    body: Vec<Selector>,
    price: Vec<Selector>,
    link: Vec<Selector>,
    next_page: Vec<Selector>,
}

impl CardListParser {
    pub fn new(selectors: &CardSelectors) -> ScrapeResult<Self> {
        Ok(Self {
            card: Self::compile_selectors(&selectors.card)?,
            title: Self::compile_selectors(&selectors.title)?,
            subtitle: Self::compile_selectors(&selectors.subtitle)?,
            body: Self::compile_selectors(&selectors.body)?,
            price: Self::compile_selectors(&selectors.price)?,
            link: Self::compile_selectors(&selectors.link)?,
            next_page: Self::compile_selectors(&selectors.next_page)?,
        })
    }

    /// Invalid selectors are skipped; a list with no valid selector is an error.
    fn compile_selectors(selector_strings: &[String]) -> ScrapeResult<Vec<Selector>> {
        let mut selectors = Vec::new();
        let mut last_error = None;

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push(selector),
                Err(e) => {
                    warn!("Failed to compile selector '{}': {}", selector_str, e);
                    last_error = Some(ScrapeError::invalid_selector(selector_str, e));
                }
            }
        }

        if selectors.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| ScrapeError::invalid_selector("", "empty selector list")));
        }
        Ok(selectors)
    }

    pub fn parse_page(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        let cards: Vec<RawCard> = self
            .card
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|elements| !elements.is_empty())
            .unwrap_or_default()
            .into_iter()
            .map(|element| self.read_card(element))
            .collect();

        let next_href = self.next_page.iter().find_map(|selector| {
            document
                .select(selector)
                .filter(|el| el.value().attr("aria-disabled") != Some("true"))
                .filter_map(|el| el.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"))
                .map(str::to_string)
        });

        let block_marker = if cards.is_empty() {
            detect_block_marker(html)
        } else {
            None
        };

        debug!("Parsed {} cards, next page: {:?}", cards.len(), next_href);
        ParsedPage {
            cards,
            next_href,
            block_marker,
        }
    }

    fn read_card(&self, element: ElementRef<'_>) -> RawCard {
        let own_href = match element.value().name() {
            "a" => element.value().attr("href").map(str::to_string),
            _ => None,
        };
        let href = own_href.or_else(|| {
            self.link.iter().find_map(|selector| {
                element
                    .select(selector)
                    .find_map(|a| a.value().attr("href"))
                    .map(str::to_string)
            })
        });

        RawCard {
            title: first_text(element, &self.title),
            subtitle: first_text(element, &self.subtitle),
            body: first_text(element, &self.body),
            price_text: first_text(element, &self.price),
            href,
        }
    }
}

/// Whitespace-collapsed text of the first non-empty match
fn first_text(element: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        element
            .select(selector)
            .map(collapsed_text)
            .find(|text| !text.is_empty())
    })
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase marker of a bot-challenge page, if any
pub fn detect_block_marker(html: &str) -> Option<String> {
    let lower = html.to_lowercase();
    BLOCK_MARKERS
        .iter()
        .find(|marker| lower.contains(*marker))
        .map(|marker| marker.to_string())
}
