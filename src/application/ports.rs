//! Collaborator traits consumed by the crawl loop
//!
//! The loop only sees cards through opaque handles. Adapters decide what a
//! handle points to (an element of a parsed snapshot, a scripted fixture...).

use async_trait::async_trait;
use std::io::Write;

use crate::domain::ResultSet;
use crate::infrastructure::scrape_error::ScrapeResult;

/// Opaque reference to one card of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardHandle(pub usize);

/// Text fragments a card exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Title,
    Subtitle,
    Body,
    Price,
}

/// Read access to the cards of the page currently loaded.
#[async_trait]
pub trait PageSource: Send {
    /// Cards of the current page, loading it first when needed.
    async fn current_cards(&mut self) -> ScrapeResult<Vec<CardHandle>>;

    /// `Ok(None)` when the card has no such fragment; `Err` when the handle
    /// can no longer be read.
    fn card_text(&self, card: CardHandle, field: CardField) -> ScrapeResult<Option<String>>;

    fn card_href(&self, card: CardHandle) -> ScrapeResult<Option<String>>;
}

/// Moves a page source to its next page.
#[async_trait]
pub trait Paginator: Send {
    /// Whether an actionable "next page" control exists on the current page.
    fn has_next(&self) -> bool;

    async fn advance(&mut self) -> ScrapeResult<()>;
}

/// Writes a result set to a byte sink.
pub trait Exporter {
    /// Short format name, also used as file extension.
    fn format(&self) -> &'static str;

    fn export(&self, results: &ResultSet, sink: &mut dyn Write) -> anyhow::Result<()>;
}
