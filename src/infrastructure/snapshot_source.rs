//! Page source over saved HTML pages
//!
//! Replays results pages saved from a browser, in order. The next page
//! exists as long as snapshots remain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::application::{CardField, CardHandle, PageSource, Paginator};
use crate::infrastructure::parsing::{CardListParser, ParsedPage};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

pub struct SnapshotListingSource {
    parser: CardListParser,
    pages: Vec<(String, String)>,
    index: usize,
    page: Option<ParsedPage>,
}

impl SnapshotListingSource {
    /// `pages` are `(label, html)` pairs in crawl order.
    pub fn from_html(parser: CardListParser, pages: Vec<(String, String)>) -> Self {
        Self {
            parser,
            pages,
            index: 0,
            page: None,
        }
    }

    pub async fn from_files(parser: CardListParser, paths: &[PathBuf]) -> Result<Self> {
        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            pages.push((label(path), read_snapshot(path).await?));
        }
        Ok(Self::from_html(parser, pages))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_current(&mut self) -> ScrapeResult<()> {
        let page_number = u32::try_from(self.index + 1).unwrap_or(u32::MAX);
        let (label, html) = self
            .pages
            .get(self.index)
            .ok_or_else(|| ScrapeError::navigation(page_number, "no snapshot left"))?;

        let parsed = self.parser.parse_page(html);
        if let Some(marker) = &parsed.block_marker {
            return Err(ScrapeError::blocked(label, marker));
        }
        info!("📄 Replaying snapshot {} ({} cards)", label, parsed.cards.len());
        self.page = Some(parsed);
        Ok(())
    }

    fn parsed(&self) -> ScrapeResult<&ParsedPage> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::fatal("no snapshot loaded"))
    }
}

async fn read_snapshot(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read HTML snapshot {}", path.display()))
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[async_trait]
impl PageSource for SnapshotListingSource {
    async fn current_cards(&mut self) -> ScrapeResult<Vec<CardHandle>> {
        if self.page.is_none() {
            self.load_current()?;
        }
        Ok(self.parsed()?.handles())
    }

    fn card_text(&self, card: CardHandle, field: CardField) -> ScrapeResult<Option<String>> {
        self.parsed()?.card_text(card, field)
    }

    fn card_href(&self, card: CardHandle) -> ScrapeResult<Option<String>> {
        self.parsed()?.card_href(card)
    }
}

#[async_trait]
impl Paginator for SnapshotListingSource {
    fn has_next(&self) -> bool {
        self.index + 1 < self.pages.len()
    }

    async fn advance(&mut self) -> ScrapeResult<()> {
        self.index += 1;
        self.page = None;
        self.load_current()
    }
}
