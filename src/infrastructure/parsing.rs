//! HTML parsing for results pages
//!
//! Selector lists with ordered fallbacks, compiled once per site.

pub mod card_parser;
pub mod config;

pub use card_parser::{CardListParser, ParsedPage, detect_block_marker};
pub use config::{BLOCK_MARKERS, CardSelectors};
