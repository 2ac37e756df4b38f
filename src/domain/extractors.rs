//! Field extractors.
//!
//! Every extractor is total: any input yields either a value inside the
//! field's valid range or `None`. Nothing here panics on user text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::constants::{brands::BRAND_TABLE, fuel::FUEL_TABLE};
use super::listing::{FuelType, MILEAGE_RANGE, PriceWindow, UNKNOWN, YEAR_RANGE};

static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20[0-2]\d)\b").expect("year pattern"));

static MILEAGE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,3}(?:[ .\x{a0}\x{202f}]\d{3})+|\d+)\s*(?:kilom[eè]tres?|kms?)\b")
        .expect("mileage pattern")
});

static PRICE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:[ .,\x{a0}\x{202f}]\d+)*").expect("price pattern")
});

static DISPLACEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.,]\d+$").expect("displacement pattern"));

static POWER_OR_DISTANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d+(?:ch|cv|hp|kw|km)$").expect("power pattern"));

static DEFAULT_BRANDS: Lazy<BrandMatcher> = Lazy::new(|| {
    BrandMatcher::new(BRAND_TABLE.iter().map(|(p, c)| (*p, *c))).expect("built-in brand table")
});

/// Concatenates every digit run of `text` and parses the result.
///
/// Separators of any kind are ignored ("12 500 €" and "12.500" both give
/// 12500). `None` when there is no digit or the number overflows.
pub fn extract_number(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// First standalone 4-digit year token. `None` if that token falls outside
/// the valid model-year range.
pub fn extract_year(text: &str) -> Option<u16> {
    let token = YEAR_TOKEN.captures(text)?.get(1)?;
    let year: u16 = token.as_str().parse().ok()?;
    YEAR_RANGE.contains(&year).then_some(year)
}

/// First number directly followed by a kilometre unit.
///
/// A grouped reading that is out of range loses its leading groups until it
/// fits, so an unrelated number just before the mileage ("308 120 000 km")
/// is not glued to it.
pub fn extract_mileage(text: &str) -> Option<u32> {
    let number = MILEAGE_TOKEN.captures(text)?.get(1)?.as_str();
    let groups: Vec<&str> = number.split(|c: char| !c.is_ascii_digit()).collect();

    (0..groups.len()).find_map(|skip| {
        let km = u32::try_from(extract_number(&groups[skip..].concat())?).ok()?;
        MILEAGE_RANGE.contains(&km).then_some(km)
    })
}

/// Fuel keyword with the earliest occurrence in `text`.
pub fn extract_fuel_type(text: &str) -> Option<FuelType> {
    let lower = text.to_lowercase();
    let mut best: Option<(usize, FuelType)> = None;

    for entry in FUEL_TABLE {
        let position = if entry.whole_word {
            find_token(&lower, entry.keyword)
        } else {
            lower.find(entry.keyword)
        };
        if let Some(position) = position {
            if best.is_none_or(|(current, _)| position < current) {
                best = Some((position, entry.fuel));
            }
        }
    }

    best.map(|(_, fuel)| fuel)
}

/// First amount of `text` in whole euros, inside `window`.
///
/// An amount is a digit run with space, `.` or `,` thousands groups; the
/// currency ends it, so "9 490 € 10 500 €" reads 9490. A trailing group of
/// one or two digits after `.`/`,` is a decimal part.
pub fn extract_price(text: &str, window: PriceWindow) -> Option<u32> {
    let token = PRICE_TOKEN.find(text)?.as_str();
    let mut digits = token;
    if let Some(idx) = token.rfind(['.', ',']) {
        let decimals = &token[idx + 1..];
        if decimals.len() <= 2 && decimals.chars().all(|c| c.is_ascii_digit()) {
            digits = &token[..idx];
        }
    }

    let euros = extract_number(digits)?;
    if !window.contains(euros) {
        return None;
    }
    u32::try_from(euros).ok()
}

/// Brand and model from a title using the built-in brand table.
pub fn extract_brand_model(title: &str) -> (String, String) {
    DEFAULT_BRANDS.brand_model(title)
}

/// Ordered brand table compiled for case-insensitive whole-token matching.
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    entries: Vec<(Regex, String)>,
}

impl BrandMatcher {
    /// Entries are `(pattern, canonical name)`, tried in order.
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, regex::Error> {
        let entries = entries
            .into_iter()
            .filter(|(pattern, _)| !pattern.trim().is_empty())
            .map(|(pattern, canonical)| {
                let expr = format!(r"(?i)(?:^|[^\p{{L}}\p{{N}}])({})(?:[^\p{{L}}\p{{N}}]|$)", regex::escape(pattern.trim()));
                Regex::new(&expr).map(|re| (re, canonical.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn builtin() -> &'static Self {
        &DEFAULT_BRANDS
    }

    /// Canonical brand of the first table entry found in `title`.
    pub fn brand(&self, title: &str) -> Option<&str> {
        self.find(title).map(|(brand, _)| brand)
    }

    /// `(brand, model)`, both [`UNKNOWN`] when no brand matches.
    ///
    /// The model is read from the original title right after the brand: the
    /// first token, plus the second one when it reads like part of a model
    /// name ("308 SW", "Serie 3") rather than an engine spec ("1.5", "dCi").
    pub fn brand_model(&self, title: &str) -> (String, String) {
        let Some((brand, end)) = self.find(title) else {
            return (UNKNOWN.to_string(), UNKNOWN.to_string());
        };
        (brand.to_string(), model_after(&title[end..]))
    }

    fn find(&self, title: &str) -> Option<(&str, usize)> {
        self.entries.iter().find_map(|(re, canonical)| {
            let m = re.captures(title)?.get(1)?;
            Some((canonical.as_str(), m.end()))
        })
    }
}

fn model_after(rest: &str) -> String {
    let mut tokens = rest
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '(' | ')')))
        .filter(|t| t.chars().any(char::is_alphanumeric));

    let Some(first) = tokens.next() else {
        return UNKNOWN.to_string();
    };
    match tokens.next().filter(|t| is_model_word(t)) {
        Some(second) => format!("{first} {second}"),
        None => first.to_string(),
    }
}

fn is_model_word(token: &str) -> bool {
    if DISPLACEMENT.is_match(token) || POWER_OR_DISTANCE.is_match(token) {
        return false;
    }
    if token.len() == 4 && token.parse::<u16>().is_ok_and(|y| (1900..=2099).contains(&y)) {
        return false;
    }
    let lower = token.to_lowercase();
    !FUEL_TABLE.iter().any(|entry| entry.keyword == lower)
}

/// Byte offset of the first occurrence of `needle` that is not glued to
/// other letters or digits.
pub(crate) fn find_token(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(idx, _)| idx).find(|&idx| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Renault Clio 1.5 dCi", "Renault", "Clio")]
    #[case("Peugeot 308 SW 2015", "Peugeot", "308 SW")]
    #[case("BMW Serie 3 320d", "BMW", "Serie 3")]
    #[case("LAND ROVER Discovery Sport", "Land Rover", "Discovery Sport")]
    #[case("Citroen C3 PureTech 82", "Citroën", "C3")]
    #[case("Superbe Mercedes-Benz Classe A 180", "Mercedes", "Classe A")]
    #[case("Rover 75", "Rover", "75")]
    #[case("Peugeot 2008 Allure 1.2 PureTech", "Peugeot", "2008 Allure")]
    #[case("Peugeot 3008 GT", "Peugeot", "3008 GT")]
    #[case("Peugeot 208 2019", "Peugeot", "208")]
    #[case("Renault", "Renault", "Unknown")]
    #[case("Vélo électrique", "Unknown", "Unknown")]
    fn brand_and_model(#[case] title: &str, #[case] brand: &str, #[case] model: &str) {
        assert_eq!(extract_brand_model(title), (brand.to_string(), model.to_string()));
    }

    #[test]
    fn brand_must_be_a_whole_token() {
        // "ds" inside "cards" or "kia" inside "nikia" must not match
        assert_eq!(BrandMatcher::builtin().brand("Gift cards nikia"), None);
        assert_eq!(BrandMatcher::builtin().brand("DS 7 Crossback"), Some("DS"));
    }

    #[test]
    fn custom_table_order_is_the_tie_break() {
        let matcher = BrandMatcher::new([("Rover", "Rover"), ("Land Rover", "Land Rover")]).unwrap();
        assert_eq!(matcher.brand("Land Rover Defender"), Some("Rover"));
    }

    #[rstest]
    #[case("Peugeot 308 2015 120000km", Some(2015))]
    #[case("Année 1995, première main", Some(1995))]
    #[case("Mise en circulation: 03/2026", Some(2026))]
    #[case("Tel 0612345678", None)]
    #[case("Modèle 1985", None)]
    #[case("2027", None)]
    #[case("no digits at all", None)]
    fn year(#[case] text: &str, #[case] expected: Option<u16>) {
        assert_eq!(extract_year(text), expected);
    }

    #[rstest]
    #[case("Contrôle technique ok, 120 000km, très bon état", Some(120_000))]
    #[case("Peugeot 308 2015 120000km", Some(120_000))]
    #[case("85 000 KM", Some(85_000))]
    #[case("45.000 kilomètres", Some(45_000))]
    #[case("12\u{a0}500 km", Some(12_500))]
    #[case("0 km", Some(0))]
    #[case("600000 km", None)]
    #[case("Peugeot 308 120 000 km", Some(120_000))]
    #[case("Clio 4 98 000 km", Some(98_000))]
    #[case("à 5 minutes du centre", None)]
    fn mileage(#[case] text: &str, #[case] expected: Option<u32>) {
        assert_eq!(extract_mileage(text), expected);
    }

    #[rstest]
    #[case("Diesel", Some(FuelType::Diesel))]
    #[case("Clio 1.5 dCi 90", Some(FuelType::Diesel))]
    #[case("208 BlueHDi 100", Some(FuelType::Diesel))]
    #[case("Essence - Manuelle", Some(FuelType::Essence))]
    #[case("Hybride rechargeable", Some(FuelType::Hybride))]
    #[case("Zoé électrique", Some(FuelType::Electrique))]
    #[case("GPL", Some(FuelType::Gpl))]
    #[case("essence ou diesel", Some(FuelType::Essence))]
    #[case("diesel, pas essence", Some(FuelType::Diesel))]
    #[case("incidence", None)]
    #[case("", None)]
    fn fuel(#[case] text: &str, #[case] expected: Option<FuelType>) {
        assert_eq!(extract_fuel_type(text), expected);
    }

    #[rstest]
    #[case("12 500 €", Some(12_500))]
    #[case("12\u{202f}500\u{a0}€", Some(12_500))]
    #[case("8.990 €", Some(8_990))]
    #[case("15 990,00 €", Some(15_990))]
    #[case("Prix: 7,500 EUR", Some(7_500))]
    #[case("100 €", None)]
    #[case("350 000 €", None)]
    #[case("Prix à débattre", None)]
    #[case("9 490 € 10 500 €", Some(9_490))]
    #[case("Prix : 14 200 € au lieu de 15 000 €", Some(14_200))]
    fn price(#[case] text: &str, #[case] expected: Option<u32>) {
        assert_eq!(extract_price(text, PriceWindow::default()), expected);
    }

    #[test]
    fn price_window_is_site_dependent() {
        assert_eq!(extract_price("150 €", PriceWindow::new(0, 200_000)), Some(150));
    }

    #[test]
    fn number_concatenates_digit_runs() {
        assert_eq!(extract_number("12 500 €"), Some(12_500));
        assert_eq!(extract_number("abc"), None);
        assert_eq!(extract_number("99999999999999999999999"), None);
    }

    #[test]
    fn find_token_requires_boundaries() {
        assert_eq!(find_token("1.5 dci 90", "dci"), Some(4));
        assert_eq!(find_token("incidence", "dci"), None);
        assert_eq!(find_token("xdci dci", "dci"), Some(5));
    }
}
