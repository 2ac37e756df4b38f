//! Extractors return an in-range value or nothing, whatever the input

use proptest::prelude::*;
use rstest::rstest;

use car_listings_lib::domain::{
    FuelType, PriceWindow, UNKNOWN, extract_brand_model, extract_fuel_type, extract_mileage,
    extract_number, extract_price, extract_year,
};

proptest! {
    #[test]
    fn year_is_in_range_or_absent(text in "\\PC{0,80}") {
        if let Some(year) = extract_year(&text) {
            prop_assert!((1990..=2026).contains(&year));
        }
    }

    #[test]
    fn mileage_is_in_range_or_absent(text in "[0-9 .a-zA-Zè\u{a0}]{0,60}") {
        if let Some(km) = extract_mileage(&text) {
            prop_assert!(km <= 500_000);
        }
    }

    #[test]
    fn price_respects_window(text in "\\PC{0,40}", min in 0u32..10_000, span in 0u32..300_000) {
        let window = PriceWindow::new(min, min + span);
        if let Some(price) = extract_price(&text, window) {
            prop_assert!(window.contains(u64::from(price)));
        }
    }

    #[test]
    fn brand_model_never_panics(title in "\\PC{0,80}") {
        let (brand, model) = extract_brand_model(&title);
        prop_assert!(!brand.is_empty());
        prop_assert!(!model.is_empty());
        if brand == UNKNOWN {
            prop_assert_eq!(model, UNKNOWN);
        }
    }

    #[test]
    fn fuel_and_number_never_panic(text in "\\PC{0,80}") {
        let _ = extract_fuel_type(&text);
        let _ = extract_number(&text);
    }

    #[test]
    fn grouped_mileage_is_read_back(km in 1_000u32..=500_000) {
        let grouped = format!("{} {:03} km", km / 1000, km % 1000);
        prop_assert_eq!(extract_mileage(&grouped), Some(km));
    }

    #[test]
    fn formatted_price_is_read_back(euros in 1_000u32..=200_000) {
        let text = format!("{} {:03},00 €", euros / 1000, euros % 1000);
        prop_assert_eq!(extract_price(&text, PriceWindow::default()), Some(euros));
    }
}

#[rstest]
#[case("Renault Clio 1.5 dCi", "Renault", "Clio")]
#[case("Volkswagen Golf VII 2.0 TDI", "Volkswagen", "Golf VII")]
#[case("VW Polo 1.0 TSI", "Volkswagen", "Polo")]
#[case("Mercedes Benz Classe C 220", "Mercedes", "Classe C")]
#[case("Toyota Yaris 2018", "Toyota", "Yaris")]
#[case("Fiat 500 1.2 69ch", "Fiat", "500")]
#[case("Peugeot 208 GT Line 2021", "Peugeot", "208 GT")]
#[case("Peugeot 2008 Allure 1.2 PureTech", "Peugeot", "2008 Allure")]
#[case("PEUGEOT 3008 1.5 BlueHDi", "Peugeot", "3008")]
fn brand_and_model_from_titles(#[case] title: &str, #[case] brand: &str, #[case] model: &str) {
    assert_eq!(extract_brand_model(title), (brand.to_string(), model.to_string()));
}

#[rstest]
#[case("Peugeot 308 120 000 km", Some(120_000))]
#[case("3008 62 000 km", Some(62_000))]
#[case("208 45.000 kilomètres", Some(45_000))]
fn model_number_before_grouped_mileage(#[case] text: &str, #[case] expected: Option<u32>) {
    assert_eq!(extract_mileage(text), expected);
}

#[rstest]
#[case("9 490 € 10 500 €", Some(9_490))]
#[case("12\u{a0}990\u{a0}€ 13\u{a0}990\u{a0}€", Some(12_990))]
#[case("15 990,00 € TTC", Some(15_990))]
fn first_amount_of_a_price_block(#[case] text: &str, #[case] expected: Option<u32>) {
    assert_eq!(extract_price(text, PriceWindow::default()), expected);
}

#[rstest]
#[case("1.6 HDi 92", Some(FuelType::Diesel))]
#[case("1.3 TCe 140", Some(FuelType::Essence))]
#[case("Hybrid 136h", Some(FuelType::Hybride))]
#[case("LPG conversion", Some(FuelType::Gpl))]
#[case("Gazole", Some(FuelType::Diesel))]
#[case("Boîte auto", None)]
fn fuel_from_engine_codes(#[case] text: &str, #[case] expected: Option<FuelType>) {
    assert_eq!(extract_fuel_type(text), expected);
}
