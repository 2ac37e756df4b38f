//! Exporters against real files

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use car_listings_lib::application::Exporter;
use car_listings_lib::domain::{CarListing, FuelType, ResultSet};
use car_listings_lib::infrastructure::config::{ExportConfig, ExportFormat};
use car_listings_lib::infrastructure::{CsvExporter, JsonExporter, export_all};

fn sample() -> ResultSet {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
    let listing = |title: &str, brand: &str, price: Option<u32>, url: Option<&str>| CarListing {
        title: title.into(),
        brand: brand.into(),
        model: "X".into(),
        year: Some(2020),
        mileage_km: Some(30_000),
        fuel_type: Some(FuelType::Hybride),
        price_eur: price,
        location: "Bordeaux, 33000".into(),
        url: url.map(str::to_string),
        scraped_at: at,
    };
    ResultSet::from(vec![
        listing("Toyota Yaris \"Hybrid\"", "Toyota", Some(14_500), Some("https://www.leboncoin.fr/ad/voitures/1")),
        listing("Renault Captur", "Renault", None, None),
        listing("Kia Niro", "Kia", Some(21_000), Some("https://www.leboncoin.fr/ad/voitures/3")),
    ])
}

#[test]
fn exporting_twice_gives_identical_bytes() {
    let results = sample();
    for exporter in [
        Box::new(CsvExporter { sort_by_price_desc: true }) as Box<dyn Exporter>,
        Box::new(JsonExporter { sort_by_price_desc: false }),
    ] {
        let mut first = Vec::new();
        let mut second = Vec::new();
        exporter.export(&results, &mut first).unwrap();
        exporter.export(&results, &mut second).unwrap();
        assert_eq!(first, second, "{} export is not stable", exporter.format());
    }
}

#[test]
fn csv_quotes_fields_and_reads_back() {
    let mut out = Vec::new();
    CsvExporter { sort_by_price_desc: true }.export(&sample(), &mut out).unwrap();

    let mut reader = csv::Reader::from_reader(out.as_slice());
    let rows: Vec<CarListing> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Kia Niro", "Toyota Yaris \"Hybrid\"", "Renault Captur"]);
    assert_eq!(rows[2].price_eur, None);
    assert_eq!(rows[1].location, "Bordeaux, 33000");
}

#[tokio::test]
async fn export_all_writes_one_file_per_format() {
    let dir = tempdir().unwrap();
    let config = ExportConfig {
        output_dir: dir.path().join("output"),
        formats: vec![ExportFormat::Csv, ExportFormat::Json],
        sort_by_price_desc: true,
        file_stem: "cars".into(),
        timestamped: false,
    };

    let written = export_all(&sample(), &config).await.unwrap();

    assert_eq!(written, vec![dir.path().join("output/cars.csv"), dir.path().join("output/cars.json")]);
    let json: Vec<CarListing> =
        serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(json.len(), 3);
    assert_eq!(json[0].brand, "Kia");
}
