//! CSV and JSON exporters
//!
//! Columns and JSON keys are the `CarListing` field names. Unknown values
//! are empty CSV cells and JSON `null`s. Result set order is kept unless the
//! descending-price presentation sort is on.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::application::Exporter;
use crate::domain::{CarListing, ResultSet};
use crate::infrastructure::config::{ExportConfig, ExportFormat};

/// Highest price first, unknown prices last; ties keep encounter order.
pub fn presentation_order(results: &ResultSet, sort_by_price_desc: bool) -> Vec<&CarListing> {
    let mut rows: Vec<&CarListing> = results.iter().collect();
    if sort_by_price_desc {
        rows.sort_by(|a, b| b.price_eur.cmp(&a.price_eur));
    }
    rows
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter {
    pub sort_by_price_desc: bool,
}

impl Exporter for CsvExporter {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn export(&self, results: &ResultSet, sink: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(sink);
        if results.is_empty() {
            writer.write_record(CSV_HEADER)?;
        }
        for listing in presentation_order(results, self.sort_by_price_desc) {
            writer.serialize(listing).context("Failed to write CSV row")?;
        }
        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}

/// Header of an empty export; matches the serialized field order.
const CSV_HEADER: [&str; 10] = [
    "title",
    "brand",
    "model",
    "year",
    "mileage_km",
    "fuel_type",
    "price_eur",
    "location",
    "url",
    "scraped_at",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub sort_by_price_desc: bool,
}

impl Exporter for JsonExporter {
    fn format(&self) -> &'static str {
        "json"
    }

    fn export(&self, results: &ResultSet, sink: &mut dyn Write) -> Result<()> {
        let rows = presentation_order(results, self.sort_by_price_desc);
        serde_json::to_writer_pretty(&mut *sink, &rows).context("Failed to write JSON")?;
        sink.write_all(b"\n")?;
        Ok(())
    }
}

pub fn exporter_for(format: ExportFormat, sort_by_price_desc: bool) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter { sort_by_price_desc }),
        ExportFormat::Json => Box::new(JsonExporter { sort_by_price_desc }),
    }
}

/// `car_listings_20250101_120000` style stem
pub fn file_stem(config: &ExportConfig, now: DateTime<Local>) -> String {
    if config.timestamped {
        format!("{}_{}", config.file_stem, now.format("%Y%m%d_%H%M%S"))
    } else {
        config.file_stem.clone()
    }
}

/// Write every configured format into the output directory
pub async fn export_all(results: &ResultSet, config: &ExportConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;

    let stem = file_stem(config, Local::now());
    let mut written = Vec::with_capacity(config.formats.len());
    for &format in &config.formats {
        let exporter = exporter_for(format, config.sort_by_price_desc);
        let mut buffer = Vec::new();
        exporter.export(results, &mut buffer)?;

        let path = config.output_dir.join(format!("{stem}.{}", exporter.format()));
        fs::write(&path, buffer)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Exported {} listings to {}", results.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
