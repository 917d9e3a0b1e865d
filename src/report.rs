// Report exporter: first-vs-latest position rows plus the CSV writer.
use crate::model::{AnalysisRecord, Placement, ReportError};
use crate::utils::compact_timestamp;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 7] = [
    "Position",
    "First Position Today",
    "ID",
    "Name",
    "Brand",
    "Rating",
    "Feedbacks",
];

/// Rendered when a product is absent from the day's first snapshot.
pub const MISSING_POSITION: &str = "-";

/// One export row: current rank plus where the product started the day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub position: u32,
    pub first_position: Option<u32>,
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub rating: f64,
    pub feedbacks: u64,
}

/// Position inside the first record's combined advertised+organic list.
pub fn first_position(record: &AnalysisRecord, product_id: u64) -> Option<u32> {
    record
        .combined()
        .find(|p| p.id == product_id)
        .map(|p| p.position)
}

/// Rows for one category of the latest record, in current rank order.
pub fn build_rows(
    first: &AnalysisRecord,
    latest: &AnalysisRecord,
    placement: Placement,
) -> Vec<ReportRow> {
    latest
        .products_for(placement)
        .iter()
        .map(|p| ReportRow {
            position: p.position,
            first_position: first_position(first, p.id),
            id: p.id,
            name: p.name.clone(),
            brand: p.brand.clone(),
            rating: p.rating,
            feedbacks: p.feedbacks,
        })
        .collect()
}

/// Writes `report-{type}-{timestamp}-{shortId}.csv` under `out_dir`. The
/// timestamp comes from the latest record, the short id is random so two
/// exports of the same snapshot never collide.
pub fn write_csv(
    rows: &[ReportRow],
    placement: Placement,
    latest: &AnalysisRecord,
    out_dir: &Path,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(out_dir)?;

    let stamp = compact_timestamp(&latest.timestamp);
    let short_id = format!("{:08x}", rand::rng().random::<u32>());
    let path = out_dir.join(format!(
        "report-{}-{}-{}.csv",
        placement.as_str(),
        stamp,
        short_id
    ));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(&csv_fields(row))?;
    }
    writer.flush()?;
    Ok(path)
}

fn csv_fields(row: &ReportRow) -> [String; 7] {
    [
        row.position.to_string(),
        row.first_position
            .map_or_else(|| MISSING_POSITION.to_string(), |p| p.to_string()),
        row.id.to_string(),
        row.name.clone(),
        row.brand.clone(),
        row.rating.to_string(),
        row.feedbacks.to_string(),
    ]
}
