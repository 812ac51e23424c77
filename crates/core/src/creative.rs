//! Creative catalog CSV import.
//!
//! The catalog is exported from the ad platform with the columns
//! `Creative Title`, `Ad creative url` and `Link url`. Missing cells are
//! tolerated and read as empty strings.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One row of the creative catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeRecord {
    #[serde(rename = "Creative Title", default)]
    pub title: String,
    #[serde(rename = "Ad creative url", default)]
    pub image_url: String,
    #[serde(rename = "Link url", default)]
    pub landing_page_url: String,
}

/// Parse a catalog export. Rows without a title are skipped.
pub fn parse_creatives_csv<R: Read>(reader: R) -> Result<Vec<CreativeRecord>, CoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, row) in csv_reader.deserialize::<CreativeRecord>().enumerate() {
        // Header is line 1.
        let record = row.map_err(|e| {
            CoreError::Validation(format!("Invalid creative CSV at row {}: {e}", idx + 2))
        })?;
        if record.title.is_empty() {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}
