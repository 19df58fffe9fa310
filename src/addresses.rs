use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;

pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    // Reject anything the routing service could never answer for
    fn validate(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err("coordinate is not a finite number".to_string());
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {latitude} out of range"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {longitude} out of range"));
        }
        Ok(Self::new(latitude, longitude))
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// Only the two coordinate columns matter, everything else in the row is ignored
#[derive(Debug, Deserialize)]
struct AddressRow {
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

/// A data row that never made it into the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based line number in the file, header included.
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadedCoordinates {
    pub coordinates: Vec<Coordinate>,
    pub rejected: Vec<RejectedRow>,
}

pub fn load_coordinates(path: &Path) -> Result<LoadedCoordinates, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.display().to_string(),
            source,
        })?;

    read_rows(reader)
}

pub fn read_coordinates<R: Read>(input: R) -> Result<LoadedCoordinates, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    read_rows(reader)
}

fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<LoadedCoordinates, LoadError> {
    // Byte records so a stray Latin-1 name column only costs its own row
    let headers = reader.byte_headers()?.clone();
    log::info!(
        "Columns: {:?}",
        headers
            .iter()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
    );

    for column in [LATITUDE_COLUMN, LONGITUDE_COLUMN] {
        if !headers.iter().any(|h| h == column.as_bytes()) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut loaded = LoadedCoordinates::default();

    for (row_number, record) in reader.byte_records().enumerate() {
        // Header is line 1
        let fallback_line = row_number as u64 + 2;
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        let parsed = record
            .deserialize::<AddressRow>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(|row| Coordinate::validate(row.latitude, row.longitude));

        match parsed {
            Ok(coordinate) => loaded.coordinates.push(coordinate),
            Err(reason) => {
                log::warn!("Skipping line {line}: {reason}");
                loaded.rejected.push(RejectedRow { line, reason });
            }
        }
    }

    log::info!(
        "Loaded {} coordinates ({} rejected)",
        loaded.coordinates.len(),
        loaded.rejected.len()
    );

    Ok(loaded)
}
