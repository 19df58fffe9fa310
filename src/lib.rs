pub mod addresses;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod isochrone;
pub mod ors;
pub mod report;

use std::sync::Arc;

pub use addresses::{load_coordinates, read_coordinates, Coordinate, LoadedCoordinates, RejectedRow};
pub use config::Config;
pub use error::{BatchError, ConfigError, LoadError, LookupError};
pub use fetcher::{fetch_all, IsochroneLookup, Outcome};
pub use isochrone::IsochronePolygon;
pub use ors::{OrsClient, Profile};
pub use report::FetchReport;

/// Outcomes of one batch, in input order, with their summary.
#[derive(Debug)]
pub struct Batch {
    pub outcomes: Vec<Outcome>,
    pub report: FetchReport,
}

/// Loads the configured address file and fetches one isochrone per row.
pub async fn run_batch(config: &Config) -> Result<Batch, BatchError> {
    let loaded = load_coordinates(&config.addresses_path)?;
    let client = Arc::new(OrsClient::new(config)?);

    let outcomes = fetch_all(client, &loaded.coordinates, config.max_workers).await;
    let report = FetchReport::new(&outcomes, &loaded.rejected);

    Ok(Batch { outcomes, report })
}

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::{run_batch, BatchError, Config};

    /// Fetches drive-time isochrones for every row of a CSV with `Latitude`
    /// and `Longitude` columns. Returns GeoJSON strings in row order, `None`
    /// where the lookup failed.
    #[pyfunction]
    #[pyo3(signature = (path, api_key=None, max_workers=20))]
    fn fetch_drive_time_polygons(
        py: Python<'_>,
        path: String,
        api_key: Option<String>,
        max_workers: usize,
    ) -> PyResult<Vec<Option<String>>> {
        let mut config = match api_key {
            Some(key) => Config::with_key(&key),
            None => Config::env(),
        }
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
        config.addresses_path = path.into();
        config.max_workers = max_workers;

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

        let batch = py
            .allow_threads(|| rt.block_on(run_batch(&config)))
            .map_err(|e| match e {
                BatchError::Load(_) | BatchError::Config(_) => PyValueError::new_err(e.to_string()),
                BatchError::Client(_) => PyRuntimeError::new_err(e.to_string()),
            })?;

        batch.report.log();

        Ok(batch
            .outcomes
            .into_iter()
            .map(|outcome| outcome.result.ok().map(|p| p.to_geojson_string()))
            .collect())
    }

    /// Python module for fetching drive-time isochrones in bulk
    #[pymodule]
    fn drive_time(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(fetch_drive_time_polygons, m)?)?;
        Ok(())
    }
}
