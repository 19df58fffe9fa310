use thiserror::Error;

// Startup configuration errors, fatal before any request is issued
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

// Errors reading the coordinate file as a whole
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),
}

/// Failure of a single isochrone lookup. Never aborts the batch.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("response is not valid GeoJSON: {0}")]
    Decode(String),
    #[error("lookup task aborted: {0}")]
    Aborted(String),
}

// Errors that stop a whole batch before any lookup is issued
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot build http client: {0}")]
    Client(#[from] LookupError),
}
