use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::ors::Profile;

pub const REQUIRED_VARIABLES: &[&str] = &["ORS_API_KEY"];

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
pub const DEFAULT_ADDRESSES_PATH: &str = "static/addresses_clean.csv";
pub const DEFAULT_RANGE_SECONDS: u32 = 30 * 60;
pub const DEFAULT_MAX_WORKERS: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Settings for one batch run, built once at startup and handed to the client
/// and the fetcher.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub addresses_path: PathBuf,
    pub profile: Profile,
    pub range_seconds: u32,
    pub max_workers: usize,
    pub request_timeout: Duration,
}

// The key is left out so a stray `{:?}` never leaks it into logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("addresses_path", &self.addresses_path)
            .field("profile", &self.profile)
            .field("range_seconds", &self.range_seconds)
            .field("max_workers", &self.max_workers)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            addresses_path: PathBuf::from(DEFAULT_ADDRESSES_PATH),
            profile: Profile::DrivingCar,
            range_seconds: DEFAULT_RANGE_SECONDS,
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Like `new`, but refuses a blank credential.
    pub fn with_key(api_key: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::Missing("ORS_API_KEY"));
        }
        Ok(Self::new(api_key))
    }

    /// Reads the process environment.
    pub fn env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Only `ORS_API_KEY` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ORS_API_KEY").ok_or(ConfigError::Missing("ORS_API_KEY"))?;
        let mut config = Self::with_key(&api_key)?;

        if let Some(base_url) = non_empty(lookup("ORS_BASE_URL")) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(path) = non_empty(lookup("ORS_ADDRESSES_CSV")) {
            config.addresses_path = PathBuf::from(path);
        }
        if let Some(profile) = parsed("ORS_PROFILE", lookup("ORS_PROFILE"))? {
            config.profile = profile;
        }
        if let Some(range) = parsed::<u32>("ORS_RANGE_SECONDS", lookup("ORS_RANGE_SECONDS"))? {
            if range == 0 {
                return Err(invalid("ORS_RANGE_SECONDS", "0", "must be positive"));
            }
            config.range_seconds = range;
        }
        if let Some(workers) = parsed::<usize>("ORS_MAX_WORKERS", lookup("ORS_MAX_WORKERS"))? {
            if workers == 0 {
                return Err(invalid("ORS_MAX_WORKERS", "0", "must be at least 1"));
            }
            config.max_workers = workers;
        }
        if let Some(secs) = parsed::<u64>(
            "ORS_REQUEST_TIMEOUT_SECS",
            lookup("ORS_REQUEST_TIMEOUT_SECS"),
        )? {
            if secs == 0 {
                return Err(invalid("ORS_REQUEST_TIMEOUT_SECS", "0", "must be positive"));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn log(&self) {
        log::info!("Service: {}", self.base_url);
        log::info!("Addresses: {}", self.addresses_path.display());
        log::info!(
            "Profile: {}, range: {}s, workers: {}, request timeout: {}s",
            self.profile,
            self.range_seconds,
            self.max_workers,
            self.request_timeout.as_secs()
        );
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(name, &raw, e)),
    }
}

fn invalid(name: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
