use std::time::Duration;

use serde::Serialize;

use crate::addresses::Coordinate;
use crate::config::Config;
use crate::error::LookupError;
use crate::fetcher::IsochroneLookup;
use crate::isochrone::IsochronePolygon;

// Travel profiles accepted by the isochrones endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    DrivingCar,
    DrivingHgv,
    CyclingRegular,
    CyclingRoad,
    CyclingMountain,
    CyclingElectric,
    FootWalking,
    FootHiking,
    Wheelchair,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::DrivingCar => "driving-car",
            Profile::DrivingHgv => "driving-hgv",
            Profile::CyclingRegular => "cycling-regular",
            Profile::CyclingRoad => "cycling-road",
            Profile::CyclingMountain => "cycling-mountain",
            Profile::CyclingElectric => "cycling-electric",
            Profile::FootWalking => "foot-walking",
            Profile::FootHiking => "foot-hiking",
            Profile::Wheelchair => "wheelchair",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct InvalidProfile(String);

impl std::fmt::Display for InvalidProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown profile {:?}", self.0)
    }
}

impl std::str::FromStr for Profile {
    type Err = InvalidProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driving-car" => Ok(Profile::DrivingCar),
            "driving-hgv" => Ok(Profile::DrivingHgv),
            "cycling-regular" => Ok(Profile::CyclingRegular),
            "cycling-road" => Ok(Profile::CyclingRoad),
            "cycling-mountain" => Ok(Profile::CyclingMountain),
            "cycling-electric" => Ok(Profile::CyclingElectric),
            "foot-walking" => Ok(Profile::FootWalking),
            "foot-hiking" => Ok(Profile::FootHiking),
            "wheelchair" => Ok(Profile::Wheelchair),
            other => Err(InvalidProfile(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeType {
    Time,
    Distance,
}

/// Body of `POST /v2/isochrones/{profile}`. Locations are `[lon, lat]`.
#[derive(Debug, Serialize)]
pub struct IsochroneRequest {
    pub locations: Vec<[f64; 2]>,
    pub range_type: RangeType,
    pub range: Vec<u32>,
}

impl IsochroneRequest {
    pub fn time_from(coordinate: Coordinate, seconds: u32) -> Self {
        Self {
            locations: vec![[coordinate.longitude, coordinate.latitude]],
            range_type: RangeType::Time,
            range: vec![seconds],
        }
    }
}

/// Client for the openrouteservice isochrones endpoint. One instance is
/// shared read-only by every lookup task.
#[derive(Clone)]
pub struct OrsClient {
    inner: reqwest::Client,
    base_url: String,
    api_key: String,
    profile: Profile,
    range_seconds: u32,
}

impl OrsClient {
    pub fn new(config: &Config) -> Result<Self, LookupError> {
        let inner = build_http_client(config.request_timeout)?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            profile: config.profile,
            range_seconds: config.range_seconds,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v2/isochrones/{}", self.base_url, self.profile)
    }

    pub async fn isochrone(&self, coordinate: Coordinate) -> Result<IsochronePolygon, LookupError> {
        let request = IsochroneRequest::time_from(coordinate, self.range_seconds);
        log::debug!("Requesting isochrone for {coordinate}");

        let response_text = make_request(&self.inner, &self.endpoint(), &self.api_key, &request).await?;
        IsochronePolygon::parse(&response_text)
    }
}

impl IsochroneLookup for OrsClient {
    fn lookup(
        &self,
        coordinate: Coordinate,
    ) -> impl std::future::Future<Output = Result<IsochronePolygon, LookupError>> + Send {
        self.isochrone(coordinate)
    }
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, LookupError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("drive_time/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

// Sends one isochrone request and returns the raw body on success
async fn make_request(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &IsochroneRequest,
) -> Result<String, LookupError> {
    let response = client
        .post(url)
        .header("Authorization", api_key)
        .header("Accept", "application/json, application/geo+json")
        .json(request)
        .send()
        .await?;

    let status = response.status();
    let response_text = response.text().await?;

    if status.is_success() {
        Ok(response_text)
    } else {
        Err(LookupError::Status {
            status,
            body: response_text,
        })
    }
}
