use geojson::GeoJson;

use crate::error::LookupError;

/// Isochrone payload as returned by the routing service. Kept as GeoJSON and
/// never inspected beyond counting features.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochronePolygon {
    geojson: GeoJson,
}

impl IsochronePolygon {
    pub fn parse(body: &str) -> Result<Self, LookupError> {
        let geojson = body
            .parse::<GeoJson>()
            .map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(Self { geojson })
    }

    pub fn geojson(&self) -> &GeoJson {
        &self.geojson
    }

    pub fn into_geojson(self) -> GeoJson {
        self.geojson
    }

    pub fn feature_count(&self) -> usize {
        match &self.geojson {
            GeoJson::FeatureCollection(collection) => collection.features.len(),
            GeoJson::Feature(_) => 1,
            GeoJson::Geometry(_) => 1,
        }
    }

    // Convert the payload back to a GeoJSON string
    pub fn to_geojson_string(&self) -> String {
        self.geojson.to_string()
    }
}

impl From<GeoJson> for IsochronePolygon {
    fn from(geojson: GeoJson) -> Self {
        Self { geojson }
    }
}
