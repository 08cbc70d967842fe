use serde::Deserialize;

use crate::sdk::routing::error::ProviderError;
use crate::sdk::routing::types::{GeoPoint, ProviderRoute};

// --- Data Structures for parsing ORS responses (geocode + GeoJSON directions) ---

#[derive(Deserialize)]
pub struct GeoResponse {
    pub features: Vec<Feature>,
}
#[derive(Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
}
#[derive(Deserialize)]
pub struct Geometry {
    pub coordinates: [f64; 2],
}

#[derive(Deserialize)]
pub struct DirectionsResponse {
    pub features: Vec<RouteFeature>,
}
#[derive(Deserialize)]
pub struct RouteFeature {
    #[serde(default)]
    pub geometry: Option<LineString>,
    pub properties: RouteProperties,
}
#[derive(Deserialize)]
pub struct LineString {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}
#[derive(Deserialize)]
pub struct RouteProperties {
    pub summary: DirectionsSummary,
}
// ORS drops zero-valued summary fields
#[derive(Deserialize, Clone, Copy, Default)]
pub struct DirectionsSummary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

impl GeoResponse {
    pub fn first_point(self, place: &str) -> Result<GeoPoint, ProviderError> {
        self.features
            .into_iter()
            .next()
            .map(|f| GeoPoint::from_lon_lat(f.geometry.coordinates))
            .ok_or_else(|| ProviderError::NotFound(format!("geocode query \"{}\"", place)))
    }
}

impl DirectionsResponse {
    pub fn into_route(self) -> Result<ProviderRoute, ProviderError> {
        let feature = self
            .features
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound("route in success response".to_string()))?;

        let path = feature
            .geometry
            .map(|line| line.coordinates.into_iter().map(GeoPoint::from_lon_lat).collect())
            .unwrap_or_default();

        Ok(ProviderRoute {
            distance_meters: feature.properties.summary.distance,
            duration_seconds: feature.properties.summary.duration,
            path,
        })
    }
}

/// Request body for `/v2/directions/driving-car/geojson`.
pub fn directions_body(start: GeoPoint, end: GeoPoint) -> serde_json::Value {
    serde_json::json!({ "coordinates": [start.to_lon_lat(), end.to_lon_lat()] })
}

pub fn zero_route(start: GeoPoint, end: GeoPoint) -> ProviderRoute {
    ProviderRoute {
        distance_meters: 0.0,
        duration_seconds: 0.0,
        path: vec![start, end],
    }
}
