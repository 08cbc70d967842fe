use serde::{Deserialize, Serialize};

pub const METERS_PER_MILE: f64 = 1609.34;
pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const KM_PER_MILE: f64 = 1.60934;

/// Average passenger car, kg CO2 per mile.
pub const EMISSION_KG_PER_MILE: f64 = 0.411;

/// A WGS84 coordinate, stored latitude first.
///
/// Routing providers such as ORS speak `[lon, lat]`; convert only through
/// [`GeoPoint::from_lon_lat`] and [`GeoPoint::to_lon_lat`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn from_lon_lat(coordinates: [f64; 2]) -> Self {
        Self {
            lat: coordinates[1],
            lon: coordinates[0],
        }
    }

    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
}

impl RouteQuery {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

/// Raw routing answer in provider units.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub path: Vec<GeoPoint>,
}

/// A simulated trip in dashboard units.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub distance_miles: f64,
    pub duration_hours: f64,
    /// Always holds at least the two endpoints.
    pub geometry: Vec<GeoPoint>,
    /// Estimate against an average car covering the same distance.
    pub emissions_saved_kg: f64,
}

impl RouteResult {
    pub fn distance_km(&self) -> f64 {
        miles_to_km(self.distance_miles)
    }
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

pub fn estimate_emissions_kg(distance_miles: f64, kg_per_mile: f64) -> f64 {
    distance_miles * kg_per_mile
}
