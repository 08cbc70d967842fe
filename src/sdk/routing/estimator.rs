use super::error::{EstimateError, ProviderError};
use super::service::{GeocodingProvider, RoutingProvider};
use super::types::{
    estimate_emissions_kg, meters_to_miles, seconds_to_hours, GeoPoint, RouteQuery, RouteResult,
    EMISSION_KG_PER_MILE,
};

/// Turns a pair of place names into a [`RouteResult`].
///
/// Geocodes both ends, asks the router for a driving route, converts to miles
/// and hours, and estimates the CO2 an average car would emit over the
/// distance. Every upstream failure is returned as an [`EstimateError`]; there
/// are no retries.
pub struct RouteEstimator<G, R> {
    geocoder: G,
    router: R,
    emission_kg_per_mile: f64,
}

impl<G: GeocodingProvider, R: RoutingProvider> RouteEstimator<G, R> {
    pub fn new(geocoder: G, router: R) -> Self {
        Self::with_emission_factor(geocoder, router, EMISSION_KG_PER_MILE)
    }

    pub fn with_emission_factor(geocoder: G, router: R, emission_kg_per_mile: f64) -> Self {
        Self {
            geocoder,
            router,
            emission_kg_per_mile,
        }
    }

    pub fn estimate(&self, query: &RouteQuery) -> Result<RouteResult, EstimateError> {
        let origin = self.resolve(&query.origin)?;
        let destination = self.resolve(&query.destination)?;

        let route = self
            .router
            .route(origin, destination)
            .map_err(|source| {
                log::error!(
                    "Routing failed for {} → {}: {}",
                    query.origin,
                    query.destination,
                    source
                );
                EstimateError::RouteFailure { source }
            })?;

        let geometry = if route.path.len() < 2 {
            log::warn!(
                "No path geometry for {} → {}, drawing a straight line",
                query.origin,
                query.destination
            );
            vec![origin, destination]
        } else {
            route.path
        };

        let distance_miles = meters_to_miles(route.distance_meters).max(0.0);
        let duration_hours = seconds_to_hours(route.duration_seconds).max(0.0);

        Ok(RouteResult {
            origin,
            destination,
            distance_miles,
            duration_hours,
            geometry,
            emissions_saved_kg: estimate_emissions_kg(distance_miles, self.emission_kg_per_mile),
        })
    }

    /// Blank names never reach the geocoder.
    fn resolve(&self, place: &str) -> Result<GeoPoint, EstimateError> {
        if place.trim().is_empty() {
            return Err(EstimateError::GeocodeFailure {
                query: place.to_string(),
                source: ProviderError::NotFound("empty place name".to_string()),
            });
        }
        self.geocoder
            .geocode(place)
            .map_err(|source| EstimateError::GeocodeFailure {
                query: place.to_string(),
                source,
            })
    }
}
