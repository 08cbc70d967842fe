use super::error::ProviderError;
use super::types::{GeoPoint, ProviderRoute};

pub trait GeocodingProvider: Send + Sync {
    /// Resolves a place name to its best match. Only the first result is used.
    fn geocode(&self, place: &str) -> Result<GeoPoint, ProviderError>;
}

pub trait RoutingProvider: Send + Sync {
    /// Gets a driving route between two points.
    fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<ProviderRoute, ProviderError>;
}

impl<T: GeocodingProvider + ?Sized> GeocodingProvider for Box<T> {
    fn geocode(&self, place: &str) -> Result<GeoPoint, ProviderError> {
        (**self).geocode(place)
    }
}

impl<T: RoutingProvider + ?Sized> RoutingProvider for Box<T> {
    fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<ProviderRoute, ProviderError> {
        (**self).route(start, end)
    }
}
