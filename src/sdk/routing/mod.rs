pub mod cache;
pub mod error;
pub mod estimator;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{CachedGeocoder, GeoCache};
pub use error::{EstimateError, ProviderError};
pub use estimator::RouteEstimator;
pub use provider::{LocalOrsProvider, OrsProviders, RemoteOrsProvider};
pub use service::{GeocodingProvider, RoutingProvider};
pub use types::{GeoPoint, ProviderRoute, RouteQuery, RouteResult};
