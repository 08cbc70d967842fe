pub mod sdk;

pub use sdk::config::{AppConfig, OrsConfig};
pub use sdk::error::SimulationError;
pub use sdk::metrics::{MetricsRecord, MetricsStore, SqliteBackend};
pub use sdk::routing::{GeoPoint, RouteEstimator, RouteQuery, RouteResult};
pub use sdk::simulator::{RouteSimulator, Simulation};
