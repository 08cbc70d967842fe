use serde::Serialize;

use crate::sdk::error::SimulationError;
use crate::sdk::metrics::{MetricsRecord, MetricsStore, PersistenceBackend};
use crate::sdk::routing::{
    GeocodingProvider, RouteEstimator, RouteQuery, RouteResult, RoutingProvider,
};

/// What one "Simulate Route" action produces.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Simulation {
    pub route: RouteResult,
    pub metrics: MetricsRecord,
}

/// Estimate a route, fold it into the running totals, return both.
pub struct RouteSimulator<'a, G, R, B> {
    estimator: &'a RouteEstimator<G, R>,
    store: &'a MetricsStore<B>,
}

impl<'a, G, R, B> RouteSimulator<'a, G, R, B>
where
    G: GeocodingProvider,
    R: RoutingProvider,
    B: PersistenceBackend,
{
    pub fn new(estimator: &'a RouteEstimator<G, R>, store: &'a MetricsStore<B>) -> Self {
        Self { estimator, store }
    }

    /// The store is only touched once the estimate has succeeded. The returned
    /// totals are the ones the write produced, so a landed write is never
    /// reported as a failure.
    pub fn simulate(&self, query: &RouteQuery) -> Result<Simulation, SimulationError> {
        log::info!("Simulating route {} → {}", query.origin, query.destination);
        let route = self.estimator.estimate(query)?;
        log::info!(
            "Route found: {:.1} mi, {:.1} h, ~{:.1} kg CO2 saved",
            route.distance_miles,
            route.duration_hours,
            route.emissions_saved_kg
        );

        let metrics = self
            .store
            .accumulate(route.distance_km(), route.emissions_saved_kg)?;

        Ok(Simulation { route, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::metrics::store::tests::FlakyBackend;
    use crate::sdk::metrics::SqliteBackend;
    use crate::sdk::routing::estimator::tests::{StubGeocoder, StubRouter};
    use crate::sdk::routing::EstimateError;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_simulation_updates_totals() {
        let estimator =
            RouteEstimator::new(StubGeocoder::us(), StubRouter::coast_to_coast(Vec::new()));
        let store = MetricsStore::new(SqliteBackend::in_memory().unwrap());
        let simulator = RouteSimulator::new(&estimator, &store);

        let sim = simulator
            .simulate(&RouteQuery::new("New York, NY", "Los Angeles, CA"))
            .unwrap();

        assert!((sim.route.distance_miles - 2800.0).abs() < 1e-6);
        assert!((sim.metrics.total_distance_km - 4506.152).abs() < 1e-3);
        assert!((sim.metrics.total_emissions_kg - 1150.8).abs() < 1e-6);
        assert_eq!(sim.metrics.route_count, 1);
    }

    #[test]
    fn test_failed_estimate_leaves_store_alone() {
        let estimator =
            RouteEstimator::new(StubGeocoder::us(), StubRouter::coast_to_coast(Vec::new()));
        let store = MetricsStore::new(FlakyBackend::new());
        let simulator = RouteSimulator::new(&estimator, &store);

        let err = simulator
            .simulate(&RouteQuery::new("Atlantis", "Los Angeles, CA"))
            .unwrap_err();

        assert!(matches!(
            err,
            SimulationError::Estimate(EstimateError::GeocodeFailure { .. })
        ));
        assert_eq!(store.read().unwrap().route_count, 0);
    }

    #[test]
    fn test_persistence_failure_surfaces() {
        let estimator =
            RouteEstimator::new(StubGeocoder::us(), StubRouter::coast_to_coast(Vec::new()));
        let backend = FlakyBackend::new();
        backend.fail_writes.store(true, Ordering::SeqCst);
        let store = MetricsStore::new(backend);
        let simulator = RouteSimulator::new(&estimator, &store);

        let err = simulator
            .simulate(&RouteQuery::new("New York, NY", "Los Angeles, CA"))
            .unwrap_err();
        assert!(matches!(err, SimulationError::Persistence(_)));
    }

    #[test]
    fn test_landed_write_is_reported_even_if_reads_then_fail() {
        let estimator =
            RouteEstimator::new(StubGeocoder::us(), StubRouter::coast_to_coast(Vec::new()));
        let backend = FlakyBackend::new();
        backend.fail_reads_after_write.store(true, Ordering::SeqCst);
        let store = MetricsStore::new(backend);
        let simulator = RouteSimulator::new(&estimator, &store);

        let sim = simulator
            .simulate(&RouteQuery::new("New York, NY", "Los Angeles, CA"))
            .unwrap();
        assert_eq!(sim.metrics.route_count, 1);
        assert!((sim.metrics.total_distance_km - 4506.152).abs() < 1e-3);

        // Reads are failing now, so check the row underneath the wrapper.
        assert!(store.read().is_err());
        let stored = store.backend().inner.get_singleton().unwrap().unwrap();
        assert_eq!(stored.record, sim.metrics);
    }
}
