use anyhow::Context;
use clap::{Parser, Subcommand};
use greenroute::sdk::{
    config::AppConfig,
    error::SimulationError,
    metrics::{MetricsStore, SqliteBackend},
    routing::{CachedGeocoder, GeocodingProvider, OrsProviders, RouteEstimator, RouteQuery},
    simulator::{RouteSimulator, Simulation},
    util::{log::init_logging, rate_limit::ors_limiter},
};

/// GreenRoute: simulate a delivery route and track the cumulative impact
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a route and add it to the sustainability totals
    Simulate {
        /// Where the trip starts (e.g., "New York, NY")
        #[arg(short, long)]
        origin: String,

        /// Where the trip ends (e.g., "Los Angeles, CA")
        #[arg(short, long)]
        destination: String,
    },
    /// Print the cumulative sustainability metrics
    Metrics,
}

fn main() -> anyhow::Result<()> {
    init_logging("info");
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let backend = SqliteBackend::open(&config.database_path, config.db_busy_timeout)
        .context("Could not open the metrics database")?;
    let store = MetricsStore::with_factors(backend, config.factors)
        .max_attempts(config.max_write_attempts);

    match cli.command {
        Command::Metrics => {
            let record = store.read().context("Could not read metrics")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Simulate {
            origin,
            destination,
        } => {
            let query = RouteQuery::new(origin, destination);
            match simulate(&config, &store, &query) {
                Ok(simulation) => println!("{}", serde_json::to_string_pretty(&simulation)?),
                Err(SimulationError::ConfigurationMissing(e)) => {
                    log::warn!("Route simulation disabled: {}", e);
                    eprintln!(
                        "Route simulation is disabled. Set ORS_API_KEY or ORS_LOCAL_URL to enable it."
                    );
                }
                Err(e) => {
                    log::error!("Simulation failed: {}", e);
                    eprintln!("{}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn simulate(
    config: &AppConfig,
    store: &MetricsStore<SqliteBackend>,
    query: &RouteQuery,
) -> Result<Simulation, SimulationError> {
    let ors = config.ors()?;
    let limiter = ors_limiter(config.requests_per_minute);
    let providers = OrsProviders::from_config(ors, config.http_timeout, limiter)?;

    let geocoder: Box<dyn GeocodingProvider> = match &config.geo_cache_path {
        Some(path) => Box::new(CachedGeocoder::with_file(providers.geocoder, path)),
        None => providers.geocoder,
    };

    let estimator = RouteEstimator::with_emission_factor(
        geocoder,
        providers.router,
        config.emission_kg_per_mile,
    );
    RouteSimulator::new(&estimator, store).simulate(query)
}
