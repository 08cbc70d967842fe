pub mod config;
pub mod error;
pub mod metrics;
pub mod routing;
pub mod simulator;
pub mod util;
