use env_logger::{Builder, Env};

/// Initialises `env_logger`, letting `RUST_LOG` override `default_level`.
pub fn init_logging(default_level: &str) {
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
