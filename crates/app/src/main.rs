//! Banquet - Xuan Long banquet seating and bookings
//!
//! Terminal front end over the shared seat and booking documents. Several
//! instances may run against the same database and see each other's changes.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use banquet_core::AppConfig;

mod console;
mod debounce;
mod state;
mod sync;
mod viewmodel;

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting banquet");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match state::AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let watcher =
            sync::spawn_change_watcher(app_state.service.clone(), app_state.config.poll_interval());
        let result = console::run(&app_state).await;
        watcher.abort();
        result
    });

    if let Err(e) = result {
        tracing::error!("Console stopped: {}", e);
        std::process::exit(1);
    }
}
