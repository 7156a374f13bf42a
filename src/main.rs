use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use intake_core::constants::{STORE_TIMEOUT_ENV, SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use intake_core::{config_from_env_values, PostgrestStore};

/// Main entry point for the intake service.
///
/// Resolves configuration once, builds the record store client, serves the REST API until
/// Ctrl-C, then closes the client.
///
/// The store client is blocking, so it is built and closed outside the tokio runtime; the
/// runtime only ever holds shared references to it.
///
/// # Environment Variables
/// - `SUPABASE_URL`: Supabase project URL (required)
/// - `SUPABASE_ANON_KEY`: Supabase anon key (required)
/// - `INTAKE_STORE_TIMEOUT_SECS`: per-request store timeout (default: 30)
/// - `INTAKE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("intake_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config_from_env_values(
        std::env::var(SUPABASE_URL_ENV).ok(),
        std::env::var(SUPABASE_ANON_KEY_ENV).ok(),
        std::env::var(STORE_TIMEOUT_ENV).ok(),
    )?;
    let rest_addr = std::env::var("INTAKE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Using record store at {}", cfg.supabase_url());

    let store = Arc::new(PostgrestStore::connect(&cfg)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let served = runtime.block_on(api_rest::serve(&rest_addr, AppState::new(store.clone())));
    drop(runtime);

    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(_) => tracing::warn!("record store client still referenced at shutdown"),
    }

    served
}
