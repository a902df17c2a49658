use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use abrolhos_fees::cache::{self, AppCache};
use abrolhos_fees::config::Config;
use abrolhos_fees::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;

    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    let price_cache = AppCache::new(config.price_cache_ttl);
    tokio::spawn(cache::start_cache_warmer(
        price_cache.clone(),
        db.clone(),
        config.price_cache_ttl,
    ));

    let bind_addr = config.bind_addr;
    tracing::info!(
        unpriced_visits = ?config.unpriced_visits,
        cache_ttl_secs = config.price_cache_ttl.as_secs(),
        "Starting fee service"
    );
    let app = routes::router(AppState::new(db, price_cache, config));

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("abrolhos_fees=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}
