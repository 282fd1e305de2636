use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flashdeck::config::Config;
use flashdeck::db;

/// `RUST_LOG` directives plus INFO for this crate and the request trace layer.
fn log_filter() -> Result<EnvFilter, ParseError> {
    Ok(EnvFilter::from_default_env()
        .add_directive("flashdeck=info".parse()?)
        .add_directive("tower_http=info".parse()?))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::init_pool(&config.db).await?;
    tracing::info!("database connection pool established");

    let app = flashdeck::build_app(pool.clone(), &config.env);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("starting {} server on {}", config.env, addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}
