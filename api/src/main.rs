//! OpenForms API server

use openforms_api::{build_router, ApiConfig, ApiState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("OpenForms API v{}", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::from_env();
    if config.jwt_secret == ApiConfig::default().jwt_secret {
        tracing::warn!("Using the built-in JWT secret; set OPENFORMS_JWT_SECRET in production");
    }
    let addr = config.listen_addr.clone();
    let app = build_router(ApiState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("OpenForms API listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
