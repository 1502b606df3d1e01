use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classboard::api::router;
use classboard::config::Config;
use classboard::services::{CourseApi, LatencyProfile, RetryOptions};
use classboard::state::AppState;
use classboard::store::CourseStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "classboard=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let store = Arc::new(CourseStore::seeded());
    let api = CourseApi::new(
        store,
        Arc::new(config.fault_policy()),
        LatencyProfile::default(),
        RetryOptions::default(),
    );

    let state = AppState {
        courses: Arc::new(api),
    };
    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
