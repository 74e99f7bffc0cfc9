use axum::{routing::get, Router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_booking::{config::Config, controllers, AppState};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cinema Booking API ({})", config.app.environment);

    let state = AppState::new(config).await?;
    info!("Database connected, migrations applied");

    // --- Background sweeps ---

    // Reclaim seats held by stale PENDING bookings
    let sweep_state = state.clone();
    let expiry_minutes = state.config.scheduler.booking_expiry_minutes;
    let sweep_interval = Duration::from_secs(state.config.scheduler.booking_sweep_interval_secs);
    task::spawn(async move {
        loop {
            if let Err(e) = sweep_state.bookings.expire_pending_bookings(expiry_minutes).await {
                error!("Booking expiry sweep failed: {:?}", e);
            }
            tokio::time::sleep(sweep_interval).await;
        }
    });

    // Walk sessions through SCHEDULED -> ONGOING -> COMPLETED
    let advance_state = state.clone();
    let advance_interval =
        Duration::from_secs(state.config.scheduler.session_sweep_interval_secs);
    task::spawn(async move {
        loop {
            if let Err(e) = advance_state.sessions.advance_statuses().await {
                error!("Session status sweep failed: {:?}", e);
            }
            tokio::time::sleep(advance_interval).await;
        }
    });

    // --- Start the web server ---

    let app = Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.app.host, state.config.app.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
