use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use league::RotationOrchestrator;
use storage::Database;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod state;

use config::{Config, RotationConfig};
use features::{leaderboard, leagues};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        leaderboard::handlers::get_weekly_leaderboard,
        leaderboard::handlers::get_global_leaderboard,
        leagues::handlers::list_leagues,
        leagues::handlers::get_league_history,
    ),
    components(
        schemas(
            storage::dto::leaderboard::LeaderboardEntry,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::league::LeagueResponse,
            storage::dto::league::LeaguesListResponse,
            storage::dto::history::HistoryEntryResponse,
            storage::models::League,
        )
    ),
    tags(
        (name = "leaderboard", description = "Weekly and all-time leaderboards"),
        (name = "leagues", description = "League catalog and rotation history"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting league leaderboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let rotation = if config.rotation.enabled {
        let orchestrator = build_orchestrator(&db, &config.rotation)?;
        Some(tokio::spawn(orchestrator.start(shutdown_rx)))
    } else {
        tracing::warn!("Weekly rotation disabled by ROTATION_ENABLED");
        None
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api/leaderboard", leaderboard::routes::routes())
        .nest("/api/leagues", leagues::routes::routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(AppState::new(db));

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped, waiting for rotation job");
    // The receiver is gone when rotation is disabled
    let _ = shutdown_tx.send(true);
    if let Some(handle) = rotation {
        handle.await.context("Rotation task panicked")?;
    }

    Ok(())
}

fn build_orchestrator(db: &Database, rotation: &RotationConfig) -> anyhow::Result<Arc<RotationOrchestrator>> {
    let (schedule, settings) = rotation.build()?;

    tracing::info!(
        "Weekly rotation every {} at {:02}:00 UTC, polling every {:?}",
        rotation.weekday,
        rotation.hour,
        rotation.poll_interval
    );

    Ok(Arc::new(RotationOrchestrator::new(
        league::postgres::rotation_ports(db),
        schedule,
        settings,
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
