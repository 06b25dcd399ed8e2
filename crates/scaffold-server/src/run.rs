use crate::config::ServerConfig;
use crate::error::Result;
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::FutureExt;
use scaffold_app::{
    rest_api::api_router,
    state::{AppConfig, AppState},
};
use scaffold_types::ErrorObject;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state)?;

    if !args.no_cors {
        app = app.layer(CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

/// Fails when a resource route cannot be built
pub fn main_router(state: AppState) -> Result<Router<()>> {
    let router = api_router()?
        .with_state(state)
        .route("/health", get(health))
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());
    Ok(router)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!("No route for {uri}");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorObject {
            status: StatusCode::NOT_FOUND.as_u16(),
            title: "Not Found".to_string(),
            detail: format!("Cannot find route {}", uri.path()),
        }),
    )
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.backend.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = scaffold_dal::new_pool(&config.backend.database_url()).await?;
    scaffold_dal::run_migrations(&pool).await?;

    let app_config = AppConfig {
        base_url: config.base_url.clone(),
        max_request_items: config.max_request_items,
    };
    Ok(AppState::new(app_config, pool))
}
