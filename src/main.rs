use std::time::Duration;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod chatbot;
mod config;
mod db;
mod error;
mod expiry;
mod handlers;
mod lookup;
mod models;
mod report;
mod seed;

use crate::chatbot::ChatService;
use crate::config::Config;
use crate::expiry::ExpiryPolicy;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub policy: ExpiryPolicy,
    pub chat: ChatService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,supermarket_inventory=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!(
        warn_days = config.expiry_warn_days,
        chat_remote = config.chat_service_url.is_some(),
        "Starting supermarket inventory service"
    );

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Database connection pool established.");

    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete.");

    let chat = ChatService::new(
        config.chat_service_url.clone(),
        Duration::from_secs(config.chat_timeout_secs),
    )?;

    let state = AppState {
        db: pool,
        policy: config.expiry_policy(),
        chat,
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);
    info!("Quick-start: POST http://{}/api/seed  →  then GET http://{}/api/lotes/alertas", addr, addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    use handlers::{branches, brands, chat, lot_branches, lots, movements, products, seed, stock};

    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Catalogue ───────────────────────────────────────────────────────
        .route("/api/marcas", get(brands::list_brands).post(brands::create_brand))
        .route(
            "/api/marcas/:id",
            get(brands::get_brand).put(brands::update_brand).delete(brands::delete_brand),
        )
        .route("/api/productos", get(products::list_products).post(products::create_product))
        .route(
            "/api/productos/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/sucursales", get(branches::list_branches).post(branches::create_branch))
        .route(
            "/api/sucursales/:id",
            get(branches::get_branch)
                .put(branches::update_branch)
                .delete(branches::delete_branch),
        )

        // ── Lots & expiry ───────────────────────────────────────────────────
        .route("/api/lotes", get(lots::list_lots).post(lots::create_lot))
        .route("/api/lotes/alertas", get(lots::list_alerts))
        .route("/api/lotes/vencidos", get(lots::list_expired))
        .route("/api/lotes/estado", get(lots::preview_status))
        .route("/api/lotes/:id", get(lots::get_lot).delete(lots::delete_lot))
        .route("/api/lotes/:id/notificacion", patch(lots::set_notification))
        .route("/api/lotes/:id/baja", patch(lots::set_discarded))
        .route(
            "/api/lote-sucursales",
            get(lot_branches::list_lot_branches).post(lot_branches::create_lot_branch),
        )
        .route("/api/lote-sucursales/:id", delete(lot_branches::delete_lot_branch))

        // ── Stock & movements ───────────────────────────────────────────────
        .route("/api/stock", get(stock::list_stock))
        .route("/api/stock/reporte", get(stock::stock_report))
        .route("/api/stock/conteo", post(stock::reconcile_count))
        .route(
            "/api/movimientos",
            get(movements::list_movements).post(movements::create_movement),
        )
        .route("/api/movimientos/tipos", get(movements::list_movement_kinds))

        // ── Chatbot & demo data ─────────────────────────────────────────────
        .route("/api/chat", post(chat::chat))
        .route("/api/seed", post(seed::seed_data))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
