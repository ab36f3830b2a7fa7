//! Ledgerbook - Main Application Entry Point
//!
//! This is a REST API server for small-business bookkeeping. It provides
//! authenticated endpoints for accounts, transactions, budgets, invoices,
//! financial reports, and CSV/PDF export and import.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: Bearer session tokens with SHA-256 hashing
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod security;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let state = AppState { pool, config };

    // Create authenticated routes (API endpoints)
    let authenticated_routes = Router::new()
        // Account management routes
        .route(
            "/api/accounts",
            post(handlers::accounts::create_account).get(handlers::accounts::list_accounts),
        )
        .route(
            "/api/accounts/{id}",
            get(handlers::accounts::get_account)
                .put(handlers::accounts::update_account)
                .delete(handlers::accounts::delete_account),
        )
        // Transaction routes
        .route(
            "/api/transactions",
            post(handlers::transactions::create_transaction)
                .get(handlers::transactions::list_transactions),
        )
        .route(
            "/api/transactions/{id}",
            get(handlers::transactions::get_transaction)
                .put(handlers::transactions::update_transaction)
                .delete(handlers::transactions::delete_transaction),
        )
        // Budget routes
        .route(
            "/api/budgets",
            post(handlers::budgets::create_budget).get(handlers::budgets::list_budgets),
        )
        .route("/api/budgets/alerts", get(handlers::budgets::budget_alerts))
        // Invoice routes
        .route(
            "/api/invoices",
            post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
        )
        .route(
            "/api/invoices/{id}",
            get(handlers::invoices::get_invoice).delete(handlers::invoices::delete_invoice),
        )
        .route(
            "/api/invoices/{id}/status",
            put(handlers::invoices::update_invoice_status),
        )
        // Report routes
        .route(
            "/api/reports/balance-sheet",
            get(handlers::reports::balance_sheet),
        )
        .route(
            "/api/reports/profit-and-loss",
            get(handlers::reports::profit_and_loss),
        )
        .route("/api/reports/cash-flow", get(handlers::reports::cash_flow))
        // Export/import routes
        .route(
            "/api/export/transactions",
            get(handlers::export::export_transactions),
        )
        .route(
            "/api/import/transactions",
            post(handlers::export::import_transactions),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine authenticated routes with public routes
    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/password/reset-request",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/api/auth/password/reset",
            post(handlers::auth::reset_password),
        )
        // Merge authenticated routes
        .merge(authenticated_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share pool and config with all handlers via State extraction
        .with_state(state.clone());

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
