//! HTTP API Layer
//!
//! This crate provides the REST API for rural producers using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Producer resource, dashboard statistics, tokens and health
//! - **Middleware**: Bearer authentication and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: One mapping from domain errors to responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::postgres(pool, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_rural::ProducerService;
use domain_users::{TokenBlacklistPort, UserService};
use infra_db::{PostgresProducerAdapter, PostgresTokenBlacklist, PostgresUserAdapter};

use crate::config::ApiConfig;
use crate::handlers::{auth as token, graphics, health, producer};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub producers: ProducerService,
    pub users: UserService,
    pub blacklist: Arc<dyn TokenBlacklistPort>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        producers: ProducerService,
        users: UserService,
        blacklist: Arc<dyn TokenBlacklistPort>,
        config: ApiConfig,
    ) -> Self {
        Self {
            producers,
            users,
            blacklist,
            config,
        }
    }

    /// Wires the services to the PostgreSQL adapters
    pub fn postgres(pool: PgPool, config: ApiConfig) -> Self {
        let producers = ProducerService::new(Arc::new(PostgresProducerAdapter::new(pool.clone())));
        let users = UserService::new(Arc::new(PostgresUserAdapter::new(pool.clone())))
            .with_bcrypt_cost(config.bcrypt_cost);
        let blacklist = Arc::new(PostgresTokenBlacklist::new(pool));
        Self::new(producers, users, blacklist, config)
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Services and configuration shared by the handlers
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/token/", post(token::obtain_token))
        .route("/token/refresh/", post(token::refresh_token))
        .route("/logout/", post(token::logout));

    // Protected routes
    let api_routes = Router::new()
        .route(
            "/produtores-rurais/",
            get(producer::list_producers).post(producer::create_producer),
        )
        .route(
            "/produtores-rurais/:id/",
            get(producer::get_producer)
                .put(producer::replace_producer)
                .patch(producer::partial_update_producer)
                .delete(producer::delete_producer),
        )
        .route("/graphics/", get(graphics::farm_statistics))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
