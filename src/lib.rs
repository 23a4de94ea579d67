pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use std::path::Path;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::middleware::jwt_auth_middleware;

pub use crate::state::AppState;

/// Build the full HTTP application around the given state
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let static_dir = Path::new(&state.config.server.static_dir).to_path_buf();

    Router::new()
        // Public
        .route("/health", get(handlers::public::health_get))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Single-page client
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        // Global middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/register/", post(auth::register_post))
        .route("/api/register", post(auth::register_post))
        .route("/api/token/", post(auth::token_post))
        .route("/api/token", post(auth::token_post))
        .route("/api/token/refresh/", post(auth::refresh_post))
        .route("/api/token/refresh", post(auth::refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{projects, tasks};

    let project_collection = get(projects::list).post(projects::create);
    let project_item = get(projects::retrieve)
        .put(projects::update)
        .patch(projects::partial_update)
        .delete(projects::destroy);
    let task_collection = get(tasks::list).post(tasks::create);
    let task_item = get(tasks::retrieve)
        .put(tasks::update)
        .patch(tasks::partial_update)
        .delete(tasks::destroy);

    Router::new()
        .route("/api/projects/", project_collection.clone())
        .route("/api/projects", project_collection)
        .route("/api/projects/:id/", project_item.clone())
        .route("/api/projects/:id", project_item)
        .route("/api/tasks/", task_collection.clone())
        .route("/api/tasks", task_collection)
        .route("/api/tasks/:id/", task_item.clone())
        .route("/api/tasks/:id", task_item)
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
