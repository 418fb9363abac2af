use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use helluo_core::api::routes;

use crate::AppState;
use crate::auth::{self, middleware::require_admin};
use crate::handlers::{carnets, categories, exhibitions, health, portfolio, upload};
use crate::infra::config::Config;

/// Builds the full application: public reads, admin mutations, and the
/// shared layers.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(state.config());
    let body_limit = DefaultBodyLimit::max(state.config().media.max_upload_bytes);

    Router::new()
        .route(routes::HEALTH, get(health::health_handler))
        .merge(public_routes())
        .merge(admin_routes(state.clone()))
        .layer(body_limit)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route(routes::AUTH, post(auth::handlers::verify_password))
        .route(routes::CARNETS, get(carnets::list_carnets))
        .route(routes::PORTFOLIO, get(portfolio::list_items))
        .route(routes::CATEGORIES, get(categories::list_categories))
        .route(routes::EXHIBITIONS, get(exhibitions::list_exhibitions))
}

/// Routes that require the admin bearer token.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            routes::CARNETS,
            post(carnets::ingest_carnets)
                .delete(carnets::delete_carnet)
                .patch(carnets::rename_carnet),
        )
        .route(
            routes::PORTFOLIO,
            post(portfolio::add_item)
                .patch(portfolio::retitle_item)
                .delete(portfolio::delete_item),
        )
        .route(
            routes::CATEGORIES,
            post(categories::add_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            routes::EXHIBITIONS,
            post(exhibitions::add_exhibition)
                .patch(exhibitions::update_exhibition)
                .delete(exhibitions::delete_exhibition),
        )
        .route(routes::UPLOAD, post(upload::upload_image))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// Permissive in dev mode; otherwise restricted to the configured origins,
/// or any origin when none are configured.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
