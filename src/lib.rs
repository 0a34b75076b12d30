use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

use http::{Method, header};
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use tracing::Level;

pub mod config;
pub mod error;
pub mod state;

pub mod models {
    pub mod session;
    pub mod upstream;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod session;
    pub mod upstream;
}

pub mod handlers {
    pub mod auth;
    pub mod clients;
    pub mod machines;
    pub mod orders;
    pub mod pages;
    pub mod products;
    pub mod site_visits;
    pub mod uploads;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
}

pub mod validation {
    pub mod auth;
}

pub use config::Config;
pub use state::AppState;

/// Maximum accepted request body, sized for document and image uploads.
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Builds the full application router.
///
/// Three groups share the tree: the public auth endpoints under a strict
/// rate limit, the session-aware page-data routes, and the protected API
/// proxy behind `require_auth` and the CSRF check. Static UI assets are
/// served for everything else.
pub fn app(state: AppState) -> Router {
    let public_dir = state.config.public_dir.clone();

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
            "http://[::1]:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
            "x-csrf-token".parse().unwrap(),
        ])
        .allow_credentials(true)
        .expose_headers(["x-csrf-token".parse().unwrap()])
        .max_age(Duration::from_secs(86400));

    // Credential endpoints get a much tighter limit to damp brute-forcing.
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(5)
            .burst_size(30)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let proxy_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10_000)
            .burst_size(50_000)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .layer(tower_governor::GovernorLayer::new(auth_governor_conf))
        .with_state(state.clone());

    let page_routes = Router::new()
        .route("/client-management", get(handlers::pages::client_management))
        .route(
            "/client-management/{client_id}",
            get(handlers::pages::client_detail),
        )
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/session", get(handlers::auth::session))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/clients", get(handlers::clients::list_clients))
        .route("/api/clients", post(handlers::clients::create_client))
        .route("/api/clients/{client_id}", get(handlers::clients::get_client))
        .route("/api/clients/{client_id}", put(handlers::clients::update_client))
        .route(
            "/api/clients/{client_id}",
            delete(handlers::clients::delete_client),
        )
        .route(
            "/api/clients/{client_id}/machines",
            post(handlers::clients::add_machine),
        )
        .route(
            "/api/clients/{client_id}/machines/{machine_id}",
            put(handlers::clients::update_machine),
        )
        .route(
            "/api/clients/{client_id}/machines/{machine_id}/spare-parts",
            put(handlers::clients::update_spare_part),
        )
        .route(
            "/api/clients/{client_id}/machines/{machine_id}/spare-parts",
            delete(handlers::clients::delete_spare_part),
        )
        .route(
            "/api/clients/{client_id}/orders",
            get(handlers::orders::list_orders),
        )
        .route(
            "/api/clients/{client_id}/orders",
            post(handlers::orders::create_order),
        )
        .route(
            "/api/clients/{client_id}/orders/{order_id}",
            get(handlers::orders::get_order),
        )
        .route(
            "/api/clients/{client_id}/orders/{order_id}",
            put(handlers::orders::update_order),
        )
        .route(
            "/api/clients/{client_id}/orders/{order_id}",
            delete(handlers::orders::delete_order),
        )
        .route(
            "/api/clients/{client_id}/site-visits",
            get(handlers::site_visits::list_site_visits),
        )
        .route(
            "/api/clients/{client_id}/site-visits",
            post(handlers::site_visits::create_site_visit),
        )
        .route(
            "/api/clients/{client_id}/site-visits",
            delete(handlers::site_visits::delete_site_visit),
        )
        .route(
            "/api/clients/{client_id}/site-visits/{visit_id}",
            put(handlers::site_visits::update_site_visit),
        )
        .route("/api/machines/add", post(handlers::machines::add_machine))
        .route(
            "/api/machines/machine-category",
            get(handlers::machines::list_machine_categories),
        )
        .route(
            "/api/machines/machine-category",
            post(handlers::machines::create_machine_category),
        )
        .route("/api/products", get(handlers::products::list_products))
        .route("/api/products", post(handlers::products::create_product))
        .route(
            "/api/products/{product_id}",
            get(handlers::products::get_product),
        )
        .route(
            "/api/products/{product_id}",
            put(handlers::products::update_product),
        )
        .route(
            "/api/products/{product_id}",
            delete(handlers::products::delete_product),
        )
        .route(
            "/api/products/{product_id}/video",
            put(handlers::products::update_product_video),
        )
        .route("/api/upload", post(handlers::uploads::upload_single))
        .route(
            "/api/upload/multiple",
            post(handlers::uploads::upload_multiple),
        )
        .route(
            "/api/upload/audit-report",
            post(handlers::uploads::upload_audit_report),
        )
        .route("/api/users/password", put(handlers::users::update_password))
        .route("/api/users/profile", put(handlers::users::update_profile))
        .route(
            "/api/users/profile-picture",
            post(handlers::users::update_profile_picture),
        )
        .layer(tower_governor::GovernorLayer::new(proxy_governor_conf))
        .route_layer(from_fn(middleware_layer::csrf::verify_csrf))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(auth_routes)
        .merge(page_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .fallback_service(ServeDir::new(public_dir))
}
