pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    rate_limit::{ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AuthConfig;
use crate::middleware::{access_guard, api_key_guard, role_guard, RoutePolicy, API_KEY_HEADER};
use crate::models::RoleCode;
use crate::services::{AuthService, MongoDb, TokenCodec};

#[derive(Clone)]
pub struct AppState {
    pub config: AuthConfig,
    pub db: MongoDb,
    pub jwt: TokenCodec,
    pub auth: AuthService,
    pub login_rate_limiter: IpRateLimiter,
    pub signup_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Per-route rate limits on the credential endpoints
    let signup_limiter = state.signup_rate_limiter.clone();
    let signup_route = Router::new()
        .route("/auth/signup/basic", post(handlers::auth::signup_basic))
        .layer(from_fn_with_state(signup_limiter, ip_rate_limit_middleware));

    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login/basic", post(handlers::auth::signin_basic))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    // Api-key gate only. Refresh authenticates through the keystore
    // pair lookup, not the access guard.
    let public_routes = Router::new()
        .merge(signup_route)
        .merge(login_route)
        .route("/auth/token/refresh", post(handlers::auth::token_refresh))
        .layer(from_fn_with_state(state.clone(), api_key_guard))
        .layer(Extension(RoutePolicy::default()));

    // Api-key gate plus a verified bearer session.
    let protected_routes = Router::new()
        .route("/auth/logout", delete(handlers::auth::signout))
        .route("/auth/logout/all", delete(handlers::auth::signout_everywhere))
        .route("/profile/my", get(handlers::user::my_profile))
        .layer(from_fn_with_state(state.clone(), access_guard))
        .layer(from_fn_with_state(state.clone(), api_key_guard))
        .layer(Extension(RoutePolicy::default()));

    // Full chain with an ADMIN role check on top.
    let admin_routes = Router::new()
        .route("/credentials/apikey", post(handlers::credential::create_api_key))
        .route(
            "/credentials/apikey/:key",
            delete(handlers::credential::delete_api_key),
        )
        .route("/credentials/role", post(handlers::credential::create_role))
        .route(
            "/credentials/role/:code",
            delete(handlers::credential::delete_role),
        )
        .layer(from_fn_with_state(state.clone(), role_guard))
        .layer(from_fn_with_state(state.clone(), access_guard))
        .layer(from_fn_with_state(state.clone(), api_key_guard))
        .layer(Extension(RoutePolicy::with_roles(
            crate::models::GENERAL_PERMISSION,
            vec![RoleCode::Admin],
        )));

    let ip_limiter = state.ip_rate_limiter.clone();

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state.clone())
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .filter_map(|o| match o.parse::<HeaderValue>() {
                            Ok(value) => Some(value),
                            Err(e) => {
                                tracing::error!(origin = %o, error = %e, "Invalid CORS origin, skipping");
                                None
                            }
                        })
                        .collect::<Vec<HeaderValue>>(),
                )
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    HeaderName::from_static(API_KEY_HEADER),
                ]),
        );

    Ok(app)
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "MongoDB health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
    })))
}
