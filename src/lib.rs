//! Portfolio Site - public portfolio page and admin API

pub mod backend;
pub mod carousel;
pub mod config;
pub mod cv;
pub mod error;
pub mod logging;
pub mod media;
pub mod routes;
pub mod settings;
pub mod site;
pub mod viewer;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::backend::{Backend, SupabaseClient};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::viewer::ViewerRegistry;

/// Cap for every request except media uploads
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when no backend URL is configured; the public site then
    /// renders built-in defaults and admin calls answer 503
    pub backend: Option<Arc<dyn Backend>>,
    pub viewers: Arc<ViewerRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Option<Arc<dyn Backend>>) -> Self {
        let viewers = ViewerRegistry::new(config.viewer_ttl, config.auto_advance, config.max_viewers);
        Self {
            config: Arc::new(config),
            backend,
            viewers: Arc::new(viewers),
        }
    }

    pub fn backend(&self) -> AppResult<&Arc<dyn Backend>> {
        self.backend.as_ref().ok_or(AppError::Unavailable)
    }
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local dev origins.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3001"),
                HeaderValue::from_static("http://127.0.0.1:3001"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();

    let app = Router::new()
        .route("/", get(routes::site::index))
        .route("/api/site", get(routes::site::site_data))
        .route("/api/viewer", post(routes::viewer::create_viewer))
        .route(
            "/api/viewer/{id}",
            get(routes::viewer::get_viewer).delete(routes::viewer::delete_viewer),
        )
        .route("/api/viewer/{id}/slide", post(routes::viewer::slide))
        .route("/api/viewer/{id}/goto", post(routes::viewer::go_to))
        .route("/api/viewer/{id}/resize", post(routes::viewer::resize))
        .route("/api/viewer/{id}/refresh", post(routes::viewer::refresh))
        .route("/api/admin/login", post(routes::auth::login))
        .route("/api/admin/logout", post(routes::auth::logout))
        .route("/api/admin/session", get(routes::auth::session))
        .route(
            "/api/admin/sections/{section}",
            get(routes::sections::show_section),
        )
        .route("/api/admin/content", get(routes::content::list_content))
        .route("/api/admin/content/link", post(routes::content::add_link))
        .route(
            "/api/admin/content/{id}",
            patch(routes::content::update_content).delete(routes::content::delete_content),
        )
        .route(
            "/api/admin/content/{id}/active",
            post(routes::content::set_active),
        )
        .route(
            "/api/admin/settings",
            get(routes::settings::get_settings).put(routes::settings::save_settings),
        )
        .route(
            "/api/admin/cv",
            get(routes::cv::get_cv).put(routes::cv::save_cv),
        )
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/ready", get(routes::health::health_ready))
        .layer(RequestBodyLimitLayer::new(DEFAULT_BODY_LIMIT));

    // Uploads carry the media file itself, so they get their own ceiling
    let uploads = Router::new()
        .route(
            "/api/admin/content/upload",
            post(routes::content::upload_content),
        )
        .layer(DefaultBodyLimit::max(routes::content::UPLOAD_BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(routes::content::UPLOAD_BODY_LIMIT));

    app.merge(uploads)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Build the backend client, or `None` to run on built-in defaults
fn connect_backend(config: &AppConfig) -> Option<Arc<dyn Backend>> {
    let Some(backend_config) = config.backend.as_ref() else {
        tracing::warn!("SUPABASE_URL not set. Serving default content; admin API disabled.");
        return None;
    };

    match SupabaseClient::new(backend_config) {
        Ok(client) => {
            tracing::info!("Backend configured at {}", backend_config.url);
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to build backend client: {}. Serving default content.",
                e
            );
            None
        }
    }
}

/// Run the server (used by main).
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Dropping the guards stops the background writers
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    if config.is_production() && config.backend.is_none() {
        tracing::warn!("Running in production without a backend; the admin API will answer 503");
    }

    let addr = config.socket_addr()?;
    let backend = connect_backend(&config);
    let app = create_app(AppState::new(config, backend));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
