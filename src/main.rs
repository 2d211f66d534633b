//! Cloud Booking Solutions site backend
//!
//! REST backend for the marketing site: team, blog, gallery, services and
//! careers content over a SQLite document store, contact and job-application
//! mail forwarding, and bearer-token authentication for content edits.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod mail;
mod models;
mod uploads;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::TokenKeys;
use config::Config;
use db::Store;
use mail::Mailer;
use uploads::{UploadStore, MAX_RESUME_BYTES};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub tokens: Arc<TokenKeys>,
    pub mailer: Arc<dyn Mailer>,
    pub uploads: Arc<UploadStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cloud Booking Solutions backend");
    tracing::info!("Environment: {:?}", config.environment);
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin.is_none() {
        tracing::warn!(
            "ADMIN_USERNAME/ADMIN_PASSWORD not set. Admin login is disabled!"
        );
    }
    if config.admin_email.is_none() {
        tracing::warn!("ADMIN_EMAIL not set. Contact and application mail will fail");
    }

    // Initialize document store
    let pool = db::open_store(&config.database_url).await?;
    let store = Arc::new(Store::new(pool));

    let mailer = mail::mailer_from_config(&config)?;
    let uploads = Arc::new(UploadStore::open(&config.upload_dir).await?);
    tracing::info!("Upload directory: {:?}", uploads.dir());
    let tokens = Arc::new(TokenKeys::new(&config.jwt_secret, config.token_ttl));

    let state = AppState {
        store: store.clone(),
        tokens,
        mailer,
        uploads,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let environment = state.config.environment;

    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter(|origin| {
            let wildcard = origin.as_str() == "*";
            if wildcard {
                tracing::warn!("Ignoring wildcard CORS origin");
            }
            !wildcard
        })
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring malformed CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    // Reads, login/register and the public forms
    let public_routes = Router::new()
        // Team
        .route("/team", get(api::list_team))
        .route("/team/{id}", get(api::get_team_member))
        // Blog
        .route("/blog", get(api::list_blog_posts))
        .route("/blog/published", get(api::list_published_posts))
        .route("/blog/{id}", get(api::get_blog_post))
        // Gallery
        .route("/gallery", get(api::list_gallery))
        .route("/gallery/images", get(api::list_images))
        .route("/gallery/videos", get(api::list_videos))
        .route("/gallery/events", get(api::list_events))
        .route("/gallery/type/{type}", get(api::list_gallery_by_type))
        .route("/gallery/{id}", get(api::get_gallery_item))
        // Services
        .route("/service", get(api::list_services))
        .route(
            "/service/category/{category}",
            get(api::list_services_by_category),
        )
        .route("/service/{id}", get(api::get_service))
        // Careers
        .route("/career", get(api::list_careers))
        .route(
            "/career/category/{category}",
            get(api::list_careers_by_category),
        )
        .route(
            "/career/apply",
            post(api::apply_for_career).layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + 64 * 1024)),
        )
        .route("/career/{id}", get(api::get_career))
        // Contact
        .route("/contact", post(api::submit_contact))
        // Auth
        .route("/auth/login", post(api::login))
        .route("/auth/register", post(api::register))
        .route("/auth/logout", post(api::logout));

    // Everything that mutates content sits behind the access gate
    let protected_routes = Router::new()
        // Team
        .route("/team", post(api::create_team_member))
        .route("/team/{id}", put(api::update_team_member))
        .route("/team/{id}", delete(api::delete_team_member))
        // Blog
        .route("/blog", post(api::create_blog_post))
        .route("/blog/{id}", put(api::update_blog_post))
        .route("/blog/{id}", delete(api::delete_blog_post))
        // Gallery
        .route("/gallery", post(api::create_gallery_item))
        .route("/gallery/images", post(api::create_image))
        .route("/gallery/videos", post(api::create_video))
        .route("/gallery/events", post(api::create_event))
        .route("/gallery/images/{id}", delete(api::delete_image))
        .route("/gallery/videos/{id}", delete(api::delete_video))
        .route("/gallery/events/{id}", delete(api::delete_event))
        .route("/gallery/{id}", put(api::update_gallery_item))
        .route("/gallery/{id}", delete(api::delete_gallery_item))
        // Services
        .route("/service", post(api::create_service))
        .route("/service/{id}", put(api::update_service))
        .route("/service/{id}", delete(api::delete_service))
        // Careers
        .route("/career", post(api::create_career))
        .route("/career/{id}", put(api::update_career))
        .route("/career/{id}", delete(api::delete_career))
        // Auth
        .route("/auth/user", get(api::current_user))
        .route("/auth/verify", get(api::verify_token))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth::require_auth,
        ));

    let api_routes = public_routes
        .merge(protected_routes)
        .fallback(errors::route_not_found);

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_routes);

    let router = if environment.is_production() {
        let static_dir = &state.config.static_dir;
        tracing::info!("Serving frontend bundle from {:?}", static_dir);
        router.fallback_service(
            ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html"))),
        )
    } else {
        router.fallback(errors::route_not_found)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(move |panic| {
                    errors::panic_response(panic, environment)
                }))
                .layer(middleware::from_fn_with_state(
                    environment,
                    errors::expose_error_detail,
                )),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "Cloud Booking Solutions API is running"
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests;
