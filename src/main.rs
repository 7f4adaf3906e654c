//! PolyLib Server - Polytechnic Library Management System

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use polylib_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{
        self,
        storage::{LocalObjectStore, StorageService},
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("polylib_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PolyLib Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize the object store for uploaded book files
    let object_store = LocalObjectStore::new(&config.storage.root, &config.storage.public_base_url)
        .await
        .expect("Failed to initialize object store");
    let storage = StorageService::new(Arc::new(object_store), &config.storage);

    // Save the bind address before config moves into state
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), &config, storage);

    // Seed the default class catalog on first start
    services::seed::seed_default_classes(&repository)
        .await
        .expect("Failed to seed default classes");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Stored objects are served from the configured storage root
    let storage_root = state.config.storage.root.clone();

    // API routes
    let api = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/profile", get(api::auth::profile))
        .route(
            "/auth/bulk-create-students",
            post(api::auth::bulk_create_students),
        )
        // Books
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        // Classes
        .route("/classes", get(api::classes::list_classes))
        .route("/classes", post(api::classes::create_class))
        .route("/classes/filters", get(api::classes::get_filters))
        .route("/classes/level/:level", get(api::classes::list_classes_by_level))
        .route("/classes/:id", get(api::classes::get_class))
        .route("/classes/:id", put(api::classes::update_class))
        .route("/classes/:id", delete(api::classes::delete_class))
        // Book uploads arrive as multipart bodies
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        // Stored objects are served read-only under their public URLs
        .nest_service("/files", ServeDir::new(&storage_root))
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
