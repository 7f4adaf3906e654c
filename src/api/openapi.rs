//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, classes, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PolyLib API",
        version = "1.0.0",
        description = "Polytechnic Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::profile,
        auth::bulk_create_students,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Classes
        classes::list_classes,
        classes::get_filters,
        classes::list_classes_by_level,
        classes::get_class,
        classes::create_class,
        classes::update_class,
        classes::delete_class,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            crate::models::user::UserProfile,
            crate::models::user::Role,
            crate::models::user::ClassLevel,
            crate::models::user::ClassLevelExpanded,
            crate::models::user::ClassRef,
            crate::models::user::BulkStudent,
            crate::models::user::BulkCreateStudents,
            crate::models::user::BulkCreateResponse,
            crate::models::user::CreatedStudent,
            // Books
            crate::models::book::Book,
            crate::models::book::AddedBy,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::FileRef,
            books::MessageResponse,
            // Classes
            crate::models::class::Class,
            crate::models::class::Level,
            crate::models::class::CreateClass,
            crate::models::class::UpdateClass,
            crate::models::class::FilterOptions,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "classes", description = "Class taxonomy and cascading filters")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
