//! Class (taxonomy) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::class::{Class, CreateClass, FilterOptions, FilterQuery, Level, UpdateClass},
};

use super::AuthenticatedUser;
use super::books::MessageResponse;
use uuid::Uuid;

/// List all classes, sorted by level then name
#[utoipa::path(
    get,
    path = "/classes",
    tag = "classes",
    responses(
        (status = 200, description = "List of classes", body = Vec<Class>)
    )
)]
pub async fn list_classes(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Class>>> {
    let classes = state.services.catalog.list_classes().await?;
    Ok(Json(classes))
}

/// Resolve cascading filter options for a partial class/level selection
#[utoipa::path(
    get,
    path = "/classes/filters",
    tag = "classes",
    params(
        ("class" = Option<String>, Query, description = "Selected class name"),
        ("level" = Option<String>, Query, description = "Selected level (NC, ND, HND)")
    ),
    responses(
        (status = 200, description = "Valid remaining options", body = FilterOptions)
    )
)]
pub async fn get_filters(
    State(state): State<crate::AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<FilterOptions>> {
    let options = state.services.catalog.resolve_filters(&query).await?;
    Ok(Json(options))
}

/// List classes at a given level
#[utoipa::path(
    get,
    path = "/classes/level/{level}",
    tag = "classes",
    params(("level" = String, Path, description = "Level (NC, ND, HND)")),
    responses(
        (status = 200, description = "Classes at the level", body = Vec<Class>),
        (status = 400, description = "Invalid level")
    )
)]
pub async fn list_classes_by_level(
    State(state): State<crate::AppState>,
    Path(level): Path<String>,
) -> AppResult<Json<Vec<Class>>> {
    let level: Level = level
        .parse()
        .map_err(|_| AppError::Validation("Invalid level. Must be NC, ND, or HND".to_string()))?;

    let classes = state.services.catalog.list_classes_by_level(level).await?;
    Ok(Json(classes))
}

/// Get class details by ID
#[utoipa::path(
    get,
    path = "/classes/{id}",
    tag = "classes",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class details", body = Class),
        (status = 404, description = "Class not found")
    )
)]
pub async fn get_class(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Class>> {
    let class = state.services.catalog.get_class(id).await?;
    Ok(Json(class))
}

/// Create a class (admin only)
#[utoipa::path(
    post,
    path = "/classes",
    tag = "classes",
    security(("bearer_auth" = [])),
    request_body = CreateClass,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Invalid input or duplicate (name, level)"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn create_class(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateClass>,
) -> AppResult<(StatusCode, Json<Class>)> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.catalog.create_class(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a class (admin only); partial
#[utoipa::path(
    put,
    path = "/classes/{id}",
    tag = "classes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = UpdateClass,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 400, description = "Invalid input or duplicate (name, level)"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn update_class(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClass>,
) -> AppResult<Json<Class>> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.catalog.update_class(id, request).await?;
    Ok(Json(updated))
}

/// Delete a class (admin only)
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    tag = "classes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 400, description = "Class is still referenced"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn delete_class(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_admin()?;

    state.services.catalog.delete_class(id).await?;
    Ok(Json(MessageResponse {
        message: "Class deleted successfully".to_string(),
    }))
}
