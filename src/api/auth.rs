//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{
        AuthResponse, BulkCreateResponse, BulkCreateStudents, LoginRequest, RegisterRequest,
        UserProfile,
    },
};

use super::AuthenticatedUser;

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid input or unresolvable class reference")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    request
        .validate()
        .map_err(|_| AppError::Authentication("Invalid credentials".to_string()))?;

    let response = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(response))
}

/// Current user profile with class references expanded
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.auth.get_profile(claims.sub).await?;
    Ok(Json(profile))
}

/// Bulk-create students (admin only); best-effort per item
#[utoipa::path(
    post,
    path = "/auth/bulk-create-students",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = BulkCreateStudents,
    responses(
        (status = 201, description = "Created students with temporary passwords", body = BulkCreateResponse),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn bulk_create_students(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BulkCreateStudents>,
) -> AppResult<(StatusCode, Json<BulkCreateResponse>)> {
    claims.require_admin()?;

    let response = state
        .services
        .auth
        .bulk_create_students(request.students)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
