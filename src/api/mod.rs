//! API handlers for PolyLib REST endpoints

pub mod auth;
pub mod books;
pub mod classes;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated requests: verifies the bearer token and
/// checks that the user record still exists.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Not authorized, no token".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Not authorized, no token".to_string()))?;

        let claims = state.services.auth.verify_token(token)?;

        // Token holders whose account was removed are rejected
        if !state.services.auth.user_exists(claims.sub).await? {
            return Err(AppError::Authentication("User not found".to_string()));
        }

        Ok(AuthenticatedUser(claims))
    }
}
