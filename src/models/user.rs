//! User model, roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::class::Level;

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as TEXT)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// A (class, level) assignment as supplied by clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassLevel {
    /// Class reference by id
    pub class: Uuid,
    pub level: Level,
}

/// A (class, level) assignment with the class reference expanded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassLevelExpanded {
    pub class: ClassRef,
    pub level: Level,
}

/// Expanded class reference embedded in profile responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassRef {
    pub id: Uuid,
    pub name: String,
    pub level: Level,
    pub modules: Vec<String>,
}

/// Persisted user record
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// User profile response; password excluded, class references expanded
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub class_levels: Vec<ClassLevelExpanded>,
    pub created_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: Role,
    pub class_levels: Option<Vec<ClassLevel>>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Authentication response: user data (password stripped) plus token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_levels: Option<Vec<ClassLevel>>,
    /// Generated password, returned once at student registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// One entry of a bulk student creation request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkStudent {
    pub name: String,
    pub class_levels: Vec<ClassLevel>,
}

/// Bulk student creation request (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateStudents {
    pub students: Vec<BulkStudent>,
}

/// A successfully created student within a bulk request
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStudent {
    pub name: String,
    pub email: String,
    pub class_levels: Vec<ClassLevel>,
    pub temporary_password: String,
}

/// Bulk student creation response: count and successes only
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreateResponse {
    pub message: String,
    pub students: Vec<CreatedStudent>,
}

/// JWT claims embedded in session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl UserClaims {
    /// Build claims for a user with the given expiry window
    pub fn for_user(user: &User, expiration_days: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.id,
            role: user.role,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now,
            exp: now + expiration_days * 24 * 3600,
        }
    }

    /// Sign a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require one of the allowed roles (403 otherwise)
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "User role {} is not authorized",
                self.role
            )))
        }
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_role(&[Role::Admin])
    }
}
