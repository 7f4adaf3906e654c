//! Class model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Qualification level of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Level {
    NC,
    ND,
    HND,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::NC => "NC",
            Level::ND => "ND",
            Level::HND => "HND",
        }
    }

    /// All levels, in qualification order
    pub fn all() -> [Level; 3] {
        [Level::NC, Level::ND, Level::HND]
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NC" => Ok(Level::NC),
            "ND" => Ok(Level::ND),
            "HND" => Ok(Level::HND),
            _ => Err(format!("Invalid level: {}. Must be NC, ND, or HND", s)),
        }
    }
}

// SQLx conversion for Level (stored as TEXT)
impl sqlx::Type<Postgres> for Level {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Level {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Level {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// An academic class (program/cohort) at a given level
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub level: Level,
    /// Union of class-specific and level-common modules, deduplicated
    pub modules: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Create class request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClass {
    #[validate(length(min = 1, message = "Class name is required"))]
    pub name: String,
    pub level: Level,
    pub modules: Vec<String>,
}

/// Update class request (admin only); all fields optional
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClass {
    #[validate(length(min = 1, message = "Class name must not be empty"))]
    pub name: Option<String>,
    pub level: Option<Level>,
    pub modules: Option<Vec<String>>,
}

/// Query parameters for the cascading filter endpoint
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FilterQuery {
    /// Selected class name, if any
    pub class: Option<String>,
    /// Selected level, if any
    pub level: Option<Level>,
}

/// Valid remaining filter options for a partial selection
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterOptions {
    pub classes: Vec<String>,
    pub levels: Vec<Level>,
    pub modules: Vec<String>,
}
