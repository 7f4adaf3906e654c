//! Classes repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::class::{Class, Level},
    repository::{is_foreign_key_violation, is_unique_violation},
};

const CLASS_COLUMNS: &str = "id, name, level, modules, created_at";

#[derive(Clone)]
pub struct ClassesRepository {
    pool: Pool<Postgres>,
}

impl ClassesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All classes, sorted by level then name ascending
    pub async fn list(&self) -> AppResult<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY level, name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(classes)
    }

    /// Classes at a given level, sorted by name
    pub async fn list_by_level(&self, level: Level) -> AppResult<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE level = $1 ORDER BY name"
        ))
        .bind(level)
        .fetch_all(&self.pool)
        .await?;
        Ok(classes)
    }

    /// Get class by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Class> {
        sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Class not found".to_string()))
    }

    /// Find a class by its unique (name, level) pair
    pub async fn find_by_name_level(&self, name: &str, level: Level) -> AppResult<Option<Class>> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE name = $1 AND level = $2"
        ))
        .bind(name)
        .bind(level)
        .fetch_optional(&self.pool)
        .await?;
        Ok(class)
    }

    /// Check whether another class already claims (name, level)
    pub async fn name_level_exists(
        &self,
        name: &str,
        level: Level,
        exclude_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM classes WHERE name = $1 AND level = $2 AND id != $3)",
            )
            .bind(name)
            .bind(level)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM classes WHERE name = $1 AND level = $2)",
            )
            .bind(name)
            .bind(level)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Number of classes (used by the startup seeder)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create a class; (name, level) uniqueness is enforced by the database
    pub async fn create(&self, name: &str, level: Level, modules: &[String]) -> AppResult<Class> {
        sqlx::query_as::<_, Class>(&format!(
            r#"
            INSERT INTO classes (name, level, modules)
            VALUES ($1, $2, $3)
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(level)
        .bind(modules)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Duplicate("Class with this name and level already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })
    }

    /// Overwrite a class's name, level and module list
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        level: Level,
        modules: &[String],
    ) -> AppResult<Class> {
        sqlx::query_as::<_, Class>(&format!(
            r#"
            UPDATE classes SET name = $2, level = $3, modules = $4
            WHERE id = $1
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(level)
        .bind(modules)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Class not found".to_string()),
            e if is_unique_violation(&e) => {
                AppError::Duplicate("Class with this name and level already exists".to_string())
            }
            e => AppError::Database(e),
        })
    }

    /// Delete a class; fails when existing books still reference it
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Validation(
                        "Class is still referenced by books or student assignments".to_string(),
                    )
                } else {
                    AppError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Class not found".to_string()));
        }
        Ok(())
    }
}
