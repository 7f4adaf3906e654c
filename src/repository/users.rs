//! Users repository for database operations

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        class::Level,
        user::{ClassLevel, ClassLevelExpanded, ClassRef, Role, User},
    },
    repository::is_unique_violation,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (primary authentication lookup)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at
            FROM users WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether a user record still exists
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a user with their class/level assignments in one transaction
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: Role,
        class_levels: &[ClassLevel],
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, role, created_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Duplicate("Email already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        for (position, cl) in class_levels.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO user_class_levels (user_id, class_id, level, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user.id)
            .bind(cl.class)
            .bind(cl.level)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Class/level assignments in insertion order
    pub async fn get_class_levels(&self, user_id: Uuid) -> AppResult<Vec<ClassLevel>> {
        let rows = sqlx::query(
            r#"
            SELECT class_id, level FROM user_class_levels
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ClassLevel {
                    class: row.try_get("class_id")?,
                    level: row.try_get::<Level, _>("level")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(AppError::Database)
    }

    /// Class/level assignments with class references expanded
    pub async fn get_class_levels_expanded(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<ClassLevelExpanded>> {
        let rows = sqlx::query(
            r#"
            SELECT ucl.level AS assigned_level,
                   c.id, c.name, c.level, c.modules
            FROM user_class_levels ucl
            JOIN classes c ON c.id = ucl.class_id
            WHERE ucl.user_id = $1
            ORDER BY ucl.position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ClassLevelExpanded {
                    class: ClassRef {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        level: row.try_get("level")?,
                        modules: row.try_get("modules")?,
                    },
                    level: row.try_get("assigned_level")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(AppError::Database)
    }
}
