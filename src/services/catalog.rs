//! Catalog service: class CRUD, cascading filter resolution, book CRUD

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, FileRef, UpdateBook},
        class::{Class, CreateClass, FilterOptions, FilterQuery, Level, UpdateClass},
        user::{Role, UserClaims},
    },
    repository::Repository,
    services::seed::merge_with_common_modules,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Database connectivity probe used by the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// All classes, ordered by level then name
    pub async fn list_classes(&self) -> AppResult<Vec<Class>> {
        self.repository.classes.list().await
    }

    pub async fn list_classes_by_level(&self, level: Level) -> AppResult<Vec<Class>> {
        self.repository.classes.list_by_level(level).await
    }

    pub async fn get_class(&self, id: Uuid) -> AppResult<Class> {
        self.repository.classes.get_by_id(id).await
    }

    /// Create a class; its modules are stored unioned with the level's
    /// common modules.
    pub async fn create_class(&self, request: CreateClass) -> AppResult<Class> {
        if self
            .repository
            .classes
            .name_level_exists(&request.name, request.level, None)
            .await?
        {
            return Err(AppError::Duplicate(
                "Class with this name and level already exists".to_string(),
            ));
        }

        let modules = merge_with_common_modules(&request.modules, request.level);
        self.repository
            .classes
            .create(&request.name, request.level, &modules)
            .await
    }

    /// Partial class update. A new module list is re-unioned with the
    /// (possibly changed) level's common modules.
    pub async fn update_class(&self, id: Uuid, request: UpdateClass) -> AppResult<Class> {
        let existing = self.repository.classes.get_by_id(id).await?;

        let name = request.name.unwrap_or(existing.name);
        let level = request.level.unwrap_or(existing.level);

        if self
            .repository
            .classes
            .name_level_exists(&name, level, Some(id))
            .await?
        {
            return Err(AppError::Duplicate(
                "Class with this name and level already exists".to_string(),
            ));
        }

        let modules = match request.modules {
            Some(modules) => merge_with_common_modules(&modules, level),
            None => existing.modules,
        };

        self.repository
            .classes
            .update(id, &name, level, &modules)
            .await
    }

    pub async fn delete_class(&self, id: Uuid) -> AppResult<()> {
        self.repository.classes.delete(id).await
    }

    // =========================================================================
    // Filter resolution
    // =========================================================================

    /// Resolve the valid remaining filter options for a partial selection,
    /// so the cascading UI never offers an invalid combination.
    pub async fn resolve_filters(&self, query: &FilterQuery) -> AppResult<FilterOptions> {
        let classes = self.repository.classes.list().await?;
        Ok(resolve_filter_options(&classes, query))
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// List books. Students only ever see available books, whatever the
    /// requested filter says.
    pub async fn list_books(&self, claims: &UserClaims, query: &BookQuery) -> AppResult<Vec<Book>> {
        let available = match claims.role {
            Role::Student => Some(true),
            Role::Admin => query.available,
        };

        self.repository
            .books
            .search(
                query.class.as_deref(),
                query.level,
                query.module.as_deref(),
                available,
            )
            .await
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a book after resolving its class reference and validating
    /// module membership. When a file is supplied its upload has already
    /// succeeded; the record is only written afterwards.
    pub async fn create_book(
        &self,
        book: CreateBook,
        file: Option<&FileRef>,
        added_by: Uuid,
    ) -> AppResult<Book> {
        let class = self
            .repository
            .classes
            .find_by_name_level(&book.class, book.level)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Class {} at {} level doesn't exist",
                    book.class, book.level
                ))
            })?;

        if !class.modules.contains(&book.module) {
            return Err(AppError::Validation(format!(
                "Module {} is not part of {} at {} level",
                book.module, book.class, book.level
            )));
        }

        let created = self
            .repository
            .books
            .create(&book, class.id, file, added_by)
            .await?;

        tracing::info!(book_id = %created.id, title = %created.title, "Added book");
        Ok(created)
    }

    /// Partial update. A changed module is re-validated against the book's
    /// current class/level; a supplied file replaces the stored reference
    /// (the previous object is not deleted).
    pub async fn update_book(
        &self,
        id: Uuid,
        update: UpdateBook,
        file: Option<&FileRef>,
    ) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;

        if let Some(ref module) = update.module {
            let class = self
                .repository
                .classes
                .find_by_name_level(&book.class_name, book.level)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "Class {} at {} level doesn't exist",
                        book.class_name, book.level
                    ))
                })?;

            if !class.modules.contains(module) {
                return Err(AppError::Validation(format!(
                    "Module {} is not valid for {} at {} level",
                    module, book.class_name, book.level
                )));
            }
        }

        self.repository.books.update(id, &update, file).await
    }

    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = %id, "Deleted book");
        Ok(())
    }
}

/// Pure filter resolution over the class catalog
fn resolve_filter_options(classes: &[Class], query: &FilterQuery) -> FilterOptions {
    let selected = classes.iter().filter(|c| {
        query.class.as_deref().map_or(true, |name| c.name == name)
            && query.level.map_or(true, |level| c.level == level)
    });

    let mut class_names = Vec::new();
    let mut levels = Vec::new();
    let mut modules = Vec::new();
    for class in selected {
        if !class_names.contains(&class.name) {
            class_names.push(class.name.clone());
        }
        if !levels.contains(&class.level) {
            levels.push(class.level);
        }
        for module in &class.modules {
            if !modules.contains(module) {
                modules.push(module.clone());
            }
        }
    }
    levels.sort();

    FilterOptions {
        classes: class_names,
        levels,
        modules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn class(name: &str, level: Level, modules: &[&str]) -> Class {
        Class {
            id: Uuid::new_v4(),
            name: name.to_string(),
            level,
            modules: modules.iter().map(|m| m.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Class> {
        vec![
            class("Computer Systems", Level::NC, &["Networking Basics", "Maths"]),
            class("Computer Systems", Level::HND, &["Cloud Computing", "Maths"]),
            class("Electrical Power", Level::ND, &["Power Electronics"]),
        ]
    }

    #[test]
    fn no_selection_returns_everything() {
        let options = resolve_filter_options(&catalog(), &FilterQuery::default());
        assert_eq!(options.classes, vec!["Computer Systems", "Electrical Power"]);
        assert_eq!(options.levels, vec![Level::NC, Level::ND, Level::HND]);
        assert!(options.modules.contains(&"Cloud Computing".to_string()));
        assert!(options.modules.contains(&"Power Electronics".to_string()));
        // shared module appears once
        let maths = options.modules.iter().filter(|m| *m == "Maths").count();
        assert_eq!(maths, 1);
    }

    #[test]
    fn class_selection_restricts_levels_and_modules() {
        let query = FilterQuery {
            class: Some("Computer Systems".to_string()),
            level: None,
        };
        let options = resolve_filter_options(&catalog(), &query);
        assert_eq!(options.classes, vec!["Computer Systems"]);
        assert_eq!(options.levels, vec![Level::NC, Level::HND]);
        assert!(!options.modules.contains(&"Power Electronics".to_string()));
    }

    #[test]
    fn class_and_level_pin_the_module_list() {
        let query = FilterQuery {
            class: Some("Computer Systems".to_string()),
            level: Some(Level::HND),
        };
        let options = resolve_filter_options(&catalog(), &query);
        assert_eq!(options.levels, vec![Level::HND]);
        assert_eq!(options.modules, vec!["Cloud Computing", "Maths"]);
    }

    #[test]
    fn unknown_class_yields_empty_options() {
        let query = FilterQuery {
            class: Some("Mechanical".to_string()),
            level: None,
        };
        let options = resolve_filter_options(&catalog(), &query);
        assert!(options.classes.is_empty());
        assert!(options.levels.is_empty());
        assert!(options.modules.is_empty());
    }
}
