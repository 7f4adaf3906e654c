//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        class::Level,
        user::{
            AuthResponse, BulkCreateResponse, BulkStudent, ClassLevel, ClassLevelExpanded,
            CreatedStudent, RegisterRequest, Role, User, UserClaims, UserProfile,
        },
    },
    repository::Repository,
};

/// Default password handed to students at registration
pub const DEFAULT_STUDENT_PASSWORD: &str = "mtrpoly";

const EMAIL_DOMAIN: &str = "mtrepoly.edu";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user. Students get a generated institutional email and
    /// a default password when none is supplied; admins must supply one.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = generate_email(&request.name);

        let password = match (request.role, request.password) {
            (Role::Student, Some(p)) => p,
            (Role::Student, None) => DEFAULT_STUDENT_PASSWORD.to_string(),
            (Role::Admin, Some(p)) => p,
            (Role::Admin, None) => {
                return Err(AppError::Validation(
                    "Password is required for admin".to_string(),
                ))
            }
        };

        let class_levels = match request.role {
            Role::Student => {
                let class_levels = request.class_levels.unwrap_or_default();
                if class_levels.is_empty() {
                    return Err(AppError::Validation(
                        "Students must be assigned to at least one class level".to_string(),
                    ));
                }
                self.validate_class_levels(&class_levels).await?;
                class_levels
            }
            Role::Admin => Vec::new(),
        };

        let password_hash = hash_password(&password)?;
        let user = self
            .repository
            .users
            .create(&email, &request.name, &password_hash, request.role, &class_levels)
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");

        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
            class_levels: (user.role == Role::Student).then_some(class_levels),
            temporary_password: (user.role == Role::Student).then(|| password),
        })
    }

    /// Authenticate by email and password. Unknown email and bad password
    /// return an identical generic error to avoid user enumeration.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !verify_password(&user.password_hash, password) {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let class_levels = self.repository.users.get_class_levels(user.id).await?;
        let token = self.issue_token(&user)?;

        Ok(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
            class_levels: (user.role == Role::Student).then_some(class_levels),
            temporary_password: None,
        })
    }

    /// Current user with password excluded and class references expanded
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let class_levels = self
            .repository
            .users
            .get_class_levels_expanded(user_id)
            .await?;

        Ok(UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            class_levels,
            created_at: user.created_at,
        })
    }

    /// Check whether the token's user still exists (part of `protect`)
    pub async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        self.repository.users.exists(user_id).await
    }

    /// Best-effort bulk student creation: one student's failure is logged
    /// and skipped; the response reports successes only.
    pub async fn bulk_create_students(
        &self,
        students: Vec<BulkStudent>,
    ) -> AppResult<BulkCreateResponse> {
        let mut created = Vec::new();

        for student in students {
            match self.create_student(&student).await {
                Ok(entry) => created.push(entry),
                Err(e) => {
                    tracing::error!(name = %student.name, "Error creating student: {}", e);
                }
            }
        }

        Ok(BulkCreateResponse {
            message: format!("Successfully created {} students", created.len()),
            students: created,
        })
    }

    async fn create_student(&self, student: &BulkStudent) -> AppResult<CreatedStudent> {
        self.validate_class_levels(&student.class_levels).await?;

        let email = generate_email(&student.name);
        let password_hash = hash_password(DEFAULT_STUDENT_PASSWORD)?;
        let user = self
            .repository
            .users
            .create(
                &email,
                &student.name,
                &password_hash,
                Role::Student,
                &student.class_levels,
            )
            .await?;

        Ok(CreatedStudent {
            name: user.name,
            email: user.email,
            class_levels: student.class_levels.clone(),
            temporary_password: DEFAULT_STUDENT_PASSWORD.to_string(),
        })
    }

    /// Admins bypass; otherwise the user's assignments must contain the
    /// exact (class, level) pair.
    pub async fn authorize_class_level(
        &self,
        claims: &UserClaims,
        class_name: &str,
        level: Level,
    ) -> AppResult<()> {
        if claims.is_admin() {
            return Ok(());
        }

        let assignments = self
            .repository
            .users
            .get_class_levels_expanded(claims.sub)
            .await?;

        check_class_level_access(claims, &assignments, class_name, level)
    }

    /// Each referenced class must exist, carry modules, and match the
    /// requested level.
    async fn validate_class_levels(&self, class_levels: &[ClassLevel]) -> AppResult<()> {
        for cl in class_levels {
            let class = self
                .repository
                .classes
                .get_by_id(cl.class)
                .await
                .map_err(|e| match e {
                    AppError::NotFound(_) => {
                        AppError::Validation(format!("Class with ID {} not found", cl.class))
                    }
                    e => e,
                })?;

            if class.modules.is_empty() {
                return Err(AppError::Validation(format!(
                    "Class {} has no modules assigned",
                    class.name
                )));
            }

            if class.level != cl.level {
                return Err(AppError::Validation(format!(
                    "Invalid class-level combination: {} with level {}",
                    class.name, cl.level
                )));
            }
        }
        Ok(())
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.jwt_expiration_days)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a bearer token's signature and expiry
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Not authorized".to_string()))
    }
}

/// Pure access decision behind [`AuthService::authorize_class_level`]:
/// admins pass, students need the exact (class, level) pair among their
/// assignments.
pub fn check_class_level_access(
    claims: &UserClaims,
    assignments: &[ClassLevelExpanded],
    class_name: &str,
    level: Level,
) -> AppResult<()> {
    if claims.is_admin() {
        return Ok(());
    }

    let has_access = assignments
        .iter()
        .any(|cl| cl.class.name == class_name && cl.level == level);

    if has_access {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "Not authorized for {} at {} level",
            class_name, level
        )))
    }
}

/// Hash a password with argon2 and a fresh salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Compare a password against a stored argon2 hash
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Institutional email: lowercase name, whitespace collapsed to dots,
/// plus a 4-digit disambiguator.
pub fn generate_email(name: &str) -> String {
    let clean_name = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    let number: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("{}.{}@{}", clean_name, number, EMAIL_DOMAIN)
}
