//! Authentication and user management service

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{NewUser, Role, User, UserFields},
    repository::Repository,
};

/// Self-service registration request
#[derive(Debug, Clone, Default, Validate)]
pub struct Registration {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Hash a password into a salted argon2 PHC string
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check `password` against a stored hash. Unparseable hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not a PHC string: {}", e);
            false
        }
    }
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Authenticate by email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .repository
            .users
            .find_by_email(email)
            .await?
            .filter(|user| verify_password(password, &user.password_hash));

        match user {
            Some(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
                Ok(user)
            }
            None => {
                tracing::warn!(email, "Failed login attempt");
                Err(AppError::Authentication("Invalid email or password".to_string()))
            }
        }
    }

    /// Create a plain `user` account.
    ///
    /// The duplicate check and the insert are two separate store calls, so
    /// two concurrent registrations with the same email can both succeed.
    pub async fn register(&self, registration: &Registration) -> AppResult<String> {
        registration
            .validate()
            .map_err(|_| AppError::Validation("All fields are required".to_string()))?;

        if self
            .repository
            .users
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = NewUser {
            name: registration.name.clone(),
            email: registration.email.clone(),
            password_hash: hash_password(&registration.password)?,
            role: Role::User,
        };
        let id = self.repository.users.insert(&user).await?;
        tracing::info!(user_id = %id, "User registered");
        Ok(id)
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        Ok(self.repository.users.get(id).await?)
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.repository.users.list().await?)
    }

    /// Admin edit of name, email and role
    pub async fn update_user(&self, id: &str, name: &str, email: &str, role: &str) -> AppResult<()> {
        let role: Role = role.parse().map_err(AppError::Validation)?;
        let fields = UserFields {
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        self.repository.users.update(id, &fields).await?;
        tracing::info!(user_id = id, role = %role, "User updated");
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
