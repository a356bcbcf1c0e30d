use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

/// User entity - matches the `users` table
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Store-generated identifier, always > 0
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Argon2 password hash, never exposed in API responses
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user that has not been stored yet; the repository assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// DTO for updating an existing user.
///
/// Absent or empty fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(max = 100))]
    pub username: Option<String>,
    #[validate(custom(function = "blank_or_email"), length(max = 255))]
    pub email: Option<String>,
    #[validate(custom(function = "blank_or_password"))]
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn username(&self) -> Option<&str> {
        non_empty(&self.username)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn password(&self) -> Option<&str> {
        non_empty(&self.password)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn blank_or_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.to_owned().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn blank_or_password(password: &str) -> Result<(), ValidationError> {
    match password.chars().count() {
        0 | 8..=128 => Ok(()),
        _ => Err(ValidationError::new("length")),
    }
}

/// Query for `GET /users/exists`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExistsQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

impl User {
    /// Apply the non-empty fields of an update; the password must already be hashed.
    pub fn apply_update(&mut self, input: &UpdateUser, new_password_hash: Option<String>) {
        if let Some(username) = input.username() {
            self.username = username.to_string();
        }
        if let Some(email) = input.email() {
            self.email = email.to_string();
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}
