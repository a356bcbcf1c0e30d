use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{UserError, UserResult};
use crate::events::{UserEvent, UserEventPublisher, UserEventsStream};
use crate::models::{CreateUser, NewUser, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;
use stream_worker::StreamDef;

/// Service layer for User business logic.
///
/// Create and delete publish a [`UserEvent`] after the write succeeds; a publish
/// failure is logged and never fails the write.
pub struct UserService<R: UserRepository, P: UserEventPublisher> {
    repository: Arc<R>,
    publisher: Arc<P>,
}

impl<R: UserRepository, P: UserEventPublisher> Clone for UserService<R, P> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<R: UserRepository, P: UserEventPublisher> UserService<R, P> {
    pub fn new(repository: R, publisher: P) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher: Arc::new(publisher),
        }
    }

    /// Create a new user with password hashing
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        if input.email.trim().is_empty() {
            error!("Invalid user data: email is empty");
            return Err(UserError::Validation(
                "User and email cannot be null or empty".to_string(),
            ));
        }

        if self.repository.email_exists(&input.email).await? {
            warn!(email = %input.email, "User with email already exists");
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        let created = self
            .repository
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await?;

        info!(user_id = created.id, email = %created.email, "User created successfully");
        self.publish(UserEvent::created(created.email.clone())).await;

        Ok(created.into())
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> UserResult<UserResponse> {
        Ok(self.find(id).await?.into())
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<UserResponse> {
        if email.is_empty() {
            error!("Invalid email: empty");
            return Err(UserError::Validation(
                "Email cannot be null or empty".to_string(),
            ));
        }

        let user = self.repository.get_by_email(email).await?.ok_or_else(|| {
            warn!(%email, "User not found with email");
            UserError::NotFoundByEmail(email.to_string())
        })?;

        Ok(user.into())
    }

    /// All users, ordered by id
    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Update a user: read, apply the non-empty fields, write back
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self.find(id).await?;
        info!(user_id = id, "Updating user");

        if let Some(new_email) = input.email()
            && new_email != user.email
            && self.repository.email_exists(new_email).await?
        {
            warn!(email = %new_email, "User with email already exists");
            return Err(UserError::DuplicateEmail(new_email.to_string()));
        }

        let new_password_hash = input.password().map(hash_password).transpose()?;
        user.apply_update(&input, new_password_hash);

        let updated = self.repository.update(user).await?;
        info!(user_id = updated.id, "User updated successfully");

        Ok(updated.into())
    }

    /// Delete a user and announce it with the email it had
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let user = self.find(id).await?;
        let email = user.email;

        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        info!(user_id = id, %email, "User deleted successfully");

        self.publish(UserEvent::deleted(email)).await;
        Ok(())
    }

    /// `false` for an empty email, without touching the store
    pub async fn user_exists(&self, email: &str) -> UserResult<bool> {
        if email.is_empty() {
            return Ok(false);
        }
        self.repository.email_exists(email).await
    }

    async fn find(&self, id: i64) -> UserResult<User> {
        if id <= 0 {
            error!(user_id = id, "Invalid user ID");
            return Err(UserError::Validation(
                "User ID must be greater than 0".to_string(),
            ));
        }

        self.repository.get_by_id(id).await?.ok_or_else(|| {
            warn!(user_id = id, "User not found");
            UserError::NotFound(id)
        })
    }

    async fn publish(&self, event: UserEvent) {
        match self.publisher.publish(&event).await {
            Ok(()) => info!(
                operation = %event.operation,
                email = %event.email,
                topic = UserEventsStream::STREAM_NAME,
                "User event published"
            ),
            Err(e) => error!(
                operation = %event.operation,
                email = %event.email,
                error = %e,
                "Failed to publish user event"
            ),
        }
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}
