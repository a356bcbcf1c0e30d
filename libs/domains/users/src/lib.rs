//! Users Domain
//!
//! User CRUD with Argon2 password hashing, plus the `user-events` stream that
//! announces creations and deletions to other services.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────────┐
//! │   Service   │ ──► │ EventPublisher │  ← user-events stream
//! └──────┬──────┘     └────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserEventPublisher, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new(), InMemoryUserEventPublisher::new());
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{LookupError, UserError, UserResult};
pub use events::{
    InMemoryUserEventPublisher, StreamUserEventPublisher, UserEvent, UserEventPublisher,
    UserEventsStream, UserOperation,
};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, ExistsQuery, ExistsResponse, NewUser, UpdateUser, User, UserResponse,
};
#[cfg(feature = "postgres")]
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
