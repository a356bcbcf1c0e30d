use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{LookupError, UserResult};
use crate::events::UserEventPublisher;
use crate::models::{CreateUser, ExistsQuery, ExistsResponse, UpdateUser, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        get_user,
        get_user_by_email,
        user_exists,
        update_user,
        delete_user,
    ),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, ExistsResponse),
        responses(NotFoundResponse, BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R, P> = Arc<UserService<R, P>>;

/// Create the users router with all HTTP endpoints
pub fn router<R, P>(service: UserService<R, P>) -> Router
where
    R: UserRepository + 'static,
    P: UserEventPublisher + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/exists", get(user_exists))
        .route("/email/{email}", get(get_user_by_email))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(shared_service)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All users ordered by id", body = Vec<UserResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    Ok(Json(service.list_users().await?))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, LookupError> {
    Ok(Json(service.get_user(id).await?))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/email/{email}",
    tag = TAG,
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_by_email<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, LookupError> {
    Ok(Json(service.get_user_by_email(&email).await?))
}

/// Check whether a user with this email exists
#[utoipa::path(
    get,
    path = "/exists",
    tag = TAG,
    params(ExistsQuery),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn user_exists<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
    Query(query): Query<ExistsQuery>,
) -> UserResult<Json<ExistsResponse>> {
    let email = query.email.unwrap_or_default();
    let exists = service.user_exists(&email).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// Update a user; empty fields are left unchanged
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.update_user(id, input).await?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository, P: UserEventPublisher>(
    State(service): State<SharedService<R, P>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, LookupError> {
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
