//! JSON extractor that runs `validator` rules before the handler sees the body.

use crate::errors::ErrorResponse;
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Deserializes the body like `Json<T>` and then calls `T::validate`.
///
/// Malformed JSON keeps axum's own rejection; failed rules produce a 400
/// [`ErrorResponse`] whose `details` maps each field to its errors.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        data.validate().map_err(|e| {
            ErrorResponse::new("BadRequest", "Request validation failed")
                .with_details(field_details(&e))
                .into_response_with(StatusCode::BAD_REQUEST)
        })?;

        Ok(ValidatedJson(data))
    }
}

fn field_details(errors: &ValidationErrors) -> serde_json::Value {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
    }

    async fn signup(ValidatedJson(input): ValidatedJson<Signup>) -> String {
        input.email
    }

    fn request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let app = Router::new().route("/", post(signup));
        let response = app.oneshot(request(r#"{"email":"a@b.co"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"a@b.co");
    }

    #[tokio::test]
    async fn test_invalid_field_is_reported() {
        let app = Router::new().route("/", post(signup));
        let response = app.oneshot(request(r#"{"email":"nope"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.message, "Request validation failed");
        assert!(body.details.unwrap().get("email").is_some());
    }
}
