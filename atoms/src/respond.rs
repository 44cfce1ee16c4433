use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;

use crate::error::StoreError;
use crate::validation::FieldErrors;

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(value)?.into())
        .map_err(Box::new)?)
}

pub fn error(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    json(status, &serde_json::json!({ "error": message }))
}

pub fn no_content() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn not_found() -> Result<Response<Body>, Error> {
    error(StatusCode::NOT_FOUND, "Not found")
}

pub fn invalid(errors: &FieldErrors) -> Result<Response<Body>, Error> {
    json(StatusCode::BAD_REQUEST, &serde_json::json!({ "errors": errors }))
}

/// A parsed request value, or the response that rejects the request.
pub type Accepted<T> = Result<T, Response<Body>>;

/// Parses a JSON request body, answering 400 instead of failing the invocation.
pub fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<Accepted<T>, Error> {
    let parsed = if body.is_empty() {
        serde_json::from_slice(b"{}")
    } else {
        serde_json::from_slice(body)
    };

    match parsed {
        Ok(value) => Ok(Ok(value)),
        Err(e) => {
            tracing::warn!("Rejected request body: {}", e);
            error(StatusCode::BAD_REQUEST, &format!("Invalid request body: {}", e)).map(Err)
        }
    }
}

/// Maps a service failure onto its HTTP status.
pub fn store_error(e: StoreError) -> Result<Response<Body>, Error> {
    match e {
        StoreError::NotFound(_) => error(StatusCode::NOT_FOUND, &e.to_string()),
        StoreError::Conflict(msg) => error(StatusCode::CONFLICT, &msg),
        StoreError::Invalid(errors) => invalid(&errors),
        StoreError::Backend(msg) => {
            tracing::error!("Backend failure: {}", msg);
            error(StatusCode::INTERNAL_SERVER_ERROR, &msg)
        }
    }
}
