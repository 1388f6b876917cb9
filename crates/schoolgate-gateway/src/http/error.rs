//! `GateError` -> HTTP response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use schoolgate_core::GateError;

/// Wrapper so gateway handlers can return `GateError` as a response.
#[derive(Debug)]
pub struct ApiError(pub GateError);

impl From<GateError> for ApiError {
    fn from(e: GateError) -> Self {
        Self(e)
    }
}

pub fn status_for(e: &GateError) -> StatusCode {
    match e {
        GateError::Unauthenticated => StatusCode::UNAUTHORIZED,
        GateError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        GateError::RoleUndefined | GateError::RoleInvalid(_) | GateError::RouteForbidden { .. } => {
            StatusCode::FORBIDDEN
        }
        GateError::UpstreamQuery(_)
        | GateError::ShapeValidation(_)
        | GateError::BadRequest(_)
        | GateError::UnsupportedVersion => StatusCode::BAD_REQUEST,
        GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// JSON error body: `{error, code, timestamp}`, plus `cause` for query failures.
pub fn error_body(e: &GateError) -> Value {
    let (message, cause) = match e {
        GateError::UpstreamQuery(cause) => ("upstream query failed".to_string(), Some(cause)),
        GateError::ShapeValidation(cause) => ("invalid response shape".to_string(), Some(cause)),
        other => (other.to_string(), None),
    };
    let mut body = json!({
        "error": message,
        "code": e.client_code().as_str(),
        "timestamp": now_timestamp(),
    });
    if let (Some(cause), Some(obj)) = (cause, body.as_object_mut()) {
        obj.insert("cause".into(), Value::String(cause.clone()));
    }
    body
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for(&self.0), Json(error_body(&self.0))).into_response()
    }
}
