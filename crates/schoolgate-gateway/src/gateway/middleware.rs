//! Axum middleware wiring for [`AuthorizationGateway`](super::AuthorizationGateway).

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::app_state::AppState;
use crate::gateway::headers::{apply_security_headers, attach_identity, strip_identity_headers};
use crate::gateway::Decision;
use crate::http::error::{error_body, status_for};

/// Paths under `/api` get JSON denials; everything else is a navigable page.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Gateway middleware. Install with `axum::middleware::from_fn_with_state`.
pub async fn authorize(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    strip_identity_headers(req.headers_mut());
    let path = req.uri().path().to_owned();

    let decision = app.gateway().decide(&path, req.headers()).await;
    app.metrics()
        .gateway_decisions
        .inc(&[("decision", decision.label())]);

    let mut resp = match decision {
        Decision::Public => next.run(req).await,
        Decision::Authorized(principal) => {
            tracing::debug!(user_id = %principal.id, role = %principal.role, %path, "authorized");
            attach_identity(req.headers_mut(), &principal);
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        denied => deny(&denied, &path, app.gateway().login_path()),
    };

    apply_security_headers(resp.headers_mut());
    resp
}

fn deny(decision: &Decision, path: &str, login_path: &str) -> Response {
    let Some(err) = decision.to_error() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    tracing::warn!(decision = decision.label(), %path, error = %err, "request denied");

    let api = is_api_path(path);
    match decision {
        Decision::Unauthenticated if !api => {
            Redirect::temporary(&format!("{login_path}?error=unauthenticated")).into_response()
        }
        Decision::RoleUndefined if !api => {
            Redirect::temporary(&format!("{login_path}?error=role_undefined")).into_response()
        }
        Decision::RoleUndefined => {
            let mut body = error_body(&err);
            if let Some(obj) = body.as_object_mut() {
                obj.insert("redirect".into(), login_path.into());
            }
            (status_for(&err), Json(body)).into_response()
        }
        Decision::RateLimited { retry_after } => {
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            let mut resp = (status_for(&err), Json(error_body(&err))).into_response();
            resp.headers_mut().insert(RETRY_AFTER, HeaderValue::from(secs));
            resp
        }
        _ => (status_for(&err), Json(error_body(&err))).into_response(),
    }
}
