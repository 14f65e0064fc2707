//! Request authentication and role-gate middleware.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use surrealdb::Connection;

use agrocrm_core::models::user::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Extract the Bearer token from the Authorization header. The outer
/// `Option` is the header's presence; the inner one is whether it
/// carries the Bearer scheme.
fn extract_bearer(headers: &HeaderMap) -> Option<Option<&str>> {
    headers.get("authorization").map(|v| {
        v.to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
    })
}

/// Bearer-token authentication.
///
/// Only a truly absent header gets its own message; every other
/// failure (wrong scheme, bad signature, expiry, unknown or
/// deactivated user) produces the identical 401 so the response
/// reveals nothing about which check failed. On success the resolved
/// user is inserted as a request extension.
pub async fn require_auth<C: Connection>(
    State(state): State<AppState<C>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Some(Some(t)) => t.to_string(),
        Some(None) => {
            return ApiError::unauthorized("Token inválido!").into_response();
        }
        None => {
            return ApiError::unauthorized("Token é necessário!").into_response();
        }
    };

    match state.auth.authenticate(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(_) => ApiError::unauthorized("Token inválido!").into_response(),
    }
}

/// Manager-only gate. Runs strictly after [`require_auth`], so a
/// missing or bad token never reaches the role check.
pub async fn require_manager(req: Request, next: Next) -> Response {
    let is_manager = req
        .extensions()
        .get::<agrocrm_core::models::user::User>()
        .is_some_and(|u| u.role == Role::Manager);

    if !is_manager {
        return ApiError::new(
            axum::http::StatusCode::FORBIDDEN,
            "Acesso negado! Apenas gerentes podem acessar.",
        )
        .into_response();
    }

    next.run(req).await
}
