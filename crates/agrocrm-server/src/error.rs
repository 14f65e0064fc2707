//! HTTP error responses.
//!
//! Every error becomes a `{"message": ...}` JSON body with the
//! status the original API contract expects. Duplicate-key conflicts
//! are reported as 400, not 409.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use agrocrm_core::error::CrmError;

/// An HTTP-ready error: status code plus user-facing message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<CrmError> for ApiError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::NotFound { ref entity, .. } => {
                let message = match entity.as_str() {
                    "user" => "Usuário não encontrado!",
                    "customer" => "Cliente não encontrado!",
                    "history" => "Histórico não encontrado!",
                    _ => "Registro não encontrado!",
                };
                Self::not_found(message)
            }
            CrmError::AlreadyExists { ref entity } => {
                let message = match entity.as_str() {
                    "administrador" => "Administrador já existe!",
                    _ => "Email já cadastrado!",
                };
                Self::bad_request(message)
            }
            CrmError::AuthenticationFailed { .. } => Self::unauthorized("Token inválido!"),
            CrmError::AuthorizationDenied { .. } => Self::new(
                StatusCode::FORBIDDEN,
                "Acesso negado! Apenas gerentes podem acessar.",
            ),
            CrmError::Validation { message } => Self::bad_request(message),
            CrmError::Database(msg) | CrmError::Crypto(msg) | CrmError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Erro interno: {msg}"),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}
