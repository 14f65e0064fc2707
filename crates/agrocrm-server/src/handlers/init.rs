//! First-run administrator bootstrap.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use surrealdb::Connection;

use agrocrm_auth::service::{BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD};

use crate::error::ApiError;
use crate::state::AppState;

/// Create the default manager account. Refused once any manager
/// exists. The plaintext password is echoed exactly once, here.
pub async fn init_admin<C: Connection>(
    State(state): State<AppState<C>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let admin = state.auth.init_admin().await?;

    tracing::info!(user = %admin.id, "bootstrap administrator created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Administrador criado com sucesso!",
            "email": BOOTSTRAP_ADMIN_EMAIL,
            "senha": BOOTSTRAP_ADMIN_PASSWORD,
        })),
    ))
}
