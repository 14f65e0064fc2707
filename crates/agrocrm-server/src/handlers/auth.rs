//! Authentication and user-management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use agrocrm_core::error::CrmError;
use agrocrm_core::models::user::{CreateUser, Role, UpdateUser, User};
use agrocrm_core::repository::UserRepository;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    senha: Option<String>,
}

pub async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (email, senha) = match (body.email, body.senha) {
        (Some(e), Some(s)) if !e.is_empty() && !s.is_empty() => (e, s),
        _ => return Err(ApiError::bad_request("Email e senha são obrigatórios!")),
    };

    let output = state.auth.login(&email, &senha).await.map_err(|e| match e {
        CrmError::AuthenticationFailed { .. } => {
            ApiError::unauthorized("Credenciais inválidas!")
        }
        other => other.into(),
    })?;

    tracing::info!(user = %output.user.id, "login");
    Ok(Json(serde_json::json!({
        "token": output.token,
        "user": output.user,
    })))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    nome: Option<String>,
    email: Option<String>,
    senha: Option<String>,
    tipo: Option<String>,
}

pub async fn register<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(current): Extension<User>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (nome, email, senha, tipo) = match (body.nome, body.email, body.senha, body.tipo) {
        (Some(n), Some(e), Some(s), Some(t))
            if !n.is_empty() && !e.is_empty() && !s.is_empty() && !t.is_empty() =>
        {
            (n, e, s, t)
        }
        _ => {
            return Err(ApiError::bad_request(
                "Nome, email, senha e tipo são obrigatórios!",
            ));
        }
    };

    let role = Role::parse(&tipo).ok_or_else(|| {
        ApiError::bad_request("Tipo deve ser \"gerente\" ou \"vendedor\"!")
    })?;

    let user = state
        .users
        .create(CreateUser {
            name: nome,
            email,
            password: senha,
            role,
            created_by: Some(current.id),
        })
        .await?;

    tracing::info!(user = %user.id, by = %current.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Usuário criado com sucesso!",
            "user": user,
        })),
    ))
}

pub async fn list_users<C: Connection>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    nome: Option<String>,
    email: Option<String>,
    tipo: Option<String>,
    ativo: Option<bool>,
    senha: Option<String>,
}

pub async fn update_user<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .update(
            id,
            UpdateUser {
                name: body.nome,
                email: body.email,
                // An unrecognized role string is dropped rather than
                // rejected, mirroring the original API.
                role: body.tipo.as_deref().and_then(Role::parse),
                active: body.ativo,
                password: body.senha.filter(|s| !s.is_empty()),
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Usuário atualizado com sucesso!",
        "user": user,
    })))
}

pub async fn delete_user<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(current): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if id == current.id {
        return Err(ApiError::bad_request(
            "Não é possível excluir seu próprio usuário!",
        ));
    }

    // 404 before deactivation so unknown ids are reported as such.
    state.users.get_by_id(id).await?;
    state.users.deactivate(id).await?;

    tracing::info!(user = %id, by = %current.id, "user deactivated");
    Ok(Json(serde_json::json!({
        "message": "Usuário desativado com sucesso!",
    })))
}

pub async fn me(Extension(current): Extension<User>) -> Json<User> {
    Json(current)
}
