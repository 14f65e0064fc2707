//! Customer CRUD, history, and photo-metadata handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use agrocrm_core::models::customer::{
    CreateCustomer, CreateHistoryEntry, CreatePhotoRecord, Customer, HistoryEntry, PhotoRecord,
    Temperature, UpdateCustomer,
};
use agrocrm_core::models::user::User;
use agrocrm_core::repository::CustomerRepository;

use super::double_option;
use crate::error::ApiError;
use crate::state::AppState;

fn parse_billing_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Data de faturamento inválida!"))
}

#[derive(Debug, Deserialize)]
pub struct CreateClienteRequest {
    nome: Option<String>,
    telefone: Option<String>,
    cidade: Option<String>,
    fazenda: Option<String>,
    coordenadas: Option<String>,
    area: Option<f64>,
    maquinas: Option<String>,
    temperatura: Option<String>,
    valor: Option<f64>,
    oportunidades: Option<String>,
    pendencias: Option<String>,
    status: Option<String>,
    data_faturamento: Option<String>,
    observacoes_faturamento: Option<String>,
}

pub async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(current): Extension<User>,
    Json(body): Json<CreateClienteRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let (nome, telefone, cidade, area, maquinas) = match (
        body.nome,
        body.telefone,
        body.cidade,
        body.area,
        body.maquinas,
    ) {
        (Some(n), Some(t), Some(c), Some(a), Some(m))
            if !n.is_empty() && !t.is_empty() && !c.is_empty() && !m.is_empty() =>
        {
            (n, t, c, a, m)
        }
        _ => {
            return Err(ApiError::bad_request(
                "Nome, telefone, cidade, área e máquinas são obrigatórios!",
            ));
        }
    };

    let billing_date = body
        .data_faturamento
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_billing_date)
        .transpose()?;

    let customer = state
        .customers
        .create(CreateCustomer {
            name: nome,
            phone: telefone,
            city: cidade,
            farm: body.fazenda,
            coordinates: body.coordenadas,
            area,
            machinery: maquinas,
            // An unrecognized temperature falls back to the default.
            temperature: body.temperatura.as_deref().and_then(Temperature::parse),
            deal_value: body.valor,
            opportunities: body.oportunidades,
            pending_items: body.pendencias,
            status: body.status,
            billing_date,
            billing_notes: body.observacoes_faturamento,
            created_by: current.id,
        })
        .await?;

    tracing::info!(customer = %customer.id, by = %current.id, "customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list<C: Connection>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.customers.list().await?))
}

pub async fn get<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.get_by_id(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClienteRequest {
    nome: Option<String>,
    telefone: Option<String>,
    cidade: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    fazenda: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    coordenadas: Option<Option<String>>,
    area: Option<f64>,
    maquinas: Option<String>,
    temperatura: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    valor: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    oportunidades: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pendencias: Option<Option<String>>,
    status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    data_faturamento: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    observacoes_faturamento: Option<Option<String>>,
}

pub async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClienteRequest>,
) -> Result<Json<Customer>, ApiError> {
    let billing_date = match body.data_faturamento {
        None => None,
        Some(None) => Some(None),
        Some(Some(ref s)) if s.is_empty() => Some(None),
        Some(Some(ref s)) => Some(Some(parse_billing_date(s)?)),
    };

    let customer = state
        .customers
        .update(
            id,
            UpdateCustomer {
                name: body.nome,
                phone: body.telefone,
                city: body.cidade,
                farm: body.fazenda,
                coordinates: body.coordenadas,
                area: body.area,
                machinery: body.maquinas,
                temperature: body.temperatura.as_deref().and_then(Temperature::parse),
                deal_value: body.valor,
                opportunities: body.oportunidades,
                pending_items: body.pendencias,
                status: body.status,
                billing_date,
                billing_notes: body.observacoes_faturamento,
            },
        )
        .await?;

    Ok(Json(customer))
}

pub async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(current): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.customers.delete(id).await?;

    tracing::info!(customer = %id, by = %current.id, "customer deleted");
    Ok(Json(serde_json::json!({
        "message": "Cliente excluído com sucesso!",
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateHistoricoRequest {
    evento: Option<String>,
    descricao: Option<String>,
    data: Option<DateTime<Utc>>,
}

pub async fn add_history<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(current): Extension<User>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateHistoricoRequest>,
) -> Result<(StatusCode, Json<HistoryEntry>), ApiError> {
    let evento = match body.evento {
        Some(e) if !e.is_empty() => e,
        _ => return Err(ApiError::bad_request("Evento é obrigatório!")),
    };

    let entry = state
        .customers
        .add_history(
            id,
            CreateHistoryEntry {
                event: evento,
                description: body.descricao,
                occurred_at: body.data,
                user_id: current.id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_history<C: Connection>(
    State(state): State<AppState<C>>,
    Path((id, history_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.customers.delete_history(id, history_id).await?;

    Ok(Json(serde_json::json!({
        "message": "Histórico excluído com sucesso!",
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateFotoRequest {
    nome_arquivo: Option<String>,
    caminho: Option<String>,
    descricao: Option<String>,
}

pub async fn add_photo<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(current): Extension<User>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateFotoRequest>,
) -> Result<(StatusCode, Json<PhotoRecord>), ApiError> {
    let (nome_arquivo, caminho) = match (body.nome_arquivo, body.caminho) {
        (Some(n), Some(c)) if !n.is_empty() && !c.is_empty() => (n, c),
        _ => {
            return Err(ApiError::bad_request(
                "Nome do arquivo e caminho são obrigatórios!",
            ));
        }
    };

    let photo = state
        .customers
        .add_photo(
            id,
            CreatePhotoRecord {
                filename: nome_arquivo,
                path: caminho,
                description: body.descricao,
                user_id: current.id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(photo)))
}
