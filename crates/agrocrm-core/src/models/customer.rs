//! Customer domain model and its owned collections.
//!
//! A customer exclusively owns its history entries and photo records;
//! deleting a customer cascades to both. Users are referenced as
//! creator/actor but never owned.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default pipeline status for newly created customers.
pub const DEFAULT_PIPELINE_STATUS: &str = "Início de Relacionamento";

/// Deal temperature classification.
///
/// Stored and serialized in the original Portuguese form
/// (`Fria` / `Morna` / `Quente`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Temperature {
    #[default]
    #[serde(rename = "Fria")]
    Cold,
    #[serde(rename = "Morna")]
    Warm,
    #[serde(rename = "Quente")]
    Hot,
}

impl Temperature {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Fria" => Some(Temperature::Cold),
            "Morna" => Some(Temperature::Warm),
            "Quente" => Some(Temperature::Hot),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Cold => "Fria",
            Temperature::Warm => "Morna",
            Temperature::Hot => "Quente",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "fazenda")]
    pub farm: Option<String>,
    /// String-encoded coordinates, format left to the client.
    #[serde(rename = "coordenadas")]
    pub coordinates: Option<String>,
    pub area: f64,
    #[serde(rename = "maquinas")]
    pub machinery: String,
    #[serde(rename = "temperatura")]
    pub temperature: Temperature,
    #[serde(rename = "valor")]
    pub deal_value: Option<f64>,
    #[serde(rename = "oportunidades")]
    pub opportunities: Option<String>,
    #[serde(rename = "pendencias")]
    pub pending_items: Option<String>,
    /// Free-text pipeline status.
    pub status: String,
    #[serde(rename = "data_faturamento")]
    pub billing_date: Option<NaiveDate>,
    #[serde(rename = "observacoes_faturamento")]
    pub billing_notes: Option<String>,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful mutation.
    #[serde(rename = "atualizado_em")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "criado_por")]
    pub created_by: Uuid,
    /// Eagerly loaded on every read, chronological order.
    #[serde(rename = "historico")]
    pub history: Vec<HistoryEntry>,
    #[serde(rename = "fotos")]
    pub photos: Vec<PhotoRecord>,
}

/// Append-only event record tied to one customer and one acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(rename = "cliente_id")]
    pub customer_id: Uuid,
    #[serde(rename = "evento")]
    pub event: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "data")]
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "usuario_id")]
    pub user_id: Uuid,
    /// Acting user's name, resolved at read time.
    #[serde(rename = "usuario_nome")]
    pub user_name: Option<String>,
}

/// Metadata for an uploaded image. The binary content lives in
/// external file storage and is outside this model's scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: Uuid,
    #[serde(rename = "cliente_id")]
    pub customer_id: Uuid,
    #[serde(rename = "nome_arquivo")]
    pub filename: String,
    #[serde(rename = "caminho")]
    pub path: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "data_upload")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "usuario_id")]
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub farm: Option<String>,
    pub coordinates: Option<String>,
    pub area: f64,
    pub machinery: String,
    pub temperature: Option<Temperature>,
    pub deal_value: Option<f64>,
    pub opportunities: Option<String>,
    pub pending_items: Option<String>,
    pub status: Option<String>,
    pub billing_date: Option<NaiveDate>,
    pub billing_notes: Option<String>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub farm: Option<Option<String>>,
    pub coordinates: Option<Option<String>>,
    pub area: Option<f64>,
    pub machinery: Option<String>,
    pub temperature: Option<Temperature>,
    pub deal_value: Option<Option<f64>>,
    pub opportunities: Option<Option<String>>,
    pub pending_items: Option<Option<String>>,
    pub status: Option<String>,
    pub billing_date: Option<Option<NaiveDate>>,
    pub billing_notes: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct CreateHistoryEntry {
    pub event: String,
    pub description: Option<String>,
    /// Defaults to now when absent.
    pub occurred_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreatePhotoRecord {
    pub filename: String,
    pub path: String,
    pub description: Option<String>,
    pub user_id: Uuid,
}
