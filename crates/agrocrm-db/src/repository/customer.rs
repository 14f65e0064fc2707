//! SurrealDB implementation of [`CustomerRepository`].
//!
//! Customer reads are eager by contract: every returned customer
//! carries its complete history and photo collections, with the acting
//! user's name resolved on each history entry. Cascade deletion of a
//! customer and its children runs in a single SurrealDB transaction.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use agrocrm_core::error::CrmResult;
use agrocrm_core::models::customer::{
    CreateCustomer, CreateHistoryEntry, CreatePhotoRecord, Customer, HistoryEntry, PhotoRecord,
    Temperature, UpdateCustomer, DEFAULT_PIPELINE_STATUS,
};
use agrocrm_core::repository::CustomerRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CustomerRow {
    name: String,
    phone: String,
    city: String,
    farm: Option<String>,
    coordinates: Option<String>,
    area: f64,
    machinery: String,
    temperature: String,
    deal_value: Option<f64>,
    opportunities: Option<String>,
    pending_items: Option<String>,
    status: String,
    billing_date: Option<String>,
    billing_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: String,
}

#[derive(Debug, SurrealValue)]
struct CustomerRowWithId {
    record_id: String,
    name: String,
    phone: String,
    city: String,
    farm: Option<String>,
    coordinates: Option<String>,
    area: f64,
    machinery: String,
    temperature: String,
    deal_value: Option<f64>,
    opportunities: Option<String>,
    pending_items: Option<String>,
    status: String,
    billing_date: Option<String>,
    billing_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: String,
}

#[derive(Debug, SurrealValue)]
struct HistoryRowWithId {
    record_id: String,
    customer_id: String,
    event: String,
    description: Option<String>,
    occurred_at: DateTime<Utc>,
    user_id: String,
}

#[derive(Debug, SurrealValue)]
struct PhotoRowWithId {
    record_id: String,
    customer_id: String,
    filename: String,
    path: String,
    description: Option<String>,
    uploaded_at: DateTime<Utc>,
    user_id: String,
}

#[derive(Debug, SurrealValue)]
struct UserNameRow {
    record_id: String,
    name: String,
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_temperature(s: &str) -> Result<Temperature, DbError> {
    Temperature::parse(s).ok_or_else(|| DbError::Decode(format!("unknown temperature: {s}")))
}

fn parse_billing_date(s: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    s.map(|v| {
        NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map_err(|e| DbError::Decode(format!("invalid billing date: {e}")))
    })
    .transpose()
}

impl CustomerRow {
    fn into_customer(
        self,
        id: Uuid,
        history: Vec<HistoryEntry>,
        photos: Vec<PhotoRecord>,
    ) -> Result<Customer, DbError> {
        Ok(Customer {
            id,
            name: self.name,
            phone: self.phone,
            city: self.city,
            farm: self.farm,
            coordinates: self.coordinates,
            area: self.area,
            machinery: self.machinery,
            temperature: parse_temperature(&self.temperature)?,
            deal_value: self.deal_value,
            opportunities: self.opportunities,
            pending_items: self.pending_items,
            status: self.status,
            billing_date: parse_billing_date(self.billing_date)?,
            billing_notes: self.billing_notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: parse_uuid(&self.created_by, "creator")?,
            history,
            photos,
        })
    }
}

impl CustomerRowWithId {
    fn split(self) -> Result<(Uuid, CustomerRow), DbError> {
        let id = parse_uuid(&self.record_id, "customer")?;
        Ok((
            id,
            CustomerRow {
                name: self.name,
                phone: self.phone,
                city: self.city,
                farm: self.farm,
                coordinates: self.coordinates,
                area: self.area,
                machinery: self.machinery,
                temperature: self.temperature,
                deal_value: self.deal_value,
                opportunities: self.opportunities,
                pending_items: self.pending_items,
                status: self.status,
                billing_date: self.billing_date,
                billing_notes: self.billing_notes,
                created_at: self.created_at,
                updated_at: self.updated_at,
                created_by: self.created_by,
            },
        ))
    }
}

impl HistoryRowWithId {
    fn into_entry(self, names: &HashMap<Uuid, String>) -> Result<HistoryEntry, DbError> {
        let user_id = parse_uuid(&self.user_id, "user")?;
        Ok(HistoryEntry {
            id: parse_uuid(&self.record_id, "history")?,
            customer_id: parse_uuid(&self.customer_id, "customer")?,
            event: self.event,
            description: self.description,
            occurred_at: self.occurred_at,
            user_id,
            user_name: names.get(&user_id).cloned(),
        })
    }
}

impl PhotoRowWithId {
    fn into_photo(self) -> Result<PhotoRecord, DbError> {
        Ok(PhotoRecord {
            id: parse_uuid(&self.record_id, "photo")?,
            customer_id: parse_uuid(&self.customer_id, "customer")?,
            filename: self.filename,
            path: self.path,
            description: self.description,
            uploaded_at: self.uploaded_at,
            user_id: parse_uuid(&self.user_id, "user")?,
        })
    }
}

/// SurrealDB implementation of the customer repository.
pub struct SurrealCustomerRepository<C: Connection> {
    db: Surreal<C>,
}

// Manual impl: `Surreal<C>` is Clone for any engine, a derive would
// also demand `C: Clone`.
impl<C: Connection> Clone for SurrealCustomerRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealCustomerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Resolve display names for a set of user ids in one query.
    async fn user_names(&self, ids: Vec<String>) -> Result<HashMap<Uuid, String>, DbError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, name FROM user \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", ids))
            .await?;
        let rows: Vec<UserNameRow> = result.take(0)?;
        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            names.insert(parse_uuid(&row.record_id, "user")?, row.name);
        }
        Ok(names)
    }

    /// Fetch history entries for the given customers, chronological,
    /// with acting-user names resolved.
    async fn load_history(
        &self,
        customer_ids: Vec<String>,
    ) -> Result<HashMap<Uuid, Vec<HistoryEntry>>, DbError> {
        if customer_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM customer_history \
                 WHERE customer_id IN $ids ORDER BY occurred_at ASC",
            )
            .bind(("ids", customer_ids))
            .await?;
        let rows: Vec<HistoryRowWithId> = result.take(0)?;

        let mut user_ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let names = self.user_names(user_ids).await?;

        let mut by_customer: HashMap<Uuid, Vec<HistoryEntry>> = HashMap::new();
        for row in rows {
            let entry = row.into_entry(&names)?;
            by_customer.entry(entry.customer_id).or_default().push(entry);
        }
        Ok(by_customer)
    }

    /// Fetch photo metadata for the given customers, upload order.
    async fn load_photos(
        &self,
        customer_ids: Vec<String>,
    ) -> Result<HashMap<Uuid, Vec<PhotoRecord>>, DbError> {
        if customer_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM customer_photo \
                 WHERE customer_id IN $ids ORDER BY uploaded_at ASC",
            )
            .bind(("ids", customer_ids))
            .await?;
        let rows: Vec<PhotoRowWithId> = result.take(0)?;

        let mut by_customer: HashMap<Uuid, Vec<PhotoRecord>> = HashMap::new();
        for row in rows {
            let photo = row.into_photo()?;
            by_customer.entry(photo.customer_id).or_default().push(photo);
        }
        Ok(by_customer)
    }

    /// NotFound guard shared by the child-collection operations.
    async fn ensure_exists(&self, id: Uuid) -> Result<(), DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id FROM type::record('customer', $id)")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<IdRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "customer".into(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl<C: Connection> CustomerRepository for SurrealCustomerRepository<C> {
    async fn create(&self, input: CreateCustomer) -> CrmResult<Customer> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('customer', $id) SET \
                 name = $name, phone = $phone, city = $city, \
                 farm = $farm, coordinates = $coordinates, \
                 area = $area, machinery = $machinery, \
                 temperature = $temperature, deal_value = $deal_value, \
                 opportunities = $opportunities, \
                 pending_items = $pending_items, status = $status, \
                 billing_date = $billing_date, \
                 billing_notes = $billing_notes, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("phone", input.phone))
            .bind(("city", input.city))
            .bind(("farm", input.farm))
            .bind(("coordinates", input.coordinates))
            .bind(("area", input.area))
            .bind(("machinery", input.machinery))
            .bind((
                "temperature",
                input.temperature.unwrap_or_default().as_str().to_string(),
            ))
            .bind(("deal_value", input.deal_value))
            .bind(("opportunities", input.opportunities))
            .bind(("pending_items", input.pending_items))
            .bind((
                "status",
                input
                    .status
                    .unwrap_or_else(|| DEFAULT_PIPELINE_STATUS.to_string()),
            ))
            .bind(("billing_date", input.billing_date.map(|d| d.to_string())))
            .bind(("billing_notes", input.billing_notes))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Decode(e.to_string()))?;
        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: id_str,
        })?;

        Ok(row.into_customer(id, Vec::new(), Vec::new())?)
    }

    async fn get_by_id(&self, id: Uuid) -> CrmResult<Customer> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('customer', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: id_str.clone(),
        })?;

        let mut history = self.load_history(vec![id_str.clone()]).await?;
        let mut photos = self.load_photos(vec![id_str]).await?;

        Ok(row.into_customer(
            id,
            history.remove(&id).unwrap_or_default(),
            photos.remove(&id).unwrap_or_default(),
        )?)
    }

    async fn list(&self) -> CrmResult<Vec<Customer>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM customer \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRowWithId> = result.take(0).map_err(DbError::from)?;

        let ids: Vec<String> = rows.iter().map(|r| r.record_id.clone()).collect();
        let mut history = self.load_history(ids.clone()).await?;
        let mut photos = self.load_photos(ids).await?;

        let mut customers = Vec::with_capacity(rows.len());
        for row in rows {
            let (id, row) = row.split()?;
            customers.push(row.into_customer(
                id,
                history.remove(&id).unwrap_or_default(),
                photos.remove(&id).unwrap_or_default(),
            )?);
        }
        Ok(customers)
    }

    async fn update(&self, id: Uuid, input: UpdateCustomer) -> CrmResult<Customer> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.city.is_some() {
            sets.push("city = $city");
        }
        if input.farm.is_some() {
            sets.push("farm = $farm");
        }
        if input.coordinates.is_some() {
            sets.push("coordinates = $coordinates");
        }
        if input.area.is_some() {
            sets.push("area = $area");
        }
        if input.machinery.is_some() {
            sets.push("machinery = $machinery");
        }
        if input.temperature.is_some() {
            sets.push("temperature = $temperature");
        }
        if input.deal_value.is_some() {
            sets.push("deal_value = $deal_value");
        }
        if input.opportunities.is_some() {
            sets.push("opportunities = $opportunities");
        }
        if input.pending_items.is_some() {
            sets.push("pending_items = $pending_items");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.billing_date.is_some() {
            sets.push("billing_date = $billing_date");
        }
        if input.billing_notes.is_some() {
            sets.push("billing_notes = $billing_notes");
        }
        // The update timestamp refreshes on every successful mutation,
        // even when no other field changed.
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('customer', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(city) = input.city {
            builder = builder.bind(("city", city));
        }
        if let Some(farm) = input.farm {
            builder = builder.bind(("farm", farm));
        }
        if let Some(coordinates) = input.coordinates {
            builder = builder.bind(("coordinates", coordinates));
        }
        if let Some(area) = input.area {
            builder = builder.bind(("area", area));
        }
        if let Some(machinery) = input.machinery {
            builder = builder.bind(("machinery", machinery));
        }
        if let Some(temperature) = input.temperature {
            builder = builder.bind(("temperature", temperature.as_str().to_string()));
        }
        if let Some(deal_value) = input.deal_value {
            builder = builder.bind(("deal_value", deal_value));
        }
        if let Some(opportunities) = input.opportunities {
            builder = builder.bind(("opportunities", opportunities));
        }
        if let Some(pending_items) = input.pending_items {
            builder = builder.bind(("pending_items", pending_items));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status));
        }
        if let Some(billing_date) = input.billing_date {
            builder = builder.bind(("billing_date", billing_date.map(|d| d.to_string())));
        }
        if let Some(billing_notes) = input.billing_notes {
            builder = builder.bind(("billing_notes", billing_notes));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: id_str.clone(),
        })?;

        let mut history = self.load_history(vec![id_str.clone()]).await?;
        let mut photos = self.load_photos(vec![id_str]).await?;

        Ok(row.into_customer(
            id,
            history.remove(&id).unwrap_or_default(),
            photos.remove(&id).unwrap_or_default(),
        )?)
    }

    async fn delete(&self, id: Uuid) -> CrmResult<()> {
        self.ensure_exists(id).await?;

        // Parent and children go in one transaction; a failure at any
        // statement rolls back the whole cascade.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE customer_history WHERE customer_id = $id; \
                 DELETE customer_photo WHERE customer_id = $id; \
                 DELETE type::record('customer', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        Ok(())
    }

    async fn add_history(
        &self,
        customer_id: Uuid,
        input: CreateHistoryEntry,
    ) -> CrmResult<HistoryEntry> {
        self.ensure_exists(customer_id).await?;

        let id = Uuid::new_v4();
        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);

        self.db
            .query(
                "CREATE type::record('customer_history', $id) SET \
                 customer_id = $customer_id, event = $event, \
                 description = $description, occurred_at = $occurred_at, \
                 user_id = $user_id",
            )
            .bind(("id", id.to_string()))
            .bind(("customer_id", customer_id.to_string()))
            .bind(("event", input.event.clone()))
            .bind(("description", input.description.clone()))
            .bind(("occurred_at", occurred_at))
            .bind(("user_id", input.user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let names = self.user_names(vec![input.user_id.to_string()]).await?;

        Ok(HistoryEntry {
            id,
            customer_id,
            event: input.event,
            description: input.description,
            occurred_at,
            user_id: input.user_id,
            user_name: names.get(&input.user_id).cloned(),
        })
    }

    async fn delete_history(&self, customer_id: Uuid, history_id: Uuid) -> CrmResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id \
                 FROM type::record('customer_history', $id) \
                 WHERE customer_id = $customer_id",
            )
            .bind(("id", history_id.to_string()))
            .bind(("customer_id", customer_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "history".into(),
                id: history_id.to_string(),
            }
            .into());
        }

        self.db
            .query("DELETE type::record('customer_history', $id)")
            .bind(("id", history_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn add_photo(
        &self,
        customer_id: Uuid,
        input: CreatePhotoRecord,
    ) -> CrmResult<PhotoRecord> {
        self.ensure_exists(customer_id).await?;

        let id = Uuid::new_v4();
        let uploaded_at = Utc::now();

        self.db
            .query(
                "CREATE type::record('customer_photo', $id) SET \
                 customer_id = $customer_id, filename = $filename, \
                 path = $path, description = $description, \
                 uploaded_at = $uploaded_at, user_id = $user_id",
            )
            .bind(("id", id.to_string()))
            .bind(("customer_id", customer_id.to_string()))
            .bind(("filename", input.filename.clone()))
            .bind(("path", input.path.clone()))
            .bind(("description", input.description.clone()))
            .bind(("uploaded_at", uploaded_at))
            .bind(("user_id", input.user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        Ok(PhotoRecord {
            id,
            customer_id,
            filename: input.filename,
            path: input.path,
            description: input.description,
            uploaded_at,
            user_id: input.user_id,
        })
    }
}
