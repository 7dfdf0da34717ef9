//! Airports, airlines, aircraft and crew: the entities flights point into.
//!
//! Each kind is a [`ReferenceRecord`]; one generic [`ReferenceService`]
//! validates, stores, lists and removes all four.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skyops_shared::{Aircraft, Airline, Airport, Human};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{Resource, ScheduleError, StoreError, StoreResult};
use crate::gate::WriteGate;
use crate::ids::{is_valid_uuid, IdGenerator};
use crate::repository::{FlightFilter, FlightRepository};
use crate::rules::SchedulingRules;
use crate::schedule::input::PageQuery;
use crate::schedule::orchestrator::FlightScheduler;
use crate::schedule::validate::validate_pagination;
use crate::ScheduleResult;

const MAX_TEXT_LEN: usize = 255;

/// A reference entity kind: its create payload, its validation and the
/// columns that must stay unique.
pub trait ReferenceRecord: Clone + Serialize + Send + Sync + 'static {
    type Draft: DeserializeOwned + Send + Sync;

    const RESOURCE: Resource;

    fn id(&self) -> &str;

    /// Validates and normalizes a create payload under the given id.
    fn from_draft(id: String, draft: Self::Draft) -> ScheduleResult<Self>;

    /// `(column, value)` pairs that no other record may share.
    fn unique_keys(&self) -> Vec<(&'static str, String)>;

    /// Flights that would dangle if the record with `id` were removed.
    fn referencing_flights(id: &str) -> FlightFilter;
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirport {
    pub icao: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirline {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAircraft {
    pub registration: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHuman {
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
}

fn invalid(field: &'static str, value: &str, reason: &'static str) -> ScheduleError {
    ScheduleError::InvalidField {
        field,
        value: value.to_string(),
        reason,
    }
}

/// Trimmed, non-empty, at most 255 characters.
pub fn required_text(field: &'static str, raw: &str) -> ScheduleResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid(field, raw, "Value must not be empty"));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(invalid(field, raw, "Value must be at most 255 characters"));
    }
    Ok(value.to_string())
}

/// Four ASCII letters or digits, uppercased.
pub fn normalize_icao(raw: &str) -> ScheduleResult<String> {
    let icao = raw.trim().to_ascii_uppercase();
    if icao.len() != 4 || !icao.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("icao", raw, "ICAO code must be exactly 4 letters or digits"));
    }
    Ok(icao)
}

pub fn normalize_birthdate(raw: &str) -> ScheduleResult<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| invalid("birthdate", raw, "Birthdate must be a date in YYYY-MM-DD format"))
}

impl ReferenceRecord for Airport {
    type Draft = NewAirport;

    const RESOURCE: Resource = Resource::Airport;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: NewAirport) -> ScheduleResult<Self> {
        Ok(Airport {
            id,
            icao: normalize_icao(&draft.icao)?,
            name: required_text("name", &draft.name)?,
            country: required_text("country", &draft.country)?,
        })
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("icao", self.icao.clone())]
    }

    fn referencing_flights(id: &str) -> FlightFilter {
        FlightFilter {
            airport_id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

impl ReferenceRecord for Airline {
    type Draft = NewAirline;

    const RESOURCE: Resource = Resource::Airline;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: NewAirline) -> ScheduleResult<Self> {
        Ok(Airline {
            id,
            name: required_text("name", &draft.name)?,
        })
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }

    fn referencing_flights(id: &str) -> FlightFilter {
        FlightFilter {
            airline_id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

impl ReferenceRecord for Aircraft {
    type Draft = NewAircraft;

    const RESOURCE: Resource = Resource::Aircraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: NewAircraft) -> ScheduleResult<Self> {
        Ok(Aircraft {
            id,
            registration: required_text("registration", &draft.registration)?.to_uppercase(),
            model: required_text("model", &draft.model)?,
        })
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("registration", self.registration.clone())]
    }

    fn referencing_flights(id: &str) -> FlightFilter {
        FlightFilter::by_aircraft(id)
    }
}

impl ReferenceRecord for Human {
    type Draft = NewHuman;

    const RESOURCE: Resource = Resource::Human;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: NewHuman) -> ScheduleResult<Self> {
        Ok(Human {
            id,
            first_name: required_text("first_name", &draft.first_name)?,
            last_name: required_text("last_name", &draft.last_name)?,
            birthdate: normalize_birthdate(&draft.birthdate)?,
        })
    }

    // Namesakes are allowed.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn referencing_flights(id: &str) -> FlightFilter {
        FlightFilter::by_crew_member(id)
    }
}

/// Storage for one reference kind. Listings come back in insertion order.
#[async_trait]
pub trait ReferenceRepository<R: ReferenceRecord>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<R>>;

    /// Looks a record up by one of its `unique_keys` columns.
    async fn find_by_key(&self, column: &str, value: &str) -> StoreResult<Option<R>>;

    async fn find_many(&self, limit: i64, offset: i64) -> StoreResult<Vec<R>>;

    async fn insert(&self, record: &R) -> StoreResult<R>;

    async fn delete(&self, id: &str) -> StoreResult<Option<R>>;
}

/// Add, get, list and delete for one reference kind.
///
/// Writes hold the scheduler's write gate, so a record cannot be removed
/// while a flight mutation is checking it.
pub struct ReferenceService<R: ReferenceRecord> {
    records: Arc<dyn ReferenceRepository<R>>,
    flights: Arc<dyn FlightRepository>,
    ids: Arc<dyn IdGenerator>,
    rules: SchedulingRules,
    write_gate: WriteGate,
}

impl<R: ReferenceRecord> ReferenceService<R> {
    pub fn new(
        records: Arc<dyn ReferenceRepository<R>>,
        flights: Arc<dyn FlightRepository>,
        ids: Arc<dyn IdGenerator>,
        rules: SchedulingRules,
        write_gate: WriteGate,
    ) -> Self {
        Self {
            records,
            flights,
            ids,
            rules,
            write_gate,
        }
    }

    /// Shares the scheduler's flight table, id source, rules and write gate.
    pub fn attached_to(records: Arc<dyn ReferenceRepository<R>>, scheduler: &FlightScheduler) -> Self {
        Self::new(
            records,
            scheduler.flight_repository(),
            scheduler.id_generator(),
            scheduler.rules().clone(),
            scheduler.write_gate(),
        )
    }

    pub async fn add(&self, draft: R::Draft) -> ScheduleResult<R> {
        let record = R::from_draft(self.ids.generate(), draft)?;

        let _gate = self.write_gate.lock().await;
        for (column, value) in record.unique_keys() {
            let taken = self
                .records
                .find_by_key(column, &value)
                .await
                .map_err(|e| self.storage_failure("add", e))?;
            if taken.is_some() {
                return Err(already_exists::<R>(column, value));
            }
        }

        let created = self.records.insert(&record).await.map_err(|e| match e {
            StoreError::Duplicate => match record.unique_keys().into_iter().next() {
                Some((column, value)) => already_exists::<R>(column, value),
                None => self.storage_failure("add", StoreError::Duplicate),
            },
            other => self.storage_failure("add", other),
        })?;

        info!("Added {} {}", R::RESOURCE, created.id());
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> ScheduleResult<R> {
        validate_id::<R>(id)?;
        self.load(id, "get").await
    }

    pub async fn list(&self, query: PageQuery) -> ScheduleResult<Vec<R>> {
        let (limit, offset) = validate_pagination(query.take, query.skip, &self.rules)?;
        self.records
            .find_many(limit, offset)
            .await
            .map_err(|e| self.storage_failure("list", e))
    }

    /// Refuses while any flight still references the record.
    pub async fn delete(&self, id: &str) -> ScheduleResult<R> {
        validate_id::<R>(id)?;

        let _gate = self.write_gate.lock().await;
        self.load(id, "delete").await?;

        let mut filter = R::referencing_flights(id);
        filter.limit = Some(1);
        let referencing = self
            .flights
            .find_many(&filter)
            .await
            .map_err(|e| self.storage_failure("delete", e))?;
        if !referencing.is_empty() {
            warn!("Refused to delete {} {}: assigned to flights", R::RESOURCE, id);
            return Err(in_use::<R>(id));
        }

        let deleted = self
            .records
            .delete(id)
            .await
            .map_err(|e| match e {
                StoreError::Referenced => in_use::<R>(id),
                other => self.storage_failure("delete", other),
            })?
            .ok_or_else(|| not_found::<R>(id))?;

        info!("Deleted {} {}", R::RESOURCE, deleted.id());
        Ok(deleted)
    }

    async fn load(&self, id: &str, operation: &'static str) -> ScheduleResult<R> {
        self.records
            .find_by_id(id)
            .await
            .map_err(|e| self.storage_failure(operation, e))?
            .ok_or_else(|| not_found::<R>(id))
    }

    fn storage_failure(&self, operation: &'static str, err: StoreError) -> ScheduleError {
        error!("Failed to {} {}: {}", operation, R::RESOURCE, err);
        ScheduleError::storage(operation, err)
    }
}

fn validate_id<R: ReferenceRecord>(id: &str) -> ScheduleResult<()> {
    if !is_valid_uuid(id) {
        return Err(ScheduleError::InvalidId {
            resource: R::RESOURCE,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn not_found<R: ReferenceRecord>(id: &str) -> ScheduleError {
    ScheduleError::NotFound {
        resource: R::RESOURCE,
        id: id.to_string(),
    }
}

fn in_use<R: ReferenceRecord>(id: &str) -> ScheduleError {
    ScheduleError::InUse {
        resource: R::RESOURCE,
        id: id.to_string(),
    }
}

fn already_exists<R: ReferenceRecord>(field: &'static str, value: String) -> ScheduleError {
    ScheduleError::AlreadyExists {
        resource: R::RESOURCE,
        field,
        value,
    }
}
