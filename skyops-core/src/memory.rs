use async_trait::async_trait;
use skyops_shared::{Flight, FlightPatch};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::reference::{ReferenceRecord, ReferenceRepository};
use crate::repository::{EntityLookup, FlightFilter, FlightRepository};

/// In-memory flight table (local runs and tests). Enforces no constraints
/// of its own; the scheduler is the only guard.
#[derive(Default)]
pub struct InMemoryFlightRepository {
    flights: RwLock<HashMap<String, Flight>>,
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows directly, bypassing validation.
    pub fn with_flights(flights: impl IntoIterator<Item = Flight>) -> Self {
        let flights = flights.into_iter().map(|f| (f.id.clone(), f)).collect();
        Self {
            flights: RwLock::new(flights),
        }
    }

    pub async fn len(&self) -> usize {
        self.flights.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.flights.read().await.is_empty()
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Flight>> {
        Ok(self.flights.read().await.get(id).cloned())
    }

    async fn find_many(&self, filter: &FlightFilter) -> StoreResult<Vec<Flight>> {
        let flights = self.flights.read().await;
        let mut matching: Vec<Flight> = flights
            .values()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.departure_time
                .cmp(&b.departure_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let page = matching.into_iter().skip(offset);
        Ok(match filter.limit {
            Some(limit) => page.take(limit.max(0) as usize).collect(),
            None => page.collect(),
        })
    }

    async fn insert(&self, flight: &Flight) -> StoreResult<Flight> {
        self.flights
            .write()
            .await
            .insert(flight.id.clone(), flight.clone());
        Ok(flight.clone())
    }

    async fn update(&self, id: &str, patch: &FlightPatch) -> StoreResult<Option<Flight>> {
        let mut flights = self.flights.write().await;
        Ok(flights.get_mut(id).map(|flight| {
            flight.apply(patch);
            flight.clone()
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<Flight>> {
        Ok(self.flights.write().await.remove(id))
    }
}

/// In-memory set of known reference ids.
#[derive(Default)]
pub struct InMemoryLookup {
    ids: RwLock<HashSet<String>>,
}

impl InMemoryLookup {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl EntityLookup for InMemoryLookup {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.ids.read().await.contains(id))
    }
}

/// In-memory table for one reference kind, kept in insertion order.
pub struct InMemoryReferenceRepository<R> {
    records: RwLock<Vec<R>>,
}

impl<R> Default for InMemoryReferenceRepository<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<R: ReferenceRecord> InMemoryReferenceRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<R: ReferenceRecord> ReferenceRepository<R> for InMemoryReferenceRepository<R> {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<R>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn find_by_key(&self, column: &str, value: &str) -> StoreResult<Option<R>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| {
                r.unique_keys()
                    .iter()
                    .any(|(c, v)| *c == column && v == value)
            })
            .cloned())
    }

    async fn find_many(&self, limit: i64, offset: i64) -> StoreResult<Vec<R>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert(&self, record: &R) -> StoreResult<R> {
        self.records.write().await.push(record.clone());
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<R>> {
        let mut records = self.records.write().await;
        Ok(records
            .iter()
            .position(|r| r.id() == id)
            .map(|index| records.remove(index)))
    }
}

#[async_trait]
impl<R: ReferenceRecord> EntityLookup for InMemoryReferenceRepository<R> {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.records.read().await.iter().any(|r| r.id() == id))
    }
}
