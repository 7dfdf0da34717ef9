use chrono::{DateTime, SecondsFormat, Utc};
use skyops_shared::{Flight, FlightPatch};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::availability::AvailabilityOracle;
use super::input::{FlightQuery, FlightUpdate, NewFlight};
use super::validate::{
    normalize_flight_number, parse_times, validate_distinct_airports,
    validate_distinct_crew, validate_flight_id, validate_pagination, validate_window,
    ReferenceCatalog,
};
use crate::error::{Assignment, Resource, ScheduleError, StoreError};
use crate::ids::IdGenerator;
use crate::repository::FlightRepository;
use crate::rules::SchedulingRules;
use crate::gate::WriteGate;
use crate::ScheduleResult;

/// Entry point for every flight mutation.
///
/// Validation and availability checks run before any write; a call either
/// performs exactly one write or returns an error and leaves storage
/// untouched. Every mutation holds `write_gate` from the first read of the
/// records it depends on until its write completes, so within one process
/// no two mutations interleave. The gate is shared with the reference
/// entity services so a referenced airport or crew member cannot be removed
/// mid-check. Across processes only the storage constraints apply.
pub struct FlightScheduler {
    flights: Arc<dyn FlightRepository>,
    catalog: ReferenceCatalog,
    oracle: AvailabilityOracle,
    ids: Arc<dyn IdGenerator>,
    rules: SchedulingRules,
    write_gate: WriteGate,
}

impl FlightScheduler {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        catalog: ReferenceCatalog,
        ids: Arc<dyn IdGenerator>,
        rules: SchedulingRules,
    ) -> Self {
        Self {
            oracle: AvailabilityOracle::new(flights.clone()),
            flights,
            catalog,
            ids,
            rules,
            write_gate: WriteGate::default(),
        }
    }

    pub fn rules(&self) -> &SchedulingRules {
        &self.rules
    }

    /// Handle on the gate serialising mutations, for services that must not
    /// interleave with flight writes.
    pub fn write_gate(&self) -> WriteGate {
        self.write_gate.clone()
    }

    pub(crate) fn flight_repository(&self) -> Arc<dyn FlightRepository> {
        self.flights.clone()
    }

    pub(crate) fn id_generator(&self) -> Arc<dyn IdGenerator> {
        self.ids.clone()
    }

    pub async fn get_flight(&self, id: &str) -> ScheduleResult<Flight> {
        validate_flight_id(id)?;
        self.load(id, "get flight").await
    }

    pub async fn list_flights(&self, query: FlightQuery) -> ScheduleResult<Vec<Flight>> {
        let (limit, offset) = validate_pagination(query.take, query.skip, &self.rules)?;
        let mut filter = query.to_filter();
        filter.limit = Some(limit);
        filter.offset = Some(offset);

        self.flights.find_many(&filter).await.map_err(|e| {
            error!("Failed to list flights: {}", e);
            ScheduleError::storage("get flights", e)
        })
    }

    /// Validates a complete flight, checks resource availability and inserts
    /// it under a fresh id.
    pub async fn add_flight(&self, input: NewFlight) -> ScheduleResult<Flight> {
        let flight_number = normalize_flight_number(&input.flight_number)?;

        let _gate = self.write_gate.lock().await;
        self.catalog
            .require(Resource::DepartureAirport, &input.departure_airport_id)
            .await?;
        self.catalog
            .require(Resource::ArrivalAirport, &input.arrival_airport_id)
            .await?;
        validate_distinct_airports(&input.departure_airport_id, &input.arrival_airport_id)?;

        self.catalog.require(Resource::Pilot, &input.pilot_id).await?;
        self.catalog.require(Resource::Copilot, &input.copilot_id).await?;
        validate_distinct_crew(&input.pilot_id, &input.copilot_id)?;

        self.catalog.require(Resource::Airline, &input.airline_id).await?;
        self.catalog.require(Resource::Aircraft, &input.aircraft_id).await?;

        let (departure_time, arrival_time) = parse_times(&input.departure_time, &input.arrival_time)?;
        validate_window(departure_time, arrival_time, &self.rules)?;

        let flight = Flight {
            id: self.ids.generate(),
            flight_number,
            departure_airport_id: input.departure_airport_id,
            arrival_airport_id: input.arrival_airport_id,
            departure_time,
            arrival_time,
            pilot_id: input.pilot_id,
            copilot_id: input.copilot_id,
            airline_id: input.airline_id,
            status: input.status,
            aircraft_id: input.aircraft_id,
        };

        self.ensure_available(&flight, None).await?;

        let created = self
            .flights
            .insert(&flight)
            .await
            .map_err(|e| write_failure("add flight", &flight, e))?;

        info!(
            "Scheduled flight {} ({}) {} -> {}",
            created.flight_number, created.id, created.departure_time, created.arrival_time
        );
        Ok(created)
    }

    /// Applies a sparse update. Provided fields get the same checks as on
    /// create; cross-field rules and availability are evaluated on the
    /// merged record with the flight itself excluded from conflict scans.
    pub async fn update_flight(&self, id: &str, input: FlightUpdate) -> ScheduleResult<Flight> {
        validate_flight_id(id)?;

        let _gate = self.write_gate.lock().await;
        let existing = self.load(id, "update flight").await?;

        if input.is_empty() {
            return Err(ScheduleError::NoUpdateData);
        }

        let patch = self.build_patch(&existing, &input).await?;
        let merged = existing.merged(&patch);

        self.ensure_available(&merged, Some(&existing.id)).await?;

        let updated = self
            .flights
            .update(id, &patch)
            .await
            .map_err(|e| write_failure("update flight", &merged, e))?
            .ok_or_else(|| ScheduleError::NotFound {
                resource: Resource::Flight,
                id: id.to_string(),
            })?;

        info!(
            "Updated flight {} ({}): {}",
            updated.flight_number,
            updated.id,
            patch.changed_fields().join(", ")
        );
        Ok(updated)
    }

    /// Removing a flight only relaxes constraints, so only existence is
    /// checked.
    pub async fn delete_flight(&self, id: &str) -> ScheduleResult<Flight> {
        validate_flight_id(id)?;

        let _gate = self.write_gate.lock().await;
        self.load(id, "delete flight").await?;

        let deleted = self
            .flights
            .delete(id)
            .await
            .map_err(|e| {
                error!("Failed to delete flight {}: {}", id, e);
                ScheduleError::storage("delete flight", e)
            })?
            .ok_or_else(|| ScheduleError::NotFound {
                resource: Resource::Flight,
                id: id.to_string(),
            })?;

        info!("Deleted flight {} ({})", deleted.flight_number, deleted.id);
        Ok(deleted)
    }

    async fn load(&self, id: &str, operation: &'static str) -> ScheduleResult<Flight> {
        self.flights
            .find_by_id(id)
            .await
            .map_err(|e| {
                error!("Failed to load flight {}: {}", id, e);
                ScheduleError::storage(operation, e)
            })?
            .ok_or_else(|| ScheduleError::NotFound {
                resource: Resource::Flight,
                id: id.to_string(),
            })
    }

    async fn build_patch(&self, existing: &Flight, input: &FlightUpdate) -> ScheduleResult<FlightPatch> {
        let mut patch = FlightPatch {
            status: input.status,
            ..Default::default()
        };

        if let Some(raw) = &input.flight_number {
            patch.flight_number = Some(normalize_flight_number(raw)?);
        }

        if let Some(airport) = &input.departure_airport_id {
            self.catalog.require(Resource::DepartureAirport, airport).await?;
            patch.departure_airport_id = Some(airport.clone());
        }
        if let Some(airport) = &input.arrival_airport_id {
            self.catalog.require(Resource::ArrivalAirport, airport).await?;
            patch.arrival_airport_id = Some(airport.clone());
        }
        validate_distinct_airports(
            patch.departure_airport_id.as_deref().unwrap_or(&existing.departure_airport_id),
            patch.arrival_airport_id.as_deref().unwrap_or(&existing.arrival_airport_id),
        )?;

        if let Some(pilot) = &input.pilot_id {
            self.catalog.require(Resource::Pilot, pilot).await?;
            patch.pilot_id = Some(pilot.clone());
        }
        if let Some(copilot) = &input.copilot_id {
            self.catalog.require(Resource::Copilot, copilot).await?;
            patch.copilot_id = Some(copilot.clone());
        }
        validate_distinct_crew(
            patch.pilot_id.as_deref().unwrap_or(&existing.pilot_id),
            patch.copilot_id.as_deref().unwrap_or(&existing.copilot_id),
        )?;

        if let Some(airline) = &input.airline_id {
            self.catalog.require(Resource::Airline, airline).await?;
            patch.airline_id = Some(airline.clone());
        }
        if let Some(aircraft) = &input.aircraft_id {
            self.catalog.require(Resource::Aircraft, aircraft).await?;
            patch.aircraft_id = Some(aircraft.clone());
        }

        if input.departure_time.is_some() || input.arrival_time.is_some() {
            let departure_raw = raw_or_stored(&input.departure_time, &existing.departure_time);
            let arrival_raw = raw_or_stored(&input.arrival_time, &existing.arrival_time);
            let (departure, arrival) = parse_times(&departure_raw, &arrival_raw)?;

            patch.departure_time = input.departure_time.as_ref().and(Some(departure));
            patch.arrival_time = input.arrival_time.as_ref().and(Some(arrival));
        }
        validate_window(
            patch.departure_time.unwrap_or(existing.departure_time),
            patch.arrival_time.unwrap_or(existing.arrival_time),
            &self.rules,
        )?;

        Ok(patch)
    }

    async fn ensure_available(&self, proposed: &Flight, exclude: Option<&str>) -> ScheduleResult<()> {
        let availability = self.oracle.assess(proposed, exclude).await.map_err(|e| {
            error!("Availability check failed for flight {}: {}", proposed.flight_number, e);
            ScheduleError::storage("check availability", e)
        })?;

        match availability.first_violation() {
            Some(assignment) => {
                let err = unavailable(assignment, proposed);
                warn!(
                    "Rejected flight {}: {} (departure {}, arrival {})",
                    proposed.flight_number, err, proposed.departure_time, proposed.arrival_time
                );
                Err(err)
            }
            None => Ok(()),
        }
    }
}

fn raw_or_stored(raw: &Option<String>, stored: &DateTime<Utc>) -> String {
    match raw {
        Some(value) => value.clone(),
        None => stored.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn unavailable(assignment: Assignment, flight: &Flight) -> ScheduleError {
    let key = match assignment {
        Assignment::Aircraft => &flight.aircraft_id,
        Assignment::Pilot => &flight.pilot_id,
        Assignment::Copilot => &flight.copilot_id,
        Assignment::FlightNumber => &flight.flight_number,
    };
    ScheduleError::Unavailable {
        assignment,
        key: key.clone(),
        departure_time: flight.departure_time,
        arrival_time: flight.arrival_time,
    }
}

/// Constraint rejections from storage map back onto the oracle's errors;
/// anything else is logged and reported opaquely.
fn write_failure(operation: &'static str, flight: &Flight, err: StoreError) -> ScheduleError {
    match err {
        StoreError::AircraftOverlap => {
            warn!("Storage rejected overlapping aircraft {}", flight.aircraft_id);
            unavailable(Assignment::Aircraft, flight)
        }
        StoreError::FlightNumberOverlap => {
            warn!("Storage rejected overlapping flight number {}", flight.flight_number);
            unavailable(Assignment::FlightNumber, flight)
        }
        other => {
            error!("Failed to {} {}: {}", operation, flight.flight_number, other);
            ScheduleError::storage(operation, other)
        }
    }
}
