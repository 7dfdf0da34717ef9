use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported by repository and lookup implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage layer rejected a write because the aircraft is already
    /// booked in an overlapping window.
    #[error("aircraft schedule constraint violated")]
    AircraftOverlap,
    /// Same as above, for the flight number.
    #[error("flight number schedule constraint violated")]
    FlightNumberOverlap,
    /// A unique key is already taken.
    #[error("unique constraint violated")]
    Duplicate,
    /// The row is still referenced by another table.
    #[error("row is still referenced")]
    Referenced,
    #[error("storage backend failure: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        StoreError::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A flight, a reference entity, or the role in which a flight points at
/// one. Drives `not_found` and id reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Flight,
    Airport,
    Human,
    DepartureAirport,
    ArrivalAirport,
    Pilot,
    Copilot,
    Airline,
    Aircraft,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Flight => "Flight",
            Resource::Airport => "Airport",
            Resource::Human => "Human",
            Resource::DepartureAirport => "Departure airport",
            Resource::ArrivalAirport => "Arrival airport",
            Resource::Pilot => "Pilot",
            Resource::Copilot => "Copilot",
            Resource::Airline => "Airline",
            Resource::Aircraft => "Aircraft",
        }
    }

    /// Name of the request field carrying this reference.
    pub fn field(&self) -> &'static str {
        match self {
            Resource::Flight => "id",
            Resource::Airport => "airport_id",
            Resource::Human => "human_id",
            Resource::DepartureAirport => "departure_airport_id",
            Resource::ArrivalAirport => "arrival_airport_id",
            Resource::Pilot => "pilot_id",
            Resource::Copilot => "copilot_id",
            Resource::Airline => "airline_id",
            Resource::Aircraft => "aircraft_id",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Exclusive assignment that the availability oracle guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Aircraft,
    Pilot,
    Copilot,
    FlightNumber,
}

impl Assignment {
    pub fn label(&self) -> &'static str {
        match self {
            Assignment::Aircraft => "Aircraft",
            Assignment::Pilot => "Pilot",
            Assignment::Copilot => "Copilot",
            Assignment::FlightNumber => "Flight number",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Assignment::Aircraft => "aircraft_not_available",
            Assignment::Pilot => "pilot_not_available",
            Assignment::Copilot => "copilot_not_available",
            Assignment::FlightNumber => "flight_number_not_available",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Assignment::Aircraft => "aircraft_id",
            Assignment::Pilot => "pilot_id",
            Assignment::Copilot => "copilot_id",
            Assignment::FlightNumber => "flight_number",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Assignment::Aircraft => "Aircraft is not available during this time",
            Assignment::Pilot => "Pilot is not available during this time",
            Assignment::Copilot => "Copilot is not available during this time",
            Assignment::FlightNumber => {
                "A flight with this number already exists during the specified time range"
            }
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid flight number")]
    InvalidFlightNumber {
        flight_number: String,
        reason: &'static str,
    },

    #[error("Invalid id")]
    InvalidId { resource: Resource, id: String },

    #[error("Invalid {field}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid airports")]
    SameAirports { airport_id: String },

    #[error("Invalid crew")]
    SameCrewMember { human_id: String },

    #[error("Invalid times")]
    InvalidTimes {
        departure_time: String,
        arrival_time: String,
        reason: &'static str,
    },

    #[error("Invalid flight duration")]
    InvalidDuration {
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
        min_minutes: i64,
        max_minutes: i64,
    },

    #[error("{resource} not found")]
    NotFound { resource: Resource, id: String },

    #[error("{resource} already exists")]
    AlreadyExists {
        resource: Resource,
        field: &'static str,
        value: String,
    },

    #[error("{resource} is still assigned to flights")]
    InUse { resource: Resource, id: String },

    #[error("{assignment} not available")]
    Unavailable {
        assignment: Assignment,
        key: String,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
    },

    #[error("No values to update")]
    NoUpdateData,

    #[error("Invalid pagination")]
    InvalidPagination {
        take: Option<i64>,
        skip: Option<i64>,
        max_take: i64,
    },

    #[error("Failed to {operation}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ScheduleError {
    pub fn storage(operation: &'static str, source: StoreError) -> Self {
        ScheduleError::Storage { operation, source }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::InvalidFlightNumber { .. }
            | ScheduleError::InvalidId { .. }
            | ScheduleError::InvalidField { .. }
            | ScheduleError::SameAirports { .. }
            | ScheduleError::SameCrewMember { .. }
            | ScheduleError::InvalidTimes { .. }
            | ScheduleError::InvalidDuration { .. } => "invalid_data",
            ScheduleError::NotFound { .. } => "not_found",
            ScheduleError::AlreadyExists { resource, .. } => match resource {
                Resource::Airport => "airport_exists",
                Resource::Airline => "airline_exists",
                Resource::Aircraft => "aircraft_exists",
                Resource::Human => "human_exists",
                _ => "already_exists",
            },
            ScheduleError::InUse { .. } => "reference_in_use",
            ScheduleError::Unavailable { assignment, .. } => assignment.code(),
            ScheduleError::NoUpdateData => "no_update_data",
            ScheduleError::InvalidPagination { .. } => "invalid_pagination",
            ScheduleError::Storage { .. } => "db_error",
        }
    }

    /// HTTP-style status class.
    pub fn status(&self) -> u16 {
        match self {
            ScheduleError::NotFound { .. } => 404,
            ScheduleError::Storage { .. } => 500,
            _ => 400,
        }
    }

    /// Structured payload echoing the offending values. Storage failures
    /// carry no detail.
    pub fn details(&self) -> Option<Value> {
        let details = match self {
            ScheduleError::InvalidFlightNumber {
                flight_number,
                reason,
            } => json!({
                "flight_number": flight_number,
                "description": reason,
            }),
            ScheduleError::InvalidId { resource, id } => json!({
                resource.field(): id,
                "description": format!("{} id must be a valid UUID", resource.label()),
            }),
            ScheduleError::InvalidField {
                field,
                value,
                reason,
            } => json!({
                *field: value,
                "description": reason,
            }),
            ScheduleError::SameAirports { airport_id } => json!({
                "departure_airport_id": airport_id,
                "arrival_airport_id": airport_id,
                "description": "Departure and arrival airports must be different",
            }),
            ScheduleError::SameCrewMember { human_id } => json!({
                "pilot_id": human_id,
                "copilot_id": human_id,
                "description": "Pilot and copilot must be different people",
            }),
            ScheduleError::InvalidTimes {
                departure_time,
                arrival_time,
                reason,
            } => json!({
                "departure_time": departure_time,
                "arrival_time": arrival_time,
                "description": reason,
            }),
            ScheduleError::InvalidDuration {
                departure_time,
                arrival_time,
                min_minutes,
                max_minutes,
            } => json!({
                "departure_time": iso(departure_time),
                "arrival_time": iso(arrival_time),
                "description": format!(
                    "Flight duration must be between {} and {} minutes",
                    min_minutes, max_minutes
                ),
            }),
            ScheduleError::NotFound { resource, id } => json!({
                resource.field(): id,
                "description": format!("{} not found", resource.label()),
            }),
            ScheduleError::AlreadyExists {
                resource,
                field,
                value,
            } => json!({
                *field: value,
                "description": format!("{} with the same {} already exists", resource.label(), field),
            }),
            ScheduleError::InUse { resource, id } => json!({
                resource.field(): id,
                "description": format!("{} is referenced by at least one flight", resource.label()),
            }),
            ScheduleError::Unavailable {
                assignment,
                key,
                departure_time,
                arrival_time,
            } => json!({
                assignment.field(): key,
                "departure_time": iso(departure_time),
                "arrival_time": iso(arrival_time),
                "description": assignment.description(),
            }),
            ScheduleError::InvalidPagination {
                take,
                skip,
                max_take,
            } => json!({
                "take": take,
                "skip": skip,
                "description": format!("take must be within 0..={} and skip must not be negative", max_take),
            }),
            ScheduleError::NoUpdateData | ScheduleError::Storage { .. } => return None,
        };
        Some(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_codes_and_statuses() {
        let not_found = ScheduleError::NotFound {
            resource: Resource::Airline,
            id: "xx".to_string(),
        };
        assert_eq!(not_found.code(), "not_found");
        assert_eq!(not_found.status(), 404);
        assert_eq!(not_found.to_string(), "Airline not found");

        let busy = ScheduleError::Unavailable {
            assignment: Assignment::Copilot,
            key: "h-2".to_string(),
            departure_time: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        };
        assert_eq!(busy.code(), "copilot_not_available");
        assert_eq!(busy.status(), 400);
        assert_eq!(busy.to_string(), "Copilot not available");

        let details = busy.details().unwrap();
        assert_eq!(details["copilot_id"], "h-2");
        assert_eq!(details["departure_time"], "2024-01-01T08:00:00.000Z");
    }

    #[test]
    fn test_storage_error_is_opaque() {
        let err = ScheduleError::storage("add flight", StoreError::backend("connection reset"));
        assert_eq!(err.code(), "db_error");
        assert_eq!(err.status(), 500);
        assert_eq!(err.to_string(), "Failed to add flight");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_reference_entity_errors() {
        let taken = ScheduleError::AlreadyExists {
            resource: Resource::Airport,
            field: "icao",
            value: "EDDF".to_string(),
        };
        assert_eq!(taken.code(), "airport_exists");
        assert_eq!(taken.status(), 400);
        assert_eq!(taken.details().unwrap()["icao"], "EDDF");

        let in_use = ScheduleError::InUse {
            resource: Resource::Human,
            id: "h-1".to_string(),
        };
        assert_eq!(in_use.code(), "reference_in_use");
        assert_eq!(in_use.details().unwrap()["human_id"], "h-1");

        let bad_id = ScheduleError::InvalidId {
            resource: Resource::Flight,
            id: "nope".to_string(),
        };
        assert_eq!(bad_id.code(), "invalid_data");
        assert_eq!(bad_id.details().unwrap()["id"], "nope");
    }
}
