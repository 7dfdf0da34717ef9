use async_trait::async_trait;
use skyops_shared::{Flight, FlightPatch, FlightStatus};

use crate::error::StoreResult;

/// Equality filters over the flight table.
///
/// `crew_member_id` matches a human in either the pilot or the copilot seat,
/// `airport_id` an airport at either end.
/// `limit`/`offset` of `None` mean "all rows".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightFilter {
    pub flight_number: Option<String>,
    pub status: Option<FlightStatus>,
    pub departure_airport_id: Option<String>,
    pub arrival_airport_id: Option<String>,
    pub pilot_id: Option<String>,
    pub copilot_id: Option<String>,
    pub crew_member_id: Option<String>,
    pub airport_id: Option<String>,
    pub airline_id: Option<String>,
    pub aircraft_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FlightFilter {
    pub fn by_aircraft(aircraft_id: &str) -> Self {
        Self {
            aircraft_id: Some(aircraft_id.to_string()),
            ..Default::default()
        }
    }

    pub fn by_crew_member(human_id: &str) -> Self {
        Self {
            crew_member_id: Some(human_id.to_string()),
            ..Default::default()
        }
    }

    pub fn by_flight_number(flight_number: &str) -> Self {
        Self {
            flight_number: Some(flight_number.to_string()),
            ..Default::default()
        }
    }

    /// Evaluates the equality part of the filter (pagination excluded).
    pub fn matches(&self, flight: &Flight) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }

        eq(&self.flight_number, &flight.flight_number)
            && self.status.map_or(true, |s| s == flight.status)
            && eq(&self.departure_airport_id, &flight.departure_airport_id)
            && eq(&self.arrival_airport_id, &flight.arrival_airport_id)
            && eq(&self.pilot_id, &flight.pilot_id)
            && eq(&self.copilot_id, &flight.copilot_id)
            && self
                .crew_member_id
                .as_deref()
                .map_or(true, |h| flight.has_crew_member(h))
            && self.airport_id.as_deref().map_or(true, |a| {
                flight.departure_airport_id == a || flight.arrival_airport_id == a
            })
            && eq(&self.airline_id, &flight.airline_id)
            && eq(&self.aircraft_id, &flight.aircraft_id)
    }
}

/// Repository trait for flight data access.
///
/// Listings are ordered by departure time, then id.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Flight>>;

    async fn find_many(&self, filter: &FlightFilter) -> StoreResult<Vec<Flight>>;

    async fn insert(&self, flight: &Flight) -> StoreResult<Flight>;

    /// Writes only the columns present in `patch`. Returns `None` if the
    /// flight no longer exists.
    async fn update(&self, id: &str, patch: &FlightPatch) -> StoreResult<Option<Flight>>;

    async fn delete(&self, id: &str) -> StoreResult<Option<Flight>>;
}

/// Existence check for a reference entity (airport, human, airline, aircraft).
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn exists(&self, id: &str) -> StoreResult<bool>;
}
