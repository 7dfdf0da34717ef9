use serde::Deserialize;
use skyops_shared::FlightStatus;

use crate::repository::FlightFilter;

/// Raw create request. Timestamps stay strings until the validator parses
/// them so that malformed values surface as `invalid_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub flight_number: String,
    pub departure_airport_id: String,
    pub arrival_airport_id: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub pilot_id: String,
    pub copilot_id: String,
    pub airline_id: String,
    #[serde(default = "default_status")]
    pub status: FlightStatus,
    pub aircraft_id: String,
}

fn default_status() -> FlightStatus {
    FlightStatus::Scheduled
}

/// Raw update request; every omitted field keeps its stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightUpdate {
    pub flight_number: Option<String>,
    pub departure_airport_id: Option<String>,
    pub arrival_airport_id: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub pilot_id: Option<String>,
    pub copilot_id: Option<String>,
    pub airline_id: Option<String>,
    pub status: Option<FlightStatus>,
    pub aircraft_id: Option<String>,
}

impl FlightUpdate {
    pub fn is_empty(&self) -> bool {
        self.flight_number.is_none()
            && self.departure_airport_id.is_none()
            && self.arrival_airport_id.is_none()
            && self.departure_time.is_none()
            && self.arrival_time.is_none()
            && self.pilot_id.is_none()
            && self.copilot_id.is_none()
            && self.airline_id.is_none()
            && self.status.is_none()
            && self.aircraft_id.is_none()
    }
}

/// Listing parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightQuery {
    pub flight_number: Option<String>,
    pub status: Option<FlightStatus>,
    pub departure_airport_id: Option<String>,
    pub arrival_airport_id: Option<String>,
    pub pilot_id: Option<String>,
    pub copilot_id: Option<String>,
    pub airline_id: Option<String>,
    pub aircraft_id: Option<String>,
    pub take: Option<i64>,
    pub skip: Option<i64>,
}

impl FlightQuery {
    /// Equality part of the query; pagination is applied by the caller
    /// after validation.
    pub fn to_filter(&self) -> FlightFilter {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        FlightFilter {
            flight_number: clean(&self.flight_number).map(|n| n.to_uppercase()),
            status: self.status,
            departure_airport_id: clean(&self.departure_airport_id),
            arrival_airport_id: clean(&self.arrival_airport_id),
            pilot_id: clean(&self.pilot_id),
            copilot_id: clean(&self.copilot_id),
            airline_id: clean(&self.airline_id),
            aircraft_id: clean(&self.aircraft_id),
            ..Default::default()
        }
    }
}

/// Bare `take`/`skip` listing parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub take: Option<i64>,
    pub skip: Option<i64>,
}
