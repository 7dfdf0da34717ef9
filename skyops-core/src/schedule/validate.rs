use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

use crate::error::{Resource, ScheduleError};
use crate::ids::is_valid_uuid;
use crate::repository::EntityLookup;
use crate::rules::SchedulingRules;
use crate::ScheduleResult;

/// Trims, uppercases and checks a flight number: 4 to 6 characters, the
/// first two being the (non-numeric) airline designator.
pub fn normalize_flight_number(raw: &str) -> ScheduleResult<String> {
    let flight_number = raw.trim().to_uppercase();
    let len = flight_number.chars().count();

    if !(4..=6).contains(&len) {
        return Err(ScheduleError::InvalidFlightNumber {
            flight_number,
            reason: "Flight number must be between 4 and 6 characters",
        });
    }

    if flight_number.chars().take(2).any(|c| c.is_ascii_digit()) {
        return Err(ScheduleError::InvalidFlightNumber {
            flight_number,
            reason: "Flight number must start with two letters",
        });
    }

    Ok(flight_number)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Parses both timestamps; either one failing rejects the pair.
pub fn parse_times(
    departure_raw: &str,
    arrival_raw: &str,
) -> ScheduleResult<(DateTime<Utc>, DateTime<Utc>)> {
    match (parse_timestamp(departure_raw), parse_timestamp(arrival_raw)) {
        (Some(departure), Some(arrival)) => Ok((departure, arrival)),
        _ => Err(ScheduleError::InvalidTimes {
            departure_time: departure_raw.to_string(),
            arrival_time: arrival_raw.to_string(),
            reason: "Departure time and arrival time must be valid dates",
        }),
    }
}

/// Departure strictly before arrival, duration within the configured bounds
/// (both bounds inclusive).
pub fn validate_window(
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    rules: &SchedulingRules,
) -> ScheduleResult<()> {
    if departure >= arrival {
        return Err(ScheduleError::InvalidTimes {
            departure_time: departure.to_rfc3339_opts(SecondsFormat::Millis, true),
            arrival_time: arrival.to_rfc3339_opts(SecondsFormat::Millis, true),
            reason: "Departure time must be before arrival time",
        });
    }

    let duration = arrival - departure;
    if duration < rules.min_duration() || duration > rules.max_duration() {
        return Err(ScheduleError::InvalidDuration {
            departure_time: departure,
            arrival_time: arrival,
            min_minutes: rules.min_flight_minutes,
            max_minutes: rules.max_flight_minutes,
        });
    }

    Ok(())
}

pub fn validate_distinct_airports(departure_id: &str, arrival_id: &str) -> ScheduleResult<()> {
    if departure_id == arrival_id {
        return Err(ScheduleError::SameAirports {
            airport_id: departure_id.to_string(),
        });
    }
    Ok(())
}

pub fn validate_distinct_crew(pilot_id: &str, copilot_id: &str) -> ScheduleResult<()> {
    if pilot_id == copilot_id {
        return Err(ScheduleError::SameCrewMember {
            human_id: pilot_id.to_string(),
        });
    }
    Ok(())
}

pub fn validate_flight_id(id: &str) -> ScheduleResult<()> {
    if !is_valid_uuid(id) {
        return Err(ScheduleError::InvalidId {
            resource: Resource::Flight,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Turns `take`/`skip` into a `(limit, offset)` pair.
pub fn validate_pagination(
    take: Option<i64>,
    skip: Option<i64>,
    rules: &SchedulingRules,
) -> ScheduleResult<(i64, i64)> {
    let limit = take.unwrap_or(rules.default_page_size);
    let offset = skip.unwrap_or(0);

    if !(0..=rules.max_page_size).contains(&limit) || offset < 0 {
        return Err(ScheduleError::InvalidPagination {
            take,
            skip,
            max_take: rules.max_page_size,
        });
    }

    Ok((limit, offset))
}

/// Existence lookups for everything a flight references.
#[derive(Clone)]
pub struct ReferenceCatalog {
    pub airports: Arc<dyn EntityLookup>,
    pub humans: Arc<dyn EntityLookup>,
    pub airlines: Arc<dyn EntityLookup>,
    pub aircraft: Arc<dyn EntityLookup>,
}

impl ReferenceCatalog {
    fn lookup_for(&self, resource: Resource) -> Option<&Arc<dyn EntityLookup>> {
        match resource {
            Resource::DepartureAirport | Resource::ArrivalAirport | Resource::Airport => {
                Some(&self.airports)
            }
            Resource::Pilot | Resource::Copilot | Resource::Human => Some(&self.humans),
            Resource::Airline => Some(&self.airlines),
            Resource::Aircraft => Some(&self.aircraft),
            // Flights resolve through the flight repository, not the catalog.
            Resource::Flight => None,
        }
    }

    /// Fails with `not_found` unless `id` resolves to an existing entity.
    pub async fn require(&self, resource: Resource, id: &str) -> ScheduleResult<()> {
        let exists = match self.lookup_for(resource) {
            Some(lookup) => lookup.exists(id).await.map_err(|e| {
                tracing::error!("{} lookup for {} failed: {}", resource, id, e);
                ScheduleError::storage("look up references", e)
            })?,
            None => false,
        };

        if !exists {
            return Err(ScheduleError::NotFound {
                resource,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
