use skyops_shared::Flight;
use std::sync::Arc;

use super::overlap::TimeWindow;
use crate::error::{Assignment, StoreResult};
use crate::repository::{FlightFilter, FlightRepository};

/// Outcome of checking one proposed flight against the stored schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub aircraft: bool,
    pub pilot: bool,
    pub copilot: bool,
    pub flight_number_conflict: bool,
}

impl Availability {
    /// First blocked assignment in reporting order: aircraft, pilot,
    /// copilot, flight number.
    pub fn first_violation(&self) -> Option<Assignment> {
        if !self.aircraft {
            Some(Assignment::Aircraft)
        } else if !self.pilot {
            Some(Assignment::Pilot)
        } else if !self.copilot {
            Some(Assignment::Copilot)
        } else if self.flight_number_conflict {
            Some(Assignment::FlightNumber)
        } else {
            None
        }
    }
}

/// Read-only decisions over the stored flights. The key filter goes to the
/// repository; the overlap test always runs here.
#[derive(Clone)]
pub struct AvailabilityOracle {
    flights: Arc<dyn FlightRepository>,
}

impl AvailabilityOracle {
    pub fn new(flights: Arc<dyn FlightRepository>) -> Self {
        Self { flights }
    }

    pub async fn is_aircraft_available(
        &self,
        aircraft_id: &str,
        window: &TimeWindow,
        exclude_flight_id: Option<&str>,
    ) -> StoreResult<bool> {
        let candidates = self
            .flights
            .find_many(&FlightFilter::by_aircraft(aircraft_id))
            .await?;
        Ok(conflicting(&candidates, window, exclude_flight_id, "aircraft", aircraft_id).is_none())
    }

    /// The human may be booked in either seat of a candidate flight.
    pub async fn is_human_available(
        &self,
        human_id: &str,
        window: &TimeWindow,
        exclude_flight_id: Option<&str>,
    ) -> StoreResult<bool> {
        let candidates = self
            .flights
            .find_many(&FlightFilter::by_crew_member(human_id))
            .await?;
        Ok(conflicting(&candidates, window, exclude_flight_id, "human", human_id).is_none())
    }

    pub async fn has_flight_number_conflict(
        &self,
        flight_number: &str,
        window: &TimeWindow,
        exclude_flight_id: Option<&str>,
    ) -> StoreResult<bool> {
        let candidates = self
            .flights
            .find_many(&FlightFilter::by_flight_number(flight_number))
            .await?;
        Ok(conflicting(&candidates, window, exclude_flight_id, "flight number", flight_number).is_some())
    }

    /// Runs all four checks for `proposed` concurrently.
    pub async fn assess(
        &self,
        proposed: &Flight,
        exclude_flight_id: Option<&str>,
    ) -> StoreResult<Availability> {
        let window = TimeWindow::from(proposed);
        let (aircraft, pilot, copilot, flight_number_conflict) = tokio::try_join!(
            self.is_aircraft_available(&proposed.aircraft_id, &window, exclude_flight_id),
            self.is_human_available(&proposed.pilot_id, &window, exclude_flight_id),
            self.is_human_available(&proposed.copilot_id, &window, exclude_flight_id),
            self.has_flight_number_conflict(&proposed.flight_number, &window, exclude_flight_id),
        )?;

        Ok(Availability {
            aircraft,
            pilot,
            copilot,
            flight_number_conflict,
        })
    }
}

fn conflicting<'a>(
    candidates: &'a [Flight],
    window: &TimeWindow,
    exclude_flight_id: Option<&str>,
    kind: &str,
    key: &str,
) -> Option<&'a Flight> {
    let hit = candidates
        .iter()
        .filter(|f| Some(f.id.as_str()) != exclude_flight_id)
        .find(|f| TimeWindow::from(*f).overlaps(window));

    if let Some(flight) = hit {
        tracing::debug!(
            "{} {} is committed to flight {} ({} - {})",
            kind,
            key,
            flight.id,
            flight.departure_time,
            flight.arrival_time
        );
    }
    hit
}
