use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational label of a flight. Any value may be set directly; there is no
/// transition table between them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    Departed,
    Arrived,
    Cancelled,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 5] = [
        FlightStatus::Scheduled,
        FlightStatus::Boarding,
        FlightStatus::Departed,
        FlightStatus::Arrived,
        FlightStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Boarding => "boarding",
            FlightStatus::Departed => "departed",
            FlightStatus::Arrived => "arrived",
            FlightStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown flight status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for FlightStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A stored flight with all of its resource references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: String,
    pub flight_number: String,
    pub departure_airport_id: String,
    pub arrival_airport_id: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub pilot_id: String,
    pub copilot_id: String,
    pub airline_id: String,
    pub status: FlightStatus,
    pub aircraft_id: String,
}

/// Sparse set of already-validated field changes for one flight.
///
/// `None` means "keep the stored value". The same patch is used to build the
/// merged view for re-validation and as the column set of the partial write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightPatch {
    pub flight_number: Option<String>,
    pub departure_airport_id: Option<String>,
    pub arrival_airport_id: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub pilot_id: Option<String>,
    pub copilot_id: Option<String>,
    pub airline_id: Option<String>,
    pub status: Option<FlightStatus>,
    pub aircraft_id: Option<String>,
}

impl FlightPatch {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Column names touched by this patch, in declaration order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.flight_number.is_some() {
            fields.push("flight_number");
        }
        if self.departure_airport_id.is_some() {
            fields.push("departure_airport_id");
        }
        if self.arrival_airport_id.is_some() {
            fields.push("arrival_airport_id");
        }
        if self.departure_time.is_some() {
            fields.push("departure_time");
        }
        if self.arrival_time.is_some() {
            fields.push("arrival_time");
        }
        if self.pilot_id.is_some() {
            fields.push("pilot_id");
        }
        if self.copilot_id.is_some() {
            fields.push("copilot_id");
        }
        if self.airline_id.is_some() {
            fields.push("airline_id");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.aircraft_id.is_some() {
            fields.push("aircraft_id");
        }
        fields
    }
}

impl Flight {
    /// Returns the record as it would look after `patch` is written.
    pub fn merged(&self, patch: &FlightPatch) -> Flight {
        let mut merged = self.clone();
        merged.apply(patch);
        merged
    }

    pub fn apply(&mut self, patch: &FlightPatch) {
        if let Some(v) = &patch.flight_number {
            self.flight_number = v.clone();
        }
        if let Some(v) = &patch.departure_airport_id {
            self.departure_airport_id = v.clone();
        }
        if let Some(v) = &patch.arrival_airport_id {
            self.arrival_airport_id = v.clone();
        }
        if let Some(v) = patch.departure_time {
            self.departure_time = v;
        }
        if let Some(v) = patch.arrival_time {
            self.arrival_time = v;
        }
        if let Some(v) = &patch.pilot_id {
            self.pilot_id = v.clone();
        }
        if let Some(v) = &patch.copilot_id {
            self.copilot_id = v.clone();
        }
        if let Some(v) = &patch.airline_id {
            self.airline_id = v.clone();
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = &patch.aircraft_id {
            self.aircraft_id = v.clone();
        }
    }

    /// Whether `human_id` flies this flight in either seat.
    pub fn has_crew_member(&self, human_id: &str) -> bool {
        self.pilot_id == human_id || self.copilot_id == human_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Flight {
        Flight {
            id: "f-1".to_string(),
            flight_number: "LH400".to_string(),
            departure_airport_id: "fra".to_string(),
            arrival_airport_id: "jfk".to_string(),
            departure_time: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap(),
            pilot_id: "p-1".to_string(),
            copilot_id: "p-2".to_string(),
            airline_id: "lh".to_string(),
            status: FlightStatus::Scheduled,
            aircraft_id: "D-AIMA".to_string(),
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("boarding".parse::<FlightStatus>().unwrap(), FlightStatus::Boarding);
        assert_eq!(" Cancelled ".parse::<FlightStatus>().unwrap(), FlightStatus::Cancelled);
        assert!("delayed".parse::<FlightStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&FlightStatus::Departed).unwrap();
        assert_eq!(json, "\"departed\"");
    }

    #[test]
    fn test_empty_patch() {
        let patch = FlightPatch::default();
        assert!(patch.is_empty());
        assert!(patch.changed_fields().is_empty());
    }

    #[test]
    fn test_merged_overrides_only_provided_fields() {
        let flight = sample();
        let patch = FlightPatch {
            status: Some(FlightStatus::Boarding),
            arrival_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap()),
            ..Default::default()
        };

        let merged = flight.merged(&patch);
        assert_eq!(merged.status, FlightStatus::Boarding);
        assert_eq!(merged.arrival_time, Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap());
        assert_eq!(merged.departure_time, flight.departure_time);
        assert_eq!(merged.pilot_id, flight.pilot_id);
        assert_eq!(patch.changed_fields(), vec!["arrival_time", "status"]);
    }

    #[test]
    fn test_crew_membership() {
        let flight = sample();
        assert!(flight.has_crew_member("p-1"));
        assert!(flight.has_crew_member("p-2"));
        assert!(!flight.has_crew_member("p-3"));
    }
}
