use serde::{Deserialize, Serialize};

/// An airport flights depart from and arrive at. `icao` is the four
/// character location code, stored uppercased.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airport {
    pub id: String,
    pub icao: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airline {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Aircraft {
    pub id: String,
    pub registration: String,
    pub model: String,
}

/// A crew member. `birthdate` is a calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Human {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
}
