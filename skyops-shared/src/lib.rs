pub mod models;
pub mod pii;

pub use models::flight::{Flight, FlightPatch, FlightStatus, UnknownStatus};
pub use models::reference::{Aircraft, Airline, Airport, Human};
pub use pii::Masked;
