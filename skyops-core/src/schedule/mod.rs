//! Flight scheduling: interval overlap, resource availability, consistency
//! checks and the create/update/delete orchestration on top of them.

pub mod availability;
pub mod input;
pub mod orchestrator;
pub mod overlap;
pub mod validate;

pub use availability::{Availability, AvailabilityOracle};
pub use input::{FlightQuery, FlightUpdate, NewFlight, PageQuery};
pub use orchestrator::FlightScheduler;
pub use overlap::{overlaps, TimeWindow};
pub use validate::ReferenceCatalog;
