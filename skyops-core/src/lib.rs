pub mod auth;
pub mod error;
pub mod gate;
pub mod ids;
pub mod memory;
pub mod reference;
pub mod repository;
pub mod rules;
pub mod schedule;

pub use error::{Assignment, Resource, ScheduleError, StoreError, StoreResult};
pub use gate::WriteGate;
pub use reference::{ReferenceRecord, ReferenceRepository, ReferenceService};
pub use rules::{InvalidRules, SchedulingRules};
pub use schedule::{FlightQuery, FlightScheduler, FlightUpdate, NewFlight, PageQuery, ReferenceCatalog};

pub type ScheduleResult<T> = Result<T, ScheduleError>;
