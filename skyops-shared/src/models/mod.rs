pub mod flight;
pub mod reference;
