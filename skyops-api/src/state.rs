use skyops_core::auth::EditAuthorizer;
use skyops_core::{FlightScheduler, ReferenceService};
use skyops_shared::{Aircraft, Airline, Airport, Human};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<FlightScheduler>,
    pub airports: Arc<ReferenceService<Airport>>,
    pub airlines: Arc<ReferenceService<Airline>>,
    pub aircraft: Arc<ReferenceService<Aircraft>>,
    pub humans: Arc<ReferenceService<Human>>,
    pub authorizer: Arc<dyn EditAuthorizer>,
}
