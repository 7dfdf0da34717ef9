use anyhow::Context;
use skyops_api::{app, AppState};
use skyops_core::auth::SharedSecretAuthorizer;
use skyops_core::ids::UuidGenerator;
use skyops_core::{FlightScheduler, ReferenceService};
use skyops_shared::{Aircraft, Airline, Airport, Human};
use skyops_store::{reference_catalog, Config, DbClient, PgFlightRepository, PgReferenceRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyops_api=debug,skyops_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting SkyOps API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let pool = db.pool.clone();
    let scheduler = FlightScheduler::new(
        Arc::new(PgFlightRepository::new(pool.clone())),
        reference_catalog(&pool),
        Arc::new(UuidGenerator),
        config.scheduling.clone(),
    );

    let state = AppState {
        airports: Arc::new(ReferenceService::attached_to(
            Arc::new(PgReferenceRepository::<Airport>::new(pool.clone())),
            &scheduler,
        )),
        airlines: Arc::new(ReferenceService::attached_to(
            Arc::new(PgReferenceRepository::<Airline>::new(pool.clone())),
            &scheduler,
        )),
        aircraft: Arc::new(ReferenceService::attached_to(
            Arc::new(PgReferenceRepository::<Aircraft>::new(pool.clone())),
            &scheduler,
        )),
        humans: Arc::new(ReferenceService::attached_to(
            Arc::new(PgReferenceRepository::<Human>::new(pool)),
            &scheduler,
        )),
        scheduler: Arc::new(scheduler),
        authorizer: Arc::new(SharedSecretAuthorizer::new(config.auth.edit_secret.clone())),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
