use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skyops_core::error::{StoreError, StoreResult};
use skyops_core::repository::{FlightFilter, FlightRepository};
use skyops_shared::{Flight, FlightPatch, FlightStatus};
use sqlx::{PgPool, Postgres, QueryBuilder};

const COLUMNS: &str = "id, flight_number, departure_airport_id, arrival_airport_id, \
     departure_time, arrival_time, pilot_id, copilot_id, airline_id, status, aircraft_id";

/// Exclusion constraints declared in `migrations/0001_init.sql`.
const AIRCRAFT_EXCLUSION: &str = "flights_aircraft_no_overlap";
const FLIGHT_NUMBER_EXCLUSION: &str = "flights_number_no_overlap";

const EXCLUSION_VIOLATION: &str = "23P01";

pub struct PgFlightRepository {
    pool: PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: String,
    flight_number: String,
    departure_airport_id: String,
    arrival_airport_id: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    pilot_id: String,
    copilot_id: String,
    airline_id: String,
    status: String,
    aircraft_id: String,
}

impl TryFrom<FlightRow> for Flight {
    type Error = StoreError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        let status: FlightStatus = row.status.parse().map_err(StoreError::backend)?;
        Ok(Flight {
            id: row.id,
            flight_number: row.flight_number,
            departure_airport_id: row.departure_airport_id,
            arrival_airport_id: row.arrival_airport_id,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            pilot_id: row.pilot_id,
            copilot_id: row.copilot_id,
            airline_id: row.airline_id,
            status,
            aircraft_id: row.aircraft_id,
        })
    }
}

/// Exclusion-constraint rejections become typed conflicts; everything else
/// is an opaque backend failure.
fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            match db.constraint() {
                Some(AIRCRAFT_EXCLUSION) => return StoreError::AircraftOverlap,
                Some(FLIGHT_NUMBER_EXCLUSION) => return StoreError::FlightNumberOverlap,
                _ => {}
            }
        }
    }
    StoreError::backend(err)
}

fn select() -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(COLUMNS).push(" FROM flights");
    qb
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FlightFilter) {
    qb.push(" WHERE TRUE");

    let equalities = [
        ("flight_number", &filter.flight_number),
        ("departure_airport_id", &filter.departure_airport_id),
        ("arrival_airport_id", &filter.arrival_airport_id),
        ("pilot_id", &filter.pilot_id),
        ("copilot_id", &filter.copilot_id),
        ("airline_id", &filter.airline_id),
        ("aircraft_id", &filter.aircraft_id),
    ];
    for (column, value) in equalities {
        if let Some(value) = value {
            qb.push(" AND ").push(column).push(" = ").push_bind(value.clone());
        }
    }

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(human) = &filter.crew_member_id {
        qb.push(" AND (pilot_id = ")
            .push_bind(human.clone())
            .push(" OR copilot_id = ")
            .push_bind(human.clone())
            .push(")");
    }

    if let Some(airport) = &filter.airport_id {
        qb.push(" AND (departure_airport_id = ")
            .push_bind(airport.clone())
            .push(" OR arrival_airport_id = ")
            .push_bind(airport.clone())
            .push(")");
    }

    qb.push(" ORDER BY departure_time, id");

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = filter.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
}

/// Appends `col = $n, ...` for every field present in the patch, plus the
/// `updated_at` stamp.
fn push_assignments(qb: &mut QueryBuilder<'_, Postgres>, patch: &FlightPatch) {
    let mut set = qb.separated(", ");

    let texts = [
        ("flight_number", &patch.flight_number),
        ("departure_airport_id", &patch.departure_airport_id),
        ("arrival_airport_id", &patch.arrival_airport_id),
        ("pilot_id", &patch.pilot_id),
        ("copilot_id", &patch.copilot_id),
        ("airline_id", &patch.airline_id),
        ("aircraft_id", &patch.aircraft_id),
    ];
    for (column, value) in texts {
        if let Some(value) = value {
            set.push(format!("{} = ", column)).push_bind_unseparated(value.clone());
        }
    }

    if let Some(ts) = patch.departure_time {
        set.push("departure_time = ").push_bind_unseparated(ts);
    }
    if let Some(ts) = patch.arrival_time {
        set.push("arrival_time = ").push_bind_unseparated(ts);
    }
    if let Some(status) = patch.status {
        set.push("status = ").push_bind_unseparated(status.as_str());
    }
    set.push("updated_at = NOW()");
}

#[async_trait]
impl FlightRepository for PgFlightRepository {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Flight>> {
        let mut qb = select();
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let row = qb
            .build_query_as::<FlightRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Flight::try_from).transpose()
    }

    async fn find_many(&self, filter: &FlightFilter) -> StoreResult<Vec<Flight>> {
        let mut qb = select();
        push_filter(&mut qb, filter);

        let rows = qb
            .build_query_as::<FlightRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(Flight::try_from).collect()
    }

    async fn insert(&self, flight: &Flight) -> StoreResult<Flight> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO flights (");
        qb.push(COLUMNS).push(") VALUES (");
        {
            let mut values = qb.separated(", ");
            values
                .push_bind(flight.id.clone())
                .push_bind(flight.flight_number.clone())
                .push_bind(flight.departure_airport_id.clone())
                .push_bind(flight.arrival_airport_id.clone())
                .push_bind(flight.departure_time)
                .push_bind(flight.arrival_time)
                .push_bind(flight.pilot_id.clone())
                .push_bind(flight.copilot_id.clone())
                .push_bind(flight.airline_id.clone())
                .push_bind(flight.status.as_str())
                .push_bind(flight.aircraft_id.clone());
        }
        qb.push(") RETURNING ").push(COLUMNS);

        let row = qb
            .build_query_as::<FlightRow>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Flight::try_from(row)
    }

    async fn update(&self, id: &str, patch: &FlightPatch) -> StoreResult<Option<Flight>> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE flights SET ");
        push_assignments(&mut qb, patch);
        qb.push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(" RETURNING ")
            .push(COLUMNS);

        let row = qb
            .build_query_as::<FlightRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Flight::try_from).transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<Flight>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("DELETE FROM flights WHERE id = ");
        qb.push_bind(id.to_string()).push(" RETURNING ").push(COLUMNS);

        let row = qb
            .build_query_as::<FlightRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Flight::try_from).transpose()
    }
}
