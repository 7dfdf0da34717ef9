use async_trait::async_trait;
use skyops_core::error::{StoreError, StoreResult};
use skyops_core::reference::{ReferenceRecord, ReferenceRepository};
use skyops_core::repository::EntityLookup;
use skyops_core::ReferenceCatalog;
use skyops_shared::{Aircraft, Airline, Airport, Human};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;
use std::sync::Arc;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Table layout of a reference kind in `migrations/0001_init.sql`.
pub trait TableRecord: ReferenceRecord {
    const TABLE: &'static str;
    /// Every stored column, `id` first, in bind order.
    const COLUMNS: &'static [&'static str];

    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin + Into<Self>;

    /// Column values in `COLUMNS` order.
    fn values(&self) -> Vec<String>;
}

#[derive(FromRow)]
pub struct AirportRow {
    id: String,
    icao: String,
    name: String,
    country: String,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            icao: row.icao,
            name: row.name,
            country: row.country,
        }
    }
}

impl TableRecord for Airport {
    const TABLE: &'static str = "airports";
    const COLUMNS: &'static [&'static str] = &["id", "icao", "name", "country"];
    type Row = AirportRow;

    fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.icao.clone(),
            self.name.clone(),
            self.country.clone(),
        ]
    }
}

#[derive(FromRow)]
pub struct AirlineRow {
    id: String,
    name: String,
}

impl From<AirlineRow> for Airline {
    fn from(row: AirlineRow) -> Self {
        Airline {
            id: row.id,
            name: row.name,
        }
    }
}

impl TableRecord for Airline {
    const TABLE: &'static str = "airlines";
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    type Row = AirlineRow;

    fn values(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone()]
    }
}

#[derive(FromRow)]
pub struct AircraftRow {
    id: String,
    registration: String,
    model: String,
}

impl From<AircraftRow> for Aircraft {
    fn from(row: AircraftRow) -> Self {
        Aircraft {
            id: row.id,
            registration: row.registration,
            model: row.model,
        }
    }
}

impl TableRecord for Aircraft {
    const TABLE: &'static str = "aircraft";
    const COLUMNS: &'static [&'static str] = &["id", "registration", "model"];
    type Row = AircraftRow;

    fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.registration.clone(),
            self.model.clone(),
        ]
    }
}

#[derive(FromRow)]
pub struct HumanRow {
    id: String,
    first_name: String,
    last_name: String,
    birthdate: String,
}

impl From<HumanRow> for Human {
    fn from(row: HumanRow) -> Self {
        Human {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            birthdate: row.birthdate,
        }
    }
}

impl TableRecord for Human {
    const TABLE: &'static str = "humans";
    const COLUMNS: &'static [&'static str] = &["id", "first_name", "last_name", "birthdate"];
    type Row = HumanRow;

    fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.birthdate.clone(),
        ]
    }
}

/// Unique and foreign-key rejections become typed conflicts.
fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::Duplicate,
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::Referenced,
            _ => {}
        }
    }
    StoreError::backend(err)
}

fn select<R: TableRecord>() -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(R::COLUMNS.join(", ")).push(" FROM ").push(R::TABLE);
    qb
}

fn insert_query<R: TableRecord>(record: &R) -> QueryBuilder<'static, Postgres> {
    let columns = R::COLUMNS.join(", ");
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(R::TABLE).push(" (").push(&columns).push(") VALUES (");
    {
        let mut values = qb.separated(", ");
        for value in record.values() {
            values.push_bind(value);
        }
    }
    qb.push(") RETURNING ").push(columns);
    qb
}

/// One reference table over a shared pool.
pub struct PgReferenceRepository<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R: TableRecord> PgReferenceRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: TableRecord> ReferenceRepository<R> for PgReferenceRepository<R> {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<R>> {
        let mut qb = select::<R>();
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let row = qb
            .build_query_as::<R::Row>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_key(&self, column: &str, value: &str) -> StoreResult<Option<R>> {
        // Column names are spliced into the SQL, so only known ones pass.
        let column = R::COLUMNS
            .iter()
            .find(|c| **c == column)
            .ok_or_else(|| StoreError::backend(format!("{} has no column {}", R::TABLE, column)))?;

        let mut qb = select::<R>();
        qb.push(" WHERE ")
            .push(*column)
            .push(" = ")
            .push_bind(value.to_string())
            .push(" LIMIT 1");

        let row = qb
            .build_query_as::<R::Row>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_many(&self, limit: i64, offset: i64) -> StoreResult<Vec<R>> {
        let mut qb = select::<R>();
        qb.push(" ORDER BY created_at, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<R::Row>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, record: &R) -> StoreResult<R> {
        let row = insert_query(record)
            .build_query_as::<R::Row>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.into())
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<R>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("DELETE FROM ");
        qb.push(R::TABLE)
            .push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(" RETURNING ")
            .push(R::COLUMNS.join(", "));

        let row = qb
            .build_query_as::<R::Row>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl<R: TableRecord> EntityLookup for PgReferenceRepository<R> {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM ");
        qb.push(R::TABLE).push(" WHERE id = ").push_bind(id.to_string()).push(")");

        qb.build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)
    }
}

/// Wires one existence lookup per reference table onto a shared pool.
pub fn reference_catalog(pool: &PgPool) -> ReferenceCatalog {
    ReferenceCatalog {
        airports: Arc::new(PgReferenceRepository::<Airport>::new(pool.clone())),
        humans: Arc::new(PgReferenceRepository::<Human>::new(pool.clone())),
        airlines: Arc::new(PgReferenceRepository::<Airline>::new(pool.clone())),
        aircraft: Arc::new(PgReferenceRepository::<Aircraft>::new(pool.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heathrow() -> Airport {
        Airport {
            id: "0d7f2a8c-4c1e-4f0e-9b3a-6a2b1c9d8e70".to_string(),
            icao: "EGLL".to_string(),
            name: "London Heathrow".to_string(),
            country: "United Kingdom".to_string(),
        }
    }

    #[test]
    fn test_select_and_insert_sql() {
        assert_eq!(select::<Human>().sql(), "SELECT id, first_name, last_name, birthdate FROM humans");

        let qb = insert_query(&heathrow());
        assert_eq!(
            qb.sql(),
            "INSERT INTO airports (id, icao, name, country) VALUES ($1, $2, $3, $4) \
             RETURNING id, icao, name, country"
        );
    }

    #[test]
    fn test_values_follow_column_order() {
        let values = heathrow().values();
        assert_eq!(values.len(), Airport::COLUMNS.len());
        assert_eq!(values[1], "EGLL");

        for (columns, values) in [
            (Airline::COLUMNS, 2),
            (Aircraft::COLUMNS, 3),
            (Human::COLUMNS, 4),
        ] {
            assert_eq!(columns.len(), values);
            assert_eq!(columns[0], "id");
        }
    }

    #[test]
    fn test_unique_keys_are_stored_columns() {
        let airline = Airline {
            id: "a".to_string(),
            name: "Swiss".to_string(),
        };
        let aircraft = Aircraft {
            id: "b".to_string(),
            registration: "HB-JLA".to_string(),
            model: "A330-300".to_string(),
        };

        let keys = heathrow()
            .unique_keys()
            .into_iter()
            .map(|(c, _)| (Airport::COLUMNS, c))
            .chain(airline.unique_keys().into_iter().map(|(c, _)| (Airline::COLUMNS, c)))
            .chain(aircraft.unique_keys().into_iter().map(|(c, _)| (Aircraft::COLUMNS, c)));
        for (columns, key) in keys {
            assert!(columns.contains(&key), "{} is not a column", key);
        }
    }

    #[test]
    fn test_non_database_errors_are_opaque() {
        assert!(matches!(map_db_error(sqlx::Error::RowNotFound), StoreError::Backend(_)));
    }
}
