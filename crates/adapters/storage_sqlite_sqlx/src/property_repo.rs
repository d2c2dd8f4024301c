//! `SQLite` implementation of [`PropertyRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rentalhub_app::ports::PropertyRepository;
use rentalhub_domain::error::RentalError;
use rentalhub_domain::id::{PropertyId, UserId};
use rentalhub_domain::property::{NewProperty, Property};
use rentalhub_domain::time::now;

use crate::error::StorageError;
use crate::row::{format_timestamp, json, timestamp};

/// Wrapper for converting database rows into domain [`Property`].
struct Wrapper(Property);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let accessories: Option<String> = row.try_get("accessories")?;
        let basic_services: Option<String> = row.try_get("basic_services")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Property {
            id: PropertyId::new(row.try_get("id")?),
            details: NewProperty {
                owner_id: UserId::new(row.try_get("user_id")?),
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                room_number: row.try_get("room_number")?,
                floor_number: row.try_get("floor_number")?,
                price_cents: row.try_get("price_cents")?,
                occupied: row.try_get("occupied")?,
                accessories: json(accessories)?,
                basic_services: json(basic_services)?,
            },
            created_at: timestamp(&created_at)?,
            updated_at: timestamp(&updated_at)?,
        }))
    }
}

const INSERT: &str = "INSERT INTO properties (user_id, name, description, room_number, floor_number, price_cents, occupied, accessories, basic_services, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM properties WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM properties ORDER BY id";
const DELETE_BY_ID: &str = "DELETE FROM properties WHERE id = ?";

fn encode(value: Option<&serde_json::Value>) -> Result<Option<String>, StorageError> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

/// `SQLite`-backed property repository.
#[derive(Clone)]
pub struct SqlitePropertyRepository {
    pool: SqlitePool,
}

impl SqlitePropertyRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PropertyRepository for SqlitePropertyRepository {
    fn create(
        &self,
        property: NewProperty,
    ) -> impl Future<Output = Result<Property, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let ts = now();
            let accessories = encode(property.accessories.as_ref())?;
            let basic_services = encode(property.basic_services.as_ref())?;

            let result = sqlx::query(INSERT)
                .bind(property.owner_id.get())
                .bind(&property.name)
                .bind(&property.description)
                .bind(property.room_number)
                .bind(property.floor_number)
                .bind(property.price_cents)
                .bind(property.occupied)
                .bind(accessories)
                .bind(basic_services)
                .bind(format_timestamp(&ts))
                .bind(format_timestamp(&ts))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            let row: Wrapper = sqlx::query_as(SELECT_BY_ID)
                .bind(result.last_insert_rowid())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.0)
        }
    }

    fn get_by_id(
        &self,
        id: PropertyId,
    ) -> impl Future<Output = Result<Option<Property>, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Property>, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn delete(&self, id: PropertyId) -> impl Future<Output = Result<bool, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
