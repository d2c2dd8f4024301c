//! `SQLite` implementation of [`OwnerRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rentalhub_app::ports::OwnerRepository;
use rentalhub_domain::error::RentalError;
use rentalhub_domain::id::UserId;
use rentalhub_domain::owner::{NewOwner, Owner};
use rentalhub_domain::time::now;

use crate::error::StorageError;
use crate::row::format_timestamp;

struct Wrapper(Owner);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Owner {
            id: UserId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO users (name, email, created_at, updated_at) VALUES (?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT id, name, email FROM users WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM users WHERE id = ?";

/// `SQLite`-backed owner repository.
#[derive(Clone)]
pub struct SqliteOwnerRepository {
    pool: SqlitePool,
}

impl SqliteOwnerRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl OwnerRepository for SqliteOwnerRepository {
    fn create(&self, owner: NewOwner) -> impl Future<Output = Result<Owner, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let ts = format_timestamp(&now());
            let result = sqlx::query(INSERT)
                .bind(&owner.name)
                .bind(&owner.email)
                .bind(&ts)
                .bind(&ts)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Owner {
                id: UserId::new(result.last_insert_rowid()),
                name: owner.name,
                email: owner.email,
            })
        }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<Owner>, RentalError>> + Send {
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

    fn delete(&self, id: UserId) -> impl Future<Output = Result<bool, RentalError>> + Send {
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
