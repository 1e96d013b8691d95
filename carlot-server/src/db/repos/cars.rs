//! Car repository
//!
//! Handles the `car` table:
//! - list_active: rows with deleted_flag = 0
//! - create: single INSERT, id from LAST_INSERT_ID
//! - update_year: UPDATE + re-select in one transaction
//! - toggle_deleted: flips deleted_flag in a single UPDATE

use serde::Serialize;
use sqlx::{Connection, FromRow, MySqlConnection};

use crate::models::{CarId, DeletedFlag, NewCar, YearUpdate};

/// Car record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Car {
    pub id: i64,
    pub year: i64,
    pub make: String,
    pub model: String,
    #[sqlx(try_from = "i64")]
    pub deleted_flag: DeletedFlag,
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

const SELECT_COLUMNS: &str = "SELECT id, year, make, model, deleted_flag FROM car";

/// Car repository
pub struct CarRepo<'c> {
    conn: &'c mut MySqlConnection,
}

impl<'c> CarRepo<'c> {
    pub fn new(conn: &'c mut MySqlConnection) -> Self {
        Self { conn }
    }

    /// All rows that are not soft-deleted.
    pub async fn list_active(&mut self) -> Result<Vec<Car>, DbError> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "{SELECT_COLUMNS} WHERE deleted_flag = 0 ORDER BY id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(cars)
    }

    /// Insert a record and return it with its generated id.
    pub async fn create(&mut self, car: NewCar) -> Result<Car, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO car (year, make, model, deleted_flag)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(car.year.get())
        .bind(car.make.as_str())
        .bind(car.model.as_str())
        .bind(car.deleted_flag.as_i64())
        .execute(&mut *self.conn)
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Car {
            id,
            year: car.year.get(),
            make: car.make.into_string(),
            model: car.model.into_string(),
            deleted_flag: car.deleted_flag,
        })
    }

    /// Change a record's year and read the record back (atomic).
    ///
    /// MySQL reports zero affected rows when the year is unchanged, so
    /// existence is decided by the re-select, not by the UPDATE.
    pub async fn update_year(&mut self, update: YearUpdate) -> Result<Car, DbError> {
        let mut tx = self.conn.begin().await?;

        sqlx::query("UPDATE car SET year = ? WHERE id = ?")
            .bind(update.year.get())
            .bind(update.id.get())
            .execute(&mut *tx)
            .await?;

        let car = sqlx::query_as::<_, Car>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(update.id.get())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(car) = car else {
            tx.rollback().await?;
            return Err(DbError::NotFound {
                resource: "car",
                id: update.id.get().to_string(),
            });
        };

        tx.commit().await?;
        Ok(car)
    }

    /// Flip deleted_flag between 0 and 1. Returns the number of rows touched
    /// (0 when no record has this id).
    pub async fn toggle_deleted(&mut self, id: CarId) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE car
            SET deleted_flag = IF(deleted_flag = 0, 1, 0)
            WHERE id = ?
            "#,
        )
        .bind(id.get())
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_serializes_flag_as_integer() {
        let car = Car {
            id: 5,
            year: 2020,
            make: "Honda".into(),
            model: "Civic".into(),
            deleted_flag: DeletedFlag::Active,
        };

        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 5,
                "year": 2020,
                "make": "Honda",
                "model": "Civic",
                "deleted_flag": 0
            })
        );
    }

    #[test]
    fn not_found_display() {
        let err = DbError::NotFound {
            resource: "car",
            id: "9".into(),
        };
        assert_eq!(err.to_string(), "not found: car '9'");
    }

    // Repository behaviour against MySQL is covered in tests/cars_api.rs
    // (run with DATABASE_URL set and --ignored).
}
