//! Car Storage
//! Mission: One parameterized statement per catalog operation

use crate::cars::models::{Car, CarPatch, NewCar};
use crate::db::Database;
use anyhow::{Context, Result};
use rusqlite::{params, Row};
use tracing::{debug, info};

const CAR_COLUMNS: &str =
    "id, car_name, car_description, brand, price, year, stocks, car_image";

/// Car catalog backed by the pooled database
pub struct CarStore {
    db: Database,
}

impl CarStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn car_from_row(row: &Row<'_>) -> rusqlite::Result<Car> {
        Ok(Car {
            id: row.get(0)?,
            car_name: row.get(1)?,
            car_description: row.get(2)?,
            brand: row.get(3)?,
            price: row.get(4)?,
            year: row.get(5)?,
            stocks: row.get(6)?,
            car_image: row.get(7)?,
        })
    }

    /// Every car, in storage order
    pub async fn list_cars(&self) -> Result<Vec<Car>> {
        self.db
            .run(|conn| {
                let mut stmt = conn.prepare(&format!("SELECT {} FROM cars ORDER BY id", CAR_COLUMNS))?;
                let cars = stmt
                    .query_map([], Self::car_from_row)?
                    .collect::<Result<Vec<_>, _>>()
                    .context("Failed to read cars")?;
                Ok(cars)
            })
            .await
    }

    /// Insert a car and return its server-assigned id
    pub async fn insert_car(&self, car: NewCar) -> Result<i64> {
        let id = self
            .db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO cars (car_name, car_description, brand, price, year, stocks, car_image)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        car.car_name,
                        car.car_description,
                        car.brand,
                        car.price,
                        car.year,
                        car.stocks,
                        car.car_image,
                    ],
                )
                .context("Failed to insert car")?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        info!("🚗 Car {} inserted", id);
        Ok(id)
    }

    /// Overwrite the supplied fields of one car; returns the number of rows matched.
    pub async fn update_car(&self, id: i64, patch: CarPatch) -> Result<usize> {
        let rows = self
            .db
            .run(move |conn| {
                let rows = conn
                    .execute(
                        "UPDATE cars
                         SET car_name = COALESCE(?1, car_name),
                             car_description = COALESCE(?2, car_description),
                             brand = COALESCE(?3, brand),
                             price = COALESCE(?4, price),
                             year = COALESCE(?5, year),
                             stocks = COALESCE(?6, stocks),
                             car_image = COALESCE(?7, car_image)
                         WHERE id = ?8",
                        params![
                            patch.car_name.value(),
                            patch.car_description.value(),
                            patch.brand.value(),
                            patch.price.value(),
                            patch.year.value(),
                            patch.stocks.value(),
                            patch.car_image.value(),
                            id,
                        ],
                    )
                    .context("Failed to update car")?;
                Ok(rows)
            })
            .await?;

        debug!("Car {} update matched {} row(s)", id, rows);
        Ok(rows)
    }

    /// Delete one car; returns the number of rows removed.
    pub async fn delete_car(&self, id: i64) -> Result<usize> {
        let rows = self
            .db
            .run(move |conn| {
                conn.execute("DELETE FROM cars WHERE id = ?1", params![id])
                    .context("Failed to delete car")
            })
            .await?;

        debug!("Car {} delete removed {} row(s)", id, rows);
        Ok(rows)
    }
}
