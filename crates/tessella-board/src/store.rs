//! Board store
//!
//! Durable storage reconciliation for the pixel grid, decoupled from the hot
//! mutation path. One row per pixel, keyed by linear index + 1, holding the
//! RGB tuple; alpha is never persisted and is reconstructed as 255 on load.
//! Rows are created once at first boot and updated in place thereafter.

use sqlx::{sqlite::SqlitePool, Row};

use crate::board::{PixelBoard, Rgb};
use crate::error::{Error, Result};

/// SQLite-backed pixel record store
pub struct BoardStore {
    pool: SqlitePool,
}

impl BoardStore {
    /// Create a store over the given database pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pixels (
                id INTEGER PRIMARY KEY,
                r INTEGER NOT NULL,
                g INTEGER NOT NULL,
                b INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Seed a fresh board or reload a persisted one.
    ///
    /// With no rows present, inserts `width * height` records set to `fill`
    /// and returns a blank board. Otherwise reads every record back and
    /// reconstructs the buffer, failing with `IncompleteStore` if any
    /// expected record is missing; a partially written store is fatal at
    /// boot rather than silently patched.
    pub async fn load_or_initialize(&self, width: u32, height: u32, fill: Rgb) -> Result<PixelBoard> {
        let expected = u64::from(width) * u64::from(height);
        let count = self.record_count().await?;

        if count == 0 {
            let mut tx = self.pool.begin().await?;
            for id in 1..=expected {
                sqlx::query("INSERT INTO pixels (id, r, g, b) VALUES (?, ?, ?, ?)")
                    .bind(id as i64)
                    .bind(i64::from(fill.r))
                    .bind(i64::from(fill.g))
                    .bind(i64::from(fill.b))
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            return Ok(PixelBoard::blank(width, height, fill));
        }

        let rows = sqlx::query("SELECT id, r, g, b FROM pixels ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        if rows.len() as u64 != expected {
            return Err(Error::IncompleteStore {
                expected,
                found: rows.len() as u64,
            });
        }

        let mut data = Vec::with_capacity((expected * 4) as usize);
        for (position, row) in rows.iter().enumerate() {
            let id: i64 = row.get("id");
            if id != position as i64 + 1 {
                // Row count matched but an id is absent; a later id filled the gap
                return Err(Error::IncompleteStore {
                    expected,
                    found: position as u64,
                });
            }
            let r: i64 = row.get("r");
            let g: i64 = row.get("g");
            let b: i64 = row.get("b");
            data.push(r.clamp(0, 255) as u8);
            data.push(g.clamp(0, 255) as u8);
            data.push(b.clamp(0, 255) as u8);
            data.push(255);
        }

        PixelBoard::from_rgba(width, height, data)
    }

    /// Write one pixel's color tuple
    pub async fn persist_pixel(&self, linear_index: u64, color: Rgb) -> Result<()> {
        sqlx::query("UPDATE pixels SET r = ?, g = ?, b = ? WHERE id = ?")
            .bind(i64::from(color.r))
            .bind(i64::from(color.g))
            .bind(i64::from(color.b))
            .bind((linear_index + 1) as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Overwrite every record with the given color (reset path, awaited)
    pub async fn persist_all(&self, color: Rgb) -> Result<()> {
        sqlx::query("UPDATE pixels SET r = ?, g = ?, b = ?")
            .bind(i64::from(color.r))
            .bind(i64::from(color.g))
            .bind(i64::from(color.b))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of persisted pixel records
    pub async fn record_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pixels")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Read one record's color, if present
    pub async fn read_pixel(&self, linear_index: u64) -> Result<Option<Rgb>> {
        let row = sqlx::query("SELECT r, g, b FROM pixels WHERE id = ?")
            .bind((linear_index + 1) as i64)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| {
            let r: i64 = row.get("r");
            let g: i64 = row.get("g");
            let b: i64 = row.get("b");
            Rgb::new(
                r.clamp(0, 255) as u8,
                g.clamp(0, 255) as u8,
                b.clamp(0, 255) as u8,
            )
        }))
    }
}
