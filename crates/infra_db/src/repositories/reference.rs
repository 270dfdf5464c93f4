//! Reference data repository
//!
//! States, cities and the crop catalogue. These tables are maintained by
//! operators and the initial migration; the API only reads them.

use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for location and crop reference data
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true if the city exists
    pub async fn city_exists(&self, city_id: i64) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cities WHERE id = $1)")
            .bind(city_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Returns the subset of `crop_ids` present in the catalogue
    pub async fn existing_crops(&self, crop_ids: &[i64]) -> Result<Vec<i64>, DatabaseError> {
        if crop_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM crops WHERE id = ANY($1) ORDER BY id")
            .bind(crop_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    /// Lists the crop catalogue ordered by name
    pub async fn list_crops(&self) -> Result<Vec<CropRow>, DatabaseError> {
        let crops = sqlx::query_as::<_, CropRow>(
            r#"SELECT id, name FROM crops ORDER BY name COLLATE "C", id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(crops)
    }

    /// Looks a state up by its abbreviation, e.g. `SP`
    pub async fn state_by_code(&self, code: &str) -> Result<StateRow, DatabaseError> {
        sqlx::query_as::<_, StateRow>("SELECT id, name, code FROM states WHERE code = $1")
            .bind(code.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("State", code))
    }

    /// Inserts a city
    pub async fn insert_city(&self, name: &str, state_id: i64) -> Result<CityRow, DatabaseError> {
        let city = sqlx::query_as::<_, CityRow>(
            "INSERT INTO cities (name, state_id) VALUES ($1, $2) RETURNING id, name, state_id",
        )
        .bind(name)
        .bind(state_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(city)
    }
}

/// A crop row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CropRow {
    pub id: i64,
    pub name: String,
}

/// A state row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StateRow {
    pub id: i64,
    pub name: String,
    pub code: String,
}

/// A city row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CityRow {
    pub id: i64,
    pub name: String,
    pub state_id: i64,
}
