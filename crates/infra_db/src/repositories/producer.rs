//! Producer repository implementation
//!
//! A producer row references exactly one farm row, and the farm's crops sit in
//! the `farm_crops` join table. Every write touching more than one of those
//! tables runs in a single transaction.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::DatabaseError;

const SELECT_PRODUCERS: &str = r#"
    SELECT
        p.id AS producer_id,
        p.name AS producer_name,
        p.cpf,
        p.cnpj,
        f.id AS farm_id,
        f.name AS farm_name,
        f.city_id,
        f.total_area_ha,
        f.arable_area_ha,
        f.vegetation_area_ha
    FROM producers p
    JOIN farms f ON f.id = p.farm_id
"#;

/// Repository for producers, their farm and its crops
#[derive(Debug, Clone)]
pub struct ProducerRepository {
    pool: PgPool,
}

impl ProducerRepository {
    /// Creates a new ProducerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists all producers joined with their farm, ordered by id
    pub async fn list(&self) -> Result<Vec<ProducerWithCrops>, DatabaseError> {
        let rows = sqlx::query_as::<_, ProducerRow>(&format!("{SELECT_PRODUCERS} ORDER BY p.id"))
            .fetch_all(&self.pool)
            .await?;

        let farm_ids: Vec<i64> = rows.iter().map(|row| row.farm_id).collect();
        let crops = self.crops_of(&farm_ids).await?;

        Ok(rows
            .into_iter()
            .map(|producer| {
                let crops = crops
                    .iter()
                    .filter(|c| c.farm_id == producer.farm_id)
                    .map(|c| c.crop_id)
                    .collect();
                ProducerWithCrops { producer, crops }
            })
            .collect())
    }

    /// Retrieves a producer joined with its farm and crops
    ///
    /// # Returns
    ///
    /// The producer or `DatabaseError::NotFound`
    pub async fn get(&self, producer_id: i64) -> Result<ProducerWithCrops, DatabaseError> {
        let producer =
            sqlx::query_as::<_, ProducerRow>(&format!("{SELECT_PRODUCERS} WHERE p.id = $1"))
                .bind(producer_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DatabaseError::not_found("Producer", producer_id))?;

        let crops = self
            .crops_of(&[producer.farm_id])
            .await?
            .into_iter()
            .map(|c| c.crop_id)
            .collect();

        Ok(ProducerWithCrops { producer, crops })
    }

    /// Inserts a farm, its crops and the producer owning it
    ///
    /// Nothing is written unless all three inserts succeed.
    ///
    /// # Returns
    ///
    /// The new producer id
    pub async fn create(
        &self,
        farm: &FarmColumns,
        crops: &[i64],
        producer: &ProducerColumns,
    ) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let farm_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO farms (name, city_id, total_area_ha, arable_area_ha, vegetation_area_ha)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&farm.name)
        .bind(farm.city_id)
        .bind(farm.total_area_ha)
        .bind(farm.arable_area_ha)
        .bind(farm.vegetation_area_ha)
        .fetch_one(&mut *tx)
        .await?;

        insert_crops(&mut tx, farm_id, crops).await?;

        let producer_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO producers (name, cpf, cnpj, farm_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&producer.name)
        .bind(&producer.cpf)
        .bind(&producer.cnpj)
        .bind(farm_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(producer_id)
    }

    /// Writes the changed parts of a producer in one transaction
    pub async fn update(&self, update: &ProducerUpdate) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if let Some(producer) = &update.producer {
            let result = sqlx::query(
                r#"
                UPDATE producers
                SET name = $2, cpf = $3, cnpj = $4
                WHERE id = $1
                "#,
            )
            .bind(update.producer_id)
            .bind(&producer.name)
            .bind(&producer.cpf)
            .bind(&producer.cnpj)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("Producer", update.producer_id));
            }
        }

        if let Some(farm) = &update.farm {
            sqlx::query(
                r#"
                UPDATE farms
                SET name = $2, city_id = $3, total_area_ha = $4,
                    arable_area_ha = $5, vegetation_area_ha = $6
                WHERE id = $1
                "#,
            )
            .bind(update.farm_id)
            .bind(&farm.name)
            .bind(farm.city_id)
            .bind(farm.total_area_ha)
            .bind(farm.arable_area_ha)
            .bind(farm.vegetation_area_ha)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(crops) = &update.crops {
            sqlx::query("DELETE FROM farm_crops WHERE farm_id = $1")
                .bind(update.farm_id)
                .execute(&mut *tx)
                .await?;
            insert_crops(&mut tx, update.farm_id, crops).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a producer row; the farm row stays
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(&self, producer_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM producers WHERE id = $1")
            .bind(producer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns true if another producer holds the identifier
    pub async fn tax_id_taken(
        &self,
        column: TaxIdColumn,
        value: &str,
        exclude: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        let sql = match column {
            TaxIdColumn::Cpf => {
                "SELECT EXISTS(SELECT 1 FROM producers WHERE cpf = $1 AND ($2::BIGINT IS NULL OR id <> $2))"
            }
            TaxIdColumn::Cnpj => {
                "SELECT EXISTS(SELECT 1 FROM producers WHERE cnpj = $1 AND ($2::BIGINT IS NULL OR id <> $2))"
            }
        };
        let taken = sqlx::query_scalar::<_, bool>(sql)
            .bind(value)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Farm count and hectare sums over all farms
    pub async fn farm_totals(&self) -> Result<FarmTotalsRow, DatabaseError> {
        let totals = sqlx::query_as::<_, FarmTotalsRow>(
            r#"
            SELECT
                COUNT(*) AS total_farms,
                COALESCE(SUM(total_area_ha), 0) AS total_area,
                COALESCE(SUM(arable_area_ha), 0) AS total_arable,
                COALESCE(SUM(vegetation_area_ha), 0) AS total_vegetation
            FROM farms
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    /// Number of farms growing each crop, every crop included
    pub async fn farms_per_crop(&self) -> Result<Vec<NamedCountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, NamedCountRow>(
            r#"
            SELECT c.name, COUNT(fc.farm_id) AS total
            FROM crops c
            LEFT JOIN farm_crops fc ON fc.crop_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.name COLLATE "C", c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Number of farms per state, only states that have farms
    pub async fn farms_per_state(&self) -> Result<Vec<NamedCountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, NamedCountRow>(
            r#"
            SELECT s.name, COUNT(f.id) AS total
            FROM farms f
            JOIN cities ci ON ci.id = f.city_id
            JOIN states s ON s.id = ci.state_id
            GROUP BY s.id, s.name
            ORDER BY s.name COLLATE "C", s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn crops_of(&self, farm_ids: &[i64]) -> Result<Vec<FarmCropRow>, DatabaseError> {
        if farm_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, FarmCropRow>(
            r#"
            SELECT farm_id, crop_id
            FROM farm_crops
            WHERE farm_id = ANY($1)
            ORDER BY farm_id, crop_id
            "#,
        )
        .bind(farm_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

async fn insert_crops(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: i64,
    crops: &[i64],
) -> Result<(), DatabaseError> {
    if crops.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO farm_crops (farm_id, crop_id)
        SELECT $1, crop_id FROM UNNEST($2::BIGINT[]) AS t(crop_id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(farm_id)
    .bind(crops.to_vec())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ============================================================================
// Row types
// ============================================================================

/// A producer row joined with its farm row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProducerRow {
    pub producer_id: i64,
    pub producer_name: String,
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub farm_id: i64,
    pub farm_name: String,
    pub city_id: i64,
    pub total_area_ha: Decimal,
    pub arable_area_ha: Decimal,
    pub vegetation_area_ha: Decimal,
}

/// A producer row with the crop ids of its farm, ascending
#[derive(Debug, Clone)]
pub struct ProducerWithCrops {
    pub producer: ProducerRow,
    pub crops: Vec<i64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FarmCropRow {
    farm_id: i64,
    crop_id: i64,
}

/// Writable columns of the producers table
#[derive(Debug, Clone)]
pub struct ProducerColumns {
    pub name: String,
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
}

/// Writable columns of the farms table
#[derive(Debug, Clone)]
pub struct FarmColumns {
    pub name: String,
    pub city_id: i64,
    pub total_area_ha: Decimal,
    pub arable_area_ha: Decimal,
    pub vegetation_area_ha: Decimal,
}

/// The parts of a producer an update rewrites; `None` leaves a part alone
#[derive(Debug, Clone)]
pub struct ProducerUpdate {
    pub producer_id: i64,
    pub farm_id: i64,
    pub producer: Option<ProducerColumns>,
    pub farm: Option<FarmColumns>,
    pub crops: Option<Vec<i64>>,
}

impl ProducerUpdate {
    /// Returns true when the update writes nothing
    pub fn is_empty(&self) -> bool {
        self.producer.is_none() && self.farm.is_none() && self.crops.is_none()
    }
}

/// Which tax identifier column to search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdColumn {
    Cpf,
    Cnpj,
}

/// Farm count and hectare sums
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FarmTotalsRow {
    pub total_farms: i64,
    pub total_area: Decimal,
    pub total_arable: Decimal,
    pub total_vegetation: Decimal,
}

/// A name with a farm count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NamedCountRow {
    pub name: String,
    pub total: i64,
}
