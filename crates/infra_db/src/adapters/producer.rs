//! PostgreSQL Producer Adapter
//!
//! Implements `ProducerPort` on top of [`ProducerRepository`] and
//! [`ReferenceRepository`].
//!
//! The identity rule and the area invariant are checked here before any SQL
//! runs. The schema enforces both again (`producers_single_tax_id` and
//! `farms_area_within_total`), and a unique violation on `cpf` or `cnpj`
//! surfaces as `PortError::Conflict`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{
    CityId, CropId, DomainPort, FarmId, HealthCheckResult, HealthCheckable, PortError, ProducerId,
};
use domain_rural::farm::to_hectares;
use domain_rural::{
    ChangeSet, Crop, Farm, FarmAreas, FarmField, FarmStatistics, NamedCount, NewProducer,
    Producer, ProducerPort, TaxIdKind,
};

use crate::repositories::producer::{
    FarmColumns, ProducerColumns, ProducerUpdate, ProducerWithCrops, TaxIdColumn,
};
use crate::repositories::{ProducerRepository, ReferenceRepository};

/// PostgreSQL-backed implementation of the ProducerPort trait
#[derive(Debug, Clone)]
pub struct PostgresProducerAdapter {
    producers: ProducerRepository,
    reference: ReferenceRepository,
    pool: PgPool,
}

impl PostgresProducerAdapter {
    /// Creates a new PostgreSQL producer adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            producers: ProducerRepository::new(pool.clone()),
            reference: ReferenceRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresProducerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresProducerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-producer-adapter").await
    }
}

#[async_trait]
impl ProducerPort for PostgresProducerAdapter {
    #[instrument(skip(self))]
    async fn list_producers(&self) -> Result<Vec<Producer>, PortError> {
        debug!("Listing producers");
        let records = self.producers.list().await?;
        Ok(records.into_iter().map(record_to_producer).collect())
    }

    #[instrument(skip(self), fields(producer_id = %id))]
    async fn get_producer(&self, id: ProducerId) -> Result<Producer, PortError> {
        debug!("Fetching producer by ID");
        let record = self.producers.get(id.get()).await.map_err(|e| {
            if e.is_not_found() {
                PortError::not_found("Producer", id)
            } else {
                e.into()
            }
        })?;
        Ok(record_to_producer(record))
    }

    #[instrument(skip(self, producer), fields(farm_city = %producer.farm.city_id))]
    async fn create_producer(&self, producer: NewProducer) -> Result<Producer, PortError> {
        producer
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;

        let crops: Vec<i64> = producer.farm.crops.iter().map(|c| c.get()).collect();
        let farm = FarmColumns {
            name: producer.farm.name.clone(),
            city_id: producer.farm.city_id.get(),
            total_area_ha: producer.farm.areas.total,
            arable_area_ha: producer.farm.areas.arable,
            vegetation_area_ha: producer.farm.areas.vegetation,
        };
        let columns = ProducerColumns {
            name: producer.name,
            cpf: producer.cpf,
            cnpj: producer.cnpj,
        };

        let id = self.producers.create(&farm, &crops, &columns).await?;
        info!(producer_id = id, "Producer row inserted");

        self.get_producer(ProducerId::new(id)).await
    }

    #[instrument(skip(self, producer, changes), fields(producer_id = %producer.id))]
    async fn update_producer(
        &self,
        producer: &Producer,
        changes: &ChangeSet,
    ) -> Result<Producer, PortError> {
        producer
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;

        let update = build_update(producer, changes);
        if update.is_empty() {
            debug!("Nothing to write");
            return self.get_producer(producer.id).await;
        }

        self.producers.update(&update).await.map_err(|e| {
            if e.is_not_found() {
                PortError::not_found("Producer", producer.id)
            } else {
                e.into()
            }
        })?;
        debug!(fields = ?changes, "Producer rows updated");

        self.get_producer(producer.id).await
    }

    #[instrument(skip(self), fields(producer_id = %id))]
    async fn delete_producer(&self, id: ProducerId) -> Result<(), PortError> {
        if !self.producers.delete(id.get()).await? {
            return Err(PortError::not_found("Producer", id));
        }
        Ok(())
    }

    async fn tax_id_taken(
        &self,
        kind: TaxIdKind,
        value: &str,
        exclude: Option<ProducerId>,
    ) -> Result<bool, PortError> {
        let column = match kind {
            TaxIdKind::Individual => TaxIdColumn::Cpf,
            TaxIdKind::Company => TaxIdColumn::Cnpj,
        };
        Ok(self
            .producers
            .tax_id_taken(column, value, exclude.map(ProducerId::get))
            .await?)
    }

    async fn city_exists(&self, id: CityId) -> Result<bool, PortError> {
        Ok(self.reference.city_exists(id.get()).await?)
    }

    async fn existing_crops(&self, ids: &[CropId]) -> Result<BTreeSet<CropId>, PortError> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let existing = self.reference.existing_crops(&raw).await?;
        Ok(existing.into_iter().map(CropId::new).collect())
    }

    async fn list_crops(&self) -> Result<Vec<Crop>, PortError> {
        let rows = self.reference.list_crops().await?;
        Ok(rows
            .into_iter()
            .map(|row| Crop {
                id: CropId::new(row.id),
                name: row.name,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn farm_statistics(&self) -> Result<FarmStatistics, PortError> {
        let totals = self.producers.farm_totals().await?;
        let crops = self.producers.farms_per_crop().await?;
        let states = self.producers.farms_per_state().await?;

        Ok(FarmStatistics {
            total_farms: totals.total_farms,
            total_area: to_hectares(totals.total_area),
            total_arable: to_hectares(totals.total_arable),
            total_vegetation: to_hectares(totals.total_vegetation),
            crops: crops
                .into_iter()
                .map(|row| NamedCount::new(row.name, row.total))
                .collect(),
            states: states
                .into_iter()
                .map(|row| NamedCount::new(row.name, row.total))
                .collect(),
        })
    }
}

// ============================================================================
// Row conversions
// ============================================================================

fn record_to_producer(record: ProducerWithCrops) -> Producer {
    let row = record.producer;
    Producer {
        id: ProducerId::new(row.producer_id),
        name: row.producer_name,
        cpf: row.cpf,
        cnpj: row.cnpj,
        farm: Farm {
            id: FarmId::new(row.farm_id),
            name: row.farm_name,
            city_id: CityId::new(row.city_id),
            areas: FarmAreas::new(row.total_area_ha, row.arable_area_ha, row.vegetation_area_ha),
            crops: record.crops.into_iter().map(CropId::new).collect(),
        },
    }
}

/// Maps a change set to the rows that need rewriting
fn build_update(producer: &Producer, changes: &ChangeSet) -> ProducerUpdate {
    let farm = &producer.farm;
    ProducerUpdate {
        producer_id: producer.id.get(),
        farm_id: farm.id.get(),
        producer: (!changes.producer.is_empty()).then(|| ProducerColumns {
            name: producer.name.clone(),
            cpf: producer.cpf.clone(),
            cnpj: producer.cnpj.clone(),
        }),
        farm: changes.touches_farm_row().then(|| FarmColumns {
            name: farm.name.clone(),
            city_id: farm.city_id.get(),
            total_area_ha: farm.areas.total,
            arable_area_ha: farm.areas.arable,
            vegetation_area_ha: farm.areas.vegetation,
        }),
        crops: changes
            .touches_farm(FarmField::Crops)
            .then(|| farm.crops.iter().map(|c| c.get()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_rural::ProducerField;
    use rust_decimal_macros::dec;

    fn producer() -> Producer {
        Producer {
            id: ProducerId::new(7),
            name: "Fulano".to_string(),
            cpf: Some("12345678909".to_string()),
            cnpj: None,
            farm: Farm {
                id: FarmId::new(3),
                name: "Fazenda Boa Vista".to_string(),
                city_id: CityId::new(1),
                areas: FarmAreas::new(dec!(100), dec!(80), dec!(20)),
                crops: [CropId::new(2), CropId::new(1)].into_iter().collect(),
            },
        }
    }

    #[test]
    fn test_empty_change_set_writes_nothing() {
        let update = build_update(&producer(), &ChangeSet::default());
        assert!(update.is_empty());
        assert_eq!(update.producer_id, 7);
        assert_eq!(update.farm_id, 3);
    }

    #[test]
    fn test_crop_change_only_rewrites_crops() {
        let changes = ChangeSet {
            producer: Vec::new(),
            farm: vec![FarmField::Crops],
        };
        let update = build_update(&producer(), &changes);
        assert!(update.producer.is_none());
        assert!(update.farm.is_none());
        assert_eq!(update.crops, Some(vec![1, 2]));
    }

    #[test]
    fn test_name_and_area_changes() {
        let changes = ChangeSet {
            producer: vec![ProducerField::Name],
            farm: vec![FarmField::ArableArea],
        };
        let update = build_update(&producer(), &changes);
        assert_eq!(update.producer.map(|p| p.name), Some("Fulano".to_string()));
        let farm = update.farm.expect("farm row rewritten");
        assert_eq!(farm.arable_area_ha, dec!(80.00));
        assert!(update.crops.is_none());
    }
}
