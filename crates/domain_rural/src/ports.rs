//! Rural Domain Ports
//!
//! This module defines the storage port of the rural domain. The
//! [`ProducerService`](crate::services::ProducerService) only talks to a
//! `dyn ProducerPort`, so the PostgreSQL adapter in `infra_db` and the
//! in-memory adapter below are interchangeable.
//!
//! # Contract
//!
//! Every adapter must:
//!
//! - write a producer and its farm atomically, so a failed write leaves no row
//!   behind
//! - run the identity rule and the area invariant before writing
//! - report a duplicate CPF or CNPJ as `PortError::Conflict`, even when the
//!   service's pre-check passed
//! - keep the farm when its producer is deleted
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_rural::{ProducerPort, ProducerService};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ProducerPort> = Arc::new(PostgresProducerAdapter::new(pool));
//! let service = ProducerService::new(port);
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;

use core_kernel::{CityId, CropId, DomainPort, HealthCheckable, PortError, ProducerId};

use crate::crop::Crop;
use crate::merge::ChangeSet;
use crate::producer::{NewProducer, Producer};
use crate::statistics::FarmStatistics;
use crate::tax_id::TaxIdKind;

/// Storage operations the rural domain needs
#[async_trait]
pub trait ProducerPort: DomainPort + HealthCheckable {
    // ========================================================================
    // Producers
    // ========================================================================

    /// Lists every producer with its farm, ordered by id
    async fn list_producers(&self) -> Result<Vec<Producer>, PortError>;

    /// Retrieves a producer by id
    ///
    /// # Returns
    ///
    /// The producer with its farm, or `PortError::NotFound`
    async fn get_producer(&self, id: ProducerId) -> Result<Producer, PortError>;

    /// Inserts the farm, its crops and the producer in one unit of work
    ///
    /// # Returns
    ///
    /// The stored producer with the ids assigned by the storage layer
    async fn create_producer(&self, producer: NewProducer) -> Result<Producer, PortError>;

    /// Writes a merged producer
    ///
    /// # Arguments
    ///
    /// * `producer` - The producer after the merge, carrying its stored ids
    /// * `changes` - The fields that differ from the stored values
    async fn update_producer(
        &self,
        producer: &Producer,
        changes: &ChangeSet,
    ) -> Result<Producer, PortError>;

    /// Deletes a producer, keeping its farm
    async fn delete_producer(&self, id: ProducerId) -> Result<(), PortError>;

    /// Returns true if another producer already holds the identifier
    ///
    /// # Arguments
    ///
    /// * `kind` - Whether `value` is a CPF or a CNPJ
    /// * `value` - The digits-only identifier
    /// * `exclude` - The producer being updated, which may keep its own identifier
    async fn tax_id_taken(
        &self,
        kind: TaxIdKind,
        value: &str,
        exclude: Option<ProducerId>,
    ) -> Result<bool, PortError>;

    // ========================================================================
    // Reference data
    // ========================================================================

    /// Returns true if the city exists
    async fn city_exists(&self, id: CityId) -> Result<bool, PortError>;

    /// Returns the subset of `ids` that exist
    async fn existing_crops(&self, ids: &[CropId]) -> Result<BTreeSet<CropId>, PortError>;

    /// Lists the crop catalogue ordered by name
    async fn list_crops(&self) -> Result<Vec<Crop>, PortError>;

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Computes the dashboard aggregates over all farms
    async fn farm_statistics(&self) -> Result<FarmStatistics, PortError>;
}

/// Extension trait for ProducerPort with convenience methods
#[async_trait]
pub trait ProducerPortExt: ProducerPort {
    /// Crop ids that do not exist, in the order they were given
    async fn missing_crops(&self, ids: &[CropId]) -> Result<Vec<CropId>, PortError> {
        let existing = self.existing_crops(ids).await?;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect())
    }
}

// Blanket implementation for all ProducerPort implementors
impl<T: ProducerPort + ?Sized> ProducerPortExt for T {}

/// In-memory implementation of ProducerPort for testing
///
/// All state sits behind one lock, and every write checks its constraints
/// before touching anything, so a rejected write leaves no trace.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, FarmId, HealthCheckResult, StateId};

    use crate::farm::Farm;
    use crate::location::{City, State};

    #[derive(Debug, Clone)]
    struct StoredProducer {
        id: ProducerId,
        name: String,
        cpf: Option<String>,
        cnpj: Option<String>,
        farm_id: FarmId,
    }

    #[derive(Debug, Default)]
    struct MockState {
        states: BTreeMap<StateId, State>,
        cities: BTreeMap<CityId, City>,
        crops: BTreeMap<CropId, Crop>,
        farms: BTreeMap<FarmId, Farm>,
        producers: BTreeMap<ProducerId, StoredProducer>,
        last_id: i64,
        /// `tax_id_taken` answers false while writes still enforce uniqueness
        stale_uniqueness_reads: bool,
    }

    impl MockState {
        fn next_id(&mut self) -> i64 {
            self.last_id += 1;
            self.last_id
        }

        fn assemble(&self, stored: &StoredProducer) -> Result<Producer, PortError> {
            let farm = self.farms.get(&stored.farm_id).cloned().ok_or_else(|| {
                PortError::internal(format!("farm {} of producer {} is missing", stored.farm_id, stored.id))
            })?;
            Ok(Producer {
                id: stored.id,
                name: stored.name.clone(),
                cpf: stored.cpf.clone(),
                cnpj: stored.cnpj.clone(),
                farm,
            })
        }

        fn taken(&self, kind: TaxIdKind, value: &str, exclude: Option<ProducerId>) -> bool {
            self.producers.values().any(|p| {
                let stored = match kind {
                    TaxIdKind::Individual => p.cpf.as_deref(),
                    TaxIdKind::Company => p.cnpj.as_deref(),
                };
                Some(p.id) != exclude && stored == Some(value)
            })
        }

        /// Constraint checks shared by inserts and updates
        fn check_row(
            &self,
            cpf: Option<&str>,
            cnpj: Option<&str>,
            farm_city: CityId,
            farm_crops: &BTreeSet<CropId>,
            exclude: Option<ProducerId>,
        ) -> Result<(), PortError> {
            crate::producer::validate_identity(cpf, cnpj)
                .map_err(|e| PortError::validation(e.to_string()))?;

            if !self.cities.contains_key(&farm_city) {
                return Err(PortError::validation_field(
                    format!("city {farm_city} does not exist"),
                    "cidade",
                ));
            }
            if let Some(crop) = farm_crops.iter().find(|c| !self.crops.contains_key(c)) {
                return Err(PortError::validation_field(
                    format!("crop {crop} does not exist"),
                    "culturas_plantadas",
                ));
            }

            for (kind, value) in [(TaxIdKind::Individual, cpf), (TaxIdKind::Company, cnpj)] {
                if let Some(value) = value {
                    if self.taken(kind, value, exclude) {
                        return Err(PortError::conflict(format!(
                            "producer with {} {} already exists",
                            kind.label(),
                            value
                        )));
                    }
                }
            }
            Ok(())
        }
    }

    /// In-memory mock implementation of ProducerPort
    #[derive(Debug, Clone, Default)]
    pub struct MockProducerPort {
        state: Arc<RwLock<MockState>>,
    }

    impl MockProducerPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a state
        pub async fn add_state(&self, name: &str, code: &str) -> State {
            let mut state = self.state.write().await;
            let entry = State {
                id: StateId::new(state.next_id()),
                name: name.to_string(),
                code: code.to_string(),
            };
            state.states.insert(entry.id, entry.clone());
            entry
        }

        /// Adds a city in an existing state
        pub async fn add_city(&self, name: &str, state_id: StateId) -> City {
            let mut state = self.state.write().await;
            let entry = City {
                id: CityId::new(state.next_id()),
                name: name.to_string(),
                state_id,
            };
            state.cities.insert(entry.id, entry.clone());
            entry
        }

        /// Adds a crop
        pub async fn add_crop(&self, name: &str) -> Crop {
            let mut state = self.state.write().await;
            let entry = Crop {
                id: CropId::new(state.next_id()),
                name: name.to_string(),
            };
            state.crops.insert(entry.id, entry.clone());
            entry
        }

        /// Adds the crops a fresh installation starts with
        pub async fn seed_initial_crops(&self) -> Vec<Crop> {
            let mut crops = Vec::with_capacity(crate::crop::INITIAL_CROPS.len());
            for name in crate::crop::INITIAL_CROPS {
                crops.push(self.add_crop(name).await);
            }
            crops
        }

        /// Number of stored farms, including those whose producer was deleted
        pub async fn farm_count(&self) -> usize {
            self.state.read().await.farms.len()
        }

        /// Number of stored producers
        pub async fn producer_count(&self) -> usize {
            self.state.read().await.producers.len()
        }

        /// Makes `tax_id_taken` miss existing identifiers, as it would when
        /// another writer commits between the check and the insert. Writes
        /// keep rejecting duplicates with `PortError::Conflict`.
        pub async fn serve_stale_uniqueness_reads(&self) {
            self.state.write().await.stale_uniqueness_reads = true;
        }
    }

    impl DomainPort for MockProducerPort {}

    #[async_trait]
    impl HealthCheckable for MockProducerPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-producer-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ProducerPort for MockProducerPort {
        async fn list_producers(&self) -> Result<Vec<Producer>, PortError> {
            let state = self.state.read().await;
            state.producers.values().map(|p| state.assemble(p)).collect()
        }

        async fn get_producer(&self, id: ProducerId) -> Result<Producer, PortError> {
            let state = self.state.read().await;
            let stored = state
                .producers
                .get(&id)
                .ok_or_else(|| PortError::not_found("Producer", id))?;
            state.assemble(stored)
        }

        async fn create_producer(&self, producer: NewProducer) -> Result<Producer, PortError> {
            let mut state = self.state.write().await;

            producer
                .farm
                .validate()
                .map_err(|e| PortError::validation(e.to_string()))?;
            state.check_row(
                producer.cpf.as_deref(),
                producer.cnpj.as_deref(),
                producer.farm.city_id,
                &producer.farm.crops,
                None,
            )?;

            let farm = producer.farm.with_id(FarmId::new(state.next_id()));
            let stored = StoredProducer {
                id: ProducerId::new(state.next_id()),
                name: producer.name,
                cpf: producer.cpf,
                cnpj: producer.cnpj,
                farm_id: farm.id,
            };
            state.farms.insert(farm.id, farm);
            state.producers.insert(stored.id, stored.clone());
            state.assemble(&stored)
        }

        async fn update_producer(
            &self,
            producer: &Producer,
            changes: &ChangeSet,
        ) -> Result<Producer, PortError> {
            let mut state = self.state.write().await;
            let current = state
                .producers
                .get(&producer.id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Producer", producer.id))?;
            if current.farm_id != producer.farm.id {
                return Err(PortError::validation("farm of a producer cannot be replaced"));
            }
            if changes.is_empty() {
                return state.assemble(&current);
            }

            producer
                .farm
                .validate()
                .map_err(|e| PortError::validation(e.to_string()))?;
            state.check_row(
                producer.cpf.as_deref(),
                producer.cnpj.as_deref(),
                producer.farm.city_id,
                &producer.farm.crops,
                Some(producer.id),
            )?;

            state.farms.insert(producer.farm.id, producer.farm.clone());
            let stored = StoredProducer {
                id: producer.id,
                name: producer.name.clone(),
                cpf: producer.cpf.clone(),
                cnpj: producer.cnpj.clone(),
                farm_id: producer.farm.id,
            };
            state.producers.insert(stored.id, stored.clone());
            state.assemble(&stored)
        }

        async fn delete_producer(&self, id: ProducerId) -> Result<(), PortError> {
            self.state
                .write()
                .await
                .producers
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Producer", id))
        }

        async fn tax_id_taken(
            &self,
            kind: TaxIdKind,
            value: &str,
            exclude: Option<ProducerId>,
        ) -> Result<bool, PortError> {
            let state = self.state.read().await;
            Ok(!state.stale_uniqueness_reads && state.taken(kind, value, exclude))
        }

        async fn city_exists(&self, id: CityId) -> Result<bool, PortError> {
            Ok(self.state.read().await.cities.contains_key(&id))
        }

        async fn existing_crops(&self, ids: &[CropId]) -> Result<BTreeSet<CropId>, PortError> {
            let state = self.state.read().await;
            Ok(ids
                .iter()
                .copied()
                .filter(|id| state.crops.contains_key(id))
                .collect())
        }

        async fn list_crops(&self) -> Result<Vec<Crop>, PortError> {
            let mut crops: Vec<_> = self.state.read().await.crops.values().cloned().collect();
            crops.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(crops)
        }

        async fn farm_statistics(&self) -> Result<FarmStatistics, PortError> {
            let state = self.state.read().await;
            let crops: Vec<_> = state.crops.values().cloned().collect();
            let cities: Vec<_> = state.cities.values().cloned().collect();
            let states: Vec<_> = state.states.values().cloned().collect();
            Ok(FarmStatistics::from_farms(
                state.farms.values(),
                &crops,
                &cities,
                &states,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockProducerPort;
    use super::*;
    use rust_decimal_macros::dec;

    use crate::farm::{FarmAreas, NewFarm};

    async fn seeded() -> (MockProducerPort, CityId, Vec<Crop>) {
        let port = MockProducerPort::new();
        let state = port.add_state("São Paulo", "SP").await;
        let city = port.add_city("Campinas", state.id).await;
        let crops = port.seed_initial_crops().await;
        (port, city.id, crops)
    }

    fn new_producer(city: CityId, crops: &[Crop], cpf: &str) -> NewProducer {
        NewProducer {
            name: "Produtor".to_string(),
            cpf: Some(cpf.to_string()),
            cnpj: None,
            farm: NewFarm {
                name: "Fazenda".to_string(),
                city_id: city,
                areas: FarmAreas::new(dec!(100), dec!(80), dec!(20)),
                crops: crops.iter().take(2).map(|c| c.id).collect(),
            },
        }
    }

    #[tokio::test]
    async fn test_mock_create_and_get() {
        let (port, city, crops) = seeded().await;

        let created = port
            .create_producer(new_producer(city, &crops, "12345678909"))
            .await
            .unwrap();
        let fetched = port.get_producer(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.farm.crops.len(), 2);
        assert_eq!(port.list_producers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_duplicate_leaves_no_farm() {
        let (port, city, crops) = seeded().await;
        port.create_producer(new_producer(city, &crops, "12345678909"))
            .await
            .unwrap();

        let result = port
            .create_producer(new_producer(city, &crops, "12345678909"))
            .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(port.farm_count().await, 1);
        assert_eq!(port.producer_count().await, 1);
    }

    #[tokio::test]
    async fn test_stale_uniqueness_reads_still_reject_duplicate_writes() {
        let (port, city, crops) = seeded().await;
        port.create_producer(new_producer(city, &crops, "12345678909"))
            .await
            .unwrap();
        port.serve_stale_uniqueness_reads().await;

        assert!(!port
            .tax_id_taken(TaxIdKind::Individual, "12345678909", None)
            .await
            .unwrap());
        let result = port
            .create_producer(new_producer(city, &crops, "12345678909"))
            .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(port.farm_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_rejects_identity_violation() {
        let (port, city, crops) = seeded().await;
        let mut producer = new_producer(city, &crops, "12345678909");
        producer.cnpj = Some("40993392000151".to_string());

        let result = port.create_producer(producer).await;
        assert!(matches!(result, Err(PortError::Validation { .. })));
        assert_eq!(port.farm_count().await, 0);
    }

    #[tokio::test]
    async fn test_mock_delete_keeps_farm() {
        let (port, city, crops) = seeded().await;
        let created = port
            .create_producer(new_producer(city, &crops, "12345678909"))
            .await
            .unwrap();

        port.delete_producer(created.id).await.unwrap();

        assert!(port.get_producer(created.id).await.unwrap_err().is_not_found());
        assert_eq!(port.farm_count().await, 1);
        assert!(port.delete_producer(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_tax_id_taken_excludes_self() {
        let (port, city, crops) = seeded().await;
        let created = port
            .create_producer(new_producer(city, &crops, "12345678909"))
            .await
            .unwrap();

        assert!(port
            .tax_id_taken(TaxIdKind::Individual, "12345678909", None)
            .await
            .unwrap());
        assert!(!port
            .tax_id_taken(TaxIdKind::Individual, "12345678909", Some(created.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_missing_crops_keeps_input_order() {
        let (port, _, crops) = seeded().await;
        let ids = [CropId::new(999), crops[0].id, CropId::new(998)];

        let missing = port.missing_crops(&ids).await.unwrap();
        assert_eq!(missing, vec![CropId::new(999), CropId::new(998)]);
    }
}
