//! Rural domain services
//!
//! [`ProducerService`] runs the write pipeline of a producer request:
//!
//! 1. Clean the fields and collect every field error, including the ones that
//!    need storage (uniqueness, city and crop existence)
//! 2. Check the farm's area invariant when the farm payload carries all three
//!    areas, reported under the farm key
//! 3. Apply the identity rule, aware of the stored producer on updates
//! 4. On partial updates, check the area invariant against the merged values
//! 5. Persist through the port in one unit of work

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::{HealthCheckResult, ProducerId};

use crate::error::{ErrorLocation, RuralError, ValidationError, ValidationErrors};
use crate::farm::FarmField;
use crate::merge::{FarmChanges, ProducerChanges};
use crate::ports::{ProducerPort, ProducerPortExt};
use crate::producer::Producer;
use crate::request::{ProducerInput, WriteMode};
use crate::statistics::FarmStatistics;
use crate::tax_id::TaxIdKind;

/// Application service for rural producers
#[derive(Clone)]
pub struct ProducerService {
    port: Arc<dyn ProducerPort>,
}

impl ProducerService {
    /// Creates a service over a storage port
    pub fn new(port: Arc<dyn ProducerPort>) -> Self {
        Self { port }
    }

    /// Lists all producers
    pub async fn list(&self) -> Result<Vec<Producer>, RuralError> {
        Ok(self.port.list_producers().await?)
    }

    /// Retrieves one producer
    ///
    /// # Errors
    ///
    /// Returns `RuralError::ProducerNotFound` when no producer has the id
    pub async fn get(&self, id: ProducerId) -> Result<Producer, RuralError> {
        self.port.get_producer(id).await.map_err(|e| {
            if e.is_not_found() {
                RuralError::ProducerNotFound(id)
            } else {
                e.into()
            }
        })
    }

    /// Validates and stores a new producer with its farm
    ///
    /// Every field error is collected before anything is returned, so one
    /// response lists all problems with the request.
    ///
    /// # Arguments
    ///
    /// * `input` - The decoded request body; absent fields are reported as required
    ///
    /// # Returns
    ///
    /// The stored producer with the ids assigned to it and its farm
    ///
    /// # Errors
    ///
    /// - `RuralError::Validation` for field, farm-level and identity errors
    /// - `RuralError::Conflict` when a concurrent write took the CPF or CNPJ
    ///   after the uniqueness check
    /// - `RuralError::Storage` when the port fails
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let service = ProducerService::new(Arc::new(MockProducerPort::new()));
    /// let producer = service.create(input).await?;
    /// assert!(producer.cpf.is_some() ^ producer.cnpj.is_some());
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ProducerInput) -> Result<Producer, RuralError> {
        let changes = self.validate(input, WriteMode::Create, None).await?;
        let new_producer = changes
            .into_new_producer()
            .map_err(|location| RuralError::invalid(location, ValidationError::Required))?;

        let producer = self.port.create_producer(new_producer).await?;
        info!(producer_id = %producer.id, farm_id = %producer.farm.id, "Producer created");
        Ok(producer)
    }

    /// Replaces a producer and its farm (PUT)
    ///
    /// All fields are required, as on create. The crop set is replaced even
    /// when the new list is empty.
    ///
    /// # Arguments
    ///
    /// * `id` - The producer to replace
    /// * `input` - The full request body
    ///
    /// # Errors
    ///
    /// Returns `RuralError::ProducerNotFound` for an unknown id, otherwise the
    /// same errors as [`ProducerService::create`]. Giving a CPF holder a CNPJ
    /// (or the reverse) is a `non_field_errors` validation error.
    #[instrument(skip(self, input))]
    pub async fn replace(&self, id: ProducerId, input: ProducerInput) -> Result<Producer, RuralError> {
        self.update(id, input, WriteMode::Replace).await
    }

    /// Updates only the supplied fields (PATCH)
    ///
    /// Absent fields keep their stored value. The area invariant and the
    /// identity rule are checked against the merged producer, so sending only
    /// `area_agricultavel_hectares` can still fail.
    ///
    /// # Arguments
    ///
    /// * `id` - The producer to update
    /// * `input` - The fields to change
    ///
    /// # Returns
    ///
    /// The stored producer, unchanged when the request changes nothing
    ///
    /// # Errors
    ///
    /// Same as [`ProducerService::replace`]
    #[instrument(skip(self, input))]
    pub async fn partial_update(
        &self,
        id: ProducerId,
        input: ProducerInput,
    ) -> Result<Producer, RuralError> {
        self.update(id, input, WriteMode::Partial).await
    }

    /// Deletes a producer; its farm is kept
    ///
    /// # Errors
    ///
    /// Returns `RuralError::ProducerNotFound` when no producer has the id
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProducerId) -> Result<(), RuralError> {
        self.port.delete_producer(id).await.map_err(|e| {
            if e.is_not_found() {
                RuralError::ProducerNotFound(id)
            } else {
                e.into()
            }
        })?;
        info!(producer_id = %id, "Producer deleted");
        Ok(())
    }

    /// Dashboard aggregates over all farms
    ///
    /// Farms whose producer was deleted are still counted.
    pub async fn statistics(&self) -> Result<FarmStatistics, RuralError> {
        Ok(self.port.farm_statistics().await?)
    }

    /// Health of the underlying storage port
    pub async fn health_check(&self) -> HealthCheckResult {
        self.port.health_check().await
    }

    async fn update(
        &self,
        id: ProducerId,
        input: ProducerInput,
        mode: WriteMode,
    ) -> Result<Producer, RuralError> {
        let stored = self.get(id).await?;
        let changes = self.validate(input, mode, Some(&stored)).await?;

        let (merged, change_set) = stored.apply(&changes);
        if mode.is_partial() {
            // A partial update may clear the only identifier left
            merged
                .validate_identity()
                .map_err(|e| RuralError::invalid(ErrorLocation::Producer, e))?;
        }
        if change_set.is_empty() {
            debug!(producer_id = %id, "Update changes nothing");
            return Ok(stored);
        }

        let producer = self.port.update_producer(&merged, &change_set).await?;
        info!(
            producer_id = %id,
            producer_fields = ?change_set.producer,
            farm_fields = ?change_set.farm,
            "Producer updated"
        );
        Ok(producer)
    }

    /// Runs the validation pipeline and returns the cleaned changes
    async fn validate(
        &self,
        input: ProducerInput,
        mode: WriteMode,
        stored: Option<&Producer>,
    ) -> Result<ProducerChanges, RuralError> {
        let (changes, mut errors) = input.clean(mode);

        self.check_unique(&changes, stored.map(|p| p.id), &mut errors)
            .await?;
        if let Some(farm) = &changes.farm {
            self.check_references(farm, &mut errors).await?;
            if !errors.has_farm_errors() {
                if let Some(areas) = farm.complete_areas() {
                    if areas.exceeds_total() {
                        errors.add(ErrorLocation::Farm, ValidationError::AreaExceedsTotal);
                    }
                }
            }
        }
        if !errors.is_empty() {
            warn!(mode = ?mode, errors = %errors, "Producer request rejected");
        }
        errors.into_result()?;

        check_identity(&changes, mode, stored)?;

        if let (WriteMode::Partial, Some(stored)) = (mode, stored) {
            let areas = changes
                .farm
                .as_ref()
                .map_or(stored.farm.areas, |farm| farm.merged_areas(&stored.farm.areas));
            if areas.exceeds_total() {
                return Err(RuralError::invalid(
                    ErrorLocation::Producer,
                    ValidationError::AreaExceedsTotal,
                ));
            }
        }

        Ok(changes)
    }

    async fn check_unique(
        &self,
        changes: &ProducerChanges,
        exclude: Option<ProducerId>,
        errors: &mut ValidationErrors,
    ) -> Result<(), RuralError> {
        let candidates = [
            (TaxIdKind::Individual, changes.new_cpf()),
            (TaxIdKind::Company, changes.new_cnpj()),
        ];
        for (kind, value) in candidates {
            let Some(value) = value else { continue };
            if self.port.tax_id_taken(kind, value, exclude).await? {
                errors.add(
                    ErrorLocation::ProducerField(kind.field()),
                    ValidationError::DuplicateTaxId(kind),
                );
            }
        }
        Ok(())
    }

    async fn check_references(
        &self,
        farm: &FarmChanges,
        errors: &mut ValidationErrors,
    ) -> Result<(), RuralError> {
        if let Some(city) = farm.city_id {
            if !self.port.city_exists(city).await? {
                errors.add(
                    ErrorLocation::FarmField(FarmField::City.payload_name()),
                    ValidationError::UnknownReference(city.get()),
                );
            }
        }
        if let Some(crops) = &farm.crops {
            let ids: Vec<_> = crops.iter().copied().collect();
            // Only the first unknown id is reported, like any other invalid field
            if let Some(missing) = self.port.missing_crops(&ids).await?.first() {
                errors.add(
                    ErrorLocation::FarmField(FarmField::Crops.payload_name()),
                    ValidationError::UnknownReference(missing.get()),
                );
            }
        }
        Ok(())
    }
}

/// Applies the identity rule with awareness of the stored producer
///
/// An update may not give a producer the other kind of identifier, so a CPF
/// holder cannot receive a CNPJ and vice versa. Partial updates may omit both.
fn check_identity(
    changes: &ProducerChanges,
    mode: WriteMode,
    stored: Option<&Producer>,
) -> Result<(), RuralError> {
    let cpf = changes.new_cpf();
    let cnpj = changes.new_cnpj();

    let switches_kind = stored.is_some_and(|p| p.switches_identity(cpf, cnpj));
    if (cpf.is_some() && cnpj.is_some()) || switches_kind {
        return Err(RuralError::invalid(
            ErrorLocation::Producer,
            ValidationError::IdentityConflict,
        ));
    }
    if cpf.is_none() && cnpj.is_none() && !mode.is_partial() {
        return Err(RuralError::invalid(
            ErrorLocation::Producer,
            ValidationError::IdentityMissing,
        ));
    }
    Ok(())
}
