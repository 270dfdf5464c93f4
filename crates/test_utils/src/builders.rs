//! Test Data Builders
//!
//! Builders for producer request payloads. Tests set only the fields they
//! care about; everything else gets a valid default. Hectare values are
//! emitted as JSON numbers unless set with the `_str` variants.

use serde_json::{json, Map, Value};

use core_kernel::{CityId, CropId};

use crate::fixtures::VALID_CPF;

/// Builder for the `fazenda` object of a producer payload
#[derive(Debug, Clone)]
pub struct FarmPayloadBuilder {
    fields: Map<String, Value>,
}

impl FarmPayloadBuilder {
    /// A farm of 100 ha with 80 ha arable and 20 ha vegetation and no crops
    pub fn new(city: CityId) -> Self {
        let mut fields = Map::new();
        fields.insert("nome".into(), json!("Fazenda Boa Vista"));
        fields.insert("cidade".into(), json!(city.get()));
        fields.insert("area_total_hectares".into(), json!(100));
        fields.insert("area_agricultavel_hectares".into(), json!(80));
        fields.insert("area_vegetacao_hectares".into(), json!(20));
        fields.insert("culturas_plantadas".into(), json!([]));
        Self { fields }
    }

    /// Starts from an empty object, for partial updates
    pub fn empty() -> Self {
        Self { fields: Map::new() }
    }

    pub fn name(self, name: &str) -> Self {
        self.set("nome", json!(name))
    }

    pub fn city(self, city: CityId) -> Self {
        self.set("cidade", json!(city.get()))
    }

    /// Sets the three areas as JSON numbers
    pub fn areas(self, total: f64, arable: f64, vegetation: f64) -> Self {
        self.set("area_total_hectares", json!(total))
            .set("area_agricultavel_hectares", json!(arable))
            .set("area_vegetacao_hectares", json!(vegetation))
    }

    /// Sets the three areas as JSON strings
    pub fn areas_str(self, total: &str, arable: &str, vegetation: &str) -> Self {
        self.set("area_total_hectares", json!(total))
            .set("area_agricultavel_hectares", json!(arable))
            .set("area_vegetacao_hectares", json!(vegetation))
    }

    pub fn arable(self, arable: f64) -> Self {
        self.set("area_agricultavel_hectares", json!(arable))
    }

    pub fn crops(self, crops: &[CropId]) -> Self {
        let ids: Vec<i64> = crops.iter().map(|c| c.get()).collect();
        self.set("culturas_plantadas", json!(ids))
    }

    /// Sets any field to a raw JSON value
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Removes a field
    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for a producer payload
#[derive(Debug, Clone)]
pub struct ProducerPayloadBuilder {
    fields: Map<String, Value>,
}

impl ProducerPayloadBuilder {
    /// An individual producer holding [`VALID_CPF`] with a default farm
    pub fn new(city: CityId) -> Self {
        let mut fields = Map::new();
        fields.insert("nome".into(), json!("Fulano de Tal"));
        fields.insert("cpf".into(), json!(VALID_CPF));
        fields.insert("fazenda".into(), FarmPayloadBuilder::new(city).build());
        Self { fields }
    }

    /// Starts from an empty object, for partial updates
    pub fn empty() -> Self {
        Self { fields: Map::new() }
    }

    pub fn name(self, name: &str) -> Self {
        self.set("nome", json!(name))
    }

    /// Sets the CPF and removes the CNPJ
    pub fn cpf(self, cpf: &str) -> Self {
        self.set("cpf", json!(cpf)).without("cnpj")
    }

    /// Sets the CNPJ and removes the CPF
    pub fn cnpj(self, cnpj: &str) -> Self {
        self.set("cnpj", json!(cnpj)).without("cpf")
    }

    /// Removes both identifiers
    pub fn without_ids(self) -> Self {
        self.without("cpf").without("cnpj")
    }

    pub fn farm(self, farm: FarmPayloadBuilder) -> Self {
        self.set("fazenda", farm.build())
    }

    /// Sets any field to a raw JSON value
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Removes a field
    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}
