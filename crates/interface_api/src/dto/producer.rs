//! Rural producer DTOs
//!
//! Request bodies keep every field optional so that missing fields are
//! reported by the domain as field errors instead of failing to decode.
//! Hectare values are accepted as JSON numbers or strings and always
//! returned as strings with two decimal places.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use core_kernel::{CityId, CropId, FarmId, ProducerId};
use domain_rural::farm::to_hectares;
use domain_rural::{Farm, FarmInput, Producer, ProducerInput};

#[derive(Debug, Default, Deserialize)]
pub struct ProducerRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    /// Absent, `null` and `""` are three different things on updates
    #[serde(default, deserialize_with = "nullable")]
    pub cpf: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cnpj: Option<Option<String>>,
    #[serde(rename = "fazenda")]
    pub farm: Option<FarmRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FarmRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<CityId>,
    #[serde(rename = "area_total_hectares", default, deserialize_with = "hectares")]
    pub total_area: Option<Decimal>,
    #[serde(rename = "area_agricultavel_hectares", default, deserialize_with = "hectares")]
    pub arable_area: Option<Decimal>,
    #[serde(rename = "area_vegetacao_hectares", default, deserialize_with = "hectares")]
    pub vegetation_area: Option<Decimal>,
    #[serde(rename = "culturas_plantadas")]
    pub crops: Option<Vec<CropId>>,
}

impl From<ProducerRequest> for ProducerInput {
    fn from(request: ProducerRequest) -> Self {
        ProducerInput {
            name: request.name,
            cpf: request.cpf,
            cnpj: request.cnpj,
            farm: request.farm.map(FarmInput::from),
        }
    }
}

impl From<FarmRequest> for FarmInput {
    fn from(request: FarmRequest) -> Self {
        FarmInput {
            name: request.name,
            city: request.city,
            total_area: request.total_area,
            arable_area: request.arable_area,
            vegetation_area: request.vegetation_area,
            crops: request.crops,
        }
    }
}

/// Present keys become `Some`, so `null` decodes to `Some(None)`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn hectares<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<NumberOrString>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = match value {
        NumberOrString::Number(number) => number.to_string(),
        NumberOrString::Text(text) => text,
    };
    parse_decimal(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("Um número válido é necessário: {raw:?}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerResponse {
    pub id: ProducerId,
    pub nome: String,
    pub cnpj: Option<String>,
    pub cpf: Option<String>,
    pub fazenda: FarmResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmResponse {
    pub id: FarmId,
    pub nome: String,
    pub cidade: CityId,
    pub area_total_hectares: String,
    pub area_agricultavel_hectares: String,
    pub area_vegetacao_hectares: String,
    /// Ascending crop ids
    pub culturas_plantadas: Vec<CropId>,
}

/// Formats a hectare value as `"100.00"`
pub fn format_hectares(value: Decimal) -> String {
    to_hectares(value).to_string()
}

impl From<Farm> for FarmResponse {
    fn from(farm: Farm) -> Self {
        FarmResponse {
            id: farm.id,
            nome: farm.name,
            cidade: farm.city_id,
            area_total_hectares: format_hectares(farm.areas.total),
            area_agricultavel_hectares: format_hectares(farm.areas.arable),
            area_vegetacao_hectares: format_hectares(farm.areas.vegetation),
            culturas_plantadas: farm.crops.into_iter().collect(),
        }
    }
}

impl From<Producer> for ProducerResponse {
    fn from(producer: Producer) -> Self {
        ProducerResponse {
            id: producer.id,
            nome: producer.name,
            cnpj: producer.cnpj,
            cpf: producer.cpf,
            fazenda: producer.farm.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use domain_rural::FarmAreas;

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let request: ProducerRequest =
            serde_json::from_value(json!({"cpf": null, "cnpj": "40993392000151"})).unwrap();
        assert_eq!(request.cpf, Some(None));
        assert_eq!(request.cnpj, Some(Some("40993392000151".to_string())));

        let request: ProducerRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.cpf, None);
        assert!(request.farm.is_none());
    }

    #[test]
    fn test_hectares_accept_numbers_and_strings() {
        let farm: FarmRequest = serde_json::from_value(json!({
            "area_total_hectares": 100,
            "area_agricultavel_hectares": "80.5",
            "area_vegetacao_hectares": 19.25
        }))
        .unwrap();
        assert_eq!(farm.total_area, Some(dec!(100)));
        assert_eq!(farm.arable_area, Some(dec!(80.5)));
        assert_eq!(farm.vegetation_area, Some(dec!(19.25)));

        let farm: FarmRequest =
            serde_json::from_value(json!({"area_total_hectares": null})).unwrap();
        assert_eq!(farm.total_area, None);
    }

    #[test]
    fn test_non_numeric_hectares_fail_to_decode() {
        let result: Result<FarmRequest, _> =
            serde_json::from_value(json!({"area_total_hectares": "cem"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_formats_hectares_and_sorts_crops() {
        let producer = Producer {
            id: ProducerId::new(1),
            name: "Fulano".to_string(),
            cpf: Some("12345678909".to_string()),
            cnpj: None,
            farm: Farm {
                id: FarmId::new(2),
                name: "Fazenda".to_string(),
                city_id: CityId::new(3),
                areas: FarmAreas::new(dec!(100), dec!(80.5), dec!(0)),
                crops: [CropId::new(5), CropId::new(1)].into_iter().collect(),
            },
        };

        let body = serde_json::to_value(ProducerResponse::from(producer)).unwrap();

        assert_eq!(body["fazenda"]["area_total_hectares"], "100.00");
        assert_eq!(body["fazenda"]["area_agricultavel_hectares"], "80.50");
        assert_eq!(body["fazenda"]["area_vegetacao_hectares"], "0.00");
        assert_eq!(body["fazenda"]["culturas_plantadas"], json!([1, 5]));
        assert_eq!(body["cnpj"], json!(null));
    }
}
