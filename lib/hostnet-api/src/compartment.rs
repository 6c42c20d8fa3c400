//! Network compartments and their attached sub-resources

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of sub-resource attached to a compartment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompartmentResourceType {
    Endpoint,
}

/// Payload of an endpoint attachment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompartmentResourceEndpoint {
    #[serde(rename = "Id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

/// Envelope for a typed compartment sub-resource. `data` is carried as a
/// nested serialized value, never flattened into the envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompartmentResource {
    #[serde(rename = "Type")]
    pub resource_type: CompartmentResourceType,
    #[serde(rename = "Data", default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl CompartmentResource {
    /// Wraps an endpoint id in an `Endpoint`-typed envelope.
    pub fn endpoint(endpoint_id: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            resource_type: CompartmentResourceType::Endpoint,
            data: serde_json::to_value(CompartmentResourceEndpoint {
                id: endpoint_id.to_string(),
            })?,
        })
    }

    /// Decodes the payload as an endpoint attachment, if this envelope
    /// carries one.
    pub fn endpoint_id(&self) -> Option<String> {
        if self.resource_type != CompartmentResourceType::Endpoint {
            return None;
        }
        serde_json::from_value::<CompartmentResourceEndpoint>(self.data.clone())
            .ok()
            .map(|endpoint| endpoint.id)
    }
}

/// A network compartment managed by the control service.
///
/// `id` and `compartment_id` (the numeric OS-level identifier) are
/// service-assigned on creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    #[serde(rename = "ID", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "CompartmentId", default, skip_serializing_if = "is_zero")]
    pub compartment_id: u32,
    #[serde(rename = "ResourceList", default, skip_serializing_if = "Vec::is_empty")]
    pub resource_list: Vec<CompartmentResource>,
}

impl Compartment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}
