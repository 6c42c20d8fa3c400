//! Traffic policy variants applied through policy lists

use serde::{Deserialize, Serialize};

/// Discriminator identifying which policy variant a serialized blob carries.
///
/// The wire strings are fixed by the control service protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyType {
    #[serde(rename = "OutBoundNAT")]
    OutboundNat,
    #[serde(rename = "ELB")]
    ExternalLoadBalancer,
}

/// A single traffic policy, tagged on the wire by its `Type` field.
///
/// Each variant serializes its fields at the top level alongside the
/// discriminant, so a decoder can select the payload shape from `Type`
/// alone. Blobs with an unknown discriminant fail to decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Policy {
    /// Layer-2 outbound NAT rule
    #[serde(rename = "OutBoundNAT")]
    OutboundNat(L2NatPolicy),
    /// External/internal load balancer rule
    #[serde(rename = "ELB")]
    ExternalLoadBalancer(ElbPolicy),
}

impl Policy {
    /// The discriminant for this variant.
    pub fn policy_type(&self) -> PolicyType {
        match self {
            Policy::OutboundNat(_) => PolicyType::OutboundNat,
            Policy::ExternalLoadBalancer(_) => PolicyType::ExternalLoadBalancer,
        }
    }
}

/// Port and protocol mapping shared by load-balancing style policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LbPolicy {
    /// IANA transport protocol number (6 = TCP, 17 = UDP)
    #[serde(rename = "Protocol", default, skip_serializing_if = "is_zero")]
    pub protocol: u16,
    #[serde(rename = "InternalPort", default)]
    pub internal_port: u16,
    #[serde(rename = "ExternalPort", default)]
    pub external_port: u16,
}

/// Layer-2 outbound NAT rule: traffic from the member endpoints is
/// translated to the given virtual IP.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct L2NatPolicy {
    #[serde(flatten)]
    pub lb: LbPolicy,
    #[serde(rename = "VIP", default, skip_serializing_if = "String::is_empty")]
    pub vip: String,
}

/// External load balancer rule distributing traffic for a virtual IP
/// across the member endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElbPolicy {
    #[serde(flatten)]
    pub lb: LbPolicy,
    #[serde(rename = "SourceVIP", default, skip_serializing_if = "String::is_empty")]
    pub source_vip: String,
    #[serde(rename = "VIPs", default, skip_serializing_if = "Vec::is_empty")]
    pub vips: Vec<String>,
    /// Internal (rather than external) load balancing
    #[serde(rename = "ILB", default, skip_serializing_if = "is_false")]
    pub ilb: bool,
}

fn is_zero(value: &u16) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}
