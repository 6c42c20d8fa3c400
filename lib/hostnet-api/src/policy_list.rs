//! Policy lists: endpoint membership plus the policies applied to it

use crate::policy::{ElbPolicy, L2NatPolicy, LbPolicy, Policy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returns the reference path for an endpoint resource.
pub fn endpoint_reference(endpoint_id: &str) -> String {
    format!("/endpoints/{}", endpoint_id)
}

/// A named collection of endpoint references and the traffic policies
/// applied to those endpoints.
///
/// `id` is empty until the control service assigns one on creation.
/// `policies` holds opaque serialized policy blobs; each blob carries its
/// own `Type` discriminant and must decode to a known [`Policy`] variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyList {
    #[serde(rename = "ID", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "References", default, skip_serializing_if = "Vec::is_empty")]
    pub endpoint_references: Vec<String>,
    #[serde(rename = "Policies", default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<Value>,
}

impl PolicyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a policy variant and appends it to `policies`.
    pub fn push_policy(&mut self, policy: &Policy) -> Result<(), serde_json::Error> {
        self.policies.push(serde_json::to_value(policy)?);
        Ok(())
    }

    /// Decodes every policy blob, failing on any malformed or unknown entry.
    pub fn decoded_policies(&self) -> Result<Vec<Policy>, serde_json::Error> {
        self.policies
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect()
    }

    /// Appends the reference path for `endpoint_id`. Duplicates are not
    /// checked at this layer.
    pub fn add_endpoint_reference(&mut self, endpoint_id: &str) {
        self.endpoint_references.push(endpoint_reference(endpoint_id));
    }

    /// Filters the reference path for `endpoint_id` out of the reference
    /// list. Returns false when the reference was not present.
    pub fn remove_endpoint_reference(&mut self, endpoint_id: &str) -> bool {
        let target = endpoint_reference(endpoint_id);
        let before = self.endpoint_references.len();
        self.endpoint_references.retain(|reference| reference != &target);
        self.endpoint_references.len() != before
    }

    /// Builds a policy list carrying a single outbound NAT rule for the
    /// given endpoints.
    pub fn outbound_nat(
        endpoints: &[String],
        vip: &str,
        protocol: u16,
        internal_port: u16,
        external_port: u16,
    ) -> Result<Self, serde_json::Error> {
        let mut list = PolicyList::new();
        for endpoint in endpoints {
            list.add_endpoint_reference(endpoint);
        }

        let policy = Policy::OutboundNat(L2NatPolicy {
            lb: LbPolicy {
                protocol,
                internal_port,
                external_port,
            },
            vip: vip.to_string(),
        });
        list.push_policy(&policy)?;

        Ok(list)
    }

    /// Builds a policy list carrying the given load balancer rules for the
    /// given endpoints. The rules are expected to be fully formed, including
    /// their own `ILB`/`SourceVIP`/`VIPs` fields.
    pub fn load_balancer(
        endpoints: &[String],
        elb_policies: &[ElbPolicy],
    ) -> Result<Self, serde_json::Error> {
        let mut list = PolicyList::new();
        for endpoint in endpoints {
            list.add_endpoint_reference(endpoint);
        }

        for elb in elb_policies {
            list.push_policy(&Policy::ExternalLoadBalancer(elb.clone()))?;
        }

        Ok(list)
    }
}
