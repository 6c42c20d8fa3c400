//! Data model for host network virtualization policies
//!
//! This library defines the resources understood by the network control
//! service:
//! - Policy variants: outbound NAT and external load balancer rules
//! - PolicyList: a set of endpoint references plus the policies applied to them
//! - Compartment: a network compartment and its attached sub-resources

pub mod compartment;
pub mod policy;
pub mod policy_list;

pub use compartment::{
    Compartment, CompartmentResource, CompartmentResourceEndpoint, CompartmentResourceType,
};
pub use policy::{ElbPolicy, L2NatPolicy, LbPolicy, Policy, PolicyType};
pub use policy_list::{endpoint_reference, PolicyList};
