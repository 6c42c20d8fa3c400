//! Client-side resource managers for the network control service
//!
//! This library provides:
//! - PolicyListClient: lifecycle operations for policy lists, including the
//!   delete-then-recreate pattern used for endpoint membership changes
//! - CompartmentClient: lifecycle and sub-resource operations for compartments
//! - Transport: the injectable call-and-decode seam both managers run on,
//!   with an HTTP implementation backed by reqwest
//!
//! The control service owns all packet-processing state; every value held by
//! a caller is a snapshot of what the service last returned.

pub mod compartment;
pub mod error;
pub mod observer;
pub mod policy_list;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use compartment::CompartmentClient;
pub use error::{Error, Result};
pub use observer::{Observer, TracingObserver};
pub use policy_list::{EndpointUpdate, PolicyListClient};
pub use transport::{HttpTransport, Method, Transport, TransportError};
