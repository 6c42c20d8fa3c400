//! Lifecycle operations for policy lists

use crate::error::{Error, Result};
use crate::observer::{Observer, TracingObserver};
use crate::transport::{call_into, Method, Transport, TransportError};
use hostnet_api::{ElbPolicy, Policy, PolicyList};
use std::sync::Arc;
use tracing::debug;

const POLICY_LIST_ROOT: &str = "/policylists/";

/// Outcome of an endpoint-membership update on a policy list.
///
/// Membership changes are applied by deleting and recreating the resource,
/// so an update either replaced the resource or touched nothing at all.
#[derive(Clone, Debug, PartialEq)]
pub enum EndpointUpdate {
    /// The resource was deleted and recreated with the new reference set.
    Updated(PolicyList),
    /// The requested change was already in effect; no call was made.
    Unchanged(PolicyList),
}

impl EndpointUpdate {
    pub fn into_inner(self) -> PolicyList {
        match self {
            EndpointUpdate::Updated(list) | EndpointUpdate::Unchanged(list) => list,
        }
    }
}

/// Manager for policy list resources owned by the control service.
///
/// Stateless between calls; every method operates on a caller-held snapshot
/// and returns the service's canonical representation.
pub struct PolicyListClient<T> {
    transport: Arc<T>,
    observer: Option<Arc<dyn Observer>>,
}

impl<T: Transport> PolicyListClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            observer: Some(Arc::new(TracingObserver)),
        }
    }

    /// Replaces the default tracing observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Disables operation observation entirely.
    pub fn without_observer(mut self) -> Self {
        self.observer = None;
        self
    }

    /// Fetches a single policy list by id.
    pub async fn get(&self, id: &str) -> Result<PolicyList> {
        self.started("PolicyList::Get", id);
        let result = self
            .request(Method::Get, id, None)
            .await
            .map_err(|err| Error::not_found(err, id));
        self.finished("PolicyList::Get", id, &result);
        result
    }

    /// Fetches every policy list known to the service.
    pub async fn list(&self) -> Result<Vec<PolicyList>> {
        self.started("PolicyList::List", "");
        let result = call_into(self.transport.as_ref(), Method::Get, POLICY_LIST_ROOT, None)
            .await
            .map_err(Error::from);
        self.finished("PolicyList::List", "", &result);
        result
    }

    /// Requests creation of the given policy list and returns the service's
    /// canonical value, including the assigned id.
    ///
    /// Every entry of `policies` must decode to a known policy variant;
    /// malformed entries fail with [`Error::Validation`] before any call is
    /// made.
    pub async fn create(&self, list: &PolicyList) -> Result<PolicyList> {
        self.started("PolicyList::Create", &list.id);
        let result = self.create_inner(list).await;
        self.finished("PolicyList::Create", &list.id, &result);
        result
    }

    async fn create_inner(&self, list: &PolicyList) -> Result<PolicyList> {
        for (index, blob) in list.policies.iter().enumerate() {
            if let Err(err) = serde_json::from_value::<Policy>(blob.clone()) {
                return Err(Error::Validation(format!(
                    "policy {} is not a known variant: {}",
                    index, err
                )));
            }
        }

        let body = serde_json::to_string(list)?;
        let created = self.request(Method::Post, "", Some(&body)).await?;
        Ok(created)
    }

    /// Requests destruction of the resource by its current id. The local
    /// value keeps its now-stale contents.
    pub async fn delete(&self, list: &PolicyList) -> Result<PolicyList> {
        self.started("PolicyList::Delete", &list.id);
        let result = self
            .request(Method::Delete, &list.id, None)
            .await
            .map_err(|err| Error::not_found(err, &list.id));
        self.finished("PolicyList::Delete", &list.id, &result);
        result
    }

    /// Adds an endpoint to the policy list's reference set.
    ///
    /// The service offers no partial-update verb for this resource, so the
    /// update deletes the resource and recreates it with the appended
    /// reference. The two calls are not atomic: a failure after the delete
    /// is reported as [`Error::PartialUpdate`] and leaves the resource
    /// absent server-side. Callers must re-query before retrying.
    pub async fn add_endpoint(&self, list: &PolicyList, endpoint_id: &str) -> Result<EndpointUpdate> {
        self.started("PolicyList::AddEndpoint", &list.id);
        let result = self.add_endpoint_inner(list, endpoint_id).await;
        self.finished("PolicyList::AddEndpoint", &list.id, &result);
        result
    }

    async fn add_endpoint_inner(
        &self,
        list: &PolicyList,
        endpoint_id: &str,
    ) -> Result<EndpointUpdate> {
        let mut updated = list.clone();
        updated.add_endpoint_reference(endpoint_id);

        self.delete(list).await?;
        self.recreate(list, updated).await
    }

    /// Removes an endpoint from the policy list's reference set, using the
    /// same delete-then-recreate pattern as [`add_endpoint`].
    ///
    /// Removing a reference that is not present touches nothing and returns
    /// [`EndpointUpdate::Unchanged`]. Policy blobs are never modified, even
    /// when they mention the removed endpoint.
    ///
    /// [`add_endpoint`]: PolicyListClient::add_endpoint
    pub async fn remove_endpoint(
        &self,
        list: &PolicyList,
        endpoint_id: &str,
    ) -> Result<EndpointUpdate> {
        self.started("PolicyList::RemoveEndpoint", &list.id);
        let result = self.remove_endpoint_inner(list, endpoint_id).await;
        self.finished("PolicyList::RemoveEndpoint", &list.id, &result);
        result
    }

    async fn remove_endpoint_inner(
        &self,
        list: &PolicyList,
        endpoint_id: &str,
    ) -> Result<EndpointUpdate> {
        let mut updated = list.clone();
        if !updated.remove_endpoint_reference(endpoint_id) {
            return Ok(EndpointUpdate::Unchanged(updated));
        }

        self.delete(list).await?;
        self.recreate(list, updated).await
    }

    async fn recreate(&self, original: &PolicyList, updated: PolicyList) -> Result<EndpointUpdate> {
        match self.create(&updated).await {
            Ok(created) => Ok(EndpointUpdate::Updated(created)),
            Err(err) => Err(Error::PartialUpdate {
                id: original.id.clone(),
                source: Box::new(err),
            }),
        }
    }

    /// Creates a policy list applying an outbound NAT rule to the given
    /// endpoints.
    pub async fn add_outbound_nat(
        &self,
        endpoints: &[String],
        vip: &str,
        protocol: u16,
        internal_port: u16,
        external_port: u16,
    ) -> Result<PolicyList> {
        self.started("PolicyList::AddOutboundNat", vip);
        let result = match PolicyList::outbound_nat(
            endpoints,
            vip,
            protocol,
            internal_port,
            external_port,
        ) {
            Ok(list) => self.create(&list).await,
            Err(err) => Err(Error::Serialization(err)),
        };
        self.finished("PolicyList::AddOutboundNat", vip, &result);
        result
    }

    /// Creates a policy list applying the given load balancer rules to the
    /// given endpoints.
    ///
    /// `is_ilb` and `vip` are accepted for API symmetry; the rules are
    /// expected to carry their own `ILB`/`SourceVIP`/`VIPs` fields.
    pub async fn add_load_balancer(
        &self,
        endpoints: &[String],
        is_ilb: bool,
        vip: &str,
        elb_policies: &[ElbPolicy],
    ) -> Result<PolicyList> {
        self.started("PolicyList::AddLoadBalancer", vip);
        debug!("AddLoadBalancer vip={} ilb={}", vip, is_ilb);
        let result = match PolicyList::load_balancer(endpoints, elb_policies) {
            Ok(list) => self.create(&list).await,
            Err(err) => Err(Error::Serialization(err)),
        };
        self.finished("PolicyList::AddLoadBalancer", vip, &result);
        result
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> std::result::Result<PolicyList, TransportError> {
        let path = format!("{}{}", POLICY_LIST_ROOT, path);
        call_into(self.transport.as_ref(), method, &path, body).await
    }

    fn started(&self, operation: &str, resource_id: &str) {
        if let Some(observer) = &self.observer {
            observer.operation_started(operation, resource_id);
        }
    }

    fn finished<R>(&self, operation: &str, resource_id: &str, result: &Result<R>) {
        if let Some(observer) = &self.observer {
            observer.operation_finished(operation, resource_id, result.as_ref().err());
        }
    }
}
