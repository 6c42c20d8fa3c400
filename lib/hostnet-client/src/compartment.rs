//! Lifecycle and sub-resource operations for compartments

use crate::error::{Error, Result};
use crate::observer::{Observer, TracingObserver};
use crate::transport::{call_into, Method, Transport, TransportError};
use hostnet_api::{Compartment, CompartmentResource};
use std::sync::Arc;

const COMPARTMENT_ROOT: &str = "/compartments/";

/// Manager for compartment resources owned by the control service.
///
/// Unlike policy lists, compartment sub-resources are added and removed by
/// directed calls against the existing compartment id; no delete-then-
/// recreate is involved.
pub struct CompartmentClient<T> {
    transport: Arc<T>,
    observer: Option<Arc<dyn Observer>>,
}

impl<T: Transport> CompartmentClient<T> {
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

    /// Fetches a single compartment by id.
    pub async fn get(&self, id: &str) -> Result<Compartment> {
        self.started("Compartment::Get", id);
        let result = self
            .request(Method::Get, id, None)
            .await
            .map_err(|err| Error::not_found(err, id));
        self.finished("Compartment::Get", id, &result);
        result
    }

    /// Fetches every compartment known to the service.
    pub async fn list(&self) -> Result<Vec<Compartment>> {
        self.started("Compartment::List", "");
        let result = call_into(self.transport.as_ref(), Method::Get, COMPARTMENT_ROOT, None)
            .await
            .map_err(Error::from);
        self.finished("Compartment::List", "", &result);
        result
    }

    /// Requests creation of the given compartment and returns the service's
    /// canonical value, including the assigned string and numeric ids.
    pub async fn create(&self, compartment: &Compartment) -> Result<Compartment> {
        self.started("Compartment::Create", &compartment.id);
        let result = self.create_inner(compartment).await;
        self.finished("Compartment::Create", &compartment.id, &result);
        result
    }

    async fn create_inner(&self, compartment: &Compartment) -> Result<Compartment> {
        let body = serde_json::to_string(compartment)?;
        let created = self.request(Method::Post, "", Some(&body)).await?;
        Ok(created)
    }

    /// Requests destruction of the compartment by its current id.
    pub async fn delete(&self, compartment: &Compartment) -> Result<Compartment> {
        self.started("Compartment::Delete", &compartment.id);
        let result = self
            .request(Method::Delete, &compartment.id, None)
            .await
            .map_err(|err| Error::not_found(err, &compartment.id));
        self.finished("Compartment::Delete", &compartment.id, &result);
        result
    }

    /// Attaches an endpoint to an existing compartment. Additive against the
    /// service; independent of any other mutation on the same compartment.
    pub async fn add_endpoint(
        &self,
        compartment: &Compartment,
        endpoint_id: &str,
    ) -> Result<Compartment> {
        self.started("Compartment::AddEndpoint", &compartment.id);
        let result = self.post_resource(compartment, endpoint_id, "addresource").await;
        self.finished("Compartment::AddEndpoint", &compartment.id, &result);
        result
    }

    /// Detaches an endpoint from an existing compartment.
    pub async fn remove_endpoint(
        &self,
        compartment: &Compartment,
        endpoint_id: &str,
    ) -> Result<Compartment> {
        self.started("Compartment::RemoveEndpoint", &compartment.id);
        let result = self
            .post_resource(compartment, endpoint_id, "removeresource")
            .await;
        self.finished("Compartment::RemoveEndpoint", &compartment.id, &result);
        result
    }

    async fn post_resource(
        &self,
        compartment: &Compartment,
        endpoint_id: &str,
        verb: &str,
    ) -> Result<Compartment> {
        let resource = CompartmentResource::endpoint(endpoint_id)?;
        let body = serde_json::to_string(&resource)?;
        let path = format!("{}/{}", compartment.id, verb);
        self.request(Method::Post, &path, Some(&body))
            .await
            .map_err(|err| Error::not_found(err, &compartment.id))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> std::result::Result<Compartment, TransportError> {
        let path = format!("{}{}", COMPARTMENT_ROOT, path);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeService;

    fn client() -> (Arc<FakeService>, CompartmentClient<FakeService>) {
        let service = Arc::new(FakeService::new());
        let client = CompartmentClient::new(service.clone());
        (service, client)
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let (_, client) = client();
        let created = client.create(&Compartment::new("tenant-a")).await.unwrap();

        assert!(!created.id.is_empty());
        assert_ne!(created.compartment_id, 0);
        assert_eq!(created.name, "tenant-a");

        let fetched = client.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (_, client) = client();
        let err = client.get("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let (_, client) = client();
        let a = client.create(&Compartment::new("a")).await.unwrap();
        client.create(&Compartment::new("b")).await.unwrap();

        assert_eq!(client.list().await.unwrap().len(), 2);

        client.delete(&a).await.unwrap();
        assert_eq!(client.list().await.unwrap().len(), 1);
        let err = client.get(&a.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_endpoint_attaches_resource() {
        let (_, client) = client();
        let created = client.create(&Compartment::new("tenant-a")).await.unwrap();

        let updated = client.add_endpoint(&created, "ep1").await.unwrap();
        assert_eq!(updated.resource_list.len(), 1);
        assert_eq!(
            updated.resource_list[0].endpoint_id(),
            Some("ep1".to_string())
        );
    }

    #[tokio::test]
    async fn test_add_remove_is_order_independent() {
        let (_, client) = client();
        let created = client.create(&Compartment::new("tenant-a")).await.unwrap();

        // Interleave another mutation between add and remove of ep1.
        let after_ep1 = client.add_endpoint(&created, "ep1").await.unwrap();
        let after_ep2 = client.add_endpoint(&after_ep1, "ep2").await.unwrap();
        let after_remove = client.remove_endpoint(&after_ep2, "ep1").await.unwrap();

        assert_eq!(after_remove.resource_list.len(), 1);
        assert_eq!(
            after_remove.resource_list[0].endpoint_id(),
            Some("ep2".to_string())
        );
    }

    #[tokio::test]
    async fn test_add_endpoint_to_unknown_compartment_is_not_found() {
        let (_, client) = client();
        let mut ghost = Compartment::new("ghost");
        ghost.id = "comp-404".to_string();

        let err = client.add_endpoint(&ghost, "ep1").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
