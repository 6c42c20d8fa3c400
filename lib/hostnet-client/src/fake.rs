//! In-memory stand-in for the control service, used by manager tests

use crate::transport::{Method, Transport, TransportError};
use async_trait::async_trait;
use hostnet_api::{Compartment, CompartmentResource, PolicyList};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Emulates the service's resource tables behind the [`Transport`] seam.
pub struct FakeService {
    policy_lists: Mutex<HashMap<String, PolicyList>>,
    compartments: Mutex<HashMap<String, Compartment>>,
    next_id: Mutex<u32>,
    reject_create: Mutex<bool>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            policy_lists: Mutex::new(HashMap::new()),
            compartments: Mutex::new(HashMap::new()),
            next_id: Mutex::new(0),
            reject_create: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of transport round-trips seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Makes the next create call fail with a 500 after any delete has
    /// already been applied, to exercise the delete-then-recreate gap.
    pub fn reject_next_create(&self) {
        *self.reject_create.lock().unwrap() = true;
    }

    /// Server-side view of a policy list.
    pub fn policy_list(&self, id: &str) -> Option<PolicyList> {
        self.policy_lists.lock().unwrap().get(id).cloned()
    }

    fn assign_id(&self, prefix: &str) -> (String, u32) {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        (format!("{}-{}", prefix, *next), *next)
    }

    fn take_reject(&self) -> bool {
        let mut reject = self.reject_create.lock().unwrap();
        std::mem::take(&mut *reject)
    }

    fn policy_list_call(
        &self,
        method: Method,
        rest: &str,
        body: Option<&str>,
    ) -> Result<String, TransportError> {
        let mut lists = self.policy_lists.lock().unwrap();
        match (method, rest) {
            (Method::Get, "") => encode(&lists.values().cloned().collect::<Vec<_>>()),
            (Method::Get, id) => match lists.get(id) {
                Some(list) => encode(list),
                None => Err(not_found(id)),
            },
            (Method::Post, "") => {
                if self.take_reject() {
                    return Err(TransportError::Service {
                        status: 500,
                        message: "create rejected".to_string(),
                    });
                }
                let mut list: PolicyList = decode(body)?;
                if list.id.is_empty() {
                    list.id = self.assign_id("pl").0;
                }
                let encoded = encode(&list)?;
                lists.insert(list.id.clone(), list);
                Ok(encoded)
            }
            (Method::Delete, id) => match lists.remove(id) {
                Some(list) => encode(&list),
                None => Err(not_found(id)),
            },
            _ => Err(method_not_allowed(method, rest)),
        }
    }

    fn compartment_call(
        &self,
        method: Method,
        rest: &str,
        body: Option<&str>,
    ) -> Result<String, TransportError> {
        if let Some(id) = rest.strip_suffix("/addresource") {
            return self.mutate_resource(id, body, true);
        }
        if let Some(id) = rest.strip_suffix("/removeresource") {
            return self.mutate_resource(id, body, false);
        }

        let mut compartments = self.compartments.lock().unwrap();
        match (method, rest) {
            (Method::Get, "") => encode(&compartments.values().cloned().collect::<Vec<_>>()),
            (Method::Get, id) => match compartments.get(id) {
                Some(compartment) => encode(compartment),
                None => Err(not_found(id)),
            },
            (Method::Post, "") => {
                let mut compartment: Compartment = decode(body)?;
                if compartment.id.is_empty() {
                    let (id, numeric) = self.assign_id("comp");
                    compartment.id = id;
                    compartment.compartment_id = numeric;
                }
                let encoded = encode(&compartment)?;
                compartments.insert(compartment.id.clone(), compartment);
                Ok(encoded)
            }
            (Method::Delete, id) => match compartments.remove(id) {
                Some(compartment) => encode(&compartment),
                None => Err(not_found(id)),
            },
            _ => Err(method_not_allowed(method, rest)),
        }
    }

    fn mutate_resource(
        &self,
        id: &str,
        body: Option<&str>,
        add: bool,
    ) -> Result<String, TransportError> {
        let resource: CompartmentResource = decode(body)?;
        let mut compartments = self.compartments.lock().unwrap();
        let compartment = compartments.get_mut(id).ok_or_else(|| not_found(id))?;

        if add {
            compartment.resource_list.push(resource);
        } else {
            compartment.resource_list.retain(|entry| entry != &resource);
        }
        encode(compartment)
    }
}

#[async_trait]
impl Transport for FakeService {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push((method, path.to_string()));

        if let Some(rest) = path.strip_prefix("/policylists/") {
            return self.policy_list_call(method, rest, body);
        }
        if let Some(rest) = path.strip_prefix("/compartments/") {
            return self.compartment_call(method, rest, body);
        }
        Err(not_found(path))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, TransportError> {
    serde_json::to_string(value).map_err(TransportError::Decode)
}

fn decode<T: DeserializeOwned>(body: Option<&str>) -> Result<T, TransportError> {
    let body = body.ok_or_else(|| TransportError::Service {
        status: 400,
        message: "missing request body".to_string(),
    })?;
    serde_json::from_str(body).map_err(TransportError::Decode)
}

fn not_found(id: &str) -> TransportError {
    TransportError::Service {
        status: 404,
        message: format!("no such resource: {}", id),
    }
}

fn method_not_allowed(method: Method, path: &str) -> TransportError {
    TransportError::Service {
        status: 405,
        message: format!("{} not allowed on {}", method, path),
    }
}
