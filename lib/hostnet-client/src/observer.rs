//! Diagnostic hooks around manager operations

use crate::error::Error;
use tracing::{debug, warn};

/// Receives start and outcome notifications for every manager operation.
///
/// Observers are diagnostic only: managers behave identically with or
/// without one, and implementations must not block the call path.
pub trait Observer: Send + Sync {
    fn operation_started(&self, operation: &str, resource_id: &str);
    fn operation_finished(&self, operation: &str, resource_id: &str, error: Option<&Error>);
}

/// Default observer forwarding operation events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn operation_started(&self, operation: &str, resource_id: &str) {
        debug!("{} id={}", operation, resource_id);
    }

    fn operation_finished(&self, operation: &str, resource_id: &str, error: Option<&Error>) {
        match error {
            Some(err) => warn!("{} id={} failed: {}", operation, resource_id, err),
            None => debug!("{} id={} ok", operation, resource_id),
        }
    }
}
