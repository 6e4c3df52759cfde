//! Seams between the session and whatever answers its listing calls.

use kl_base::{ConnectError, FetchError, GroupVersionResource};
use serde_json::Value;

use crate::discovery::ApiResourceList;

/// A listing capability bound to one server address.
pub trait ApiClient: Send {
    /// Address every request of this client is scoped to.
    fn server(&self) -> &str;

    /// List all objects of a resource type, optionally within one namespace.
    fn list(&self, resource: &GroupVersionResource, namespace: Option<&str>) -> Result<Vec<Value>, FetchError>;

    /// Resource lists for the preferred version of every API group.
    fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, FetchError>;
}

/// Builds a fresh [`ApiClient`] for an address. Called on every workspace switch.
pub trait Connector: Send + Sync {
    fn connect(&self, server: &str) -> Result<Box<dyn ApiClient>, ConnectError>;
}
