//! In-memory backend that answers listings from canned objects.
//!
//! Every client handed out shares one state, so a test can seed data,
//! inject failures and count calls while a session holds the connector.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use kl_base::constants::{CLUSTER_ANNOTATION, CLUSTERS_SEGMENT, WILDCARD_CLUSTER};
use kl_base::{ConnectError, FetchError, GroupVersionResource, object};
use serde_json::{Value, json};

use crate::client::{ApiClient, Connector};
use crate::discovery::ApiResourceList;

#[derive(Default)]
struct FixtureState {
    objects: BTreeMap<(String, GroupVersionResource), Vec<Value>>,
    resources: HashMap<String, Vec<ApiResourceList>>,
    failing_connects: HashSet<String>,
    failing_lists: HashSet<(String, GroupVersionResource)>,
    connects: Vec<String>,
    list_calls: Vec<(String, GroupVersionResource)>,
}

#[derive(Clone, Default)]
pub struct FixtureConnector {
    state: Arc<Mutex<FixtureState>>,
}

impl FixtureConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FixtureState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    // === Seeding ===

    /// Child workspaces of `cluster`, listed in the given order.
    pub fn with_workspaces(self, cluster: &str, names: &[&str]) -> Self {
        let items = names.iter().map(|name| json!({"kind": "Workspace", "metadata": {"name": name}})).collect();
        self.with_objects(cluster, GroupVersionResource::workspaces(), items)
    }

    pub fn with_objects(self, cluster: &str, resource: GroupVersionResource, items: Vec<Value>) -> Self {
        self.with_state(|s| s.objects.insert((cluster.to_string(), resource), items));
        self
    }

    /// Discovery documents served for `cluster`.
    pub fn with_resources(self, cluster: &str, lists: Vec<ApiResourceList>) -> Self {
        self.with_state(|s| s.resources.insert(cluster.to_string(), lists));
        self
    }

    // === Failure injection ===

    pub fn fail_connect(&self, cluster: &str) {
        self.with_state(|s| s.failing_connects.insert(cluster.to_string()));
    }

    pub fn fail_list(&self, cluster: &str, resource: GroupVersionResource) {
        self.with_state(|s| s.failing_lists.insert((cluster.to_string(), resource)));
    }

    pub fn clear_failures(&self) {
        self.with_state(|s| {
            s.failing_connects.clear();
            s.failing_lists.clear();
        });
    }

    // === Inspection ===

    /// Cluster names of every connect attempt, in order.
    pub fn connects(&self) -> Vec<String> {
        self.with_state(|s| s.connects.clone())
    }

    pub fn list_call_count(&self, cluster: &str, resource: &GroupVersionResource) -> usize {
        self.with_state(|s| s.list_calls.iter().filter(|(c, r)| c == cluster && r == resource).count())
    }

    pub fn total_list_calls(&self) -> usize {
        self.with_state(|s| s.list_calls.len())
    }
}

impl Connector for FixtureConnector {
    fn connect(&self, server: &str) -> Result<Box<dyn ApiClient>, ConnectError> {
        let Some((_, cluster)) = server.split_once(CLUSTERS_SEGMENT) else {
            return Err(ConnectError::InvalidAddress {
                server: server.to_string(),
                reason: "address is not scoped to a cluster".to_string(),
            });
        };

        let refused = self.with_state(|s| {
            s.connects.push(cluster.to_string());
            s.failing_connects.contains(cluster)
        });
        if refused {
            return Err(ConnectError::Client { server: server.to_string(), reason: "connection refused".to_string() });
        }

        Ok(Box::new(FixtureClient {
            server: server.to_string(),
            cluster: cluster.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct FixtureClient {
    server: String,
    cluster: String,
    state: Arc<Mutex<FixtureState>>,
}

impl ApiClient for FixtureClient {
    fn server(&self) -> &str {
        &self.server
    }

    fn list(&self, resource: &GroupVersionResource, namespace: Option<&str>) -> Result<Vec<Value>, FetchError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let url = format!("{}/{}", self.server, resource);
        let key = (self.cluster.clone(), resource.clone());

        state.list_calls.push(key.clone());
        if state.failing_lists.contains(&key) {
            return Err(FetchError::Transport { url, message: "connection reset by peer".to_string() });
        }

        let items: Vec<Value> = if self.cluster == WILDCARD_CLUSTER {
            state
                .objects
                .iter()
                .filter(|((_, r), _)| r == resource)
                .flat_map(|((cluster, _), items)| items.iter().map(move |item| tag_cluster(item.clone(), cluster)))
                .collect()
        } else {
            match state.objects.get(&key) {
                Some(items) => items.clone(),
                None => {
                    let body = "the server could not find the requested resource".to_string();
                    return Err(FetchError::Status { url, status: 404, body });
                }
            }
        };

        Ok(match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => items.into_iter().filter(|item| object::namespace(item).as_deref() == Some(ns)).collect(),
            None => items,
        })
    }

    fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, FetchError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.resources.get(&self.cluster).cloned().unwrap_or_default())
    }
}

fn tag_cluster(mut item: Value, cluster: &str) -> Value {
    if let Some(metadata) = item.as_object_mut().map(|obj| obj.entry("metadata").or_insert_with(|| json!({})))
        && let Some(metadata) = metadata.as_object_mut()
    {
        let annotations = metadata.entry("annotations").or_insert_with(|| json!({}));
        if let Some(annotations) = annotations.as_object_mut() {
            annotations.insert(CLUSTER_ANNOTATION.to_string(), Value::String(cluster.to_string()));
        }
    }
    item
}
