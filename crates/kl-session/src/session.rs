//! The single client session and its notion of the current workspace.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use kl_base::constants::{API_VERSION_CANDIDATES, CLUSTERS_SEGMENT, WILDCARD_CLUSTER};
use kl_base::{
    ApiRelationship, AvailableResourceType, ConnectError, FetchError, GroupVersionResource, ResourceInstance,
    SyncTarget, WorkspaceNode, WorkspacePath, object,
};
use tracing::{debug, info};

use crate::client::{ApiClient, Connector};
use crate::discovery::collect_available_types;

/// One connection, pointed at one workspace at a time.
///
/// Every listing rebinds the client to the workspace it targets, but the
/// rebind is committed only once the listing succeeds. Child-workspace
/// listings are cached per path until the next successful rebind clears the
/// cache.
pub struct WorkspaceSession {
    connector: Arc<dyn Connector>,
    base_host: String,
    client: Box<dyn ApiClient>,
    current_path: WorkspacePath,
    discovery_cache: HashMap<WorkspacePath, Vec<WorkspaceNode>>,
}

impl WorkspaceSession {
    /// Open a session on the root workspace of `server`.
    ///
    /// Any `/clusters/...` suffix already present in the address is replaced.
    pub fn connect(connector: Arc<dyn Connector>, server: &str) -> Result<Self, ConnectError> {
        let base_host = base_host(server).to_string();
        let current_path = WorkspacePath::root();
        let client = connector.connect(&scoped_address(&base_host, current_path.as_str()))?;
        info!(%base_host, "session opened on root workspace");
        Ok(Self { connector, base_host, client, current_path, discovery_cache: HashMap::new() })
    }

    pub fn current_path(&self) -> &WorkspacePath {
        &self.current_path
    }

    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// Address the live client talks to.
    pub fn server(&self) -> &str {
        self.client.server()
    }

    pub fn cached_children(&self, path: &WorkspacePath) -> Option<&[WorkspaceNode]> {
        self.discovery_cache.get(path).map(Vec::as_slice)
    }

    pub fn cache_len(&self) -> usize {
        self.discovery_cache.len()
    }

    /// Rebind to `path`. On failure the previous client, path and cache stay in place.
    pub fn switch_to(&mut self, path: &WorkspacePath) -> Result<(), ConnectError> {
        let client = self.connector.connect(&scoped_address(&self.base_host, path.as_str()))?;
        self.commit(path, client);
        Ok(())
    }

    fn commit(&mut self, path: &WorkspacePath, client: Box<dyn ApiClient>) {
        self.client = client;
        self.current_path = path.clone();
        self.discovery_cache.clear();
        debug!(%path, "switched workspace");
    }

    /// Run `list` against a client scoped to `path` and switch to it only if
    /// the listing succeeds. On failure the session is left as it was.
    fn list_in<T>(
        &mut self,
        path: &WorkspacePath,
        list: impl FnOnce(&dyn ApiClient) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let client = self.connector.connect(&scoped_address(&self.base_host, path.as_str()))?;
        let value = list(client.as_ref())?;
        self.commit(path, client);
        Ok(value)
    }

    pub fn list_child_workspaces(&mut self, path: &WorkspacePath) -> Result<Vec<WorkspaceNode>, FetchError> {
        if let Some(nodes) = self.discovery_cache.get(path) {
            debug!(%path, "workspace cache hit");
            return Ok(nodes.clone());
        }
        debug!(%path, "workspace cache miss");

        let items = self.list_in(path, |client| client.list(&GroupVersionResource::workspaces(), None))?;
        let nodes: Vec<WorkspaceNode> = items
            .iter()
            .map(object::name)
            .filter(|name| !name.is_empty())
            .map(|name| WorkspaceNode::child_of(path, name))
            .collect();

        self.discovery_cache.insert(path.clone(), nodes.clone());
        Ok(nodes)
    }

    /// Exports followed by bindings. Probe misses are not errors.
    pub fn list_api_relationships(&mut self, path: &WorkspacePath) -> Result<Vec<ApiRelationship>, FetchError> {
        self.list_in(path, |client| {
            let exports = probe_versions(client, GroupVersionResource::api_exports, ApiRelationship::from_export);
            let bindings = probe_versions(client, GroupVersionResource::api_bindings, ApiRelationship::from_binding);
            Ok(exports.into_iter().chain(bindings).collect())
        })
    }

    pub fn list_sync_targets(&mut self, path: &WorkspacePath) -> Result<Vec<SyncTarget>, FetchError> {
        let items = self.list_in(path, |client| client.list(&GroupVersionResource::sync_targets(), None))?;
        Ok(items.iter().map(SyncTarget::from_object).collect())
    }

    pub fn list_resource_instances(
        &mut self,
        path: &WorkspacePath,
        resource: &GroupVersionResource,
        namespace: Option<&str>,
    ) -> Result<Vec<ResourceInstance>, FetchError> {
        let items = self.list_in(path, |client| client.list(resource, namespace))?;
        Ok(items.iter().map(|item| ResourceInstance::from_object(item, path)).collect())
    }

    pub fn list_available_resource_types(
        &mut self,
        path: &WorkspacePath,
    ) -> Result<Vec<AvailableResourceType>, FetchError> {
        let lists = self.list_in(path, |client| client.preferred_resources())?;
        Ok(collect_available_types(&lists))
    }

    /// List `resource` in every workspace through the wildcard scope.
    ///
    /// The current path and cache are untouched; the previous client is put
    /// back whether or not the listing succeeds.
    pub fn list_resources_across_all_workspaces(
        &mut self,
        resource: &GroupVersionResource,
    ) -> Result<Vec<ResourceInstance>, FetchError> {
        let wildcard = self.connector.connect(&scoped_address(&self.base_host, WILDCARD_CLUSTER))?;
        let saved = mem::replace(&mut self.client, wildcard);
        let result = self.client.list(resource, None);
        self.client = saved;

        let items = result?;
        debug!(%resource, count = items.len(), "wildcard listing");
        Ok(items.iter().map(ResourceInstance::from_wildcard_object).collect())
    }
}

/// Probe newest version first; the first version returning a non-empty list wins.
fn probe_versions(
    client: &dyn ApiClient,
    resource_for: fn(&str) -> GroupVersionResource,
    build: fn(serde_json::Value) -> ApiRelationship,
) -> Vec<ApiRelationship> {
    for version in API_VERSION_CANDIDATES {
        let resource = resource_for(version);
        match client.list(&resource, None) {
            Ok(items) if !items.is_empty() => return items.into_iter().map(build).collect(),
            Ok(_) => debug!(%resource, "probe returned no items"),
            Err(error) => debug!(%resource, %error, "probe missed"),
        }
    }
    Vec::new()
}

/// Server address with any logical-cluster suffix removed.
pub fn base_host(server: &str) -> &str {
    let host = match server.find(CLUSTERS_SEGMENT) {
        Some(idx) if idx > 0 => &server[..idx],
        _ => server,
    };
    host.trim_end_matches('/')
}

fn scoped_address(base_host: &str, cluster: &str) -> String {
    format!("{base_host}{CLUSTERS_SEGMENT}{cluster}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ApiResource, ApiResourceList};
    use crate::fixture::FixtureConnector;
    use serde_json::json;

    const SERVER: &str = "https://kcp.example:6443/clusters/root";

    fn open(fixture: &FixtureConnector) -> WorkspaceSession {
        WorkspaceSession::connect(Arc::new(fixture.clone()), SERVER).unwrap()
    }

    fn tree() -> FixtureConnector {
        FixtureConnector::new()
            .with_workspaces("root", &["a", "b"])
            .with_workspaces("root:a", &["x"])
            .with_workspaces("root:b", &[])
    }

    fn paths(nodes: &[WorkspaceNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.path.as_str()).collect()
    }

    // --- connect ---

    #[test]
    fn test_base_host_strips_cluster_suffix() {
        assert_eq!(base_host("https://kcp:6443/clusters/root:org"), "https://kcp:6443");
        assert_eq!(base_host("https://kcp:6443/"), "https://kcp:6443");
        assert_eq!(base_host("/clusters/root"), "/clusters/root");
    }

    #[test]
    fn test_connect_binds_root() {
        let fixture = tree();
        let session = open(&fixture);
        assert!(session.current_path().is_root());
        assert_eq!(session.base_host(), "https://kcp.example:6443");
        assert_eq!(session.server(), "https://kcp.example:6443/clusters/root");
        assert_eq!(fixture.connects(), vec!["root"]);
    }

    // --- switch_to ---

    #[test]
    fn test_switch_failure_keeps_path_and_cache() {
        let fixture = tree();
        let mut session = open(&fixture);
        session.list_child_workspaces(&WorkspacePath::root()).unwrap();
        let cached_before = session.cached_children(&WorkspacePath::root()).map(<[_]>::to_vec);

        fixture.fail_connect("root:a");
        let err = session.switch_to(&WorkspacePath::new("root:a")).unwrap_err();
        assert!(matches!(err, ConnectError::Client { .. }));

        assert!(session.current_path().is_root());
        assert_eq!(session.cached_children(&WorkspacePath::root()).map(<[_]>::to_vec), cached_before);
        assert_eq!(session.server(), "https://kcp.example:6443/clusters/root");
    }

    #[test]
    fn test_switch_success_clears_cache_including_same_path() {
        let fixture = tree();
        let mut session = open(&fixture);
        let root = WorkspacePath::root();
        session.list_child_workspaces(&root).unwrap();
        assert_eq!(session.cache_len(), 1);

        session.switch_to(&root).unwrap();
        assert_eq!(session.cache_len(), 0);
        assert!(session.cached_children(&root).is_none());
    }

    // --- list_child_workspaces ---

    #[test]
    fn test_children_mapped_to_paths() {
        let fixture = tree();
        let mut session = open(&fixture);
        let nodes = session.list_child_workspaces(&WorkspacePath::root()).unwrap();
        assert_eq!(paths(&nodes), vec!["root:a", "root:b"]);
        assert_eq!(nodes[0].name, "a");

        let nodes = session.list_child_workspaces(&WorkspacePath::new("root:a")).unwrap();
        assert_eq!(paths(&nodes), vec!["root:a:x"]);
        assert_eq!(session.current_path().as_str(), "root:a");
    }

    #[test]
    fn test_children_cached_between_calls() {
        let fixture = tree();
        let mut session = open(&fixture);
        let root = WorkspacePath::root();
        let workspaces = GroupVersionResource::workspaces();

        let first = session.list_child_workspaces(&root).unwrap();
        let second = session.list_child_workspaces(&root).unwrap();
        assert_eq!(first, second);
        assert_eq!(fixture.list_call_count("root", &workspaces), 1);
    }

    #[test]
    fn test_navigating_away_and_back_refetches() {
        let fixture = tree();
        let mut session = open(&fixture);
        let root = WorkspacePath::root();
        let workspaces = GroupVersionResource::workspaces();

        session.list_child_workspaces(&root).unwrap();
        session.list_child_workspaces(&WorkspacePath::new("root:a")).unwrap();
        session.list_child_workspaces(&root).unwrap();
        assert_eq!(fixture.list_call_count("root", &workspaces), 2);
    }

    #[test]
    fn test_empty_workspace_has_no_children() {
        let fixture = tree();
        let mut session = open(&fixture);
        assert!(session.list_child_workspaces(&WorkspacePath::new("root:b")).unwrap().is_empty());
    }

    #[test]
    fn test_children_listing_failure_is_fetch_error() {
        let fixture = tree();
        fixture.fail_list("root:a", GroupVersionResource::workspaces());
        let mut session = open(&fixture);
        let err = session.list_child_workspaces(&WorkspacePath::new("root:a")).unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(session.cached_children(&WorkspacePath::new("root:a")).is_none());
        assert!(session.current_path().is_root());
    }

    #[test]
    fn test_failed_listing_leaves_path_and_cache() {
        let fixture = tree();
        fixture.fail_list("root:a", GroupVersionResource::sync_targets());
        let mut session = open(&fixture);
        session.list_child_workspaces(&WorkspacePath::root()).unwrap();
        assert_eq!(session.cache_len(), 1);

        assert!(session.list_sync_targets(&WorkspacePath::new("root:a")).is_err());
        assert_eq!(session.current_path().as_str(), "root");
        assert_eq!(session.cache_len(), 1);
        assert_eq!(session.server(), "https://kcp.example:6443/clusters/root");

        fixture.fail_list("root:a", GroupVersionResource::workspaces());
        assert!(session.list_child_workspaces(&WorkspacePath::new("root:a")).is_err());
        assert_eq!(session.current_path().as_str(), "root");
        assert!(session.cached_children(&WorkspacePath::root()).is_some());
    }

    #[test]
    fn test_successful_listing_switches_and_clears_cache() {
        let fixture = tree().with_objects("root:a", GroupVersionResource::sync_targets(), vec![]);
        let mut session = open(&fixture);
        session.list_child_workspaces(&WorkspacePath::root()).unwrap();

        session.list_sync_targets(&WorkspacePath::new("root:a")).unwrap();
        assert_eq!(session.current_path().as_str(), "root:a");
        assert_eq!(session.cache_len(), 0);
    }

    #[test]
    fn test_children_connect_failure_is_fetch_error() {
        let fixture = tree();
        fixture.fail_connect("root:a");
        let mut session = open(&fixture);
        let err = session.list_child_workspaces(&WorkspacePath::new("root:a")).unwrap_err();
        assert!(matches!(err, FetchError::Connect(_)));
        assert!(session.current_path().is_root());
    }

    // --- list_api_relationships ---

    #[test]
    fn test_relationships_probe_versions() {
        let export = json!({"metadata": {"name": "widgets"}, "spec": {"resources": [{"name": "widgets", "group": "w.io"}]}});
        let binding = json!({"metadata": {"name": "gadgets"}, "spec": {"reference": {"export": {"name": "gadgets"}}}});
        let fixture = tree()
            .with_objects("root:a", GroupVersionResource::api_exports("v1alpha2"), vec![])
            .with_objects("root:a", GroupVersionResource::api_exports("v1alpha1"), vec![export])
            .with_objects("root:a", GroupVersionResource::api_bindings("v1alpha2"), vec![binding]);
        let mut session = open(&fixture);

        let rels = session.list_api_relationships(&WorkspacePath::new("root:a")).unwrap();
        let labels: Vec<(&str, &str)> = rels.iter().map(|r| (r.kind_label(), r.name.as_str())).collect();
        assert_eq!(labels, vec![("Export", "widgets"), ("Binding", "gadgets")]);
        assert_eq!(fixture.list_call_count("root:a", &GroupVersionResource::api_bindings("v1alpha1")), 0);
    }

    #[test]
    fn test_relationships_all_probes_miss_is_empty() {
        let fixture = tree();
        let mut session = open(&fixture);
        let rels = session.list_api_relationships(&WorkspacePath::root()).unwrap();
        assert!(rels.is_empty());
        assert_eq!(fixture.total_list_calls(), 4);
    }

    // --- other listings ---

    #[test]
    fn test_sync_targets() {
        let target = json!({
            "metadata": {"name": "edge", "labels": {"region": "eu"}},
            "status": {"conditions": [{"type": "Ready", "status": "True"}]}
        });
        let fixture = tree().with_objects("root:a", GroupVersionResource::sync_targets(), vec![target]);
        let mut session = open(&fixture);
        let targets = session.list_sync_targets(&WorkspacePath::new("root:a")).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].status, "Ready");
        assert_eq!(targets[0].labels.get("region").map(String::as_str), Some("eu"));
    }

    #[test]
    fn test_resource_instances_scoped_to_namespace() {
        let configmaps = GroupVersionResource::new("", "v1", "configmaps");
        let fixture = tree().with_objects(
            "root:a",
            configmaps.clone(),
            vec![
                json!({"kind": "ConfigMap", "metadata": {"name": "one", "namespace": "default"}}),
                json!({"kind": "ConfigMap", "metadata": {"name": "two", "namespace": "kube-system"}}),
            ],
        );
        let mut session = open(&fixture);
        let path = WorkspacePath::new("root:a");

        let all = session.list_resource_instances(&path, &configmaps, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].workspace, "root:a");

        let scoped = session.list_resource_instances(&path, &configmaps, Some("default")).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name, "one");
    }

    #[test]
    fn test_available_resource_types_deduplicated() {
        let list = |gv: &str, names: &[&str]| ApiResourceList {
            group_version: gv.into(),
            resources: names
                .iter()
                .map(|n| ApiResource { name: n.to_string(), kind: "K".into(), namespaced: true, verbs: vec![] })
                .collect(),
        };
        let fixture = tree().with_resources(
            "root",
            vec![list("v1", &["configmaps", "pods/status"]), list("v1", &["configmaps"]), list("apps/v1", &["deployments"])],
        );
        let mut session = open(&fixture);
        let types = session.list_available_resource_types(&WorkspacePath::root()).unwrap();
        let names: Vec<String> = types.iter().map(|t| t.resource.to_string()).collect();
        assert_eq!(names, vec!["v1/configmaps", "apps/v1/deployments"]);
    }

    // --- list_resources_across_all_workspaces ---

    fn with_configmaps() -> (FixtureConnector, GroupVersionResource) {
        let configmaps = GroupVersionResource::new("", "v1", "configmaps");
        let fixture = tree()
            .with_objects("root", configmaps.clone(), vec![json!({"kind": "ConfigMap", "metadata": {"name": "r"}})])
            .with_objects("root:a", configmaps.clone(), vec![json!({"kind": "ConfigMap", "metadata": {"name": "a"}})]);
        (fixture, configmaps)
    }

    #[test]
    fn test_wildcard_listing_tags_workspace() {
        let (fixture, configmaps) = with_configmaps();
        let mut session = open(&fixture);
        session.list_child_workspaces(&WorkspacePath::new("root:a")).unwrap();

        let instances = session.list_resources_across_all_workspaces(&configmaps).unwrap();
        let tagged: Vec<(&str, &str)> = instances.iter().map(|i| (i.name.as_str(), i.workspace.as_str())).collect();
        assert_eq!(tagged, vec![("r", "root"), ("a", "root:a")]);

        assert_eq!(session.current_path().as_str(), "root:a");
        assert_eq!(session.cache_len(), 1);
        assert_eq!(session.server(), "https://kcp.example:6443/clusters/root:a");
    }

    #[test]
    fn test_wildcard_failure_restores_path_and_client() {
        let (fixture, configmaps) = with_configmaps();
        let mut session = open(&fixture);
        session.switch_to(&WorkspacePath::new("root:a")).unwrap();

        fixture.fail_list(WILDCARD_CLUSTER, configmaps.clone());
        assert!(session.list_resources_across_all_workspaces(&configmaps).is_err());
        assert_eq!(session.current_path().as_str(), "root:a");
        assert_eq!(session.server(), "https://kcp.example:6443/clusters/root:a");
    }

    #[test]
    fn test_wildcard_connect_failure_leaves_session() {
        let (fixture, configmaps) = with_configmaps();
        let mut session = open(&fixture);
        session.switch_to(&WorkspacePath::new("root:a")).unwrap();

        fixture.fail_connect(WILDCARD_CLUSTER);
        let err = session.list_resources_across_all_workspaces(&configmaps).unwrap_err();
        assert!(matches!(err, FetchError::Connect(_)));
        assert_eq!(session.current_path().as_str(), "root:a");
    }
}
