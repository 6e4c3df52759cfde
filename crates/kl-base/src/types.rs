use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    API_BINDINGS_RESOURCE, API_EXPORTS_RESOURCE, APIS_GROUP, CLUSTER_ANNOTATION, SYNC_TARGETS_RESOURCE, TENANCY_GROUP,
    TENANCY_VERSION, UNKNOWN_WORKSPACE, WORKLOAD_GROUP, WORKLOAD_VERSION, WORKSPACES_RESOURCE,
};
use crate::object;
use crate::path::WorkspacePath;

// ─── Resource type identity ───

/// API group, version and plural resource name of a resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: impl Into<String>, version: impl Into<String>, resource: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into(), resource: resource.into() }
    }

    pub fn workspaces() -> Self {
        Self::new(TENANCY_GROUP, TENANCY_VERSION, WORKSPACES_RESOURCE)
    }

    pub fn api_exports(version: &str) -> Self {
        Self::new(APIS_GROUP, version, API_EXPORTS_RESOURCE)
    }

    pub fn api_bindings(version: &str) -> Self {
        Self::new(APIS_GROUP, version, API_BINDINGS_RESOURCE)
    }

    pub fn sync_targets() -> Self {
        Self::new(WORKLOAD_GROUP, WORKLOAD_VERSION, SYNC_TARGETS_RESOURCE)
    }

    /// `v1` for the core group, `group/version` otherwise.
    pub fn group_version(&self) -> String {
        if self.group.is_empty() { self.version.clone() } else { format!("{}/{}", self.group, self.version) }
    }

    /// Group name for display; the unnamed group is shown as `core`.
    pub fn group_label(&self) -> &str {
        if self.group.is_empty() { "core" } else { &self.group }
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group_version(), self.resource)
    }
}

// ─── Workspace tree ───

/// A direct child of some workspace. Children of this node are fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNode {
    pub name: String,
    pub path: WorkspacePath,
}

impl WorkspaceNode {
    pub fn child_of(parent: &WorkspacePath, name: impl Into<String>) -> Self {
        let name = name.into();
        Self { path: parent.child(&name), name }
    }
}

// ─── API relationships ───

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRelationshipKind {
    /// Offers a resource type to other workspaces.
    Export { resource_name: Option<String>, resource_group: Option<String> },
    /// Consumes an export published by another workspace.
    Binding { export_name: Option<String>, export_path: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRelationship {
    pub name: String,
    pub status: String,
    pub kind: ApiRelationshipKind,
    /// Full object as returned by the server, kept for verbatim display.
    pub raw: Value,
}

impl ApiRelationship {
    /// Build from an `APIExport` object. The first entry of `spec.resources` names the exported type.
    pub fn from_export(raw: Value) -> Self {
        let first = object::nested(&raw, &["spec", "resources"]).and_then(Value::as_array).and_then(|r| r.first());
        let field = |key: &str| first.and_then(|r| object::nested_str(r, &[key])).map(str::to_string);
        let kind = ApiRelationshipKind::Export { resource_name: field("name"), resource_group: field("group") };
        Self { name: object::name(&raw), status: object::derive_status(&raw), kind, raw }
    }

    /// Build from an `APIBinding` object, reading `spec.reference.export`.
    pub fn from_binding(raw: Value) -> Self {
        let field = |key: &str| object::nested_str(&raw, &["spec", "reference", "export", key]).map(str::to_string);
        let kind = ApiRelationshipKind::Binding { export_name: field("name"), export_path: field("path") };
        Self { name: object::name(&raw), status: object::derive_status(&raw), kind, raw }
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            ApiRelationshipKind::Export { .. } => "Export",
            ApiRelationshipKind::Binding { .. } => "Binding",
        }
    }
}

// ─── Sync targets ───

/// A registered physical cluster that workloads of the workspace can be synced to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub name: String,
    pub status: String,
    pub labels: BTreeMap<String, String>,
}

impl SyncTarget {
    pub fn from_object(obj: &Value) -> Self {
        Self { name: object::name(obj), status: object::derive_status(obj), labels: object::labels(obj) }
    }
}

// ─── Resource types and instances ───

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableResourceType {
    pub resource: GroupVersionResource,
    pub kind: String,
    pub namespaced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInstance {
    pub name: String,
    pub namespace: Option<String>,
    pub kind: String,
    pub workspace: String,
}

impl ResourceInstance {
    pub fn from_object(obj: &Value, workspace: &WorkspacePath) -> Self {
        Self {
            name: object::name(obj),
            namespace: object::namespace(obj),
            kind: object::kind(obj),
            workspace: workspace.to_string(),
        }
    }

    /// Build from a wildcard listing item, where the owning workspace comes from an annotation.
    pub fn from_wildcard_object(obj: &Value) -> Self {
        let workspace = object::annotation(obj, CLUSTER_ANNOTATION).unwrap_or(UNKNOWN_WORKSPACE);
        Self {
            name: object::name(obj),
            namespace: object::namespace(obj),
            kind: object::kind(obj),
            workspace: workspace.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_version_core_and_named() {
        let core = GroupVersionResource::new("", "v1", "configmaps");
        assert_eq!(core.group_version(), "v1");
        assert_eq!(core.group_label(), "core");
        assert_eq!(core.to_string(), "v1/configmaps");

        let apps = GroupVersionResource::new("apps", "v1", "deployments");
        assert_eq!(apps.group_version(), "apps/v1");
        assert_eq!(apps.to_string(), "apps/v1/deployments");
    }

    #[test]
    fn test_well_known_resources() {
        assert_eq!(GroupVersionResource::workspaces().to_string(), "tenancy.kcp.io/v1alpha1/workspaces");
        assert_eq!(GroupVersionResource::api_bindings("v1alpha2").to_string(), "apis.kcp.io/v1alpha2/apibindings");
        assert_eq!(GroupVersionResource::sync_targets().group, "workload.kcp.io");
    }

    #[test]
    fn test_export_reads_first_resource() {
        let raw = json!({
            "metadata": {"name": "widgets"},
            "spec": {"resources": [{"name": "widgets", "group": "example.io"}, {"name": "gadgets"}]},
            "status": {"conditions": [{"type": "Ready", "status": "True"}]}
        });
        let rel = ApiRelationship::from_export(raw.clone());
        assert_eq!(rel.name, "widgets");
        assert_eq!(rel.status, "Ready");
        assert_eq!(rel.kind_label(), "Export");
        assert_eq!(
            rel.kind,
            ApiRelationshipKind::Export {
                resource_name: Some("widgets".into()),
                resource_group: Some("example.io".into())
            }
        );
        assert_eq!(rel.raw, raw);
    }

    #[test]
    fn test_export_without_resources() {
        let rel = ApiRelationship::from_export(json!({"metadata": {"name": "bare"}}));
        assert_eq!(rel.kind, ApiRelationshipKind::Export { resource_name: None, resource_group: None });
        assert_eq!(rel.status, "Unknown");
    }

    #[test]
    fn test_binding_reads_export_reference() {
        let raw = json!({
            "metadata": {"name": "widgets-binding"},
            "spec": {"reference": {"export": {"name": "widgets", "path": "root:providers"}}},
            "status": {"phase": "Bound"}
        });
        let rel = ApiRelationship::from_binding(raw);
        assert_eq!(rel.status, "Bound");
        assert_eq!(
            rel.kind,
            ApiRelationshipKind::Binding {
                export_name: Some("widgets".into()),
                export_path: Some("root:providers".into())
            }
        );
    }

    #[test]
    fn test_wildcard_instance_workspace_from_annotation() {
        let tagged = json!({"kind": "ConfigMap", "metadata": {"name": "a", "annotations": {"kcp.io/cluster": "1abc"}}});
        assert_eq!(ResourceInstance::from_wildcard_object(&tagged).workspace, "1abc");

        let untagged = json!({"kind": "ConfigMap", "metadata": {"name": "b"}});
        assert_eq!(ResourceInstance::from_wildcard_object(&untagged).workspace, "unknown");
    }

    #[test]
    fn test_node_child_of() {
        let node = WorkspaceNode::child_of(&WorkspacePath::new("root:a"), "b");
        assert_eq!(node.name, "b");
        assert_eq!(node.path.as_str(), "root:a:b");
    }
}
