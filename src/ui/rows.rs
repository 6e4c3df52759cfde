//! Two-line row text for each listed item.

use kl_base::{ApiRelationship, ApiRelationshipKind, AvailableResourceType, ResourceInstance, SyncTarget, WorkspaceNode};

pub trait Row {
    fn title(&self) -> String;
    fn description(&self) -> String;
    /// Status word to colour, if the row has one.
    fn status(&self) -> Option<&str> {
        None
    }
}

impl Row for String {
    fn title(&self) -> String {
        self.clone()
    }

    fn description(&self) -> String {
        "Context".to_string()
    }
}

impl Row for WorkspaceNode {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Path: {}", self.path)
    }
}

impl Row for ApiRelationship {
    fn title(&self) -> String {
        match &self.kind {
            ApiRelationshipKind::Binding { export_name, .. } => {
                format!("Binding: {}", or_dash(export_name.as_deref()))
            }
            ApiRelationshipKind::Export { resource_name, resource_group } => {
                format!("Export: {}/{}", or_dash(resource_group.as_deref()), or_dash(resource_name.as_deref()))
            }
        }
    }

    fn description(&self) -> String {
        match &self.kind {
            ApiRelationshipKind::Binding { export_path, .. } => {
                format!("from: {} | status: {}", or_dash(export_path.as_deref()), self.status)
            }
            ApiRelationshipKind::Export { .. } => format!("provides API to consumers | status: {}", self.status),
        }
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

impl Row for SyncTarget {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Status: {}", self.status)
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

impl Row for AvailableResourceType {
    fn title(&self) -> String {
        format!("{} ({}.{})", self.kind, self.resource.resource, self.resource.group_label())
    }

    fn description(&self) -> String {
        let scope = if self.namespaced { "Namespaced" } else { "Cluster-scoped" };
        format!("GVR: {} | {scope}", self.resource)
    }
}

impl Row for ResourceInstance {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Namespace: {} | Workspace: {}", or_dash(self.namespace.as_deref()), self.workspace)
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kl_base::{GroupVersionResource, WorkspacePath};
    use serde_json::json;

    #[test]
    fn test_workspace_row() {
        let node = WorkspaceNode::child_of(&WorkspacePath::root(), "team");
        assert_eq!(node.title(), "team");
        assert_eq!(node.description(), "Path: root:team");
    }

    #[test]
    fn test_binding_row() {
        let rel = ApiRelationship {
            name: "b".into(),
            status: "Bound".into(),
            kind: ApiRelationshipKind::Binding {
                export_name: Some("widgets".into()),
                export_path: Some("root:org".into()),
            },
            raw: json!({}),
        };
        assert_eq!(rel.title(), "Binding: widgets");
        assert_eq!(rel.description(), "from: root:org | status: Bound");
        assert_eq!(Row::status(&rel), Some("Bound"));
    }

    #[test]
    fn test_export_row() {
        let rel = ApiRelationship {
            name: "e".into(),
            status: "Unknown".into(),
            kind: ApiRelationshipKind::Export { resource_name: Some("widgets".into()), resource_group: None },
            raw: json!({}),
        };
        assert_eq!(rel.title(), "Export: -/widgets");
        assert_eq!(rel.description(), "provides API to consumers | status: Unknown");
    }

    #[test]
    fn test_resource_type_row() {
        let core = AvailableResourceType {
            resource: GroupVersionResource::new("", "v1", "configmaps"),
            kind: "ConfigMap".into(),
            namespaced: true,
        };
        assert_eq!(core.title(), "ConfigMap (configmaps.core)");
        assert_eq!(core.description(), "GVR: v1/configmaps | Namespaced");

        let ws = AvailableResourceType {
            resource: GroupVersionResource::workspaces(),
            kind: "Workspace".into(),
            namespaced: false,
        };
        assert!(ws.description().ends_with("| Cluster-scoped"));
    }

    #[test]
    fn test_instance_row_without_namespace() {
        let instance =
            ResourceInstance { name: "n".into(), namespace: None, kind: "Node".into(), workspace: "root".into() };
        assert_eq!(instance.description(), "Namespace: - | Workspace: root");
    }
}
