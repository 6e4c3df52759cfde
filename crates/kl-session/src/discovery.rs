//! Decoding of API discovery documents and the resource types derived from them.

use std::collections::HashSet;

use kl_base::{AvailableResourceType, GroupVersionResource};
use serde::Deserialize;

/// `GET /api`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVersions {
    #[serde(default)]
    pub versions: Vec<String>,
}

/// `GET /apis`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiGroupList {
    #[serde(default)]
    pub groups: Vec<ApiGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<GroupVersionForDiscovery>,
    pub preferred_version: Option<GroupVersionForDiscovery>,
}

impl ApiGroup {
    /// The server-preferred `group/version`, falling back to the first listed one.
    pub fn preferred_group_version(&self) -> Option<&str> {
        self.preferred_version
            .as_ref()
            .or_else(|| self.versions.first())
            .map(|v| v.group_version.as_str())
            .filter(|gv| !gv.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionForDiscovery {
    pub group_version: String,
    #[serde(default)]
    pub version: String,
}

/// `GET /api/v1` or `GET /apis/{group}/{version}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    #[serde(default)]
    pub group_version: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResource {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespaced: bool,
    #[serde(default)]
    pub verbs: Vec<String>,
}

/// Split `group/version` (or a bare core `version`) into its parts.
pub fn split_group_version(group_version: &str) -> Option<(&str, &str)> {
    match group_version.split_once('/') {
        None if !group_version.is_empty() => Some(("", group_version)),
        Some((group, version)) if !group.is_empty() && !version.is_empty() && !version.contains('/') => {
            Some((group, version))
        }
        _ => None,
    }
}

/// Flatten discovery lists into resource types.
///
/// Sub-resources (`pods/log`) are dropped, unparseable group versions are
/// skipped, and a `(resource, group)` pair seen twice keeps its first entry.
pub fn collect_available_types(lists: &[ApiResourceList]) -> Vec<AvailableResourceType> {
    let mut seen = HashSet::new();
    let mut available = Vec::new();

    for list in lists {
        let Some((group, version)) = split_group_version(&list.group_version) else {
            continue;
        };
        for resource in &list.resources {
            if resource.name.contains('/') {
                continue;
            }
            if !seen.insert((resource.name.clone(), group.to_string())) {
                continue;
            }
            available.push(AvailableResourceType {
                resource: GroupVersionResource::new(group, version, resource.name.clone()),
                kind: resource.kind.clone(),
                namespaced: resource.namespaced,
            });
        }
    }

    available
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, kind: &str, namespaced: bool) -> ApiResource {
        ApiResource { name: name.into(), kind: kind.into(), namespaced, verbs: vec!["list".into()] }
    }

    #[test]
    fn test_split_group_version() {
        assert_eq!(split_group_version("v1"), Some(("", "v1")));
        assert_eq!(split_group_version("apps/v1"), Some(("apps", "v1")));
        assert_eq!(split_group_version(""), None);
        assert_eq!(split_group_version("a/b/c"), None);
        assert_eq!(split_group_version("/v1"), None);
    }

    #[test]
    fn test_collect_skips_subresources_and_dedupes() {
        let lists = vec![
            ApiResourceList {
                group_version: "v1".into(),
                resources: vec![
                    resource("configmaps", "ConfigMap", true),
                    resource("pods", "Pod", true),
                    resource("pods/log", "Pod", true),
                ],
            },
            ApiResourceList {
                group_version: "apis.kcp.io/v1alpha2".into(),
                resources: vec![resource("apiexports", "APIExport", false)],
            },
            ApiResourceList {
                group_version: "apis.kcp.io/v1alpha1".into(),
                resources: vec![resource("apiexports", "APIExport", false), resource("apibindings", "APIBinding", false)],
            },
            ApiResourceList { group_version: "not/a/version".into(), resources: vec![resource("x", "X", false)] },
        ];

        let types = collect_available_types(&lists);
        let names: Vec<String> = types.iter().map(|t| t.resource.to_string()).collect();
        assert_eq!(
            names,
            vec!["v1/configmaps", "v1/pods", "apis.kcp.io/v1alpha2/apiexports", "apis.kcp.io/v1alpha1/apibindings"]
        );
        assert!(!types[2].namespaced);
        assert_eq!(types[0].kind, "ConfigMap");
    }

    #[test]
    fn test_same_name_in_different_groups_kept() {
        let lists = vec![
            ApiResourceList { group_version: "v1".into(), resources: vec![resource("events", "Event", true)] },
            ApiResourceList {
                group_version: "events.k8s.io/v1".into(),
                resources: vec![resource("events", "Event", true)],
            },
        ];
        assert_eq!(collect_available_types(&lists).len(), 2);
    }

    #[test]
    fn test_decode_group_list() {
        let doc = r#"{"kind":"APIGroupList","groups":[
            {"name":"apps","versions":[{"groupVersion":"apps/v1","version":"v1"}],
             "preferredVersion":{"groupVersion":"apps/v1","version":"v1"}},
            {"name":"legacy","versions":[{"groupVersion":"legacy/v2","version":"v2"}]},
            {"name":"empty"}]}"#;
        let list: ApiGroupList = serde_json::from_str(doc).unwrap();
        let preferred: Vec<Option<&str>> = list.groups.iter().map(ApiGroup::preferred_group_version).collect();
        assert_eq!(preferred, vec![Some("apps/v1"), Some("legacy/v2"), None]);
    }
}
