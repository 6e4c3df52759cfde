// =============================================================================
// WORKSPACE TREE
// =============================================================================

/// Path of the distinguished root workspace
pub const ROOT_WORKSPACE: &str = "root";

/// Separator between the segments of a workspace path
pub const PATH_SEPARATOR: char = ':';

/// URL segment that scopes every request to one logical cluster
pub const CLUSTERS_SEGMENT: &str = "/clusters/";

/// Logical cluster name that addresses all workspaces at once
pub const WILDCARD_CLUSTER: &str = "*";

/// Annotation naming the logical cluster of an object returned by a wildcard listing
pub const CLUSTER_ANNOTATION: &str = "kcp.io/cluster";

/// Workspace shown for wildcard results that carry no cluster annotation
pub const UNKNOWN_WORKSPACE: &str = "unknown";

// =============================================================================
// API GROUPS
// =============================================================================

pub const TENANCY_GROUP: &str = "tenancy.kcp.io";
pub const TENANCY_VERSION: &str = "v1alpha1";
pub const WORKSPACES_RESOURCE: &str = "workspaces";

pub const APIS_GROUP: &str = "apis.kcp.io";
pub const API_EXPORTS_RESOURCE: &str = "apiexports";
pub const API_BINDINGS_RESOURCE: &str = "apibindings";

/// Schema versions probed for exports and bindings, newest first
pub const API_VERSION_CANDIDATES: &[&str] = &["v1alpha2", "v1alpha1"];

pub const WORKLOAD_GROUP: &str = "workload.kcp.io";
pub const WORKLOAD_VERSION: &str = "v1alpha1";
pub const SYNC_TARGETS_RESOURCE: &str = "synctargets";

// =============================================================================
// STATUS
// =============================================================================

pub const STATUS_READY: &str = "Ready";
pub const STATUS_NOT_READY: &str = "NotReady";
pub const STATUS_UNKNOWN: &str = "Unknown";

// =============================================================================
// TRANSPORT
// =============================================================================

/// Per-request timeout applied by the HTTP transport
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum bytes of a response body quoted in an error message
pub const ERROR_BODY_MAX_BYTES: usize = 512;

/// Default kubeconfig location relative to the home directory
pub const DEFAULT_KUBECONFIG: &str = ".kube/config";

/// Environment variable listing kubeconfig files
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";
