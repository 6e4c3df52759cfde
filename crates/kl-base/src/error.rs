use std::path::PathBuf;

use thiserror::Error;

/// Rebinding the session to a new address failed. Nothing about the session changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("invalid server address '{server}': {reason}")]
    InvalidAddress { server: String, reason: String },
    #[error("failed to build client for {server}: {reason}")]
    Client { server: String, reason: String },
}

/// A workspace-scoped listing failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// No usable credential context. Fatal before the interactive loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no kubeconfig found: pass --kubeconfig, set KUBECONFIG or create ~/.kube/config")]
    NoKubeconfig,
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse kubeconfig {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("kubeconfig defines no contexts")]
    NoContexts,
    #[error("context '{0}' not found in kubeconfig")]
    UnknownContext(String),
    #[error("context '{context}' references unknown cluster '{cluster}'")]
    UnknownCluster { context: String, cluster: String },
    #[error("cluster of context '{0}' has no server address")]
    MissingServer(String),
    #[error("invalid credentials for context '{context}': {reason}")]
    Credentials { context: String, reason: String },
    #[error(transparent)]
    Connect(#[from] ConnectError),
}
