//! Kubeconfig loading: credential contexts and the server they point at.

pub mod credentials;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::constants::{DEFAULT_KUBECONFIG, KUBECONFIG_ENV};
use crate::error::StartupError;

pub use credentials::{BasicAuth, Credentials};

// ============================================================================
// File format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contexts: Vec<NamedContext>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<NamedUser>,
    #[serde(default)]
    pub current_context: Option<String>,
    /// Directory relative file references are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterEntry {
    #[serde(default)]
    pub server: String,
    pub certificate_authority: Option<String>,
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: UserEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserEntry {
    pub token: Option<String>,
    #[serde(rename = "tokenFile")]
    pub token_file: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_certificate: Option<String>,
    pub client_certificate_data: Option<String>,
    pub client_key: Option<String>,
    pub client_key_data: Option<String>,
    pub exec: Option<ExecEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecEntry {
    #[serde(default)]
    pub command: String,
}

/// kubectl writes `contexts: null` for empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Resolution
// ============================================================================

/// A context with its cluster and user entries looked up and loaded.
#[derive(Debug)]
pub struct ResolvedContext {
    pub name: String,
    pub server: String,
    pub credentials: Credentials,
}

impl KubeConfig {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let text = fs::read_to_string(path).map_err(|source| StartupError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path)
    }

    /// Parse kubeconfig text that was read from `path`.
    pub fn parse(text: &str, path: &Path) -> Result<Self, StartupError> {
        let mut config: KubeConfig =
            serde_yaml::from_str(text).map_err(|source| StartupError::Parse { path: path.to_path_buf(), source })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn context_names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name.clone()).collect()
    }

    /// The `current-context` entry, if set and naming a defined context.
    pub fn current_context(&self) -> Option<&str> {
        self.current_context
            .as_deref()
            .filter(|name| !name.is_empty() && self.contexts.iter().any(|c| c.name == *name))
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedContext, StartupError> {
        let context = self
            .contexts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| StartupError::UnknownContext(name.to_string()))?;

        let cluster = self.clusters.iter().find(|c| c.name == context.context.cluster).ok_or_else(|| {
            StartupError::UnknownCluster { context: name.to_string(), cluster: context.context.cluster.clone() }
        })?;

        let server = cluster.cluster.server.trim();
        if server.is_empty() {
            return Err(StartupError::MissingServer(name.to_string()));
        }

        // A context without a matching user entry connects anonymously.
        let user = self.users.iter().find(|u| u.name == context.context.user).map(|u| &u.user);
        let credentials = Credentials::load(name, &cluster.cluster, user, &self.base_dir)?;

        Ok(ResolvedContext { name: name.to_string(), server: server.to_string(), credentials })
    }
}

/// Pick the kubeconfig file: the explicit path, else the first `KUBECONFIG` entry, else `~/.kube/config`.
pub fn resolve_kubeconfig_path(explicit: Option<&Path>) -> Result<PathBuf, StartupError> {
    locate_kubeconfig(explicit, std::env::var_os(KUBECONFIG_ENV), dirs::home_dir())
}

fn locate_kubeconfig(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, StartupError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env_value
        && let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty())
    {
        return Ok(first);
    }
    match home.map(|h| h.join(DEFAULT_KUBECONFIG)) {
        Some(path) if path.is_file() => Ok(path),
        _ => Err(StartupError::NoKubeconfig),
    }
}
