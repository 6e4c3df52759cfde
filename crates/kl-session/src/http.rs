//! Blocking HTTP transport against a kcp front proxy.

use std::sync::Arc;
use std::time::Duration;

use kl_base::config::Credentials;
use kl_base::constants::{ERROR_BODY_MAX_BYTES, REQUEST_TIMEOUT_SECS};
use kl_base::{ConnectError, FetchError, GroupVersionResource};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::{Certificate, Identity, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ApiClient, Connector};
use crate::discovery::{ApiGroupList, ApiResourceList, ApiVersions};

/// Builds authenticated clients from one set of kubeconfig credentials.
pub struct HttpConnector {
    credentials: Arc<Credentials>,
}

impl HttpConnector {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials: Arc::new(credentials) }
    }

    fn build_client(&self) -> Result<Client, String> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(self.credentials.insecure_skip_tls_verify);

        if let Some(pem) = &self.credentials.ca_pem {
            let certs = Certificate::from_pem_bundle(pem).map_err(|e| format!("invalid CA bundle: {e}"))?;
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }
        if let Some(pem) = &self.credentials.identity_pem {
            let identity =
                Identity::from_pem(pem.expose_secret()).map_err(|e| format!("invalid client certificate: {e}"))?;
            builder = builder.identity(identity);
        }

        builder.build().map_err(|e| e.to_string())
    }
}

impl Connector for HttpConnector {
    fn connect(&self, server: &str) -> Result<Box<dyn ApiClient>, ConnectError> {
        let url = Url::parse(server)
            .map_err(|e| ConnectError::InvalidAddress { server: server.to_string(), reason: e.to_string() })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectError::InvalidAddress {
                server: server.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client = self.build_client().map_err(|reason| ConnectError::Client { server: server.to_string(), reason })?;
        Ok(Box::new(HttpClient {
            client,
            server: server.trim_end_matches('/').to_string(),
            credentials: Arc::clone(&self.credentials),
        }))
    }
}

struct HttpClient {
    client: Client,
    server: String,
    credentials: Arc<Credentials>,
}

impl HttpClient {
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.server, path);
        debug!(%url, "GET");

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.credentials.token {
            request = request.bearer_auth(token.expose_secret());
        } else if let Some(basic) = &self.credentials.basic {
            request = request.basic_auth(&basic.username, Some(basic.password.expose_secret()));
        }

        let response =
            request.send().map_err(|e| FetchError::Transport { url: url.clone(), message: e.to_string() })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| FetchError::Transport { url: url.clone(), message: e.to_string() })?;

        match status {
            200..=299 => serde_json::from_str(&body).map_err(|e| FetchError::Decode { url, message: e.to_string() }),
            _ => Err(FetchError::Status { url, status, body: truncate(body.trim(), ERROR_BODY_MAX_BYTES).to_string() }),
        }
    }
}

impl ApiClient for HttpClient {
    fn server(&self) -> &str {
        &self.server
    }

    fn list(&self, resource: &GroupVersionResource, namespace: Option<&str>) -> Result<Vec<Value>, FetchError> {
        let list: ObjectList = self.get_json(&resource_path(resource, namespace))?;
        Ok(list.into_items())
    }

    fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, FetchError> {
        let mut lists = Vec::new();

        let core: ApiVersions = self.get_json("/api")?;
        if let Some(version) = core.versions.first() {
            self.push_resource_list(&mut lists, &format!("/api/{version}"), version);
        }

        let groups: ApiGroupList = self.get_json("/apis")?;
        for group in &groups.groups {
            if let Some(group_version) = group.preferred_group_version() {
                self.push_resource_list(&mut lists, &format!("/apis/{group_version}"), group_version);
            }
        }

        Ok(lists)
    }
}

impl HttpClient {
    /// A group whose document cannot be fetched is left out rather than failing discovery.
    fn push_resource_list(&self, lists: &mut Vec<ApiResourceList>, path: &str, group_version: &str) {
        match self.get_json::<ApiResourceList>(path) {
            Ok(mut list) => {
                if list.group_version.is_empty() {
                    list.group_version = group_version.to_string();
                }
                lists.push(list);
            }
            Err(error) => warn!(%group_version, %error, "skipping API group in discovery"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ObjectList {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    items: Vec<Value>,
}

impl ObjectList {
    /// List items usually omit `kind`; recover it from the list kind.
    fn into_items(self) -> Vec<Value> {
        let item_kind = self.kind.strip_suffix("List").filter(|k| !k.is_empty()).map(str::to_string);
        let mut items = self.items;
        if let Some(kind) = item_kind {
            for item in &mut items {
                if let Some(map) = item.as_object_mut()
                    && !map.contains_key("kind")
                {
                    map.insert("kind".to_string(), Value::String(kind.clone()));
                }
            }
        }
        items
    }
}

fn resource_path(resource: &GroupVersionResource, namespace: Option<&str>) -> String {
    let prefix = if resource.group.is_empty() {
        format!("/api/{}", resource.version)
    } else {
        format!("/apis/{}/{}", resource.group, resource.version)
    };
    match namespace.filter(|ns| !ns.is_empty()) {
        Some(ns) => format!("{prefix}/namespaces/{ns}/{}", resource.resource),
        None => format!("{prefix}/{}", resource.resource),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
