use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretBox;

use super::{ClusterEntry, UserEntry};
use crate::error::StartupError;

#[derive(Debug)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretBox<String>,
}

/// Everything the transport needs to authenticate against one server.
#[derive(Debug, Default)]
pub struct Credentials {
    pub token: Option<SecretBox<String>>,
    pub basic: Option<BasicAuth>,
    /// PEM bundle of trusted certificate authorities.
    pub ca_pem: Option<Vec<u8>>,
    /// Client certificate followed by its private key, both PEM.
    pub identity_pem: Option<SecretBox<Vec<u8>>>,
    pub insecure_skip_tls_verify: bool,
    /// Set when the user authenticates through an exec plugin, which is not run.
    pub exec_command: Option<String>,
}

impl Credentials {
    pub fn load(
        context: &str,
        cluster: &ClusterEntry,
        user: Option<&UserEntry>,
        base_dir: &Path,
    ) -> Result<Self, StartupError> {
        let mut creds = Credentials {
            ca_pem: data_or_file(
                context,
                cluster.certificate_authority_data.as_deref(),
                cluster.certificate_authority.as_deref(),
                base_dir,
            )?,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
            ..Default::default()
        };

        let Some(user) = user else {
            return Ok(creds);
        };

        if let Some(token) = user.token.as_deref().filter(|t| !t.is_empty()) {
            creds.token = Some(SecretBox::new(Box::new(token.to_string())));
        } else if let Some(file) = user.token_file.as_deref().filter(|f| !f.is_empty()) {
            let path = base_dir.join(file);
            let token = fs::read_to_string(&path).map_err(|source| StartupError::Read { path, source })?;
            creds.token = Some(SecretBox::new(Box::new(token.trim().to_string())));
        }

        if let Some(username) = user.username.as_deref().filter(|u| !u.is_empty()) {
            creds.basic = Some(BasicAuth {
                username: username.to_string(),
                password: SecretBox::new(Box::new(user.password.clone().unwrap_or_default())),
            });
        }

        let cert = data_or_file(
            context,
            user.client_certificate_data.as_deref(),
            user.client_certificate.as_deref(),
            base_dir,
        )?;
        let key = data_or_file(context, user.client_key_data.as_deref(), user.client_key.as_deref(), base_dir)?;
        match (cert, key) {
            (Some(mut cert), Some(key)) => {
                if !cert.ends_with(b"\n") {
                    cert.push(b'\n');
                }
                cert.extend_from_slice(&key);
                creds.identity_pem = Some(SecretBox::new(Box::new(cert)));
            }
            (None, None) => {}
            _ => {
                return Err(StartupError::Credentials {
                    context: context.to_string(),
                    reason: "client certificate and client key must be given together".to_string(),
                });
            }
        }

        creds.exec_command = user.exec.as_ref().map(|e| e.command.clone());
        Ok(creds)
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none() && self.basic.is_none() && self.identity_pem.is_none()
    }
}

/// Inline base64 data wins over a file reference. Relative files resolve against `base_dir`.
fn data_or_file(
    context: &str,
    data: Option<&str>,
    file: Option<&str>,
    base_dir: &Path,
) -> Result<Option<Vec<u8>>, StartupError> {
    if let Some(data) = data.filter(|d| !d.trim().is_empty()) {
        let bytes = STANDARD.decode(data.trim()).map_err(|e| StartupError::Credentials {
            context: context.to_string(),
            reason: format!("invalid base64 data: {e}"),
        })?;
        return Ok(Some(bytes));
    }
    match file.filter(|f| !f.is_empty()) {
        Some(file) => {
            let path = base_dir.join(file);
            fs::read(&path).map(Some).map_err(|source| StartupError::Read { path, source })
        }
        None => Ok(None),
    }
}
