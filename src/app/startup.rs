//! Choosing a credential context and opening the session before the UI starts.

use std::sync::Arc;

use kl_base::StartupError;
use kl_base::config::{KubeConfig, resolve_kubeconfig_path};
use kl_session::{HttpConnector, WorkspaceSession};
use tracing::{info, warn};

use crate::cli::Cli;

pub enum StartupMode {
    /// A context was chosen and its session is bound to root.
    Session { context: String, session: WorkspaceSession },
    /// Several contexts exist and none was named; the user picks one.
    SelectContext { contexts: Vec<String>, current: Option<String> },
}

pub struct Startup {
    pub kubeconfig: KubeConfig,
    pub mode: StartupMode,
}

impl Startup {
    pub fn from_cli(cli: &Cli) -> Result<Self, StartupError> {
        let path = resolve_kubeconfig_path(cli.kubeconfig.as_deref())?;
        info!(path = %path.display(), "loading kubeconfig");
        let kubeconfig = KubeConfig::load(&path)?;
        let mode = decide(&kubeconfig, cli.context.as_deref(), open_session)?;
        Ok(Self { kubeconfig, mode })
    }
}

pub fn decide(
    kubeconfig: &KubeConfig,
    explicit: Option<&str>,
    open: impl Fn(&KubeConfig, &str) -> Result<WorkspaceSession, StartupError>,
) -> Result<StartupMode, StartupError> {
    let contexts = kubeconfig.context_names();
    let chosen = match (explicit, contexts.as_slice()) {
        (Some(name), _) => name.to_string(),
        (None, []) => return Err(StartupError::NoContexts),
        (None, [only]) => only.clone(),
        (None, _) => {
            info!(count = contexts.len(), "several contexts available, asking");
            let current = kubeconfig.current_context().map(str::to_string);
            return Ok(StartupMode::SelectContext { contexts, current });
        }
    };

    info!(context = %chosen, "opening context");
    let session = open(kubeconfig, &chosen)?;
    Ok(StartupMode::Session { context: chosen, session })
}

/// Resolve `context` and bind a session to the root workspace of its server.
pub fn open_session(kubeconfig: &KubeConfig, context: &str) -> Result<WorkspaceSession, StartupError> {
    let resolved = kubeconfig.resolve(context)?;
    if let Some(command) = &resolved.credentials.exec_command
        && resolved.credentials.is_anonymous()
    {
        warn!(%context, %command, "exec credential plugins are not run; requests go out unauthenticated");
    }
    let connector = Arc::new(HttpConnector::new(resolved.credentials));
    Ok(WorkspaceSession::connect(connector, &resolved.server)?)
}
