use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_LOG_FILE, LOG_FILE_ENV};

/// Terminal explorer for kcp workspaces.
#[derive(Debug, Parser)]
#[command(name = "kcplens", version, about)]
pub struct Cli {
    /// Kubeconfig file to read (defaults to $KUBECONFIG, then ~/.kube/config)
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Context to open, skipping the context selector
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,

    /// Only list instances of namespaced types in this namespace
    #[arg(short = 'n', long, value_name = "NS")]
    pub namespace: Option<String>,

    /// Where to write logs (defaults to $KCPLENS_LOG, then kcplens.log in the temp dir)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .or_else(|| std::env::var_os(LOG_FILE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
    }

    pub fn namespace(&self) -> Option<String> {
        self.namespace.clone().filter(|ns| !ns.is_empty())
    }
}
