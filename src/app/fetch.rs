//! Background listing jobs and the outcome messages they deliver.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use kl_base::{
    ApiRelationship, AvailableResourceType, FetchError, GroupVersionResource, ResourceInstance, SyncTarget,
    WorkspaceNode, WorkspacePath,
};
use kl_session::WorkspaceSession;
use tracing::{debug, warn};

use crate::app::events::AppEvent;

/// Where a resource-instance listing looked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceScope {
    Workspace(WorkspacePath),
    AllWorkspaces,
}

/// One session call to run off the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchJob {
    Workspaces { path: WorkspacePath },
    Apis { path: WorkspacePath },
    SyncTargets { path: WorkspacePath },
    ResourceTypes { path: WorkspacePath },
    Instances { path: WorkspacePath, resource: GroupVersionResource, namespace: Option<String> },
    InstancesAcrossWorkspaces { resource: GroupVersionResource },
}

#[derive(Debug)]
pub enum FetchOutcome {
    WorkspacesLoaded { path: WorkspacePath, nodes: Vec<WorkspaceNode> },
    ApisLoaded { path: WorkspacePath, relationships: Vec<ApiRelationship> },
    SyncTargetsLoaded { path: WorkspacePath, targets: Vec<SyncTarget> },
    AvailableResourceTypesLoaded { path: WorkspacePath, types: Vec<AvailableResourceType> },
    ResourceInstancesLoaded { resource: GroupVersionResource, scope: InstanceScope, instances: Vec<ResourceInstance> },
    Failed { error: FetchError },
}

impl FetchJob {
    pub fn run(self, session: &mut WorkspaceSession) -> FetchOutcome {
        let result = match self {
            FetchJob::Workspaces { path } => {
                session.list_child_workspaces(&path).map(|nodes| FetchOutcome::WorkspacesLoaded { path, nodes })
            }
            FetchJob::Apis { path } => session
                .list_api_relationships(&path)
                .map(|relationships| FetchOutcome::ApisLoaded { path, relationships }),
            FetchJob::SyncTargets { path } => {
                session.list_sync_targets(&path).map(|targets| FetchOutcome::SyncTargetsLoaded { path, targets })
            }
            FetchJob::ResourceTypes { path } => session
                .list_available_resource_types(&path)
                .map(|types| FetchOutcome::AvailableResourceTypesLoaded { path, types }),
            FetchJob::Instances { path, resource, namespace } => session
                .list_resource_instances(&path, &resource, namespace.as_deref())
                .map(|instances| FetchOutcome::ResourceInstancesLoaded {
                    resource,
                    scope: InstanceScope::Workspace(path),
                    instances,
                }),
            FetchJob::InstancesAcrossWorkspaces { resource } => {
                session.list_resources_across_all_workspaces(&resource).map(|instances| {
                    FetchOutcome::ResourceInstancesLoaded { resource, scope: InstanceScope::AllWorkspaces, instances }
                })
            }
        };

        result.unwrap_or_else(|error| {
            warn!(%error, "listing failed");
            FetchOutcome::Failed { error }
        })
    }
}

/// Runs jobs on worker threads against the one shared session.
///
/// The session lock is held for the whole call, so a workspace switch and a
/// wildcard listing can never interleave.
pub struct FetchDispatcher {
    session: Arc<Mutex<WorkspaceSession>>,
    tx: Sender<AppEvent>,
}

impl FetchDispatcher {
    pub fn new(session: WorkspaceSession, tx: Sender<AppEvent>) -> Self {
        Self { session: Arc::new(Mutex::new(session)), tx }
    }

    pub fn dispatch(&self, job: FetchJob) {
        debug!(?job, "dispatching fetch");
        let session = Arc::clone(&self.session);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let outcome = {
                let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
                job.run(&mut session)
            };
            // Receiver gone means the UI has exited.
            let _ = tx.send(AppEvent::Fetched(outcome));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    use kl_session::fixture::FixtureConnector;

    fn session(fixture: &FixtureConnector) -> WorkspaceSession {
        WorkspaceSession::connect(Arc::new(fixture.clone()), "https://kcp/clusters/root").unwrap()
    }

    #[test]
    fn test_run_workspaces_job() {
        let fixture = FixtureConnector::new().with_workspaces("root", &["a"]);
        let mut session = session(&fixture);
        match (FetchJob::Workspaces { path: WorkspacePath::root() }).run(&mut session) {
            FetchOutcome::WorkspacesLoaded { path, nodes } => {
                assert!(path.is_root());
                assert_eq!(nodes.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_run_failure_becomes_failed_outcome() {
        let fixture = FixtureConnector::new();
        let mut session = session(&fixture);
        let outcome = (FetchJob::SyncTargets { path: WorkspacePath::root() }).run(&mut session);
        assert!(matches!(outcome, FetchOutcome::Failed { error: FetchError::Status { status: 404, .. } }));
    }

    #[test]
    fn test_run_instances_carries_scope() {
        let configmaps = GroupVersionResource::new("", "v1", "configmaps");
        let fixture = FixtureConnector::new().with_objects("root", configmaps.clone(), vec![]);
        let mut session = session(&fixture);
        let job = FetchJob::Instances { path: WorkspacePath::root(), resource: configmaps.clone(), namespace: None };
        match job.run(&mut session) {
            FetchOutcome::ResourceInstancesLoaded { resource, scope, instances } => {
                assert_eq!(resource, configmaps);
                assert_eq!(scope, InstanceScope::Workspace(WorkspacePath::root()));
                assert!(instances.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_delivers_on_channel() {
        let fixture = FixtureConnector::new().with_workspaces("root", &["a", "b"]);
        let (tx, rx) = mpsc::channel();
        let dispatcher = FetchDispatcher::new(session(&fixture), tx);

        dispatcher.dispatch(FetchJob::Workspaces { path: WorkspacePath::root() });
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Fetched(FetchOutcome::WorkspacesLoaded { nodes, .. }) => assert_eq!(nodes.len(), 2),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
