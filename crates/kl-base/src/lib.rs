pub mod config;
pub mod constants;
pub mod error;
pub mod object;
pub mod path;
pub mod types;

pub use error::{ConnectError, FetchError, StartupError};
pub use path::WorkspacePath;
pub use types::{
    ApiRelationship, ApiRelationshipKind, AvailableResourceType, GroupVersionResource, ResourceInstance, SyncTarget,
    WorkspaceNode,
};
