pub mod client;
pub mod discovery;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
pub mod http;
pub mod session;

pub use client::{ApiClient, Connector};
pub use http::HttpConnector;
pub use session::WorkspaceSession;
