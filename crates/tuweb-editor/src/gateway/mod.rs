// ABOUTME: Contract for reading and writing remote file content by path
// ABOUTME: Writes are conflict-checked against the version token of the last read

mod fs;
mod memory;

pub use fs::FsGateway;
pub use memory::InMemoryGateway;

use async_trait::async_trait;
use tuweb_types::VersionToken;

use crate::error::GatewayError;

/// Content of a remote file together with its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContent {
    pub content: String,
    pub version: VersionToken,
}

/// Remote source of file content, e.g. a source-control provider.
///
/// Implementations must reject a `put_content` whose `version` is not the
/// current remote version with [`GatewayError::Conflict`].
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Fetch `path` as it exists on `source_ref`
    async fn get_content(&self, path: &str, source_ref: &str)
    -> Result<RemoteContent, GatewayError>;

    /// Replace `path` on `source_ref`, returning the new version token
    async fn put_content(
        &self,
        path: &str,
        source_ref: &str,
        content: &str,
        version: &VersionToken,
    ) -> Result<VersionToken, GatewayError>;
}
