// ABOUTME: Content gateway backed by a local directory
// ABOUTME: Version tokens are content hashes, so external edits are detected as conflicts

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tuweb_logging::debug;
use tuweb_types::VersionToken;

use super::{ContentGateway, RemoteContent};
use crate::error::GatewayError;

/// Gateway serving files below `root`. The source reference is ignored.
#[derive(Debug, Clone)]
pub struct FsGateway {
    root: PathBuf,
}

impl FsGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a gateway path below the root, refusing anything that would escape it
    fn resolve(&self, path: &str, source_ref: &str) -> Result<PathBuf, GatewayError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(GatewayError::not_found(path, source_ref));
        }
        Ok(self.root.join(relative))
    }
}

/// Version token for a file's content
fn content_token(content: &str) -> VersionToken {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    VersionToken::new(format!("{:016x}-{}", hasher.finish(), content.len()))
}

fn map_io(path: &str, source_ref: &str, error: std::io::Error) -> GatewayError {
    match error.kind() {
        ErrorKind::NotFound => GatewayError::not_found(path, source_ref),
        ErrorKind::PermissionDenied => GatewayError::auth(format!("permission denied for '{path}'")),
        _ => GatewayError::transport(format!("{path}: {error}")),
    }
}

#[async_trait]
impl ContentGateway for FsGateway {
    async fn get_content(
        &self,
        path: &str,
        source_ref: &str,
    ) -> Result<RemoteContent, GatewayError> {
        let full = self.resolve(path, source_ref)?;
        let content = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| map_io(path, source_ref, e))?;

        debug!(path = %full.display(), bytes = content.len(), "Read file");
        let version = content_token(&content);
        Ok(RemoteContent { content, version })
    }

    async fn put_content(
        &self,
        path: &str,
        source_ref: &str,
        content: &str,
        version: &VersionToken,
    ) -> Result<VersionToken, GatewayError> {
        let full = self.resolve(path, source_ref)?;
        let current = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| map_io(path, source_ref, e))?;

        if content_token(&current) != *version {
            return Err(GatewayError::conflict(path));
        }

        tokio::fs::write(&full, content)
            .await
            .map_err(|e| map_io(path, source_ref, e))?;

        debug!(path = %full.display(), bytes = content.len(), "Wrote file");
        Ok(content_token(content))
    }
}
