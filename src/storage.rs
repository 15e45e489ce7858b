use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;

/// Where avatar files end up. Faked in tests.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    async fn save(&self, filename: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Local-disk store; files are served back via the `/uploads` static route.
#[derive(Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AvatarStore for DiskStore {
    async fn save(&self, filename: &str, body: Bytes) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create upload dir {}", self.root.display()))?;
        let path = self.root.join(filename);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write avatar {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disk_store_writes_file() {
        let dir = std::env::temp_dir().join(format!("avatars-{}", uuid::Uuid::new_v4()));
        let store = DiskStore::new(&dir);
        store
            .save("a.png", Bytes::from_static(b"png-bytes"))
            .await
            .expect("save should succeed");
        let written = tokio::fs::read(dir.join("a.png")).await.expect("read back");
        assert_eq!(written, b"png-bytes");
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
