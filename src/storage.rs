use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

/// Where uploaded profile pictures live. Keys are collision-resistant
/// (uuid-based), so concurrent uploads never clobber each other.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Local-filesystem storage rooted at the configured media directory.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn new(root: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(root)
            .await
            .with_context(|| format!("create media root {}", root))?;
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.context("create object dir")?;
        }
        fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        fs::remove_file(&path)
            .await
            .with_context(|| format!("remove {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("matchbook-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.to_str().unwrap())
            .await
            .expect("create storage");

        storage
            .put_object("profiles/abc/pic.jpg", Bytes::from_static(b"jpegbytes"))
            .await
            .expect("put");
        let on_disk = tokio::fs::read(dir.join("profiles/abc/pic.jpg"))
            .await
            .expect("read back");
        assert_eq!(on_disk, b"jpegbytes");

        storage
            .delete_object("profiles/abc/pic.jpg")
            .await
            .expect("delete");
        assert!(tokio::fs::read(dir.join("profiles/abc/pic.jpg"))
            .await
            .is_err());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn delete_missing_object_errors() {
        let dir = std::env::temp_dir().join(format!("matchbook-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.to_str().unwrap())
            .await
            .expect("create storage");
        assert!(storage.delete_object("nope.jpg").await.is_err());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
