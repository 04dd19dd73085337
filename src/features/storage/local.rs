use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::{FileInfo, StorageAdapter, StorageError};
use crate::data::models::StorageKind;

/// Application-managed storage on the local filesystem.
///
/// File ids are paths relative to `root`, shaped `user-<owner>/<uuid>-<name>`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, file_id: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(file_id);
        let only_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if file_id.is_empty() || !only_normal {
            return Err(StorageError::InvalidFileId(file_id.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn sanitize(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl StorageAdapter for LocalStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::App
    }

    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        owner_hint: &str,
    ) -> Result<String, StorageError> {
        let folder = format!("user-{}", sanitize(owner_hint));
        let name = format!("{}-{}", Uuid::new_v4(), sanitize(filename));

        tokio::fs::create_dir_all(self.root.join(&folder)).await?;
        tokio::fs::write(self.root.join(&folder).join(&name), data).await?;

        Ok(format!("{}/{}", folder, name))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(file_id)?;
        Ok(tokio::fs::read(path).await?)
    }

    async fn delete(&self, file_id: &str) -> Result<bool, StorageError> {
        let path = self.resolve(file_id)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn metadata(&self, file_id: &str) -> Result<FileInfo, StorageError> {
        let path = self.resolve(file_id)?;
        let meta = tokio::fs::metadata(&path).await?;

        Ok(FileInfo {
            file_id: file_id.to_string(),
            file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            file_size: meta.len() as i64,
            mime_type: Some("application/pdf".to_string()),
            created_time: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_file_can_be_read_back_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let id = storage
            .upload(b"%PDF-1.5 test".to_vec(), "My Book.pdf", "42")
            .await
            .unwrap();
        assert!(id.starts_with("user-42/"));
        assert!(id.ends_with("-My_Book.pdf"));

        assert_eq!(storage.download(&id).await.unwrap(), b"%PDF-1.5 test");
        assert_eq!(storage.metadata(&id).await.unwrap().file_size, 13);

        assert!(storage.delete(&id).await.unwrap());
        assert!(!storage.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        for id in ["../secret.pdf", "/etc/passwd", "user-1/../../x", ""] {
            assert!(matches!(
                storage.download(id).await,
                Err(StorageError::InvalidFileId(_))
            ));
        }
    }

    #[test]
    fn sanitize_strips_separators_and_leading_dots() {
        assert_eq!(sanitize("../a b.pdf"), "_a_b.pdf");
        assert_eq!(sanitize("..."), "file");
    }
}
