use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError>;
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// `{firm}/{client}/{uuid}-{name}` with the name reduced to safe characters.
pub fn storage_key(firm_id: &str, client_id: &str, original_name: &str) -> String {
    let safe_name: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{}/{}-{}", firm_id, client_id, Uuid::new_v4(), safe_name)
}

pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid storage key: {}",
                key
            )));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                anyhow::anyhow!("Stored file {} not found", key),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage
            .upload("firm-1/client-1/a.pdf", b"%PDF".to_vec())
            .await
            .unwrap();
        assert_eq!(
            storage.download("firm-1/client-1/a.pdf").await.unwrap(),
            b"%PDF".to_vec()
        );

        storage.delete("firm-1/client-1/a.pdf").await.unwrap();
        assert!(matches!(
            storage.download("firm-1/client-1/a.pdf").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_keys_outside_the_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.upload("../escape.txt", vec![1]).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn storage_keys_are_scoped_and_sanitised() {
        let key = storage_key("firm-1", "client-1", "Invoice May/24 (1).pdf");
        assert!(key.starts_with("firm-1/client-1/"));
        assert!(key.ends_with("-Invoice_May_24__1_.pdf"));
    }
}
