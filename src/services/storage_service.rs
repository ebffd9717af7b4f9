// src/services/storage_service.rs

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::common::error::AppError;

/// Armazém de documentos em disco (tarifários enviados). Os arquivos são
/// referenciados pela chave relativa guardada no banco; a chave é gerada
/// aqui e nunca vem do usuário.
#[derive(Clone)]
pub struct StorageService {
    base_dir: PathBuf,
}

impl StorageService {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }

    /// Grava os bytes e devolve a chave relativa.
    pub async fn write(&self, bytes: &[u8], original_name: &str) -> Result<String, AppError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let key = format!("tariffs/{}.{}", Uuid::new_v4(), extension);

        let path = self.resolve(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))?;

        tracing::debug!(key = %key, bytes = bytes.len(), "Documento gravado");
        Ok(key)
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>, AppError> {
        tokio::fs::read(self.resolve(key))
            .await
            .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))
    }

    /// Remove um lote de chaves. Chave já inexistente não é erro: o
    /// objetivo é o estado final, não a contagem.
    pub async fn delete(&self, keys: &[String]) -> Result<(), AppError> {
        for key in keys {
            match tokio::fs::remove_file(self.resolve(key)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::InternalServerError(anyhow::Error::new(e))),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> StorageService {
        let dir = std::env::temp_dir().join(format!("odeplac-test-{}", Uuid::new_v4()));
        StorageService::new(dir)
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let store = temp_store();
        let key = store.write(b"%PDF-1.7 conteudo", "tarifa.pdf").await.unwrap();

        assert!(key.starts_with("tariffs/"));
        assert!(key.ends_with(".pdf"));
        assert_eq!(store.read(&key).await.unwrap(), b"%PDF-1.7 conteudo");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = temp_store();
        let key = store.write(b"x", "a.pdf").await.unwrap();

        store.delete(&[key.clone()]).await.unwrap();
        assert!(store.read(&key).await.is_err());
        // Segunda remoção da mesma chave não é erro.
        store.delete(&[key]).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_bin() {
        let store = temp_store();
        let key = store.write(b"x", "sin-extension").await.unwrap();
        assert!(key.ends_with(".bin"));
    }
}
