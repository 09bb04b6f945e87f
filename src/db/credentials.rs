// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-file credential persistence.

use crate::error::{AppError, Result};
use crate::models::Credential;
use std::path::{Path, PathBuf};

/// Reads and atomically rewrites the credential JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the credential. Missing or malformed files are credential errors.
    pub async fn load(&self) -> Result<Credential> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Credential(format!(
                "Failed to read credential file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_slice(&data).map_err(|e| {
            AppError::Credential(format!(
                "Failed to parse credential file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Overwrite the credential file (temp file + rename).
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        let json = serde_json::to_vec_pretty(credential)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Credential encode failed: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Credential(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        tokio::fs::write(&tmp_path, &json).await.map_err(|e| {
            AppError::Credential(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            AppError::Credential(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "Credential persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_credential_error() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("refresh_token.json"));

        assert!(matches!(store.load().await, Err(AppError::Credential(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_credential_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh_token.json");
        std::fs::write(&path, b"{\"access_token\": ").unwrap();

        let err = CredentialStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, AppError::Credential(_)));
    }

    #[tokio::test]
    async fn test_save_replaces_and_keeps_athlete() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested/refresh_token.json"));

        let mut credential = Credential {
            token_type: Some("Bearer".to_string()),
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
            expires_at: 100,
            expires_in: Some(21600),
            athlete: Some(serde_json::json!({"id": 7})),
            extra: Default::default(),
        };
        store.save(&credential).await.unwrap();

        credential.access_token = "a2".to_string();
        store.save(&credential).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, credential);
        assert!(!dir.path().join("nested/refresh_token.json.tmp").exists());
    }
}
