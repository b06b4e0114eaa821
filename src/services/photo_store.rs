// src/services/photo_store.rs
// DOCUMENTATION: Where gallery image bytes live
// PURPOSE: Local upload directory for development, Vercel Blob in production

use crate::config::Config;
use crate::errors::TournamentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// URL prefix under which local uploads are served
pub const LOCAL_UPLOAD_ROUTE: &str = "/static/uploads";

/// An object held by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub url: String,
    pub download_url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Backend name for logs and status output
    fn name(&self) -> &'static str;

    /// Storage key for a freshly generated file name
    fn pathname_for(&self, file_name: &str) -> String;

    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, TournamentError>;

    /// Delete by public URL or by pathname
    async fn delete(&self, url_or_pathname: &str) -> Result<(), TournamentError>;

    /// Objects currently held by the store
    async fn list(&self) -> Result<Vec<StoredObject>, TournamentError>;
}

/// Pick the backend the configuration asks for
pub fn build_photo_store(config: &Config) -> Arc<dyn PhotoStore> {
    if config.uses_blob_storage() {
        Arc::new(BlobPhotoStore::new(
            config.blob_api_url.clone(),
            config.blob_token.clone(),
            config.blob_prefix.clone(),
        ))
    } else {
        Arc::new(LocalPhotoStore::new(config.upload_dir.clone()))
    }
}

/// Files in a directory, served by the app under /static/uploads
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Map a URL or bare name to a path inside root, refusing traversal
    fn resolve(&self, url_or_pathname: &str) -> Result<PathBuf, TournamentError> {
        let name = url_or_pathname
            .strip_prefix(LOCAL_UPLOAD_ROUTE)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(url_or_pathname);

        let safe = !name.is_empty()
            && !name.contains('/')
            && !name.contains('\\')
            && !name.starts_with('.');
        if !safe {
            return Err(TournamentError::InvalidInput(format!(
                "Invalid file name: {}",
                url_or_pathname
            )));
        }

        Ok(self.root.join(name))
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn pathname_for(&self, file_name: &str) -> String {
        file_name.to_string()
    }

    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredObject, TournamentError> {
        let path = self.resolve(pathname)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let size = bytes.len() as u64;
        tokio::fs::write(&path, bytes).await?;

        let url = format!("{}/{}", LOCAL_UPLOAD_ROUTE, pathname);
        log::info!("Stored {} ({} bytes) in {}", pathname, size, self.root.display());

        Ok(StoredObject {
            download_url: url.clone(),
            url,
            pathname: pathname.to_string(),
            size,
            uploaded_at: Some(Utc::now()),
        })
    }

    async fn delete(&self, url_or_pathname: &str) -> Result<(), TournamentError> {
        let path = self.resolve(url_or_pathname)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Delete of missing file {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<StoredObject>, TournamentError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let url = format!("{}/{}", LOCAL_UPLOAD_ROUTE, name);
            objects.push(StoredObject {
                download_url: url.clone(),
                url,
                pathname: name,
                size: metadata.len(),
                uploaded_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        Ok(objects)
    }
}

/// Vercel Blob REST client
pub struct BlobPhotoStore {
    client: Client,
    base_url: String,
    token: String,
    prefix: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobPutResponse {
    url: String,
    download_url: Option<String>,
    pathname: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobListResponse {
    #[serde(default)]
    blobs: Vec<BlobEntry>,
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobEntry {
    url: String,
    download_url: Option<String>,
    pathname: String,
    #[serde(default)]
    size: u64,
    uploaded_at: Option<DateTime<Utc>>,
}

impl BlobPhotoStore {
    pub fn new(base_url: String, token: String, prefix: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            prefix,
        }
    }

    async fn check_status(response: reqwest::Response, action: &str) -> Result<reqwest::Response, TournamentError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::error!("Blob {} failed with {}: {}", action, status, body);
        Err(TournamentError::ExternalApiError(format!(
            "Blob {} failed with status {}",
            action, status
        )))
    }
}

#[async_trait]
impl PhotoStore for BlobPhotoStore {
    fn name(&self) -> &'static str {
        "vercel-blob"
    }

    fn pathname_for(&self, file_name: &str) -> String {
        format!("{}{}", self.prefix, file_name)
    }

    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, TournamentError> {
        let size = bytes.len() as u64;
        let response = self
            .client
            .put(format!("{}/{}", self.base_url, pathname))
            .bearer_auth(&self.token)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "0")
            .body(bytes)
            .send()
            .await?;

        let uploaded: BlobPutResponse = Self::check_status(response, "upload").await?.json().await?;
        log::info!("Uploaded {} to blob storage ({} bytes)", uploaded.pathname, size);

        Ok(StoredObject {
            download_url: uploaded.download_url.unwrap_or_else(|| uploaded.url.clone()),
            url: uploaded.url,
            pathname: uploaded.pathname,
            size,
            uploaded_at: Some(Utc::now()),
        })
    }

    async fn delete(&self, url_or_pathname: &str) -> Result<(), TournamentError> {
        let response = self
            .client
            .post(format!("{}/delete", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "urls": [url_or_pathname] }))
            .send()
            .await?;

        Self::check_status(response, "delete").await?;
        log::info!("Deleted blob {}", url_or_pathname);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredObject>, TournamentError> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("prefix", self.prefix.clone()), ("limit", "1000".to_string())];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let response = self
                .client
                .get(&self.base_url)
                .bearer_auth(&self.token)
                .query(&query)
                .send()
                .await?;
            let page: BlobListResponse = Self::check_status(response, "list").await?.json().await?;

            objects.extend(page.blobs.into_iter().map(|blob| StoredObject {
                download_url: blob.download_url.unwrap_or_else(|| blob.url.clone()),
                url: blob.url,
                pathname: blob.pathname,
                size: blob.size,
                uploaded_at: blob.uploaded_at,
            }));

            match page.cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_put_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path().join("uploads"));

        assert!(store.list().await.unwrap().is_empty());

        let stored = store
            .put("abc.jpg", vec![0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(stored.url, "/static/uploads/abc.jpg");
        assert_eq!(stored.size, 3);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pathname, "abc.jpg");

        store.delete("/static/uploads/abc.jpg").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        // Deleting again is not an error
        store.delete("abc.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path().to_path_buf());

        assert!(store.put("../evil.jpg", vec![1], "image/jpeg").await.is_err());
        assert!(store.delete("/static/uploads/../../etc/passwd").await.is_err());
        assert!(store.delete(".hidden").await.is_err());
    }

    #[test]
    fn test_blob_pathname_uses_prefix() {
        let store = BlobPhotoStore::new(
            "https://blob.example.com/".to_string(),
            "token".to_string(),
            "onamrage25/".to_string(),
        );
        assert_eq!(store.pathname_for("x.png"), "onamrage25/x.png");
        assert_eq!(store.base_url, "https://blob.example.com");
    }

    #[test]
    fn test_blob_list_response_parses() {
        let page: BlobListResponse = serde_json::from_str(
            r#"{"blobs":[{"url":"https://b/onamrage25/a.jpg","downloadUrl":"https://b/onamrage25/a.jpg?download=1","pathname":"onamrage25/a.jpg","size":42,"uploadedAt":"2025-08-05T10:00:00.000Z"}],"hasMore":false}"#,
        )
        .unwrap();
        assert_eq!(page.blobs.len(), 1);
        assert_eq!(page.blobs[0].size, 42);
        assert!(!page.has_more);
    }
}
