// src/services/gallery_service.rs
// DOCUMENTATION: Business logic for the photo gallery
// PURPOSE: Catalog of photo records in front of a PhotoStore

use crate::errors::TournamentError;
use crate::models::{
    is_known_category, sample_photos, tags_from_title, NewPhoto, Photo, PhotoQuery,
    UpdatePhotoRequest, ALLOWED_EXTENSIONS, DEFAULT_CATEGORY,
};
use crate::services::{first_message, PhotoStore, StoredObject};
use chrono::{Local, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

/// Lower-cased extension if the file name has an allowed one
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Title shown for an object found in storage without a catalog record
fn title_from_pathname(pathname: &str) -> String {
    let file_name = pathname.rsplit('/').next().unwrap_or(pathname);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    crate::services::title_case(&stem.replace(['_', '-'], " "))
}

/// Uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct GalleryService {
    photos: RwLock<Vec<Photo>>,
    store: Arc<dyn PhotoStore>,
}

impl GalleryService {
    /// Catalog seeded with the sample photos
    pub fn new(store: Arc<dyn PhotoStore>) -> Self {
        Self::with_photos(store, sample_photos())
    }

    pub fn with_photos(store: Arc<dyn PhotoStore>, photos: Vec<Photo>) -> Self {
        Self {
            photos: RwLock::new(photos),
            store,
        }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Add catalog records for objects already in storage.
    /// Returns how many were imported.
    pub async fn import_existing(&self) -> Result<usize, TournamentError> {
        let objects = self.store.list().await?;

        let mut photos = self.photos.write().await;
        let mut imported = 0;
        for object in objects {
            let known = photos
                .iter()
                .any(|p| p.pathname.as_deref() == Some(object.pathname.as_str()) || p.url == object.url);
            if known {
                continue;
            }

            let id = next_id(&photos, object.uploaded_at.map(|t| t.timestamp()).unwrap_or(0));
            let date = object
                .uploaded_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

            photos.push(Photo {
                id,
                title: title_from_pathname(&object.pathname),
                description: "Photo from Onam Football Tournament 2025".to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                date,
                tags: vec!["onam".to_string(), "football".to_string(), "tournament".to_string()],
                download_url: Some(object.download_url),
                url: object.url,
                pathname: Some(object.pathname),
                size: Some(object.size),
            });
            imported += 1;
        }

        Ok(imported)
    }

    /// Photos matching the query, newest first
    pub async fn list(&self, query: &PhotoQuery) -> Vec<Photo> {
        let category = query.category.as_deref().unwrap_or("all");
        let search = query.q.as_deref().unwrap_or("");

        let photos = self.photos.read().await;
        let mut matching: Vec<Photo> = photos
            .iter()
            .filter(|p| p.matches(category, search))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        matching
    }

    pub async fn get(&self, id: i64) -> Result<Photo, TournamentError> {
        let photos = self.photos.read().await;
        photos
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| TournamentError::NotFound(format!("Photo not found with id: {}", id)))
    }

    /// Validate, store the bytes and add a catalog record
    pub async fn upload(&self, file: UploadedFile, meta: NewPhoto) -> Result<Photo, TournamentError> {
        if file.file_name.trim().is_empty() {
            return Err(TournamentError::InvalidInput("No file selected".to_string()));
        }

        let ext = allowed_extension(&file.file_name).ok_or_else(|| {
            TournamentError::InvalidInput(
                "Invalid file type. Only PNG, JPG, JPEG, GIF, and WEBP are allowed.".to_string(),
            )
        })?;

        let meta = NewPhoto {
            title: if meta.title.trim().is_empty() {
                file.file_name.clone()
            } else {
                meta.title.trim().to_string()
            },
            description: meta.description.trim().to_string(),
            category: if meta.category.trim().is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                meta.category.trim().to_lowercase()
            },
        };

        if let Err(e) = meta.validate() {
            return Err(TournamentError::ValidationError(first_message(&e)));
        }
        if !is_known_category(&meta.category) {
            return Err(TournamentError::ValidationError(format!(
                "Unknown category: {}",
                meta.category
            )));
        }

        let pathname = self.store.pathname_for(&format!("{}.{}", Uuid::new_v4(), ext));
        let content_type = file
            .content_type
            .clone()
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| content_type_for(&ext).to_string());

        // Storage I/O happens before the catalog lock is taken
        let stored: StoredObject = self.store.put(&pathname, file.bytes, &content_type).await?;

        let mut photos = self.photos.write().await;
        let photo = Photo {
            id: next_id(&photos, Utc::now().timestamp()),
            url: stored.url,
            title: meta.title.clone(),
            description: meta.description,
            category: meta.category,
            date: Local::now().format("%Y-%m-%d").to_string(),
            tags: tags_from_title(&meta.title),
            download_url: Some(stored.download_url),
            pathname: Some(stored.pathname),
            size: Some(stored.size),
        };
        photos.push(photo.clone());

        log::info!("Photo uploaded: {} ({})", photo.id, photo.title);
        Ok(photo)
    }

    /// Partial metadata update
    pub async fn update(&self, id: i64, req: UpdatePhotoRequest) -> Result<Photo, TournamentError> {
        // Same normalisation as upload, applied before validation
        let req = UpdatePhotoRequest {
            title: req.title.map(|t| t.trim().to_string()),
            description: req.description.map(|d| d.trim().to_string()),
            category: req.category.map(|c| c.trim().to_lowercase()),
            tags: req.tags,
        };
        if let Err(e) = req.validate() {
            return Err(TournamentError::ValidationError(first_message(&e)));
        }
        if let Some(category) = &req.category {
            if !is_known_category(category) {
                return Err(TournamentError::ValidationError(format!(
                    "Unknown category: {}",
                    category
                )));
            }
        }

        let mut photos = self.photos.write().await;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TournamentError::NotFound(format!("Photo not found with id: {}", id)))?;

        if let Some(title) = req.title {
            if req.tags.is_none() && title != photo.title {
                photo.tags = tags_from_title(&title);
            }
            photo.title = title;
        }
        if let Some(description) = req.description {
            photo.description = description;
        }
        if let Some(category) = req.category {
            photo.category = category;
        }
        if let Some(tags) = req.tags {
            photo.tags = tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }

        log::info!("Photo {} updated", id);
        Ok(photo.clone())
    }

    /// Remove a photo by id from storage and then from the catalog.
    /// A storage failure leaves the record in place so the delete can be retried.
    pub async fn delete(&self, id: i64) -> Result<Photo, TournamentError> {
        let photo = self.get(id).await?;

        self.delete_stored(&photo).await?;
        self.remove_record(id).await;

        log::info!("Photo {} deleted", id);
        Ok(photo)
    }

    /// Remove by URL or storage pathname. Objects unknown to the catalog
    /// are still deleted from storage.
    pub async fn delete_by_reference(&self, reference: &str) -> Result<(), TournamentError> {
        let tracked = {
            let photos = self.photos.read().await;
            photos
                .iter()
                .find(|p| {
                    p.url == reference
                        || p.pathname.as_deref() == Some(reference)
                        || p.download_url.as_deref() == Some(reference)
                })
                .cloned()
        };

        match tracked {
            Some(photo) => {
                self.delete_stored(&photo).await?;
                self.remove_record(photo.id).await;
                log::info!("Photo {} deleted", photo.id);
                Ok(())
            }
            None => {
                log::info!("Deleting untracked object {}", reference);
                self.store.delete(reference).await
            }
        }
    }

    async fn remove_record(&self, id: i64) {
        self.photos.write().await.retain(|p| p.id != id);
    }

    async fn delete_stored(&self, photo: &Photo) -> Result<(), TournamentError> {
        // Sample photos have no backing object
        if photo.pathname.is_none() {
            return Ok(());
        }
        self.store.delete(&photo.url).await
    }

    pub async fn count(&self) -> usize {
        self.photos.read().await.len()
    }
}

/// Unique id starting from a preferred value
fn next_id(photos: &[Photo], preferred: i64) -> i64 {
    let mut id = preferred.max(1);
    while photos.iter().any(|p| p.id == id) {
        id += 1;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LocalPhotoStore;

    fn gallery(dir: &tempfile::TempDir) -> GalleryService {
        GalleryService::new(Arc::new(LocalPhotoStore::new(dir.path().to_path_buf())))
    }

    fn jpeg(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    fn meta(title: &str, category: &str) -> NewPhoto {
        NewPhoto {
            title: title.to_string(),
            description: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_allowed_extension() {
        assert_eq!(allowed_extension("final.JPG"), Some("jpg".to_string()));
        assert_eq!(allowed_extension("a.b.webp"), Some("webp".to_string()));
        assert_eq!(allowed_extension("notes.txt"), None);
        assert_eq!(allowed_extension("noext"), None);
    }

    #[test]
    fn test_title_from_pathname() {
        assert_eq!(title_from_pathname("onamrage25/team_photo-day1.jpg"), "Team Photo Day1");
    }

    #[tokio::test]
    async fn test_list_filters_like_website() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        assert_eq!(gallery.list(&PhotoQuery::default()).await.len(), 3);

        let practice = gallery
            .list(&PhotoQuery {
                category: Some("practice".to_string()),
                q: None,
            })
            .await;
        assert_eq!(practice.len(), 1);
        assert_eq!(practice[0].title, "Kerala Village Football");

        let football = gallery
            .list(&PhotoQuery {
                category: Some("all".to_string()),
                q: Some("football".to_string()),
            })
            .await;
        assert_eq!(football.len(), 3);
        // Newest first
        assert_eq!(football[0].date, "2025-07-30");
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let photo = gallery
            .upload(jpeg("final.jpg"), meta("Trophy Lift Moment", "awards"))
            .await
            .unwrap();

        assert_eq!(photo.tags, vec!["trophy", "lift", "moment"]);
        assert_eq!(photo.category, "awards");
        assert!(photo.url.starts_with("/static/uploads/"));
        assert!(photo.url.ends_with(".jpg"));
        assert_eq!(gallery.count().await, 4);

        let stored_name = photo.pathname.clone().unwrap();
        assert!(dir.path().join(&stored_name).exists());

        gallery.delete(photo.id).await.unwrap();
        assert_eq!(gallery.count().await, 3);
        assert!(!dir.path().join(&stored_name).exists());
    }

    #[tokio::test]
    async fn test_upload_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let photo = gallery.upload(jpeg("kickoff.png"), meta("", "")).await.unwrap();
        assert_eq!(photo.title, "kickoff.png");
        assert_eq!(photo.category, "tournament");
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let err = gallery.upload(jpeg("script.exe"), meta("x", "")).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid file type"));

        let err = gallery.upload(jpeg(""), meta("x", "")).await.unwrap_err();
        assert_eq!(err.to_string(), "No file selected");

        let err = gallery.upload(jpeg("a.jpg"), meta("x", "parade")).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown category: parade");
    }

    #[tokio::test]
    async fn test_upload_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let a = gallery.upload(jpeg("a.jpg"), meta("A", "")).await.unwrap();
        let b = gallery.upload(jpeg("b.jpg"), meta("B", "")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_recomputes_tags() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let updated = gallery
            .update(
                1,
                UpdatePhotoRequest {
                    title: Some("Opening Ceremony".to_string()),
                    category: Some("awards".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.tags, vec!["opening", "ceremony"]);
        assert_eq!(updated.category, "awards");

        let updated = gallery
            .update(
                1,
                UpdatePhotoRequest {
                    tags: Some(vec![" Onam ".to_string(), "".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.tags, vec!["onam"]);

        assert!(matches!(
            gallery.update(999, UpdatePhotoRequest::default()).await,
            Err(TournamentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_reference_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalPhotoStore::new(dir.path().to_path_buf()));
        store.put("stray_shot.gif", vec![1, 2, 3], "image/gif").await.unwrap();

        let gallery = GalleryService::with_photos(store, Vec::new());
        assert_eq!(gallery.import_existing().await.unwrap(), 1);
        // Importing twice does not duplicate
        assert_eq!(gallery.import_existing().await.unwrap(), 0);

        let photos = gallery.list(&PhotoQuery::default()).await;
        assert_eq!(photos[0].title, "Stray Shot");

        gallery
            .delete_by_reference("/static/uploads/stray_shot.gif")
            .await
            .unwrap();
        assert_eq!(gallery.count().await, 0);
        assert!(!dir.path().join("stray_shot.gif").exists());
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let err = gallery
            .update(
                1,
                UpdatePhotoRequest {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::ValidationError(_)));
        assert_eq!(err.to_string(), "Title must be 1-200 characters");

        let unchanged = gallery.get(1).await.unwrap();
        assert_eq!(unchanged.title, "Onam Football Celebration");
        assert_eq!(unchanged.tags, vec!["onam", "celebration", "football"]);
    }

    #[tokio::test]
    async fn test_category_normalised_like_upload() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = gallery(&dir);

        let uploaded = gallery
            .upload(jpeg("cup.jpg"), meta("Cup", " Awards "))
            .await
            .unwrap();
        assert_eq!(uploaded.category, "awards");

        let updated = gallery
            .update(
                uploaded.id,
                UpdatePhotoRequest {
                    category: Some(" Venue".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category, "venue");
    }

    /// Store whose deletes always fail, like a blob API answering 5xx
    struct RejectingStore;

    #[async_trait::async_trait]
    impl PhotoStore for RejectingStore {
        fn name(&self) -> &'static str {
            "rejecting"
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
            Ok(StoredObject {
                url: format!("https://blob.example.com/{}", pathname),
                download_url: format!("https://blob.example.com/{}?download=1", pathname),
                pathname: pathname.to_string(),
                size: bytes.len() as u64,
                uploaded_at: None,
            })
        }

        async fn delete(&self, _url_or_pathname: &str) -> Result<(), TournamentError> {
            Err(TournamentError::ExternalApiError(
                "Blob delete failed with status 503".to_string(),
            ))
        }

        async fn list(&self) -> Result<Vec<StoredObject>, TournamentError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_storage_delete_keeps_record() {
        let gallery = GalleryService::with_photos(Arc::new(RejectingStore), Vec::new());
        let photo = gallery
            .upload(jpeg("goal.jpg"), meta("Winning Goal", "tournament"))
            .await
            .unwrap();

        let err = gallery.delete(photo.id).await.unwrap_err();
        assert!(matches!(err, TournamentError::ExternalApiError(_)));
        assert_eq!(gallery.count().await, 1);

        let err = gallery.delete_by_reference(&photo.url).await.unwrap_err();
        assert!(matches!(err, TournamentError::ExternalApiError(_)));
        assert_eq!(gallery.get(photo.id).await.unwrap(), photo);
    }

    #[test]
    fn test_next_id_skips_taken() {
        let photos = sample_photos();
        assert_eq!(next_id(&photos, 2), 4);
        assert_eq!(next_id(&photos, 100), 100);
    }
}
