// src/handlers/gallery.rs
// DOCUMENTATION: HTTP handlers for the photo gallery
// PURPOSE: Public listing plus admin-only upload, edit and delete

use crate::config::Config;
use crate::errors::TournamentError;
use crate::handlers::admin::verify_admin_token;
use crate::models::{categories, DeletePhotoRequest, NewPhoto, PhotoQuery, UpdatePhotoRequest};
use crate::services::{GalleryService, SessionStore, UploadedFile};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::TryStreamExt;
use serde_json::json;

/// Text parts larger than this are rejected
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// GET /api/gallery/photos
pub async fn list_photos(
    gallery: web::Data<GalleryService>,
    query: web::Query<PhotoQuery>,
) -> Result<impl Responder, TournamentError> {
    let photos = gallery.list(&query.into_inner()).await;
    Ok(HttpResponse::Ok().json(json!({ "photos": photos })))
}

/// GET /api/gallery/photos/{id}
pub async fn get_photo(
    gallery: web::Data<GalleryService>,
    path: web::Path<i64>,
) -> Result<impl Responder, TournamentError> {
    let photo = gallery.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "photo": photo })))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, TournamentError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| TournamentError::InvalidInput(e.to_string()))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(TournamentError::PayloadTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field) -> Result<String, TournamentError> {
    let bytes = read_field(field, MAX_TEXT_FIELD_BYTES).await?;
    String::from_utf8(bytes)
        .map_err(|_| TournamentError::InvalidInput("Form fields must be UTF-8".to_string()))
}

/// POST /api/gallery/photos/upload
/// DOCUMENTATION: multipart form with file, title, description and category
pub async fn upload_photo(
    gallery: web::Data<GalleryService>,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<impl Responder, TournamentError> {
    verify_admin_token(&req, &sessions).await?;

    let mut file: Option<UploadedFile> = None;
    let mut meta = NewPhoto::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| TournamentError::InvalidInput(e.to_string()))?
    {
        let name = field.name().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or("")
                    .to_string();
                let content_type = field.content_type().map(|mime| mime.to_string());
                let bytes = read_field(&mut field, config.max_upload_bytes).await?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "title" => meta.title = read_text(&mut field).await?,
            "description" => meta.description = read_text(&mut field).await?,
            "category" => meta.category = read_text(&mut field).await?,
            other => {
                log::debug!("Ignoring multipart field {}", other);
                read_field(&mut field, config.max_upload_bytes).await?;
            }
        }
    }

    let file = file.ok_or_else(|| TournamentError::InvalidInput("No file provided".to_string()))?;
    let photo = gallery.upload(file, meta).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Photo uploaded successfully",
        "photo": photo,
    })))
}

/// PUT /api/gallery/photos/{id}
pub async fn update_photo(
    gallery: web::Data<GalleryService>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdatePhotoRequest>,
) -> Result<impl Responder, TournamentError> {
    verify_admin_token(&req, &sessions).await?;

    let photo = gallery.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Photo updated successfully",
        "photo": photo,
    })))
}

/// DELETE /api/gallery/photos/{id}
pub async fn delete_photo(
    gallery: web::Data<GalleryService>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, TournamentError> {
    verify_admin_token(&req, &sessions).await?;

    gallery.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Photo deleted successfully"})))
}

/// DELETE /api/gallery-delete
/// DOCUMENTATION: body names the photo by url, pathname or id
pub async fn delete_photo_by_reference(
    gallery: web::Data<GalleryService>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    body: web::Json<DeletePhotoRequest>,
) -> Result<impl Responder, TournamentError> {
    verify_admin_token(&req, &sessions).await?;

    let body = body.into_inner();
    match (body.url.or(body.pathname), body.id) {
        (Some(reference), _) if !reference.trim().is_empty() => {
            gallery.delete_by_reference(reference.trim()).await?;
        }
        (_, Some(id)) => {
            gallery.delete(id).await?;
        }
        _ => {
            return Err(TournamentError::InvalidInput(
                "Photo URL or pathname required".to_string(),
            ))
        }
    }

    Ok(HttpResponse::Ok().json(json!({"message": "Photo deleted successfully"})))
}

/// GET /api/gallery/categories
pub async fn list_categories() -> impl Responder {
    HttpResponse::Ok().json(json!({ "categories": categories() }))
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "healthy", "service": "gallery"}))
}

/// Configuration for gallery routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/gallery")
            .route("/photos", web::get().to(list_photos))
            .route("/photos/upload", web::post().to(upload_photo))
            .route("/photos/{id}", web::get().to(get_photo))
            .route("/photos/{id}", web::put().to(update_photo))
            .route("/photos/{id}", web::delete().to(delete_photo))
            .route("/categories", web::get().to(list_categories))
            .route("/health", web::get().to(health_check)),
    )
    // Paths used by the website's endpoint table
    .route("/api/gallery-photos", web::get().to(list_photos))
    .route("/api/gallery-upload", web::post().to(upload_photo))
    .route("/api/gallery-delete", web::delete().to(delete_photo_by_reference))
    .route("/api/gallery-categories", web::get().to(list_categories));
}
