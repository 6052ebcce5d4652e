//! Request bodies for prompt create/update: JSON or multipart with an
//! optional `coverImage` file.

use std::path::Path;

use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, http::header, web};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::middleware::error::{AppError, AppResult};

/// Largest JSON body accepted on any route.
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

const COVER_IMAGE_FIELD: &str = "coverImage";
const COVER_IMAGE_DIR: &str = "cover-images";
const PUBLIC_PREFIX: &str = "/uploads";

/// A decoded prompt body plus the public path of an uploaded cover image.
pub struct PromptForm<T> {
    pub body: T,
    pub cover_image: Option<String>,
}

/// File extension for an accepted image content type.
fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Decode a prompt body from either JSON or `multipart/form-data`.
pub async fn read_prompt_form<T: DeserializeOwned>(
    req: &HttpRequest,
    payload: web::Payload,
    upload: &UploadConfig,
) -> AppResult<PromptForm<T>> {
    if is_multipart(req) {
        read_multipart(req, payload, upload).await
    } else {
        let bytes = read_limited(payload, JSON_BODY_LIMIT).await?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
        Ok(PromptForm {
            body,
            cover_image: None,
        })
    }
}

async fn read_limited(mut payload: web::Payload, limit: usize) -> AppResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::BadRequest("Request body is too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn read_multipart<T: DeserializeOwned>(
    req: &HttpRequest,
    payload: web::Payload,
    upload: &UploadConfig,
) -> AppResult<PromptForm<T>> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut fields = Map::new();
    let mut cover_image = None;

    while let Some(field) = multipart.next().await {
        let mut field = field.map_err(|e| AppError::BadRequest(e.to_string()))?;
        let Some(name) = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .map(str::to_string)
        else {
            continue;
        };

        if name == COVER_IMAGE_FIELD {
            if cover_image.is_some() {
                return Err(AppError::BadRequest(
                    "Only one cover image may be uploaded".to_string(),
                ));
            }
            cover_image = Some(save_cover_image(&mut field, upload).await?);
            continue;
        }

        let bytes = read_field(&mut field, JSON_BODY_LIMIT).await?;
        let text = String::from_utf8(bytes)
            .map_err(|_| AppError::BadRequest(format!("Field {name} is not valid UTF-8")))?;
        insert_text_field(&mut fields, name, text);
    }

    let body = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
    Ok(PromptForm { body, cover_image })
}

/// Repeated keys (e.g. several `tags` parts) collect into a list.
fn insert_text_field(fields: &mut Map<String, Value>, name: String, text: String) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(Value::String(text)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(text)]);
        }
        None => {
            fields.insert(name, Value::String(text));
        }
    }
}

async fn read_field(field: &mut Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn save_cover_image(field: &mut Field, upload: &UploadConfig) -> AppResult<String> {
    let extension = field
        .content_type()
        .and_then(|mime| image_extension(mime.essence_str()))
        .ok_or_else(|| {
            AppError::BadRequest(
                "Only image files (JPEG, PNG, GIF, WebP) are allowed".to_string(),
            )
        })?;

    let data = read_field(field, upload.max_bytes).await?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Cover image is empty".to_string()));
    }

    let file_name = format!("{}.{}", Uuid::new_v4(), extension);
    write_file(&upload.dir.join(COVER_IMAGE_DIR), &file_name, &data).await?;

    tracing::info!(file = %file_name, bytes = data.len(), "Cover image stored");
    Ok(format!("{PUBLIC_PREFIX}/{COVER_IMAGE_DIR}/{file_name}"))
}

async fn write_file(dir: &Path, file_name: &str, data: &[u8]) -> AppResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {e}")))?;
    tokio::fs::write(dir.join(file_name), data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_image_types_are_accepted() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/webp"), Some("webp"));
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("application/pdf"), None);
    }

    #[test]
    fn repeated_fields_become_lists() {
        let mut fields = Map::new();
        insert_text_field(&mut fields, "tags".to_string(), "a".to_string());
        insert_text_field(&mut fields, "title".to_string(), "T".to_string());
        insert_text_field(&mut fields, "tags".to_string(), "b".to_string());
        insert_text_field(&mut fields, "tags".to_string(), "c".to_string());

        assert_eq!(fields["tags"], serde_json::json!(["a", "b", "c"]));
        assert_eq!(fields["title"], "T");
    }
}
