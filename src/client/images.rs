//! Recipe image upload and removal.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::client::{
    client::RecipeVaultClient,
    error::{ApiError, ApiResult},
    types::ImageUploadResponse,
};

#[derive(Clone)]
pub struct ImageService {
    client: RecipeVaultClient,
}

impl ImageService {
    pub fn new(client: RecipeVaultClient) -> Self {
        Self { client }
    }

    /// Upload an image and return the URL the backend stored it under.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<String> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| ApiError::new(format!("Invalid upload: {}", e)))?;
        let form = Form::new().part("file", part);

        let response: ImageUploadResponse = self
            .client
            .upload("/images/upload", form)
            .await
            .map_err(|e| with_fallback_message(e, "Failed to upload image"))?;

        tracing::info!("Uploaded image {} -> {}", file_name, response.image_url);
        Ok(response.image_url)
    }

    /// Read a local file and upload it.
    pub async fn upload_path(&self, path: &Path) -> ApiResult<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::new(format!("Failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image");
        self.upload(file_name, bytes).await
    }

    pub async fn delete(&self, image_url: &str) -> ApiResult<()> {
        let endpoint = format!("/images?imageUrl={}", urlencoding::encode(image_url));
        self.client
            .delete(&endpoint)
            .await
            .map_err(|e| with_fallback_message(e, "Failed to delete image"))?;
        tracing::info!("Deleted image {}", image_url);
        Ok(())
    }
}

/// Keep the backend's message when it sent one, otherwise use `fallback`.
fn with_fallback_message(mut error: ApiError, fallback: &str) -> ApiError {
    let backend_message = error
        .data
        .as_ref()
        .and_then(|d| d.get("message"))
        .and_then(|m| m.as_str())
        .is_some();
    if !backend_message {
        error.message = fallback.to_string();
    }
    error
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
