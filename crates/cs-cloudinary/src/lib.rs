use anyhow::{Context, Result};
use async_trait::async_trait;
use cs_api_types::ReceiptFile;
use cs_backend_client::ImageHost;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Unsigned Cloudinary image upload.
///
/// Reads `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_UPLOAD_PRESET` and
/// `CLOUDINARY_BASE_URL` from the environment when no override is given.
pub struct CloudinaryUploader {
    base_url: String,
    cloud_name: String,
    upload_preset: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: Option<String>, upload_preset: Option<String>) -> Self {
        let cloud_name = cloud_name
            .or_else(|| std::env::var("CLOUDINARY_CLOUD_NAME").ok())
            .unwrap_or_default();
        let upload_preset = upload_preset
            .or_else(|| std::env::var("CLOUDINARY_UPLOAD_PRESET").ok())
            .unwrap_or_default();
        let base_url = std::env::var("CLOUDINARY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            cloud_name,
            upload_preset,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.base_url, self.cloud_name)
    }

    fn form_for(&self, file: &ReceiptFile) -> Result<Form> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .context("cloudinary receipt content type")?;

        Ok(Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("cloud_name", self.cloud_name.clone()))
    }
}

#[async_trait(?Send)]
impl ImageHost for CloudinaryUploader {
    async fn upload_image(&self, file: &ReceiptFile) -> Result<String> {
        if self.cloud_name.is_empty() || self.upload_preset.is_empty() {
            anyhow::bail!("cloudinary cloud name and upload preset must be configured");
        }

        let form = self.form_for(file)?;
        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .context("cloudinary upload transport")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            if let Ok(body) = serde_json::from_str::<UploadErrorBody>(&text) {
                anyhow::bail!("cloudinary upload HTTP {status}: {}", body.error.message);
            }
            anyhow::bail!("cloudinary upload HTTP {status}: {text}");
        }

        let body: UploadResponse =
            serde_json::from_str(&text).context("cloudinary upload parse")?;
        debug!(file = %file.name, "receipt uploaded");
        Ok(body.secure_url)
    }
}
