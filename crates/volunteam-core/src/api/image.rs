//! Image hosting client (ImgBB-compatible upload API).

use std::time::Duration;

use anyhow::Result;
use reqwest::{multipart, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;

use super::{ApiError, ImageHost, UploadedImage};

/// File name reported when the host does not return one
const DEFAULT_IMAGE_NAME: &str = "photo.jpg";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
    // ImgBB sends size as a number, some mirrors as a string
    #[serde(default)]
    size: serde_json::Value,
    image: Option<UploadImageInfo>,
}

#[derive(Debug, Deserialize)]
struct UploadImageInfo {
    filename: Option<String>,
}

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ImageClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.image_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.image_api_key.clone(),
        })
    }

    fn parse_upload(text: &str) -> Result<UploadedImage, ApiError> {
        let parsed: UploadResponse = serde_json::from_str(text)
            .map_err(|e| ApiError::UploadFailed(format!("unreadable response: {}", e)))?;

        let data = parsed
            .data
            .ok_or_else(|| ApiError::UploadFailed("response has no data".to_string()))?;

        let url = data
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::UploadFailed("response has no url".to_string()))?;

        let size = match &data.size {
            serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
            serde_json::Value::String(s) => s.parse().unwrap_or(0),
            _ => 0,
        };

        let name = data
            .image
            .and_then(|i| i.filename)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string());

        Ok(UploadedImage { url, size, name })
    }
}

impl ImageHost for ImageClient {
    async fn upload(&self, base64_image: &str) -> Result<UploadedImage, ApiError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::UploadFailed("image API key is not configured".to_string()))?;

        let url = format!("{}/upload", self.base_url);
        debug!(url = %url, bytes = base64_image.len(), "Uploading image");

        let form = multipart::Form::new().text("image", base64_image.to_string());

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Image upload rejected");
            return Err(ApiError::UploadFailed(format!("status {}", status)));
        }

        Self::parse_upload(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_full_response() {
        let json = r#"{"data":{"id":"2ndCYJK","url":"https://i.ibb.co/w04Prt6/c1f64245afb2.gif","size":42,"image":{"filename":"c1f64245afb2.gif","mime":"image/gif"}},"success":true,"status":200}"#;
        let uploaded = ImageClient::parse_upload(json).expect("parse");
        assert_eq!(uploaded.url, "https://i.ibb.co/w04Prt6/c1f64245afb2.gif");
        assert_eq!(uploaded.size, 42);
        assert_eq!(uploaded.name, "c1f64245afb2.gif");
    }

    #[test]
    fn test_parse_upload_string_size_and_missing_name() {
        let json = r#"{"data":{"url":"https://i.ibb.co/x.jpg","size":"1024"}}"#;
        let uploaded = ImageClient::parse_upload(json).expect("parse");
        assert_eq!(uploaded.size, 1024);
        assert_eq!(uploaded.name, DEFAULT_IMAGE_NAME);
    }

    #[test]
    fn test_parse_upload_without_url_fails() {
        let json = r#"{"data":{"size":10},"success":false}"#;
        assert!(matches!(
            ImageClient::parse_upload(json),
            Err(ApiError::UploadFailed(_))
        ));
        assert!(matches!(
            ImageClient::parse_upload(r#"{"error":"bad key"}"#),
            Err(ApiError::UploadFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_without_key_fails_fast() {
        let client = ImageClient::new(&Config::default()).expect("client");
        let err = client.upload("aGVsbG8=").await.expect_err("should fail");
        assert!(matches!(err, ApiError::UploadFailed(_)));
    }
}
