//! バックエンドAPIクライアント
//!
//! 3つのエンドポイント（/health, /load-model, /scan）を1回ずつ呼ぶだけの薄いラッパー。
//! リトライ・タイムアウトは持たない。

use prescription_scanner_common::types::ErrorBody;
use prescription_scanner_common::{
    Error, HealthResponse, ModelLoadResponse, Operation, PrescriptionResponse, Result,
    SelectedImage, API_URL_VAR,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

/// multipartのフィールド名
const SCAN_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    /// 空のURLは未設定として扱う
    pub fn new(base_url: &str) -> Self {
        let base_url = Some(base_url.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn url(&self, path: &str) -> Result<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            Error::Config(format!("{} is not set", API_URL_VAR))
        })?;
        Ok(format!("{}{}", base, path))
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("/health")?;
        tracing::debug!(%url, "health check");
        let response = self.http.get(&url).send().await.map_err(connection_error)?;
        decode(Operation::Health, response).await
    }

    /// POST /load-model?base_model=..&adapter_repo=..
    pub async fn load_model(&self, base_model: &str, adapter_repo: &str) -> Result<ModelLoadResponse> {
        let url = self.url("/load-model")?;
        tracing::debug!(%url, base_model, adapter_repo, "load model");
        let response = self
            .http
            .post(&url)
            .query(&[("base_model", base_model), ("adapter_repo", adapter_repo)])
            .send()
            .await
            .map_err(connection_error)?;
        decode(Operation::LoadModel, response).await
    }

    /// POST /scan（multipart, フィールド名 "file"）
    pub async fn scan(&self, image: &SelectedImage) -> Result<PrescriptionResponse> {
        let url = self.url("/scan")?;
        tracing::debug!(%url, file = %image.file_name, bytes = image.size(), "scan");

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| Error::Config(format!("invalid MIME type {}: {}", image.mime_type, e)))?;
        let form = Form::new().part(SCAN_FIELD, part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(connection_error)?;
        decode(Operation::Scan, response).await
    }
}

fn connection_error(error: reqwest::Error) -> Error {
    tracing::warn!(error = %error, "request failed");
    Error::Connection(error.to_string())
}

/// 2xxならJSONをデコード、それ以外はdetail付きのHTTPエラー
async fn decode<T: DeserializeOwned>(operation: Operation, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(connection_error)?;

    if !status.is_success() {
        let detail = ErrorBody::parse_detail(&body);
        tracing::warn!(%operation, status = status.as_u16(), ?detail, "non-success response");
        return Err(Error::Http {
            operation,
            status: status.as_u16(),
            detail,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_base_url_is_unset() {
        assert!(ApiClient::new("").base_url().is_none());
        assert!(ApiClient::new("  ").base_url().is_none());
        assert_eq!(
            ApiClient::new("https://x").base_url(),
            Some("https://x")
        );
    }

    #[tokio::test]
    async fn test_unconfigured_fails_fast() {
        let client = ApiClient::new("");
        let error = client.health().await.unwrap_err();
        assert!(matches!(error, Error::Config(_)));

        let image = SelectedImage::new("rx.png", "image/png", vec![1, 2, 3]);
        let error = client.scan(&image).await.unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }
}
