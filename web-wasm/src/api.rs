//! バックエンドAPI呼び出し（fetch）
//!
//! ベースURLはビルド時の `PRESCRIPTION_API_URL` から取る。
//! 未設定ならネットワークに出ずに設定エラーを返す。

use prescription_scanner_common::types::ErrorBody;
use prescription_scanner_common::{
    Error, HealthResponse, ModelLoadResponse, Operation, PrescriptionResponse, Result,
    SelectedImage,
};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Request, RequestInit, RequestMode, Response};

/// ビルド時に埋め込まれたAPIベースURL
pub fn base_url() -> &'static str {
    option_env!("PRESCRIPTION_API_URL").unwrap_or("")
}

fn endpoint(path: &str) -> Result<String> {
    endpoint_for(base_url(), path)
}

fn endpoint_for(base: &str, path: &str) -> Result<String> {
    let base = base.trim();
    if base.is_empty() {
        return Err(Error::Config("PRESCRIPTION_API_URL is not set".to_string()));
    }
    Ok(format!("{}{}", base, path))
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn connection_error(value: JsValue) -> Error {
    let message = js_message(&value);
    gloo::console::warn!(format!("request failed: {}", message));
    Error::Connection(message)
}

async fn send(url: &str, method: &str, body: Option<&JsValue>) -> Result<Response> {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        opts.set_body(body);
    }

    let request = Request::new_with_str_and_init(url, &opts).map_err(connection_error)?;
    let window = web_sys::window().ok_or_else(|| Error::Connection("no window".to_string()))?;
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(connection_error)?;
    value.dyn_into::<Response>().map_err(connection_error)
}

async fn decode<T: DeserializeOwned>(operation: Operation, resp: Response) -> Result<T> {
    let text = JsFuture::from(resp.text().map_err(connection_error)?)
        .await
        .map_err(connection_error)?;
    let body = text.as_string().unwrap_or_default();

    if !resp.ok() {
        return Err(Error::Http {
            operation,
            status: resp.status(),
            detail: ErrorBody::parse_detail(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

fn encode(value: &str) -> String {
    String::from(js_sys::encode_uri_component(value))
}

/// GET /health
pub async fn health() -> Result<HealthResponse> {
    let resp = send(&endpoint("/health")?, "GET", None).await?;
    decode(Operation::Health, resp).await
}

/// POST /load-model
pub async fn load_model(base_model: &str, adapter_repo: &str) -> Result<ModelLoadResponse> {
    let url = format!(
        "{}?base_model={}&adapter_repo={}",
        endpoint("/load-model")?,
        encode(base_model),
        encode(adapter_repo)
    );
    let resp = send(&url, "POST", None).await?;
    decode(Operation::LoadModel, resp).await
}

/// POST /scan（multipartの "file" フィールド）
pub async fn scan(image: &SelectedImage) -> Result<PrescriptionResponse> {
    let url = endpoint("/scan")?;

    let bytes = js_sys::Uint8Array::from(image.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let bag = BlobPropertyBag::new();
    bag.set_type(&image.mime_type);
    let blob =
        Blob::new_with_u8_array_sequence_and_options(&parts, &bag).map_err(connection_error)?;

    let form = FormData::new().map_err(connection_error)?;
    form.append_with_blob_and_filename("file", &blob, &image.file_name)
        .map_err(connection_error)?;

    let resp = send(&url, "POST", Some(&JsValue::from(form))).await?;
    decode(Operation::Scan, resp).await
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_encode_uses_uri_component() {
        assert_eq!(encode("Qwen/Qwen2.5-VL-7B-Instruct"), "Qwen%2FQwen2.5-VL-7B-Instruct");
    }

    #[wasm_bindgen_test]
    fn wasm_unset_base_url_message() {
        let error = endpoint_for("", "/health").unwrap_err();
        assert_eq!(error.to_string(), "Configuration error: PRESCRIPTION_API_URL is not set");
    }
}
