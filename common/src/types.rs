//! APIの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - Medication: 検出された薬剤1件
//! - PrescriptionResponse: `/scan` のレスポンス
//! - HealthResponse / ModelLoadResponse: `/health`, `/load-model` のレスポンス
//! - SelectedImage: アップロード対象の画像とプレビュー

use base64::Engine;
use serde::{Deserialize, Serialize};

/// `/load-model` に渡すベースモデル名
pub const DEFAULT_BASE_MODEL: &str = "Qwen/Qwen2.5-VL-7B-Instruct";

/// `/load-model` に渡すアダプタリポジトリ名
pub const DEFAULT_ADAPTER_REPO: &str = "Jahriko/prescription_model";

/// 受け付ける画像の最大サイズ（10MB）
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// 検出された薬剤
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,

    #[serde(default)]
    pub dosage: String,           // 用量

    #[serde(default)]
    pub frequency: String,        // 服用頻度

    #[serde(default)]
    pub confidence: f64,          // 0.0 - 1.0
}

/// 処方箋スキャン結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionResponse {
    pub success: bool,
    pub medications: Vec<Medication>,
    /// バックエンドが抽出した生テキスト
    pub raw_text: String,
    /// 処理時間（秒）
    pub processing_time: f64,
}

/// `/health` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    pub model_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuda_available: Option<bool>,
}

/// `/load-model` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelLoadResponse {
    pub success: bool,
    pub message: String,
    pub base_model: String,
    pub adapter_repo: String,
}

/// エラーレスポンスのボディ
///
/// FastAPI系のバックエンドは `detail` に文字列か検証エラー配列を入れて返す
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// `detail` を表示用の文字列にする（文字列以外はJSONのまま）
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// レスポンスボディから `detail` を取り出す。JSONでなければNone
    pub fn parse_detail(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail_message())
    }
}

/// アップロード対象の画像
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// `data:<mime>;base64,...` 形式のプレビュー
    pub preview: String,
}

impl SelectedImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type.into();
        let preview = to_data_url(&mime_type, &bytes);
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
            preview,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// バイト列からData URLを生成
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
