//! スキャン失敗の分類
//!
//! 処理画面で失敗した時に表示する通知の種類を決める。
//! 型付きエラーはステータスで分類し、それ以外はメッセージの部分一致で分類する。

use crate::error::Error;

/// スキャン失敗の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFailure {
    InvalidImage,
    ModelNotLoaded,
    ProcessingFailed,
    CannotConnect,
}

impl ScanFailure {
    pub fn title(&self) -> &'static str {
        match self {
            ScanFailure::InvalidImage => "Invalid image",
            ScanFailure::ModelNotLoaded => "Model not loaded",
            ScanFailure::ProcessingFailed => "Processing failed",
            ScanFailure::CannotConnect => "Cannot connect to server",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScanFailure::InvalidImage => {
                "Please upload a clear image of a prescription (JPG, PNG or HEIC)."
            }
            ScanFailure::ModelNotLoaded => {
                "The AI model is not loaded yet. Load the model and try again."
            }
            ScanFailure::ProcessingFailed => {
                "The server could not process this prescription. Please try again."
            }
            ScanFailure::CannotConnect => {
                "Check your connection and make sure the backend is running."
            }
        }
    }
}

/// エラーメッセージの部分一致で分類する
///
/// 判定順: "400"/"invalid" → "503"/"model" → "500" → その他
pub fn classify_message(message: &str) -> ScanFailure {
    let lower = message.to_lowercase();

    if lower.contains("400") || lower.contains("invalid") {
        ScanFailure::InvalidImage
    } else if lower.contains("503") || lower.contains("model") {
        ScanFailure::ModelNotLoaded
    } else if lower.contains("500") {
        ScanFailure::ProcessingFailed
    } else {
        ScanFailure::CannotConnect
    }
}

/// エラーを分類する
pub fn classify_error(error: &Error) -> ScanFailure {
    match error {
        Error::Config(_) | Error::Connection(_) => ScanFailure::CannotConnect,
        Error::Http { status: 400, .. } => ScanFailure::InvalidImage,
        Error::Http { status: 503, .. } => ScanFailure::ModelNotLoaded,
        Error::Http { status: 500..=599, .. } => ScanFailure::ProcessingFailed,
        other => classify_message(&other.to_string()),
    }
}
