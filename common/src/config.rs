//! ベースURL設定の検証
//!
//! 設定値は `PRESCRIPTION_API_URL` の1つだけ。
//! 検証は純粋関数で、ログ出力は呼び出し側で行う。

/// ベースURLを保持する環境変数名
pub const API_URL_VAR: &str = "PRESCRIPTION_API_URL";

/// 検証結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValidation {
    /// 致命的な問題（1つでもあれば無効）
    pub errors: Vec<String>,
    /// 注意のみ（有効性には影響しない）
    pub warnings: Vec<String>,
}

impl ConfigValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// ベースURLを検証する
///
/// - 空（空白のみ含む）: "not set" のみを報告
/// - `http://` / `https://` で始まらない
/// - 末尾スラッシュあり
///
/// `http://` の場合はモバイル向けの警告を追加する
///
/// # Examples
/// ```
/// use prescription_scanner_common::validate_base_url;
///
/// assert!(validate_base_url("https://api.example.com").is_valid());
/// assert!(!validate_base_url("https://api.example.com/").is_valid());
/// ```
pub fn validate_base_url(url: &str) -> ConfigValidation {
    let mut result = ConfigValidation::default();

    if url.trim().is_empty() {
        result.errors.push(format!(
            "{} is not set. Please configure your backend API URL.",
            API_URL_VAR
        ));
        return result;
    }

    let has_scheme = url.starts_with("http://") || url.starts_with("https://");
    if !has_scheme {
        result
            .errors
            .push(format!("{} must start with http:// or https://", API_URL_VAR));
    }

    if url.ends_with('/') {
        result
            .errors
            .push(format!("{} should not end with a trailing slash", API_URL_VAR));
    }

    if url.starts_with("http://") {
        result.warnings.push(format!(
            "{} uses HTTP; mobile browsers require HTTPS in production",
            API_URL_VAR
        ));
    }

    result
}
