//! エラー型定義

use std::fmt;
use thiserror::Error;

/// バックエンドAPIの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Health,
    LoadModel,
    Scan,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Health => write!(f, "Health check"),
            Operation::LoadModel => write!(f, "Model load"),
            Operation::Scan => write!(f, "Scan"),
        }
    }
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// ベースURLが未設定
    #[error("Configuration error: {0}")]
    Config(String),

    /// 接続できない（fetch失敗・接続拒否など）
    #[error("Cannot connect to server: {0}")]
    Connection(String),

    /// 2xx以外のレスポンス
    #[error("{}", http_message(.operation, .status, .detail))]
    Http {
        operation: Operation,
        status: u16,
        detail: Option<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn http_message(operation: &Operation, status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("{} failed with status {}", operation, status),
    }
}

impl Error {
    /// HTTPステータス（HTTPエラーの場合のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
