use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported image format: {0} (use JPG, PNG or HEIC)")]
    UnsupportedImage(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] prescription_scanner_common::Error),
}

pub type Result<T> = std::result::Result<T, ScannerError>;
