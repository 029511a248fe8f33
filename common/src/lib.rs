//! Prescription Scanner Common Library
//!
//! CLIとWeb(WASM)で共有される型と画面ロジック

pub mod types;
pub mod config;
pub mod error;
pub mod classify;
pub mod medication;
pub mod progress;
pub mod session;

pub use types::{
    HealthResponse, Medication, ModelLoadResponse, PrescriptionResponse, SelectedImage,
    DEFAULT_ADAPTER_REPO, DEFAULT_BASE_MODEL, MAX_IMAGE_BYTES,
};
pub use config::{validate_base_url, ConfigValidation, API_URL_VAR};
pub use error::{Error, Operation, Result};
pub use classify::{classify_error, classify_message, ScanFailure};
pub use medication::{
    display_medications, fallback_from_raw_text, filter_medications, is_placeholder,
    FALLBACK_CONFIDENCE, LOW_CONFIDENCE_THRESHOLD, LOW_CONFIDENCE_WARNING,
};
pub use progress::{Phase, ProgressSimulator, TransitionDelays, PHASES, TICK_MS};
pub use session::{AppState, IntakeRejected, Notification, NotificationLevel, Session};
