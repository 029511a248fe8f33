//! UIコンポーネント

pub mod processing_screen;
pub mod progress_bar;
pub mod results_screen;
pub mod toasts;
pub mod upload_screen;
