//! Prescription Scanner CLI
//!
//! 処方箋画像をバックエンドへ送り、抽出された薬剤を表示するクライアント

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod logging;
pub mod screens;
