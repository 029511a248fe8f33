//! upload画面
//!
//! 起動時にヘルスチェックし、モデル未ロードなら手動ロードを提示する。
//! ファイル受付の可否は `Session` が判定する。

use crate::api::ApiClient;
use crate::error::Result;
use crate::intake;
use indicatif::{ProgressBar, ProgressStyle};
use prescription_scanner_common::{Session, DEFAULT_ADAPTER_REPO, DEFAULT_BASE_MODEL};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// モデル未ロード時の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelLoadMode {
    /// 確認してからロード
    Ask,
    /// 確認なしでロード
    Always,
    /// ロードしない
    Never,
}

/// `/load-model` のパラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub base_model: String,
    pub adapter_repo: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            base_model: DEFAULT_BASE_MODEL.to_string(),
            adapter_repo: DEFAULT_ADAPTER_REPO.to_string(),
        }
    }
}

fn spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// ヘルスチェックと（必要なら）モデルロード
///
/// 設定が無効な場合はネットワークを呼ばない
pub async fn prepare(
    session: &mut Session,
    client: &ApiClient,
    mode: ModelLoadMode,
    model: &ModelSelection,
    show_progress: bool,
) -> Result<()> {
    if !session.config_valid() {
        tracing::warn!("configuration invalid; skipping network calls");
        return Ok(());
    }

    if session.needs_health_check() {
        let bar = spinner("Checking server...", show_progress);
        match client.health().await {
            Ok(health) => {
                tracing::debug!(model_loaded = health.model_loaded, status = %health.status, "health");
                session.record_health(Ok(health));
            }
            Err(e) => session.record_health(Err(&e)),
        }
        bar.finish_and_clear();
    }

    if !session.offers_model_load() {
        return Ok(());
    }

    let load = match mode {
        ModelLoadMode::Always => true,
        ModelLoadMode::Never => false,
        ModelLoadMode::Ask => {
            super::print_notifications(session);
            dialoguer::Confirm::new()
                .with_prompt("The AI model is not loaded. Load it now?")
                .default(true)
                .interact()?
        }
    };

    if load {
        load_model(session, client, model, show_progress).await;
    }

    Ok(())
}

/// 手動モデルロード
pub async fn load_model(session: &mut Session, client: &ApiClient, model: &ModelSelection, show_progress: bool) {
    if !session.begin_model_load() {
        return;
    }

    let bar = spinner("Loading model (this can take a few minutes)...", show_progress);
    match client.load_model(&model.base_model, &model.adapter_repo).await {
        Ok(resp) => session.record_model_load(Ok(resp)),
        Err(e) => session.record_model_load(Err(&e)),
    }
    bar.finish_and_clear();
}

/// 画像パスを対話入力
pub fn prompt_path() -> Result<PathBuf> {
    let input: String = dialoguer::Input::new()
        .with_prompt("Prescription image (path)")
        .interact_text()?;
    Ok(PathBuf::from(input.trim()))
}

/// ファイルを選択する。processing画面へ進めたらtrue
///
/// 読み込みエラーは呼び出し側へ返し、受付拒否は通知として残す
pub fn select(session: &mut Session, path: &Path) -> Result<bool> {
    let image = intake::load_image(path)?;
    match session.select_file(image) {
        Ok(()) => Ok(true),
        Err(reason) => {
            tracing::debug!(?reason, "file rejected");
            Ok(false)
        }
    }
}
