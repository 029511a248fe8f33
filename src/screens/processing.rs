//! processing画面
//!
//! 擬似プログレスとスキャン呼び出しを同じイベントループで並行に進める。
//! プログレスは実際の進捗と連動せず、完了までは95%で止まる。

use crate::api::ApiClient;
use indicatif::{ProgressBar, ProgressStyle};
use prescription_scanner_common::{
    AppState, ProgressSimulator, ScanFailure, Session, TransitionDelays, PHASES, TICK_MS,
};
use std::time::Duration;

fn progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn render(bar: &ProgressBar, sim: &ProgressSimulator) {
    bar.set_position(sim.percent() as u64);
    bar.set_message(format!(
        "[{}/{}] {}",
        sim.current_step() + 1,
        PHASES.len(),
        sim.current_phase().label
    ));
}

/// processing画面の結末
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// results画面へ進んだ
    Completed,
    /// 失敗を通知してupload画面へ戻った
    Failed(ScanFailure),
    /// processing画面ではなかった
    Skipped,
}

/// スキャンを実行する
///
/// 成功: 100%表示 → 待ち → results
/// 失敗: 通知 → 待ち → upload
pub async fn run(
    session: &mut Session,
    client: &ApiClient,
    delays: TransitionDelays,
    show_progress: bool,
) -> Outcome {
    if session.state() != AppState::Processing {
        return Outcome::Skipped;
    }
    let Some(image) = session.selected_image().cloned() else {
        return Outcome::Skipped;
    };

    let bar = progress_bar(show_progress);
    let mut sim = ProgressSimulator::new();
    render(&bar, &sim);

    let scan = client.scan(&image);
    tokio::pin!(scan);
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_MS));

    let result = loop {
        tokio::select! {
            result = &mut scan => break result,
            _ = ticker.tick() => {
                sim.tick();
                render(&bar, &sim);
            }
        }
    };

    match result {
        Ok(response) => {
            sim.complete();
            render(&bar, &sim);
            bar.finish_with_message("Done");
            tracing::debug!(
                medications = response.medications.len(),
                processing_time = response.processing_time,
                "scan completed"
            );
            tokio::time::sleep(delays.on_success).await;
            session.complete_scan(response);
            Outcome::Completed
        }
        Err(error) => {
            sim.stop();
            tracing::warn!(error = %error, "scan failed");
            let failure = session.report_scan_failure(&error);
            bar.abandon_with_message(failure.title());
            super::print_notifications(session);
            tokio::time::sleep(delays.on_failure).await;
            session.abandon_scan();
            Outcome::Failed(failure)
        }
    }
}
