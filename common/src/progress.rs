//! 処理画面の擬似プログレス
//!
//! 実際の進捗とは連動しない。4つの固定フェーズを一定間隔で進め、
//! スキャン完了までは95%で止める。

use std::time::Duration;

/// 表示フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub label: &'static str,
    pub duration_ms: u64,
}

pub const PHASES: [Phase; 4] = [
    Phase { label: "Analyzing image quality", duration_ms: 800 },
    Phase { label: "Detecting text regions", duration_ms: 1000 },
    Phase { label: "Extracting medication names", duration_ms: 1200 },
    Phase { label: "Validating prescription data", duration_ms: 900 },
];

/// アニメーションの更新間隔（ms）
pub const TICK_MS: u64 = 50;

/// スキャン完了前の上限（%）
pub const PROGRESS_CAP: f64 = 95.0;

/// 画面遷移前の待ち時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDelays {
    /// 成功時: 100%表示後に結果画面へ
    pub on_success: Duration,
    /// 失敗時: 通知後にアップロード画面へ
    pub on_failure: Duration,
}

impl Default for TransitionDelays {
    fn default() -> Self {
        Self {
            on_success: Duration::from_millis(500),
            on_failure: Duration::from_secs(2),
        }
    }
}

impl TransitionDelays {
    /// 待ちなし（テスト・非対話実行用）
    pub fn none() -> Self {
        Self {
            on_success: Duration::ZERO,
            on_failure: Duration::ZERO,
        }
    }
}

/// 擬似プログレスの状態
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSimulator {
    progress: f64,
    step: usize,
    finished: bool,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSimulator {
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            step: 0,
            finished: false,
        }
    }

    fn total_duration_ms() -> u64 {
        PHASES.iter().map(|p| p.duration_ms).sum()
    }

    /// 1tick分進める。完了後や上限到達後は変化しない
    pub fn tick(&mut self) {
        if self.finished {
            return;
        }

        let increment = TICK_MS as f64 / Self::total_duration_ms() as f64 * 100.0;
        self.progress = (self.progress + increment).min(PROGRESS_CAP);

        let last = PHASES.len() - 1;
        while self.step < last {
            let threshold = (self.step + 1) as f64 / PHASES.len() as f64 * 100.0;
            if self.progress >= threshold {
                self.step += 1;
            } else {
                break;
            }
        }
    }

    /// スキャン完了: 100%にする
    pub fn complete(&mut self) {
        self.progress = 100.0;
        self.step = PHASES.len() - 1;
        self.finished = true;
    }

    /// 失敗時: その場で止める
    pub fn stop(&mut self) {
        self.finished = true;
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// 表示用の整数パーセント
    pub fn percent(&self) -> u8 {
        self.progress.round() as u8
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn current_phase(&self) -> Phase {
        PHASES[self.step]
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
