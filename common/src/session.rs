//! 画面遷移ステートマシン
//!
//! upload → processing → results の3画面。
//! 遷移は前進かupload画面へのリセットのみ。
//! 各画面が必要なデータは列挙子が保持するので、
//! results画面なのにレスポンスが無い、という状態は作れない。

use crate::classify::{classify_error, ScanFailure};
use crate::config::ConfigValidation;
use crate::error::Error;
use crate::medication::display_medications;
use crate::types::{HealthResponse, Medication, ModelLoadResponse, PrescriptionResponse, SelectedImage, MAX_IMAGE_BYTES};

/// 保持する通知の上限
const MAX_NOTIFICATIONS: usize = 5;

/// 画面モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Upload,
    Processing,
    Results,
}

impl AppState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Upload => "upload",
            AppState::Processing => "processing",
            AppState::Results => "results",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Upload,
    Processing {
        image: SelectedImage,
    },
    Results {
        image: SelectedImage,
        response: PrescriptionResponse,
    },
}

/// 通知レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

/// 一時的な通知（トースト）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// ファイル受付の拒否理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeRejected {
    /// upload画面以外での選択
    WrongState,
    /// 設定無効・ヘルスチェック未完了・モデル未ロード
    NotReady,
    /// サイズ超過
    TooLarge,
}

/// 画面状態の保持者
#[derive(Debug, Clone)]
pub struct Session {
    screen: Screen,
    config: ConfigValidation,
    health_checked: bool,
    model_loaded: bool,
    loading_model: bool,
    health: Option<HealthResponse>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl Session {
    /// upload画面で開始する
    ///
    /// 設定が無効なら問題ごとに通知を出す。
    /// 設定の警告も通知するが、有効性には影響しない。
    pub fn new(config: ConfigValidation) -> Self {
        let mut session = Self {
            screen: Screen::Upload,
            config: ConfigValidation::default(),
            health_checked: false,
            model_loaded: false,
            loading_model: false,
            health: None,
            notifications: Vec::new(),
            next_notification_id: 0,
        };

        for error in &config.errors {
            session.notify(NotificationLevel::Error, "Configuration error", error);
        }
        for warning in &config.warnings {
            session.notify(NotificationLevel::Warning, "Configuration warning", warning);
        }
        session.config = config;
        session
    }

    // ---- 状態参照 ----

    pub fn state(&self) -> AppState {
        match self.screen {
            Screen::Upload => AppState::Upload,
            Screen::Processing { .. } => AppState::Processing,
            Screen::Results { .. } => AppState::Results,
        }
    }

    pub fn config_valid(&self) -> bool {
        self.config.is_valid()
    }

    /// ヘルスチェックが必要か（設定が有効で未実施）
    pub fn needs_health_check(&self) -> bool {
        self.config_valid() && !self.health_checked
    }

    pub fn health_checked(&self) -> bool {
        self.health_checked
    }

    pub fn health(&self) -> Option<&HealthResponse> {
        self.health.as_ref()
    }

    pub fn model_loaded(&self) -> bool {
        self.model_loaded
    }

    pub fn is_loading_model(&self) -> bool {
        self.loading_model
    }

    /// 手動モデルロードを提示するか
    pub fn offers_model_load(&self) -> bool {
        self.config_valid() && self.health_checked && !self.model_loaded
    }

    /// ファイル受付が可能か
    pub fn can_accept_file(&self) -> bool {
        self.model_loaded && self.health_checked && self.config_valid()
    }

    /// processing / results 画面で保持している画像
    pub fn selected_image(&self) -> Option<&SelectedImage> {
        match &self.screen {
            Screen::Upload => None,
            Screen::Processing { image } | Screen::Results { image, .. } => Some(image),
        }
    }

    pub fn response(&self) -> Option<&PrescriptionResponse> {
        match &self.screen {
            Screen::Results { response, .. } => Some(response),
            _ => None,
        }
    }

    /// results画面で表示する薬剤
    pub fn medications(&self) -> Vec<Medication> {
        self.response().map(display_medications).unwrap_or_default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    // ---- upload画面 ----

    /// ヘルスチェック結果を記録
    pub fn record_health(&mut self, result: Result<HealthResponse, &Error>) {
        self.health_checked = true;
        match result {
            Ok(health) => {
                self.model_loaded = health.model_loaded;
                if !health.model_loaded {
                    self.notify(
                        NotificationLevel::Info,
                        "Model not loaded",
                        "Load the AI model before scanning a prescription.",
                    );
                }
                self.health = Some(health);
            }
            Err(error) => {
                self.model_loaded = false;
                self.health = None;
                self.notify(
                    NotificationLevel::Error,
                    ScanFailure::CannotConnect.title(),
                    &format!("Health check failed: {}", error),
                );
            }
        }
    }

    /// モデルロード開始。提示中でなければfalse
    pub fn begin_model_load(&mut self) -> bool {
        if !self.offers_model_load() || self.loading_model {
            return false;
        }
        self.loading_model = true;
        true
    }

    /// モデルロード結果を記録
    pub fn record_model_load(&mut self, result: Result<ModelLoadResponse, &Error>) {
        self.loading_model = false;
        match result {
            Ok(resp) if resp.success => {
                self.model_loaded = true;
                if let Some(health) = self.health.as_mut() {
                    health.model_loaded = true;
                }
                self.notify(NotificationLevel::Success, "Model loaded", &resp.message);
            }
            Ok(resp) => {
                self.notify(NotificationLevel::Error, "Model load failed", &resp.message);
            }
            Err(error) => {
                self.notify(NotificationLevel::Error, "Model load failed", &error.to_string());
            }
        }
    }

    /// ファイル選択。受付できればprocessing画面へ
    pub fn select_file(&mut self, image: SelectedImage) -> Result<(), IntakeRejected> {
        if self.state() != AppState::Upload {
            return Err(IntakeRejected::WrongState);
        }

        if !self.can_accept_file() {
            let message = if !self.config_valid() {
                "Fix the API configuration before scanning."
            } else if !self.health_checked {
                "Still checking the server. Please wait."
            } else {
                "Load the AI model before scanning a prescription."
            };
            self.notify(NotificationLevel::Error, "Model not loaded", message);
            return Err(IntakeRejected::NotReady);
        }

        if image.size() > MAX_IMAGE_BYTES {
            self.notify(
                NotificationLevel::Error,
                "File too large",
                &format!(
                    "{} is {:.1} MB; the maximum is 10 MB.",
                    image.file_name,
                    image.size() as f64 / (1024.0 * 1024.0)
                ),
            );
            return Err(IntakeRejected::TooLarge);
        }

        self.screen = Screen::Processing { image };
        Ok(())
    }

    // ---- processing画面 ----

    /// スキャン成功: results画面へ。processing画面以外では無視
    pub fn complete_scan(&mut self, response: PrescriptionResponse) -> bool {
        match std::mem::replace(&mut self.screen, Screen::Upload) {
            Screen::Processing { image } => {
                self.screen = Screen::Results { image, response };
                true
            }
            other => {
                self.screen = other;
                false
            }
        }
    }

    /// スキャン失敗を分類して通知する（画面はまだ変えない）
    pub fn report_scan_failure(&mut self, error: &Error) -> ScanFailure {
        let failure = classify_error(error);
        self.notify(NotificationLevel::Error, failure.title(), failure.message());
        failure
    }

    /// 失敗通知の後、processing画面からupload画面へ戻す
    pub fn abandon_scan(&mut self) {
        if self.state() == AppState::Processing {
            self.screen = Screen::Upload;
        }
    }

    // ---- results画面 ----

    /// 「もう一度スキャン」: 保持データを捨ててupload画面へ
    pub fn scan_another(&mut self) {
        self.screen = Screen::Upload;
    }

    // ---- 通知 ----

    pub fn notify(&mut self, level: NotificationLevel, title: &str, message: &str) -> u64 {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let overflow = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..overflow);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    /// 溜まった通知を取り出す（CLIは表示したら捨てる）
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate_base_url;
    use crate::error::Operation;

    fn image() -> SelectedImage {
        SelectedImage::new("rx.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    fn health(model_loaded: bool) -> HealthResponse {
        HealthResponse {
            message: "ok".to_string(),
            status: "healthy".to_string(),
            model_loaded,
            ..Default::default()
        }
    }

    fn ready_session() -> Session {
        let mut session = Session::new(validate_base_url("https://api.example.com"));
        session.record_health(Ok(health(true)));
        session
    }

    fn response() -> PrescriptionResponse {
        PrescriptionResponse {
            success: true,
            medications: vec![Medication {
                name: "Amoxicillin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "3x daily".to_string(),
                confidence: 0.9,
            }],
            raw_text: "...".to_string(),
            processing_time: 1.23,
        }
    }

    #[test]
    fn test_invalid_config_notifies_each_problem() {
        let session = Session::new(validate_base_url("x/"));
        assert!(!session.config_valid());
        assert!(!session.needs_health_check());
        assert_eq!(session.notifications().len(), 2);
        assert!(session
            .notifications()
            .iter()
            .all(|n| n.level == NotificationLevel::Error));
    }

    #[test]
    fn test_valid_config_needs_health_check() {
        let session = Session::new(validate_base_url("https://api.example.com"));
        assert!(session.needs_health_check());
        assert!(!session.can_accept_file());
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_select_file_without_model_is_rejected() {
        let mut session = Session::new(validate_base_url("https://api.example.com"));
        session.record_health(Ok(health(false)));
        session.take_notifications();

        let result = session.select_file(image());
        assert_eq!(result, Err(IntakeRejected::NotReady));
        assert_eq!(session.state(), AppState::Upload);
        assert!(session.selected_image().is_none());
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].title, "Model not loaded");
    }

    #[test]
    fn test_select_file_with_model_moves_to_processing() {
        let mut session = ready_session();
        session.select_file(image()).unwrap();

        assert_eq!(session.state(), AppState::Processing);
        let selected = session.selected_image().unwrap();
        assert_eq!(selected.file_name, "rx.jpg");
        assert!(selected.preview.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_select_file_too_large() {
        let mut session = ready_session();
        let big = SelectedImage::new("big.png", "image/png", vec![0; MAX_IMAGE_BYTES + 1]);
        assert_eq!(session.select_file(big), Err(IntakeRejected::TooLarge));
        assert_eq!(session.state(), AppState::Upload);
        assert_eq!(session.notifications()[0].title, "File too large");
    }

    #[test]
    fn test_select_file_outside_upload_is_ignored() {
        let mut session = ready_session();
        session.select_file(image()).unwrap();
        assert_eq!(session.select_file(image()), Err(IntakeRejected::WrongState));
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_health_failure_keeps_model_unloaded() {
        let mut session = Session::new(validate_base_url("https://api.example.com"));
        let error = Error::Connection("refused".to_string());
        session.record_health(Err(&error));

        assert!(session.health_checked());
        assert!(!session.model_loaded());
        assert!(!session.can_accept_file());
        assert_eq!(session.notifications()[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_model_load_flow() {
        let mut session = Session::new(validate_base_url("https://api.example.com"));
        session.record_health(Ok(health(false)));
        assert!(session.offers_model_load());

        assert!(session.begin_model_load());
        assert!(session.is_loading_model());
        // 二重起動しない
        assert!(!session.begin_model_load());

        session.record_model_load(Ok(ModelLoadResponse {
            success: true,
            message: "Model loaded successfully".to_string(),
            ..Default::default()
        }));
        assert!(session.model_loaded());
        assert!(!session.offers_model_load());
        assert!(session.can_accept_file());
        assert!(session.health().unwrap().model_loaded);
    }

    #[test]
    fn test_model_load_failure() {
        let mut session = Session::new(validate_base_url("https://api.example.com"));
        session.record_health(Ok(health(false)));
        session.begin_model_load();

        let error = Error::Http {
            operation: Operation::LoadModel,
            status: 500,
            detail: None,
        };
        session.record_model_load(Err(&error));
        assert!(!session.model_loaded());
        assert!(!session.is_loading_model());
        let last = session.notifications().last().unwrap();
        assert_eq!(last.message, "Model load failed with status 500");
    }

    #[test]
    fn test_complete_scan_moves_to_results() {
        let mut session = ready_session();
        session.select_file(image()).unwrap();
        assert!(session.complete_scan(response()));

        assert_eq!(session.state(), AppState::Results);
        assert!(session.response().is_some());
        assert!(session.selected_image().is_some());
        let meds = session.medications();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].dosage, "500mg");
        assert!(!meds[0].is_low_confidence());
    }

    #[test]
    fn test_complete_scan_outside_processing() {
        let mut session = ready_session();
        assert!(!session.complete_scan(response()));
        assert_eq!(session.state(), AppState::Upload);
    }

    #[test]
    fn test_scan_failure_returns_to_upload() {
        let mut session = ready_session();
        session.select_file(image()).unwrap();

        let error = Error::Http {
            operation: Operation::Scan,
            status: 503,
            detail: Some("Model not loaded".to_string()),
        };
        let failure = session.report_scan_failure(&error);
        assert_eq!(failure, ScanFailure::ModelNotLoaded);
        // 待ち時間の間はprocessing画面のまま
        assert_eq!(session.state(), AppState::Processing);

        session.abandon_scan();
        assert_eq!(session.state(), AppState::Upload);
        assert!(session.selected_image().is_none());
        assert_eq!(session.notifications().last().unwrap().title, "Model not loaded");
    }

    #[test]
    fn test_abandon_scan_only_from_processing() {
        let mut session = ready_session();
        session.select_file(image()).unwrap();
        session.complete_scan(response());
        session.abandon_scan();
        assert_eq!(session.state(), AppState::Results);
    }

    #[test]
    fn test_scan_another_resets() {
        let mut session = ready_session();
        session.select_file(image()).unwrap();
        session.complete_scan(response());
        session.scan_another();

        assert_eq!(session.state(), AppState::Upload);
        assert!(session.response().is_none());
        assert!(session.selected_image().is_none());
        assert!(session.medications().is_empty());
        // モデル状態は保持
        assert!(session.can_accept_file());
    }

    #[test]
    fn test_notifications_are_capped() {
        let mut session = Session::new(ConfigValidation::default());
        for i in 0..8 {
            session.notify(NotificationLevel::Info, "n", &i.to_string());
        }
        assert_eq!(session.notifications().len(), MAX_NOTIFICATIONS);
        assert_eq!(session.notifications()[0].message, "3");

        let id = session.notifications()[0].id;
        session.dismiss(id);
        assert_eq!(session.notifications().len(), MAX_NOTIFICATIONS - 1);

        assert_eq!(session.take_notifications().len(), MAX_NOTIFICATIONS - 1);
        assert!(session.notifications().is_empty());
    }
}
