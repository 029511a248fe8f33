//! 画面遷移の通しテスト
//!
//! upload → processing → results をmockitoサーバー相手に実行する

use prescription_scanner::api::ApiClient;
use prescription_scanner::screens::{processing, results, upload};
use prescription_scanner_common::{
    validate_base_url, AppState, NotificationLevel, ScanFailure, Session, TransitionDelays,
    LOW_CONFIDENCE_WARNING,
};
use std::path::PathBuf;
use tempfile::TempDir;

const HEALTH_LOADED: &str = r#"{"message":"ok","status":"healthy","model_loaded":true}"#;
const HEALTH_NOT_LOADED: &str = r#"{"message":"ok","status":"healthy","model_loaded":false}"#;

fn write_image(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("prescription.jpg");
    std::fs::write(&path, b"fake jpeg").unwrap();
    path
}

async fn ready_session(server: &mut mockito::ServerGuard, health: &str) -> (Session, ApiClient) {
    let _mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(health)
        .create_async()
        .await;

    let url = server.url();
    let mut session = Session::new(validate_base_url(&url));
    let client = ApiClient::new(&url);
    upload::prepare(
        &mut session,
        &client,
        upload::ModelLoadMode::Never,
        &upload::ModelSelection::default(),
        false,
    )
    .await
    .unwrap();
    (session, client)
}

/// 成功: results画面で1件、低信頼度警告なし
#[tokio::test]
async fn test_scan_success_shows_results() {
    let mut server = mockito::Server::new_async().await;
    let (mut session, client) = ready_session(&mut server, HEALTH_LOADED).await;
    let _scan = server
        .mock("POST", "/scan")
        .with_status(200)
        .with_body(r#"{"success":true,"medications":[{"name":"Amoxicillin","dosage":"500mg","frequency":"3x daily","confidence":0.9}],"raw_text":"...","processing_time":1.23}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir);

    assert!(upload::select(&mut session, &path).unwrap());
    assert_eq!(session.state(), AppState::Processing);
    assert!(session.selected_image().unwrap().preview.starts_with("data:image/jpeg;base64,"));

    let outcome = processing::run(&mut session, &client, TransitionDelays::none(), false).await;
    assert_eq!(outcome, processing::Outcome::Completed);
    assert_eq!(session.state(), AppState::Results);

    let meds = session.medications();
    assert_eq!(meds.len(), 1);
    assert_eq!(meds[0].dosage, "500mg");

    let out = results::render(&session, false);
    assert_eq!(out.matches("💊").count(), 1);
    assert!(out.contains("500mg"));
    assert!(out.contains("Processing time: 1.23s"));
    assert!(!out.contains(LOW_CONFIDENCE_WARNING));

    session.scan_another();
    assert_eq!(session.state(), AppState::Upload);
    assert!(session.response().is_none());
}

/// モデル未ロードではファイルを受け付けない
#[tokio::test]
async fn test_select_without_model_stays_on_upload() {
    let mut server = mockito::Server::new_async().await;
    let (mut session, _client) = ready_session(&mut server, HEALTH_NOT_LOADED).await;
    assert!(session.offers_model_load());
    session.take_notifications();

    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir);

    assert!(!upload::select(&mut session, &path).unwrap());
    assert_eq!(session.state(), AppState::Upload);
    assert_eq!(session.notifications().len(), 1);
}

/// 手動モデルロード後は受け付ける
#[tokio::test]
async fn test_manual_model_load_enables_intake() {
    let mut server = mockito::Server::new_async().await;
    let (mut session, client) = ready_session(&mut server, HEALTH_NOT_LOADED).await;
    let load = server
        .mock("POST", "/load-model")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success":true,"message":"Model loaded","base_model":"b","adapter_repo":"a"}"#)
        .create_async()
        .await;

    upload::load_model(&mut session, &client, &upload::ModelSelection::default(), false).await;
    load.assert_async().await;
    assert!(session.can_accept_file());

    let dir = tempfile::tempdir().unwrap();
    assert!(upload::select(&mut session, &write_image(&dir)).unwrap());
}

/// 失敗: 通知してupload画面へ戻る
#[tokio::test]
async fn test_scan_failure_returns_to_upload() {
    let mut server = mockito::Server::new_async().await;
    let (mut session, client) = ready_session(&mut server, HEALTH_LOADED).await;
    let _scan = server
        .mock("POST", "/scan")
        .with_status(400)
        .with_body(r#"{"detail":"Invalid image"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    upload::select(&mut session, &write_image(&dir)).unwrap();

    let outcome = processing::run(&mut session, &client, TransitionDelays::none(), false).await;
    assert_eq!(outcome, processing::Outcome::Failed(ScanFailure::InvalidImage));
    assert_eq!(session.state(), AppState::Upload);
    assert!(session.selected_image().is_none());
    assert!(session.response().is_none());
}

/// 503はモデル未ロードとして通知される
#[tokio::test]
async fn test_scan_failure_model_not_loaded() {
    let mut server = mockito::Server::new_async().await;
    let (mut session, client) = ready_session(&mut server, HEALTH_LOADED).await;
    let _scan = server
        .mock("POST", "/scan")
        .with_status(503)
        .with_body(r#"{"detail":"Model not loaded"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    upload::select(&mut session, &write_image(&dir)).unwrap();

    let outcome = processing::run(&mut session, &client, TransitionDelays::none(), false).await;
    assert_eq!(outcome, processing::Outcome::Failed(ScanFailure::ModelNotLoaded));
}

/// processing画面でなければ何もしない
#[tokio::test]
async fn test_run_outside_processing_is_skipped() {
    let mut server = mockito::Server::new_async().await;
    let (mut session, client) = ready_session(&mut server, HEALTH_LOADED).await;
    let scan = server.mock("POST", "/scan").expect(0).create_async().await;

    let outcome = processing::run(&mut session, &client, TransitionDelays::none(), false).await;
    assert_eq!(outcome, processing::Outcome::Skipped);
    scan.assert_async().await;
}

/// 設定が無効ならネットワークを呼ばない
#[tokio::test]
async fn test_invalid_config_skips_network() {
    let mut server = mockito::Server::new_async().await;
    let health = server
        .mock("GET", "/health")
        .expect(0)
        .create_async()
        .await;

    // 末尾スラッシュ
    let url = format!("{}/", server.url());
    let mut session = Session::new(validate_base_url(&url));
    let client = ApiClient::new(&url);
    upload::prepare(
        &mut session,
        &client,
        upload::ModelLoadMode::Always,
        &upload::ModelSelection::default(),
        false,
    )
    .await
    .unwrap();

    health.assert_async().await;
    assert!(!session.health_checked());
    assert!(!session.can_accept_file());
    let notifications = session.notifications();
    assert_eq!(notifications.len(), 2); // エラー1件 + HTTP警告1件
    assert_eq!(notifications[0].level, NotificationLevel::Error);
}
