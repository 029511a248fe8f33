//! メインアプリケーションコンポーネント

use crate::api;
use crate::components::{
    processing_screen::ProcessingScreen, results_screen::ResultsScreen, toasts::Toasts,
    upload_screen::UploadScreen,
};
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use prescription_scanner_common::{validate_base_url, AppState, Session};

/// トーストを自動で消すまでの時間
const TOAST_MS: u32 = 5_000;

/// 現在表示中の通知を一定時間後に消す
pub fn schedule_dismissals(session: RwSignal<Session>) {
    let ids: Vec<u64> = session.with_untracked(|s| s.notifications().iter().map(|n| n.id).collect());
    if ids.is_empty() {
        return;
    }
    spawn_local(async move {
        TimeoutFuture::new(TOAST_MS).await;
        session.update(|s| {
            for id in ids {
                s.dismiss(id);
            }
        });
    });
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let validation = validate_base_url(api::base_url());
    for error in &validation.errors {
        gloo::console::error!(error.clone());
    }
    let session = RwSignal::new(Session::new(validation));
    schedule_dismissals(session);

    // 起動時のヘルスチェック（設定が有効な場合のみ）
    if session.with_untracked(|s| s.needs_health_check()) {
        spawn_local(async move {
            let result = api::health().await;
            session.update(|s| match result {
                Ok(health) => s.record_health(Ok(health)),
                Err(error) => s.record_health(Err(&error)),
            });
            schedule_dismissals(session);
        });
    }

    // 画面が変わったときだけ再描画する
    let state = Memo::new(move |_| session.with(|s| s.state()));

    view! {
        <div class="container">
            <Toasts session=session />
            {move || match state.get() {
                AppState::Upload => view! { <UploadScreen session=session /> }.into_any(),
                AppState::Processing => view! { <ProcessingScreen session=session /> }.into_any(),
                AppState::Results => view! { <ResultsScreen session=session /> }.into_any(),
            }}
        </div>
    }
}
