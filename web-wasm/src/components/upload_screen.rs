//! upload画面
//!
//! ファイル選択・カメラ撮影・ドラッグ&ドロップの3経路。
//! モデル未ロードの間は受け付けず、手動ロードボタンを出す。

use crate::api;
use crate::app::schedule_dismissals;
use leptos::prelude::*;
use leptos::task::spawn_local;
use prescription_scanner_common::{
    NotificationLevel, SelectedImage, Session, DEFAULT_ADAPTER_REPO, DEFAULT_BASE_MODEL,
};
use web_sys::{DragEvent, File, HtmlInputElement};

/// ブラウザがMIMEを付けない場合（HEICなど）
const FALLBACK_MIME: &str = "application/octet-stream";

fn mime_or_fallback(mime: String) -> String {
    if mime.trim().is_empty() {
        FALLBACK_MIME.to_string()
    } else {
        mime
    }
}

async fn read_file(file: File) -> Result<SelectedImage, String> {
    let name = file.name();
    let mime = mime_or_fallback(file.type_());
    let blob = gloo::file::File::from(file);
    let bytes = gloo::file::futures::read_as_bytes(&blob)
        .await
        .map_err(|e| e.to_string())?;
    Ok(SelectedImage::new(name, mime, bytes))
}

fn accept_file(session: RwSignal<Session>, file: File) {
    spawn_local(async move {
        match read_file(file).await {
            Ok(image) => session.update(|s| {
                // 拒否理由は通知として残る
                let _ = s.select_file(image);
            }),
            Err(message) => session.update(|s| {
                s.notify(NotificationLevel::Error, "Could not read file", &message);
            }),
        }
        schedule_dismissals(session);
    });
}

fn status_text(s: &Session) -> String {
    if !s.config_valid() {
        return "API is not configured".to_string();
    }
    if !s.health_checked() {
        return "Checking server...".to_string();
    }
    match (s.model_loaded(), s.health()) {
        (true, Some(health)) => match &health.device {
            Some(device) => format!("Model ready ({})", device),
            None => "Model ready".to_string(),
        },
        (true, None) => "Model ready".to_string(),
        (false, Some(_)) => "Model not loaded".to_string(),
        (false, None) => "Server unreachable".to_string(),
    }
}

#[component]
pub fn UploadScreen(session: RwSignal<Session>) -> impl IntoView {
    let (is_dragover, set_is_dragover) = signal(false);
    let can_accept = move || session.with(|s| s.can_accept_file());
    let offers_load = move || session.with(|s| s.offers_model_load());
    let loading = move || session.with(|s| s.is_loading_model());

    let on_load_model = move |_| {
        let mut started = false;
        session.update(|s| started = s.begin_model_load());
        if !started {
            return;
        }
        spawn_local(async move {
            let result = api::load_model(DEFAULT_BASE_MODEL, DEFAULT_ADAPTER_REPO).await;
            session.update(|s| match result {
                Ok(resp) => s.record_model_load(Ok(resp)),
                Err(error) => s.record_model_load(Err(&error)),
            });
            schedule_dismissals(session);
        });
    };

    let on_change = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        let file = input.files().and_then(|files| files.get(0));
        // 同じファイルをもう一度選べるように
        input.set_value("");
        if let Some(file) = file {
            accept_file(session, file);
        }
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);
        if let Some(file) = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0))
        {
            accept_file(session, file);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if can_accept() {
            set_is_dragover.set(true);
        }
    };

    let button_class = move |base: &'static str| {
        if can_accept() {
            base.to_string()
        } else {
            format!("{} disabled", base)
        }
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["card", "upload-screen"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=move |_: DragEvent| set_is_dragover.set(false)
        >
            <div class="upload-icon">"🩺"</div>
            <h1>"Prescription Scanner"</h1>
            <p class="text-muted">
                "Upload or capture your medical prescription to extract medication information instantly"
            </p>

            <p class="status">{move || session.with(status_text)}</p>

            <Show when=offers_load>
                <button class="btn btn-secondary" disabled=loading on:click=on_load_model>
                    {move || if loading() { "Loading model..." } else { "Load AI model" }}
                </button>
            </Show>

            <div class="upload-actions">
                <label class=move || button_class("btn btn-primary")>
                    <input
                        type="file"
                        accept="image/*"
                        class="hidden"
                        disabled=move || !can_accept()
                        on:change=on_change
                    />
                    "📁 Upload Prescription Image"
                </label>
                <label class=move || button_class("btn btn-outline")>
                    <input
                        type="file"
                        accept="image/*"
                        capture="environment"
                        class="hidden"
                        disabled=move || !can_accept()
                        on:change=on_change
                    />
                    "📷 Capture with Camera"
                </label>
            </div>

            <p class="text-muted small">"Supported formats: JPG, PNG, HEIC • Maximum file size: 10MB"</p>
        </div>
    }
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn file(bytes: &[u8], name: &str) -> File {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        File::new_with_u8_array_sequence(&parts, name).expect("File creation failed")
    }

    #[wasm_bindgen_test]
    async fn wasm_read_file_without_type_uses_fallback_mime() {
        let image = read_file(file(b"heic bytes", "rx.heic")).await.unwrap();

        assert_eq!(image.file_name, "rx.heic");
        assert_eq!(image.mime_type, FALLBACK_MIME);
        assert_eq!(image.bytes, b"heic bytes".to_vec());
        assert!(image.preview.starts_with("data:application/octet-stream;base64,"));
    }
}
