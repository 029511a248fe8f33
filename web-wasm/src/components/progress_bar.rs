//! プログレスバーコンポーネント

use leptos::prelude::*;

/// `progress` は 0.0〜100.0
#[component]
pub fn ProgressBar(progress: Signal<f64>) -> impl IntoView {
    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    class="progress-fill"
                    style=move || format!("width: {:.1}%", progress.get())
                />
            </div>
            <p class="progress-text">
                {move || format!("{:.0}%", progress.get())}
            </p>
        </div>
    }
}
