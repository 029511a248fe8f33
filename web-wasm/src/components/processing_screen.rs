//! processing画面
//!
//! 擬似プログレスとスキャン呼び出しを別タスクで並行に走らせる。
//! 画面が破棄されるとプログレスのシグナルも破棄され、tickループは止まる。

use super::progress_bar::ProgressBar;
use crate::api;
use crate::app::schedule_dismissals;
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use prescription_scanner_common::{
    ProgressSimulator, Session, TransitionDelays, PHASES, TICK_MS,
};
use std::time::Duration;

fn millis(duration: Duration) -> u32 {
    duration.as_millis().min(u32::MAX as u128) as u32
}

#[component]
pub fn ProcessingScreen(session: RwSignal<Session>) -> impl IntoView {
    let progress = RwSignal::new(ProgressSimulator::new());
    let image = session.with_untracked(|s| s.selected_image().cloned());
    let delays = TransitionDelays::default();

    spawn_local(async move {
        loop {
            TimeoutFuture::new(TICK_MS as u32).await;
            let running = progress.try_update(|p| {
                p.tick();
                !p.is_finished()
            });
            if running != Some(true) {
                break;
            }
        }
    });

    let preview = image.as_ref().map(|image| image.preview.clone());

    if let Some(image) = image {
        spawn_local(async move {
            match api::scan(&image).await {
                Ok(response) => {
                    progress.try_update(|p| p.complete());
                    TimeoutFuture::new(millis(delays.on_success)).await;
                    session.update(|s| {
                        s.complete_scan(response);
                    });
                }
                Err(error) => {
                    gloo::console::error!(format!("scan failed: {}", error));
                    progress.try_update(|p| p.stop());
                    session.update(|s| {
                        s.report_scan_failure(&error);
                    });
                    schedule_dismissals(session);
                    TimeoutFuture::new(millis(delays.on_failure)).await;
                    session.update(|s| s.abandon_scan());
                }
            }
        });
    }

    let percent = Signal::derive(move || progress.with(|p| p.progress()));
    let step = move || progress.with(|p| p.current_step());

    view! {
        <div class="card processing-screen">
            <h2>"Processing Prescription"</h2>
            <p class="text-muted">"Analyzing your prescription image..."</p>

            {preview.map(|src| view! { <img class="preview" src=src alt="Prescription preview" /> })}

            <ProgressBar progress=percent />

            <ul class="phases">
                {PHASES
                    .iter()
                    .enumerate()
                    .map(|(index, phase)| {
                        let class = move || {
                            let current = step();
                            if index < current {
                                "phase done"
                            } else if index == current {
                                "phase active"
                            } else {
                                "phase pending"
                            }
                        };
                        view! { <li class=class>{phase.label}</li> }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays_in_millis() {
        let delays = TransitionDelays::default();
        assert_eq!(millis(delays.on_success), 500);
        assert_eq!(millis(delays.on_failure), 2_000);
    }
}
