//! トースト通知

use leptos::prelude::*;
use prescription_scanner_common::Session;

#[component]
pub fn Toasts(session: RwSignal<Session>) -> impl IntoView {
    view! {
        <div class="toasts">
            <For
                each=move || session.with(|s| s.notifications().to_vec())
                key=|note| note.id
                children=move |note| {
                    let id = note.id;
                    view! {
                        <div class=format!("toast toast-{}", note.level.as_str()) role="alert">
                            <div class="toast-body">
                                <strong>{note.title}</strong>
                                <p>{note.message}</p>
                            </div>
                            <button
                                class="toast-close"
                                aria-label="Dismiss"
                                on:click=move |_| session.update(|s| s.dismiss(id))
                            >
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
