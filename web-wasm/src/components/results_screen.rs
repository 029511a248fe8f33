//! results画面

use leptos::prelude::*;
use prescription_scanner_common::{Medication, Session, LOW_CONFIDENCE_WARNING};

#[component]
fn MedicationCard(index: usize, medication: Medication) -> impl IntoView {
    let low = medication.is_low_confidence();
    let class = if low {
        "card medication low-confidence"
    } else {
        "card medication"
    };
    let confidence = format!("{:.0}% confidence", medication.confidence * 100.0);

    view! {
        <div class=class>
            <div class="medication-header">
                <span class="medication-index">{index + 1}</span>
                <h4>"💊 " {medication.name}</h4>
                <span class="badge">{confidence}</span>
            </div>
            {(!medication.dosage.is_empty()).then(|| {
                view! { <p class="dosage"><strong>"Dosage: "</strong>{medication.dosage.clone()}</p> }
            })}
            {(!medication.frequency.is_empty()).then(|| {
                view! { <p class="frequency"><strong>"Frequency: "</strong>{medication.frequency.clone()}</p> }
            })}
            {low.then(|| view! { <p class="warning">{LOW_CONFIDENCE_WARNING}</p> })}
        </div>
    }
}

#[component]
pub fn ResultsScreen(session: RwSignal<Session>) -> impl IntoView {
    // results画面の間はレスポンスが変わらないので一度だけ読む
    let medications = session.with_untracked(|s| s.medications());
    let (processing_time, raw_text) = session.with_untracked(|s| {
        s.response()
            .map(|r| (r.processing_time, r.raw_text.clone()))
            .unwrap_or_default()
    });
    let preview = session.with_untracked(|s| {
        s.selected_image()
            .map(|image| (image.preview.clone(), image.file_name.clone()))
    });
    let count = medications.len();

    let list = if medications.is_empty() {
        view! { <p class="text-muted">"No medications detected."</p> }.into_any()
    } else {
        medications
            .into_iter()
            .enumerate()
            .map(|(index, medication)| view! { <MedicationCard index=index medication=medication /> })
            .collect_view()
            .into_any()
    };

    let raw_panel = (!raw_text.trim().is_empty()).then(|| {
        view! {
            <details class="card raw-text">
                <summary>"Raw extracted text"</summary>
                <pre>{raw_text}</pre>
            </details>
        }
    });

    view! {
        <div class="results-screen">
            <div class="results-header">
                <h2>"✅ Prescription Analyzed"</h2>
                <p class="text-muted">"Review the extracted medications below"</p>
            </div>

            {preview.map(|(src, name)| view! {
                <div class="card image-card">
                    <img class="preview" src=src alt=name.clone() />
                    <p class="text-muted small">{name}</p>
                </div>
            })}

            <div class="card summary">
                <span>{format!("Processing time: {:.2}s", processing_time)}</span>
                <span class="badge">{format!("Medications found: {}", count)}</span>
            </div>

            <div class="medications">{list}</div>

            {raw_panel}

            <button class="btn btn-primary" on:click=move |_| session.update(|s| s.scan_another())>
                "Scan Another Prescription"
            </button>
        </div>
    }
}
