//! results画面

use crate::error::Result;
use prescription_scanner_common::{Medication, Session, LOW_CONFIDENCE_WARNING};
use std::path::Path;

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn card_lines(index: usize, med: &Medication) -> Vec<String> {
    let mut lines = vec![
        format!("  {}. 💊 {}", index + 1, med.name),
        format!("     Dosage:     {}", or_dash(&med.dosage)),
        format!("     Frequency:  {}", or_dash(&med.frequency)),
        format!("     Confidence: {:.0}%", med.confidence * 100.0),
    ];
    if med.is_low_confidence() {
        lines.push(format!("     {}", LOW_CONFIDENCE_WARNING));
    }
    lines
}

/// results画面の表示内容。results画面でなければ空文字
///
/// `show_raw` はブラウザ版の折りたたみ「Raw text」パネルに相当
pub fn render(session: &Session, show_raw: bool) -> String {
    let Some(response) = session.response() else {
        return String::new();
    };
    let medications = session.medications();
    let mut lines = vec!["✅ Prescription analyzed".to_string()];

    if let Some(image) = session.selected_image() {
        lines.push(format!(
            "Image: {} ({}, {:.1} KB)",
            image.file_name,
            image.mime_type,
            image.size() as f64 / 1024.0
        ));
    }
    lines.push(format!(
        "Processing time: {:.2}s · Medications found: {}",
        response.processing_time,
        medications.len()
    ));
    lines.push(String::new());

    if medications.is_empty() {
        lines.push("  No medications detected.".to_string());
    }
    for (index, med) in medications.iter().enumerate() {
        lines.extend(card_lines(index, med));
    }

    if !response.raw_text.trim().is_empty() {
        lines.push(String::new());
        if show_raw {
            lines.push("Raw text:".to_string());
            lines.extend(response.raw_text.lines().map(|line| format!("  | {}", line)));
        } else {
            lines.push("Raw text: hidden (use --raw to show)".to_string());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// レスポンスをJSONで保存
pub fn save_response(session: &Session, output: &Path) -> Result<bool> {
    let Some(response) = session.response() else {
        return Ok(false);
    };
    let json = serde_json::to_string_pretty(response)?;
    std::fs::write(output, json)?;
    Ok(true)
}
