//! 表示用の薬剤リスト
//!
//! バックエンドの薬剤リストからプレースホルダを除き、
//! 何も残らなければ生テキストを分割して薬剤候補を作る。

use crate::types::{Medication, PrescriptionResponse};
use std::collections::HashSet;

/// 解析失敗時にバックエンドが返すプレースホルダ名
const PLACEHOLDER_NAME: &str = "unable to parse medications";

/// 生テキストから作った薬剤の信頼度
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// これ未満は低信頼度として警告表示
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// 低信頼度の薬剤に付ける警告
pub const LOW_CONFIDENCE_WARNING: &str = "⚠ Low confidence - please verify with your pharmacist";

const SEPARATORS: &[char] = &['\n', ',', ';', '+'];

impl Medication {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

/// プレースホルダ名かどうか（大文字小文字・前後空白を無視）
pub fn is_placeholder(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(PLACEHOLDER_NAME)
}

/// 空の名前とプレースホルダを除外
pub fn filter_medications(medications: &[Medication]) -> Vec<Medication> {
    medications
        .iter()
        .filter(|m| !m.name.trim().is_empty() && !is_placeholder(&m.name))
        .cloned()
        .collect()
}

/// 生テキストを分割して薬剤候補を作る
///
/// 改行・カンマ・セミコロン・プラスで分割し、
/// 英字を含まない断片を除いて出現順に重複排除する。
///
/// # Examples
/// ```
/// use prescription_scanner_common::fallback_from_raw_text;
///
/// let meds = fallback_from_raw_text("Amoxicillin 500mg\nIbuprofen, Ibuprofen");
/// let names: Vec<&str> = meds.iter().map(|m| m.name.as_str()).collect();
/// assert_eq!(names, ["Amoxicillin 500mg", "Ibuprofen"]);
/// ```
pub fn fallback_from_raw_text(raw_text: &str) -> Vec<Medication> {
    let mut seen = HashSet::new();

    raw_text
        .split(SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| token.chars().any(char::is_alphabetic))
        .filter(|token| !is_placeholder(token))
        .filter(|token| seen.insert(*token))
        .map(|token| Medication {
            name: token.to_string(),
            dosage: String::new(),
            frequency: String::new(),
            confidence: FALLBACK_CONFIDENCE,
        })
        .collect()
}

/// 結果画面に表示する薬剤リスト
pub fn display_medications(response: &PrescriptionResponse) -> Vec<Medication> {
    let filtered = filter_medications(&response.medications);
    if filtered.is_empty() {
        fallback_from_raw_text(&response.raw_text)
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn med(name: &str, confidence: f64) -> Medication {
        Medication {
            name: name.to_string(),
            dosage: "10mg".to_string(),
            frequency: "daily".to_string(),
            confidence,
        }
    }

    #[test]
    fn test_fallback_dedup_preserves_order() {
        let meds = fallback_from_raw_text("Amoxicillin 500mg\nIbuprofen, Ibuprofen");
        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].name, "Amoxicillin 500mg");
        assert_eq!(meds[1].name, "Ibuprofen");
        for m in &meds {
            assert_eq!(m.confidence, FALLBACK_CONFIDENCE);
            assert!(m.dosage.is_empty());
            assert!(m.frequency.is_empty());
        }
    }

    #[test]
    fn test_fallback_without_letters() {
        assert!(fallback_from_raw_text("123, 456; --- + 7.5\n\n").is_empty());
        assert!(fallback_from_raw_text("").is_empty());
    }

    #[test]
    fn test_fallback_all_separators() {
        let meds = fallback_from_raw_text("Aspirin;Metformin+Lisinopril\n Atorvastatin ,");
        let names: Vec<&str> = meds.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Aspirin", "Metformin", "Lisinopril", "Atorvastatin"]);
    }

    #[test]
    fn test_fallback_skips_placeholder() {
        let meds = fallback_from_raw_text("Unable to parse medications\nWarfarin");
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Warfarin");
    }

    #[test]
    fn test_fallback_dedup_is_exact() {
        // 大文字小文字が違えば別物
        let meds = fallback_from_raw_text("aspirin, Aspirin");
        assert_eq!(meds.len(), 2);
    }

    #[test]
    fn test_placeholder_excluded() {
        let meds = vec![
            med("  Unable To Parse Medications ", 0.99),
            med("UNABLE TO PARSE MEDICATIONS", 0.99),
            med("Amoxicillin", 0.9),
        ];
        let filtered = filter_medications(&meds);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Amoxicillin");
    }

    #[test]
    fn test_empty_names_excluded() {
        let meds = vec![med("", 0.9), med("   ", 0.9)];
        assert!(filter_medications(&meds).is_empty());
    }

    #[test]
    fn test_display_uses_backend_list() {
        let response = PrescriptionResponse {
            success: true,
            medications: vec![med("Amoxicillin", 0.9)],
            raw_text: "Amoxicillin\nParacetamol".to_string(),
            processing_time: 1.0,
        };
        let meds = display_medications(&response);
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].dosage, "10mg");
    }

    #[test]
    fn test_display_falls_back_on_placeholder_only() {
        let response = PrescriptionResponse {
            success: true,
            medications: vec![med("Unable to parse medications", 0.0)],
            raw_text: "Paracetamol 1g; Omeprazole".to_string(),
            processing_time: 2.5,
        };
        let meds = display_medications(&response);
        let names: Vec<&str> = meds.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Paracetamol 1g", "Omeprazole"]);
        assert!(meds.iter().all(|m| m.name != "Unable to parse medications"));
    }

    #[test]
    fn test_low_confidence_threshold() {
        assert!(med("A", 0.79).is_low_confidence());
        assert!(!med("A", 0.8).is_low_confidence());
        assert!(!med("A", 0.9).is_low_confidence());
    }
}
