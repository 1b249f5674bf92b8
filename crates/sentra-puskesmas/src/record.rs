//! Disease record types in the shape of the bundled table.

use serde::{Deserialize, Serialize};

/// One medication step of a treatment protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentProtocol {
    #[serde(rename = "nama_obat")]
    pub drug_name: String,
    #[serde(rename = "dosis", default)]
    pub dose: Option<String>,
    #[serde(rename = "durasi", default)]
    pub duration: Option<String>,
}

/// A disease manageable at Puskesmas level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    #[serde(rename = "nama_penyakit")]
    pub name: String,
    #[serde(rename = "gejala_klinis", default)]
    pub clinical_symptoms: Vec<String>,
    #[serde(rename = "pemeriksaan_penunjang", default)]
    pub supporting_exams: Vec<String>,
    #[serde(rename = "kriteria_diagnosis", default)]
    pub diagnostic_criteria: Option<String>,
    #[serde(rename = "tata_laksana", default)]
    pub treatment_protocol: Vec<TreatmentProtocol>,
    /// Comma or semicolon separated.
    #[serde(rename = "tanda_bahaya", default)]
    pub danger_signs: String,
    #[serde(rename = "sumber_halaman", default)]
    pub source_page: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Formats each protocol step as `drug[ - dose][ (duration)]`.
pub fn extract_treatment_actions(record: &DiseaseRecord) -> Vec<String> {
    record
        .treatment_protocol
        .iter()
        .map(|step| {
            let mut action = step.drug_name.clone();
            if let Some(dose) = present(&step.dose) {
                action.push_str(" - ");
                action.push_str(dose);
            }
            if let Some(duration) = present(&step.duration) {
                action.push_str(" (");
                action.push_str(duration);
                action.push(')');
            }
            action
        })
        .collect()
}

/// Splits the danger signs on `,` and `;`, trimming and dropping blanks.
pub fn extract_danger_signs(record: &DiseaseRecord) -> Vec<String> {
    record
        .danger_signs
        .split([',', ';'])
        .map(str::trim)
        .filter(|sign| !sign.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(danger_signs: &str, treatment_protocol: Vec<TreatmentProtocol>) -> DiseaseRecord {
        DiseaseRecord {
            name: "Test".into(),
            clinical_symptoms: vec![],
            supporting_exams: vec![],
            diagnostic_criteria: None,
            treatment_protocol,
            danger_signs: danger_signs.into(),
            source_page: String::new(),
        }
    }

    fn step(drug: &str, dose: Option<&str>, duration: Option<&str>) -> TreatmentProtocol {
        TreatmentProtocol {
            drug_name: drug.into(),
            dose: dose.map(Into::into),
            duration: duration.map(Into::into),
        }
    }

    #[test]
    fn danger_signs_split_on_both_delimiters() {
        let record = record("Syok; Penurunan kesadaran, Kejang", vec![]);
        assert_eq!(
            extract_danger_signs(&record),
            vec!["Syok", "Penurunan kesadaran", "Kejang"]
        );
    }

    #[test]
    fn danger_signs_drop_blanks() {
        assert!(extract_danger_signs(&record("", vec![])).is_empty());
        assert_eq!(extract_danger_signs(&record(" ,Sesak;; ", vec![])), vec!["Sesak"]);
    }

    #[test]
    fn treatment_actions_omit_absent_segments() {
        let record = record(
            "",
            vec![
                step("Parasetamol", Some("3x500 mg"), Some("3 hari")),
                step("Oralit", None, Some("sampai diare berhenti")),
                step("Istirahat", Some(""), None),
            ],
        );

        assert_eq!(
            extract_treatment_actions(&record),
            vec![
                "Parasetamol - 3x500 mg (3 hari)",
                "Oralit (sampai diare berhenti)",
                "Istirahat",
            ]
        );
    }

    #[test]
    fn deserializes_dataset_keys() {
        let json = r#"{
            "nama_penyakit": "Influenza",
            "gejala_klinis": ["Demam", "Batuk"],
            "pemeriksaan_penunjang": [],
            "kriteria_diagnosis": null,
            "tata_laksana": [{"nama_obat": "Parasetamol", "dosis": null, "durasi": null}],
            "tanda_bahaya": "Sesak napas",
            "sumber_halaman": "12"
        }"#;

        let record: DiseaseRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.name, "Influenza");
        assert_eq!(record.clinical_symptoms.len(), 2);
        assert_eq!(record.treatment_protocol[0].dose, None);
        assert_eq!(record.source_page, "12");
    }
}
