//! ICD-10 diagnosis result returned by the language model.
//!
//! The model is asked for a fixed JSON shape, but its output is only loosely
//! controlled, so every field except `code` and `description` is optional and
//! unknown fields (e.g. the multi-domain assessment) are kept verbatim in
//! [`DiagnosisResult::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Referral category of the primary diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferralCategory {
    /// Must be handled at the primary care facility.
    NonRujukan,
    /// Tactical referral.
    RujukanTaktik,
    /// Mandatory referral.
    RujukanMutlak,
}

/// Clinical urgency assigned by triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    /// Threat to life or vital organ; refer within 24 hours.
    Emergency,
    /// Serious condition; refer within 3 days.
    Urgent,
    /// Moderate condition; refer within a week.
    SemiUrgent,
    /// Stable case; refer on schedule.
    Routine,
}

/// Evidence supporting the diagnosis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBase {
    #[serde(default)]
    pub clinical_reasoning: String,
    #[serde(default)]
    pub guidelines: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub differential_diagnosis: Vec<String>,
}

/// One referral option proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedReferral {
    pub code: String,
    pub description: String,
    /// Competency level ("3B", "3A", "2" or "1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kompetensi: Option<String>,
    #[serde(default)]
    pub clinical_reasoning: String,
}

/// Diagnosis produced by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    /// ICD-10 code of the primary diagnosis.
    pub code: String,
    /// Human readable diagnosis.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ReferralCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// Triage score, 1 (routine) to 10 (critical).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triage_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<EvidenceBase>,
    #[serde(default)]
    pub clinical_notes: String,
    #[serde(default)]
    pub proposed_referrals: Vec<ProposedReferral>,
    /// Fields the model returned that are not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiagnosisResult {
    /// Creates a minimal result with only the primary diagnosis set.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            category: None,
            confidence_score: None,
            urgency: None,
            triage_score: None,
            recommended_timeframe: None,
            evidence: None,
            clinical_notes: String::new(),
            proposed_referrals: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Guarantees at least one proposed referral.
    ///
    /// When the model returned none, the primary diagnosis becomes the only
    /// option, reasoned by the evidence, then the clinical notes, then a
    /// fixed placeholder (first non-empty wins).
    pub fn ensure_referrals(&mut self) {
        if !self.proposed_referrals.is_empty() {
            return;
        }

        let reasoning = self
            .evidence
            .as_ref()
            .map(|evidence| evidence.clinical_reasoning.as_str())
            .filter(|reasoning| !reasoning.is_empty())
            .or_else(|| Some(self.clinical_notes.as_str()).filter(|notes| !notes.is_empty()))
            .unwrap_or("Primary diagnosis")
            .to_owned();

        self.proposed_referrals.push(ProposedReferral {
            code: self.code.clone(),
            description: self.description.clone(),
            kompetensi: None,
            clinical_reasoning: reasoning,
        });
    }

    /// Returns `true` when the result has the minimum usable structure.
    pub fn is_valid(&self) -> bool {
        !self.code.is_empty() && !self.description.is_empty() && !self.proposed_referrals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_shape_and_keeps_unknown_fields() {
        let json = r#"{
            "code": "A91",
            "description": "Demam Berdarah Dengue",
            "category": "RUJUKAN_TAKTIK",
            "urgency": "SEMI_URGENT",
            "triage_score": 6,
            "assessment": {"severity_distress": "moderate"},
            "proposed_referrals": [
                {"code": "A91", "description": "DBD", "kompetensi": "3B", "clinical_reasoning": "trombosit turun"}
            ]
        }"#;

        let result: DiagnosisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.category, Some(ReferralCategory::RujukanTaktik));
        assert_eq!(result.urgency, Some(Urgency::SemiUrgent));
        assert_eq!(result.triage_score, Some(6));
        assert!(result.extra.contains_key("assessment"));
        assert!(result.is_valid());
    }

    #[test]
    fn ensure_referrals_prefers_evidence_reasoning() {
        let mut result = DiagnosisResult::new("I10", "Hipertensi Esensial");
        result.clinical_notes = "notes".into();
        result.evidence = Some(EvidenceBase {
            clinical_reasoning: "tekanan darah 180/110".into(),
            ..Default::default()
        });

        result.ensure_referrals();

        assert_eq!(result.proposed_referrals.len(), 1);
        assert_eq!(result.proposed_referrals[0].code, "I10");
        assert_eq!(result.proposed_referrals[0].clinical_reasoning, "tekanan darah 180/110");
    }

    #[test]
    fn ensure_referrals_falls_back_to_placeholder() {
        let mut result = DiagnosisResult::new("K30", "Dispepsia");
        result.evidence = Some(EvidenceBase::default());

        result.ensure_referrals();

        assert_eq!(result.proposed_referrals[0].clinical_reasoning, "Primary diagnosis");
    }

    #[test]
    fn ensure_referrals_keeps_existing_options() {
        let mut result = DiagnosisResult::new("G43.9", "Migrain");
        result.proposed_referrals.push(ProposedReferral {
            code: "G43.1".into(),
            description: "Migrain dengan aura".into(),
            kompetensi: Some("3B".into()),
            clinical_reasoning: String::new(),
        });

        result.ensure_referrals();

        assert_eq!(result.proposed_referrals.len(), 1);
        assert_eq!(result.proposed_referrals[0].code, "G43.1");
    }
}
