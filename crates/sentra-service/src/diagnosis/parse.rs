//! Extraction of a diagnosis from raw model output.

use sentra_core::types::DiagnosisResult;
use sentra_core::{Error, Result};

/// Parses model output into a [`DiagnosisResult`].
///
/// Code fences are stripped and the span from the first `{` to the last `}`
/// is parsed. A result without proposed referrals gets the primary diagnosis
/// as its only option.
pub fn parse_diagnosis(text: &str) -> Result<DiagnosisResult> {
    let cleaned = text.replace("```json", "").replace("```", "");

    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return Err(Error::serialization().with_message("no JSON object found in model response"));
    };
    if end < start {
        return Err(Error::serialization().with_message("no JSON object found in model response"));
    }

    let mut result: DiagnosisResult = serde_json::from_str(&cleaned[start..=end])?;
    result.ensure_referrals();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use sentra_core::ErrorKind;

    use super::*;

    #[test]
    fn parses_fenced_output() {
        let text = "```json\n{\"code\": \"J18.9\", \"description\": \"Pneumonia\", \"clinical_notes\": \"ronki basah\"}\n```";

        let result = parse_diagnosis(text).unwrap();

        assert_eq!(result.code, "J18.9");
        assert_eq!(result.proposed_referrals.len(), 1);
        assert_eq!(result.proposed_referrals[0].clinical_reasoning, "ronki basah");
    }

    #[test]
    fn ignores_prose_around_the_object() {
        let text = "Berikut hasilnya:\n\n{\"code\": \"K25.9\", \"description\": \"Ulkus gaster\", \"evidence\": {\"red_flags\": [\"melena\"]}}\nSemoga membantu.";

        let result = parse_diagnosis(text).unwrap();

        assert_eq!(result.code, "K25.9");
        assert_eq!(result.evidence.unwrap().red_flags, vec!["melena"]);
    }

    #[test]
    fn rejects_output_without_json() {
        let error = parse_diagnosis("maaf, saya tidak bisa").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);

        let error = parse_diagnosis("} terbalik {").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn rejects_objects_missing_the_primary_diagnosis() {
        let error = parse_diagnosis("{\"description\": \"tanpa kode\"}").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }
}
