//! `sentra disease ...`

use sentra_puskesmas::{
    DiseaseMatcher, DiseaseRecord, extract_danger_signs, extract_treatment_actions,
};
use serde::Serialize;

use crate::config::DiseaseCommand;

/// A record together with its derived treatment actions and danger signs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiseaseView<'a> {
    #[serde(flatten)]
    record: &'a DiseaseRecord,
    treatment_actions: Vec<String>,
    danger_sign_list: Vec<String>,
}

impl<'a> DiseaseView<'a> {
    fn new(record: &'a DiseaseRecord) -> Self {
        Self {
            record,
            treatment_actions: extract_treatment_actions(record),
            danger_sign_list: extract_danger_signs(record),
        }
    }
}

/// Whether a disease is on the Puskesmas table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Treatability<'a> {
    name: &'a str,
    treatable_locally: bool,
}

pub fn run(matcher: &DiseaseMatcher, command: &DiseaseCommand) -> anyhow::Result<String> {
    let output = match command {
        DiseaseCommand::Find { name } => {
            serde_json::to_string_pretty(&matcher.find_by_name(name).map(DiseaseView::new))?
        }
        DiseaseCommand::Symptoms { symptoms } => {
            serde_json::to_string_pretty(&matcher.find_by_symptoms(symptoms).map(DiseaseView::new))?
        }
        DiseaseCommand::Search { query } => {
            let names: Vec<&str> = matcher
                .search_by_partial_name(query)
                .into_iter()
                .map(|record| record.name.as_str())
                .collect();
            serde_json::to_string_pretty(&names)?
        }
        DiseaseCommand::List => {
            let views: Vec<DiseaseView<'_>> =
                matcher.list_all().iter().map(DiseaseView::new).collect();
            serde_json::to_string_pretty(&views)?
        }
        DiseaseCommand::Treatable { name } => serde_json::to_string_pretty(&Treatability {
            name,
            treatable_locally: matcher.can_be_treated_locally(name),
        })?,
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn run_json(command: DiseaseCommand) -> anyhow::Result<Value> {
        let matcher = DiseaseMatcher::bundled()?;
        Ok(serde_json::from_str(&run(&matcher, &command)?)?)
    }

    #[test]
    fn find_includes_derived_fields() -> anyhow::Result<()> {
        let value = run_json(DiseaseCommand::Find {
            name: "demam tifoid".into(),
        })?;

        assert_eq!(value["nama_penyakit"], "Demam Tifoid");
        assert!(value["treatmentActions"].as_array().is_some_and(|a| !a.is_empty()));
        assert!(value["dangerSignList"].is_array());
        Ok(())
    }

    #[test]
    fn unknown_disease_prints_null() -> anyhow::Result<()> {
        let value = run_json(DiseaseCommand::Find {
            name: "penyakit fiktif".into(),
        })?;
        assert!(value.is_null());
        Ok(())
    }

    #[test]
    fn search_lists_names() -> anyhow::Result<()> {
        let value = run_json(DiseaseCommand::Search {
            query: "demam".into(),
        })?;

        let names = value.as_array().map(Vec::len).unwrap_or_default();
        assert!(names >= 2);
        Ok(())
    }

    #[test]
    fn treatable_reports_flag() -> anyhow::Result<()> {
        let value = run_json(DiseaseCommand::Treatable {
            name: "Influenza".into(),
        })?;
        assert_eq!(value["treatableLocally"], true);
        Ok(())
    }
}
