//! JSON reporter
//!
//! Pretty-printed dump of the full assessments, for piping to jq or
//! downstream tooling.

use anyhow::Result;

use crate::pipeline::CampaignAssessment;

pub fn render(assessments: &[CampaignAssessment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(assessments)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_assessment;

    #[test]
    fn test_json_round_trips() {
        let json = render(&[test_assessment()]).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse JSON");
        let first = &parsed[0];
        assert_eq!(first["campaign"], "トヨタSUV");
        assert_eq!(first["immediate"].as_array().unwrap().len(), 1);
        assert_eq!(first["listings"][0]["urgency"], 5);
    }

    #[test]
    fn test_absent_predictions_are_omitted() {
        let json = render(&[test_assessment()]).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse JSON");
        // The weak listing has no predictions; its keys are skipped.
        assert!(parsed[0]["listings"][1].get("predicted_p50").is_none());
    }
}
