//! Parse the model's response into a validated analysis
//!
//! The only contract with the model is "a valid JSON object embedded
//! somewhere in the text response", so everything here treats the payload
//! as untrusted input: locate the first balanced `{...}` region, parse it,
//! then coerce each field to its expected shape with explicit defaults.

use crate::error::AnalysisError;
use docket_domain::analysis::DEFAULT_CONFIDENCE;
use docket_domain::{ActionDraft, Deadline, DocumentAnalysis, Priority};
use serde_json::Value;
use tracing::warn;

/// Parse a raw model response into a [`DocumentAnalysis`]
pub fn parse_analysis(response: &str) -> Result<DocumentAnalysis, AnalysisError> {
    let region = balanced_json_region(response).ok_or(AnalysisError::NoJsonFound)?;

    let value: Value =
        serde_json::from_str(region).map_err(|e| AnalysisError::InvalidJson(e.to_string()))?;

    Ok(coerce_analysis(&value))
}

/// Locate the first balanced `{...}` region of the text
///
/// Brace counting is string-aware so braces inside JSON string literals
/// (and escaped quotes inside those) do not unbalance the scan.
fn balanced_json_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Coerce an untrusted JSON value into the analysis shape
fn coerce_analysis(value: &Value) -> DocumentAnalysis {
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    DocumentAnalysis {
        case_number: value
            .get("caseNumber")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
            .map(String::from),
        parties: string_list(value.get("parties")),
        deadlines: item_list(value.get("deadlines"), "deadline", parse_deadline),
        key_facts: string_list(value.get("keyFacts")),
        confidence,
        suggested_actions: item_list(value.get("suggestedActions"), "action", parse_action),
        conversational_response: None,
    }
}

/// A list of strings, dropping non-string elements; absent field → empty
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// A list of structured items, skipping entries the parser rejects
fn item_list<T>(
    value: Option<&Value>,
    label: &str,
    parse: impl Fn(&Value) -> Option<T>,
) -> Vec<T> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match parse(item) {
            Some(parsed) => out.push(parsed),
            None => warn!("skipping malformed {label} at index {idx}"),
        }
    }
    out
}

fn parse_deadline(value: &Value) -> Option<Deadline> {
    let date = value.get("date")?.as_str()?.trim();
    if date.is_empty() {
        return None;
    }
    Some(Deadline {
        date: date.to_string(),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        priority: parse_priority(value.get("priority")),
    })
}

fn parse_action(value: &Value) -> Option<ActionDraft> {
    let title = value.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    Some(ActionDraft {
        title: title.to_string(),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        rationale: value
            .get("rationale")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        priority: parse_priority(value.get("priority")),
    })
}

/// Unknown or missing priorities coerce to `medium`
fn parse_priority(value: Option<&Value>) -> Priority {
    value
        .and_then(Value::as_str)
        .and_then(Priority::parse)
        .unwrap_or(Priority::Medium)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"Here is the analysis you requested:
{
  "caseNumber": "2024-CV-1234",
  "parties": ["John Smith (plaintiff)", "Acme Corp (defendant)"],
  "deadlines": [
    {"date": "March 15, 2024", "description": "file motion", "priority": "high"}
  ],
  "keyFacts": ["Contract signed January 2023"],
  "confidence": 0.92,
  "suggestedActions": [
    {
      "title": "File motion for extension",
      "description": "Prepare and file the motion",
      "rationale": "The deadline is approaching",
      "priority": "high"
    }
  ]
}
Let me know if you need anything else."#;

    #[test]
    fn test_parses_embedded_json() {
        let analysis = parse_analysis(FULL_RESPONSE).unwrap();
        assert_eq!(analysis.case_number.as_deref(), Some("2024-CV-1234"));
        assert_eq!(analysis.parties.len(), 2);
        assert_eq!(analysis.deadlines.len(), 1);
        assert_eq!(analysis.deadlines[0].priority, Priority::High);
        assert_eq!(analysis.key_facts.len(), 1);
        assert!((analysis.confidence - 0.92).abs() < f64::EPSILON);
        assert_eq!(analysis.suggested_actions.len(), 1);
        assert_eq!(
            analysis.suggested_actions[0].title,
            "File motion for extension"
        );
    }

    #[test]
    fn test_no_json_region_is_fatal() {
        let result = parse_analysis("I could not analyze these documents.");
        assert!(matches!(result, Err(AnalysisError::NoJsonFound)));
    }

    #[test]
    fn test_unbalanced_json_is_fatal() {
        let result = parse_analysis(r#"{"caseNumber": "2024"#);
        assert!(matches!(result, Err(AnalysisError::NoJsonFound)));
    }

    #[test]
    fn test_invalid_json_in_region_is_fatal() {
        let result = parse_analysis(r#"{bad json here}"#);
        assert!(matches!(result, Err(AnalysisError::InvalidJson(_))));
    }

    #[test]
    fn test_missing_confidence_defaults() {
        let analysis = parse_analysis(r#"{"parties": []}"#).unwrap();
        assert!((analysis.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_confidence_clamps() {
        let analysis = parse_analysis(r#"{"confidence": 3.5}"#).unwrap();
        assert!((analysis.confidence - 1.0).abs() < f64::EPSILON);

        let analysis = parse_analysis(r#"{"confidence": -0.5}"#).unwrap();
        assert!(analysis.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_lists_default_empty() {
        let analysis = parse_analysis(r#"{"confidence": 0.5}"#).unwrap();
        assert!(analysis.parties.is_empty());
        assert!(analysis.deadlines.is_empty());
        assert!(analysis.key_facts.is_empty());
        assert!(analysis.suggested_actions.is_empty());
    }

    #[test]
    fn test_null_case_number_is_none() {
        let analysis = parse_analysis(r#"{"caseNumber": null}"#).unwrap();
        assert_eq!(analysis.case_number, None);

        // Models sometimes write the string "null" instead
        let analysis = parse_analysis(r#"{"caseNumber": "null"}"#).unwrap();
        assert_eq!(analysis.case_number, None);
    }

    #[test]
    fn test_wrong_typed_fields_are_dropped() {
        let analysis = parse_analysis(
            r#"{"parties": "not a list", "deadlines": 42, "keyFacts": [1, 2, "a real fact"]}"#,
        )
        .unwrap();
        assert!(analysis.parties.is_empty());
        assert!(analysis.deadlines.is_empty());
        assert_eq!(analysis.key_facts, vec!["a real fact".to_string()]);
    }

    #[test]
    fn test_actions_without_title_are_skipped() {
        let analysis = parse_analysis(
            r#"{"suggestedActions": [
                {"description": "no title here"},
                {"title": "Valid action", "description": "d", "rationale": "r", "priority": "low"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(analysis.suggested_actions.len(), 1);
        assert_eq!(analysis.suggested_actions[0].title, "Valid action");
        assert_eq!(analysis.suggested_actions[0].priority, Priority::Low);
    }

    #[test]
    fn test_unknown_priority_coerces_to_medium() {
        let analysis = parse_analysis(
            r#"{"deadlines": [{"date": "soon", "description": "d", "priority": "URGENT!!"}]}"#,
        )
        .unwrap();
        assert_eq!(analysis.deadlines[0].priority, Priority::Medium);
    }

    #[test]
    fn test_braces_inside_strings_do_not_unbalance() {
        let response = r#"{"caseNumber": "weird {case} number", "parties": []} trailing"#;
        let analysis = parse_analysis(response).unwrap();
        assert_eq!(analysis.case_number.as_deref(), Some("weird {case} number"));
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let response = r#"{"keyFacts": ["witness said \"{\" then left"]}"#;
        let analysis = parse_analysis(response).unwrap();
        assert_eq!(analysis.key_facts.len(), 1);
    }

    #[test]
    fn test_first_region_wins() {
        let response = r#"{"confidence": 0.1} {"confidence": 0.9}"#;
        let analysis = parse_analysis(response).unwrap();
        assert!((analysis.confidence - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_markdown_fenced_json() {
        let response = "```json\n{\"parties\": [\"Alice\"]}\n```";
        let analysis = parse_analysis(response).unwrap();
        assert_eq!(analysis.parties, vec!["Alice".to_string()]);
    }
}
