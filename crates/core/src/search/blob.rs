//! Best-effort readers for the semi-structured `text` blob the search service
//! returns, e.g. `{name=Ana Lima, summary=Backend engineer, social_profiles=[...]}`.
//!
//! Nothing here fails loudly: field extraction yields `None` and structured
//! recovery yields an explicit error value the caller is expected to ignore.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

static BARE_KEY_PATTERN: OnceLock<Regex> = OnceLock::new();
static BARE_VALUE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn bare_key_pattern() -> &'static Regex {
    BARE_KEY_PATTERN.get_or_init(|| {
        Regex::new(r"([{\[,])\s*([A-Za-z0-9_]+)\s*=").expect("bare key pattern is valid")
    })
}

fn bare_value_pattern() -> &'static Regex {
    BARE_VALUE_PATTERN
        .get_or_init(|| Regex::new(r#""=\s*([^,\]}\[{]*)"#).expect("bare value pattern is valid"))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateFields {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub employee_id: Option<String>,
}

impl CandidateFields {
    pub fn extract(text: &str) -> Self {
        Self {
            name: extract_field(text, "name"),
            summary: extract_field(text, "summary"),
            employee_id: extract_field(text, "employee_id"),
        }
    }
}

/// First non-empty `key=value` occurrence of `key` (case-insensitive). The
/// key may be the tail of a longer one, so `full_name=` also yields `name`.
/// The value runs until the next `,` or `}`.
pub fn extract_field(text: &str, key: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"(?i){}\s*=\s*([^,}}]+)", regex::escape(key))).ok()?;
    let value = pattern
        .captures_iter(text)
        .map(|captures| captures[1].trim().to_owned())
        .find(|value| !value.is_empty());
    value
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StructuredRecoveryError {
    #[error("text is not a braced key=value record")]
    NotARecord,
    #[error("rewritten record is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Rewrites a `key=value` record into JSON (quote bare keys, turn `=` into
/// `:`, quote scalar values) and parses it. Values containing commas or
/// brackets break the heuristic; that is reported, not repaired.
pub fn recover_structured(text: &str) -> Result<Value, StructuredRecoveryError> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return Err(StructuredRecoveryError::NotARecord);
    }

    let keyed = bare_key_pattern().replace_all(trimmed, r#"${1}"${2}"="#);
    let rewritten = bare_value_pattern().replace_all(&keyed, |captures: &Captures| {
        let value = captures[1].trim();
        if value.is_empty() {
            "\":".to_owned()
        } else {
            let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""));
            format!("\":{quoted}")
        }
    });

    serde_json::from_str(&rewritten)
        .map_err(|error| StructuredRecoveryError::InvalidJson(error.to_string()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocialProfile {
    pub platform: String,
    pub link: String,
}

impl SocialProfile {
    pub fn markdown(&self) -> String {
        format!("🔗 [{}]({})", self.platform, self.link)
    }
}

/// Profiles listed under `social_profiles` in a recovered record. Entries
/// without both a platform and a link are skipped.
pub fn social_profiles(record: &Value) -> Vec<SocialProfile> {
    let Some(entries) = record.get("social_profiles").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let platform = entry.get("platform").and_then(Value::as_str)?;
            let link = entry.get("link").and_then(Value::as_str)?;
            Some(SocialProfile { platform: platform.to_owned(), link: link.to_owned() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        extract_field, recover_structured, social_profiles, CandidateFields, SocialProfile,
        StructuredRecoveryError,
    };

    const FULL_RECORD: &str = "{name=Ana Lima, employee_id=E-1042, summary=Backend engineer with payments background, social_profiles=[{platform=LinkedIn, link=https://linkedin.com/in/ana}, {platform=GitHub, link=https://github.com/ana}]}";

    #[test]
    fn extracts_named_fields_from_record() {
        let fields = CandidateFields::extract(FULL_RECORD);

        assert_eq!(fields.name.as_deref(), Some("Ana Lima"));
        assert_eq!(fields.employee_id.as_deref(), Some("E-1042"));
        assert_eq!(fields.summary.as_deref(), Some("Backend engineer with payments background"));
    }

    #[test]
    fn missing_name_yields_none() {
        assert_eq!(extract_field("{summary=No name here}", "name"), None);
        assert_eq!(extract_field("plain resume text without fields", "name"), None);
    }

    #[test]
    fn field_match_is_case_insensitive() {
        assert_eq!(extract_field("{Name=Bo}", "name").as_deref(), Some("Bo"));
        assert_eq!(extract_field("{SUMMARY = Data lead}", "summary").as_deref(), Some("Data lead"));
    }

    #[test]
    fn field_match_accepts_prefixed_keys() {
        assert_eq!(
            extract_field("{full_name=Ana Lima, summary=x}", "name").as_deref(),
            Some("Ana Lima")
        );
        assert_eq!(extract_field("{first_name=Bo, age=30}", "name").as_deref(), Some("Bo"));
    }

    #[test]
    fn blank_value_is_skipped_in_favor_of_later_occurrence() {
        assert_eq!(extract_field("{name= , name=Cy}", "name").as_deref(), Some("Cy"));
    }

    #[test]
    fn recovers_nested_record_and_profiles() {
        let record = recover_structured(FULL_RECORD).expect("record should be recoverable");

        assert_eq!(record["name"], json!("Ana Lima"));
        assert_eq!(
            social_profiles(&record),
            vec![
                SocialProfile {
                    platform: "LinkedIn".to_owned(),
                    link: "https://linkedin.com/in/ana".to_owned(),
                },
                SocialProfile {
                    platform: "GitHub".to_owned(),
                    link: "https://github.com/ana".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn values_with_quotes_are_escaped() {
        let record = recover_structured(r#"{name=Dana "DJ" Jones}"#).expect("record");
        assert_eq!(record["name"], json!("Dana \"DJ\" Jones"));
    }

    #[test]
    fn free_text_is_not_a_record() {
        assert_eq!(
            recover_structured("Experienced recruiter, based in Lisbon"),
            Err(StructuredRecoveryError::NotARecord)
        );
    }

    #[test]
    fn broken_record_reports_invalid_json() {
        let outcome = recover_structured("{name=Ana, summary=}");
        assert!(matches!(outcome, Err(StructuredRecoveryError::InvalidJson(_))));
    }

    #[test]
    fn profiles_missing_link_are_skipped() {
        let record = json!({
            "social_profiles": [
                {"platform": "LinkedIn"},
                {"platform": "GitHub", "link": "https://github.com/x"}
            ]
        });

        let profiles = social_profiles(&record);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].markdown(), "🔗 [GitHub](https://github.com/x)");
    }
}
