use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai_provider::prompts::PromptTemplates;
use crate::ai_provider::{AIError, AIProvider};
use crate::reply::{field_value, reply_lines, set_once, starts_with_ignore_case};

pub const UNKNOWN_LOG_TYPE: &str = "unknown";

/// Severity buckets the classifier asks the model to count.
pub const SEVERITY_LEVELS: [&str; 3] = ["INFO", "WARN", "ERROR"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTypeResult {
    pub log_type: String,
    /// Keys are drawn from `SEVERITY_LEVELS` only.
    pub severity_summary: Option<BTreeMap<String, i64>>,
    /// The model's full reply.
    pub notes: Option<String>,
}

/// One line of a classification reply.
#[derive(Debug, PartialEq)]
enum ClassifierLine<'a> {
    LogType(&'a str),
    Severity { level: &'static str, count: Option<i64> },
    Other,
}

fn classify_line(line: &str) -> ClassifierLine<'_> {
    if let Some(value) = field_value(line, "log type:") {
        return ClassifierLine::LogType(value);
    }
    for level in SEVERITY_LEVELS {
        // "- INFO: 12", also matching "- warning: 3" and "- errors: 5"
        if starts_with_ignore_case(line, &format!("- {}", level)) {
            let count = line
                .split(':')
                .nth(1)
                .and_then(|value| value.trim().parse::<i64>().ok());
            return ClassifierLine::Severity { level, count };
        }
    }
    ClassifierLine::Other
}

/// Extract a `LogTypeResult` from a free-text classification reply.
pub fn parse_log_type_reply(reply: &str) -> LogTypeResult {
    let mut log_type = None;
    let mut severities = BTreeMap::new();

    for line in reply_lines(reply) {
        match classify_line(line) {
            ClassifierLine::LogType(value) => set_once(&mut log_type, value),
            ClassifierLine::Severity {
                level,
                count: Some(count),
            } => {
                severities.insert(level.to_string(), count);
            }
            ClassifierLine::Severity { count: None, .. } | ClassifierLine::Other => {}
        }
    }

    LogTypeResult {
        log_type: log_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOG_TYPE.to_string()),
        severity_summary: if severities.is_empty() {
            None
        } else {
            Some(severities)
        },
        notes: Some(reply.to_string()),
    }
}

/// Ask the model for a log type and rough severity tally.
pub async fn classify(provider: &dyn AIProvider, log_text: &str) -> Result<LogTypeResult, AIError> {
    info!("Classifying log ({} bytes) with {}", log_text.len(), provider.get_provider_name());
    let prompt = PromptTemplates::log_type_prompt(log_text);
    let reply = provider.generate(&prompt).await?;
    let result = parse_log_type_reply(&reply);
    debug!("Log type: {}, severities: {:?}", result.log_type, result.severity_summary);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = "Log type: Kubernetes\n- INFO: 10\n- WARN: 2\n- ERROR: 5\nNotes: crash loop";
        let result = parse_log_type_reply(reply);

        assert_eq!(result.log_type, "Kubernetes");
        let summary = result.severity_summary.unwrap();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary["INFO"], 10);
        assert_eq!(summary["WARN"], 2);
        assert_eq!(summary["ERROR"], 5);
        assert_eq!(result.notes.as_deref(), Some(reply));
    }

    #[test]
    fn test_non_numeric_counts_are_dropped_per_field() {
        let reply = "Log type: Airflow\nSeverities:\n- INFO: many\n- WARN: 3\n- ERROR: ~4";
        let summary = parse_log_type_reply(reply).severity_summary.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary["WARN"], 3);
    }

    #[test]
    fn test_unstructured_reply_defaults() {
        let reply = "I think these are Spark executor logs.";
        let result = parse_log_type_reply(reply);
        assert_eq!(result.log_type, UNKNOWN_LOG_TYPE);
        assert!(result.severity_summary.is_none());
        assert_eq!(result.notes.as_deref(), Some(reply));
    }

    #[test]
    fn test_empty_log_type_value_is_unknown() {
        assert_eq!(parse_log_type_reply("Log type:   ").log_type, UNKNOWN_LOG_TYPE);
    }

    #[test]
    fn test_first_log_type_line_wins() {
        let result = parse_log_type_reply("LOG TYPE: Java app\nlog type: Spark");
        assert_eq!(result.log_type, "Java app");
    }

    #[test]
    fn test_indented_and_variant_severity_labels() {
        let reply = "  Log type: Nginx\n  - warning: 7\n  - Errors: 1\n  - info:3 ";
        let summary = parse_log_type_reply(reply).severity_summary.unwrap();
        assert_eq!(summary["WARN"], 7);
        assert_eq!(summary["ERROR"], 1);
        assert_eq!(summary["INFO"], 3);
    }

    #[test]
    fn test_severity_without_colon_ignored() {
        let result = parse_log_type_reply("- ERROR 5");
        assert!(result.severity_summary.is_none());
    }

    #[test]
    fn test_classify_line_shapes() {
        assert_eq!(classify_line("Log type: Spark"), ClassifierLine::LogType("Spark"));
        assert_eq!(
            classify_line("- ERROR: 2"),
            ClassifierLine::Severity { level: "ERROR", count: Some(2) }
        );
        assert_eq!(classify_line("Notes: none"), ClassifierLine::Other);
    }
}
