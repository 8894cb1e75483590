use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai_provider::prompts::PromptTemplates;
use crate::ai_provider::{AIError, AIProvider};
use crate::reply::{bullet, field_value, or_raw, reply_lines, set_once};
use crate::segmenter::LogSegment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCauseResult {
    pub primary_root_cause: String,
    pub symptoms: Vec<String>,
    /// Parsed verbatim from the reply; not range-checked.
    pub confidence: Option<f64>,
    pub raw_analysis: Option<String>,
}

/// Extract a `RootCauseResult` from a free-text analysis reply.
///
/// The first `Primary root cause:` line wins, every `- ` bullet is a symptom,
/// and only the first `Confidence:` line is tried as a float. Without a root
/// cause line the whole reply becomes the root cause.
pub fn parse_root_cause_reply(reply: &str) -> RootCauseResult {
    let mut primary_root_cause = None;
    let mut symptoms = Vec::new();
    let mut confidence_text = None;

    for line in reply_lines(reply) {
        if let Some(value) = field_value(line, "primary root cause:") {
            set_once(&mut primary_root_cause, value);
        } else if let Some(item) = bullet(line) {
            symptoms.push(item.to_string());
        } else if let Some(value) = field_value(line, "confidence:") {
            set_once(&mut confidence_text, value);
        }
    }

    RootCauseResult {
        primary_root_cause: or_raw(primary_root_cause, reply),
        symptoms,
        confidence: confidence_text.and_then(|v| v.parse::<f64>().ok()),
        raw_analysis: Some(reply.to_string()),
    }
}

pub async fn analyze(
    provider: &dyn AIProvider,
    log_type: &str,
    segments: &[LogSegment],
    error_samples: &[String],
) -> Result<RootCauseResult, AIError> {
    info!(
        "Analyzing root cause for {} log: {} segments, {} error samples",
        log_type,
        segments.len(),
        error_samples.len()
    );
    let prompt = PromptTemplates::root_cause_prompt(log_type, segments, error_samples);
    let reply = provider.generate(&prompt).await?;
    let result = parse_root_cause_reply(&reply);
    debug!(
        "Root cause parsed: {} symptoms, confidence {:?}",
        result.symptoms.len(),
        result.confidence
    );
    Ok(result)
}
