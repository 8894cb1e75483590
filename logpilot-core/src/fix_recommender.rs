use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai_provider::prompts::PromptTemplates;
use crate::ai_provider::{AIError, AIProvider};
use crate::reply::{bullet, reply_lines, starts_with_ignore_case};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixResult {
    pub quick_fixes: Vec<String>,
    pub long_term_fixes: Vec<String>,
    pub raw_text: Option<String>,
}

/// Which list bullets are currently appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Quick,
    LongTerm,
}

impl Section {
    /// The section a header line switches to, if the line is a header.
    fn from_header(line: &str) -> Option<Section> {
        if starts_with_ignore_case(line, "quick fixes") {
            return Some(Section::Quick);
        }
        let lower = line.to_lowercase();
        if lower.contains("long-term prevention") || lower.contains("long term prevention") {
            return Some(Section::LongTerm);
        }
        None
    }
}

/// Extract quick and long-term fixes from a free-text reply.
///
/// Bullets before any header are dropped. When neither list receives an
/// item, the whole reply becomes the only quick fix.
pub fn parse_fix_reply(reply: &str) -> FixResult {
    let mut quick_fixes = Vec::new();
    let mut long_term_fixes = Vec::new();
    let mut section = Section::None;

    for line in reply_lines(reply) {
        if let Some(next) = Section::from_header(line) {
            section = next;
            continue;
        }
        if let Some(item) = bullet(line) {
            match section {
                Section::Quick => quick_fixes.push(item.to_string()),
                Section::LongTerm => long_term_fixes.push(item.to_string()),
                Section::None => {}
            }
        }
    }

    if quick_fixes.is_empty() && long_term_fixes.is_empty() {
        quick_fixes.push(reply.to_string());
    }

    FixResult {
        quick_fixes,
        long_term_fixes,
        raw_text: Some(reply.to_string()),
    }
}

pub async fn recommend(
    provider: &dyn AIProvider,
    log_type: &str,
    primary_root_cause: &str,
    symptoms: &[String],
) -> Result<FixResult, AIError> {
    info!("Requesting fix recommendations for {} log", log_type);
    let prompt = PromptTemplates::fix_prompt(log_type, primary_root_cause, symptoms);
    let reply = provider.generate(&prompt).await?;
    let result = parse_fix_reply(&reply);
    debug!(
        "Parsed {} quick fixes and {} long-term fixes",
        result.quick_fixes.len(),
        result.long_term_fixes.len()
    );
    Ok(result)
}
