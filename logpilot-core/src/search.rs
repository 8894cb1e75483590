use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CONTEXT_LINES: usize = 2;

/// A matching log line with the lines around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMatch {
    /// 1-based line number
    pub line_number: usize,
    pub line: String,
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
}

impl LogMatch {
    pub fn line_index(&self) -> usize {
        self.line_number - 1
    }
}

/// Case-insensitive search for `query`, returning every match with up to
/// `context_lines` lines of context on each side.
pub fn search_log(log_text: &str, query: &str, context_lines: usize) -> Vec<LogMatch> {
    search_any(log_text, &[query], context_lines)
}

/// Single pass over the log matching any of `keywords`, case-insensitively.
/// Matches come back in line order; a line matching several keywords appears once.
pub fn search_any(log_text: &str, keywords: &[&str], context_lines: usize) -> Vec<LogMatch> {
    let Some(pattern) = keyword_pattern(keywords) else {
        return Vec::new();
    };

    let lines: Vec<&str> = log_text.lines().collect();
    let matches: Vec<LogMatch> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| pattern.is_match(line))
        .map(|(i, line)| {
            let start = i.saturating_sub(context_lines);
            let end = (i + context_lines + 1).min(lines.len());
            LogMatch {
                line_number: i + 1,
                line: line.to_string(),
                context_before: to_owned(&lines[start..i]),
                context_after: to_owned(&lines[i + 1..end]),
            }
        })
        .collect();

    debug!("Keyword search {:?} matched {} of {} lines", keywords, matches.len(), lines.len());
    matches
}

fn keyword_pattern(keywords: &[&str]) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    // Escaped literals always form a valid pattern.
    RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()
        .ok()
}

fn to_owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}
