use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::search::search_any;

/// Keywords that flag a line as error-like (case-insensitive substring match).
pub const ERROR_KEYWORDS: &[&str] = &["error", "exception", "failed"];
pub const MAX_ERROR_SAMPLES: usize = 10;
/// Lines in the `start` and `end` segments.
pub const EDGE_SEGMENT_LINES: usize = 30;
/// Lines taken on each side of the first error for `error_region`.
pub const ERROR_REGION_RADIUS: usize = 15;

/// A labelled window of consecutive log lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSegment {
    pub id: String,
    pub summary: String,
    pub sample_lines: Vec<String>,
}

impl LogSegment {
    fn new(id: &str, summary: &str, lines: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            summary: summary.to_string(),
            sample_lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub segments: Vec<LogSegment>,
    pub error_samples: Vec<String>,
}

impl SegmentResult {
    pub fn segment_ids(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.id.as_str()).collect()
    }
}

/// Split raw log text into `start`, `error_region` and `end` windows and
/// collect up to ten distinct error-like lines.
pub fn segment(log_text: &str) -> SegmentResult {
    let lines: Vec<&str> = log_text.lines().collect();
    if lines.is_empty() {
        return SegmentResult::default();
    }

    // Matches arrive in line order, so the first sample is also the first
    // occurrence of its content and its index anchors the error region.
    let mut seen = HashSet::new();
    let mut error_samples = Vec::new();
    let mut anchor = None;
    for m in search_any(log_text, ERROR_KEYWORDS, 0) {
        if error_samples.len() == MAX_ERROR_SAMPLES {
            break;
        }
        if seen.insert(m.line.clone()) {
            anchor.get_or_insert(m.line_index());
            error_samples.push(m.line);
        }
    }

    let mut segments = vec![LogSegment::new(
        "start",
        "Beginning of log",
        &lines[..lines.len().min(EDGE_SEGMENT_LINES)],
    )];

    if let Some(first_error) = anchor {
        let start = first_error.saturating_sub(ERROR_REGION_RADIUS);
        let end = (first_error + ERROR_REGION_RADIUS).min(lines.len());
        segments.push(LogSegment::new(
            "error_region",
            "Region around first error",
            &lines[start..end],
        ));
    }

    if lines.len() > EDGE_SEGMENT_LINES {
        segments.push(LogSegment::new(
            "end",
            "End of log",
            &lines[lines.len() - EDGE_SEGMENT_LINES..],
        ));
    }

    debug!(
        "Segmented {} lines into {} segments with {} error samples",
        lines.len(),
        segments.len(),
        error_samples.len()
    );

    SegmentResult {
        segments,
        error_samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("2024-01-01 INFO step {}", i)).collect()
    }

    #[test]
    fn test_empty_input() {
        let result = segment("");
        assert!(result.segments.is_empty());
        assert!(result.error_samples.is_empty());
    }

    #[test]
    fn test_short_log_without_errors() {
        let result = segment("started\nrunning\nstopped");
        assert_eq!(result.segment_ids(), vec!["start"]);
        assert_eq!(result.segments[0].sample_lines.len(), 3);
        assert!(result.error_samples.is_empty());
    }

    #[test]
    fn test_long_log_without_errors() {
        let result = segment(&numbered(31).join("\n"));
        assert_eq!(result.segment_ids(), vec!["start", "end"]);
        assert_eq!(result.segments[1].sample_lines[0], "2024-01-01 INFO step 1");
    }

    #[test]
    fn test_exactly_thirty_lines_has_no_end() {
        let mut lines = numbered(30);
        lines[5] = "Job FAILED".to_string();
        let result = segment(&lines.join("\n"));
        assert_eq!(result.segment_ids(), vec!["start", "error_region"]);
    }

    #[test]
    fn test_long_log_with_error_has_three_segments() {
        let mut lines = numbered(100);
        lines[50] = "java.lang.NullPointerException at Foo.bar".to_string();
        let result = segment(&lines.join("\n"));

        assert_eq!(result.segment_ids(), vec!["start", "error_region", "end"]);
        let region = &result.segments[1].sample_lines;
        assert_eq!(region.len(), 30);
        assert_eq!(region[0], lines[35]);
        assert_eq!(region[15], lines[50]);
        assert_eq!(result.segments[2].sample_lines.len(), 30);
        assert_eq!(result.segments[2].sample_lines[29], lines[99]);
    }

    #[test]
    fn test_error_region_clipped_at_start() {
        let mut lines = numbered(40);
        lines[2] = "ERROR boom".to_string();
        let result = segment(&lines.join("\n"));
        let region = &result.segments[1].sample_lines;
        assert_eq!(region.len(), 17);
        assert_eq!(region[0], lines[0]);
    }

    #[test]
    fn test_error_region_clipped_at_end() {
        let mut lines = numbered(40);
        lines[38] = "ERROR boom".to_string();
        let result = segment(&lines.join("\n"));
        let region = &result.segments[1].sample_lines;
        assert_eq!(region.len(), 17);
        assert_eq!(region.last(), Some(&lines[39]));
    }

    #[test]
    fn test_error_samples_dedup_and_cap() {
        let mut lines = vec!["ERROR same".to_string(); 5];
        lines.extend((0..20).map(|i| format!("request {} failed", i)));
        let result = segment(&lines.join("\n"));

        assert_eq!(result.error_samples.len(), MAX_ERROR_SAMPLES);
        assert_eq!(result.error_samples[0], "ERROR same");
        assert_eq!(result.error_samples[1], "request 0 failed");
        let unique: HashSet<_> = result.error_samples.iter().collect();
        assert_eq!(unique.len(), result.error_samples.len());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let result = segment("an Error\nan EXCEPTION\nFailed to bind\nfine");
        assert_eq!(
            result.error_samples,
            vec!["an Error", "an EXCEPTION", "Failed to bind"]
        );
    }
}
