use anyhow::Result;
use std::fmt::Write;

use crate::pipeline::TriageOutcome;
use crate::search::LogMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(OutputFormat::Console),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub fn render_report(outcome: &TriageOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(render_console(outcome)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

/// Render search hits: numbered context lines with the match marked by `>`.
pub fn render_matches(matches: &[LogMatch], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(matches)?);
    }
    if matches.is_empty() {
        return Ok("No matching lines.\n".to_string());
    }

    let mut out = String::new();
    for m in matches {
        let first = m.line_number - m.context_before.len();
        for (i, line) in m.context_before.iter().enumerate() {
            let _ = writeln!(out, "  {:>6}  {}", first + i, line);
        }
        let _ = writeln!(out, "> {:>6}  {}", m.line_number, m.line);
        for (i, line) in m.context_after.iter().enumerate() {
            let _ = writeln!(out, "  {:>6}  {}", m.line_number + 1 + i, line);
        }
        let _ = writeln!(out, "--");
    }
    Ok(out)
}

// writeln! into a String cannot fail, hence the ignored results.
fn render_console(outcome: &TriageOutcome) -> String {
    let report = &outcome.report;
    let lt = &report.log_type_result;
    let seg = &report.segment_result;
    let rc = &report.root_cause_result;
    let fix = &report.fix_result;
    let mut out = String::new();

    let _ = writeln!(out, "[1] Log type detected: {}", lt.log_type);
    if let Some(severities) = &lt.severity_summary {
        let tally: Vec<String> = severities.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let _ = writeln!(out, "    Severities: {}", tally.join(", "));
    }

    let _ = writeln!(out, "\n[2] Segments found: {}", seg.segment_ids().join(", "));
    let _ = writeln!(out, "    Error samples: {} lines", seg.error_samples.len());
    for sample in &seg.error_samples {
        let _ = writeln!(out, "    | {}", sample);
    }

    let _ = writeln!(out, "\n[3] Primary root cause: {}", rc.primary_root_cause);
    if !rc.symptoms.is_empty() {
        let _ = writeln!(out, "    Symptoms:");
        for symptom in &rc.symptoms {
            let _ = writeln!(out, "    - {}", symptom);
        }
    }
    match rc.confidence {
        Some(confidence) => {
            let _ = writeln!(out, "    Confidence: {}", confidence);
        }
        None => {
            let _ = writeln!(out, "    Confidence: N/A");
        }
    }

    let _ = writeln!(out, "\n[4] Suggested quick fixes:");
    write_list(&mut out, &fix.quick_fixes, "No quick fixes parsed.");

    let _ = writeln!(out, "\n[5] Suggested long-term prevention:");
    write_list(&mut out, &fix.long_term_fixes, "No long-term fixes parsed.");

    let _ = writeln!(out, "\n[6] Incident memory:");
    match &outcome.similar_incident {
        Some(similar) => {
            let _ = writeln!(out, "    Similar past incident found.");
            let _ = writeln!(out, "    Past root cause: {}", similar.primary_root_cause);
            let _ = writeln!(out, "    Past quick fix: {}", similar.quick_fix);
            let _ = writeln!(out, "    Past long-term fix: {}", similar.long_term_fix);
        }
        None => {
            let _ = writeln!(out, "    No similar past incident found.");
        }
    }
    if outcome.stored {
        let _ = writeln!(out, "    This incident was stored in memory.");
    }

    out
}

fn write_list(out: &mut String, items: &[String], empty: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "   {}", empty);
    }
    for item in items {
        let _ = writeln!(out, "   - {}", item);
    }
}
