use crate::segmenter::LogSegment;

/// Sample lines per segment included in the root-cause prompt.
pub const SEGMENT_PROMPT_LINES: usize = 15;

pub struct PromptTemplates;

impl PromptTemplates {
    pub fn log_type_prompt(log_text: &str) -> String {
        format!(
            r#"
You are a log classification assistant.

Classify the following logs and estimate severity counts.

<logs>
{}
</logs>

Respond in this format exactly:

Log type: <one short phrase, e.g. "Java app", "Airflow", "Kubernetes", "Spark">
Severities:
- INFO: <number or estimate>
- WARN: <number or estimate>
- ERROR: <number or estimate>
Notes: <1 short line>
"#,
            log_text
        )
    }

    pub fn root_cause_prompt(log_type: &str, segments: &[LogSegment], error_samples: &[String]) -> String {
        let segment_snippets: Vec<String> = segments
            .iter()
            .map(|seg| {
                let snippet_len = seg.sample_lines.len().min(SEGMENT_PROMPT_LINES);
                format!(
                    "[Segment {} - {}]\n{}",
                    seg.id,
                    seg.summary,
                    seg.sample_lines[..snippet_len].join("\n")
                )
            })
            .collect();

        format!(
            "You are an expert incident analyst.\n\n\
             Log type: {}\n\n\
             Here are key log segments:\n\
             {}\n\n\
             Here are some representative error lines:\n\
             {}\n\n\
             From this, identify:\n\n\
             1. Primary root cause: <1-3 sentences>\n\
             2. Key symptoms: <bullet list>\n\
             3. Confidence: <number between 0 and 1>\n\n\
             Respond in this format:\n\n\
             Primary root cause: ...\n\
             Symptoms:\n\
             - ...\n\
             - ...\n\
             Confidence: ...\n",
            log_type,
            segment_snippets.join("\n"),
            error_samples.join("\n")
        )
    }

    pub fn fix_prompt(log_type: &str, primary_root_cause: &str, symptoms: &[String]) -> String {
        let symptom_text = if symptoms.is_empty() {
            "None listed.".to_string()
        } else {
            symptoms
                .iter()
                .map(|s| format!("- {}", s))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"
You are an SRE and reliability engineer.

Log type: {}
Primary root cause: {}
Symptoms:
{}

Propose concrete fixes.

IMPORTANT: Follow this EXACT format. Use these exact headings and bullet style.

Quick fixes:
- <short concrete action>
- <short concrete action>

Long-term prevention:
- <short concrete action>
- <short concrete action>
"#,
            log_type, primary_root_cause, symptom_text
        )
    }
}
