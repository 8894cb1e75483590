// LogPilot Library - Core log incident triage functionality
//
// Classifies a raw log, segments it, asks a generative-text provider for a
// root cause and fixes, and remembers past incidents for similarity lookup.
// Used by the CLI binary and any other caller that can supply log text.

pub mod ai_provider;
pub mod classifier;
pub mod config;
pub mod data_path;
pub mod fix_recommender;
pub mod input;
pub mod memory;
pub mod output;
pub mod pipeline;
pub mod reply;
pub mod root_cause;
pub mod search;
pub mod segmenter;

pub use ai_provider::{
    create_provider, create_provider_with_settings, AIError, AIProvider, ClaudeProvider, GeminiProvider,
    OpenAIProvider, SUPPORTED_PROVIDERS,
};
pub use classifier::{classify, parse_log_type_reply, LogTypeResult};
pub use config::{Config, ProviderSettings};
pub use fix_recommender::{parse_fix_reply, recommend, FixResult};
pub use input::{decode_log_bytes, read_log_file};
pub use memory::{best_match, Incident, IncidentStore, MIN_WORD_OVERLAP};
pub use output::{render_matches, render_report, OutputFormat};
pub use pipeline::{AnalysisReport, LogPilot, TriageOutcome};
pub use root_cause::{analyze as analyze_root_cause, parse_root_cause_reply, RootCauseResult};
pub use search::{search_any, search_log, LogMatch, DEFAULT_CONTEXT_LINES};
pub use segmenter::{segment, LogSegment, SegmentResult};

use tracing::info;

/// Build the provider named by `provider_name` (or the configured default),
/// resolving its key from `api_key`, the environment, or the config file.
///
/// A missing key is reported here as `AIError::MissingApiKey`, before any
/// request is attempted.
pub fn provider_from_config(
    config: &Config,
    provider_name: Option<&str>,
    api_key: Option<&str>,
    model: Option<&str>,
) -> Result<Box<dyn AIProvider>, AIError> {
    let provider_name = provider_name
        .map(str::to_string)
        .unwrap_or_else(|| config.get_default_provider());

    let api_key = match api_key {
        Some(key) => key.to_string(),
        None => config.require_api_key(&provider_name)?,
    };

    let mut settings = config
        .get_provider_settings(&provider_name)
        .cloned()
        .unwrap_or_default();
    if let Some(model) = model {
        settings.model = Some(model.to_string());
    }

    info!("Using provider {} (model override: {:?})", provider_name, model);
    create_provider_with_settings(&provider_name, &api_key, Some(&settings))
}
