use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::ai_provider::{AIError, AIProvider};
use crate::classifier::{self, LogTypeResult};
use crate::fix_recommender::{self, FixResult};
use crate::memory::{Incident, IncidentStore};
use crate::root_cause::{self, RootCauseResult};
use crate::segmenter::{self, SegmentResult};

/// Output of the four analysis stages for one log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub log_type_result: LogTypeResult,
    pub segment_result: SegmentResult,
    pub root_cause_result: RootCauseResult,
    pub fix_result: FixResult,
}

/// An analysis plus the closest past incident found before it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub report: AnalysisReport,
    pub similar_incident: Option<Incident>,
    /// Whether the new incident was written to memory
    pub stored: bool,
}

/// Runs classification, segmentation, root-cause inference and fix
/// recommendation against an injected text-generation provider.
pub struct LogPilot {
    provider: Box<dyn AIProvider>,
    store: Option<IncidentStore>,
}

impl LogPilot {
    pub fn new(provider: Box<dyn AIProvider>) -> Self {
        Self {
            provider,
            store: None,
        }
    }

    pub fn with_store(mut self, store: IncidentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run the four stages in order. Any provider failure aborts the analysis.
    pub async fn analyze(&self, log_text: &str) -> Result<AnalysisReport, AIError> {
        info!(
            "Starting analysis of {} log lines with provider: {} ({})",
            log_text.lines().count(),
            self.provider.get_provider_name(),
            self.provider.get_model()
        );

        let provider = self.provider.as_ref();

        let log_type_result = classifier::classify(provider, log_text).await.map_err(|e| {
            error!("Log type classification failed: {}", e);
            e
        })?;

        let segment_result = segmenter::segment(log_text);
        debug!("Segments: {:?}", segment_result.segment_ids());

        let root_cause_result = root_cause::analyze(
            provider,
            &log_type_result.log_type,
            &segment_result.segments,
            &segment_result.error_samples,
        )
        .await
        .map_err(|e| {
            error!("Root cause analysis failed: {}", e);
            e
        })?;

        let fix_result = fix_recommender::recommend(
            provider,
            &log_type_result.log_type,
            &root_cause_result.primary_root_cause,
            &root_cause_result.symptoms,
        )
        .await
        .map_err(|e| {
            error!("Fix recommendation failed: {}", e);
            e
        })?;

        info!("Analysis completed successfully");
        Ok(AnalysisReport {
            log_type_result,
            segment_result,
            root_cause_result,
            fix_result,
        })
    }

    /// Analyze, look up a similar past incident, then record this one.
    ///
    /// The lookup runs before the write so a log never matches itself.
    /// Nothing is stored when analysis fails.
    pub async fn triage(&self, log_text: &str) -> Result<TriageOutcome> {
        let report = self.analyze(log_text).await?;

        let Some(store) = &self.store else {
            debug!("No incident store configured, skipping memory");
            return Ok(TriageOutcome {
                report,
                similar_incident: None,
                stored: false,
            });
        };

        let similar_incident = store
            .find_similar(
                &report.log_type_result.log_type,
                &report.root_cause_result.primary_root_cause,
            )
            .await;
        if similar_incident.is_some() {
            info!("Similar past incident found in memory");
        }

        store.add(Incident::from_report(&report)).await?;

        Ok(TriageOutcome {
            report,
            similar_incident,
            stored: true,
        })
    }
}
