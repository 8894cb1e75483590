// Incident memory: an append-only JSON file of past analyses, searched by
// log type and root-cause word overlap.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data_path::{ensure_parent_dir, memory_path};
use crate::pipeline::AnalysisReport;

/// Shared root-cause words needed before a past incident counts as similar.
pub const MIN_WORD_OVERLAP: usize = 3;

/// A completed analysis, flattened for storage. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Incident {
    pub log_type: String,
    pub primary_root_cause: String,
    pub example_error: String,
    pub quick_fix: String,
    pub long_term_fix: String,
}

impl Incident {
    /// Flatten a report: the first error sample and the first fix of each
    /// kind, or empty strings where the report has none.
    pub fn from_report(report: &AnalysisReport) -> Self {
        let first = |items: &[String]| items.first().cloned().unwrap_or_default();
        Self {
            log_type: report.log_type_result.log_type.clone(),
            primary_root_cause: report.root_cause_result.primary_root_cause.clone(),
            example_error: first(&report.segment_result.error_samples),
            quick_fix: first(&report.fix_result.quick_fixes),
            long_term_fix: first(&report.fix_result.long_term_fixes),
        }
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// The same-type incident sharing the most root-cause words, if it shares at
/// least `MIN_WORD_OVERLAP`. Ties go to the earliest incident.
pub fn best_match<'a>(
    incidents: &'a [Incident],
    log_type: &str,
    primary_root_cause: &str,
) -> Option<&'a Incident> {
    let root_words = word_set(primary_root_cause);
    let log_type = log_type.to_lowercase();

    let mut best: Option<(&Incident, usize)> = None;
    for incident in incidents {
        if incident.log_type.to_lowercase() != log_type {
            continue;
        }
        let overlap = word_set(&incident.primary_root_cause)
            .intersection(&root_words)
            .count();
        if overlap > best.map_or(0, |(_, best_overlap)| best_overlap) {
            best = Some((incident, overlap));
        }
    }

    best.filter(|(_, overlap)| *overlap >= MIN_WORD_OVERLAP)
        .map(|(incident, _)| incident)
}

/// JSON-file incident store.
///
/// `add` holds a lock across its load-modify-store cycle, so concurrent adds
/// through one store never lose records. Separate processes sharing a file
/// are not coordinated.
pub struct IncidentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl IncidentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the configured location; see `data_path::memory_path`.
    pub fn open_default(config: &Config) -> Self {
        Self::new(memory_path(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored incident. A missing, unreadable or malformed file reads
    /// as an empty store.
    pub async fn load_all(&self) -> Vec<Incident> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No incident memory at {}", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read incident memory {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Incident>>(&content) {
            Ok(incidents) => incidents,
            Err(e) => {
                warn!(
                    "Incident memory {} is malformed, treating as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Append an incident and rewrite the whole file.
    pub async fn add(&self, incident: Incident) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut incidents = self.load_all().await;
        incidents.push(incident);
        self.save_all(&incidents).await?;

        info!(
            "Stored incident #{} in {}",
            incidents.len(),
            self.path.display()
        );
        Ok(())
    }

    pub async fn find_similar(&self, log_type: &str, primary_root_cause: &str) -> Option<Incident> {
        let incidents = self.load_all().await;
        let found = best_match(&incidents, log_type, primary_root_cause).cloned();
        debug!(
            "Similarity lookup over {} incidents for {}: {}",
            incidents.len(),
            log_type,
            if found.is_some() { "match" } else { "no match" }
        );
        found
    }

    // Written to a sibling temp file and renamed over the target so readers
    // see either the old or the new collection.
    async fn save_all(&self, incidents: &[Incident]) -> Result<()> {
        ensure_parent_dir(&self.path)
            .await
            .with_context(|| format!("Failed to create directory for {}", self.path.display()))?;

        let json = serde_json::to_string_pretty(incidents)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(e).with_context(|| format!("Failed to replace {}", self.path.display()));
        }
        Ok(())
    }
}
