//! Batch ingestion: raw observations through normalization, embedding and
//! aggregation into the store.
//!
//! Per-item problems (missing attributes, PHI, a failed remote embedding)
//! are tallied and skipped so one bad observation never aborts a batch;
//! store failures abort, since they threaten consistency.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use termx_core::{is_phi, normalize, Level, RawObservation, Result};
use termx_embed::EmbeddingProvider;
use termx_storage::TermStore;

/// Tallies for one ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Terms normalized, embedded and upserted.
    pub accepted: u64,
    /// Attribute values dropped by the PHI filter.
    pub phi_rejected: u64,
    /// Observations with no usable text for their level, plus malformed
    /// JSON items when loading from a file.
    pub skipped: u64,
    /// Terms dropped because the embedding provider failed for them.
    pub provider_failures: u64,
}

/// Ingest a batch of raw observations.
///
/// Already-committed upserts stay committed regardless of later per-item
/// failures; there is no global rollback.
pub fn ingest(
    store: &TermStore,
    provider: &dyn EmbeddingProvider,
    observations: &[RawObservation],
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for raw in observations {
        let values = level_values(raw);
        if values.is_empty() {
            report.skipped += 1;
            continue;
        }
        report.phi_rejected += values.iter().filter(|value| is_phi(value)).count() as u64;

        for term in normalize(raw) {
            let embedding = match provider.embed_batch(std::slice::from_ref(&term.text)) {
                Ok(mut vectors) if !vectors.is_empty() => vectors.remove(0),
                Ok(_) => {
                    warn!(text = %term.text, "provider returned no vector");
                    report.provider_failures += 1;
                    continue;
                }
                Err(err) => {
                    warn!(text = %term.text, error = %err, "embedding failed, term skipped");
                    report.provider_failures += 1;
                    continue;
                }
            };
            store.upsert(&term, &embedding)?;
            report.accepted += 1;
        }
    }

    info!(
        accepted = report.accepted,
        phi_rejected = report.phi_rejected,
        skipped = report.skipped,
        provider_failures = report.provider_failures,
        "ingestion batch finished"
    );
    Ok(report)
}

/// Ingest raw observations from a JSON file (an array of attribute
/// dictionaries). Items that do not parse are tallied as skipped.
pub fn ingest_json(
    store: &TermStore,
    provider: &dyn EmbeddingProvider,
    path: impl AsRef<Path>,
) -> Result<IngestReport> {
    let (observations, malformed) = load_observations(path)?;
    let mut report = ingest(store, provider, &observations)?;
    report.skipped += malformed;
    Ok(report)
}

/// Parse a JSON array of raw observations, item by item.
///
/// Returns the parsed observations and the number of malformed items.
pub fn load_observations(path: impl AsRef<Path>) -> Result<(Vec<RawObservation>, u64)> {
    let text = std::fs::read_to_string(path)?;
    let items: Vec<serde_json::Value> = serde_json::from_str(&text)
        .map_err(|e| termx_core::Error::InvalidInput(format!("not a JSON array: {e}")))?;

    let mut observations = Vec::with_capacity(items.len());
    let mut malformed = 0u64;
    for item in items {
        match serde_json::from_value::<RawObservation>(item) {
            Ok(raw) => observations.push(raw),
            Err(err) => {
                warn!(error = %err, "malformed observation skipped");
                malformed += 1;
            }
        }
    }
    Ok((observations, malformed))
}

/// Trimmed, non-empty raw text values for the observation's level.
fn level_values(raw: &RawObservation) -> Vec<&str> {
    let fields: &[&Option<String>] = match raw.level {
        Level::Study => &[&raw.study_description],
        Level::Series => &[
            &raw.series_description,
            &raw.body_part_examined,
            &raw.protocol_name,
        ],
    };
    fields
        .iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect()
}
