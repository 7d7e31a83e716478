//! Popularity scoring
//!
//! `score = stars * 0.6 + forks * 0.3 + recency * 100 * 0.1`, where
//! `recency = 1 / (1 + days since last update)`.

use crate::types::RepositoryRecord;
use chrono::{DateTime, Utc};
use futures::future::join_all;

const STAR_WEIGHT: f64 = 0.6;
const FORK_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.1;
const RECENCY_SCALE: f64 = 100.0;

/// Score one record relative to `now`
///
/// Never fails. An absent `updated_at` counts as updated today, a future
/// `updated_at` is clamped to zero days, and a non-finite result scores 0.
pub fn score(record: &RepositoryRecord, now: DateTime<Utc>) -> RepositoryRecord {
    let popularity_score = compute(record, now).unwrap_or_else(|| {
        tracing::warn!(id = record.id, name = %record.name, "Score computation failed, using 0");
        0.0
    });

    RepositoryRecord {
        popularity_score,
        ..record.clone()
    }
}

fn compute(record: &RepositoryRecord, now: DateTime<Utc>) -> Option<f64> {
    let days = record
        .updated_at
        .map(|updated| (now - updated).num_days().max(0))
        .unwrap_or(0);

    let recency = 1.0 / (1.0 + days as f64);
    let value = record.star_count as f64 * STAR_WEIGHT
        + record.fork_count as f64 * FORK_WEIGHT
        + recency * RECENCY_SCALE * RECENCY_WEIGHT;

    value.is_finite().then_some(value)
}

/// Score every record concurrently on the tokio scheduler
///
/// Output order equals input order regardless of completion order. A task
/// that fails to complete leaves its record with a score of 0.
pub async fn score_all(records: Vec<RepositoryRecord>, now: DateTime<Utc>) -> Vec<RepositoryRecord> {
    let handles: Vec<_> = records
        .iter()
        .cloned()
        .map(|record| tokio::spawn(async move { score(&record, now) }))
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .zip(records)
        .map(|(joined, original)| match joined {
            Ok(scored) => scored,
            Err(e) => {
                tracing::error!(error = %e, id = original.id, "Scoring task failed");
                RepositoryRecord {
                    popularity_score: 0.0,
                    ..original
                }
            }
        })
        .collect()
}
