//! Batched enrichment lookups bounded by the remote API's maximum request
//! sizes.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::services::music_api::{FeatureVector, MusicApi};

/// Maximum track ids per audio-features request.
pub const FEATURE_BATCH_SIZE: usize = 100;
/// Maximum artist ids per artists request.
pub const ARTIST_BATCH_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// A batched lookup was invoked with zero identifiers. A signal rather
    /// than a failure: the caller may skip the lookup entirely.
    #[error("no identifiers to look up")]
    EmptyInput,
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// Fetches feature vectors for `ids` in consecutive batches of at most
/// [`FEATURE_BATCH_SIZE`], merging per-batch results into one map keyed by
/// track id.
///
/// Every id the remote source recognizes appears exactly once in the result;
/// unrecognized ids are silently absent.
pub async fn fetch_features_chunked<C: MusicApi>(
    api: &C,
    ids: &[String],
) -> Result<HashMap<String, FeatureVector>, EnrichError> {
    if ids.is_empty() {
        return Err(EnrichError::EmptyInput);
    }

    let mut merged = HashMap::new();
    for chunk in ids.chunks(FEATURE_BATCH_SIZE) {
        debug!(len = chunk.len(), "fetching feature batch");
        for vector in api.fetch_features(chunk).await? {
            merged.insert(vector.track_id.clone(), vector);
        }
    }
    Ok(merged)
}

/// Fetches artist objects in batches of at most [`ARTIST_BATCH_SIZE`], keyed
/// by artist id. Same merge and absence semantics as the feature lookup.
pub async fn fetch_artists_chunked<C: MusicApi>(
    api: &C,
    ids: &[String],
) -> Result<HashMap<String, Value>, EnrichError> {
    if ids.is_empty() {
        return Err(EnrichError::EmptyInput);
    }

    let mut merged = HashMap::new();
    for chunk in ids.chunks(ARTIST_BATCH_SIZE) {
        debug!(len = chunk.len(), "fetching artist batch");
        for artist in api.fetch_artists(chunk).await? {
            let Some(id) = artist.get("id").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            merged.insert(id, artist);
        }
    }
    Ok(merged)
}
