//! Trait and types for interacting with a remote music catalog.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// One page of a paginated collection response.
///
/// `total` is the authoritative size of the whole collection as of this
/// response. Callers keep requesting pages until they have accumulated that
/// many items; the total must be re-read from every response since the
/// remote collection is only cooperatively stable.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: usize,
}

/// Numeric audio features for a single track, keyed by feature name.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub track_id: String,
    pub features: HashMap<String, f64>,
}

impl FeatureVector {
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.features.get(feature).copied()
    }
}

/// Constraints for a recommendation lookup: seed genres plus a closed
/// (min, max) bound per feature.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationQuery {
    pub seed_genres: Vec<String>,
    pub bounds: HashMap<String, (f64, f64)>,
}

/// Abstraction over the remote music catalog (e.g. the Spotify Web API).
///
/// Transport, auth and rate-limit failures surface as errors from these
/// methods; nothing here retries internally.
#[async_trait::async_trait]
pub trait MusicApi {
    /// Returns one page of a playlist's items starting at `offset`. `owner`
    /// scopes the playlist to a user where the catalog requires it.
    async fn fetch_page(
        &self,
        owner: Option<&str>,
        playlist_id: &str,
        offset: usize,
    ) -> Result<Page>;

    /// Returns feature vectors for the given track ids. The remote endpoint
    /// accepts at most 100 ids per call; ids it does not recognize are
    /// simply missing from the result.
    async fn fetch_features(&self, ids: &[String]) -> Result<Vec<FeatureVector>>;

    /// Returns full artist objects for the given artist ids, at most 50 per
    /// call.
    async fn fetch_artists(&self, ids: &[String]) -> Result<Vec<Value>>;

    /// Returns the set of genre tags the catalog accepts as recommendation
    /// seeds.
    async fn fetch_allowed_genres(&self) -> Result<HashSet<String>>;

    /// Runs a recommendation query and returns the recommended tracks.
    async fn query_recommendations(&self, query: &RecommendationQuery) -> Result<Vec<Value>>;
}
