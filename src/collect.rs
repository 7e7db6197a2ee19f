//! Playlist collection: offset-based pagination and structural deduplication.

use std::collections::HashSet;

use anyhow::{Result, bail};
use serde_json::Value;
use tracing::debug;

use crate::services::music_api::MusicApi;

/// A single track as returned by the catalog. The raw object is kept whole;
/// the id is pulled out for enrichment keying and may be empty when the
/// catalog returned a track without one.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: String,
    pub raw: Value,
}

impl Track {
    /// Artist ids referenced by this track, in document order.
    pub fn artist_ids(&self) -> Vec<String> {
        self.raw
            .get("artists")
            .and_then(Value::as_array)
            .map(|artists| {
                artists
                    .iter()
                    .filter_map(|a| a.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Fetches every item of one playlist by walking offset pages until the
/// accumulated length reaches the total reported by the latest response.
///
/// The remote collection is assumed stable for the duration of the walk. The
/// total is re-read from every page, so a collection that shrinks mid-run
/// terminates early with fewer items; a page that comes back empty while
/// still below the reported total aborts instead of spinning.
pub async fn fetch_playlist_items<C: MusicApi>(
    api: &C,
    owner: Option<&str>,
    playlist_id: &str,
) -> Result<Vec<Value>> {
    let mut items: Vec<Value> = Vec::new();
    let mut total = 1usize;

    while items.len() < total {
        let page = api.fetch_page(owner, playlist_id, items.len()).await?;
        if page.items.is_empty() && items.len() < page.total {
            bail!(
                "playlist {playlist_id}: empty page at offset {} with total {} reported",
                items.len(),
                page.total
            );
        }
        total = page.total;
        items.extend(page.items);
    }

    debug!(playlist_id, count = items.len(), "playlist fetched");
    Ok(items)
}

/// Fetches and concatenates the items of all playlists belonging to one
/// category.
///
/// Each page item nests the actual track under a `track` key; deleted or
/// local-only entries surface as JSON null and are kept here so the dedup
/// stage can filter them in one place.
pub async fn collect_tracks<C: MusicApi>(
    api: &C,
    playlist_ids: &HashSet<String>,
) -> Result<Vec<Value>> {
    let mut tracks = Vec::new();
    for playlist_id in playlist_ids {
        let items = fetch_playlist_items(api, None, playlist_id).await?;
        tracks.extend(items.into_iter().map(|mut item| {
            item.get_mut("track").map(Value::take).unwrap_or(Value::Null)
        }));
    }
    Ok(tracks)
}

/// Removes structural duplicates from a track list.
///
/// Identity is the canonical JSON serialization of the whole object;
/// serde_json object maps keep keys sorted, so field order never makes two
/// structurally equal tracks distinct. Nulls are filtered before
/// serialization. Output order is unspecified set semantics; callers must
/// not assume it matches fetch order.
pub fn dedup_tracks(raw: Vec<Value>) -> Vec<Track> {
    let mut seen = HashSet::new();
    let mut tracks = Vec::new();

    for value in raw {
        if value.is_null() {
            continue;
        }
        if !seen.insert(value.to_string()) {
            continue;
        }
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        tracks.push(Track { id, raw: value });
    }

    tracks
}

/// Ids usable for enrichment lookups. Tracks without an id are skipped; the
/// catalog could not resolve them anyway.
pub fn track_ids(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .filter(|t| !t.id.is_empty())
        .map(|t| t.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dedup_ignores_field_order() {
        let raw = vec![
            json!({"a": 1, "b": 2}),
            json!({"b": 2, "a": 1}),
            json!({"a": 1, "b": 2}),
        ];
        assert_eq!(dedup_tracks(raw).len(), 1);
    }

    #[test]
    fn dedup_filters_nulls() {
        let raw = vec![Value::Null, json!({"id": "x"}), Value::Null];
        let tracks = dedup_tracks(raw);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "x");
    }

    #[test]
    fn dedup_keeps_distinct_tracks() {
        let raw = vec![json!({"id": "x"}), json!({"id": "y"}), json!({"id": "x"})];
        assert_eq!(dedup_tracks(raw).len(), 2);
    }

    #[test]
    fn dedup_keeps_tracks_without_id() {
        let tracks = dedup_tracks(vec![json!({"name": "untitled"})]);
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].id.is_empty());
        assert!(track_ids(&tracks).is_empty());
    }

    #[test]
    fn artist_ids_walk_nested_references() {
        let track = Track {
            id: "t".into(),
            raw: json!({"artists": [{"id": "a1"}, {"id": "a2"}, {"name": "no id"}]}),
        };
        assert_eq!(track.artist_ids(), vec!["a1", "a2"]);
    }
}
