//! Genre frequency ranking across a track population.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::collect::Track;

/// Default number of seed genres passed to the recommendation query.
pub const DEFAULT_SEED_COUNT: usize = 5;

/// Collects the distinct artist ids referenced by a track population, in
/// first-reference order.
pub fn referenced_artist_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for track in tracks {
        for id in track.artist_ids() {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Counts every genre tag carried by the given artist objects.
///
/// The returned pairs are in first-seen order, which later serves as the
/// tie-break when ranking: counting order decides, not the alphabet.
pub fn count_genres<'a>(artists: impl IntoIterator<Item = &'a Value>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for artist in artists {
        let Some(genres) = artist.get("genres").and_then(Value::as_array) else {
            continue;
        };
        for genre in genres.iter().filter_map(Value::as_str) {
            let entry = counts.entry(genre.to_string()).or_insert(0);
            if *entry == 0 {
                order.push(genre.to_string());
            }
            *entry += 1;
        }
    }

    order
        .into_iter()
        .map(|genre| {
            let count = counts[&genre];
            (genre, count)
        })
        .collect()
}

/// Ranks counted tags descending by count and returns the first `k` that
/// appear in the whitelist, stopping once `k` valid tags are collected.
/// The sort is stable, so equal counts keep their first-seen order.
pub fn top_genres(
    counts: Vec<(String, usize)>,
    allowed: &HashSet<String>,
    k: usize,
) -> Vec<String> {
    let mut ranked = counts;
    ranked.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    ranked
        .into_iter()
        .filter(|(genre, _)| allowed.contains(genre))
        .map(|(genre, _)| genre)
        .take(k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artist(genres: &[&str]) -> Value {
        json!({"id": "a", "genres": genres})
    }

    #[test]
    fn counting_preserves_first_seen_order() {
        let artists = vec![
            artist(&["pop", "rock"]),
            artist(&["pop", "jazz"]),
            artist(&["rock", "pop"]),
        ];
        let counts = count_genres(&artists);
        assert_eq!(
            counts,
            vec![
                ("pop".to_string(), 3),
                ("rock".to_string(), 2),
                ("jazz".to_string(), 1)
            ]
        );
    }

    #[test]
    fn ties_break_by_first_seen_not_alphabet() {
        // "pop" and "rock" tie at 5; "pop" was counted first and must stay
        // ahead even though "rock" sorts later alphabetically too; swap the
        // names and the property still holds.
        let counts = vec![
            ("pop".to_string(), 5),
            ("rock".to_string(), 5),
            ("jazz".to_string(), 3),
        ];
        let allowed: HashSet<String> =
            ["pop", "jazz", "rock"].iter().map(|s| s.to_string()).collect();

        assert_eq!(top_genres(counts, &allowed, 2), vec!["pop", "rock"]);
    }

    #[test]
    fn whitelist_filters_before_taking_k() {
        let counts = vec![
            ("lofi beats".to_string(), 9),
            ("pop".to_string(), 5),
            ("rock".to_string(), 4),
            ("jazz".to_string(), 3),
        ];
        // "lofi beats" is not a valid seed; top-2 skips it and still returns
        // two valid genres.
        let allowed: HashSet<String> =
            ["pop", "rock", "jazz"].iter().map(|s| s.to_string()).collect();

        assert_eq!(top_genres(counts, &allowed, 2), vec!["pop", "rock"]);
    }

    #[test]
    fn artist_ids_dedup_in_first_reference_order() {
        let tracks = vec![
            Track {
                id: "t1".into(),
                raw: json!({"artists": [{"id": "a2"}, {"id": "a1"}]}),
            },
            Track {
                id: "t2".into(),
                raw: json!({"artists": [{"id": "a1"}, {"id": "a3"}]}),
            },
        ];
        assert_eq!(referenced_artist_ids(&tracks), vec!["a2", "a1", "a3"]);
    }
}
