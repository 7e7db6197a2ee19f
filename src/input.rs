//! The playlists input file: CSV rows of `category,link`.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PlaylistRow {
    category: String,
    link: String,
}

/// Playlist ids per category, categories kept in file order.
#[derive(Debug, Default)]
pub struct PlaylistSet {
    categories: Vec<(String, HashSet<String>)>,
}

impl PlaylistSet {
    /// Reads a `category,link` CSV file. The playlist id is the last path
    /// segment of the link.
    pub fn load(path: &str) -> Result<Self> {
        let rdr = csv::Reader::from_path(path)
            .with_context(|| format!("reading playlist file {path}"))?;
        Self::from_reader(rdr)
    }

    fn from_reader<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let mut set = PlaylistSet::default();
        for row in rdr.deserialize() {
            let row: PlaylistRow = row?;
            let id = row.link.rsplit('/').next().unwrap_or(&row.link).to_string();
            set.entry(&row.category).insert(id);
        }
        Ok(set)
    }

    fn entry(&mut self, category: &str) -> &mut HashSet<String> {
        if let Some(idx) = self.categories.iter().position(|(name, _)| name == category) {
            &mut self.categories[idx].1
        } else {
            self.categories.push((category.to_string(), HashSet::new()));
            &mut self.categories.last_mut().expect("just pushed").1
        }
    }

    pub fn get(&self, category: &str) -> Option<&HashSet<String>> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, ids)| ids)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<String>)> {
        self.categories.iter().map(|(name, ids)| (name.as_str(), ids))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> PlaylistSet {
        PlaylistSet::from_reader(csv::Reader::from_reader(data.as_bytes())).unwrap()
    }

    #[test]
    fn groups_playlist_ids_by_category() {
        let set = parse(
            "category,link\n\
             happy,https://open.spotify.com/playlist/abc\n\
             happy,https://open.spotify.com/playlist/def\n\
             running,https://open.spotify.com/playlist/ghi\n",
        );

        assert_eq!(set.get("happy").unwrap().len(), 2);
        assert!(set.get("happy").unwrap().contains("abc"));
        assert_eq!(set.get("running").unwrap().len(), 1);
        assert!(set.get("studying").is_none());
    }

    #[test]
    fn duplicate_links_collapse_per_category() {
        let set = parse(
            "category,link\n\
             happy,https://open.spotify.com/playlist/abc\n\
             happy,https://open.spotify.com/playlist/abc\n",
        );
        assert_eq!(set.get("happy").unwrap().len(), 1);
    }

    #[test]
    fn categories_iterate_in_file_order() {
        let set = parse(
            "category,link\n\
             studying,https://x/p/1\n\
             happy,https://x/p/2\n\
             studying,https://x/p/3\n",
        );
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["studying", "happy"]);
    }

    #[test]
    fn bare_id_links_pass_through() {
        let set = parse("category,link\nhappy,abc123\n");
        assert!(set.get("happy").unwrap().contains("abc123"));
    }
}
