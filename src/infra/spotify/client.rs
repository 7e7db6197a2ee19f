use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::fetch::{ApiKey, BasicClient, fetch_json, get};
use crate::services::music_api::{FeatureVector, MusicApi, Page, RecommendationQuery};

const ACCOUNTS_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Spotify Web API client authenticated through the client-credentials flow.
pub struct SpotifyClient {
    base_url: String,
    http: ApiKey<BasicClient>,
}

impl SpotifyClient {
    /// Exchanges application credentials for an access token and returns a
    /// ready client.
    pub async fn new(client_id: &str, client_secret: &str) -> Result<Self> {
        let access_token = Self::exchange_credentials(client_id, client_secret).await?;

        Ok(Self {
            base_url: "https://api.spotify.com/v1".to_string(),
            http: ApiKey::bearer(BasicClient::new(), &access_token)?,
        })
    }

    async fn exchange_credentials(client_id: &str, client_secret: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = client
            .post(ACCOUNTS_TOKEN_URL)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send token request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Token exchange failed with status {}: {}",
                status,
                body
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse token response: {}", e))?;

        Ok(token.access_token)
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        fetch_json(&self.http, get(url)?).await
    }
}

#[async_trait]
impl MusicApi for SpotifyClient {
    async fn fetch_page(
        &self,
        owner: Option<&str>,
        playlist_id: &str,
        offset: usize,
    ) -> Result<Page> {
        let url = match owner {
            Some(owner) => format!(
                "{}/users/{}/playlists/{}/tracks?offset={}&limit=100",
                self.base_url, owner, playlist_id, offset
            ),
            None => format!(
                "{}/playlists/{}/tracks?offset={}&limit=100",
                self.base_url, playlist_id, offset
            ),
        };

        let json = self.get_json(&url).await?;
        let total = json["total"].as_u64().unwrap_or(0) as usize;
        let items = json["items"].as_array().cloned().unwrap_or_default();

        Ok(Page { items, total })
    }

    async fn fetch_features(&self, ids: &[String]) -> Result<Vec<FeatureVector>> {
        let url = format!("{}/audio-features?ids={}", self.base_url, ids.join(","));
        let json = self.get_json(&url).await?;

        // Unresolvable ids come back as null entries; only the numeric
        // fields of each object form the feature vector.
        let vectors = json["audio_features"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                let id = entry.get("id")?.as_str()?.to_string();
                let features = entry
                    .as_object()?
                    .iter()
                    .filter_map(|(name, value)| Some((name.clone(), value.as_f64()?)))
                    .collect();
                Some(FeatureVector {
                    track_id: id,
                    features,
                })
            })
            .collect();

        Ok(vectors)
    }

    async fn fetch_artists(&self, ids: &[String]) -> Result<Vec<Value>> {
        let url = format!("{}/artists?ids={}", self.base_url, ids.join(","));
        let json = self.get_json(&url).await?;

        Ok(json["artists"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|artist| !artist.is_null())
            .collect())
    }

    async fn fetch_allowed_genres(&self) -> Result<HashSet<String>> {
        let url = format!("{}/recommendations/available-genre-seeds", self.base_url);
        let json = self.get_json(&url).await?;

        Ok(json["genres"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    async fn query_recommendations(&self, query: &RecommendationQuery) -> Result<Vec<Value>> {
        let mut params = vec![format!("seed_genres={}", query.seed_genres.join(","))];

        let mut bounds: Vec<_> = query.bounds.iter().collect();
        bounds.sort_by(|a, b| a.0.cmp(b.0)); // deterministic URL
        for (feature, (min, max)) in bounds {
            params.push(format!("min_{feature}={min}"));
            params.push(format!("max_{feature}={max}"));
        }

        let url = format!("{}/recommendations?{}", self.base_url, params.join("&"));
        let json = self.get_json(&url).await?;

        Ok(json["tracks"].as_array().cloned().unwrap_or_default())
    }
}
