//! Artist and playlist lookups against the Spotify Web API.
//!
//! Uses the client-credentials flow: no user account is involved, so only
//! public catalog data (artist top tracks, public playlists) is reachable.

use async_trait::async_trait;
use hatbox_core::catalog::{ARTIST_TRACK_LIMIT, CatalogSearch};
use hatbox_core::error::CatalogError;
use hatbox_core::resolver::TrackQuery;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Tokens are refreshed this long before they actually expire.
const TOKEN_MARGIN: Duration = Duration::from_secs(60);
const PLAYLIST_PAGE_LIMIT: &str = "100";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: SecretString,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    artists: Option<Page<Artist>>,
    // Spotify returns null entries for playlists it cannot show.
    playlists: Option<Page<Option<Playlist>>>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Playlist {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TopTracks {
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<Track>,
}

/// "<artist> <title>" for each of the artist's top tracks.
fn artist_queries(artist: &Artist, tracks: Vec<Track>) -> Vec<TrackQuery> {
    tracks
        .into_iter()
        .take(ARTIST_TRACK_LIMIT)
        .map(|track| format!("{} {}", artist.name, track.name))
        .collect()
}

/// "<title> <artist>" for each playable playlist entry, in playlist order.
fn playlist_queries(items: Vec<PlaylistItem>) -> Vec<TrackQuery> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .map(|track| match track.artists.first() {
            Some(artist) => format!("{} {}", track.name, artist.name),
            None => track.name,
        })
        .collect()
}

/// Field filter so an exact artist name ranks first.
fn artist_search(name: &str) -> String {
    format!("artist:{name}")
}

fn unavailable(e: reqwest::Error) -> CatalogError {
    CatalogError::Unavailable(e.to_string())
}

pub struct SpotifyCatalog {
    http: Client,
    client_id: String,
    client_secret: SecretString,
    market: String,
    token_url: String,
    api_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyCatalog {
    pub fn new(client_id: &str, client_secret: SecretString, market: &str) -> Self {
        Self {
            http: Client::new(),
            client_id: client_id.to_string(),
            client_secret,
            market: market.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Points the client at different endpoints, e.g. a local stand-in.
    pub fn with_endpoints(mut self, token_url: &str, api_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// A valid bearer token, fetching a new one when the cached one is about
    /// to expire.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_MARGIN {
                return Ok(token.value.expose_secret().to_string());
            }
        }

        tracing::debug!("requesting catalog access token");
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(unavailable)?;
        if !response.status().is_success() {
            return Err(CatalogError::Unavailable(format!(
                "token request returned {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await.map_err(unavailable)?;
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: SecretString::from(token.access_token),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(unavailable)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
            status if !status.is_success() => Err(CatalogError::Unavailable(format!(
                "{path} returned {status}"
            ))),
            _ => response.json::<T>().await.map_err(unavailable),
        }
    }

    async fn search(&self, query: &str, kind: &str) -> Result<SearchResponse, CatalogError> {
        self.get_json("/search", &[("q", query), ("type", kind), ("limit", "1")])
            .await
    }
}

#[async_trait]
impl CatalogSearch for SpotifyCatalog {
    async fn search_by_artist(&self, name: &str) -> Result<Vec<TrackQuery>, CatalogError> {
        let artist = self
            .search(&artist_search(name), "artist")
            .await?
            .artists
            .and_then(|page| page.items.into_iter().next())
            .ok_or(CatalogError::NotFound)?;
        tracing::info!(query = name, artist = %artist.name, "artist found");

        let top: TopTracks = self
            .get_json(
                &format!("/artists/{}/top-tracks", artist.id),
                &[("market", self.market.as_str())],
            )
            .await?;
        Ok(artist_queries(&artist, top.tracks))
    }

    async fn search_by_playlist(&self, name: &str) -> Result<Vec<TrackQuery>, CatalogError> {
        let playlist = self
            .search(name, "playlist")
            .await?
            .playlists
            .and_then(|page| page.items.into_iter().flatten().next())
            .ok_or(CatalogError::NotFound)?;
        tracing::info!(query = name, playlist = %playlist.name, "playlist found");

        let items: Page<PlaylistItem> = self
            .get_json(
                &format!("/playlists/{}/tracks", playlist.id),
                &[("limit", PLAYLIST_PAGE_LIMIT)],
            )
            .await?;
        Ok(playlist_queries(items.items))
    }
}
