//! HTTP client for the read-only catalog API

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::catalog::{Catalog, SectionRecord, TrackRecord};

/// Query parameter carrying a track id in share / deep links.
pub const TRACK_QUERY_PARAM: &str = "track";

/// Errors from the catalog API
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error ({status}) on {endpoint}")]
    ServerError { endpoint: String, status: u16 },

    /// Response body could not be decoded
    #[error("Failed to parse {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

/// `GET /api/status`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub track_count: usize,
    #[serde(default)]
    pub last_refresh: Option<String>,
    #[serde(default)]
    pub refresh_interval_minutes: Option<u64>,
}

impl ServerStatus {
    /// When the server last synced its catalog, in local time.
    pub fn last_refresh_at(&self) -> Option<DateTime<Local>> {
        let raw = self.last_refresh.as_deref()?.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Local));
        }
        let naive = raw.parse::<NaiveDateTime>().ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let trimmed = base_url.trim();
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(CatalogError::InvalidUrl(format!(
                "{trimmed} (must start with http:// or https://)"
            )));
        }
        let base_url = Url::parse(trimmed).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("era-player/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches tracks and sections concurrently and builds the catalog.
    ///
    /// Either request failing fails the whole load.
    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let (tracks, sections) = futures::try_join!(
            self.get_json::<Vec<TrackRecord>>(&["api", "tracks"]),
            self.get_json::<Vec<SectionRecord>>(&["api", "sections"]),
        )?;
        tracing::info!(tracks = tracks.len(), sections = sections.len(), "Catalog fetched");
        Ok(Catalog::build(tracks, sections))
    }

    pub async fn fetch_status(&self) -> Result<ServerStatus, CatalogError> {
        self.get_json(&["api", "status"]).await
    }

    pub async fn fetch_audio(&self, track_id: &str) -> Result<Vec<u8>, CatalogError> {
        let url = self.endpoint(&["api", "play", track_id])?;
        tracing::debug!(url = %url, "Fetching audio");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::ServerError {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Artwork bytes, or `None` when the server has none for this track.
    pub async fn fetch_artwork(&self, track_id: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let url = self.endpoint(&["api", "artwork", track_id])?;
        let response = self.http.get(url.clone()).send().await?;
        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                Ok((!bytes.is_empty()).then(|| bytes.to_vec()))
            }
            status => Err(CatalogError::ServerError {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            }),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, CatalogError> {
        let url = self.endpoint(segments)?;
        let endpoint = url.path().to_string();
        tracing::debug!(url = %url, "Catalog request started");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(endpoint = %endpoint, status = status.as_u16(), "Catalog request failed");
            return Err(CatalogError::ServerError {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Parse {
            endpoint,
            message: e.to_string(),
        })
    }
}

/// `{base}/?track={id}`
pub fn share_link(base: &Url, track_id: &str) -> String {
    let mut url = base.clone();
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(TRACK_QUERY_PARAM, track_id);
    url.to_string()
}

/// Track id carried by a deep link: a full URL, a bare `?track=…` query, or
/// the id itself.
pub fn deep_link_track(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let parsed = Url::parse(link).or_else(|_| {
        let query = link.trim_start_matches('?');
        Url::parse(&format!("http://localhost/?{query}"))
    });
    if let Ok(url) = parsed {
        if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == TRACK_QUERY_PARAM) {
            return (!id.is_empty()).then(|| id.into_owned());
        }
    }
    (!link.contains(['?', '=', '/'])).then(|| link.to_string())
}
