use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{CollectionId, MemberId, MemberRecord};
use crate::error::MaplistError;

pub const DEFAULT_API_BASE: &str = "https://api.steampowered.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const COLLECTION_PATH: &str = "ISteamRemoteStorage/GetCollectionDetails/v1/";
const DETAILS_PATH: &str = "ISteamRemoteStorage/GetPublishedFileDetails/v1/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub collection_url: String,
    pub details_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn with_api_base(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        Self {
            collection_url: format!("{base}/{COLLECTION_PATH}"),
            details_url: format!("{base}/{DETAILS_PATH}"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

/// The two remote lookups the pipeline needs. One call is one HTTP request.
pub trait WorkshopClient: Send + Sync {
    fn collection_children(&self, id: &CollectionId) -> Result<Vec<MemberId>, MaplistError>;
    fn published_file_details(&self, ids: &[MemberId])
    -> Result<Vec<MemberRecord>, MaplistError>;
}

impl<T: WorkshopClient + ?Sized> WorkshopClient for &T {
    fn collection_children(&self, id: &CollectionId) -> Result<Vec<MemberId>, MaplistError> {
        (**self).collection_children(id)
    }

    fn published_file_details(
        &self,
        ids: &[MemberId],
    ) -> Result<Vec<MemberRecord>, MaplistError> {
        (**self).published_file_details(ids)
    }
}

#[derive(Clone)]
pub struct WorkshopHttpClient {
    client: Client,
    config: ClientConfig,
}

impl WorkshopHttpClient {
    pub fn new() -> Result<Self, MaplistError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, MaplistError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("maplist-generator/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MaplistError::SteamHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| MaplistError::SteamHttp(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String, MaplistError> {
        debug!(url, fields = form.len(), "posting Steam form");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|err| MaplistError::SteamHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| MaplistError::SteamHttp(err.to_string()))
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, MaplistError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .ok()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "Steam request failed".to_string());
        Err(MaplistError::SteamStatus { status, message })
    }
}

impl WorkshopClient for WorkshopHttpClient {
    fn collection_children(&self, id: &CollectionId) -> Result<Vec<MemberId>, MaplistError> {
        let body = self.post_form(&self.config.collection_url, &collection_form(id))?;
        parse_collection_children(&body)
    }

    fn published_file_details(
        &self,
        ids: &[MemberId],
    ) -> Result<Vec<MemberRecord>, MaplistError> {
        let body = self.post_form(&self.config.details_url, &details_form(ids))?;
        parse_published_file_details(&body)
    }
}

pub fn collection_form(id: &CollectionId) -> Vec<(String, String)> {
    vec![
        ("collectioncount".to_string(), "1".to_string()),
        ("publishedfileids[0]".to_string(), id.as_str().to_string()),
    ]
}

pub fn details_form(ids: &[MemberId]) -> Vec<(String, String)> {
    let mut form = Vec::with_capacity(ids.len() + 1);
    form.push(("itemcount".to_string(), ids.len().to_string()));
    for (index, id) in ids.iter().enumerate() {
        form.push((format!("publishedfileids[{index}]"), id.as_str().to_string()));
    }
    form
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CollectionDetailsResponse {
    #[serde(default)]
    collectiondetails: Option<Vec<CollectionDetails>>,
}

#[derive(Debug, Deserialize)]
struct CollectionDetails {
    #[serde(default)]
    result: Option<i64>,
    #[serde(default)]
    children: Option<Vec<CollectionChild>>,
}

#[derive(Debug, Deserialize)]
struct CollectionChild {
    publishedfileid: MemberId,
}

#[derive(Debug, Deserialize)]
struct PublishedFileDetailsResponse {
    #[serde(default)]
    publishedfiledetails: Option<Vec<MemberRecord>>,
}

/// Extracts `response.collectiondetails[0].children[*].publishedfileid`,
/// keeping the order Steam returned.
pub fn parse_collection_children(body: &str) -> Result<Vec<MemberId>, MaplistError> {
    let envelope: Envelope<CollectionDetailsResponse> = serde_json::from_str(body)
        .map_err(|err| MaplistError::MalformedResponse(format!("collection details: {err}")))?;
    let details = envelope
        .response
        .and_then(|response| response.collectiondetails)
        .and_then(|entries| entries.into_iter().next())
        .ok_or_else(|| {
            MaplistError::MalformedResponse(
                "missing response.collectiondetails[0]".to_string(),
            )
        })?;

    match details.children {
        Some(children) => Ok(children
            .into_iter()
            .map(|child| child.publishedfileid)
            .collect()),
        None => {
            let message = match details.result {
                Some(code) => format!("collection has no children (Steam result {code})"),
                None => "missing response.collectiondetails[0].children".to_string(),
            };
            Err(MaplistError::MalformedResponse(message))
        }
    }
}

/// Extracts `response.publishedfiledetails`. Entries without a title (unknown
/// or withdrawn items) are kept; filtering happens when building the manifest.
pub fn parse_published_file_details(body: &str) -> Result<Vec<MemberRecord>, MaplistError> {
    let envelope: Envelope<PublishedFileDetailsResponse> = serde_json::from_str(body)
        .map_err(|err| MaplistError::MalformedResponse(format!("file details: {err}")))?;
    envelope
        .response
        .and_then(|response| response.publishedfiledetails)
        .ok_or_else(|| {
            MaplistError::MalformedResponse("missing response.publishedfiledetails".to_string())
        })
}
