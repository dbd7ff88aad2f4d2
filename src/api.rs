// API client module: contains a small blocking HTTP client that talks to
// the remote face-recognition service. It is intentionally small and
// synchronous: one request per operation, no retries, no backoff.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Name of the remote face collection every call targets.
pub const COLLECTION_ID: &str = "tedai-hackathon";

/// Minimum similarity (percent, service-defined) for a search match.
pub const FACE_MATCH_THRESHOLD: u32 = 90;

/// Maximum number of matches a search may return.
pub const MAX_FACES: u32 = 2;

/// Detection mode sent when indexing: ask the service for every
/// attribute it can report on the face.
pub const DETECTION_ATTRIBUTES: &str = "ALL";

/// Image bytes as the service expects them on the wire: base64 inside
/// the JSON body.
#[derive(Serialize)]
struct ImagePayload {
    bytes: String,
}

/// Body for the index endpoint. `external_image_id` is the caller's
/// label for the face; the service does not enforce uniqueness.
#[derive(Serialize)]
struct IndexRequest {
    image: ImagePayload,
    external_image_id: String,
    detection_attributes: &'static str,
}

/// Body for the search-by-image endpoint.
#[derive(Serialize)]
struct SearchRequest {
    image: ImagePayload,
    face_match_threshold: u32,
    max_faces: u32,
}

/// Simple API client that holds a reqwest blocking client, the base URL
/// of the face service and an optional API key for authenticated calls.
#[derive(Clone)]
pub struct FaceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FaceClient {
    /// Create a FaceClient configured from the environment variables
    /// `FACE_API_URL` (falls back to `http://localhost:8000`) and
    /// `FACE_API_KEY` (optional; sent as a bearer token when present).
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("FACE_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        let api_key = std::env::var("FACE_API_KEY").ok();
        Self::new(base_url, api_key)
    }

    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FaceClient {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Helper to build the Authorization header map when a key is set.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(k) = &self.api_key {
            let val = format!("Bearer {}", k);
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&val).unwrap());
        }
        headers
    }

    /// Index one face photo into the collection under `photo_id`.
    ///
    /// Reads the file fully into memory, so a missing or unreadable file
    /// fails here before any request is sent. The service response is
    /// opaque to this client; it is printed for the operator and
    /// returned as raw JSON.
    pub fn index_face(&self, photo: &Path, photo_id: &str) -> Result<Value> {
        let url = format!("{}/v1/collections/{}/faces", &self.base_url, COLLECTION_ID);
        println!("{}", photo.display());
        let body = IndexRequest {
            image: read_image(photo)?,
            external_image_id: photo_id.to_string(),
            detection_attributes: DETECTION_ATTRIBUTES,
        };
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .context("Failed to send index request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Index failed for {}: {} - {}", photo.display(), status, txt);
        }
        let response: Value = res.json().context("Parsing index response json")?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(response)
    }

    /// Search the collection for faces matching the photo at `photo`.
    ///
    /// Sends the fixed similarity threshold and match cap; the list of
    /// candidate matches comes back as raw JSON, printed and returned
    /// unparsed.
    pub fn search_faces_by_image(&self, photo: &Path) -> Result<Value> {
        let url = format!("{}/v1/collections/{}/search", &self.base_url, COLLECTION_ID);
        println!("{}", photo.display());
        let body = SearchRequest {
            image: read_image(photo)?,
            face_match_threshold: FACE_MATCH_THRESHOLD,
            max_faces: MAX_FACES,
        };
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .context("Failed to send search request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Search failed for {}: {} - {}", photo.display(), status, txt);
        }
        let response: Value = res.json().context("Parsing search response json")?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(response)
    }
}

/// Read a photo from disk and encode it for the JSON body. The handle
/// is scoped to this call; it is released before the request goes out.
fn read_image(photo: &Path) -> Result<ImagePayload> {
    let bytes = fs::read(photo)
        .with_context(|| format!("Failed to read image file {}", photo.display()))?;
    Ok(ImagePayload {
        bytes: BASE64.encode(bytes),
    })
}
