// Hand-crafted async HTTP client for the hub's REST API.
//
// Base path: /api/
// Auth: `Authorization: Bearer <token>` on every request.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{EntityState, ServiceAction, ServiceRequest};

/// Per-request timeout. The hub answers state queries in well under a
/// second on a LAN; anything slower than this would starve the caller's
/// poll cycle, so the request is cut off and reported as a transport error.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Async client for the hub's REST API.
///
/// Wraps `reqwest::Client` with hub-specific URL construction and response
/// handling. Holds no retry logic — a single failed attempt is reported
/// upward immediately; retry discipline belongs to the caller's cadence.
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HubClient {
    /// Build a client from a hub base URL and a long-lived access token.
    ///
    /// The token is injected as a sensitive default header so every
    /// request carries it without further plumbing.
    pub fn new(base_url: &str, token: &SecretString) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("access token is not a valid header value: {e}"),
            })?;
        bearer.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Parse and normalize the base URL so that joining `api/...` works.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim_end_matches('/'))?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The hub base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch all entity states: `GET /api/states`.
    pub async fn list_states(&self) -> Result<Vec<EntityState>, Error> {
        self.get("api/states").await
    }

    /// Fetch a single entity state: `GET /api/states/{entity_id}`.
    pub async fn get_state(&self, entity_id: &str) -> Result<EntityState, Error> {
        self.get(&format!("api/states/{entity_id}")).await
    }

    /// Invoke a domain service: `POST /api/services/{domain}/{service}`
    /// with body `{"entity_id": "<id>"}`.
    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        entity_id: &str,
    ) -> Result<(), Error> {
        self.post_no_response(
            &format!("api/services/{domain}/{service}"),
            &ServiceRequest {
                entity_id: entity_id.to_owned(),
            },
        )
        .await
    }

    /// Invoke a state-changing action on an entity.
    ///
    /// The service domain is the entity id's prefix before the first `.`,
    /// the same derivation the classifier uses.
    pub async fn invoke(&self, entity_id: &str, action: ServiceAction) -> Result<(), Error> {
        let domain = entity_id
            .split_once('.')
            .map_or(entity_id, |(domain, _)| domain);
        self.call_service(domain, action.service_name(), entity_id)
            .await
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"api/states"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_empty(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Decode {
                message: format!("{e} (body preview: {preview:?})"),
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Error::Authentication {
            message: "access token rejected by the hub".into(),
        };
    }

    let raw = resp.text().await.unwrap_or_default();
    Error::Status {
        status: status.as_u16(),
        message: if raw.is_empty() {
            status.to_string()
        } else {
            raw
        },
    }
}
