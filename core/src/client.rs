//! Authenticated request builder.
//!
//! # Design
//! `Client` holds the credentials and the derived base URL and nothing else.
//! `build_request` turns a verb, a relative path, an optional query and an
//! optional body into a complete `HttpRequest` without touching the network.
//! `send` hands that request to a caller-supplied `Transport`; resource
//! clients pair it with one of the `envelope::decode_*` functions.
//!
//! Each resource module adds its own accessor to `Client` (for example
//! `Client::string_comments` in `resources::string_comments`), so the
//! inherent impl is split across files.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query;

const DEFAULT_HOST: &str = "api.crowdin.com";
const API_PREFIX: &str = "/api/v2";

/// Bearer token plus the optional organization it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub organization: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            organization: None,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

/// Optional overrides applied at construction.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Replaces the URL derived from the credentials.
    pub base_url: Option<String>,
    /// Sent as `user-agent`; defaults to `crowdin-core/<version>`.
    pub user_agent: Option<String>,
}

/// Stateless, cloneable request builder bound to one set of credentials.
#[derive(Debug, Clone)]
pub struct Client {
    credentials: Credentials,
    base_url: String,
    user_agent: String,
}

impl Client {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        let base_url = config
            .base_url
            .unwrap_or_else(|| default_base_url(credentials.organization.as_deref()));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: config
                .user_agent
                .unwrap_or_else(|| format!("crowdin-core/{}", env!("CARGO_PKG_VERSION"))),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.credentials.token
    }

    pub fn organization(&self) -> Option<&str> {
        self.credentials.organization.as_deref()
    }

    /// Build a fully addressed, authenticated request.
    ///
    /// `path` is appended to the base URL as-is. Query fields that serialize
    /// to `null` are left out; `content-type` is only set when there is a
    /// body.
    pub fn build_request<Q, B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<HttpRequest>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut url = format!("{}{}", self.base_url, path);
        if let Some(query) = query {
            let pairs = query::to_pairs(query)?;
            if !pairs.is_empty() {
                url.push('?');
                url.push_str(&query::encode(&pairs));
            }
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::Encoding(e.to_string()))?;

        let mut headers = vec![
            (
                "authorization".to_string(),
                format!("Bearer {}", self.credentials.token),
            ),
            ("user-agent".to_string(), self.user_agent.clone()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        tracing::debug!(%method, %url, has_body = body.is_some(), "built request");
        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Execute one round trip. Transport failures become `Error::Transport`;
    /// the response is returned undecoded whatever its status.
    pub async fn send<T: Transport + ?Sized>(
        &self,
        transport: &T,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        match transport.send(request).await {
            Ok(response) => {
                tracing::debug!(%method, %url, status = response.status, "received response");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(%method, %url, error = %e, "transport failed");
                Err(Error::Transport(e))
            }
        }
    }
}

fn default_base_url(organization: Option<&str>) -> String {
    match organization {
        Some(org) => format!("https://{org}.{DEFAULT_HOST}{API_PREFIX}"),
        None => format!("https://{DEFAULT_HOST}{API_PREFIX}"),
    }
}

/// Placeholder for requests without a query or body.
pub(crate) const NONE: Option<&()> = None;
