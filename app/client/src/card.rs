//! Agent card retrieval.

use crate::{
    error::{ConfigError, FetchError},
    headers::HeaderSet,
};
use protocol::{AGENT_CARD_PATH, AgentCard, DebugLog, Validators};
use reqwest::header::ACCEPT;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

/// Correlation id of the card fetch in the debug log.
pub const CARD_TRACE: &str = "http-agent-card";

/// A fetched card with its validation findings.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedCard {
    /// Typed projection.
    pub card: AgentCard,
    /// The document exactly as served.
    pub raw: Value,
    /// Validation findings, computed once here.
    pub errors: Vec<String>,
    /// Where the card was fetched from.
    pub url: Url,
}

/// Normalize operator input into an absolute http(s) URL.
///
/// A missing scheme defaults to `http://`.
pub fn normalize_base_url(input: &str) -> Result<Url, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyUrl);
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&with_scheme).map_err(|e| ConfigError::InvalidUrl {
        url: trimmed.to_owned(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: "missing host".to_owned(),
        });
    }
    Ok(url)
}

/// Where to fetch the card from.
///
/// A URL with a path is taken as the card location itself; a bare origin
/// gets the well-known path.
pub fn card_url(base: &Url) -> Url {
    if base.path().trim_matches('/').is_empty() {
        let mut url = base.clone();
        url.set_path(AGENT_CARD_PATH);
        url
    } else {
        base.clone()
    }
}

/// Fetches and validates agent cards over HTTP.
#[derive(Debug, Clone)]
pub struct AgentCardFetcher {
    client: reqwest::Client,
    timeout: Duration,
    validators: Validators,
}

impl Default for AgentCardFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), Validators::default())
    }
}

impl AgentCardFetcher {
    /// A fetcher with its own HTTP client.
    pub fn new(timeout: Duration, validators: Validators) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            validators,
        }
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Validators applied to fetched cards.
    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    /// Fetch the card for an operator-supplied URL.
    pub async fn fetch(&self, base_url: &str, headers: &HeaderSet) -> Result<FetchedCard, FetchError> {
        let base = normalize_base_url(base_url)?;
        self.fetch_traced(&base, headers, &mut Vec::new()).await
    }

    /// Fetch the card, recording the request and response in `trace`.
    ///
    /// A response entry is recorded even when the request fails.
    pub async fn fetch_traced(
        &self,
        base: &Url,
        headers: &HeaderSet,
        trace: &mut Vec<DebugLog>,
    ) -> Result<FetchedCard, FetchError> {
        let url = card_url(base);
        let header_map = headers.to_header_map()?;
        trace.push(DebugLog::request(
            json!({"method": "GET", "url": url.as_str(), "headers": headers.to_json()}),
            Some(CARD_TRACE.into()),
        ));
        tracing::debug!("fetching agent card from {url}");

        let sent = self
            .client
            .get(url.clone())
            .headers(header_map)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                trace.push(DebugLog::response(
                    json!({"error": e.to_string(), "url": url.as_str()}),
                    Some(CARD_TRACE.into()),
                ));
                return Err(FetchError::Network(e.to_string()));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                trace.push(DebugLog::response(
                    json!({"error": e.to_string(), "status": status.as_u16(), "url": url.as_str()}),
                    Some(CARD_TRACE.into()),
                ));
                return Err(FetchError::Network(e.to_string()));
            }
        };
        let parsed = serde_json::from_str::<Value>(&body);
        let logged = match &parsed {
            Ok(value) => value.clone(),
            Err(_) => Value::String(body.clone()),
        };
        trace.push(DebugLog::response(
            json!({"status": status.as_u16(), "url": url.as_str(), "body": logged}),
            Some(CARD_TRACE.into()),
        ));

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let raw = parsed.map_err(|e| FetchError::Parse(e.to_string()))?;
        let card = AgentCard::from_value(&raw)
            .ok_or_else(|| FetchError::Parse("agent card is not a JSON object".to_owned()))?;
        let errors = self.validators.check_card(&raw);
        if !errors.is_empty() {
            tracing::debug!("agent card has {} validation findings", errors.len());
        }

        Ok(FetchedCard {
            card,
            raw,
            errors,
            url,
        })
    }
}
