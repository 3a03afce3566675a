use reqwest::header::{AUTHORIZATION, ETAG, IF_MATCH};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cookie decision as returned by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieDecision {
    pub key: String,
    pub value: String,
    pub expiration: String,
    pub canary_percent: f64,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// An application record (kept as raw JSON) with its store version.
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    pub record: Value,
    pub version: Option<String>,
}

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Status { status: StatusCode, body: String },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "request failed: {}", e),
            ClientError::Status { status, body } => {
                write!(f, "controller returned {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub struct CanaryClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CanaryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header(AUTHORIZATION, format!("Bearer {}", key)),
            None => req,
        }
    }

    /// Ask for a decision; `outcome` forces "success" or "fail".
    pub async fn decide(&self, app: &str, outcome: Option<&str>) -> Result<CookieDecision, ClientError> {
        let mut req = self.client.get(format!("{}/apps/{}/cookie", self.base_url, app));
        if let Some(outcome) = outcome {
            req = req.query(&[("outcome", outcome)]);
        }
        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// The older `PUT /` decision call with `{"app": ...}`.
    pub async fn decide_legacy(&self, app: &str) -> Result<CookieDecision, ClientError> {
        let resp = self
            .client
            .put(format!("{}/", self.base_url))
            .json(&serde_json::json!({ "app": app }))
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn get_app(&self, app: &str) -> Result<VersionedRecord, ClientError> {
        let req = self.authed(self.client.get(format!("{}/apps/{}", self.base_url, app)));
        let resp = check(req.send().await?).await?;
        let version = etag(&resp);
        Ok(VersionedRecord {
            record: resp.json().await?,
            version,
        })
    }

    pub async fn list_apps(&self) -> Result<Value, ClientError> {
        let req = self.authed(self.client.get(format!("{}/apps", self.base_url)));
        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Replace a record; with `if_match` the update only applies at that version.
    pub async fn update_app(
        &self,
        app: &str,
        record: &Value,
        if_match: Option<&str>,
    ) -> Result<VersionedRecord, ClientError> {
        let mut req = self
            .authed(self.client.put(format!("{}/apps/{}", self.base_url, app)))
            .json(record);
        if let Some(version) = if_match {
            req = req.header(IF_MATCH, format!("\"{}\"", version));
        }
        let resp = check(req.send().await?).await?;
        let version = etag(&resp);
        Ok(VersionedRecord {
            record: resp.json().await?,
            version,
        })
    }
}

fn etag(resp: &Response) -> Option<String> {
    resp.headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_matches('"').to_string())
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}
