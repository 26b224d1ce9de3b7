//! Spectrum Virtualize REST Client
//!
//! Every CLI command is exposed as `POST https://<cluster>:7443/rest/<command>`.
//! A session token is obtained from `/rest/auth` and sent on each request.

use crate::domain::ports::{ReadQuery, Record};
use crate::error::{Error, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default management port for the REST API
pub const DEFAULT_REST_PORT: u16 = 7443;

const HEADER_USERNAME: &str = "X-Auth-Username";
const HEADER_PASSWORD: &str = "X-Auth-Password";
const HEADER_TOKEN: &str = "X-Auth-Token";

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for the REST client
#[derive(Clone)]
pub struct SvcRestConfig {
    /// Hostname or management IP of the cluster
    pub clustername: String,
    /// Optional DNS domain appended to the cluster name
    pub domain: Option<String>,
    /// REST API port
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Verify the server certificate
    pub validate_certs: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound on time spent retrying transient failures
    pub max_retry: Duration,
    /// Explicit REST base URL, e.g. when the API is reached through a proxy
    pub endpoint: Option<String>,
}

impl Default for SvcRestConfig {
    fn default() -> Self {
        Self {
            clustername: String::new(),
            domain: None,
            port: DEFAULT_REST_PORT,
            username: String::new(),
            password: String::new(),
            validate_certs: false,
            timeout: Duration::from_secs(30),
            max_retry: Duration::from_secs(60),
            endpoint: None,
        }
    }
}

impl SvcRestConfig {
    /// Fully qualified host name of the management endpoint
    pub fn host(&self) -> String {
        match self.domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => format!("{}.{}", self.clustername, domain),
            _ => self.clustername.clone(),
        }
    }

    /// Base URL of the REST API
    pub fn base_url(&self) -> String {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint.trim_end_matches('/').to_string(),
            _ => format!("https://{}:{}/rest", self.host(), self.port),
        }
    }
}

impl std::fmt::Debug for SvcRestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvcRestConfig")
            .field("clustername", &self.clustername)
            .field("domain", &self.domain)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("validate_certs", &self.validate_certs)
            .field("timeout", &self.timeout)
            .field("max_retry", &self.max_retry)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

// =============================================================================
// REST Client
// =============================================================================

/// REST client holding one authenticated session
pub struct SvcRestClient {
    config: SvcRestConfig,
    http: reqwest::Client,
    base_url: String,
    cluster: String,
    /// Session token, fetched lazily
    token: Mutex<Option<String>>,
}

impl SvcRestClient {
    /// Create a new client. No network traffic happens until the first command.
    pub fn new(config: SvcRestConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.validate_certs)
            .timeout(config.timeout)
            .build()?;

        if !config.validate_certs {
            warn!("Certificate validation disabled for {}", config.host());
        }

        let base_url = config.base_url();
        let cluster = config.host();

        Ok(Self {
            config,
            http,
            base_url,
            cluster,
            token: Mutex::new(None),
        })
    }

    /// Authenticate and return a fresh session token
    async fn authenticate(&self) -> Result<String> {
        let url = format!("{}/auth", self.base_url);
        debug!("Authenticating to {} as {}", url, self.config.username);

        let response = self
            .http
            .post(&url)
            .header(HEADER_USERNAME, &self.config.username)
            .header(HEADER_PASSWORD, &self.config.password)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                cluster: self.cluster.clone(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::CommandFailed {
                command: "auth".into(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let auth: AuthResponse =
            serde_json::from_str(&body).map_err(|e| Error::UnexpectedResponse {
                command: "auth".into(),
                reason: format!("no session token in response: {}", e),
            })?;
        info!("Authenticated to {}", self.cluster);
        Ok(auth.token)
    }

    /// Cached session token, authenticating on first use
    async fn session_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(existing) = token.as_ref() {
            return Ok(existing.clone());
        }

        let fresh = self.authenticate().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Run one command, re-authenticating once if the token has expired
    async fn post_command(&self, command: &str) -> Result<Vec<Record>> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(command));
        let mut reauthenticated = false;

        loop {
            let token = self.session_token().await?;
            debug!("POST {}", url);

            let response = self
                .http
                .post(&url)
                .header(HEADER_TOKEN, token)
                .json(&serde_json::json!({}))
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                warn!("Session token rejected by {}, re-authenticating", self.cluster);
                self.invalidate_token().await;
                reauthenticated = true;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::CommandFailed {
                    command: command.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            return parse_records(command, &body);
        }
    }
}

#[async_trait]
impl ReadQuery for SvcRestClient {
    async fn execute_read_command(&self, command: &str) -> Result<Vec<Record>> {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(self.config.max_retry),
            ..Default::default()
        };

        let client = self;
        backoff::future::retry(policy, move || async move {
            client.post_command(command).await.map_err(|e| {
                if e.is_transient() {
                    warn!("Transient failure running {}: {}", command, e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    fn cluster_name(&self) -> &str {
        &self.cluster
    }
}

/// Normalize a command response body into a list of records
fn parse_records(command: &str, body: &str) -> Result<Vec<Record>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Object(record) => Ok(vec![record]),
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                serde_json::Value::Object(record) => Ok(record),
                other => Err(Error::UnexpectedResponse {
                    command: command.to_string(),
                    reason: format!("element {} is not an object: {}", idx, other),
                }),
            })
            .collect(),
        other => Err(Error::UnexpectedResponse {
            command: command.to_string(),
            reason: format!("expected an array or object, got {}", other),
        }),
    }
}
