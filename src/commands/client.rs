use super::request::CommandRequest;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

/// Manager command API configuration
#[derive(Clone, Debug, Deserialize)]
pub struct ManagerApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    std::env::var("MANAGER_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/".to_string())
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for ManagerApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Errors from a manager command call
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The manager answered with a non-2xx status
    Rejected { status: u16, body: String },
    /// The request never got a usable answer
    Network(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Rejected { body, .. } => write!(f, "Error: {}", body),
            CommandError::Network(reason) => write!(f, "Fetch error: {}", reason),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<reqwest::Error> for CommandError {
    fn from(e: reqwest::Error) -> Self {
        CommandError::Network(e.to_string())
    }
}

/// HTTP client for the simulation manager's command API.
pub struct ManagerClient {
    http_client: Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl ManagerClient {
    pub fn new(config: &ManagerApiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("testbed-monitor/0.1")
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, password.as_ref()),
            None => builder,
        }
    }

    /// Send a command for a run: `POST /{command}/{prefix}`.
    pub async fn send(&self, prefix: &str, request: &CommandRequest) -> Result<Value, CommandError> {
        let endpoint = request.kind().endpoint(prefix);
        info!(endpoint = %endpoint, "Sending manager command");

        let response = self
            .authorize(self.http_client.post(self.url(&endpoint)))
            .header("Accept", "application/json")
            .json(&request.body())
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %endpoint, error = %e, "Manager command failed");
                CommandError::from(e)
            })?;

        let text = read_success_body(response).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    /// Current execution mode of a run: `GET /status/{prefix}` (plain text).
    pub async fn mode(&self, prefix: &str) -> Result<String, CommandError> {
        let response = self
            .authorize(self.http_client.get(self.url(&format!("status/{}", prefix))))
            .send()
            .await?;

        let text = read_success_body(response).await?;
        Ok(text.trim().trim_matches('"').to_string())
    }
}

/// Read the response body, mapping non-2xx statuses to [`CommandError::Rejected`].
async fn read_success_body(response: reqwest::Response) -> Result<String, CommandError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        error!(status = status.as_u16(), body = %text, "Manager rejected command");
        return Err(CommandError::Rejected {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}
