//! HTTP client for the menu extraction job API.

use menu_types::{
    JobTransport, PollJobResponse, PollOutcome, StartJobRequest, StartJobResponse, StartOutcome,
    TransportError,
};
use std::fmt;

const START_PATH: &str = "/api/menu/extract";

/// Transport that talks to the job API over HTTP.
///
/// Start: `POST {base}/api/menu/extract` with `{restaurantName, address, itemLimit}`.
/// Poll: `GET {base}/api/menu/extract/{jobId}`.
pub struct HttpJobTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpJobTransport {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("MENU_JOB_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let api_key = std::env::var("MENU_JOB_API_KEY").ok();
        Self::new(base_url, api_key)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => req.bearer_auth(key),
            None => req,
        }
    }
}

impl fmt::Debug for HttpJobTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJobTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait::async_trait]
impl JobTransport for HttpJobTransport {
    async fn start_job(
        &self,
        restaurant_name: &str,
        address: &str,
        item_limit: u32,
    ) -> Result<StartOutcome, TransportError> {
        let body = StartJobRequest {
            restaurant_name: restaurant_name.to_string(),
            address: address.to_string(),
            item_limit,
        };
        let url = format!("{}{}", self.base_url, START_PATH);
        let res = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        // Error responses usually still carry the {ok:false, message} envelope.
        match serde_json::from_str::<StartJobResponse>(&text) {
            Ok(parsed) if status.is_success() || !parsed.ok => Ok(parsed.into_outcome()),
            Ok(_) => Ok(StartOutcome::Rejected(format!("{}: {}", status, text))),
            Err(_) if !status.is_success() => {
                Ok(StartOutcome::Rejected(format!("{}: {}", status, text)))
            }
            Err(e) => Err(TransportError::Parse(e.to_string())),
        }
    }

    async fn poll_job(&self, job_id: &str) -> Result<PollOutcome, TransportError> {
        let url = format!("{}{}/{}", self.base_url, START_PATH, job_id);
        let res = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let status = res.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(PollOutcome::NotFound);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: PollJobResponse = res
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;
        tracing::debug!(job_id = %job_id, status = %parsed.status, "polled menu job");
        Ok(parsed.into_outcome())
    }
}
