use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::api::response::ApiPage;
use crate::error::{PipelineError, Result};
use crate::utils::constants::{CDO_BASE_URL, USER_AGENT};

/// Blocking client for the CDO v2 API. One instance is shared by the whole
/// run; it holds the auth token and the retry budget, nothing else.
pub struct CdoClient {
    http: Client,
    base_url: String,
    token: String,
    max_attempts: u32,
}

impl CdoClient {
    pub fn new(token: String, timeout: Duration, max_attempts: u32) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: CDO_BASE_URL.to_string(),
            token,
            max_attempts,
        })
    }

    /// Issue one authenticated GET, retrying transient failures with
    /// exponential backoff. Non-retryable HTTP errors and malformed bodies
    /// propagate immediately.
    pub fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ApiPage> {
        run_with_backoff(self.max_attempts, thread::sleep, || {
            self.execute(endpoint, params)
        })
    }

    fn execute(&self, endpoint: &str, params: &[(String, String)]) -> Result<ApiPage> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, params = ?params, "CDO request");

        let response = self
            .http
            .get(&url)
            .header("token", &self.token)
            .query(params)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::ApiStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json()?)
    }
}

/// Retry wrapper for transient failures: delay before retry `i` is `2^i`
/// seconds. The sleep function is injected so tests do not wait. Fatal
/// errors pass through untouched; exhausting the budget wraps the last
/// transient error.
pub fn run_with_backoff<T, F, S>(max_attempts: u32, mut sleep: S, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
    S: FnMut(Duration),
{
    let mut attempt: u32 = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < max_attempts => {
                let delay = Duration::from_secs(1u64 << attempt);
                warn!(attempt, delay_secs = delay.as_secs(), error = %err, "transient API failure, backing off");
                sleep(delay);
                attempt += 1;
            }
            Err(err) if err.is_transient() => {
                return Err(PipelineError::RetriesExhausted {
                    attempts: max_attempts,
                    source: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        }
    }
}
