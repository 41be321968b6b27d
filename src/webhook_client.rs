use std::{fmt, time};

use reqwest::Client;
use url::Url;

/// Automation webhook client
pub struct WebhookClient {
    http_client: Client,
    url: Url,
}

impl WebhookClient {
    /// Build a client that posts to the provided trigger URL
    pub fn new(url: Url, timeout: time::Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client, url })
    }

    /// Notify the automation workflow about a new signup
    ///
    /// The email is forwarded exactly as it was submitted. Any non-2xx
    /// response is reported as an error. Errors are stripped of the URL.
    pub async fn notify(&self, email: &str) -> Result<(), reqwest::Error> {
        let request_body = NotifyRequest { email };
        self.http_client
            .post(self.url.clone())
            .json(&request_body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)?;
        Ok(())
    }
}

// The trigger URL embeds a credential, keep it out of logs
impl fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookClient")
            .field("host", &self.url.host_str())
            .finish_non_exhaustive()
    }
}

/// Webhook request body
#[derive(serde::Serialize)]
struct NotifyRequest<'a> {
    email: &'a str,
}
