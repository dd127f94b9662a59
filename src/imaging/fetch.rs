//! Plain HTTP fetches with retry

use crate::extractor::retry::{retry, RetryPolicy, UserAgentPool};
use crate::utils::config::AppSettings;
use crate::utils::error::{MediagrabError, Result};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// HTTP client that retries throttling and server errors
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    agents: UserAgentPool,
}

impl HttpFetcher {
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.http_timeout()).build()?;
        Ok(Self::with_client(
            client,
            RetryPolicy::from_settings(settings),
            UserAgentPool::default(),
        ))
    }

    pub fn with_client(client: Client, policy: RetryPolicy, agents: UserAgentPool) -> Self {
        Self {
            client,
            policy,
            agents,
        }
    }

    /// GET `url` and return the body of a successful response
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = parse_http_url(url)?;

        retry(&self.policy, &self.agents, "HTTP fetch", |attempt, user_agent| {
            let request = self
                .client
                .get(parsed.clone())
                .header(USER_AGENT, user_agent);
            async move {
                debug!(url = %url, attempt = attempt + 1, "Fetching");
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(MediagrabError::HttpStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }
}

/// Only absolute http(s) URLs are fetched
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|_| MediagrabError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(MediagrabError::InvalidUrl(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://example.com/a.png").is_ok());
        assert!(parse_http_url(" http://example.com/a.png ").is_ok());
        assert!(matches!(
            parse_http_url("file:///etc/passwd"),
            Err(MediagrabError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_http_url("not a url"),
            Err(MediagrabError::InvalidUrl(_))
        ));
    }
}
