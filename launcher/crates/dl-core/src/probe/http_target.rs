use crate::{ProbeError, ProbeErrorResult, ProbeTarget};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

/// HTTP GET against the dashboard address.
///
/// Any 2xx answer, after following redirects, counts as ready.
pub struct HttpProbeTarget {
    client: Client,
    url: Url,
}

impl HttpProbeTarget {
    pub fn new(url: &str, timeout: Duration) -> ProbeErrorResult<Self> {
        let parsed = Url::parse(url.trim()).map_err(|e| ProbeError::config(url, e.to_string()))?;

        // No TLS backend is compiled in, so https could never become ready
        if parsed.scheme() != "http" {
            return Err(ProbeError::config(
                url,
                format!("unsupported scheme '{}', expected http", parsed.scheme()),
            ));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ProbeError::config(url, "missing host"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: parsed,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ProbeTarget for HttpProbeTarget {
    async fn attempt(&self) -> Result<(), String> {
        match self.client.get(self.url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(format!("HTTP {}", resp.status())),
            Err(e) if e.is_timeout() => Err(String::from("timed out")),
            Err(e) if e.is_connect() => Err(String::from("connection failed")),
            Err(e) => Err(e.to_string()),
        }
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
