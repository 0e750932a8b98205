//! HTTP GET abstraction shared by the module source, the download injector and the
//! repository client. Tests substitute their own [`HttpClient`].

use async_trait::async_trait;

/// User agent sent on every request (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("langtree/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches a URL. `Err` means the request never produced a response (DNS, connect, read).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// Reqwest-based HTTP client.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    bearer_token: Option<String>,
    accept: Option<String>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            ..Self::default()
        }
    }

    /// Sends `Authorization: Bearer <token>` when `token` is `Some`.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Sets the `Accept` header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT);
        if let Some(ref accept) = self.accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }
}
