//! Page fetching over HTTP.
//!
//! # Architecture
//!
//! - [`PageFetcher`]: the trait the issue extractor pulls pages through
//! - [`HttpFetcher`]: the production implementation on top of `reqwest`
//!
//! One call is one GET. There is no retry and no caching: a failed page is
//! reported as a [`FetchError`] and the caller decides what to do with it.

use crate::error::{Error, FetchError};
use reqwest::{Client, Proxy};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Something that can turn a URL into the text of the page behind it.
pub trait PageFetcher {
    /// Fetch `url` and return its body as text.
    ///
    /// # Errors
    ///
    /// [`FetchError::Status`] for a non-success answer,
    /// [`FetchError::Transport`] when no answer was received at all.
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String, FetchError>>;
}

/// Proxy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProxyKind {
    Socks5,
    Http,
}

impl ProxyKind {
    fn scheme(self) -> &'static str {
        match self {
            ProxyKind::Socks5 => "socks5",
            ProxyKind::Http => "http",
        }
    }

    /// Port used when none is given.
    pub fn default_port(self) -> u16 {
        match self {
            ProxyKind::Socks5 => 1080,
            ProxyKind::Http => 8080,
        }
    }
}

/// Proxy server settings.
#[derive(Clone)]
pub struct ProxyConfig {
    pub kind: ProxyKind,
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ProxyConfig {
    fn to_proxy(&self) -> Result<Proxy, reqwest::Error> {
        let port = self.port.unwrap_or_else(|| self.kind.default_port());
        let proxy = Proxy::all(format!("{}://{}:{}", self.kind.scheme(), self.host, port))?;
        Ok(match &self.username {
            Some(user) => proxy.basic_auth(user, self.password.as_deref().unwrap_or("")),
            None => proxy,
        })
    }
}

/// How the HTTP client is put together.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub proxy: Option<ProxyConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(60),
            proxy: None,
        }
    }
}

/// [`PageFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// [`Error::TransportUnavailable`] if the client cannot be built, e.g. the
    /// TLS backend fails to initialize or the proxy definition is unusable.
    #[instrument(level = "info", skip_all, fields(proxy = transport.proxy.is_some()))]
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(transport.user_agent.as_str())
            .connect_timeout(transport.connect_timeout);
        if let Some(proxy) = &transport.proxy {
            debug!(host = %proxy.host, kind = ?proxy.kind, "Using proxy");
            builder = builder.proxy(proxy.to_proxy().map_err(Error::TransportUnavailable)?);
        }
        let client = builder.build().map_err(Error::TransportUnavailable)?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Non-success response");
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched page");
        Ok(body)
    }
}
