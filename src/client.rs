//! Migadu async client implementation.

use crate::request::{DescriptorPool, RequestBuilder};
use crate::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Origin of the Migadu administration API.
pub const API_HOST: &str = "https://api.migadu.com";
/// Version segment every administrative call is made under.
pub const V1_PATH: &str = "v1";
/// Per-call deadline used unless overridden on the builder.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const DOMAINS_PATH: &str = "domains";
pub(crate) const ALIASES_PATH: &str = "aliases";
pub(crate) const REWRITES_PATH: &str = "rewrites";
pub(crate) const IDENTITIES_PATH: &str = "identities";
pub(crate) const MAILBOXES_PATH: &str = "mailboxes";

const USER_AGENT_VALUE: &str = concat!("migadu-client/", env!("CARGO_PKG_VERSION"));

const ENV_EMAIL: &str = "MIGADU_ADMIN_EMAIL";
const ENV_API_KEY: &str = "MIGADU_API_KEY";
const ENV_DOMAIN: &str = "MIGADU_DOMAIN";

/// Something that can send a fully formed request and hand back the response.
///
/// Implemented for [`reqwest::Client`]; tests and embedders can plug in their
/// own transport with [`ClientBuilder::build_with_transport`].
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the response head.
    fn send(
        &self,
        request: reqwest::Request,
    ) -> impl Future<Output = reqwest::Result<reqwest::Response>> + Send;
}

impl Transport for reqwest::Client {
    fn send(
        &self,
        request: reqwest::Request,
    ) -> impl Future<Output = reqwest::Result<reqwest::Response>> + Send {
        self.execute(request)
    }
}

/// Async client for the Migadu administration API, scoped to one domain.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] to override the
/// timeout, API host, proxy or transport.
pub struct Client<X = reqwest::Client> {
    transport: X,
    email: String,
    api_key: String,
    domain: String,
    api_host: String,
    timeout: Duration,
    pool: Arc<DescriptorPool>,
}

impl<X> fmt::Debug for Client<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .field("domain", &self.domain)
            .field("api_host", &self.api_host)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(
        email: impl Into<String>,
        api_key: impl Into<String>,
        domain: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(email, api_key, domain)
    }

    /// Create a new client for `domain`, authenticated as `email` with `api_key`.
    ///
    /// Lists the domain's mailboxes to check the credentials; any failure
    /// there is returned and no client is produced.
    ///
    /// # Examples
    /// ```no_run
    /// # use migadu_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), migadu_client::Error> {
    /// let client = Client::new("admin@example.org", "api-key", "example.org").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self> {
        ClientBuilder::new(email, api_key, domain).build().await
    }
}

impl<X: Transport> Client<X> {
    /// Admin account the client authenticates as.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Domain every scoped request targets.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Origin requests are sent to.
    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Per-call deadline; zero means none.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Descriptor pool backing this client's builders.
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// A builder already pointing at `/v1/domains/{domain}` with credentials.
    ///
    /// Callers set the method, append the resource path and optionally a body.
    ///
    /// # Examples
    /// ```no_run
    /// # use migadu_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), migadu_client::Error> {
    /// # let client = Client::new("admin@example.org", "api-key", "example.org").await?;
    /// let request = client
    ///     .scoped_builder()
    ///     .method(reqwest::Method::GET)
    ///     .add_path("aliases")
    ///     .build()?;
    /// let raw: serde_json::Value = client.execute(request).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn scoped_builder(&self) -> RequestBuilder<'_> {
        self.pool
            .builder()
            .host(&self.api_host)
            .add_path(V1_PATH)
            .add_restful_path(DOMAINS_PATH, &self.domain)
            .basic_auth(&self.email, &self.api_key)
    }

    /// Send `request` and decode a `200 OK` JSON body into `T`.
    ///
    /// Any other status becomes [`Error::Status`] carrying the raw body. An
    /// empty `200` body decodes as the empty value of `T` (`()`, `None`, or a
    /// struct whose fields all default).
    pub async fn execute<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        self.execute_with_cancel(&CancellationToken::new(), request).await
    }

    /// Like [`execute`](Self::execute), but aborts with [`Error::Cancelled`]
    /// as soon as `cancel` fires. The client timeout still applies; whichever
    /// comes first wins.
    pub async fn execute_with_cancel<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        request: reqwest::Request,
    ) -> Result<T> {
        let call = self.dispatch(request);
        let bounded = async {
            if self.timeout.is_zero() {
                call.await
            } else {
                match tokio::time::timeout(self.timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(self.timeout)),
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("request cancelled by caller");
                Err(Error::Cancelled)
            }
            result = bounded => result,
        }
    }

    async fn dispatch<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "sending request");

        let response = self.transport.send(request).await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(
            %method,
            %path,
            status = status.as_u16(),
            len = body.len(),
            "received response"
        );

        if status != StatusCode::OK {
            let body = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());
            tracing::warn!(%method, %path, status = status.as_u16(), "request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode(&body)
    }
}

/// Decode a successful body, treating an empty one as the empty value of `T`.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"null")
            .or_else(|_| serde_json::from_slice(b"{}"))
            .map_err(Error::Decode);
    }
    serde_json::from_slice(body).map_err(Error::Decode)
}

/// Builder for configuring a Migadu client.
///
/// Start with [`Client::builder`] or [`ClientBuilder::from_env`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    email: String,
    api_key: String,
    domain: String,
    api_host: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
    pool: Option<Arc<DescriptorPool>>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - API host `https://api.migadu.com`
    /// - 30 second timeout
    /// - No proxy
    /// - A descriptor pool of its own
    pub fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
            domain: domain.into(),
            api_host: API_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT_VALUE.to_string(),
            proxy: None,
            pool: None,
        }
    }

    /// Read credentials from `MIGADU_ADMIN_EMAIL`, `MIGADU_API_KEY` and
    /// `MIGADU_DOMAIN`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env(ENV_EMAIL)?, env(ENV_API_KEY)?, env(ENV_DOMAIN)?))
    }

    /// Override the per-call deadline. `Duration::ZERO` disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the API origin.
    ///
    /// Useful for testing against a mock server.
    pub fn api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:1080").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Share a descriptor pool between several clients.
    pub fn pool(mut self, pool: Arc<DescriptorPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Build the client on a reqwest transport and verify the credentials.
    pub async fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        // Session cookies are kept by the transport's own store.
        let http = builder.cookie_store(true).build()?;
        self.build_with_transport(http).await
    }

    /// Build the client on `transport` and verify the credentials by listing
    /// the domain's mailboxes.
    #[tracing::instrument(skip_all, fields(domain = %self.domain))]
    pub async fn build_with_transport<X: Transport>(self, transport: X) -> Result<Client<X>> {
        let client = Client {
            transport,
            email: self.email,
            api_key: self.api_key,
            domain: self.domain,
            api_host: self.api_host,
            timeout: self.timeout,
            pool: self.pool.unwrap_or_default(),
        };

        if let Err(err) = client.list_mailboxes().await {
            tracing::warn!(error = %err, "credential check failed");
            return Err(err);
        }
        tracing::debug!("credential check passed");
        Ok(client)
    }
}

fn env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
}
