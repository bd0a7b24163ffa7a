//! The fluent request builder.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{multipart, Method};

use crate::auth::Auth;
use crate::debug;
use crate::error::Error;
use crate::payload::{self, Payload};
use crate::query;
use crate::response::Response;

const CONTENT_TYPE_JSON: &str = "application/json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level settings, applied when the underlying client is built.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip decompression.
    pub gzip: bool,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            user_agent: format!("fletch/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            proxy: None,
        }
    }
}

/// TLS settings, applied only when a [`TransportConfig`] is also present.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Skip certificate validation. Testing only.
    pub accept_invalid_certs: bool,
    /// Additional trusted root certificates.
    pub root_certificates: Vec<reqwest::Certificate>,
}

/// A reusable request template: headers, auth, timeout, transport settings
/// and a debug flag, configured once and then used for any number of calls.
///
/// Configuration methods consume and return the builder for chaining; verb
/// methods take `&self`, so a configured template can serve many sequential
/// calls. For concurrent calls, clone the builder or use one per call chain.
///
/// ```no_run
/// # async fn run() -> Result<(), fletch::Error> {
/// use fletch::{Payload, Request};
///
/// let client = Request::new().json_content().bearer_auth("tok");
/// let resp = client
///     .get("http://example.com/items?a=1", Some(Payload::pairs([("b", "2")])))
///     .await?;
/// println!("{} in {}ms", resp.status(), resp.elapsed_millis());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    transport: Option<TransportConfig>,
    tls: Option<TlsConfig>,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
    auth: Auth,
    debug: bool,
    client: OnceLock<reqwest::Client>,
}

impl Request {
    /// Create a template with default settings (30s timeout, no headers,
    /// no auth).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set transport settings, applied when the client is first built.
    pub fn transport(mut self, config: TransportConfig) -> Self {
        self.transport = Some(config);
        self
    }

    /// Set TLS settings. These only take effect together with a transport
    /// config; on the default transport they are ignored.
    pub fn tls(mut self, config: TlsConfig) -> Self {
        self.tls = Some(config);
        self
    }

    /// Set a single header, overwriting any previous value for the name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merge headers into the template, overwriting on name collision.
    /// An empty map is a no-op.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Use HTTP basic authentication. Credentials are only sent when both
    /// username and password are non-empty.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Use an OAuth bearer token (`Authorization: Bearer <token>`).
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Bearer {
            token: token.into(),
        };
        self
    }

    /// Use a private token (`PRIVATE-TOKEN: <token>`).
    pub fn private_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::PrivateToken {
            token: token.into(),
        };
        self
    }

    /// Shorthand for setting `Content-Type: application/json`.
    pub fn json_content(self) -> Self {
        self.header("Content-Type", CONTENT_TYPE_JSON)
    }

    /// Set the whole-call timeout (dial plus exchange). Takes effect when
    /// the client is first built; the client is memoized on the first call,
    /// so changing the timeout afterwards has no effect.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Toggle per-call debug telemetry.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Execute a GET request; the payload merges into the query string.
    pub async fn get(&self, url: &str, payload: Option<Payload>) -> Result<Response, Error> {
        self.call(Method::GET, url, payload).await
    }

    /// Execute a POST request; the payload becomes the body.
    pub async fn post(&self, url: &str, payload: Option<Payload>) -> Result<Response, Error> {
        self.call(Method::POST, url, payload).await
    }

    /// Execute a PUT request; the payload becomes the body.
    pub async fn put(&self, url: &str, payload: Option<Payload>) -> Result<Response, Error> {
        self.call(Method::PUT, url, payload).await
    }

    /// Execute a DELETE request; the payload merges into the query string.
    pub async fn delete(&self, url: &str, payload: Option<Payload>) -> Result<Response, Error> {
        self.call(Method::DELETE, url, payload).await
    }

    /// Execute a HEAD request; the payload merges into the query string.
    pub async fn head(&self, url: &str, payload: Option<Payload>) -> Result<Response, Error> {
        self.call(Method::HEAD, url, payload).await
    }

    /// Execute a request with an arbitrary method name (case-insensitive).
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        payload: Option<Payload>,
    ) -> Result<Response, Error> {
        if method.is_empty() || url.is_empty() {
            return Err(Error::InvalidArgument(
                "method and url are required".to_string(),
            ));
        }
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidArgument(format!("unsupported method `{method}`")))?;
        self.call(method, url, payload).await
    }

    /// Upload a single file as a multipart POST.
    ///
    /// `file_path` is read from disk and doubles as the transmitted
    /// filename; `field_name` names the form field. The multipart boundary
    /// Content-Type overrides any configured Content-Type. If the file
    /// cannot be read, no request is sent.
    pub async fn upload(
        &self,
        url: &str,
        file_path: &str,
        field_name: &str,
    ) -> Result<Response, Error> {
        let start = Instant::now();
        let result = self.dispatch_upload(url, file_path, field_name).await;
        let elapsed = start.elapsed();
        debug::log_call(
            self.debug,
            &Method::POST,
            url,
            &self.headers,
            elapsed,
            self.effective_timeout(),
            None,
        );
        result.map(|inner| Response::new(url.to_string(), elapsed, inner))
    }

    async fn call(
        &self,
        method: Method,
        url: &str,
        payload: Option<Payload>,
    ) -> Result<Response, Error> {
        let start = Instant::now();
        let mut resolved = url.to_string();
        let result = self.dispatch(&method, &mut resolved, payload.as_ref()).await;
        let elapsed = start.elapsed();
        debug::log_call(
            self.debug,
            &method,
            &resolved,
            &self.headers,
            elapsed,
            self.effective_timeout(),
            payload.as_ref(),
        );
        result.map(|inner| Response::new(resolved, elapsed, inner))
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &mut String,
        payload: Option<&Payload>,
    ) -> Result<reqwest::Response, Error> {
        if url.is_empty() {
            return Err(Error::InvalidArgument("url is required".to_string()));
        }

        let client = self.client()?;

        if !payload::sends_body(method) {
            *url = query::merge(url, payload)?;
        }
        let body = payload::encode_body(method, payload, self.effective_json())?;

        let mut req = client
            .request(method.clone(), url.as_str())
            .headers(self.wire_headers(true));
        req = self.auth.apply(req);
        if let Some(body) = body {
            req = req.body(body);
        }

        req.send().await.map_err(Error::Transport)
    }

    async fn dispatch_upload(
        &self,
        url: &str,
        file_path: &str,
        field_name: &str,
    ) -> Result<reqwest::Response, Error> {
        if url.is_empty() {
            return Err(Error::InvalidArgument("url is required".to_string()));
        }

        // Read up front so a missing file never produces a request.
        let contents = tokio::fs::read(file_path).await?;
        let part = multipart::Part::bytes(contents).file_name(file_path.to_string());
        let form = multipart::Form::new().part(field_name.to_string(), part);

        let client = self.client()?;
        let mut req = client.post(url).headers(self.wire_headers(false));
        req = self.auth.apply(req);
        req = req.multipart(form);

        req.send().await.map_err(Error::Transport)
    }

    /// The memoized transport client, built on first use.
    fn client(&self) -> Result<&reqwest::Client, Error> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = self.build_client()?;
        Ok(self.client.get_or_init(|| built))
    }

    fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().timeout(self.effective_timeout());

        if let Some(transport) = &self.transport {
            builder = builder
                .connect_timeout(transport.connect_timeout)
                .pool_max_idle_per_host(transport.pool_max_idle_per_host)
                .user_agent(&transport.user_agent);
            if transport.gzip {
                builder = builder.gzip(true);
            }
            if let Some(proxy) = &transport.proxy {
                builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(Error::ClientBuild)?);
            }
            if let Some(tls) = &self.tls {
                builder = builder.danger_accept_invalid_certs(tls.accept_invalid_certs);
                for cert in &tls.root_certificates {
                    builder = builder.add_root_certificate(cert.clone());
                }
            }
        }

        builder.build().map_err(Error::ClientBuild)
    }

    fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Whether body encoding should use JSON: the caller's Content-Type when
    /// one is set, otherwise the injected JSON default.
    fn effective_json(&self) -> bool {
        match self
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            Some((_, value)) => value.to_ascii_lowercase().contains(CONTENT_TYPE_JSON),
            None => true,
        }
    }

    /// Headers as sent on the wire: the JSON Content-Type default first,
    /// then caller headers overriding it. With `content_type` false the
    /// Content-Type entry is stripped entirely (upload path, where the
    /// multipart boundary value takes its place).
    fn wire_headers(&self, content_type: bool) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));

        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                map.insert(name, value);
            }
        }

        if !content_type {
            map.remove(CONTENT_TYPE);
        }
        map
    }
}
