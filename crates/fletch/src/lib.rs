//! Fluent HTTP request client built on reqwest.
//!
//! Configure a reusable [`Request`] template (headers, auth, timeout,
//! transport/TLS settings, debug telemetry), then issue verb calls or
//! multipart uploads against it. Read methods (GET/DELETE/HEAD) merge their
//! payload into the URL's query string; write methods (POST/PUT) encode it
//! as a JSON or form body. Every call returns a [`Response`] carrying the
//! resolved URL and the measured round-trip time.
//!
//! ```no_run
//! # async fn run() -> Result<(), fletch::Error> {
//! use fletch::{Payload, Request};
//!
//! let api = Request::new().bearer_auth("tok").debug(true);
//! let resp = api
//!     .post("http://example.com/items", Some(Payload::pairs([("name", "a")])))
//!     .await?;
//! let body = resp.text().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod payload;
pub mod response;

mod debug;
mod query;

pub use auth::Auth;
pub use client::{Request, TlsConfig, TransportConfig};
pub use error::Error;
pub use payload::Payload;
pub use response::Response;

/// One-shot GET with a default template.
pub async fn get(url: &str, payload: Option<Payload>) -> Result<Response, Error> {
    Request::new().get(url, payload).await
}

/// One-shot POST with a default template.
pub async fn post(url: &str, payload: Option<Payload>) -> Result<Response, Error> {
    Request::new().post(url, payload).await
}

/// One-shot PUT with a default template.
pub async fn put(url: &str, payload: Option<Payload>) -> Result<Response, Error> {
    Request::new().put(url, payload).await
}

/// One-shot DELETE with a default template.
pub async fn delete(url: &str, payload: Option<Payload>) -> Result<Response, Error> {
    Request::new().delete(url, payload).await
}

/// One-shot HEAD with a default template.
pub async fn head(url: &str, payload: Option<Payload>) -> Result<Response, Error> {
    Request::new().head(url, payload).await
}

/// One-shot request with an arbitrary method name.
pub async fn request(method: &str, url: &str, payload: Option<Payload>) -> Result<Response, Error> {
    Request::new().request(method, url, payload).await
}

/// One-shot single-file multipart upload.
pub async fn upload(url: &str, file_path: &str, field_name: &str) -> Result<Response, Error> {
    Request::new().upload(url, file_path, field_name).await
}
