//! Pooled request builder.
//!
//! A [`RequestBuilder`] borrows a [`Descriptor`] from a [`DescriptorPool`],
//! accumulates the pieces of one HTTP request through its fluent setters and
//! turns them into a [`reqwest::Request`] with [`RequestBuilder::build`].
//! The descriptor goes back to the pool, reset, whether the build succeeds or
//! not (and also when an unbuilt builder is dropped).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderName, HeaderValue};
use reqwest::{Body, Method};
use serde::Serialize;
use url::Url;

use crate::{Error, Result};

/// Characters left alone when escaping a single path segment.
///
/// Mirrors the usual "path segment" escaping: unreserved characters plus the
/// sub-delimiters that are legal inside a segment. `/`, `?`, `#`, `;`, `,`
/// and `%` are always encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

const DEFAULT_MAX_IDLE: usize = 64;

/// Mutable specification of one outgoing request.
#[derive(Debug, Default)]
pub(crate) struct Descriptor {
    method: Option<Method>,
    host: String,
    path: String,
    path_error: Option<String>,
    query: Option<Vec<(String, String)>>,
    headers: Option<Vec<(String, String)>>,
    cookies: Vec<(String, String)>,
    body: Option<Body>,
    body_error: Option<serde_json::Error>,
    credentials: Option<(String, String)>,
}

impl Descriptor {
    /// Return every field to its zero value, keeping string capacity.
    fn reset(&mut self) {
        self.method = None;
        self.host.clear();
        self.path.clear();
        self.path_error = None;
        self.query = None;
        self.headers = None;
        self.cookies.clear();
        self.body = None;
        self.body_error = None;
        self.credentials = None;
    }

    fn is_reset(&self) -> bool {
        self.method.is_none()
            && self.host.is_empty()
            && self.path.is_empty()
            && self.path_error.is_none()
            && self.query.is_none()
            && self.headers.is_none()
            && self.cookies.is_empty()
            && self.body.is_none()
            && self.body_error.is_none()
            && self.credentials.is_none()
    }

    fn push_segment(&mut self, segment: &str) {
        let segment = trim_segment(segment);
        if segment.is_empty() {
            return;
        }
        // A URL parser resolves these, which would retarget the request.
        if segment == "." || segment == ".." {
            self.fail_path(format!("path segment `{segment}` is not allowed"));
            return;
        }
        self.path.push('/');
        self.path.extend(utf8_percent_encode(segment, PATH_SEGMENT));
    }

    fn push_pair(&mut self, key: &str, value: &str) {
        if trim_segment(key).is_empty() || trim_segment(value).is_empty() {
            self.fail_path(format!("empty path pair `{key}/{value}`"));
            return;
        }
        self.push_segment(key);
        self.push_segment(value);
    }

    /// Keep the first path problem; it is reported by `build`.
    fn fail_path(&mut self, message: String) {
        self.path_error.get_or_insert(message);
    }

    fn assemble(&mut self) -> Result<reqwest::Request> {
        let method = self
            .method
            .clone()
            .ok_or_else(|| Error::Config("method is required".to_string()))?;
        if self.host.is_empty() {
            return Err(Error::Config("host is required".to_string()));
        }
        if let Some(message) = self.path_error.take() {
            return Err(Error::Config(message));
        }
        if let Some(err) = self.body_error.take() {
            return Err(Error::Json(err));
        }

        let mut url = Url::parse(&format!("{}{}", self.host, self.path))?;
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let mut request = reqwest::Request::new(method, url);
        let headers = request.headers_mut();

        if !self.cookies.is_empty() {
            let mut pairs = Vec::with_capacity(self.cookies.len());
            for (name, value) in &self.cookies {
                if !is_cookie_name(name) || !is_cookie_value(value) {
                    return Err(Error::InvalidHeader(format!("cookie {name}")));
                }
                pairs.push(format!("{name}={value}"));
            }
            let line = pairs.join("; ");
            headers.append(COOKIE, header_value(&line)?);
        }

        for (name, value) in self.headers.iter().flatten() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidHeader(name.clone()))?;
            headers.append(name, header_value(value)?);
        }

        if let Some((username, password)) = &self.credentials {
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            let mut value = header_value(&format!("Basic {encoded}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        *request.body_mut() = self.body.take();
        Ok(request)
    }
}

fn trim_segment(segment: &str) -> &str {
    segment.trim_start_matches('/').trim_end_matches('/')
}

/// RFC 6265 cookie-name: an HTTP token.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}

/// RFC 6265 cookie-octets, without the optional surrounding quotes.
fn is_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(value.to_string()))
}

/// Counters describing how a [`DescriptorPool`] has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Descriptors created because the free list was empty.
    pub allocated: usize,
    /// Descriptors handed out to builders.
    pub acquired: usize,
    /// Descriptors returned by builders.
    pub released: usize,
}

/// Thread-safe free list of reusable request descriptors.
///
/// Any number of tasks may acquire and release concurrently; each acquired
/// descriptor is owned by its [`RequestBuilder`] until that builder is built
/// or dropped.
#[derive(Debug)]
pub struct DescriptorPool {
    free: Mutex<Vec<Descriptor>>,
    max_idle: usize,
    allocated: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl Default for DescriptorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorPool {
    /// Create an empty pool keeping at most 64 idle descriptors.
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    /// Create an empty pool keeping at most `max_idle` idle descriptors.
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_idle,
            allocated: AtomicUsize::new(0),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Acquire a fresh builder backed by a pooled descriptor.
    pub fn builder(&self) -> RequestBuilder<'_> {
        RequestBuilder {
            pool: self,
            desc: Some(self.acquire()),
        }
    }

    /// Number of descriptors currently waiting on the free list.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }

    fn acquire(&self) -> Descriptor {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match reused {
            Some(desc) => desc,
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("allocating request descriptor");
                Descriptor::default()
            }
        }
    }

    fn release(&self, mut desc: Descriptor) {
        desc.reset();
        debug_assert!(desc.is_reset());
        self.released.fetch_add(1, Ordering::Relaxed);
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_idle {
            free.push(desc);
        }
    }
}

/// Fluent builder for one API request.
///
/// Obtained from [`DescriptorPool::builder`] or, pre-scoped to a domain,
/// from [`Client::scoped_builder`](crate::Client::scoped_builder).
#[derive(Debug)]
pub struct RequestBuilder<'p> {
    pool: &'p DescriptorPool,
    desc: Option<Descriptor>,
}

impl<'p> RequestBuilder<'p> {
    /// Acquire a builder from `pool`.
    pub fn new(pool: &'p DescriptorPool) -> Self {
        pool.builder()
    }

    fn desc(&mut self) -> &mut Descriptor {
        self.desc.get_or_insert_with(Descriptor::default)
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.desc().method = Some(method);
        self
    }

    /// Set the origin, e.g. `https://api.migadu.com`. A trailing `/` is dropped.
    pub fn host(mut self, host: &str) -> Self {
        let desc = self.desc();
        desc.host.clear();
        desc.host.push_str(host.trim_end_matches('/'));
        self
    }

    /// Append one escaped path segment.
    ///
    /// Leading and trailing `/` are trimmed before escaping, so
    /// `add_path("/a/")` followed by `add_path("b")` yields `/a/b`. Empty
    /// segments are skipped; `.` and `..` make [`build`](Self::build) fail.
    pub fn add_path(mut self, segment: &str) -> Self {
        self.desc().push_segment(segment);
        self
    }

    /// Append `/key/value`, e.g. `aliases/{local_part}`.
    ///
    /// An empty key or value is reported by [`build`](Self::build) as
    /// [`Error::Config`] instead of silently addressing the collection.
    pub fn add_restful_path(mut self, key: &str, value: &str) -> Self {
        self.desc().push_pair(key, value);
        self
    }

    /// Add a query parameter value, keeping existing values for `name`.
    pub fn add_value(mut self, name: &str, value: &str) -> Self {
        self.desc()
            .query
            .get_or_insert_with(Vec::new)
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Replace every value of query parameter `name` with `value`.
    pub fn set_value(mut self, name: &str, value: &str) -> Self {
        let query = self.desc().query.get_or_insert_with(Vec::new);
        query.retain(|(k, _)| k != name);
        query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a header value, keeping existing values for `name`.
    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.desc()
            .headers
            .get_or_insert_with(Vec::new)
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Replace every value of header `name` (case-insensitive) with `value`.
    pub fn set_header(mut self, name: &str, value: &str) -> Self {
        let headers = self.desc().headers.get_or_insert_with(Vec::new);
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Set `Content-Type: application/json`.
    pub fn json_content_type(self) -> Self {
        self.set_header(CONTENT_TYPE.as_str(), "application/json")
    }

    /// Credentials for HTTP basic authentication, applied at build time.
    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.desc().credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Append cookies to send with the request.
    pub fn cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.desc()
            .cookies
            .extend(cookies.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Serialize `value` as JSON and use it as the body.
    ///
    /// A serialization failure is reported by [`build`](Self::build) as
    /// [`Error::Json`].
    pub fn body_json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        let desc = self.desc();
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                desc.body = Some(Body::from(bytes));
                desc.body_error = None;
            }
            Err(err) => {
                desc.body = None;
                desc.body_error = Some(err);
            }
        }
        self
    }

    /// Use a raw body.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        let desc = self.desc();
        desc.body = Some(body.into());
        desc.body_error = None;
        self
    }

    /// Finalize into a [`reqwest::Request`].
    ///
    /// Fails with [`Error::Config`] when the method or host is missing, with
    /// [`Error::Json`] when a JSON body could not be encoded, with
    /// [`Error::Url`] when host and path don't form a URL, and with
    /// [`Error::InvalidHeader`] for unencodable headers. The descriptor is
    /// returned to the pool in every case.
    pub fn build(mut self) -> Result<reqwest::Request> {
        let mut desc = self.desc.take().unwrap_or_default();
        let result = desc.assemble();
        self.pool.release(desc);
        result
    }
}

impl Drop for RequestBuilder<'_> {
    fn drop(&mut self) {
        if let Some(desc) = self.desc.take() {
            self.pool.release(desc);
        }
    }
}
