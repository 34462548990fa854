//! Request executor.
//!
//! [`RequestExecutor`] performs exactly one HTTP exchange per call against
//! the URL it was built with and returns the unwrapped response text.
//!
//! ## Lifecycle of a call
//! `idle → connecting → reading → closed`. The connection is owned by a
//! guard that calls [`Connection::disconnect`](super::Connection::disconnect) when the call ends, on the
//! success path and on every failure path, before the error is handed back.
//!
//! ## State
//! Each call reads into its own accumulator, so a result only ever holds the
//! lines of its own exchange. The only state kept between calls is the
//! cumulative header set from [`RequestExecutor::set_header`]. Calls take
//! `&self`, so one executor can be shared between threads.
//!
//! ```no_run
//! use rest_reader::net::RequestExecutor;
//! # fn main() -> rest_reader::errors::Result<()> {
//! let mut executor = RequestExecutor::new("http://www.muzu.tv/api/search?mySearch=the+script")?;
//! executor.set_header("Accept", "application/json");
//! let text = executor.execute_get(None)?;
//! # let _ = text; Ok(()) }
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use url::Url;

use super::connection::{ConnectionGuard, Connector};
use super::request::{insert_header, Headers, Request};
use super::response::{into_result, read_lines};
use super::transport::HttpConnector;
use crate::assembler::UrlAssembler;
use crate::config::ExecutorConfig;
use crate::errors::{ApiError, Result};

pub struct RequestExecutor {
    url: Url,
    headers: Headers,
    charset: String,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Creates an executor for `url` with the default configuration.
    ///
    /// Fails with [`ApiError::InvalidArgument`] if `url` does not parse.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, ExecutorConfig::default())
    }

    pub fn with_config(url: &str, config: ExecutorConfig) -> Result<Self> {
        let url = parse_url(url)?;
        config.validate()?;
        let connector = Arc::new(HttpConnector::new(&config)?);
        Ok(Self::assemble(url, config, connector))
    }

    pub fn from_assembler(assembler: &UrlAssembler) -> Result<Self> {
        Self::new(&assembler.build()?)
    }

    /// Creates an executor that opens its connections through `connector`.
    pub fn with_connector(url: &str, config: ExecutorConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        let url = parse_url(url)?;
        config.validate()?;
        Ok(Self::assemble(url, config, connector))
    }

    fn assemble(url: Url, config: ExecutorConfig, connector: Arc<dyn Connector>) -> Self {
        let mut headers = Headers::new();
        for (name, value) in config.default_headers {
            insert_header(&mut headers, name, value);
        }
        Self {
            url,
            headers,
            charset: config.charset,
            connector,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers sent with every request, in addition to per-call ones.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Adds (or replaces) a header sent with every following request.
    ///
    /// Names are compared without regard to case. Headers accumulate; there
    /// is no way to remove one.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        insert_header(&mut self.headers, name, value);
        self
    }

    /// Performs a GET with the executor's headers plus `headers` for this call only.
    pub fn execute_get(&self, headers: Option<&Headers>) -> Result<String> {
        let request = Request::get(self.url.clone())
            .with_headers(&self.headers)
            .with_headers(headers.into_iter().flatten());
        self.execute(&request)
    }

    /// Performs a form POST. `body` is written to the connection only if it is `Some`.
    pub fn execute_post(&self, body: Option<&str>) -> Result<String> {
        let request = Request::post(self.url.clone(), body.map(str::to_string), &self.charset)
            .with_headers(&self.headers);
        self.execute(&request)
    }

    /// Runs a prebuilt request through this executor's connector.
    pub fn execute(&self, request: &Request) -> Result<String> {
        let url = request.url();
        log::info!(">>> Connecting to URL: <{url}>, this may take a moment.");

        // The connection is already released once `exchange` returns.
        self.exchange(request).map_err(|source| {
            log::error!(">>> Error connecting to the website: {url}");
            log::error!("Error due to: {source}");
            ApiError::Network {
                url: url.to_string(),
                source,
            }
        })
    }

    fn exchange(&self, request: &Request) -> io::Result<String> {
        let mut conn = ConnectionGuard::new(self.connector.open(request.url())?);

        conn.set_method(request.method());
        if request.has_output() {
            conn.set_do_output(true);
        }
        conn.set_follow_redirects(request.follow_redirects());
        conn.set_use_caches(request.use_caches());
        for (name, value) in request.headers() {
            conn.set_header(name, value);
        }

        if let Some(body) = request.body() {
            log::debug!("url parameter: {body}");
            let mut writer = conn.request_body()?;
            writer.write_all(body.as_bytes())?;
            writer.flush()?;
            drop(writer);
        }

        log::info!(">>> Reading results returned, this may take a moment...");
        let lines = read_lines(&mut conn.response_body()?)?;
        log::info!(">>> Reading completed...");

        Ok(into_result(lines))
    }
}

fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|e| {
        log::error!(">>> Input URL String: {input}");
        log::error!("Error due to: {e}");
        ApiError::invalid_argument(input, e)
    })
}
