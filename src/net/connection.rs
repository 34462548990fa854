//! Transport seam.
//!
//! A [`Connector`] opens one [`Connection`] per exchange. The connection is
//! configured (method, headers, flags), optionally given a request body and
//! then asked for the response body. [`HttpConnector`](super::HttpConnector)
//! is the real implementation; tests plug in recording stubs.

use std::io::{self, BufRead, Write};
use std::ops::{Deref, DerefMut};

use url::Url;

use super::request::Method;

/// One HTTP exchange in progress.
///
/// Setters are infallible; problems with what was set surface when the
/// request is actually sent, i.e. from [`Connection::response_body`].
pub trait Connection {
    fn set_method(&mut self, method: Method);

    /// Sets a request header, replacing an earlier value for the same name.
    fn set_header(&mut self, name: &str, value: &str);

    /// Allows a request body to be written.
    fn set_do_output(&mut self, enabled: bool);

    fn set_follow_redirects(&mut self, follow: bool);

    fn set_use_caches(&mut self, use_caches: bool);

    /// Writer for the request body. Dropping the writer closes it.
    fn request_body(&mut self) -> io::Result<Box<dyn Write + '_>>;

    /// Sends the request (if not sent yet) and returns the response body.
    fn response_body(&mut self) -> io::Result<Box<dyn BufRead + '_>>;

    /// Releases the underlying connection. Must be safe to call more than once.
    fn disconnect(&mut self);
}

/// Opens connections for a target URL.
pub trait Connector: Send + Sync {
    fn open(&self, url: &Url) -> io::Result<Box<dyn Connection>>;
}

/// Owns an open connection and disconnects it when dropped.
pub(crate) struct ConnectionGuard {
    inner: Box<dyn Connection>,
}

impl ConnectionGuard {
    pub(crate) fn new(inner: Box<dyn Connection>) -> Self {
        Self { inner }
    }
}

impl Deref for ConnectionGuard {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ConnectionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.inner.disconnect();
        log::debug!(">>> Connection closed!");
    }
}
