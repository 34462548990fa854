//! HTTP request execution.
//!
//! [`RequestExecutor`] is the entry point; [`Connector`] / [`Connection`] are
//! the seam between it and the transport ([`HttpConnector`] by default).

mod connection;
mod executor;
mod request;
pub mod response;
mod transport;

pub use connection::{Connection, Connector};
pub use executor::RequestExecutor;
pub use request::{insert_header, Headers, Method, Request, CHARSET_HEADER, CONTENT_TYPE, CONTENT_TYPE_FORM};
pub use transport::{HttpConnection, HttpConnector};
