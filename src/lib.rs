//! Helpers for talking to third-party REST APIs: assemble a request URL,
//! run one GET or POST against it and get the response back as text with
//! any `[...]` wrapping removed.
//!
//! ```no_run
//! use rest_reader::assembler::UrlAssembler;
//! use rest_reader::net::RequestExecutor;
//! use rest_reader::post;
//! # fn main() -> rest_reader::errors::Result<()> {
//! let url = UrlAssembler::new("http://www.muzu.tv/api")
//!     .command("search")
//!     .param("muzuid", Some("API_KEY"))
//!     .param("mySearch", Some("the script"))
//!     .param("format", Some("json"))
//!     .build()?;
//!
//! let text = RequestExecutor::new(&url)?.execute_get(None)?;
//! let videos = post::validate_json(&text)?;
//! # let _ = videos; Ok(()) }
//! ```

pub mod assembler;
pub mod config;
pub mod errors;
pub mod net;
pub mod post;

pub use errors::{ApiError, Result};
