//! Request URL assembly.
//!
//! A request URL is made of a base *command URL* (`http://x.com/api`), an
//! optional command segment (`search`) and an ordered list of parameter
//! tokens (`q=hi`, `n=5`). [`UrlAssembler`] joins them, inserting `/`, `?`
//! and `&` only where they are not already present:
//!
//! ```rust
//! use rest_reader::assembler::UrlAssembler;
//! # fn main() -> rest_reader::errors::Result<()> {
//! let url = UrlAssembler::new("http://x.com/api")
//!     .command("search")
//!     .token("q=hi")
//!     .param("n", Some("5"))
//!     .build()?;
//! assert_eq!(url, "http://x.com/api/search?q=hi&n=5");
//! # Ok(()) }
//! ```
//!
//! Everything in here is pure string work; nothing touches the network.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

use crate::errors::{ApiError, Result};

pub const PARAM_START: &str = "?";
pub const COMMAND_URL_SEPARATOR: &str = "/";
pub const PARAM_SEPARATOR: &str = "&";

/// Everything but the unreserved characters of RFC 3986, so a value stays a
/// single path segment (`/` is escaped too).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Returns true if `url` ends with `separator`.
pub fn has_trailing_separator(url: &str, separator: &str) -> bool {
    !separator.is_empty() && url.ends_with(separator)
}

/// Drops exactly one trailing `separator` from `tokens`, if present.
pub fn drop_trailing_separator<'a>(tokens: &'a str, separator: &str) -> &'a str {
    if has_trailing_separator(tokens, separator) {
        &tokens[..tokens.len() - separator.len()]
    } else {
        tokens
    }
}

pub fn is_supported_charset(charset: &str) -> bool {
    matches!(charset.to_ascii_lowercase().as_str(), "utf-8" | "utf8")
}

/// Form-encodes a parameter value (space becomes `+`).
///
/// `None` is passed through as `None`; it is never replaced by an empty string.
pub fn encode_token(value: Option<&str>) -> Option<String> {
    value.map(|v| form_urlencoded::byte_serialize(v.as_bytes()).collect())
}

/// Like [`encode_token`], but fails for any charset other than UTF-8.
pub fn encode_token_with(value: Option<&str>, charset: &str) -> Result<Option<String>> {
    if !is_supported_charset(charset) {
        return Err(ApiError::Encoding {
            charset: charset.to_string(),
        });
    }
    Ok(encode_token(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    /// Preformatted `key=value`, used verbatim.
    Token(String),
    /// Key and raw value, encoded at build time.
    Param { key: String, value: Option<String> },
}

/// Builds a request URL out of a command URL, a command segment and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlAssembler {
    base: String,
    command: Option<String>,
    parts: Vec<Part>,
    charset: String,
}

impl UrlAssembler {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            command: None,
            parts: Vec::new(),
            charset: "utf-8".to_string(),
        }
    }

    pub fn command(mut self, segment: impl Into<String>) -> Self {
        self.command = Some(segment.into());
        self
    }

    /// Appends a token that is already formatted as `key=value`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.parts.push(Part::Token(token.into()));
        self
    }

    pub fn tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tokens.into_iter().fold(self, |acc, t| acc.token(t))
    }

    /// Appends `key=<encoded value>`. A `None` value produces no token at all.
    pub fn param(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.parts.push(Part::Param {
            key: key.into(),
            value: value.map(str::to_string),
        });
        self
    }

    /// Pairs parameter codes with values positionally; extra codes get no value.
    pub fn params<'a, K, V>(self, keys: K, values: V) -> Self
    where
        K: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = Option<&'a str>>,
    {
        let mut values = values.into_iter();
        keys.into_iter()
            .fold(self, |acc, key| acc.param(key, values.next().flatten()))
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Assembles the final URL string.
    ///
    /// Fails only with [`ApiError::Encoding`] when the configured charset is not UTF-8.
    pub fn build(&self) -> Result<String> {
        let mut url = self.base.clone();

        if let Some(command) = self.command.as_deref().filter(|c| !c.is_empty()) {
            let command = if has_trailing_separator(&url, COMMAND_URL_SEPARATOR) {
                command.strip_prefix(COMMAND_URL_SEPARATOR).unwrap_or(command)
            } else if command.starts_with(COMMAND_URL_SEPARATOR) {
                command
            } else {
                url.push_str(COMMAND_URL_SEPARATOR);
                command
            };
            url.push_str(command);
        }

        let mut tokens = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match part {
                Part::Token(token) => tokens.push(token.clone()),
                Part::Param { key, value } => {
                    if let Some(encoded) = encode_token_with(value.as_deref(), &self.charset)? {
                        tokens.push(format!("{key}={encoded}"));
                    }
                }
            }
        }

        let joined = tokens
            .iter()
            .filter(|t| !t.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(PARAM_SEPARATOR);
        let block = drop_trailing_separator(&joined, PARAM_SEPARATOR);

        if !block.is_empty() {
            if !url.contains(PARAM_START) {
                url.push_str(PARAM_START);
            } else if !has_trailing_separator(&url, PARAM_START)
                && !has_trailing_separator(&url, PARAM_SEPARATOR)
            {
                url.push_str(PARAM_SEPARATOR);
            }
            url.push_str(block);
        }

        Ok(url)
    }
}

/// A base URL with a single `{}` substitution point, e.g.
/// `https://api.heroku.com/apps/{}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub const PLACEHOLDER: &'static str = "{}";

    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        match template.matches(Self::PLACEHOLDER).count() {
            1 => Ok(Self { template }),
            0 => Err(ApiError::invalid_argument(template, "template has no '{}' placeholder")),
            _ => Err(ApiError::invalid_argument(template, "template has more than one '{}' placeholder")),
        }
    }

    /// Substitutes `value`, percent-encoded as a path segment (space becomes
    /// `%20`), into the placeholder.
    pub fn fill(&self, value: &str) -> String {
        let encoded = utf8_percent_encode(value, PATH_SEGMENT).to_string();
        self.template.replacen(Self::PLACEHOLDER, &encoded, 1)
    }

    pub fn assembler(&self, value: &str) -> UrlAssembler {
        UrlAssembler::new(self.fill(value))
    }
}
