//! Request descriptor.
//!
//! A [`Request`] describes one HTTP exchange: target URL, method, optional
//! body, headers and the two connection flags POST requests change
//! (redirect following and caching). It is built fresh for every call and
//! is read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

/// Header name to value. Keys are unique; a later insert replaces the value.
pub type Headers = BTreeMap<String, String>;

/// Inserts `name: value`, replacing any entry whose name differs only in case.
///
/// The spelling of the latest insert is the one kept.
pub fn insert_header(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value.into());
}

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CHARSET_HEADER: &str = "charset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
    method: Method,
    body: Option<String>,
    headers: Headers,
    follow_redirects: bool,
    use_caches: bool,
}

impl Request {
    /// A plain GET: redirects followed, caching left to the transport.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::Get,
            body: None,
            headers: Headers::new(),
            follow_redirects: true,
            use_caches: true,
        }
    }

    /// A form POST: no redirects, no caches, form content type and `charset` header.
    ///
    /// The body is only written to the connection when it is `Some`.
    pub fn post(url: Url, body: Option<String>, charset: &str) -> Self {
        let mut headers = Headers::new();
        insert_header(&mut headers, CONTENT_TYPE, CONTENT_TYPE_FORM);
        insert_header(&mut headers, CHARSET_HEADER, charset);

        Self {
            url,
            method: Method::Post,
            body,
            headers,
            follow_redirects: false,
            use_caches: false,
        }
    }

    /// Adds `headers` on top of the ones already present; same names are
    /// replaced, compared without regard to case.
    pub fn with_headers<'a, I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in headers {
            insert_header(&mut self.headers, name.as_str(), value.as_str());
        }
        self
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn method(&self) -> Method { self.method }
    pub fn body(&self) -> Option<&str> { self.body.as_deref() }
    pub fn headers(&self) -> &Headers { &self.headers }
    pub fn follow_redirects(&self) -> bool { self.follow_redirects }
    pub fn use_caches(&self) -> bool { self.use_caches }

    /// True when the connection has to accept a request body.
    pub fn has_output(&self) -> bool {
        self.method == Method::Post
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u() -> Url {
        Url::parse("http://restapiunifier.com/").unwrap()
    }

    #[test]
    fn get_defaults() {
        let r = Request::get(u());
        assert_eq!(r.method(), Method::Get);
        assert!(r.body().is_none());
        assert!(r.headers().is_empty());
        assert!(r.follow_redirects());
        assert!(!r.has_output());
    }

    #[test]
    fn post_sets_form_headers_and_flags() {
        let r = Request::post(u(), Some("a=1".into()), "utf-8");
        assert_eq!(r.method(), Method::Post);
        assert_eq!(r.body(), Some("a=1"));
        assert_eq!(r.headers().get("Content-Type").map(String::as_str), Some(CONTENT_TYPE_FORM));
        assert_eq!(r.headers().get("charset").map(String::as_str), Some("utf-8"));
        assert!(!r.follow_redirects());
        assert!(!r.use_caches());
        assert!(r.has_output());
    }

    #[test]
    fn later_headers_replace_same_name() {
        let mut base = Headers::new();
        base.insert("X-A".into(), "1".into());
        base.insert("X-B".into(), "1".into());
        let mut call = Headers::new();
        call.insert("X-B".into(), "2".into());

        let r = Request::get(u()).with_headers(&base).with_headers(&call);
        assert_eq!(r.headers().len(), 2);
        assert_eq!(r.headers()["X-A"], "1");
        assert_eq!(r.headers()["X-B"], "2");
    }

    #[test]
    fn header_names_differing_in_case_are_one_header() {
        let mut base = Headers::new();
        base.insert("accept".into(), "text/plain".into());
        let mut call = Headers::new();
        call.insert("Accept".into(), "application/json".into());

        let r = Request::get(u()).with_headers(&base).with_headers(&call);
        assert_eq!(r.headers().len(), 1);
        assert_eq!(r.headers()["Accept"], "application/json");

        let mut h = Headers::new();
        insert_header(&mut h, "X-Key", "1");
        insert_header(&mut h, "x-key", "2");
        assert_eq!(h.into_iter().collect::<Vec<_>>(), vec![("x-key".to_string(), "2".to_string())]);
    }

    #[test]
    fn post_caller_headers_override_form_headers_in_any_case() {
        let mut extra = Headers::new();
        extra.insert("content-type".into(), "text/plain".into());
        let r = Request::post(u(), None, "utf-8").with_headers(&extra);
        assert_eq!(r.headers().len(), 2);
        assert_eq!(r.headers()["content-type"], "text/plain");
        assert!(!r.headers().contains_key(CONTENT_TYPE));
    }

    #[test]
    fn method_maps_to_http_method() {
        assert_eq!(http::Method::from(Method::Get), http::Method::GET);
        assert_eq!(http::Method::from(Method::Post), http::Method::POST);
        assert_eq!(Method::Post.to_string(), "POST");
    }
}
