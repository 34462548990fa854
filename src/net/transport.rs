//! `reqwest`-backed transport.
//!
//! Every [`HttpConnection`] buffers its configuration and request body and
//! sends the request the first time the response body is asked for. Status
//! codes of 400 and above are reported as I/O errors, so callers never get
//! an error page back as if it were a result.

use std::io::{self, BufRead, BufReader, Write};

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::redirect::Policy;
use url::Url;

use super::connection::{Connection, Connector};
use super::request::Method;
use crate::config::ExecutorConfig;
use crate::errors::Result;

/// Opens HTTP/1.1 connections with a shared pair of clients: one that follows
/// redirects and one that does not.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    following: Client,
    direct: Client,
}

impl HttpConnector {
    pub fn new(config: &ExecutorConfig) -> Result<Self> {
        let following = client_builder(config).build()?;
        let direct = client_builder(config).redirect(Policy::none()).build()?;
        Ok(Self { following, direct })
    }
}

fn client_builder(config: &ExecutorConfig) -> ClientBuilder {
    let builder = Client::builder();
    match &config.user_agent {
        Some(ua) => builder.user_agent(ua.clone()),
        None => builder,
    }
}

impl Connector for HttpConnector {
    fn open(&self, url: &Url) -> io::Result<Box<dyn Connection>> {
        Ok(Box::new(HttpConnection::new(
            url.clone(),
            self.following.clone(),
            self.direct.clone(),
        )))
    }
}

pub struct HttpConnection {
    url: Url,
    following: Client,
    direct: Client,
    method: Method,
    headers: Vec<(String, String)>,
    do_output: bool,
    follow_redirects: bool,
    use_caches: bool,
    body: Vec<u8>,
    response: Option<BufReader<Response>>,
}

impl HttpConnection {
    fn new(url: Url, following: Client, direct: Client) -> Self {
        Self {
            url,
            following,
            direct,
            method: Method::Get,
            headers: Vec::new(),
            do_output: false,
            follow_redirects: true,
            use_caches: true,
            body: Vec::new(),
            response: None,
        }
    }

    fn header_map(&self) -> io::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            headers.insert(name, value);
        }
        if !self.use_caches && !headers.contains_key(header::CACHE_CONTROL) {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }
        Ok(headers)
    }

    fn send(&mut self) -> io::Result<Response> {
        let headers = self.header_map()?;
        let body = std::mem::take(&mut self.body);
        let client = if self.follow_redirects { &self.following } else { &self.direct };

        let mut request = client
            .request(self.method.into(), self.url.clone())
            .headers(headers);
        if self.do_output {
            request = request.body(body);
        }

        let response = request.send().map_err(io::Error::other)?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(io::Error::other(format!(
                "server returned HTTP {} for {}",
                status, self.url
            )));
        }
        Ok(response)
    }
}

impl Connection for HttpConnection {
    fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    fn set_do_output(&mut self, enabled: bool) {
        self.do_output = enabled;
    }

    fn set_follow_redirects(&mut self, follow: bool) {
        self.follow_redirects = follow;
    }

    fn set_use_caches(&mut self, use_caches: bool) {
        self.use_caches = use_caches;
    }

    fn request_body(&mut self) -> io::Result<Box<dyn Write + '_>> {
        if !self.do_output {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "connection is not configured for output",
            ));
        }
        Ok(Box::new(&mut self.body))
    }

    fn response_body(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
        let reader = match self.response.take() {
            Some(reader) => reader,
            None => BufReader::new(self.send()?),
        };
        Ok(Box::new(self.response.insert(reader)))
    }

    fn disconnect(&mut self) {
        self.response = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::net::response::read_lines;
    use std::io::Read;
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Accepts one connection, records the raw request and answers with `reply`.
    pub(crate) fn serve_once(reply: String) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (Url::parse(&format!("http://{addr}/api")).unwrap(), handle)
    }

    pub(crate) fn reply(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            head.push_str(&line);
            if line == "\r\n" {
                break;
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();
        head + &String::from_utf8(body).unwrap()
    }

    fn connector() -> HttpConnector {
        HttpConnector::new(&ExecutorConfig::default()).unwrap()
    }

    #[test]
    fn get_reads_body_and_sends_headers() {
        let (url, server) = serve_once(reply("200 OK", "line one\nline two"));
        let mut conn = connector().open(&url).unwrap();
        conn.set_method(Method::Get);
        conn.set_header("X-Api-Key", "secret");

        let lines = read_lines(&mut conn.response_body().unwrap()).unwrap();
        conn.disconnect();

        assert_eq!(lines, vec!["line one", "line two"]);
        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /api http/1.1"));
        assert!(request.contains("x-api-key: secret"));
        assert!(request.contains("user-agent: rest-reader/"));
    }

    #[test]
    fn post_writes_buffered_body() {
        let (url, server) = serve_once(reply("200 OK", "ok"));
        let mut conn = connector().open(&url).unwrap();
        conn.set_method(Method::Post);
        conn.set_do_output(true);
        conn.set_use_caches(false);
        {
            let mut w = conn.request_body().unwrap();
            w.write_all(b"q=hi&n=5").unwrap();
            w.flush().unwrap();
        }

        let lines = read_lines(&mut conn.response_body().unwrap()).unwrap();
        assert_eq!(lines, vec!["ok"]);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api HTTP/1.1"));
        assert!(request.ends_with("\r\n\r\nq=hi&n=5"));
        assert!(request.to_ascii_lowercase().contains("cache-control: no-cache"));
    }

    #[test]
    fn error_status_is_an_io_error() {
        let (url, server) = serve_once(reply("404 Not Found", "nope"));
        let mut conn = connector().open(&url).unwrap();

        let err = conn.response_body().err().unwrap();
        assert!(err.to_string().contains("404"));
        server.join().unwrap();
    }

    #[test]
    fn redirect_is_returned_as_is_when_not_following() {
        let (url, server) = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: http://127.0.0.1:9/elsewhere\r\nContent-Length: 5\r\nConnection: close\r\n\r\nmoved"
                .to_string(),
        );
        let mut conn = connector().open(&url).unwrap();
        conn.set_follow_redirects(false);

        let lines = read_lines(&mut conn.response_body().unwrap()).unwrap();
        assert_eq!(lines, vec!["moved"]);
        server.join().unwrap();
    }

    #[test]
    fn body_requires_output_mode() {
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let mut conn = connector().open(&url).unwrap();
        let err = conn.request_body().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn invalid_header_name_fails_on_send() {
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let mut conn = connector().open(&url).unwrap();
        conn.set_header("bad header", "x");
        let err = conn.response_body().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
