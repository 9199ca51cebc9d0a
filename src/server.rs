//! Server-side request values.
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::message::Message;
use crate::method::Method;
use crate::request::Request;
use crate::uploaded::UploadedFile;
use crate::uri::{self, Uri};

/// An inbound HTTP request as seen by a server, carrying the
/// server-populated data alongside the plain [`Request`] surface.
///
/// `attributes` is the request's scratch space: values derived from the
/// request during handling (a route match, an authenticated user) travel
/// with the copy-on-write clones.
#[derive(Clone)]
pub struct ServerRequest {
    request: Request,
    server_params: HashMap<String, String>,
    cookie_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
    uploaded_files: HashMap<String, UploadedFile>,
    parsed_body: Option<Value>,
    attributes: HashMap<String, Value>,
}

impl_message!(ServerRequest => request.head);

impl ServerRequest {
    /// Construct a server request with no server params.
    pub fn new(method: Method, uri: Uri) -> ServerRequest {
        ServerRequest::from_request(Request::new(method, uri), HashMap::new())
    }

    /// Construct a server request from a plain request plus the
    /// environment the server captured for it.
    ///
    /// Query params are derived from the URI's query string, and cookie
    /// params from a `Cookie` header when one is present.
    pub fn from_request(
        request: Request,
        server_params: HashMap<String, String>,
    ) -> ServerRequest {
        let query_params = request
            .uri()
            .query()
            .map(parse_query)
            .unwrap_or_default();
        let cookie_params = request
            .header_line("Cookie")
            .map(|line| parse_cookies(&line))
            .unwrap_or_default();
        ServerRequest {
            request,
            server_params,
            cookie_params,
            query_params,
            uploaded_files: HashMap::new(),
            parsed_body: None,
            attributes: HashMap::new(),
        }
    }

    /// Read the request method.
    #[inline]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Read the request Uri.
    #[inline]
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// The request target (see [`Request::request_target`]).
    pub fn request_target(&self) -> String {
        self.request.request_target()
    }

    /// Return a copy of this request with the given method.
    pub fn with_method(&self, method: Method) -> ServerRequest {
        let mut new = self.clone();
        new.request = new.request.with_method(method);
        new
    }

    /// Return a copy of this request with the given URI (see
    /// [`Request::with_uri`] for the Host header rules). Query params are
    /// left as they were; use [`with_query_params`](Self::with_query_params)
    /// to change them.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> ServerRequest {
        let mut new = self.clone();
        new.request = new.request.with_uri(uri, preserve_host);
        new
    }

    /// Return a copy of this request with an explicit request target.
    pub fn with_request_target(&self, target: &str) -> ServerRequest {
        let mut new = self.clone();
        new.request = new.request.with_request_target(target);
        new
    }

    /// The environment the server captured when the request arrived.
    pub fn server_params(&self) -> &HashMap<String, String> {
        &self.server_params
    }

    /// The request's cookies.
    pub fn cookie_params(&self) -> &HashMap<String, String> {
        &self.cookie_params
    }

    /// The deserialized query string arguments.
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// The request's uploads, keyed by field name.
    pub fn uploaded_files(&self) -> &HashMap<String, UploadedFile> {
        &self.uploaded_files
    }

    /// The deserialized body, when something has parsed it.
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Read a single derived attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All derived attributes.
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Return a copy of this request with the given cookies.
    pub fn with_cookie_params(&self, cookies: HashMap<String, String>) -> ServerRequest {
        let mut new = self.clone();
        new.cookie_params = cookies;
        new
    }

    /// Return a copy of this request with the given query arguments.
    ///
    /// The URI's query string is deliberately left alone; the two need not
    /// agree.
    pub fn with_query_params(&self, params: HashMap<String, String>) -> ServerRequest {
        let mut new = self.clone();
        new.query_params = params;
        new
    }

    /// Return a copy of this request with the given uploads.
    pub fn with_uploaded_files(
        &self,
        files: HashMap<String, UploadedFile>,
    ) -> ServerRequest {
        let mut new = self.clone();
        new.uploaded_files = files;
        new
    }

    /// Return a copy of this request with the given parsed body; `None`
    /// clears it.
    pub fn with_parsed_body(&self, body: Option<Value>) -> ServerRequest {
        let mut new = self.clone();
        new.parsed_body = body;
        new
    }

    /// Return a copy of this request with a derived attribute set.
    pub fn with_attribute(&self, name: &str, value: Value) -> ServerRequest {
        let mut new = self.clone();
        new.attributes.insert(name.to_owned(), value);
        new
    }

    /// Return a copy of this request without the named attribute.
    pub fn without_attribute(&self, name: &str) -> ServerRequest {
        let mut new = self.clone();
        new.attributes.remove(name);
        new
    }
}

impl fmt::Debug for ServerRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ServerRequest")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("version", &self.version())
            .field("headers", self.headers())
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Deserialize a `k=v&k2=v2` query string, percent-decoding both sides
/// and treating `+` as a space. Later duplicates win.
fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = match pair.find('=') {
                Some(i) => (&pair[..i], &pair[i + 1..]),
                None => (pair, ""),
            };
            (uri::decode_component(key), uri::decode_component(value))
        })
        .collect()
}

/// Deserialize a `Cookie` header line: `name=value` pairs separated by
/// `;`.
fn parse_cookies(line: &str) -> HashMap<String, String> {
    line.split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            let i = pair.find('=')?;
            Some((pair[..i].to_owned(), pair[i + 1..].to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;

    use serde_json::json;

    use crate::message::Message;
    use crate::method::Method;
    use crate::request::Request;
    use crate::stream::Stream;
    use crate::uploaded::{UploadError, UploadedFile};
    use crate::uri::Uri;

    use super::ServerRequest;

    fn get(uri: &str) -> ServerRequest {
        ServerRequest::new(Method::Get, Uri::from_str(uri).unwrap())
    }

    #[test]
    fn query_params_derived_from_uri() {
        let req = get("http://example.com/search?q=hello+world&page=2");
        assert_eq!(req.query_params()["q"], "hello world");
        assert_eq!(req.query_params()["page"], "2");
    }

    #[test]
    fn query_params_decode_percent_sequences() {
        let req = get("/path?name=J%C3%BCrgen&flag");
        assert_eq!(req.query_params()["name"], "Jürgen");
        assert_eq!(req.query_params()["flag"], "");
    }

    #[test]
    fn cookie_params_derived_from_header() {
        let request = Request::new(Method::Get, Uri::from_str("/").unwrap())
            .with_header("Cookie", "session=abc123; theme=dark")
            .unwrap();
        let req = ServerRequest::from_request(request, HashMap::new());
        assert_eq!(req.cookie_params()["session"], "abc123");
        assert_eq!(req.cookie_params()["theme"], "dark");
    }

    #[test]
    fn server_params_are_kept_verbatim() {
        let mut env = HashMap::new();
        env.insert("REMOTE_ADDR".to_owned(), "203.0.113.9".to_owned());
        let req = ServerRequest::from_request(
            Request::new(Method::Get, Uri::from_str("/").unwrap()),
            env,
        );
        assert_eq!(req.server_params()["REMOTE_ADDR"], "203.0.113.9");
    }

    #[test]
    fn attributes_are_copy_on_write() {
        let req = get("/");
        let routed = req.with_attribute("route", json!("/users/{id}"));
        assert!(req.attribute("route").is_none());
        assert_eq!(*routed.attribute("route").unwrap(), "/users/{id}");

        let unrouted = routed.without_attribute("route");
        assert!(routed.attribute("route").is_some());
        assert!(unrouted.attribute("route").is_none());
    }

    #[test]
    fn parsed_body_is_copy_on_write() {
        let req = get("/");
        let parsed = req.with_parsed_body(Some(json!({"name": "octocat"})));
        assert!(req.parsed_body().is_none());
        assert_eq!(parsed.parsed_body().unwrap()["name"], "octocat");
        assert!(parsed.with_parsed_body(None).parsed_body().is_none());
    }

    #[test]
    fn uploaded_files_travel_with_the_request() {
        let mut files = HashMap::new();
        files.insert(
            "avatar".to_owned(),
            UploadedFile::new(Stream::from("png bytes"), Some(9), UploadError::Ok, None, None),
        );
        let req = get("/profile").with_uploaded_files(files);
        assert_eq!(req.uploaded_files().len(), 1);
        assert!(req.uploaded_files().contains_key("avatar"));
    }

    #[test]
    fn message_surface_is_shared_with_request() {
        let req = get("http://example.com/");
        assert_eq!(req.header("Host"), ["example.com"]);
        let tagged = req.with_header("X-Request-Id", "r-1").unwrap();
        assert!(!req.has_header("X-Request-Id"));
        assert_eq!(tagged.header_line("x-request-id").unwrap(), "r-1");
    }

    #[test]
    fn with_query_params_does_not_touch_the_uri() {
        let req = get("/list?page=1");
        let mut params = HashMap::new();
        params.insert("page".to_owned(), "9".to_owned());
        let repaged = req.with_query_params(params);
        assert_eq!(repaged.query_params()["page"], "9");
        assert_eq!(repaged.uri().query(), Some("page=1"));
        assert_eq!(req.query_params()["page"], "1");
    }
}
