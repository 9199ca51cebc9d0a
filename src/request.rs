//! Client-side request values.
use std::fmt;

use crate::message::MessageHead;
use crate::method::Method;
use crate::uri::Uri;

/// An HTTP Request
#[derive(Clone)]
pub struct Request {
    pub(crate) head: MessageHead,
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) target: Option<String>,
}

impl_message!(Request => head);

impl Request {
    /// Construct a new Request.
    ///
    /// The Host header is filled in from the URI when it has a host;
    /// version defaults to `HTTP/1.1` and the body starts empty.
    pub fn new(method: Method, uri: Uri) -> Request {
        let mut head = MessageHead::default();
        if let Some(value) = host_header(&uri) {
            head.headers
                .set("Host", &value)
                .expect("a parsed host is a valid header value");
        }
        Request {
            head,
            method,
            uri,
            target: None,
        }
    }

    /// Read the Request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Read the Request Uri.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request target.
    ///
    /// An explicitly set target wins; otherwise this is the origin-form of
    /// the URI (path plus query), or `/` when the path is empty.
    pub fn request_target(&self) -> String {
        if let Some(ref target) = self.target {
            return target.clone();
        }
        let path = self.uri.path();
        let mut target = if path.is_empty() {
            "/".to_owned()
        } else {
            path.to_owned()
        };
        if let Some(query) = self.uri.query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// Return a copy of this request with the given method.
    pub fn with_method(&self, method: Method) -> Request {
        let mut new = self.clone();
        new.method = method;
        new
    }

    /// Return a copy of this request with an explicit request target,
    /// overriding the one derived from the URI.
    pub fn with_request_target(&self, target: &str) -> Request {
        let mut new = self.clone();
        new.target = Some(target.to_owned());
        new
    }

    /// Return a copy of this request with the given URI.
    ///
    /// Unless `preserve_host` is set, the Host header is rewritten from
    /// the new URI whenever it has a host. With `preserve_host`, an
    /// existing Host header is kept, and one is only filled in from the
    /// URI when the header is missing.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Request {
        let mut new = self.clone();
        new.uri = uri;
        let host = host_header(&new.uri);
        let keep = preserve_host && new.head.headers.contains("Host");
        if !keep {
            if let Some(value) = host {
                new.head
                    .headers
                    .set("Host", &value)
                    .expect("a parsed host is a valid header value");
            }
        }
        new
    }
}

/// The Host header value for a URI: `host[:port]`, port elided when
/// default for the scheme.
fn host_header(uri: &Uri) -> Option<String> {
    let host = uri.host()?;
    Some(match uri.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    })
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("version", &self.head.version)
            .field("headers", &self.head.headers)
            .finish()
    }
}
