//! The surface shared by requests and responses.
//!
//! Every message value is immutable: the `with_*` methods clone the
//! receiver, apply the change to the clone, and return it. The one caveat
//! is the body: a [`Stream`] clone shares its underlying handle, so a
//! message clone and its original read the same resource (see the
//! [`stream`](crate::stream) module docs).
use crate::error::Result;
use crate::header::Headers;
use crate::stream::Stream;
use crate::version::HttpVersion;

/// The parts common to every message: protocol version, header map, body.
#[derive(Clone, Debug, Default)]
pub(crate) struct MessageHead {
    pub(crate) version: HttpVersion,
    pub(crate) headers: Headers,
    pub(crate) body: Stream,
}

/// An HTTP message: the accessors and copy-on-write mutators common to
/// [`Request`](crate::Request), [`ServerRequest`](crate::ServerRequest),
/// and [`Response`](crate::Response).
pub trait Message: Clone {
    /// Get the HTTP version of this message.
    fn version(&self) -> HttpVersion;

    /// Get the headers of this message.
    fn headers(&self) -> &Headers;

    /// Get the body of this message.
    fn body(&self) -> &Stream;

    /// Return a copy of this message with the given HTTP version.
    fn with_version(&self, version: HttpVersion) -> Self;

    /// Return a copy of this message with the named header set to `value`,
    /// replacing any values previously set under the same
    /// (case-insensitive) name.
    fn with_header(&self, name: &str, value: &str) -> Result<Self>;

    /// Return a copy of this message with `value` appended to the named
    /// header, keeping values already set.
    fn with_added_header(&self, name: &str, value: &str) -> Result<Self>;

    /// Return a copy of this message without the named header.
    fn without_header(&self, name: &str) -> Self;

    /// Return a copy of this message with the given body.
    fn with_body(&self, body: Stream) -> Self;

    /// Get the values of a header field; empty when absent.
    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    /// Get the values of a header field joined with `", "`.
    fn header_line(&self, name: &str) -> Option<String> {
        self.headers().get_line(name)
    }

    /// Returns true if the named header is present.
    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }
}

/// Implements [`Message`] for a type holding a `MessageHead` at the given
/// field path.
macro_rules! impl_message {
    ($msg:ty => $($field:ident).+) => {
        impl crate::message::Message for $msg {
            fn version(&self) -> crate::version::HttpVersion {
                self $(. $field)+ .version
            }

            fn headers(&self) -> &crate::header::Headers {
                &self $(. $field)+ .headers
            }

            fn body(&self) -> &crate::stream::Stream {
                &self $(. $field)+ .body
            }

            fn with_version(&self, version: crate::version::HttpVersion) -> Self {
                let mut new = self.clone();
                new $(. $field)+ .version = version;
                new
            }

            fn with_header(&self, name: &str, value: &str) -> crate::error::Result<Self> {
                let mut new = self.clone();
                new $(. $field)+ .headers.set(name, value)?;
                Ok(new)
            }

            fn with_added_header(&self, name: &str, value: &str) -> crate::error::Result<Self> {
                let mut new = self.clone();
                new $(. $field)+ .headers.add(name, value)?;
                Ok(new)
            }

            fn without_header(&self, name: &str) -> Self {
                let mut new = self.clone();
                new $(. $field)+ .headers.remove(name);
                new
            }

            fn with_body(&self, body: crate::stream::Stream) -> Self {
                let mut new = self.clone();
                new $(. $field)+ .body = body;
                new
            }
        }
    };
}
