//! Server-side response values.
use std::fmt;
use std::io::Write;
use std::time::SystemTime;

use log::debug;

use crate::error::{Error, Result};
use crate::message::MessageHead;
use crate::status::StatusCode;
use crate::version::HttpVersion;

const AVERAGE_HEADER_SIZE: usize = 30;

/// An HTTP Response
#[derive(Clone)]
pub struct Response {
    pub(crate) head: MessageHead,
    status: StatusCode,
    reason: Option<String>,
}

impl_message!(Response => head);

impl Response {
    /// Constructs a default response: `200 OK`, `HTTP/1.1`, empty body.
    pub fn new() -> Response {
        Response::default()
    }

    /// Get the status of this response.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase to send with the status line.
    ///
    /// A custom phrase set via [`with_status_reason`](Self::with_status_reason)
    /// wins; otherwise the canonical phrase for the code, or the empty
    /// string when the code is unregistered.
    pub fn reason_phrase(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }

    /// Return a copy of this response with the given status and its
    /// canonical reason phrase.
    pub fn with_status(&self, status: StatusCode) -> Response {
        let mut new = self.clone();
        new.status = status;
        new.reason = None;
        new
    }

    /// Return a copy of this response with the given status and a custom
    /// reason phrase.
    pub fn with_status_reason(&self, status: StatusCode, reason: &str) -> Response {
        let mut new = self.clone();
        new.status = status;
        new.reason = Some(reason.to_owned());
        new
    }

    /// Emit the status line, headers, and body to `dst`.
    ///
    /// A `Date` header is filled in when absent, and a `Content-Length`
    /// when absent and the body size is known. A seekable body is rewound
    /// before it is streamed. Returns the total number of bytes written.
    ///
    /// Like a server, this refuses to emit a 1xx status as the final
    /// response.
    pub fn render<W: Write>(&self, dst: &mut W) -> Result<u64> {
        if self.status.is_informational() {
            return Err(Error::new_user_unsupported_status_code());
        }
        debug!("Response.render() status={}", self.status);

        let headers = &self.head.headers;
        let mut buf: Vec<u8> = Vec::with_capacity(30 + headers.len() * AVERAGE_HEADER_SIZE);
        if self.head.version == HttpVersion::Http11
            && self.status == StatusCode::OK
            && self.reason.is_none()
        {
            extend(&mut buf, b"HTTP/1.1 200 OK\r\n");
        } else {
            extend(&mut buf, self.head.version.as_str().as_bytes());
            extend(&mut buf, b" ");
            let mut code = itoa::Buffer::new();
            extend(&mut buf, code.format(self.status.as_u16()).as_bytes());
            let reason = self.reason_phrase();
            if !reason.is_empty() {
                extend(&mut buf, b" ");
                extend(&mut buf, reason.as_bytes());
            }
            extend(&mut buf, b"\r\n");
        }

        for (name, values) in headers.iter() {
            for value in values {
                extend(&mut buf, name.as_bytes());
                extend(&mut buf, b": ");
                extend(&mut buf, value.as_bytes());
                extend(&mut buf, b"\r\n");
            }
        }
        if !headers.contains("Date") {
            extend(&mut buf, b"Date: ");
            extend(&mut buf, httpdate::fmt_http_date(SystemTime::now()).as_bytes());
            extend(&mut buf, b"\r\n");
        }
        let body = &self.head.body;
        if !headers.contains("Content-Length") {
            if let Some(size) = body.size() {
                extend(&mut buf, b"Content-Length: ");
                let mut length = itoa::Buffer::new();
                extend(&mut buf, length.format(size).as_bytes());
                extend(&mut buf, b"\r\n");
            }
        }
        extend(&mut buf, b"\r\n");

        dst.write_all(&buf).map_err(Error::new_io)?;
        let mut written = buf.len() as u64;

        if body.is_readable() {
            if body.is_seekable() {
                body.rewind()?;
            }
            loop {
                let chunk = body.read(8 * 1024)?;
                if chunk.is_empty() {
                    break;
                }
                dst.write_all(&chunk).map_err(Error::new_io)?;
                written += chunk.len() as u64;
            }
        }
        dst.flush().map_err(Error::new_io)?;
        Ok(written)
    }
}

impl Default for Response {
    fn default() -> Response {
        Response {
            head: MessageHead::default(),
            status: StatusCode::default(),
            reason: None,
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("version", &self.head.version)
            .field("headers", &self.head.headers)
            .finish()
    }
}

fn extend(dst: &mut Vec<u8>, data: &[u8]) {
    dst.extend_from_slice(data);
}
