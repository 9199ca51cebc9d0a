#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! # http-messages
//!
//! Immutable HTTP message value types: [`Uri`], [`Stream`], [`Request`],
//! [`Response`], [`ServerRequest`], and [`UploadedFile`], with a
//! case-insensitive [`Headers`] map shared by all of them.
//!
//! Every value follows the same copy-on-write discipline: `with_*`
//! methods never change the receiver, they return an adjusted copy. The
//! one thing copies share is the body — a [`Stream`] clone is a second
//! handle to the same underlying resource, which keeps message copies
//! cheap.
//!
//! ```
//! use http_messages::{Message, Method, Request, Response, Stream};
//!
//! let req = Request::new(Method::Get, "http://example.com/hello".parse().unwrap());
//! assert_eq!(req.header("Host"), ["example.com"]);
//!
//! let res = Response::new()
//!     .with_header("Content-Type", "text/plain").unwrap()
//!     .with_body(Stream::from("hello"));
//!
//! let mut wire = Vec::new();
//! res.render(&mut wire).unwrap();
//! assert!(wire.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

pub use crate::error::{Error, Result};
pub use crate::header::Headers;
pub use crate::message::Message;
pub use crate::method::Method;
pub use crate::request::Request;
pub use crate::response::Response;
pub use crate::server::ServerRequest;
pub use crate::status::StatusCode;
pub use crate::stream::{Metadata, OpenMode, Resource, Stream};
pub use crate::uploaded::{UploadError, UploadedFile};
pub use crate::uri::Uri;
pub use crate::version::HttpVersion;

pub mod error;
pub mod header;
#[macro_use]
mod message;
mod method;
mod request;
mod response;
mod server;
mod status;
pub mod stream;
mod uploaded;
mod uri;
mod version;
