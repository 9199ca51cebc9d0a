//! Error and Result module.
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Result type often returned from methods that can have `Error`s.
pub type Result<T> = ::std::result::Result<T, Error>;

type Cause = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur while constructing or using HTTP
/// message values.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: Kind,
    cause: Option<Cause>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Kind {
    Parse(Parse),
    /// Misuse of a `Stream` resource.
    Stream(StreamUse),
    /// An uploaded file was moved more than once.
    UploadMoved,
    /// The client reported an error for this upload.
    UploadFailed,
    /// User tried to render a response with a 1xx status code.
    UnsupportedStatusCode,
    /// An `io::Error` that occurred while reading or writing a stream.
    Io,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Parse {
    Method,
    Uri,
    Header,
    Status,
    Version,
}

#[derive(Debug, PartialEq)]
pub(crate) enum StreamUse {
    Closed,
    NotReadable,
    NotWritable,
    NotSeekable,
}

impl Error {
    /// Returns true if this was a parse error for a message component.
    pub fn is_parse(&self) -> bool {
        match self.inner.kind {
            Kind::Parse(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error came from misusing a `Stream`.
    pub fn is_stream(&self) -> bool {
        match self.inner.kind {
            Kind::Stream(_) => true,
            _ => false,
        }
    }

    /// Returns true if the stream in question was closed or detached.
    pub fn is_closed(&self) -> bool {
        self.inner.kind == Kind::Stream(StreamUse::Closed)
    }

    /// Returns true if this error came from an `UploadedFile` operation.
    pub fn is_upload(&self) -> bool {
        match self.inner.kind {
            Kind::UploadMoved | Kind::UploadFailed => true,
            _ => false,
        }
    }

    /// Returns true if this error was caused by user code.
    pub fn is_user(&self) -> bool {
        self.inner.kind == Kind::UnsupportedStatusCode
    }

    /// Returns true if an underlying IO operation failed.
    pub fn is_io(&self) -> bool {
        self.inner.kind == Kind::Io
    }

    /// Consumes the error, returning its cause.
    pub fn into_cause(self) -> Option<Box<dyn StdError + Send + Sync>> {
        self.inner.cause
    }

    pub(crate) fn new(kind: Kind, cause: Option<Cause>) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause }),
        }
    }

    pub(crate) fn new_method() -> Error {
        Error::new(Kind::Parse(Parse::Method), None)
    }

    pub(crate) fn new_uri() -> Error {
        Error::new(Kind::Parse(Parse::Uri), None)
    }

    pub(crate) fn new_header() -> Error {
        Error::new(Kind::Parse(Parse::Header), None)
    }

    pub(crate) fn new_status() -> Error {
        Error::new(Kind::Parse(Parse::Status), None)
    }

    pub(crate) fn new_version() -> Error {
        Error::new(Kind::Parse(Parse::Version), None)
    }

    pub(crate) fn new_stream_closed() -> Error {
        Error::new(Kind::Stream(StreamUse::Closed), None)
    }

    pub(crate) fn new_stream_not_readable() -> Error {
        Error::new(Kind::Stream(StreamUse::NotReadable), None)
    }

    pub(crate) fn new_stream_not_writable() -> Error {
        Error::new(Kind::Stream(StreamUse::NotWritable), None)
    }

    pub(crate) fn new_stream_not_seekable() -> Error {
        Error::new(Kind::Stream(StreamUse::NotSeekable), None)
    }

    pub(crate) fn new_upload_moved() -> Error {
        Error::new(Kind::UploadMoved, None)
    }

    pub(crate) fn new_upload_failed() -> Error {
        Error::new(Kind::UploadFailed, None)
    }

    pub(crate) fn new_user_unsupported_status_code() -> Error {
        Error::new(Kind::UnsupportedStatusCode, None)
    }

    pub(crate) fn new_io(cause: io::Error) -> Error {
        Error::new(Kind::Io, Some(cause.into()))
    }

    fn description(&self) -> &str {
        match self.inner.kind {
            Kind::Parse(Parse::Method) => "invalid Method specified",
            Kind::Parse(Parse::Uri) => "invalid URI",
            Kind::Parse(Parse::Header) => "invalid Header provided",
            Kind::Parse(Parse::Status) => "invalid Status provided",
            Kind::Parse(Parse::Version) => "invalid HTTP version specified",
            Kind::Stream(StreamUse::Closed) => "stream is closed or detached",
            Kind::Stream(StreamUse::NotReadable) => "stream is not readable",
            Kind::Stream(StreamUse::NotWritable) => "stream is not writable",
            Kind::Stream(StreamUse::NotSeekable) => "stream is not seekable",
            Kind::UploadMoved => "uploaded file has already been moved",
            Kind::UploadFailed => "upload failed with a client-reported error",
            Kind::UnsupportedStatusCode => {
                "response has 1xx status code, cannot be rendered"
            }
            Kind::Io => "an IO error occurred",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut f = f.debug_struct("Error");
        f.field("kind", &self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field("cause", cause);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref cause) = self.inner.cause {
            write!(f, "{}: {}", self.description(), cause)
        } else {
            f.write_str(self.description())
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

#[doc(hidden)]
trait AssertSendSync: Send + Sync + 'static {}
#[doc(hidden)]
impl AssertSendSync for Error {}
