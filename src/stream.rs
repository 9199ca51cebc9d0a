//! Streams of message body data.
//!
//! A `Stream` wraps a byte-oriented resource behind a shared handle. The
//! handle is the identity: cloning a `Stream` clones the handle, not the
//! bytes, so a body shared between two message clones reads and seeks as
//! one resource. This is what makes copy-on-write message clones cheap.
//!
//! Misusing a stream (reading a write-only resource, seeking a pipe,
//! touching a closed handle) fails with an informative [`Error`] rather
//! than panicking.
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use log::{debug, trace};

use crate::error::{Error, Result};

/// How a file-backed stream is opened, mirroring the classic mode strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum OpenMode {
    /// `r`: read-only, the file must exist.
    Read,
    /// `w`: write-only, created or truncated.
    Write,
    /// `w+`: read-write, created or truncated.
    ReadWrite,
    /// `a`: write-only, created, every write appends.
    Append,
}

impl OpenMode {
    /// The classic mode string for this mode.
    pub fn as_str(&self) -> &'static str {
        match *self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::ReadWrite => "w+",
            OpenMode::Append => "a",
        }
    }

    fn readable(&self) -> bool {
        match *self {
            OpenMode::Read | OpenMode::ReadWrite => true,
            _ => false,
        }
    }

    fn writable(&self) -> bool {
        match *self {
            OpenMode::Write | OpenMode::ReadWrite | OpenMode::Append => true,
            _ => false,
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource underneath a [`Stream`], yielded back by
/// [`Stream::detach`].
pub enum Resource {
    /// An in-memory buffer.
    Buffer(Cursor<Vec<u8>>),
    /// An open file.
    File(File),
    /// An opaque reader: a pipe, a socket, anything byte-oriented that
    /// cannot seek.
    Reader(Box<dyn Read + Send>),
}

impl Resource {
    fn stream_type(&self) -> &'static str {
        match *self {
            Resource::Buffer(_) => "memory",
            Resource::File(_) => "file",
            Resource::Reader(_) => "reader",
        }
    }

    fn size(&self) -> Option<u64> {
        match *self {
            Resource::Buffer(ref cursor) => Some(cursor.get_ref().len() as u64),
            Resource::File(ref file) => file.metadata().ok().map(|m| m.len()),
            Resource::Reader(_) => None,
        }
    }
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self {
            Resource::Buffer(ref mut cursor) => cursor.read(buf),
            Resource::File(ref mut file) => file.read(buf),
            Resource::Reader(ref mut reader) => reader.read(buf),
        }
    }
}

impl Write for Resource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self {
            Resource::Buffer(ref mut cursor) => cursor.write(buf),
            Resource::File(ref mut file) => file.write(buf),
            Resource::Reader(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                "reader resources are not writable",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            Resource::Buffer(_) => Ok(()),
            Resource::File(ref mut file) => file.flush(),
            Resource::Reader(_) => Ok(()),
        }
    }
}

impl Seek for Resource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match *self {
            Resource::Buffer(ref mut cursor) => cursor.seek(pos),
            Resource::File(ref mut file) => file.seek(pos),
            Resource::Reader(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                "reader resources are not seekable",
            )),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.stream_type())
    }
}

struct Inner {
    /// `None` once closed or detached.
    resource: Option<Resource>,
    readable: bool,
    writable: bool,
    seekable: bool,
    mode: &'static str,
    uri: Option<String>,
    /// Bytes consumed; authoritative only for non-seekable readers.
    pos: u64,
    /// Set once a read comes back empty, cleared by seeking.
    eof: bool,
}

/// A byte-oriented message body resource.
///
/// See the [module docs](self) for the sharing semantics.
#[derive(Clone)]
pub struct Stream {
    shared: Arc<Mutex<Inner>>,
}

impl Stream {
    fn new(resource: Resource, readable: bool, writable: bool, seekable: bool,
           mode: &'static str, uri: Option<String>) -> Stream {
        Stream {
            shared: Arc::new(Mutex::new(Inner {
                resource: Some(resource),
                readable,
                writable,
                seekable,
                mode,
                uri,
                pos: 0,
                eof: false,
            })),
        }
    }

    /// An empty, readable, writable, seekable in-memory stream.
    pub fn empty() -> Stream {
        Stream::from(Vec::new())
    }

    /// Wrap an already-open file.
    ///
    /// `mode` must describe how `file` was opened; the stream's capability
    /// flags are derived from it.
    pub fn from_file(file: File, mode: OpenMode) -> Stream {
        Stream::new(
            Resource::File(file),
            mode.readable(),
            mode.writable(),
            true,
            mode.as_str(),
            None,
        )
    }

    /// Open a file at `path` as a stream.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Stream> {
        let path = path.as_ref();
        debug!("Stream.open( {:?}, {} )", path, mode);
        let mut opts = OpenOptions::new();
        match mode {
            OpenMode::Read => opts.read(true),
            OpenMode::Write => opts.write(true).create(true).truncate(true),
            OpenMode::ReadWrite => opts.read(true).write(true).create(true).truncate(true),
            OpenMode::Append => opts.append(true).create(true),
        };
        let file = opts.open(path).map_err(Error::new_io)?;
        Ok(Stream::new(
            Resource::File(file),
            mode.readable(),
            mode.writable(),
            true,
            mode.as_str(),
            Some(path.display().to_string()),
        ))
    }

    /// Wrap an opaque reader: readable, not writable, not seekable.
    pub fn reader(reader: Box<dyn Read + Send>) -> Stream {
        Stream::new(Resource::Reader(reader), true, false, false, "r", None)
    }

    fn lock(&self) -> MutexGuard<Inner> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the stream can be read from.
    pub fn is_readable(&self) -> bool {
        let inner = self.lock();
        inner.resource.is_some() && inner.readable
    }

    /// Whether the stream can be written to.
    pub fn is_writable(&self) -> bool {
        let inner = self.lock();
        inner.resource.is_some() && inner.writable
    }

    /// Whether the stream can seek.
    pub fn is_seekable(&self) -> bool {
        let inner = self.lock();
        inner.resource.is_some() && inner.seekable
    }

    /// Read up to `n` bytes from the current position.
    ///
    /// A shorter (or empty) result means the stream ran out of data.
    pub fn read(&self, n: usize) -> Result<Bytes> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let readable = inner.readable;
        let resource = inner.resource.as_mut().ok_or_else(Error::new_stream_closed)?;
        if !readable {
            return Err(Error::new_stream_not_readable());
        }
        let mut buf = Vec::with_capacity(n.min(8 * 1024));
        resource
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(Error::new_io)?;
        inner.pos += buf.len() as u64;
        if buf.is_empty() && n > 0 {
            inner.eof = true;
        }
        Ok(Bytes::from(buf))
    }

    /// Read the remainder of the stream, from the current position to the
    /// end.
    pub fn contents(&self) -> Result<Bytes> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let readable = inner.readable;
        let resource = inner.resource.as_mut().ok_or_else(Error::new_stream_closed)?;
        if !readable {
            return Err(Error::new_stream_not_readable());
        }
        let mut buf = Vec::new();
        resource.read_to_end(&mut buf).map_err(Error::new_io)?;
        inner.pos += buf.len() as u64;
        inner.eof = true;
        Ok(Bytes::from(buf))
    }

    /// Write `data` at the current position, returning how many bytes were
    /// written.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let writable = inner.writable;
        let resource = inner.resource.as_mut().ok_or_else(Error::new_stream_closed)?;
        if !writable {
            return Err(Error::new_stream_not_writable());
        }
        let n = resource.write(data).map_err(Error::new_io)?;
        inner.pos += n as u64;
        Ok(n)
    }

    /// Seek to a position, returning the new offset from the start.
    pub fn seek(&self, pos: SeekFrom) -> Result<u64> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let seekable = inner.seekable;
        let resource = inner.resource.as_mut().ok_or_else(Error::new_stream_closed)?;
        if !seekable {
            return Err(Error::new_stream_not_seekable());
        }
        let offset = resource.seek(pos).map_err(Error::new_io)?;
        inner.pos = offset;
        inner.eof = false;
        Ok(offset)
    }

    /// Seek back to the beginning of the stream.
    pub fn rewind(&self) -> Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// The current position in the stream.
    ///
    /// For a seekable resource this is its real offset, so it stays honest
    /// for append-mode files and handles that were seeked before being
    /// wrapped. An opaque reader reports the number of bytes consumed.
    pub fn tell(&self) -> Result<u64> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        let seekable = inner.seekable;
        let resource = inner.resource.as_mut().ok_or_else(Error::new_stream_closed)?;
        if !seekable {
            return Ok(inner.pos);
        }
        let offset = resource
            .seek(SeekFrom::Current(0))
            .map_err(Error::new_io)?;
        inner.pos = offset;
        Ok(offset)
    }

    /// Whether the stream has hit end-of-data.
    ///
    /// Like the classic `feof`, this only turns true after a read has come
    /// back empty; a closed or detached stream also reports true.
    pub fn eof(&self) -> bool {
        let inner = self.lock();
        match inner.resource {
            Some(_) => inner.eof,
            None => true,
        }
    }

    /// The total size of the underlying resource, when known.
    pub fn size(&self) -> Option<u64> {
        let inner = self.lock();
        inner.resource.as_ref().and_then(Resource::size)
    }

    /// A snapshot of the stream's metadata.
    pub fn metadata(&self) -> Result<Metadata> {
        let inner = self.lock();
        let resource = inner.resource.as_ref().ok_or_else(Error::new_stream_closed)?;
        Ok(Metadata {
            stream_type: resource.stream_type(),
            mode: inner.mode,
            seekable: inner.seekable,
            eof: inner.eof,
            uri: inner.uri.clone(),
        })
    }

    /// Close the stream, dropping the underlying resource.
    ///
    /// Closing an already-closed stream is a no-op. Every clone of this
    /// handle sees the stream as closed.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.resource.take().is_some() {
            trace!("Stream.close() uri={:?}", inner.uri);
        }
    }

    /// Detach the underlying resource from the stream.
    ///
    /// The stream (and every clone of the handle) is unusable afterwards.
    /// Returns `None` if the stream was already closed or detached.
    pub fn detach(&self) -> Option<Resource> {
        let mut inner = self.lock();
        inner.readable = false;
        inner.writable = false;
        inner.seekable = false;
        inner.resource.take()
    }
}

impl From<Vec<u8>> for Stream {
    fn from(data: Vec<u8>) -> Stream {
        Stream::new(
            Resource::Buffer(Cursor::new(data)),
            true,
            true,
            true,
            "w+",
            None,
        )
    }
}

impl From<Bytes> for Stream {
    fn from(data: Bytes) -> Stream {
        Stream::from(data.to_vec())
    }
}

impl From<&str> for Stream {
    fn from(data: &str) -> Stream {
        Stream::from(data.as_bytes().to_vec())
    }
}

impl From<String> for Stream {
    fn from(data: String) -> Stream {
        Stream::from(data.into_bytes())
    }
}

impl Default for Stream {
    fn default() -> Stream {
        Stream::empty()
    }
}

/// Renders the full contents of a readable, seekable stream, rewinding it
/// first. Anything else renders as the empty string; this never fails.
impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_readable() && self.is_seekable() && self.rewind().is_ok() {
            if let Ok(bytes) = self.contents() {
                return f.write_str(&String::from_utf8_lossy(&bytes));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Stream")
            .field("resource", &inner.resource)
            .field("mode", &inner.mode)
            .field("pos", &inner.pos)
            .field("eof", &inner.eof)
            .finish()
    }
}

/// Metadata about a [`Stream`], in the shape the classic
/// `stream_get_meta_data` reports it.
#[derive(Clone, Debug)]
pub struct Metadata {
    stream_type: &'static str,
    mode: &'static str,
    seekable: bool,
    eof: bool,
    uri: Option<String>,
}

impl Metadata {
    /// The kind of resource: `memory`, `file`, or `reader`.
    pub fn stream_type(&self) -> &'static str {
        self.stream_type
    }

    /// The mode string the resource was opened with.
    pub fn mode(&self) -> &'static str {
        self.mode
    }

    /// Whether the resource can seek.
    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// Whether the stream has hit end-of-data.
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// The path the resource was opened from, when there is one.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Seek, SeekFrom};
    use std::path::PathBuf;

    use super::{OpenMode, Stream};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("http-messages-stream-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn read_write_seek_buffer() {
        let stream = Stream::empty();
        assert_eq!(stream.write(b"hello world").unwrap(), 11);
        assert_eq!(stream.tell().unwrap(), 11);

        stream.rewind().unwrap();
        assert_eq!(&stream.read(5).unwrap()[..], b"hello");
        assert_eq!(stream.tell().unwrap(), 5);
        assert_eq!(&stream.contents().unwrap()[..], b" world");
        assert_eq!(stream.size(), Some(11));
    }

    #[test]
    fn eof_after_empty_read() {
        let stream = Stream::from("abc");
        assert!(!stream.eof());
        stream.contents().unwrap();
        assert!(stream.eof());
        // seeking clears the flag
        stream.seek(SeekFrom::Start(0)).unwrap();
        assert!(!stream.eof());
    }

    #[test]
    fn short_read_past_end() {
        let stream = Stream::from("abc");
        assert_eq!(&stream.read(10).unwrap()[..], b"abc");
        assert_eq!(&stream.read(10).unwrap()[..], b"");
        assert!(stream.eof());
    }

    #[test]
    fn clones_share_the_handle() {
        let stream = Stream::from("shared");
        let clone = stream.clone();
        assert_eq!(&clone.read(3).unwrap()[..], b"sha");
        // the original advanced too
        assert_eq!(stream.tell().unwrap(), 3);

        stream.close();
        assert!(clone.read(1).unwrap_err().is_closed());
    }

    #[test]
    fn closed_stream_errors() {
        let stream = Stream::from("x");
        stream.close();
        assert!(stream.read(1).unwrap_err().is_closed());
        assert!(stream.write(b"y").unwrap_err().is_closed());
        assert!(stream.seek(SeekFrom::Start(0)).unwrap_err().is_closed());
        assert!(stream.tell().unwrap_err().is_closed());
        assert!(stream.metadata().unwrap_err().is_closed());
        assert_eq!(stream.size(), None);
        assert!(stream.eof());
        // closing again is a no-op
        stream.close();
    }

    #[test]
    fn detach_is_one_shot() {
        let stream = Stream::from("data");
        assert!(stream.detach().is_some());
        assert!(stream.detach().is_none());
        assert!(stream.read(1).unwrap_err().is_closed());
        assert!(!stream.is_readable());
    }

    #[test]
    fn reader_is_not_seekable_or_writable() {
        let stream = Stream::reader(Box::new(Cursor::new(b"piped".to_vec())));
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert!(stream.seek(SeekFrom::Start(0)).unwrap_err().is_stream());
        assert!(stream.write(b"x").unwrap_err().is_stream());
        assert_eq!(stream.size(), None);
        assert_eq!(&stream.contents().unwrap()[..], b"piped");
    }

    #[test]
    fn file_round_trip() {
        let path = temp_path("round-trip");
        {
            let stream = Stream::open(&path, OpenMode::ReadWrite).unwrap();
            stream.write(b"on disk").unwrap();
            stream.rewind().unwrap();
            assert_eq!(&stream.contents().unwrap()[..], b"on disk");
            assert_eq!(stream.size(), Some(7));

            let meta = stream.metadata().unwrap();
            assert_eq!(meta.stream_type(), "file");
            assert_eq!(meta.mode(), "w+");
            assert!(meta.is_seekable());
            assert!(meta.uri().unwrap().ends_with("round-trip"));
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn append_mode_tells_the_real_offset() {
        let path = temp_path("append");
        std::fs::write(&path, b"01234").unwrap();
        let stream = Stream::open(&path, OpenMode::Append).unwrap();
        assert_eq!(stream.write(b"abc").unwrap(), 3);
        // the write landed at end-of-file, and tell reports that
        assert_eq!(stream.tell().unwrap(), 8);
        stream.close();
        assert_eq!(std::fs::read(&path).unwrap(), b"01234abc");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn from_file_derives_capabilities_from_mode() {
        let path = temp_path("from-file");
        std::fs::write(&path, b"fixed").unwrap();
        let mut file = std::fs::File::open(&path).unwrap();
        file.seek(SeekFrom::Start(2)).unwrap();

        let stream = Stream::from_file(file, OpenMode::Read);
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert!(stream.is_seekable());
        assert!(stream.write(b"nope").unwrap_err().is_stream());
        // the handle's pre-seeked offset is reported, not zero
        assert_eq!(stream.tell().unwrap(), 2);
        assert_eq!(&stream.contents().unwrap()[..], b"xed");
        assert_eq!(stream.metadata().unwrap().mode(), "r");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn read_only_file_rejects_writes() {
        let path = temp_path("read-only");
        std::fs::write(&path, b"fixed").unwrap();
        let stream = Stream::open(&path, OpenMode::Read).unwrap();
        assert!(stream.write(b"nope").unwrap_err().is_stream());
        assert_eq!(&stream.contents().unwrap()[..], b"fixed");
        stream.close();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let err = Stream::open(temp_path("missing"), OpenMode::Read).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn display_rewinds_and_reads() {
        let stream = Stream::from("to string");
        stream.contents().unwrap();
        assert_eq!(stream.to_string(), "to string");

        let unseekable = Stream::reader(Box::new(Cursor::new(b"x".to_vec())));
        assert_eq!(unseekable.to_string(), "");
    }

    #[test]
    fn metadata_for_buffer() {
        let meta = Stream::from("m").metadata().unwrap();
        assert_eq!(meta.stream_type(), "memory");
        assert_eq!(meta.mode(), "w+");
        assert!(meta.uri().is_none());
    }
}
