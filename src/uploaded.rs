//! Files uploaded by a client.
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use mime::Mime;

use crate::error::{Error, Result};
use crate::stream::{OpenMode, Stream};

/// The client-reported result of an upload, mirroring the classic
/// `UPLOAD_ERR_*` family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UploadError {
    /// The upload completed successfully.
    Ok,
    /// The file exceeds the server's configured size limit.
    IniSize,
    /// The file exceeds the size limit specified in the form.
    FormSize,
    /// The file was only partially uploaded.
    Partial,
    /// No file was uploaded.
    NoFile,
    /// The server has no temporary directory to stage uploads in.
    NoTmpDir,
    /// The server failed to write the staged upload to disk.
    CantWrite,
    /// An extension stopped the upload.
    Extension,
}

impl UploadError {
    /// True for [`UploadError::Ok`].
    pub fn is_ok(&self) -> bool {
        *self == UploadError::Ok
    }

    /// The numeric code this error is reported as.
    pub fn code(&self) -> u8 {
        match *self {
            UploadError::Ok => 0,
            UploadError::IniSize => 1,
            UploadError::FormSize => 2,
            UploadError::Partial => 3,
            UploadError::NoFile => 4,
            UploadError::NoTmpDir => 6,
            UploadError::CantWrite => 7,
            UploadError::Extension => 8,
        }
    }

    /// The error for a numeric code, if the code is known.
    ///
    /// Code 5 has never been assigned.
    pub fn from_code(code: u8) -> Option<UploadError> {
        Some(match code {
            0 => UploadError::Ok,
            1 => UploadError::IniSize,
            2 => UploadError::FormSize,
            3 => UploadError::Partial,
            4 => UploadError::NoFile,
            6 => UploadError::NoTmpDir,
            7 => UploadError::CantWrite,
            8 => UploadError::Extension,
            _ => return None,
        })
    }

    /// A human-readable description of the error.
    pub fn message(&self) -> &'static str {
        match *self {
            UploadError::Ok => "upload completed",
            UploadError::IniSize => "file exceeds the server size limit",
            UploadError::FormSize => "file exceeds the form size limit",
            UploadError::Partial => "file was only partially uploaded",
            UploadError::NoFile => "no file was uploaded",
            UploadError::NoTmpDir => "missing a temporary directory",
            UploadError::CantWrite => "failed to write upload to disk",
            UploadError::Extension => "an extension stopped the upload",
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A file uploaded by a client: a [`Stream`] of its contents plus the
/// metadata the client supplied alongside it.
///
/// The client-supplied filename and media type are exactly that:
/// client-supplied. Nothing here verifies them against the contents.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    stream: Stream,
    size: Option<u64>,
    error: UploadError,
    client_filename: Option<String>,
    client_media_type: Option<Mime>,
    /// Shared across clones so the one-shot move stays one-shot.
    moved: Arc<AtomicBool>,
}

impl UploadedFile {
    /// Wrap an upload's contents and client metadata.
    pub fn new(
        stream: Stream,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<Mime>,
    ) -> UploadedFile {
        UploadedFile {
            stream,
            size,
            error,
            client_filename,
            client_media_type,
            moved: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The upload's contents.
    ///
    /// Errors once the file has been moved, or when the client reported an
    /// upload error.
    pub fn stream(&self) -> Result<&Stream> {
        if !self.error.is_ok() {
            return Err(Error::new_upload_failed());
        }
        if self.moved.load(Ordering::SeqCst) {
            return Err(Error::new_upload_moved());
        }
        Ok(&self.stream)
    }

    /// Move the upload's contents to `target`, creating or truncating it.
    ///
    /// This is one-shot: a second call (on this value or any clone of it)
    /// errors, and the source stream is closed on success. Errors when the
    /// client reported an upload error. A failed write un-marks the move
    /// so a different target can be tried.
    pub fn move_to<P: AsRef<Path>>(&self, target: P) -> Result<()> {
        if !self.error.is_ok() {
            return Err(Error::new_upload_failed());
        }
        if self.moved.swap(true, Ordering::SeqCst) {
            return Err(Error::new_upload_moved());
        }
        let target = target.as_ref();
        debug!("UploadedFile.move_to( {:?} )", target);
        match self.copy_out(target) {
            Ok(()) => {
                self.stream.close();
                Ok(())
            }
            Err(e) => {
                self.moved.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn copy_out(&self, target: &Path) -> Result<()> {
        let dst = Stream::open(target, OpenMode::Write)?;
        if self.stream.is_seekable() {
            self.stream.rewind()?;
        }
        loop {
            let chunk = self.stream.read(8 * 1024)?;
            if chunk.is_empty() {
                break;
            }
            let mut offset = 0;
            while offset < chunk.len() {
                offset += dst.write(&chunk[offset..])?;
            }
        }
        dst.close();
        Ok(())
    }

    /// Whether the contents have been moved away.
    pub fn is_moved(&self) -> bool {
        self.moved.load(Ordering::SeqCst)
    }

    /// The size of the upload, when the client reported one.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// The client-reported upload result.
    pub fn error(&self) -> UploadError {
        self.error
    }

    /// The filename the client sent, verbatim.
    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    /// The media type the client sent.
    pub fn client_media_type(&self) -> Option<&Mime> {
        self.client_media_type.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::stream::Stream;

    use super::{UploadError, UploadedFile};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("http-messages-upload-{}-{}", std::process::id(), name));
        path
    }

    fn upload(contents: &str) -> UploadedFile {
        UploadedFile::new(
            Stream::from(contents),
            Some(contents.len() as u64),
            UploadError::Ok,
            Some("report.txt".to_owned()),
            Some(mime::TEXT_PLAIN),
        )
    }

    #[test]
    fn accessors() {
        let file = upload("contents");
        assert_eq!(file.size(), Some(8));
        assert_eq!(file.error(), UploadError::Ok);
        assert_eq!(file.client_filename(), Some("report.txt"));
        assert_eq!(file.client_media_type(), Some(&mime::TEXT_PLAIN));
        assert!(!file.is_moved());
        assert_eq!(&file.stream().unwrap().contents().unwrap()[..], b"contents");
    }

    #[test]
    fn move_to_writes_contents_and_is_one_shot() {
        let path = temp_path("one-shot");
        let file = upload("move me");
        file.move_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"move me");
        assert!(file.is_moved());

        assert!(file.stream().unwrap_err().is_upload());
        assert!(file.move_to(&path).unwrap_err().is_upload());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn move_is_one_shot_across_clones() {
        let path = temp_path("clone-shot");
        let file = upload("cloned");
        let clone = file.clone();
        file.move_to(&path).unwrap();
        assert!(clone.is_moved());
        assert!(clone.move_to(&path).unwrap_err().is_upload());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn move_rewinds_a_consumed_stream() {
        let path = temp_path("rewound");
        let file = upload("full contents");
        file.stream().unwrap().contents().unwrap();
        file.move_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"full contents");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_upload_refuses_everything() {
        let file = UploadedFile::new(
            Stream::empty(),
            None,
            UploadError::Partial,
            None,
            None,
        );
        assert!(file.stream().unwrap_err().is_upload());
        assert!(file.move_to(temp_path("never")).unwrap_err().is_upload());
    }

    #[test]
    fn error_codes_round_trip() {
        assert_eq!(UploadError::from_code(0), Some(UploadError::Ok));
        assert_eq!(UploadError::from_code(3), Some(UploadError::Partial));
        assert_eq!(UploadError::from_code(5), None);
        assert_eq!(UploadError::CantWrite.code(), 7);
        assert!(!UploadError::NoFile.is_ok());
    }
}
