//! HTTP Versions enum
//!
//! Instead of relying on typo-prone Strings, use expected HTTP versions as
//! the `HttpVersion` enum.
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use self::HttpVersion::{Http09, Http10, Http11, Http20};

/// Represents a version of the HTTP protocol.
#[derive(PartialEq, PartialOrd, Copy, Clone, Eq, Ord, Hash, Debug)]
pub enum HttpVersion {
    /// `HTTP/0.9`
    Http09,
    /// `HTTP/1.0`
    Http10,
    /// `HTTP/1.1`
    Http11,
    /// `HTTP/2.0`
    Http20,
}

impl HttpVersion {
    /// The version as it appears on the wire, e.g. `HTTP/1.1`.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Http09 => "HTTP/0.9",
            Http10 => "HTTP/1.0",
            Http11 => "HTTP/1.1",
            Http20 => "HTTP/2.0",
        }
    }
}

impl Default for HttpVersion {
    fn default() -> HttpVersion {
        Http11
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for HttpVersion {
    type Err = Error;
    fn from_str(s: &str) -> Result<HttpVersion, Error> {
        Ok(match s {
            "HTTP/0.9" => Http09,
            "HTTP/1.0" => Http10,
            "HTTP/1.1" => Http11,
            "HTTP/2.0" | "HTTP/2" => Http20,
            _ => return Err(Error::new_version()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::HttpVersion;
    use super::HttpVersion::{Http10, Http11, Http20};

    #[test]
    fn test_default() {
        assert_eq!(Http11, HttpVersion::default());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Http10, HttpVersion::from_str("HTTP/1.0").unwrap());
        assert_eq!(Http11, HttpVersion::from_str("HTTP/1.1").unwrap());
        assert_eq!(Http20, HttpVersion::from_str("HTTP/2.0").unwrap());
        assert_eq!(Http20, HttpVersion::from_str("HTTP/2").unwrap());
        assert!(HttpVersion::from_str("SPDY/1").unwrap_err().is_parse());
    }

    #[test]
    fn test_fmt() {
        assert_eq!("HTTP/1.1".to_owned(), format!("{}", Http11));
    }
}
