//! Headers container.
//!
//! Header names are compared case-insensitively, per
//! [RFC 7230](https://tools.ietf.org/html/rfc7230#section-3.2), while the
//! case they were supplied in is preserved for iteration and rendering. A
//! field may carry multiple values; `get_line` joins them with `", "` the
//! way they would appear folded into one field line.
use std::collections::HashMap;
use std::fmt;

use log::trace;
use unicase::UniCase;

use crate::error::{Error, Result};

/// A map of header fields on requests and responses.
#[derive(Clone, Default)]
pub struct Headers {
    data: HashMap<UniCase<String>, Item>,
}

#[derive(Clone, Debug)]
struct Item {
    /// The field name in the case it was first supplied in; `add` under a
    /// different case keeps this one.
    name: String,
    values: Vec<String>,
}

impl Headers {
    /// Creates a new, empty headers map.
    pub fn new() -> Headers {
        Headers {
            data: HashMap::new(),
        }
    }

    /// Set a header field, replacing any values previously set under the
    /// same (case-insensitive) name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        trace!("Headers.set( {:?}, {:?} )", name, value);
        validate_name(name)?;
        let value = validate_value(value)?;
        self.data.insert(
            UniCase::new(name.to_owned()),
            Item {
                name: name.to_owned(),
                values: vec![value],
            },
        );
        Ok(())
    }

    /// Append a value to a header field, keeping any values already set.
    pub fn add(&mut self, name: &str, value: &str) -> Result<()> {
        trace!("Headers.add( {:?}, {:?} )", name, value);
        validate_name(name)?;
        let value = validate_value(value)?;
        self.data
            .entry(UniCase::new(name.to_owned()))
            .or_insert_with(|| Item {
                name: name.to_owned(),
                values: vec![],
            })
            .values
            .push(value);
        Ok(())
    }

    /// Remove a header field. Returns true if the field was present.
    pub fn remove(&mut self, name: &str) -> bool {
        trace!("Headers.remove( {:?} )", name);
        self.data.remove(&UniCase::new(name.to_owned())).is_some()
    }

    /// Get the values of a header field.
    ///
    /// Returns an empty slice when the field is absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.data
            .get(&UniCase::new(name.to_owned()))
            .map(|item| &item.values[..])
            .unwrap_or(&[])
    }

    /// Get the values of a header field joined with `", "`, as they would
    /// appear in a single field line.
    pub fn get_line(&self, name: &str) -> Option<String> {
        self.data
            .get(&UniCase::new(name.to_owned()))
            .map(|item| item.values.join(", "))
    }

    /// Returns true if a header field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(&UniCase::new(name.to_owned()))
    }

    /// An iterator over the fields, as `(name, values)` pairs.
    ///
    /// Names keep the case they were supplied in. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.data
            .values()
            .map(|item| (item.name.as_str(), &item.values[..]))
    }

    /// Returns the number of fields in the map.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for item in self.data.values() {
            for value in &item.values {
                write!(f, "{}: {}\r\n", item.name, value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.data.values().map(|item| (&item.name, &item.values)))
            .finish()
    }
}

/// Header names are RFC 7230 tokens.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::new_header());
    }
    for &b in name.as_bytes() {
        let ok = match b {
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
            | b'_' | b'`' | b'|' | b'~' => true,
            _ => b.is_ascii_alphanumeric(),
        };
        if !ok {
            return Err(Error::new_header());
        }
    }
    Ok(())
}

/// Values may not smuggle CR, LF, or NUL; surrounding OWS is trimmed.
fn validate_value(value: &str) -> Result<String> {
    if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == b'\0') {
        return Err(Error::new_header());
    }
    Ok(value.trim_matches(|c| c == ' ' || c == '\t').to_owned())
}

#[cfg(test)]
mod tests {
    use super::Headers;

    #[test]
    fn set_and_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain").unwrap();
        assert_eq!(headers.get("content-type"), ["text/plain"]);
        assert_eq!(headers.get("CONTENT-TYPE"), ["text/plain"]);
        assert!(headers.contains("CoNtEnT-tYpE"));
    }

    #[test]
    fn set_replaces_add_appends() {
        let mut headers = Headers::new();
        headers.set("Accept", "text/html").unwrap();
        headers.add("accept", "application/json").unwrap();
        assert_eq!(headers.get("Accept"), ["text/html", "application/json"]);

        headers.set("Accept", "*/*").unwrap();
        assert_eq!(headers.get("Accept"), ["*/*"]);
    }

    #[test]
    fn add_keeps_the_first_supplied_case() {
        let mut headers = Headers::new();
        headers.add("X-Tag", "a").unwrap();
        headers.add("x-tag", "b").unwrap();
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["X-Tag"]);
        assert_eq!(headers.get("X-TAG"), ["a", "b"]);
    }

    #[test]
    fn get_line_joins_values() {
        let mut headers = Headers::new();
        headers.add("Vary", "Accept").unwrap();
        headers.add("Vary", "Accept-Encoding").unwrap();
        assert_eq!(headers.get_line("vary").unwrap(), "Accept, Accept-Encoding");
        assert_eq!(headers.get_line("X-Missing"), None);
    }

    #[test]
    fn absent_field_is_empty_slice() {
        let headers = Headers::new();
        assert!(headers.get("Host").is_empty());
        assert!(!headers.contains("Host"));
    }

    #[test]
    fn remove_field() {
        let mut headers = Headers::new();
        headers.set("X-Trace", "abc").unwrap();
        assert!(headers.remove("x-trace"));
        assert!(!headers.remove("x-trace"));
        assert!(headers.is_empty());
    }

    #[test]
    fn rejects_invalid_names() {
        let mut headers = Headers::new();
        assert!(headers.set("", "v").unwrap_err().is_parse());
        assert!(headers.set("Bad Name", "v").unwrap_err().is_parse());
        assert!(headers.set("Bad:Name", "v").unwrap_err().is_parse());
    }

    #[test]
    fn rejects_crlf_in_values() {
        let mut headers = Headers::new();
        assert!(headers.set("X-Evil", "a\r\nX-Inject: b").unwrap_err().is_parse());
        assert!(headers.add("X-Evil", "a\0b").unwrap_err().is_parse());
    }

    #[test]
    fn value_ows_is_trimmed() {
        let mut headers = Headers::new();
        headers.set("X-Pad", "  padded\t").unwrap();
        assert_eq!(headers.get("X-Pad"), ["padded"]);
    }

    #[test]
    fn display_renders_field_lines() {
        let mut headers = Headers::new();
        headers.set("Host", "example.com").unwrap();
        assert_eq!(headers.to_string(), "Host: example.com\r\n");
    }
}
