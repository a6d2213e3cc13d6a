//! Record encoders
//!
//! A formatter turns one [`Record`] into one self-delimited unit of bytes.
//! The worker encodes into a scratch buffer first, so a record that fails to
//! encode never leaves partial bytes in the output file.

use crate::error::{Error, Result};
use crate::record::Record;

use serde_json::Value;
use std::fmt::Debug;

/// Encodes records into delimited units
pub trait RecordFormatter: Debug + Send + Sync + 'static {
    /// Append exactly one encoded record, including its delimiter, to `buf`
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be represented. Implementations
    /// may leave partial bytes in `buf` on error; the caller discards them.
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<()>;
}

/// Newline-delimited JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl RecordFormatter for JsonFormatter {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<()> {
        serde_json::to_writer(&mut *buf, record)?;
        buf.push(b'\n');
        Ok(())
    }
}

/// One `key=value` line per record, fields separated by spaces.
///
/// Strings are quoted when they contain whitespace, quotes or `=`; arrays and
/// objects are written as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFormatter;

impl PlainTextFormatter {
    fn valid_key(key: &str) -> bool {
        !key.is_empty() && !key.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
    }

    fn needs_quotes(s: &str) -> bool {
        s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
    }

    fn write_value(value: &Value, buf: &mut Vec<u8>) -> Result<()> {
        match value {
            Value::String(s) if Self::needs_quotes(s) => {
                serde_json::to_writer(&mut *buf, s)?;
            }
            Value::String(s) => buf.extend_from_slice(s.as_bytes()),
            other => serde_json::to_writer(&mut *buf, other)?,
        }
        Ok(())
    }
}

impl RecordFormatter for PlainTextFormatter {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<()> {
        for (i, (key, value)) in record.iter().enumerate() {
            if !Self::valid_key(key) {
                return Err(Error::Format(format!(
                    "key {key:?} cannot be written as plain text"
                )));
            }
            if i > 0 {
                buf.push(b' ');
            }
            buf.extend_from_slice(key.as_bytes());
            buf.push(b'=');
            Self::write_value(value, buf)?;
        }
        buf.push(b'\n');
        Ok(())
    }
}
