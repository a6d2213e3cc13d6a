//! Asynchronous structured-record logger with time-based file rotation
//!
//! Records submitted from any number of tasks or threads are queued on a
//! bounded channel and written by a single background worker that:
//! - encodes each record as one delimited unit (JSON lines by default)
//! - buffers writes and flushes them on a fixed interval
//! - opens a new file at every local midnight or top of the hour
//! - optionally gzips everything it writes
//!
//! Files are laid out as `<base>/<YYYY-MM>/<DD><suffix>` for daily rotation
//! and `<base>/<YYYY-MM-DD>/<HH><suffix>` for hourly rotation, with `.gz`
//! appended when compressing. Existing files are appended to, never
//! truncated.

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod clock;
mod config;
mod error;
mod formatter;
mod logger;
mod path;
mod record;
mod sink;
mod worker;

pub use config::{
    COMPRESSED_EXTENSION, DEFAULT_CHANNEL_CAPACITY, DEFAULT_COMPRESSION_LEVEL,
    DEFAULT_FLUSH_INTERVAL, RotatingLoggerConfig, RotatingLoggerConfigBuilder, RotationPolicy,
};
pub use error::{Error, Result};
pub use formatter::{JsonFormatter, PlainTextFormatter, RecordFormatter};
pub use logger::{RecordSender, RotatingLogger};
pub use path::{Destination, next_boundary, until_next_boundary};
pub use record::Record;
