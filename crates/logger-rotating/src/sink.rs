//! The open destination file and the buffered, optionally compressing,
//! writer layered on top of it

use crate::error::{Error, Result};
use crate::path::Destination;

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

/// Mode for created directories (unix only)
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Mode for created log files (unix only)
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Create `path` and any missing parents.
///
/// An existing directory is fine; an existing non-directory is not.
pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    match builder.create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(())
            } else {
                Err(Error::NotADirectory(path.to_path_buf()))
            }
        }
        Err(source) => Err(Error::CreateDirectory {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Open `path` for appending, creating it if needed. Never truncates.
fn open_append(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    options.open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })
}

enum Output {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Writer state for one destination file
pub(crate) struct LogSink {
    path: PathBuf,
    output: Output,
    /// Bytes were written since the last flush
    dirty: bool,
}

impl LogSink {
    /// Create the destination directory, open the file and wrap it.
    ///
    /// With `compression` set every byte goes through a gzip encoder before
    /// reaching the buffer.
    pub(crate) fn open(destination: &Destination, compression: Option<Compression>) -> Result<Self> {
        ensure_dir(&destination.dir)?;

        let path = destination.path();
        let buffered = BufWriter::new(open_append(&path)?);
        let output = match compression {
            Some(level) => Output::Gzip(GzEncoder::new(buffered, level)),
            None => Output::Plain(buffered),
        };

        Ok(Self {
            path,
            output,
            dirty: false,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Write one complete encoded record
    pub(crate) fn write_unit(&mut self, unit: &[u8]) -> Result<()> {
        self.dirty = true;
        match &mut self.output {
            Output::Plain(w) => w.write_all(unit)?,
            Output::Gzip(w) => w.write_all(unit)?,
        }
        Ok(())
    }

    /// Push buffered (and compressed) bytes to the file without closing it.
    ///
    /// Does nothing if no record was written since the last flush; a gzip
    /// flush always emits a sync block, even with nothing pending.
    pub(crate) fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        match &mut self.output {
            Output::Plain(w) => w.flush()?,
            Output::Gzip(w) => w.flush()?,
        }
        self.dirty = false;
        Ok(())
    }

    /// Finish the gzip member if any, flush everything and close the file
    pub(crate) fn close(self) -> Result<()> {
        let mut buffered = match self.output {
            Output::Plain(w) => w,
            Output::Gzip(w) => w.finish()?,
        };
        buffered.flush()?;
        let file = buffered
            .into_inner()
            .map_err(io::IntoInnerError::into_error)?;
        file.sync_data()?;
        Ok(())
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("path", &self.path)
            .field("compressed", &matches!(self.output, Output::Gzip(_)))
            .finish()
    }
}
