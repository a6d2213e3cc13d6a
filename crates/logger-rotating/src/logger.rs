//! Public handle for submitting records to the rotation worker

use crate::clock::{Clock, SystemClock};
use crate::config::RotatingLoggerConfig;
use crate::error::{Error, Result};
use crate::formatter::{JsonFormatter, RecordFormatter};
use crate::record::Record;
use crate::worker::RotationWorker;

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cloneable producer handle for a [`RotatingLogger`].
///
/// Hand one to every task or thread that needs to log. Submissions from one
/// sender keep their relative order in the output.
#[derive(Debug, Clone)]
pub struct RecordSender {
    sender: mpsc::Sender<Record>,
}

impl RecordSender {
    /// Queue a record, waiting while the queue is full.
    ///
    /// If the worker has already stopped the record is discarded and a
    /// warning is emitted. This includes every record submitted after a
    /// fatal rotation failure, which [`RotatingLogger::failed`] reports.
    pub async fn submit(&self, record: Record) {
        if self.sender.send(record).await.is_err() {
            warn!("Rotating log worker is not running, record dropped");
        }
    }

    /// Queue a record from synchronous code, blocking the current thread
    /// while the queue is full.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; use
    /// [`submit`](Self::submit) there.
    pub fn blocking_submit(&self, record: Record) {
        if self.sender.blocking_send(record).is_err() {
            warn!("Rotating log worker is not running, record dropped");
        }
    }

    /// Whether the worker is still accepting records
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Asynchronous writer of structured records into time-rotated files.
///
/// Records are encoded by a single background task which owns the open
/// file. A new file is opened at every daily or hourly boundary of local
/// time, and buffered bytes are flushed on a fixed interval.
#[derive(Debug)]
pub struct RotatingLogger {
    sender: RecordSender,
    shutdown: CancellationToken,
    failed: CancellationToken,
    worker: JoinHandle<Result<()>>,
}

impl RotatingLogger {
    /// Start a logger writing newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, if no Tokio runtime
    /// is available, or if the first destination file cannot be opened.
    pub fn new(config: RotatingLoggerConfig) -> Result<Self> {
        Self::with_formatter(config, JsonFormatter)
    }

    /// Start a logger with a custom record formatter.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_formatter(
        config: RotatingLoggerConfig,
        formatter: impl RecordFormatter,
    ) -> Result<Self> {
        Self::start(config, Arc::new(formatter), Arc::new(SystemClock))
    }

    pub(crate) fn start(
        config: RotatingLoggerConfig,
        formatter: Arc<dyn RecordFormatter>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let shutdown = CancellationToken::new();
        let failed = CancellationToken::new();

        let worker = RotationWorker::open(
            &config,
            formatter,
            clock,
            receiver,
            shutdown.clone(),
            failed.clone(),
        )?;
        let worker = runtime.spawn(worker.run());

        Ok(Self {
            sender: RecordSender { sender },
            shutdown,
            failed,
            worker,
        })
    }

    /// Queue a record, waiting while the queue is full.
    ///
    /// Records submitted after [`failed`](Self::failed) resolves are
    /// discarded with a warning.
    pub async fn submit(&self, record: Record) {
        self.sender.submit(record).await;
    }

    /// Queue a record from synchronous code.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn blocking_submit(&self, record: Record) {
        self.sender.blocking_submit(record);
    }

    /// Get a producer handle that can be moved to other tasks or threads
    #[must_use]
    pub fn sender(&self) -> RecordSender {
        self.sender.clone()
    }

    /// Whether the worker is still accepting records.
    ///
    /// Turns false after [`close`](Self::close) starts or after a fatal
    /// rotation failure.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sender.is_running()
    }

    /// Resolves once the worker has stopped because a rotation failed.
    ///
    /// Never resolves otherwise, so a supervisor can select on it alongside
    /// its other work and treat it as fatal. From that point every submitted
    /// record is lost; [`close`](Self::close) returns the rotation error.
    pub async fn failed(&self) {
        self.failed.cancelled().await;
    }

    /// Whether a fatal rotation failure has stopped the worker
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed.is_cancelled()
    }

    /// Stop the worker and wait until every record queued before this call
    /// has been written, flushed and the file closed.
    ///
    /// Senders still blocked on a full queue when this is called have their
    /// records discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rotation`] if the worker had already stopped because a
    /// rotation failed, or [`Error::WorkerPanicked`] if it panicked. Flush and
    /// close failures during shutdown are only logged.
    pub async fn close(self) -> Result<()> {
        self.shutdown.cancel();
        drop(self.sender);

        match self.worker.await {
            Ok(result) => result,
            Err(e) => Err(Error::WorkerPanicked(e.to_string())),
        }
    }
}
