//! Background worker that owns the destination file
//!
//! The worker is the only thing that ever touches the file, the buffered
//! writer or the formatter scratch space. Producers reach it through the
//! bounded record channel; the logger handle reaches it through the shutdown
//! token and learns about a fatal rotation through the failure token. Events
//! are handled one at a time, in whatever order they become ready.

use crate::clock::Clock;
use crate::config::{RotatingLoggerConfig, RotationPolicy};
use crate::error::{Error, Result};
use crate::formatter::RecordFormatter;
use crate::path::{Destination, until_next_boundary};
use crate::record::Record;
use crate::sink::{LogSink, ensure_dir};

use flate2::Compression;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

pub(crate) struct RotationWorker {
    base_dir: PathBuf,
    rotation: RotationPolicy,
    suffix: String,
    compression: Option<Compression>,
    flush_interval: Duration,
    formatter: Arc<dyn RecordFormatter>,
    clock: Arc<dyn Clock>,
    receiver: mpsc::Receiver<Record>,
    shutdown: CancellationToken,
    failed: CancellationToken,
    sink: LogSink,
    scratch: Vec<u8>,
}

impl RotationWorker {
    /// Create the base directory and open the first destination file.
    ///
    /// Runs synchronously so an unusable destination is reported to the
    /// caller before any background task exists.
    pub(crate) fn open(
        config: &RotatingLoggerConfig,
        formatter: Arc<dyn RecordFormatter>,
        clock: Arc<dyn Clock>,
        receiver: mpsc::Receiver<Record>,
        shutdown: CancellationToken,
        failed: CancellationToken,
    ) -> Result<Self> {
        ensure_dir(&config.base_dir)?;

        let suffix = config.full_suffix();
        let compression = config
            .compress
            .then(|| Compression::new(config.compression_level));
        let destination =
            Destination::for_instant(&config.base_dir, config.rotation, &suffix, &clock.now());
        let sink = LogSink::open(&destination, compression)?;

        Ok(Self {
            base_dir: config.base_dir.clone(),
            rotation: config.rotation,
            suffix,
            compression,
            flush_interval: config.flush_interval,
            formatter,
            clock,
            receiver,
            shutdown,
            failed,
            sink,
            scratch: Vec::with_capacity(512),
        })
    }

    /// Run until shutdown, then drain, flush and close.
    ///
    /// Returns an error only if a rotation failed; in that case queued
    /// records are discarded, the current file is closed best-effort and the
    /// failure token is cancelled once the worker is done.
    pub(crate) async fn run(mut self) -> Result<()> {
        debug!(
            "Rotating log worker started, writing to {}",
            self.sink.path().display()
        );

        let outcome = self.event_loop().await;
        match &outcome {
            Ok(()) => self.drain().await,
            Err(e) => {
                error!("Rotating log worker stopping: {}", e);
                self.receiver.close();
            }
        }

        let failed = self.failed.clone();
        self.close_sink();
        if outcome.is_err() {
            failed.cancel();
        }
        outcome
    }

    async fn event_loop(&mut self) -> Result<()> {
        let shutdown = self.shutdown.clone();

        let first_flush = Instant::now() + self.flush_interval;
        let mut flush_ticker = interval_at(first_flush, self.flush_interval);
        flush_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let rotation_deadline = sleep_until(self.next_rotation());
        tokio::pin!(rotation_deadline);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("Rotating log worker received shutdown");
                    return Ok(());
                }

                maybe_record = self.receiver.recv() => match maybe_record {
                    Some(record) => self.write_record(&record),
                    None => {
                        debug!("All record senders dropped, stopping rotating log worker");
                        return Ok(());
                    }
                },

                _ = flush_ticker.tick() => self.flush(),

                () = &mut rotation_deadline => {
                    self.rotate()?;
                    rotation_deadline.as_mut().reset(self.next_rotation());
                }
            }
        }
    }

    /// Deadline of the next policy boundary, measured on the wall clock
    fn next_rotation(&self) -> Instant {
        Instant::now() + until_next_boundary(self.rotation, &self.clock.now())
    }

    fn destination(&self) -> Destination {
        Destination::for_instant(&self.base_dir, self.rotation, &self.suffix, &self.clock.now())
    }

    fn write_record(&mut self, record: &Record) {
        self.scratch.clear();
        if let Err(e) = self.formatter.format(record, &mut self.scratch) {
            error!("Failed to encode log record, dropping it: {}", e);
            return;
        }

        if let Err(e) = self.sink.write_unit(&self.scratch) {
            error!(
                "Failed to write log record to {}: {}",
                self.sink.path().display(),
                e
            );
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.sink.flush() {
            error!("Failed to flush {}: {}", self.sink.path().display(), e);
        }
    }

    /// Open the file for the current bucket, then retire the old one.
    ///
    /// The new sink is fully constructed before the old one is closed, and the
    /// old one is closed (flushing everything) before any further record is
    /// handled.
    fn rotate(&mut self) -> Result<()> {
        let destination = self.destination();
        let next = LogSink::open(&destination, self.compression).map_err(|e| {
            Error::Rotation(format!(
                "cannot open {}: {e}",
                destination.path().display()
            ))
        })?;

        let previous = std::mem::replace(&mut self.sink, next);
        let previous_path = previous.path().to_path_buf();
        previous.close().map_err(|e| {
            Error::Rotation(format!("cannot close {}: {e}", previous_path.display()))
        })?;

        debug!(
            "Rotated log file {} -> {}",
            previous_path.display(),
            self.sink.path().display()
        );
        Ok(())
    }

    /// Stop accepting records and write everything already queued
    async fn drain(&mut self) {
        self.receiver.close();

        let mut drained = 0usize;
        while let Some(record) = self.receiver.recv().await {
            self.write_record(&record);
            drained += 1;
        }

        debug!("Drained {} queued log records", drained);
    }

    fn close_sink(self) {
        let path = self.sink.path().to_path_buf();
        match self.sink.close() {
            Ok(()) => debug!("Closed log file {}", path.display()),
            Err(e) => error!("Failed to close log file {}: {}", path.display(), e),
        }
    }
}
