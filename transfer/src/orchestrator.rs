use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use log::debug;

use crate::BlockStore;
use crate::BlockTransferEngine;
use crate::ChunkSource;
use crate::Error;
use crate::Result;
use crate::TransferPlan;

const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Caller-facing knobs for one transfer.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Size of every chunk except possibly the last, in bytes.
    pub chunk_size: u64,
    /// Maximum number of concurrent block uploads.
    pub parallelism: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallelism: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

/// Terminal outcome of one transfer.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The object was fully staged and committed.
    Success,
    /// The destination already held the object; nothing was moved.
    AlreadyExists,
    /// The transfer aborted; carries the first failure observed.
    Failed(Error),
}

impl TransferOutcome {
    /// Whether the transfer committed the object.
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }
}

/// What one transfer achieved, produced once at the end of the run.
#[derive(Debug)]
pub struct TransferResult {
    /// Terminal outcome.
    pub outcome: TransferOutcome,
    /// Bytes successfully staged at the destination.
    pub bytes_transferred: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Indices of chunks that failed to stage, ascending. Empty unless the
    /// outcome is `Failed`.
    pub failed_indices: Vec<u32>,
}

impl TransferResult {
    fn new(outcome: TransferOutcome, bytes_transferred: u64, started: Instant) -> Self {
        Self {
            outcome,
            bytes_transferred,
            elapsed: started.elapsed(),
            failed_indices: Vec::new(),
        }
    }
}

/// Sequences one transfer: existence check, then plan, stage and commit.
///
/// Each transfer owns its plan, credential and worker pool, so unrelated
/// transfers can run concurrently without interference. The orchestrator
/// performs no retries; retry policy belongs to the caller.
pub struct Transfer<B> {
    store: Arc<B>,
    options: TransferOptions,
}

impl<B: BlockStore + 'static> Transfer<B> {
    /// Create a transfer towards the given destination.
    pub fn new(store: B) -> Self {
        Self {
            store: Arc::new(store),
            options: TransferOptions::default(),
        }
    }

    /// Override the default options.
    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the transfer to completion and report what happened.
    ///
    /// Steps are gated on each other: a present destination returns
    /// `AlreadyExists` before the source is read at all; staging failures
    /// abort the run before any commit is issued. Errors that prevent the
    /// transfer from starting (bad options, a failed existence probe) are
    /// returned as `Err`; once staging begins every failure is folded into
    /// the returned [`TransferResult`].
    pub async fn run<S>(&self, source: S) -> Result<TransferResult>
    where
        S: ChunkSource + 'static,
    {
        let started = Instant::now();

        if self.store.exists().await? {
            debug!("destination already exists, nothing to do");
            return Ok(TransferResult::new(TransferOutcome::AlreadyExists, 0, started));
        }

        let source = Arc::new(source);
        let source_size = source.size().await?;
        let plan = TransferPlan::new(source_size, self.options.chunk_size)?;
        debug!(
            "planned {} chunks of up to {} bytes for a {} byte source",
            plan.len(),
            plan.chunk_size(),
            source_size
        );

        let engine = BlockTransferEngine::new(self.options.parallelism);
        let report = engine.stage_all(&plan, &source, &self.store).await?;

        let bytes_staged = report.bytes_staged;

        if !report.failures.is_empty() {
            let failed_indices = report.failed_indices();
            let first = report
                .failures
                .into_iter()
                .next()
                .expect("failures is non-empty");

            let mut result =
                TransferResult::new(TransferOutcome::Failed(first.error), bytes_staged, started);
            result.failed_indices = failed_indices;
            return Ok(result);
        }

        if let Err(e) = engine.commit(&plan, self.store.as_ref()).await {
            return Ok(TransferResult::new(
                TransferOutcome::Failed(e),
                bytes_staged,
                started,
            ));
        }

        debug!("transferred {} bytes in {} chunks", bytes_staged, plan.len());
        Ok(TransferResult::new(
            TransferOutcome::Success,
            bytes_staged,
            started,
        ))
    }
}
