use std::sync::Arc;

use log::debug;
use tokio::task::JoinSet;

use crate::BlockStore;
use crate::ChunkDescriptor;
use crate::ChunkSource;
use crate::Error;
use crate::Result;
use crate::TransferPlan;

/// One chunk that failed to stage.
#[derive(Debug)]
pub struct ChunkFailure {
    /// Index of the failed chunk.
    pub index: u32,
    /// Why it failed.
    pub error: Error,
}

/// What staging achieved, successful or not.
#[derive(Debug, Default)]
pub struct StageReport {
    /// Bytes of successfully staged chunks.
    pub bytes_staged: u64,
    /// Failures in completion order.
    pub failures: Vec<ChunkFailure>,
}

impl StageReport {
    /// Indices of failed chunks, ascending.
    pub fn failed_indices(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self.failures.iter().map(|f| f.index).collect();
        indices.sort_unstable();
        indices
    }
}

/// Stages chunks as remote blocks under bounded concurrency, then commits
/// the ordered block list.
#[derive(Debug)]
pub struct BlockTransferEngine {
    parallelism: usize,
}

impl BlockTransferEngine {
    /// Create an engine with at most `parallelism` uploads in flight.
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    /// Stage every chunk of the plan.
    ///
    /// Workers are independent; completion order is unconstrained and
    /// nothing may rely on it. Failure policy is fail-fast: after the first
    /// failure no further uploads are dispatched, but in-flight ones are
    /// left to finish. The report lists every index that failed.
    pub async fn stage_all<S, B>(
        &self,
        plan: &TransferPlan,
        source: &Arc<S>,
        store: &Arc<B>,
    ) -> Result<StageReport>
    where
        S: ChunkSource + 'static,
        B: BlockStore + 'static,
    {
        let mut tasks: JoinSet<(u32, u64, Result<()>)> = JoinSet::new();
        let mut report = StageReport::default();

        for chunk in plan.chunks() {
            // The pool is bounded: wait for a free slot before dispatching.
            while tasks.len() >= self.parallelism {
                collect(&mut tasks, &mut report).await?;
            }
            if !report.failures.is_empty() {
                break;
            }

            let chunk = chunk.clone();
            let source = Arc::clone(source);
            let store = Arc::clone(store);
            tasks.spawn(async move {
                let index = chunk.index;
                let len = chunk.len;
                (index, len, stage_one(&*source, &*store, &chunk).await)
            });
        }

        // Hard barrier: every dispatched upload completes or fails before
        // the caller may consider a commit.
        while !tasks.is_empty() {
            collect(&mut tasks, &mut report).await?;
        }

        Ok(report)
    }

    /// Commit the plan's block list to materialize the object.
    ///
    /// Identifiers are referenced in ascending index order no matter what
    /// order uploads finished in; the destination's byte layout follows this
    /// list, not upload arrival time.
    pub async fn commit<B: BlockStore>(&self, plan: &TransferPlan, store: &B) -> Result<()> {
        store.put_block_list(&plan.block_ids()).await.map_err(|e| {
            Error::commit(format!("failed to commit block list: {e}")).with_source(e)
        })
    }
}

async fn stage_one<S, B>(source: &S, store: &B, chunk: &ChunkDescriptor) -> Result<()>
where
    S: ChunkSource,
    B: BlockStore,
{
    let data = source.read_chunk(chunk).await?;
    if data.len() as u64 != chunk.len {
        return Err(Error::source_read(format!(
            "source returned {} bytes for the {} byte chunk {}",
            data.len(),
            chunk.len,
            chunk.index
        )));
    }

    store.put_block(&chunk.block_id, data).await
}

async fn collect(
    tasks: &mut JoinSet<(u32, u64, Result<()>)>,
    report: &mut StageReport,
) -> Result<()> {
    let Some(joined) = tasks.join_next().await else {
        return Ok(());
    };
    let (index, len, outcome) =
        joined.map_err(|e| Error::unexpected("staging worker aborted").with_source(e))?;

    match outcome {
        Ok(()) => {
            report.bytes_staged += len;
            debug!("chunk {index} staged ({len} bytes)");
        }
        Err(cause) => {
            debug!("chunk {index} failed: {cause}");
            let error = Error::chunk_upload(index, format!("chunk {index} failed to stage: {cause}"))
                .with_source(cause);
            report.failures.push(ChunkFailure { index, error });
        }
    }

    Ok(())
}
