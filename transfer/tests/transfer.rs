//! End-to-end transfer behaviour against an in-memory block store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pretty_assertions::assert_eq;

use blobport_transfer::BlockStore;
use blobport_transfer::Error;
use blobport_transfer::ErrorKind;
use blobport_transfer::MemorySource;
use blobport_transfer::Result;
use blobport_transfer::Transfer;
use blobport_transfer::TransferOptions;
use blobport_transfer::TransferOutcome;

/// Block store that records every call instead of talking to a network.
#[derive(Clone, Default)]
struct RecordingStore {
    preexisting: bool,
    fail_blocks: Vec<String>,
    fail_commit: bool,
    delays: HashMap<String, u64>,
    attempts: Arc<Mutex<Vec<String>>>,
    staged: Arc<Mutex<Vec<(String, Bytes)>>>,
    committed: Arc<Mutex<Option<Vec<String>>>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self::default()
    }

    fn preexisting() -> Self {
        Self {
            preexisting: true,
            ..Self::default()
        }
    }

    fn failing_blocks(ids: &[&str]) -> Self {
        Self {
            fail_blocks: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    /// Delay each block upload by the given milliseconds, to force a
    /// completion order different from the index order.
    fn with_delays(mut self, pairs: &[(&str, u64)]) -> Self {
        self.delays = pairs
            .iter()
            .map(|(id, ms)| (id.to_string(), *ms))
            .collect();
        self
    }

    fn staged_ids(&self) -> Vec<String> {
        self.staged
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn committed_ids(&self) -> Option<Vec<String>> {
        self.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockStore for RecordingStore {
    async fn exists(&self) -> Result<bool> {
        Ok(self.preexisting || self.committed.lock().unwrap().is_some())
    }

    async fn put_block(&self, block_id: &str, data: Bytes) -> Result<()> {
        self.attempts.lock().unwrap().push(block_id.to_string());

        if let Some(ms) = self.delays.get(block_id) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if self.fail_blocks.iter().any(|id| id == block_id) {
            return Err(Error::unexpected("injected block failure"));
        }

        self.staged
            .lock()
            .unwrap()
            .push((block_id.to_string(), data));
        Ok(())
    }

    async fn put_block_list(&self, block_ids: &[String]) -> Result<()> {
        if self.fail_commit {
            return Err(Error::unexpected("injected commit failure"));
        }

        *self.committed.lock().unwrap() = Some(block_ids.to_vec());
        Ok(())
    }
}

fn transfer_with(store: RecordingStore, chunk_size: u64, parallelism: usize) -> Transfer<RecordingStore> {
    Transfer::new(store).with_options(TransferOptions {
        chunk_size,
        parallelism,
    })
}

#[tokio::test]
async fn transfer_commits_blocks_in_index_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Delays force completion in reverse index order.
    let store = RecordingStore::new().with_delays(&[
        ("MDAwMDAw", 60),
        ("MDAwMDAx", 30),
        ("MDAwMDAy", 5),
    ]);
    let probe = store.clone();

    let result = transfer_with(store, 4, 3)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();

    assert!(result.outcome.is_success());
    assert_eq!(result.bytes_transferred, 10);
    assert!(result.failed_indices.is_empty());

    // Uploads really finished out of index order...
    assert_eq!(probe.staged_ids(), vec!["MDAwMDAy", "MDAwMDAx", "MDAwMDAw"]);
    // ...and the commit list is ordered by index anyway.
    assert_eq!(
        probe.committed_ids(),
        Some(vec![
            "MDAwMDAw".to_string(),
            "MDAwMDAx".to_string(),
            "MDAwMDAy".to_string()
        ])
    );
}

#[tokio::test]
async fn staged_blocks_carry_the_planned_byte_ranges() {
    let store = RecordingStore::new();
    let probe = store.clone();

    transfer_with(store, 4, 1)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();

    let staged = probe.staged.lock().unwrap().clone();
    assert_eq!(
        staged,
        vec![
            ("MDAwMDAw".to_string(), Bytes::from_static(b"0123")),
            ("MDAwMDAx".to_string(), Bytes::from_static(b"4567")),
            ("MDAwMDAy".to_string(), Bytes::from_static(b"89")),
        ]
    );
}

#[tokio::test]
async fn existing_destination_short_circuits() {
    let store = RecordingStore::preexisting();
    let probe = store.clone();

    let result = transfer_with(store, 4, 2)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();

    assert!(matches!(result.outcome, TransferOutcome::AlreadyExists));
    assert_eq!(result.bytes_transferred, 0);
    assert!(probe.attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rerunning_a_finished_transfer_is_idempotent() {
    let store = RecordingStore::new();
    let probe = store.clone();
    let transfer = transfer_with(store, 4, 2);

    let first = transfer
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();
    assert!(first.outcome.is_success());
    assert_eq!(probe.attempts.lock().unwrap().len(), 3);

    let second = transfer
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();
    assert!(matches!(second.outcome, TransferOutcome::AlreadyExists));
    assert_eq!(second.bytes_transferred, 0);
    // No further uploads happened on the second run.
    assert_eq!(probe.attempts.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn failed_chunk_reports_its_index_and_skips_commit() {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = RecordingStore::failing_blocks(&["MDAwMDAx"]);
    let probe = store.clone();

    let result = transfer_with(store, 4, 1)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();

    let TransferOutcome::Failed(error) = &result.outcome else {
        panic!("expected a failed outcome, got {:?}", result.outcome);
    };
    assert_eq!(error.kind(), ErrorKind::ChunkUpload { index: 1 });
    assert_eq!(result.failed_indices, vec![1]);
    assert_eq!(result.bytes_transferred, 4);

    // Fail-fast: chunk 2 was never dispatched, and no commit was issued.
    assert_eq!(probe.attempts.lock().unwrap().clone(), vec!["MDAwMDAw", "MDAwMDAx"]);
    assert_eq!(probe.committed_ids(), None);
}

#[tokio::test]
async fn every_failed_index_is_reported() {
    let store = RecordingStore::failing_blocks(&["MDAwMDAw", "MDAwMDAy"]);
    let probe = store.clone();

    let result = transfer_with(store, 4, 3)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();

    assert!(matches!(result.outcome, TransferOutcome::Failed(_)));
    assert_eq!(result.failed_indices, vec![0, 2]);
    assert_eq!(result.bytes_transferred, 4);
    assert_eq!(probe.committed_ids(), None);
}

#[tokio::test]
async fn commit_failure_surfaces_as_failed_outcome() {
    let store = RecordingStore::failing_commit();
    let probe = store.clone();

    let result = transfer_with(store, 4, 2)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap();

    let TransferOutcome::Failed(error) = &result.outcome else {
        panic!("expected a failed outcome, got {:?}", result.outcome);
    };
    assert_eq!(error.kind(), ErrorKind::Commit);
    // Everything staged fine; only the commit failed.
    assert_eq!(result.bytes_transferred, 10);
    assert!(result.failed_indices.is_empty());
    assert_eq!(probe.staged.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn empty_source_commits_an_empty_block_list() {
    let store = RecordingStore::new();
    let probe = store.clone();

    let result = transfer_with(store, 4, 2)
        .run(MemorySource::new(Bytes::new()))
        .await
        .unwrap();

    assert!(result.outcome.is_success());
    assert_eq!(result.bytes_transferred, 0);
    assert_eq!(probe.committed_ids(), Some(vec![]));
}

#[tokio::test]
async fn zero_chunk_size_is_rejected() {
    let store = RecordingStore::new();

    let err = transfer_with(store, 0, 2)
        .run(MemorySource::new(&b"0123456789"[..]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
}
