use blobport_core::hash::base64_encode;

use crate::Error;
use crate::Result;

/// Most chunks a single plan may hold, bounded by the six digit block id
/// namespace.
const MAX_CHUNKS: u64 = 1_000_000;

/// Derive the block identifier for a chunk index.
///
/// The index is zero-padded to six digits and base64 encoded, which keeps
/// identifiers fixed-width, unique per transfer and lexicographically ordered
/// by index. It depends on the index alone, so the commit list can be
/// rebuilt without looking at upload results.
pub fn block_id(index: u32) -> String {
    base64_encode(format!("{index:06}").as_bytes())
}

/// One staged byte-range of the transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// Position of this chunk in the plan, starting at zero.
    pub index: u32,
    /// Byte offset of the chunk within the source.
    pub offset: u64,
    /// Length of the chunk in bytes.
    pub len: u64,
    /// Identifier the chunk is staged under.
    pub block_id: String,
}

/// Ordered partition of a source into identically sized chunks.
///
/// Covers `[0, source_size)` with no gaps or overlaps; only the last chunk
/// may be short. Never mutated after creation, workers only read from it.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    chunks: Vec<ChunkDescriptor>,
    source_size: u64,
    chunk_size: u64,
}

impl TransferPlan {
    /// Partition `source_size` bytes into chunks of `chunk_size`.
    pub fn new(source_size: u64, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be greater than zero"));
        }

        let count = source_size.div_ceil(chunk_size);
        if count > MAX_CHUNKS {
            return Err(Error::config(format!(
                "source needs {count} chunks, more than the {MAX_CHUNKS} block ids available; raise the chunk size"
            )));
        }

        let chunks = (0..count)
            .map(|index| {
                let offset = index * chunk_size;
                ChunkDescriptor {
                    index: index as u32,
                    offset,
                    len: chunk_size.min(source_size - offset),
                    block_id: block_id(index as u32),
                }
            })
            .collect();

        Ok(Self {
            chunks,
            source_size,
            chunk_size,
        })
    }

    /// The chunks, in index order.
    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    /// Number of chunks in the plan.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the plan holds no chunks at all.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total size of the source in bytes.
    pub fn source_size(&self) -> u64 {
        self.source_size
    }

    /// Configured chunk size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Block identifiers in ascending index order, as the commit wants them.
    pub fn block_ids(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.block_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ErrorKind;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_plan_covers_source_exactly() {
        for source_size in 0..=64 {
            for chunk_size in 1..=9 {
                let plan = TransferPlan::new(source_size, chunk_size).unwrap();

                assert_eq!(plan.len() as u64, source_size.div_ceil(chunk_size));
                assert_eq!(
                    plan.chunks().iter().map(|c| c.len).sum::<u64>(),
                    source_size
                );

                let mut expected_offset = 0;
                for (i, chunk) in plan.chunks().iter().enumerate() {
                    assert_eq!(chunk.index as usize, i);
                    assert_eq!(chunk.offset, expected_offset);
                    assert!(chunk.len <= chunk_size);
                    expected_offset += chunk.len;
                }
                assert_eq!(expected_offset, source_size);
            }
        }
    }

    #[test]
    fn test_ten_mib_source_with_four_mib_chunks() {
        let plan = TransferPlan::new(10 * MIB, 4 * MIB).unwrap();

        let lens: Vec<u64> = plan.chunks().iter().map(|c| c.len).collect();
        assert_eq!(lens, vec![4 * MIB, 4 * MIB, 2 * MIB]);

        // base64 of "000000", "000001", "000002".
        assert_eq!(
            plan.block_ids(),
            vec!["MDAwMDAw", "MDAwMDAx", "MDAwMDAy"]
        );
    }

    #[test]
    fn test_replanning_is_deterministic() {
        let first = TransferPlan::new(10 * MIB, 4 * MIB).unwrap();
        let second = TransferPlan::new(10 * MIB, 4 * MIB).unwrap();
        assert_eq!(first.chunks(), second.chunks());
    }

    #[test]
    fn test_block_id_is_injective() {
        let ids: HashSet<String> = (0..1000).map(block_id).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_block_ids_are_fixed_width_and_sortable() {
        let mut ids: Vec<String> = (0..200).map(block_id).collect();
        assert!(ids.iter().all(|id| id.len() == ids[0].len()));

        let by_index = ids.clone();
        ids.sort();
        assert_eq!(ids, by_index);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = TransferPlan::new(10, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_empty_source_yields_empty_plan() {
        let plan = TransferPlan::new(0, 4 * MIB).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.source_size(), 0);
    }
}
