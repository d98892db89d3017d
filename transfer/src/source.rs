use std::io::SeekFrom;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncSeekExt;

use crate::ChunkDescriptor;
use crate::Error;
use crate::Result;

/// A readable transfer source.
///
/// Workers call [`read_chunk`](ChunkSource::read_chunk) concurrently, one
/// call per descriptor, so implementations must not share seek state between
/// calls.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Total size of the source in bytes.
    async fn size(&self) -> Result<u64>;

    /// Read exactly the byte range one descriptor covers.
    async fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Bytes>;
}

/// A fully buffered in-memory source.
///
/// Chunks are zero-copy slices of the buffer, so total memory use is bounded
/// by the source size regardless of parallelism.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    /// Create a source over a byte buffer.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    async fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    async fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Bytes> {
        let start = chunk.offset as usize;
        let end = start + chunk.len as usize;
        if end > self.data.len() {
            return Err(Error::source_read(format!(
                "chunk {} ends at byte {end}, past the {} byte source",
                chunk.index,
                self.data.len()
            )));
        }

        Ok(self.data.slice(start..end))
    }
}

/// A local file source with positional reads.
///
/// Every call opens its own handle, so concurrent workers never contend on a
/// shared cursor and memory stays bounded by `parallelism x chunk_size`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source over a file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ChunkSource for FileSource {
    async fn size(&self) -> Result<u64> {
        let meta = tokio::fs::metadata(&self.path).await.map_err(|e| {
            Error::source_read(format!("failed to stat {}", self.path.display())).with_source(e)
        })?;

        Ok(meta.len())
    }

    async fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Bytes> {
        let mut file = File::open(&self.path).await.map_err(|e| {
            Error::source_read(format!("failed to open {}", self.path.display())).with_source(e)
        })?;

        file.seek(SeekFrom::Start(chunk.offset)).await.map_err(|e| {
            Error::source_read(format!("failed to seek to byte {}", chunk.offset)).with_source(e)
        })?;

        let mut buf = vec![0u8; chunk.len as usize];
        file.read_exact(&mut buf).await.map_err(|e| {
            Error::source_read(format!(
                "failed to read chunk {} ({} bytes at offset {})",
                chunk.index, chunk.len, chunk.offset
            ))
            .with_source(e)
        })?;

        Ok(buf.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::plan::block_id;
    use crate::ErrorKind;

    fn descriptor(index: u32, offset: u64, len: u64) -> ChunkDescriptor {
        ChunkDescriptor {
            index,
            offset,
            len,
            block_id: block_id(index),
        }
    }

    #[tokio::test]
    async fn test_memory_source_slices() {
        let source = MemorySource::new(&b"0123456789"[..]);

        assert_eq!(source.size().await.unwrap(), 10);
        assert_eq!(
            source.read_chunk(&descriptor(0, 0, 4)).await.unwrap(),
            &b"0123"[..]
        );
        assert_eq!(
            source.read_chunk(&descriptor(2, 8, 2)).await.unwrap(),
            &b"89"[..]
        );
    }

    #[tokio::test]
    async fn test_memory_source_rejects_out_of_range() {
        let source = MemorySource::new(&b"0123"[..]);
        let err = source.read_chunk(&descriptor(1, 2, 4)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }

    #[tokio::test]
    async fn test_file_source_positional_reads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abcdefghij").unwrap();

        let source = FileSource::new(file.path());
        assert_eq!(source.size().await.unwrap(), 10);
        assert_eq!(
            source.read_chunk(&descriptor(1, 4, 4)).await.unwrap(),
            &b"efgh"[..]
        );
        assert_eq!(
            source.read_chunk(&descriptor(2, 8, 2)).await.unwrap(),
            &b"ij"[..]
        );
    }

    #[tokio::test]
    async fn test_file_source_truncated_read_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();

        let source = FileSource::new(file.path());
        let err = source.read_chunk(&descriptor(0, 0, 8)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }
}
