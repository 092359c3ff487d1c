use std::ops::Range;

use assetmint_protocol::messages::{CompletedPart, PrepareUploadResponse};

use crate::TransferError;

/// A byte range of the payload bound to one pre-signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based part number.
    pub part_number: u32,
    pub url: String,
    /// Byte offset of the first byte in the payload.
    pub start: u64,
    /// Exclusive end offset.
    pub end: u64,
}

impl Chunk {
    /// Chunk length in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index range of this chunk inside the materialized payload.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Outcome of a successful chunk PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub part_number: u32,
    /// ETag with surrounding quotes removed.
    pub integrity_token: String,
}

impl From<ChunkResult> for CompletedPart {
    fn from(r: ChunkResult) -> Self {
        CompletedPart {
            part_number: r.part_number,
            e_tag: r.integrity_token,
        }
    }
}

/// Splits a payload of `total_len` bytes into chunks following the slot
/// issued by the backend.
///
/// Checks the slot invariants: non-zero chunk size,
/// `chunk_count == ceil(total_len / chunk_size)`, one URL per chunk and
/// part numbers `1..=chunk_count` with no gaps. Parts may arrive in any
/// order; the returned chunks are sorted by part number.
pub fn plan_chunks(
    total_len: u64,
    slot: &PrepareUploadResponse,
) -> Result<Vec<Chunk>, TransferError> {
    if slot.chunk_size == 0 {
        return Err(TransferError::InvalidPlan("chunk size is zero".into()));
    }

    let expected = total_len.div_ceil(slot.chunk_size);
    if u64::from(slot.chunk_count) != expected {
        return Err(TransferError::InvalidPlan(format!(
            "chunk count {} does not match {} bytes at {} bytes per chunk (expected {expected})",
            slot.chunk_count, total_len, slot.chunk_size
        )));
    }

    if slot.parts.len() != slot.chunk_count as usize {
        return Err(TransferError::InvalidPlan(format!(
            "{} presigned URLs for {} chunks",
            slot.parts.len(),
            slot.chunk_count
        )));
    }

    let mut parts = slot.parts.clone();
    parts.sort_by_key(|p| p.part_number);

    let mut chunks = Vec::with_capacity(parts.len());
    for (index, part) in parts.into_iter().enumerate() {
        let expected_number = index as u32 + 1;
        if part.part_number != expected_number {
            return Err(TransferError::InvalidPlan(format!(
                "part numbers are not contiguous: expected {expected_number}, got {}",
                part.part_number
            )));
        }

        let start = u64::from(part.part_number - 1) * slot.chunk_size;
        let end = (u64::from(part.part_number) * slot.chunk_size).min(total_len);
        chunks.push(Chunk {
            part_number: part.part_number,
            url: part.url,
            start,
            end,
        });
    }

    Ok(chunks)
}
