//! Run-length encoding for block arrays.
//!
//! Runs of identical block ids collapse into `(count, value)` pairs. Used by
//! the chunk codec; terrain chunks are dominated by long runs of air and stone.

/// A single run: `count` consecutive copies of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleRun {
    /// Number of consecutive identical values (1..=65535).
    pub count: u16,
    /// The block id.
    pub value: u8,
}

/// Bytes per serialized run: `count: u16 LE` + `value: u8`.
pub const RUN_BYTES: usize = 3;

/// Errors that can occur during RLE decoding.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RleError {
    /// Decoded length does not match expected length.
    #[error("RLE length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Number of elements the runs describe.
        actual: usize,
    },
    /// A run with a zero count was found.
    #[error("RLE run {0} has zero length")]
    ZeroRun(usize),
    /// The byte stream is not a whole number of runs.
    #[error("RLE byte stream length {0} is not a multiple of {RUN_BYTES}")]
    Misaligned(usize),
}

/// Encodes a slice of block ids into runs.
///
/// Runs are capped at `u16::MAX` length. An empty input produces an empty output.
pub fn rle_encode(values: &[u8]) -> Vec<RleRun> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let value = values[i];
        let mut count: u16 = 1;
        while let Some(&next) = values.get(i + count as usize) {
            if next != value || count == u16::MAX {
                break;
            }
            count += 1;
        }
        runs.push(RleRun { count, value });
        i += count as usize;
    }
    runs
}

/// Expands runs into `out`, which must be exactly the decoded length.
pub fn rle_decode_into(runs: &[RleRun], out: &mut [u8]) -> Result<(), RleError> {
    let actual: usize = runs.iter().map(|r| r.count as usize).sum();
    if actual != out.len() {
        return Err(RleError::LengthMismatch {
            expected: out.len(),
            actual,
        });
    }
    let mut pos = 0;
    for (i, run) in runs.iter().enumerate() {
        if run.count == 0 {
            return Err(RleError::ZeroRun(i));
        }
        let end = pos + run.count as usize;
        out[pos..end].fill(run.value);
        pos = end;
    }
    Ok(())
}

/// Serializes runs to bytes.
pub fn rle_to_bytes(runs: &[RleRun]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(runs.len() * RUN_BYTES);
    for run in runs {
        buf.extend_from_slice(&run.count.to_le_bytes());
        buf.push(run.value);
    }
    buf
}

/// Parses runs from bytes produced by [`rle_to_bytes`].
pub fn rle_from_bytes(data: &[u8]) -> Result<Vec<RleRun>, RleError> {
    if data.len() % RUN_BYTES != 0 {
        return Err(RleError::Misaligned(data.len()));
    }
    Ok(data
        .chunks_exact(RUN_BYTES)
        .map(|b| RleRun {
            count: u16::from_le_bytes([b[0], b[1]]),
            value: b[2],
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
