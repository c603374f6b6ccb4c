//! Binary codec for chunk block arrays.
//!
//! The VXCK (Voxen Chunk) format is a small versioned envelope around either
//! the raw 4096 block bytes or their run-length encoding. Light is not stored:
//! it is recomputed on load.
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Magic bytes `"VXCK"` |
//! | 4 | 1 | Format version (`u8`, currently 1) |
//! | 5 | 1 | Encoding (`0` raw, `1` RLE) |
//! | 6 | N | Payload: 4096 bytes (raw) or N/3 runs of `count: u16 LE, value: u8` |

use crate::coords::CHUNK_VOLUME;
use crate::rle::{RleError, rle_decode_into, rle_encode, rle_from_bytes, rle_to_bytes};

/// Magic bytes identifying the VXCK format.
const MAGIC: [u8; 4] = *b"VXCK";

/// Current format version.
const FORMAT_VERSION: u8 = 1;

/// Header length in bytes.
const HEADER_LEN: usize = 6;

/// Payload encoding tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Encoding {
    /// Uncompressed block array.
    Raw = 0,
    /// Run-length encoded block array.
    Rle = 1,
}

/// Errors that can occur during chunk decoding.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChunkSerError {
    /// The data does not start with the expected magic bytes.
    #[error("invalid magic bytes")]
    InvalidMagic,
    /// The format version is not supported by this build.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),
    /// The encoding byte is not a known [`Encoding`].
    #[error("unknown encoding: {0}")]
    UnknownEncoding(u8),
    /// The data is shorter than expected.
    #[error("data truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum expected byte count.
        expected: usize,
        /// Actual byte count received.
        actual: usize,
    },
    /// The raw payload has bytes past the end of the block array.
    #[error("{0} trailing bytes after raw payload")]
    TrailingData(usize),
    /// The RLE payload is malformed.
    #[error("corrupt run-length payload: {0}")]
    Rle(#[from] RleError),
}

/// Encodes a block array, choosing RLE when it is smaller than raw.
pub fn encode_blocks(blocks: &[u8; CHUNK_VOLUME]) -> Vec<u8> {
    let runs = rle_encode(blocks);
    let rle = rle_to_bytes(&runs);
    let (encoding, payload): (Encoding, &[u8]) = if rle.len() < CHUNK_VOLUME {
        (Encoding::Rle, rle.as_slice())
    } else {
        (Encoding::Raw, &blocks[..])
    };

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&MAGIC);
    buf.push(FORMAT_VERSION);
    buf.push(encoding as u8);
    buf.extend_from_slice(payload);
    buf
}

/// Decodes a block array, returning the reason on failure.
pub fn try_decode_blocks(data: &[u8]) -> Result<Box<[u8; CHUNK_VOLUME]>, ChunkSerError> {
    if data.len() < 4 || data[0..4] != MAGIC {
        return Err(ChunkSerError::InvalidMagic);
    }
    if data.len() < HEADER_LEN {
        return Err(ChunkSerError::Truncated {
            expected: HEADER_LEN,
            actual: data.len(),
        });
    }
    let version = data[4];
    if version != FORMAT_VERSION {
        return Err(ChunkSerError::UnsupportedVersion(version));
    }

    let payload = &data[HEADER_LEN..];
    let mut blocks = Box::new([0u8; CHUNK_VOLUME]);
    match data[5] {
        0 => {
            if payload.len() < CHUNK_VOLUME {
                return Err(ChunkSerError::Truncated {
                    expected: HEADER_LEN + CHUNK_VOLUME,
                    actual: data.len(),
                });
            }
            if payload.len() > CHUNK_VOLUME {
                return Err(ChunkSerError::TrailingData(payload.len() - CHUNK_VOLUME));
            }
            blocks.copy_from_slice(payload);
        }
        1 => {
            let runs = rle_from_bytes(payload)?;
            rle_decode_into(&runs, &mut blocks[..])?;
        }
        other => return Err(ChunkSerError::UnknownEncoding(other)),
    }
    Ok(blocks)
}

/// Decodes a block array, or `None` if the data is corrupt.
///
/// The failure reason is logged at `debug` level. Never panics.
pub fn decode_blocks(data: &[u8]) -> Option<Box<[u8; CHUNK_VOLUME]>> {
    match try_decode_blocks(data) {
        Ok(blocks) => Some(blocks),
        Err(err) => {
            tracing::debug!("rejecting chunk payload ({} bytes): {}", data.len(), err);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn layered() -> Box<[u8; CHUNK_VOLUME]> {
        let mut blocks = Box::new([0u8; CHUNK_VOLUME]);
        // Bottom quarter stone, next layer dirt, rest air.
        blocks[..1024].fill(3);
        blocks[1024..1280].fill(2);
        blocks
    }

    #[test]
    fn test_homogeneous_chunk_is_tiny() {
        let blocks = [0u8; CHUNK_VOLUME];
        let bytes = encode_blocks(&blocks);
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[5], Encoding::Rle as u8);
        assert_eq!(*decode_blocks(&bytes).unwrap(), blocks);
    }

    #[test]
    fn test_layered_chunk_roundtrip() {
        let blocks = layered();
        let bytes = encode_blocks(&blocks);
        assert!(bytes.len() < 32);
        assert_eq!(decode_blocks(&bytes).unwrap(), blocks);
    }

    #[test]
    fn test_noisy_chunk_falls_back_to_raw() {
        let mut blocks = [0u8; CHUNK_VOLUME];
        for (i, b) in blocks.iter_mut().enumerate() {
            *b = (i % 7) as u8;
        }
        let bytes = encode_blocks(&blocks);
        assert_eq!(bytes[5], Encoding::Raw as u8);
        assert_eq!(bytes.len(), HEADER_LEN + CHUNK_VOLUME);
        assert_eq!(*decode_blocks(&bytes).unwrap(), blocks);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode_blocks(&layered());
        bytes[0] = b'X';
        assert_eq!(try_decode_blocks(&bytes), Err(ChunkSerError::InvalidMagic));
        assert!(decode_blocks(&bytes).is_none());
        assert!(decode_blocks(&[]).is_none());
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = encode_blocks(&layered());
        bytes[4] = 99;
        assert_eq!(
            try_decode_blocks(&bytes),
            Err(ChunkSerError::UnsupportedVersion(99))
        );
    }

    #[test]
    fn test_unknown_encoding() {
        let mut bytes = encode_blocks(&layered());
        bytes[5] = 7;
        assert_eq!(try_decode_blocks(&bytes), Err(ChunkSerError::UnknownEncoding(7)));
    }

    #[test]
    fn test_truncated_header_and_raw_payload() {
        assert!(matches!(
            try_decode_blocks(b"VXCK"),
            Err(ChunkSerError::Truncated { .. })
        ));

        let mut raw = MAGIC.to_vec();
        raw.extend_from_slice(&[FORMAT_VERSION, Encoding::Raw as u8]);
        raw.extend_from_slice(&[1u8; 100]);
        assert!(matches!(
            try_decode_blocks(&raw),
            Err(ChunkSerError::Truncated { .. })
        ));
    }

    #[test]
    fn test_raw_trailing_data_rejected() {
        let mut raw = MAGIC.to_vec();
        raw.extend_from_slice(&[FORMAT_VERSION, Encoding::Raw as u8]);
        raw.extend_from_slice(&[1u8; CHUNK_VOLUME + 2]);
        assert_eq!(try_decode_blocks(&raw), Err(ChunkSerError::TrailingData(2)));
    }

    #[test]
    fn test_truncated_rle_payload() {
        let bytes = encode_blocks(&layered());
        // Drop the last run entirely: run lengths no longer sum to 4096.
        let cut = &bytes[..bytes.len() - 3];
        assert!(matches!(
            try_decode_blocks(cut),
            Err(ChunkSerError::Rle(RleError::LengthMismatch { .. }))
        ));
        // Cut mid-run.
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(
            try_decode_blocks(cut),
            Err(ChunkSerError::Rle(RleError::Misaligned(_)))
        ));
    }

    #[test]
    fn test_every_prefix_decodes_without_panic() {
        let bytes = encode_blocks(&layered());
        for len in 0..bytes.len() {
            assert!(decode_blocks(&bytes[..len]).is_none(), "prefix {len} decoded");
        }
    }
}
