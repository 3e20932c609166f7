//! IDX header parsing.
//!
//! An IDX file starts with a 4-byte magic prefix followed by one big-endian `u32`
//! per dimension:
//!
//! | offset | size | meaning                              |
//! |--------|------|--------------------------------------|
//! | 0      | 2    | reserved, always zero                |
//! | 2      | 1    | payload type (`0x08` = unsigned byte) |
//! | 3      | 1    | number of dimensions `n`             |
//! | 4      | 4·n  | dimension sizes, most significant first |
//!
//! The flat payload follows immediately after.
use crate::errors::DecodeError;
use crate::PAYLOAD_UNSIGNED_BYTE;
use smallvec::SmallVec;

const MAGIC_LEN: usize = 4;
const PAYLOAD_TYPE_OFFSET: usize = 2;
const RANK_OFFSET: usize = 3;

/// Reads 4 bytes at `offset` as a big-endian `u32`.
///
/// Bounds are the caller's responsibility; this panics if `offset + 4 > bytes.len()`.
#[inline]
pub fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(buf)
}

/// Parsed IDX header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub payload_type: u8,
    pub dims: SmallVec<[usize; 4]>,
}

impl Header {
    /// Parses the header at the start of `raw`, requiring exactly `expected_rank`
    /// dimensions.
    ///
    /// Checks run in this order, and the first failure is returned:
    /// the 4-byte magic is present, the payload type is unsigned byte, the dimension
    /// count equals `expected_rank`, and every dimension size is present.
    pub fn parse(raw: &[u8], expected_rank: usize) -> Result<Header, DecodeError> {
        if raw.len() < MAGIC_LEN {
            return Err(DecodeError::TruncatedInput {
                needed: MAGIC_LEN,
                actual: raw.len(),
            });
        }

        // bytes 0 and 1 are reserved
        let payload_type = raw[PAYLOAD_TYPE_OFFSET];
        if payload_type != PAYLOAD_UNSIGNED_BYTE {
            return Err(DecodeError::UnsupportedPayloadType {
                found: payload_type,
                offset: PAYLOAD_TYPE_OFFSET,
            });
        }

        let rank = raw[RANK_OFFSET] as usize;
        if rank != expected_rank {
            return Err(DecodeError::DimensionMismatch {
                expected: expected_rank,
                found: rank,
                offset: RANK_OFFSET,
            });
        }

        let size = header_size(rank);
        if raw.len() < size {
            return Err(DecodeError::TruncatedInput {
                needed: size,
                actual: raw.len(),
            });
        }

        let dims = (0..rank)
            .map(|i| read_be_u32(raw, MAGIC_LEN + 4 * i) as usize)
            .collect();
        Ok(Header { payload_type, dims })
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of bytes the header occupies, i.e. the offset of the payload.
    #[inline]
    pub fn size(&self) -> usize {
        header_size(self.rank())
    }

    /// Product of all dimension sizes, or `None` if it overflows `usize`.
    pub fn num_elements(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// The first four bytes read as one big-endian word.
    ///
    /// 2049 for MNIST label files and 2051 for image files.
    pub fn magic(&self) -> u32 {
        ((self.payload_type as u32) << 8) | self.rank() as u32
    }
}

#[inline]
fn header_size(rank: usize) -> usize {
    MAGIC_LEN + 4 * rank
}

#[test]
fn test_read_be_u32() {
    let bytes = [0xff, 0x00, 0x00, 0xea, 0x60, 0xff];
    assert_eq!(read_be_u32(&bytes, 1), 60_000);
    assert_eq!(read_be_u32(&[0, 0, 0, 0], 0), 0);
    assert_eq!(read_be_u32(&[0x12, 0x34, 0x56, 0x78], 0), 0x1234_5678);
}

#[test]
fn test_magic() {
    let h = Header::parse(&[0, 0, 8, 1, 0, 0, 0, 3], 1).unwrap();
    assert_eq!(h.magic(), 2049);
    let h = Header::parse(&[0, 0, 8, 3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 2], 3).unwrap();
    assert_eq!(h.magic(), 2051);
    assert_eq!(h.size(), 16);
    assert_eq!(h.num_elements(), Some(4));
}
