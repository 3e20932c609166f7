//! Builders for hand-made IDX fixtures.
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

/// Builds an IDX file of unsigned bytes with the given dimensions and payload.
///
/// The payload is written as-is, so it may be shorter or longer than `dims` declares.
pub fn idx_bytes(dims: &[u32], payload: &[u8]) -> Vec<u8> {
    let mut ret = Vec::with_capacity(4 + 4 * dims.len() + payload.len());
    ret.extend_from_slice(&[0, 0, crate::PAYLOAD_UNSIGNED_BYTE, dims.len() as u8]);
    for d in dims {
        ret.extend_from_slice(&d.to_be_bytes());
    }
    ret.extend_from_slice(payload);
    ret
}

pub fn label_file(labels: &[u8]) -> Vec<u8> {
    idx_bytes(&[labels.len() as u32], labels)
}

pub fn image_file(num_images: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
    idx_bytes(&[num_images, rows, cols], pixels)
}

/// Seeded generator of random, well-formed fixtures.
pub struct FixtureRng {
    rng: XorShiftRng,
}

impl Default for FixtureRng {
    fn default() -> Self {
        FixtureRng::new(42)
    }
}

impl FixtureRng {
    pub fn new(seed: u64) -> Self {
        FixtureRng {
            rng: XorShiftRng::seed_from_u64(seed),
        }
    }

    /// `n` labels in `[0, 10)`.
    pub fn labels(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.rng.gen_range(0..10)).collect()
    }

    /// `n` arbitrary pixel bytes.
    pub fn pixels(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.rng.gen()).collect()
    }

    pub fn below(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// A matching (images, labels) file pair.
    pub fn split_files(&mut self, num_images: u32, rows: u32, cols: u32) -> (Vec<u8>, Vec<u8>) {
        let pixels = self.pixels(num_images as usize * rows as usize * cols as usize);
        let labels = self.labels(num_images as usize);
        (
            image_file(num_images, rows, cols, &pixels),
            label_file(&labels),
        )
    }
}

#[test]
fn test_split_files_with_wide_dims() {
    // 65536 * 65536 does not fit in a u32
    let (images, labels) = FixtureRng::default().split_files(1 << 16, 1 << 16, 0);
    assert_eq!(images.len(), 16);
    assert_eq!(labels.len(), 8 + (1 << 16));
}
