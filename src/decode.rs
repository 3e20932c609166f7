//! IDX payload decoders.
//!
//! Both decoders are pure: they take ownership of one complete file's bytes and
//! either return the whole decoded collection or a [`DecodeError`]. Nothing is
//! returned partially, and progress reporting is left to the caller.
use crate::errors::DecodeError;
use crate::header::Header;
use crate::ndarray_ext::{ImageSet, LabelSet, Matrix};
use crate::{Pixel, IMAGE_RANK, LABEL_RANK};

/// Largest accepted count of images declared with zero rows or columns.
pub const MAX_EMPTY_IMAGES: usize = u16::MAX as usize;

/// Checks that `raw` holds the whole payload declared by `header`.
///
/// Returns the payload length on success. A declared size that overflows `usize`
/// can never be satisfied and is reported as truncation.
fn check_payload_len(raw: &[u8], header: &Header) -> Result<usize, DecodeError> {
    let truncated = |needed| DecodeError::TruncatedInput {
        needed,
        actual: raw.len(),
    };
    let payload_len = header.num_elements().ok_or_else(|| truncated(usize::MAX))?;
    let needed = header
        .size()
        .checked_add(payload_len)
        .ok_or_else(|| truncated(usize::MAX))?;
    if raw.len() < needed {
        return Err(truncated(needed));
    }
    Ok(payload_len)
}

/// Decodes an IDX label file (rank 1, unsigned bytes).
///
/// ```
/// let raw = vec![0, 0, 0x08, 1, 0, 0, 0, 3, 7, 8, 9];
/// assert_eq!(idx_mnist::decode_labels(raw).unwrap(), vec![7, 8, 9]);
/// ```
pub fn decode_labels(mut raw: Vec<u8>) -> Result<LabelSet, DecodeError> {
    let header = Header::parse(&raw, LABEL_RANK)?;
    let n = check_payload_len(&raw, &header)?;
    let start = header.size();

    raw.truncate(start + n);
    raw.drain(..start);
    Ok(raw)
}

/// Decodes an IDX image file (rank 3, unsigned bytes) into one row-major
/// `(rows, cols)` matrix per image.
///
/// Pixel values are widened to `F` without scaling, so they stay in `[0, 255]`.
///
/// ```
/// let raw = vec![0, 0, 0x08, 3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 2, 1, 2, 3, 4];
/// let images = idx_mnist::decode_images::<f64>(raw).unwrap();
/// assert_eq!(images[0], ndarray::arr2(&[[1., 2.], [3., 4.]]));
/// ```
pub fn decode_images<F: Pixel>(raw: Vec<u8>) -> Result<ImageSet<F>, DecodeError> {
    let header = Header::parse(&raw, IMAGE_RANK)?;
    let payload_len = check_payload_len(&raw, &header)?;
    let (num_images, rows, cols) = (header.dims[0], header.dims[1], header.dims[2]);
    if num_images == 0 {
        return Ok(Vec::new());
    }
    // cannot overflow: num_images * rows * cols was checked above
    let pixels_per_image = rows * cols;

    let unallocatable = || DecodeError::TruncatedInput {
        needed: usize::MAX,
        actual: raw.len(),
    };
    // zero-sized images are not backed by payload bytes, so the input length
    // does not bound their count
    if pixels_per_image == 0 && num_images > MAX_EMPTY_IMAGES {
        return Err(unallocatable());
    }

    let payload = &raw[header.size()..header.size() + payload_len];
    let mut images = Vec::new();
    images
        .try_reserve_exact(num_images)
        .map_err(|_| unallocatable())?;
    if pixels_per_image == 0 {
        images.resize(num_images, Matrix::zeros((rows, cols)));
        return Ok(images);
    }
    for chunk in payload.chunks_exact(pixels_per_image) {
        let pixels: Vec<F> = chunk.iter().map(|&p| <F as From<u8>>::from(p)).collect();
        // safe unwrap: chunk length is rows * cols
        images.push(Matrix::from_shape_vec((rows, cols), pixels).unwrap());
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflowing_dims_are_truncation() {
        let mut raw = vec![0, 0, 0x08, 3];
        raw.extend_from_slice(&[0xff; 12]);
        raw.extend_from_slice(&[1, 2, 3]);
        let len = raw.len();
        match decode_images::<f32>(raw) {
            Err(DecodeError::TruncatedInput { actual, .. }) => assert_eq!(actual, len),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_images() {
        let raw = vec![0, 0, 0x08, 3, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 5];
        let images = decode_images::<f64>(raw).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].shape(), &[0, 5]);
    }

    #[test]
    fn test_unallocatable_empty_images() {
        let raw = vec![0, 0, 0x08, 3, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode_images::<f32>(raw),
            Err(DecodeError::TruncatedInput {
                needed: usize::MAX,
                actual: 16
            })
        );

        let mut raw = vec![0, 0, 0x08, 3, 0, 1, 0, 0, 0, 0, 0, 7, 0, 0, 0, 0];
        assert!(decode_images::<f64>(raw.clone()).is_err());
        raw[5] = 0;
        raw[6] = 0xff;
        raw[7] = 0xff;
        assert_eq!(decode_images::<f64>(raw).unwrap().len(), MAX_EMPTY_IMAGES);
    }
}
