//! A small extension of rust-ndarray
//!
//! Type aliases for decoded MNIST data, and conversions into the batched layouts
//! that training code usually wants.
use crate::Pixel;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};

/// One image: `(rows, cols)`, row-major.
pub type Matrix<F> = Array2<F>;

/// Decoded images in file order.
pub type ImageSet<F> = Vec<Matrix<F>>;

/// Decoded labels in file order; `labels[i]` belongs to image `i`.
pub type LabelSet = Vec<u8>;

/// Stacks images into one `(n, rows, cols)` array.
///
/// Returns `None` if `images` is empty or the shapes disagree.
pub fn stack_images<F: Pixel>(images: &[Matrix<F>]) -> Option<Array3<F>> {
    if images.is_empty() {
        return None;
    }
    let views: Vec<ArrayView2<F>> = images.iter().map(|m| m.view()).collect();
    ndarray::stack(Axis(0), &views).ok()
}

/// Flattens images into one `(n, rows * cols)` array, one image per row.
///
/// Returns `None` if `images` is empty or the shapes disagree.
pub fn flatten_images<F: Pixel>(images: &[Matrix<F>]) -> Option<Array2<F>> {
    let stacked = stack_images(images)?;
    let (n, rows, cols) = stacked.dim();
    stacked.into_shape((n, rows * cols)).ok()
}

#[inline]
pub fn labels_to_array(labels: &[u8]) -> Array1<u8> {
    Array1::from(labels.to_vec())
}

/// One-hot encodes `labels` into an `(n, num_classes)` array.
///
/// Labels `>= num_classes` produce an all-zero row.
pub fn one_hot<F: Pixel>(labels: &[u8], num_classes: usize) -> Array2<F> {
    let mut ret = Array2::zeros((labels.len(), num_classes));
    for (mut row, &label) in ret.outer_iter_mut().zip(labels) {
        if let Some(cell) = row.get_mut(label as usize) {
            *cell = F::one();
        }
    }
    ret
}

#[test]
fn test_flatten_images() {
    let a = ndarray::arr2(&[[1., 2.], [3., 4.]]);
    let b = ndarray::arr2(&[[5., 6.], [7., 8.]]);
    let flat: Array2<f64> = flatten_images(&[a, b]).unwrap();
    assert_eq!(flat, ndarray::arr2(&[[1., 2., 3., 4.], [5., 6., 7., 8.]]));
    assert!(flatten_images::<f64>(&[]).is_none());
}

#[test]
fn test_one_hot() {
    let y: Array2<f32> = one_hot(&[2, 0, 11], 3);
    assert_eq!(
        y,
        ndarray::arr2(&[[0., 0., 1.], [1., 0., 0.], [0., 0., 0.]])
    );
}

#[test]
fn test_labels_to_array() {
    assert_eq!(labels_to_array(&[7, 8, 9]), ndarray::arr1(&[7u8, 8, 9]));
}
