//! Fetches and decodes the MNIST hand-written digit dataset.
//!
//! MNIST is distributed as one pair of IDX files per split: an image file holding a
//! `(num_images, rows, cols)` block of unsigned bytes, and a label file holding one
//! unsigned byte per image. This crate parses those files into `ndarray` matrices and
//! label vectors ready for a training pipeline.
//!
//! ```no_run
//! use idx_mnist as mnist;
//!
//! let loader = mnist::Mnist::<_, f32>::new(mnist::DirSource::default()).hook(mnist::hooks::Log);
//! let train = loader.get_training_set().unwrap();
//! let (first_image, first_label) = train.get(0).unwrap();
//! assert_eq!(first_image.shape(), &[28, 28]);
//! assert!(first_label < 10);
//! ```
//!
//! The decoders themselves never touch the file system; see [`decode_labels`] and
//! [`decode_images`] for the pure byte-level API.
#[macro_use]
extern crate serde_derive;

#[doc(hidden)]
pub mod test_helper;

pub mod errors;

pub mod header;

pub mod decode;

pub mod ndarray_ext;

pub mod hooks;

pub mod source;

pub mod dataset;

use std::fmt;

pub use crate::dataset::{load, load_dir, Dataset, Mnist, Split, SplitKind};
pub use crate::decode::{decode_images, decode_labels};
pub use crate::errors::{DecodeError, Error, Result, SourceError};
pub use crate::header::{read_be_u32, Header};
pub use crate::hooks::{Hook, LoadEvent};
pub use crate::ndarray_ext::{ImageSet, LabelSet, Matrix};
pub use crate::source::{ByteSource, DirSource, MemorySource, SourceConfig};

/// Payload type byte for unsigned single-byte values, the only encoding MNIST uses.
pub const PAYLOAD_UNSIGNED_BYTE: u8 = 0x08;

/// Number of dimensions declared by a label file.
pub const LABEL_RANK: usize = 1;

/// Number of dimensions declared by an image file: (images, rows, cols).
pub const IMAGE_RANK: usize = 3;

/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// Element type of decoded image matrices.
///
/// Every `u8` is exactly representable in both `f32` and `f64`, so widening a pixel
/// never loses information.
pub trait Pixel:
    num_traits::Float + From<u8> + fmt::Display + fmt::Debug + Send + Sync + 'static
{
}

impl Pixel for f32 {}
impl Pixel for f64 {}
