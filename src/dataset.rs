//! Assembling decoded files into training and test splits.
use crate::decode::{decode_images, decode_labels};
use crate::errors::{Error, Result};
use crate::hooks::{Hook, LoadEvent, Silent};
use crate::ndarray_ext::{self, ImageSet, LabelSet, Matrix};
use crate::source::{ByteSource, DirSource, SourceConfig};
use crate::{Pixel, NUM_CLASSES};
use ndarray::Array2;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// The two MNIST partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitKind {
    Train,
    Test,
}

impl SplitKind {
    pub fn images_name(self) -> &'static str {
        match self {
            SplitKind::Train => "train-images-idx3-ubyte",
            SplitKind::Test => "t10k-images-idx3-ubyte",
        }
    }

    pub fn labels_name(self) -> &'static str {
        match self {
            SplitKind::Train => "train-labels-idx1-ubyte",
            SplitKind::Test => "t10k-labels-idx1-ubyte",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplitKind::Train => "train",
            SplitKind::Test => "test",
        }
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Images and their labels for one split, index-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct Split<F: Pixel> {
    pub images: ImageSet<F>,
    pub labels: LabelSet,
}

impl<F: Pixel> Split<F> {
    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// `(rows, cols)` of the images, or `None` for an empty split.
    pub fn image_shape(&self) -> Option<(usize, usize)> {
        self.images.first().map(|m| m.dim())
    }

    pub fn get(&self, i: usize) -> Option<(&Matrix<F>, u8)> {
        Some((self.images.get(i)?, *self.labels.get(i)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Matrix<F>, u8)> + '_ {
        self.images.iter().zip(self.labels.iter().copied())
    }

    /// Images as one `(n, rows * cols)` array, one image per row.
    pub fn flat_images(&self) -> Option<Array2<F>> {
        ndarray_ext::flatten_images(&self.images)
    }

    /// Labels as an `(n, 10)` one-hot array.
    pub fn one_hot_labels(&self) -> Array2<F> {
        ndarray_ext::one_hot(&self.labels, NUM_CLASSES)
    }

    pub fn into_parts(self) -> (ImageSet<F>, LabelSet) {
        (self.images, self.labels)
    }
}

/// Both MNIST splits.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset<F: Pixel> {
    pub train: Split<F>,
    pub test: Split<F>,
    /// Number of classes.
    pub labels: usize,
}

/// Loads MNIST splits from a [`ByteSource`].
///
/// `F` is the element type of the image matrices.
pub struct Mnist<S: ByteSource, F: Pixel = f64> {
    source: S,
    hook: Box<dyn Hook + Send + Sync>,
    verify_counts: bool,
    phantom: PhantomData<F>,
}

impl<S: ByteSource, F: Pixel> Mnist<S, F> {
    pub fn new(source: S) -> Mnist<S, F> {
        Mnist {
            source,
            hook: Box::new(Silent),
            verify_counts: true,
            phantom: PhantomData,
        }
    }

    /// Sets the hook that receives progress events.
    pub fn hook<H: Hook + Send + Sync + 'static>(mut self, hook: H) -> Mnist<S, F> {
        self.hook = Box::new(hook);
        self
    }

    /// Whether to fail when a split's image and label counts differ. On by default.
    pub fn verify_counts(mut self, verify: bool) -> Mnist<S, F> {
        self.verify_counts = verify;
        self
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Images and labels for training (60,000 examples in the official release).
    pub fn get_training_set(&self) -> Result<Split<F>> {
        self.get_split(SplitKind::Train)
    }

    /// Images and labels for evaluation (10,000 examples in the official release).
    pub fn get_test_set(&self) -> Result<Split<F>> {
        self.get_split(SplitKind::Test)
    }

    pub fn get_split(&self, kind: SplitKind) -> Result<Split<F>> {
        let images = self.load_images(kind.images_name())?;
        let labels = self.load_labels(kind.labels_name())?;

        if self.verify_counts && images.len() != labels.len() {
            return Err(Error::CountMismatch {
                split: kind.as_str(),
                images: images.len(),
                labels: labels.len(),
            });
        }
        self.hook.call(&LoadEvent::SplitReady {
            split: kind.as_str(),
            len: images.len(),
        });
        Ok(Split { images, labels })
    }

    /// Loads the training split, then the test split.
    pub fn load(&self) -> Result<Dataset<F>> {
        Ok(Dataset {
            train: self.get_training_set()?,
            test: self.get_test_set()?,
            labels: NUM_CLASSES,
        })
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        self.hook.call(&LoadEvent::Fetching {
            name: name.to_string(),
        });
        Ok(self.source.fetch_raw(name)?)
    }

    fn load_labels(&self, name: &str) -> Result<LabelSet> {
        let raw = self.fetch(name)?;
        let labels = decode_labels(raw).map_err(|source| Error::Decode {
            name: name.to_string(),
            source,
        })?;
        self.hook.call(&LoadEvent::LabelsLoaded {
            name: name.to_string(),
            count: labels.len(),
        });
        Ok(labels)
    }

    fn load_images(&self, name: &str) -> Result<ImageSet<F>> {
        let raw = self.fetch(name)?;
        let images = decode_images::<F>(raw).map_err(|source| Error::Decode {
            name: name.to_string(),
            source,
        })?;
        let (rows, cols) = images.first().map(|m| m.dim()).unwrap_or((0, 0));
        self.hook.call(&LoadEvent::ImagesLoaded {
            name: name.to_string(),
            count: images.len(),
            rows,
            cols,
        });
        Ok(images)
    }
}

/// Loads both splits from `./data`, downloading missing files.
pub fn load() -> Result<Dataset<f64>> {
    Mnist::new(DirSource::default()).load()
}

/// Loads both splits from the IDX files already present in `dir`.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Dataset<f64>> {
    let source = DirSource::new(SourceConfig::offline(dir.as_ref()));
    Mnist::new(source).load()
}
