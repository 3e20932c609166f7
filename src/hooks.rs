//! Defining things related to hooks
//!
//! Loading a split reports its progress to a [`Hook`] supplied by the caller instead
//! of writing to a global logger.
//! ```no_run
//! use idx_mnist as mnist;
//! use mnist::hooks;
//!
//! let source = mnist::DirSource::default();
//!
//! // print to stdout
//! let _ = mnist::Mnist::<_, f64>::new(&source).hook(hooks::Print("mnist:")).get_test_set();
//!
//! // forward to the `log` facade
//! let _ = mnist::Mnist::<_, f64>::new(&source).hook(hooks::Log).get_test_set();
//!
//! // raw hook
//! let _ = mnist::Mnist::<_, f64>::new(&source)
//!     .hook(hooks::Raw(|e: &mnist::LoadEvent| eprintln!("{:?}", e)))
//!     .get_test_set();
//! ```
use std::fmt;
use std::path::PathBuf;

/// Progress notifications emitted while loading MNIST.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    /// A dataset file was requested from the byte source.
    Fetching { name: String },
    /// The file was missing locally and is being downloaded.
    Downloading { name: String, url: String },
    /// A downloaded file was written to the local cache.
    Cached { name: String, path: PathBuf },
    LabelsLoaded { name: String, count: usize },
    ImagesLoaded {
        name: String,
        count: usize,
        rows: usize,
        cols: usize,
    },
    /// Both files of a split were decoded and cross-checked.
    SplitReady { split: &'static str, len: usize },
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadEvent::Fetching { name } => write!(f, "Start loading MNIST file {}", name),
            LoadEvent::Downloading { name, url } => {
                write!(f, "{} does not exist. Downloading {}", name, url)
            }
            LoadEvent::Cached { name, path } => write!(f, "{} saved to {}", name, path.display()),
            LoadEvent::LabelsLoaded { count, .. } => write!(f, "{} labels loaded", count),
            LoadEvent::ImagesLoaded {
                count, rows, cols, ..
            } => write!(f, "{} images loaded ({}x{})", count, rows, cols),
            LoadEvent::SplitReady { split, len } => {
                write!(f, "{} split ready with {} examples", split, len)
            }
        }
    }
}

/// Trait for hooks
///
/// hooks can be set using [crate::Mnist::hook()] and [crate::DirSource::hook()].
pub trait Hook {
    fn call(&self, event: &LoadEvent);
}

/// Ignores every event.
pub struct Silent;

/// Prints each event to stdout after the given prefix.
pub struct Print(pub &'static str);

/// Forwards events to the `log` facade.
///
/// Completed steps are logged at `info`, intermediate ones at `debug`.
pub struct Log;

// Calls the given function.
pub struct Raw<FUN: Fn(&LoadEvent) + Send + Sync>(pub FUN);

impl Hook for Silent {
    fn call(&self, _: &LoadEvent) {}
}

impl Hook for Print {
    fn call(&self, event: &LoadEvent) {
        println!("{} {}", self.0, event);
    }
}

impl Hook for Log {
    fn call(&self, event: &LoadEvent) {
        match event {
            LoadEvent::Fetching { .. } | LoadEvent::Cached { .. } => log::debug!("{}", event),
            _ => log::info!("{}", event),
        }
    }
}

impl<FUN: Fn(&LoadEvent) + Send + Sync> Hook for Raw<FUN> {
    fn call(&self, event: &LoadEvent) {
        (self.0)(event)
    }
}

impl<H: Hook + ?Sized> Hook for Box<H> {
    fn call(&self, event: &LoadEvent) {
        (**self).call(event)
    }
}

impl<H: Hook + ?Sized> Hook for std::sync::Arc<H> {
    fn call(&self, event: &LoadEvent) {
        (**self).call(event)
    }
}
