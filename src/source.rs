//! Byte sources: where the raw IDX files come from.
//!
//! The decoders only ever see a complete `Vec<u8>`. A [`ByteSource`] maps a dataset
//! name such as `"train-images-idx3-ubyte"` to those bytes, downloading and caching
//! the file first if it has to.
use crate::errors::{BoxError, SourceError};
use crate::hooks::{Hook, LoadEvent, Silent};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Provides the complete raw content of a dataset file by name.
///
/// The name is opaque to the decoders and passed through unchanged.
pub trait ByteSource {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).fetch_raw(name)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).fetch_raw(name)
    }
}

/// In-memory files keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    /// Adds (or replaces) a file and returns `self` for chaining.
    pub fn with<S: Into<String>>(mut self, name: S, bytes: Vec<u8>) -> MemorySource {
        self.insert(name, bytes);
        self
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.files.insert(name.into(), bytes)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}

impl ByteSource for MemorySource {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}

/// Settings of a [`DirSource`].
///
/// Every field has a default, so a JSON config only needs the fields it changes:
/// ```
/// let config = idx_mnist::SourceConfig::from_json_str(r#"{ "data_dir": "/tmp/mnist" }"#).unwrap();
/// assert_eq!(config.data_dir, std::path::PathBuf::from("/tmp/mnist"));
/// assert!(config.download);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the decompressed IDX files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// URL prefix; a file `name` is fetched from `<base_url><name>.gz`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Download missing files. When `false`, a missing file is an error.
    #[serde(default = "default_download")]
    pub download: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_base_url() -> String {
    "https://ossci-datasets.s3.amazonaws.com/mnist/".to_string()
}

fn default_download() -> bool {
    true
}

fn default_timeout() -> u64 {
    60
}

impl Default for SourceConfig {
    fn default() -> SourceConfig {
        SourceConfig {
            data_dir: default_data_dir(),
            base_url: default_base_url(),
            download: default_download(),
            timeout_secs: default_timeout(),
        }
    }
}

impl SourceConfig {
    /// Config reading from `data_dir` without ever downloading.
    pub fn offline<P: Into<PathBuf>>(data_dir: P) -> SourceConfig {
        SourceConfig {
            data_dir: data_dir.into(),
            download: false,
            ..SourceConfig::default()
        }
    }

    pub fn from_json_str(json: &str) -> crate::Result<SourceConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> crate::Result<SourceConfig> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
        SourceConfig::from_json_str(&json)
    }
}

/// Reads files from a local directory, downloading the missing ones.
///
/// A file already on disk is never fetched again, so the network is hit at most once
/// per file across runs.
pub struct DirSource {
    config: SourceConfig,
    hook: Box<dyn Hook + Send + Sync>,
}

impl Default for DirSource {
    fn default() -> DirSource {
        DirSource::new(SourceConfig::default())
    }
}

impl DirSource {
    pub fn new(config: SourceConfig) -> DirSource {
        DirSource {
            config,
            hook: Box::new(Silent),
        }
    }

    /// Sets the hook that receives download notifications.
    pub fn hook<H: Hook + Send + Sync + 'static>(mut self, hook: H) -> DirSource {
        self.hook = Box::new(hook);
        self
    }

    #[inline]
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Local path of the file `name`.
    #[inline]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(name)
    }

    fn download_to(&self, name: &str, path: &Path) -> Result<Vec<u8>, SourceError> {
        let data_dir = &self.config.data_dir;
        fs::create_dir_all(data_dir).map_err(|e| SourceError::io(data_dir, e))?;

        let url = format!("{}{}.gz", self.config.base_url, name);
        self.hook.call(&LoadEvent::Downloading {
            name: name.to_string(),
            url: url.clone(),
        });
        let bytes = fetch_gz(&url, self.config.timeout_secs).map_err(|source| {
            SourceError::Network {
                name: name.to_string(),
                source,
            }
        })?;

        // write next to the target and rename, so an interrupted download never
        // leaves a partial file under the real name
        let part = path.with_extension("part");
        fs::write(&part, &bytes).map_err(|e| SourceError::io(&part, e))?;
        fs::rename(&part, path).map_err(|e| SourceError::io(path, e))?;
        self.hook.call(&LoadEvent::Cached {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
        Ok(bytes)
    }
}

impl ByteSource for DirSource {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.path_of(name);
        if path.is_file() {
            return fs::read(&path).map_err(|e| SourceError::io(path, e));
        }
        if !self.config.download {
            return Err(SourceError::NotFound(name.to_string()));
        }
        self.download_to(name, &path)
    }
}

/// Downloads `url` and gunzips the body.
#[cfg(feature = "download")]
fn fetch_gz(url: &str, timeout_secs: u64) -> Result<Vec<u8>, BoxError> {
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::time::Duration;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    let body = client.get(url).send()?.error_for_status()?.bytes()?;

    let mut decompressed = Vec::new();
    GzDecoder::new(&body[..]).read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

#[cfg(not(feature = "download"))]
fn fetch_gz(url: &str, _timeout_secs: u64) -> Result<Vec<u8>, BoxError> {
    Err(format!("cannot fetch {}: built without the `download` feature", url).into())
}
