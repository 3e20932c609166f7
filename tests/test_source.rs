extern crate idx_mnist as mnist;

use mnist::test_helper::{image_file, label_file};
use mnist::{ByteSource, DirSource, Error, MemorySource, SourceConfig, SourceError, SplitKind};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn memory_source_returns_copies() {
    let source = MemorySource::new().with("a", vec![1, 2, 3]);
    assert!(source.contains("a"));
    assert_eq!(source.fetch_raw("a").unwrap(), vec![1, 2, 3]);
    assert_eq!(source.fetch_raw("a").unwrap(), vec![1, 2, 3]);
    assert!(matches!(source.fetch_raw("b"), Err(SourceError::NotFound(_))));
}

#[test]
fn dir_source_reads_cached_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("train-labels-idx1-ubyte"), label_file(&[4, 2])).unwrap();

    let source = DirSource::new(SourceConfig::offline(dir.path()));
    assert_eq!(
        source.fetch_raw("train-labels-idx1-ubyte").unwrap(),
        label_file(&[4, 2])
    );
    assert!(matches!(
        source.fetch_raw("t10k-labels-idx1-ubyte"),
        Err(SourceError::NotFound(name)) if name == "t10k-labels-idx1-ubyte"
    ));
}

#[test]
fn load_dir_reads_both_splits() {
    let dir = TempDir::new().unwrap();
    let files = [
        (SplitKind::Train.images_name(), image_file(2, 2, 2, &[0, 1, 2, 3, 4, 5, 6, 7])),
        (SplitKind::Train.labels_name(), label_file(&[3, 9])),
        (SplitKind::Test.images_name(), image_file(1, 2, 2, &[255, 0, 0, 255])),
        (SplitKind::Test.labels_name(), label_file(&[0])),
    ];
    for (name, bytes) in files.iter() {
        fs::write(dir.path().join(name), bytes).unwrap();
    }

    let dataset = mnist::load_dir(dir.path()).unwrap();
    assert_eq!(dataset.train.labels, vec![3, 9]);
    assert_eq!(dataset.train.images[1], ndarray::arr2(&[[4., 5.], [6., 7.]]));
    assert_eq!(dataset.test.images[0][[1, 1]], 255.);
}

#[test]
fn unreachable_host_is_a_network_failure() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("nested").join("data");
    let config = SourceConfig {
        data_dir: data_dir.clone(),
        base_url: "http://127.0.0.1:9/mnist/".to_string(),
        download: true,
        timeout_secs: 5,
    };
    let source = DirSource::new(config);
    let err = source.fetch_raw("t10k-labels-idx1-ubyte").unwrap_err();
    assert!(matches!(err, SourceError::Network { .. }), "{:?}", err);
    assert!(std::error::Error::source(&err).is_some());
    // the cache directory is created before fetching
    assert!(data_dir.is_dir());
    assert!(!data_dir.join("t10k-labels-idx1-ubyte").exists());
}

#[test]
fn config_defaults() {
    let config = SourceConfig::default();
    assert_eq!(config.data_dir, PathBuf::from("data"));
    assert!(config.base_url.ends_with('/'));
    assert!(config.download);
    assert_eq!(SourceConfig::from_json_str("{}").unwrap(), config);
}

#[test]
fn config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mnist.json");
    fs::write(
        &path,
        r#"{ "data_dir": "cache/mnist", "download": false, "timeout_secs": 5 }"#,
    )
    .unwrap();
    let config = SourceConfig::from_json_file(&path).unwrap();
    assert_eq!(config.data_dir, PathBuf::from("cache/mnist"));
    assert!(!config.download);
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.base_url, SourceConfig::default().base_url);

    assert!(matches!(
        SourceConfig::from_json_str(r#"{ "download": "yes" }"#),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        SourceConfig::from_json_file(dir.path().join("missing.json")),
        Err(Error::Source(SourceError::LocalIo { .. }))
    ));
}

#[cfg(feature = "download")]
mod download {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use mnist::hooks::Raw;
    use mnist::LoadEvent;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn bypass_proxy_for_localhost() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        std::env::set_var("no_proxy", "127.0.0.1,localhost");
    }

    // Answers a single HTTP request with `body` and returns its request line.
    fn serve_once(body: Vec<u8>) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/mnist/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/gzip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            let request = String::from_utf8_lossy(&request);
            request.lines().next().unwrap_or("").to_string()
        });
        (base_url, handle)
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(bytes).unwrap();
        gz.finish().unwrap()
    }

    fn config(data_dir: &std::path::Path, base_url: &str) -> SourceConfig {
        SourceConfig {
            data_dir: data_dir.to_path_buf(),
            base_url: base_url.to_string(),
            download: true,
            timeout_secs: 5,
        }
    }

    #[test]
    fn downloads_once_then_serves_cache() {
        bypass_proxy_for_localhost();
        let labels = label_file(&[5, 0, 4, 1, 9]);
        let (base_url, server) = serve_once(gzip(&labels));

        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let source = DirSource::new(config(&data_dir, &base_url))
            .hook(Raw(move |e: &LoadEvent| sink.lock().unwrap().push(e.clone())));

        let name = SplitKind::Train.labels_name();
        assert_eq!(source.fetch_raw(name).unwrap(), labels);
        assert_eq!(
            server.join().unwrap(),
            format!("GET /mnist/{}.gz HTTP/1.1", name)
        );

        let path = data_dir.join(name);
        assert_eq!(fs::read(&path).unwrap(), labels);
        assert!(!path.with_extension("part").exists());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                LoadEvent::Downloading {
                    name: name.to_string(),
                    url: format!("{}{}.gz", base_url, name)
                },
                LoadEvent::Cached {
                    name: name.to_string(),
                    path: path.clone()
                },
            ]
        );

        // the server has shut down, so this can only come from disk
        assert_eq!(source.fetch_raw(name).unwrap(), labels);
        assert_eq!(events.lock().unwrap().len(), 2);
        assert_eq!(mnist::decode_labels(labels).unwrap(), vec![5, 0, 4, 1, 9]);
    }

    #[test]
    fn corrupt_archive_is_a_network_failure() {
        bypass_proxy_for_localhost();
        let (base_url, server) = serve_once(label_file(&[1, 2, 3]));

        let dir = TempDir::new().unwrap();
        let source = DirSource::new(config(dir.path(), &base_url));
        let name = SplitKind::Test.labels_name();
        let err = source.fetch_raw(name).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, SourceError::Network { .. }), "{:?}", err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(!dir.path().join(name).exists());
        assert!(!dir.path().join(name).with_extension("part").exists());
    }
}
