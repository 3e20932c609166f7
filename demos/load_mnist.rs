//! Downloads (if needed) and decodes both MNIST splits.
//!
//! ```text
//! RUST_LOG=info cargo run --example load_mnist -- [config.json]
//! ```
use idx_mnist as mnist;
use mnist::hooks::Log;
use mnist::{DirSource, Mnist, SourceConfig};

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SourceConfig::from_json_file(path),
        None => Ok(SourceConfig::default()),
    };
    let result = config.and_then(|config| {
        let source = DirSource::new(config).hook(Log);
        Mnist::<_, f32>::new(source).hook(Log).load()
    });

    match result {
        Ok(dataset) => {
            let (rows, cols) = dataset.train.image_shape().unwrap_or((0, 0));
            println!(
                "train: {} examples, test: {} examples, {}x{} pixels, {} classes",
                dataset.train.len(),
                dataset.test.len(),
                rows,
                cols,
                dataset.labels
            );
        }
        Err(e) => {
            eprintln!("Error loading MNIST: {}", e);
            std::process::exit(1);
        }
    }
}
