use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;

use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to load image `{key}` from {}", path.display())]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to start the image loader thread")]
    Spawn(#[source] std::io::Error),

    #[error("image loader stopped without reporting a result")]
    Disconnected,
}

/// Decoded images by logical key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImageSet {
    images: HashMap<String, RgbaImage>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, image: RgbaImage) {
        self.images.insert(key.into(), image);
    }

    pub fn get(&self, key: &str) -> Option<&RgbaImage> {
        self.images.get(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

type LoadResult = Result<ImageSet, ImageLoadError>;

/// Creates a linked completer/handle pair.
pub fn pending() -> (ImageCompleter, PendingImages) {
    let (tx, rx) = flume::bounded(1);
    (
        ImageCompleter { tx },
        PendingImages {
            rx,
            resolved: false,
        },
    )
}

/// Sending half of a one-shot image load. Consumed on completion.
#[derive(Debug)]
pub struct ImageCompleter {
    tx: flume::Sender<LoadResult>,
}

impl ImageCompleter {
    pub fn complete(self, result: LoadResult) {
        // The handle may already be gone (window closed mid-load).
        if self.tx.send(result).is_err() {
            log::debug!("image load finished after its handle was dropped");
        }
    }
}

/// Receiving half of a one-shot image load.
///
/// Resolves exactly once: the first [`try_take`](Self::try_take) that sees
/// the result returns it, every later call returns `None`.
#[derive(Debug)]
pub struct PendingImages {
    rx: flume::Receiver<LoadResult>,
    resolved: bool,
}

impl PendingImages {
    /// A handle that is already complete with `images`.
    pub fn ready(images: ImageSet) -> Self {
        let (completer, pending) = pending();
        completer.complete(Ok(images));
        pending
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Polls for the result without blocking.
    pub fn try_take(&mut self) -> Option<LoadResult> {
        if self.resolved {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.resolved = true;
                Some(result)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.resolved = true;
                Some(Err(ImageLoadError::Disconnected))
            }
        }
    }
}

/// Loads a set of images on a worker thread.
///
/// Every image is decoded to RGBA8. The first failure aborts the whole set.
/// There is no timeout: the handle stays pending until the worker reports.
#[derive(Debug, Default, Clone)]
pub struct ImageLoader {
    requests: Vec<(String, PathBuf)>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.requests.push((key.into(), path.into()));
        self
    }

    pub fn spawn(self) -> Result<PendingImages, ImageLoadError> {
        let (completer, pending) = pending();

        thread::Builder::new()
            .name("cubist-image-loader".into())
            .spawn(move || completer.complete(self.load_all()))
            .map_err(ImageLoadError::Spawn)?;

        Ok(pending)
    }

    fn load_all(self) -> LoadResult {
        let mut set = ImageSet::new();
        for (key, path) in self.requests {
            let image = load_one(&key, &path)?;
            set.insert(key, image);
        }
        Ok(set)
    }
}

fn load_one(key: &str, path: &Path) -> Result<RgbaImage, ImageLoadError> {
    let image = image::open(path)
        .map_err(|source| ImageLoadError::Decode {
            key: key.to_string(),
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    log::info!(
        "loaded image `{key}` from {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}
