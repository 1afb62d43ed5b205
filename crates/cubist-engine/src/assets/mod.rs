//! Image loader: decodes named images off the render thread and hands them
//! back through a one-shot handle.

mod images;

pub use images::{ImageCompleter, ImageLoadError, ImageLoader, ImageSet, PendingImages, pending};
