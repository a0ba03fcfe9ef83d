use crate::template::TemplateError;
use thiserror::Error;

/// Everything that can go wrong while transforming one file. Contained at
/// the transform boundary: callers only ever see an `Outcome::Failure`.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),
    #[error("could not serialize EXIF: {0}")]
    ExifWrite(#[from] exif::Error),
    #[error("not a valid JPEG stream: {0}")]
    Jpeg(#[from] img_parts::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
