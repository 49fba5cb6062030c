//! Error types
//!
//! Unknown member names are not errors: they resolve to `None`.

use crate::item::Shape;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("XML document has not been loaded")]
    InvalidState,

    #[error("malformed XML document: {0}")]
    MalformedDocument(#[from] roxmltree::Error),

    #[error("document nesting exceeds {0} levels")]
    DepthLimitExceeded(usize),

    #[error("cannot convert {from} to {target}")]
    ConversionUnsupported { from: &'static str, target: Shape },

    #[error("{0} produced no child mapping")]
    PreconditionViolation(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
