use thiserror::Error;

/// Fatal errors of the page engine.
///
/// Skipped tokens and empty selections are not errors in lenient mode; they
/// surface as log lines and [`crate::assemble::Warning`]s instead.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Invalid page range token: '{0}'")]
    InvalidToken(String),

    #[error("Page {page} is out of range (1-{total})")]
    PageOutOfRange { page: u64, total: u32 },

    #[error("No pages selected, nothing to produce")]
    NothingProduced,

    #[error("Failed to open PDF {name}: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("Rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i64),

    #[error("PDF operation failed: {0}")]
    Codec(#[from] lopdf::Error),

    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PageError>;
