//! Attachment blobs for intake forms.
//!
//! Files picked for an exam are held in memory until the owning anamnese is submitted. Nothing
//! is uploaded while the form is being filled in; the display name can be overridden by the
//! user without touching the bytes.
//!
//! At submission time a file-backed store writes each blob once, content-addressed:
//!
//! ```text
//! <document_dir>/
//! └── files/
//!     └── sha256/
//!         └── ab/
//!             └── ab3f9e…
//! ```

mod blob;

pub use blob::{BlobStore, FileBlob, StoredBlob, FILES_FOLDER_NAME};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// The display name left nothing after trimming
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
