use crate::FilesError;
use chrono::{DateTime, Utc};
use clinica_types::NonEmptyText;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder (relative to a document directory) holding stored blobs.
pub const FILES_FOLDER_NAME: &str = "files";

/// Media type used when the content does not match a known signature.
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A file selected by the user, held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileBlob {
    name: NonEmptyText,
    media_type: String,
    bytes: Vec<u8>,
}

impl FileBlob {
    /// Wraps raw bytes. The media type is sniffed from the content (best-effort).
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self, FilesError> {
        let name =
            NonEmptyText::new(name).map_err(|_| FilesError::InvalidName(name.to_string()))?;
        let media_type = infer::get(&bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());

        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    /// Reads a file from disk. The file name becomes the initial display name.
    pub fn read_path(path: &Path) -> Result<Self, FilesError> {
        let bytes = fs::read(path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read source file {}: {}", path.display(), e),
            ))
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("arquivo");
        Self::from_bytes(name, bytes)
    }

    /// Replaces the display name, keeping the content.
    pub fn renamed(mut self, name: &str) -> Result<Self, FilesError> {
        self.name =
            NonEmptyText::new(name).map_err(|_| FilesError::InvalidName(name.to_string()))?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex SHA-256 of the content.
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Record of a blob written by [`BlobStore`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredBlob {
    /// Hexadecimal SHA-256 digest of the content
    pub hash: String,

    /// Path relative to the store root
    pub relative_path: String,

    pub size_bytes: u64,

    pub media_type: String,

    /// Display name at the time of storage
    pub name: String,

    pub stored_at: DateTime<Utc>,
}

/// Content-addressed blob storage rooted at a document directory.
///
/// Writing the same content twice is not an error: the existing copy is reused.
#[derive(Debug)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Binds the store to an existing directory.
    pub fn new(root: &Path) -> Result<Self, FilesError> {
        if !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Writes `blob` under `files/sha256/<shard>/<hash>`.
    pub fn put(&self, blob: &FileBlob) -> Result<StoredBlob, FilesError> {
        let hash = blob.sha256();
        let relative_path = Self::relative_path(&hash);
        let storage_path = self.root.join(&relative_path);

        if storage_path.exists() {
            tracing::debug!("blob {} already stored, reusing", hash);
        } else {
            if let Some(parent) = storage_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&storage_path, blob.bytes()).map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write file to {}: {}", storage_path.display(), e),
                ))
            })?;
        }

        Ok(StoredBlob {
            hash,
            relative_path,
            size_bytes: blob.size(),
            media_type: blob.media_type().to_string(),
            name: blob.name().to_string(),
            stored_at: Utc::now(),
        })
    }

    /// Reads stored content back by hash.
    pub fn read(&self, hash: &str) -> Result<Vec<u8>, FilesError> {
        let path = self.root.join(Self::relative_path(hash));
        Ok(fs::read(path)?)
    }

    fn relative_path(hash: &str) -> String {
        let shard = hash.get(0..2).unwrap_or("00");
        format!("{}/sha256/{}/{}", FILES_FOLDER_NAME, shard, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PDF_MAGIC: &[u8] = b"%PDF-1.4\n%fake";

    #[test]
    fn from_bytes_detects_media_type_and_size() {
        let blob = FileBlob::from_bytes("laudo.pdf", PDF_MAGIC.to_vec()).expect("blob");
        assert_eq!(blob.media_type(), "application/pdf");
        assert_eq!(blob.size(), PDF_MAGIC.len() as u64);
        assert_eq!(blob.name(), "laudo.pdf");
    }

    #[test]
    fn unknown_content_falls_back_to_octet_stream() {
        let blob = FileBlob::from_bytes("notes.bin", vec![0, 1, 2, 3]).expect("blob");
        assert_eq!(blob.media_type(), FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn rename_keeps_content_and_rejects_blank_names() {
        let blob = FileBlob::from_bytes("a.pdf", PDF_MAGIC.to_vec()).expect("blob");
        let hash = blob.sha256();
        let renamed = blob.renamed(" EEG 2024 ").expect("rename");
        assert_eq!(renamed.name(), "EEG 2024");
        assert_eq!(renamed.sha256(), hash);
        assert!(matches!(renamed.renamed("  "), Err(FilesError::InvalidName(_))));
    }

    #[test]
    fn read_path_uses_file_name() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("exame.pdf");
        fs::write(&path, PDF_MAGIC).expect("write");

        let blob = FileBlob::read_path(&path).expect("read");
        assert_eq!(blob.name(), "exame.pdf");
        assert_eq!(blob.bytes(), PDF_MAGIC);
    }

    #[test]
    fn store_writes_content_addressed_and_reuses_duplicates() {
        let dir = TempDir::new().expect("tempdir");
        let store = BlobStore::new(dir.path()).expect("store");
        let blob = FileBlob::from_bytes("laudo.pdf", PDF_MAGIC.to_vec()).expect("blob");

        let first = store.put(&blob).expect("first put");
        assert!(first.relative_path.starts_with("files/sha256/"));
        assert!(dir.path().join(&first.relative_path).is_file());

        let second = store.put(&blob).expect("second put");
        assert_eq!(first.hash, second.hash);
        assert_eq!(store.read(&first.hash).expect("read back"), PDF_MAGIC);
    }

    #[test]
    fn store_requires_existing_directory() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("missing");
        assert!(matches!(
            BlobStore::new(&missing),
            Err(FilesError::InvalidRootDirectory(_))
        ));
    }
}
