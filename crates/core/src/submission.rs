//! Submission of finished documents and replacement of stored ones.
//!
//! The wizard talks to a [`SubmissionService`]; the record view talks to a
//! [`RecordUpdater`]. [`FileSubmissionStore`] implements both on top of a directory:
//!
//! ```text
//! <root>/
//!   <s1>/<s2>/<submission-id>/
//!     anamnese.json
//!     attachments.json
//!     files/sha256/<shard>/<hash>
//!   records/
//!     <record-id>/anamnese.json
//! ```

use crate::config::ensure_dir;
use crate::constants::{ATTACHMENTS_MANIFEST_FILENAME, DOCUMENT_FILENAME};
use crate::form::Anamnese;
use crate::validation::validate_full;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use clinica_files::{BlobStore, FileBlob, StoredBlob};
use clinica_uuid::EntityId;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const RECORDS_DIR_NAME: &str = "records";

/// A file kept in memory until the document is submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingAttachment {
    pub exam_id: EntityId,
    pub file_id: EntityId,
    pub blob: FileBlob,
}

/// Everything sent on finish: the assembled document and the bytes of its active files.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionPayload {
    pub document: Anamnese,
    pub attachments: Vec<PendingAttachment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: EntityId,
    pub submitted_at: DateTime<Utc>,
    /// Where the document was written, when the service stores it locally.
    pub location: Option<PathBuf>,
}

/// A field-level error reported by a collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("rejected with {} field error(s)", .errors.len())]
    Rejected {
        errors: Vec<FieldError>,
        message: Option<String>,
    },
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl SubmissionError {
    /// Messages to show the user.
    ///
    /// Field errors win over the general message. Empty when the collaborator gave no
    /// detail; callers fall back to a generic message.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            SubmissionError::Rejected { errors, .. } if !errors.is_empty() => errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect(),
            SubmissionError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => vec![message.clone()],
            _ => Vec::new(),
        }
    }
}

pub trait SubmissionService {
    fn submit(
        &self,
        payload: &SubmissionPayload,
        skip_full_validation: bool,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Replaces a stored record with an edited document (full replace).
pub trait RecordUpdater {
    fn replace(&self, record_id: &str, document: &Anamnese) -> Result<(), SubmissionError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry<'a> {
    exam_id: &'a EntityId,
    file_id: &'a EntityId,
    #[serde(flatten)]
    stored: StoredBlob,
}

/// Directory-backed submission store.
#[derive(Debug, Clone)]
pub struct FileSubmissionStore {
    root: PathBuf,
}

impl FileSubmissionStore {
    /// Binds the store to `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of submission `id`.
    pub fn submission_dir(&self, id: &EntityId) -> PathBuf {
        id.sharded_dir(&self.root)
    }

    /// Reads a submitted document back.
    pub fn read_document(&self, id: &EntityId) -> CoreResult<Anamnese> {
        read_document_at(&self.submission_dir(id).join(DOCUMENT_FILENAME))
    }

    /// Reads a replaced record back.
    pub fn read_record(&self, record_id: &str) -> CoreResult<Anamnese> {
        let id = EntityId::parse(record_id)?;
        read_document_at(&self.record_dir(&id).join(DOCUMENT_FILENAME))
    }

    fn record_dir(&self, id: &EntityId) -> PathBuf {
        self.root.join(RECORDS_DIR_NAME).join(id.as_str())
    }

    fn write(&self, dir: &Path, payload: &SubmissionPayload) -> CoreResult<()> {
        ensure_dir(dir)?;
        fs::write(dir.join(DOCUMENT_FILENAME), payload.document.to_json()?)
            .map_err(CoreError::FileWrite)?;

        if payload.attachments.is_empty() {
            return Ok(());
        }

        let blobs = BlobStore::new(dir)?;
        let mut manifest = Vec::with_capacity(payload.attachments.len());
        for attachment in &payload.attachments {
            manifest.push(ManifestEntry {
                exam_id: &attachment.exam_id,
                file_id: &attachment.file_id,
                stored: blobs.put(&attachment.blob)?,
            });
        }
        let manifest = serde_json::to_string_pretty(&manifest).map_err(CoreError::Serialization)?;
        fs::write(dir.join(ATTACHMENTS_MANIFEST_FILENAME), manifest).map_err(CoreError::FileWrite)
    }
}

fn read_document_at(path: &Path) -> CoreResult<Anamnese> {
    let text = fs::read_to_string(path).map_err(CoreError::FileRead)?;
    Anamnese::from_json(&text)
}

fn rejected_by_validation(document: &Anamnese) -> Option<SubmissionError> {
    let report = validate_full(document);
    if report.is_valid() {
        return None;
    }
    Some(SubmissionError::Rejected {
        errors: report
            .issues()
            .iter()
            .map(|issue| FieldError::new(&issue.path, &issue.message))
            .collect(),
        message: None,
    })
}

impl SubmissionService for FileSubmissionStore {
    fn submit(
        &self,
        payload: &SubmissionPayload,
        skip_full_validation: bool,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if !skip_full_validation {
            if let Some(err) = rejected_by_validation(&payload.document) {
                return Err(err);
            }
        }

        let id = EntityId::new();
        let dir = self.submission_dir(&id);
        self.write(&dir, payload)
            .map_err(|e| SubmissionError::Unavailable(e.to_string()))?;

        tracing::info!(
            "stored anamnese {} with {} attachment(s)",
            id,
            payload.attachments.len()
        );
        Ok(SubmissionReceipt {
            id,
            submitted_at: Utc::now(),
            location: Some(dir),
        })
    }
}

impl RecordUpdater for FileSubmissionStore {
    fn replace(&self, record_id: &str, document: &Anamnese) -> Result<(), SubmissionError> {
        let id = EntityId::parse(record_id).map_err(|e| SubmissionError::Rejected {
            errors: vec![],
            message: Some(e.to_string()),
        })?;
        let payload = SubmissionPayload {
            document: document.clone(),
            attachments: Vec::new(),
        };
        self.write(&self.record_dir(&id), &payload)
            .map_err(|e| SubmissionError::Unavailable(e.to_string()))?;
        tracing::info!("replaced record {}", id);
        Ok(())
    }
}

/// Test double that records every call.
#[cfg(test)]
pub(crate) struct RecordingSubmitter {
    calls: std::cell::RefCell<Vec<(SubmissionPayload, bool)>>,
    fails: bool,
    error: std::cell::RefCell<Option<SubmissionError>>,
}

#[cfg(test)]
impl RecordingSubmitter {
    pub(crate) fn accepting() -> Self {
        Self {
            calls: Default::default(),
            fails: false,
            error: Default::default(),
        }
    }

    /// Fails every call: the first with `error`, later ones as unavailable.
    pub(crate) fn failing(error: SubmissionError) -> Self {
        Self {
            calls: Default::default(),
            fails: true,
            error: std::cell::RefCell::new(Some(error)),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub(crate) fn last_skip_flag(&self) -> Option<bool> {
        self.calls.borrow().last().map(|(_, skip)| *skip)
    }

    pub(crate) fn last_payload(&self) -> Option<SubmissionPayload> {
        self.calls.borrow().last().map(|(payload, _)| payload.clone())
    }
}

#[cfg(test)]
impl SubmissionService for RecordingSubmitter {
    fn submit(
        &self,
        payload: &SubmissionPayload,
        skip_full_validation: bool,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.calls
            .borrow_mut()
            .push((payload.clone(), skip_full_validation));
        if self.fails {
            let err = self.error.borrow_mut().take();
            return Err(err.unwrap_or_else(|| SubmissionError::Unavailable("down".into())));
        }
        Ok(SubmissionReceipt {
            id: EntityId::new(),
            submitted_at: Utc::now(),
            location: None,
        })
    }
}
