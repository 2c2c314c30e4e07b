//! # Clinica Core
//!
//! State core of the anamnese intake:
//! - the eight-section document and its merge protocol ([`sections`], [`merge`], [`form`])
//! - repeatable list entities ([`lists`]) and milestone answers ([`milestones`])
//! - the intake wizard and its finish action ([`wizard`])
//! - minimal and full validation ([`validation`])
//! - collaborator seams: subject lookup, submission, record update, preferences
//! - stored detail to form conversion and the read/edit record view
//!
//! **No transport concerns**: nothing here talks to a network. Collaborators are traits with
//! in-memory and file-backed implementations.

pub mod config;
pub mod constants;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod form;
pub mod lists;
pub mod merge;
pub mod milestones;
pub mod preferences;
pub mod record_view;
pub mod sections;
pub mod subjects;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use form::{Anamnese, AnamneseForm, AnamneseSummary, IntakeSession, ListKind};
pub use merge::{FieldPatch, FieldPath};
pub use record_view::{DrawerState, RecordDrawer, RecordView, ViewMode};
pub use sections::Section;
pub use submission::{
    FileSubmissionStore, RecordUpdater, SubmissionError, SubmissionPayload, SubmissionReceipt,
    SubmissionService,
};
pub use validation::{validate_full, validate_minimal, ValidationIssue, ValidationReport};
pub use wizard::{FinishOutcome, Wizard, WizardStep};
