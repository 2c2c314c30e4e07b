//! Client-generated identifiers for intake list entities.
//!
//! Every repeatable list in an anamnese (caregivers, specialists, exams, attached files, ...)
//! identifies its entries with an id minted on the client when the entry is added. Fresh ids
//! use a *canonical* UUID representation: **32 lowercase hexadecimal characters** (no hyphens).
//!
//! Records loaded from the backend may carry ids minted elsewhere (numeric keys, hyphenated
//! UUIDs). Those are accepted as opaque tokens as long as they are short and URI-safe, so an
//! edit session keeps the identifiers the backend already knows.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, file-backed stores place data under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `submissions/55/0e/550e8400e29b41d4a716446655440000/`

mod entity_id;

pub use entity_id::EntityId;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
