//! The [`EntityId`] type.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Upper bound for externally supplied ids.
const MAX_ID_LEN: usize = 64;

/// Opaque identifier of a list entity.
///
/// Ids created with [`EntityId::new`] are canonical UUIDs (32 lowercase hex characters).
/// Ids parsed with [`EntityId::parse`] only need to be non-empty, at most 64 characters and
/// restricted to ASCII alphanumerics, `-` and `_`.
///
/// Equality is plain string equality; `"42"` and `"042"` are different ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct EntityId(String);

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityId {
    /// Mints a fresh canonical id from a random (v4) UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validates an externally supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is empty, longer than 64 characters or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if input.is_empty() {
            return Err(UuidError::InvalidInput("id cannot be empty".into()));
        }

        if input.len() > MAX_ID_LEN {
            return Err(UuidError::InvalidInput(format!(
                "id exceeds maximum length of {} characters",
                MAX_ID_LEN
            )));
        }

        let ok = input
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'));
        if !ok {
            return Err(UuidError::InvalidInput(format!(
                "id contains invalid characters (only alphanumeric, '-', '_' allowed), got: '{}'",
                input
            )));
        }

        Ok(Self(input.to_owned()))
    }

    /// Returns true if `input` is a canonical UUID (32 lowercase hex characters).
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns true if this id was minted locally (or is otherwise canonical).
    pub fn is_canonical_id(&self) -> bool {
        Self::is_canonical(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first two pairs of
    /// characters of a canonical id.
    ///
    /// Non-canonical ids are not sharded: `parent_dir/<id>/`.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        if !self.is_canonical_id() {
            return parent_dir.join(&self.0);
        }
        let s1 = &self.0[0..2];
        let s2 = &self.0[2..4];
        parent_dir.join(s1).join(s2).join(&self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = UuidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EntityId::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_ids_are_canonical_and_distinct() {
        let ids: HashSet<EntityId> = (0..64).map(|_| EntityId::new()).collect();
        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(EntityId::is_canonical_id));
    }

    #[test]
    fn parse_accepts_backend_ids() {
        assert_eq!(EntityId::parse("42").expect("numeric id").as_str(), "42");
        assert!(EntityId::parse("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(EntityId::parse("exam_01").is_ok());
    }

    #[test]
    fn parse_rejects_empty_long_and_unsafe_ids() {
        let err = EntityId::parse("").expect_err("should reject empty");
        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("cannot be empty")));

        let err = EntityId::parse(&"a".repeat(65)).expect_err("should reject too long");
        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("maximum length")));

        for bad in ["a/b", "a b", "a.b", "id$"] {
            let err = EntityId::parse(bad).expect_err("should reject unsafe id");
            assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("invalid characters")));
        }
    }

    #[test]
    fn sharded_dir_uses_prefix_pairs_for_canonical_ids() {
        let id = EntityId::parse("550e8400e29b41d4a716446655440000").expect("canonical");
        let dir = id.sharded_dir(Path::new("/base"));
        assert_eq!(
            dir,
            PathBuf::from("/base/55/0e/550e8400e29b41d4a716446655440000")
        );

        let backend = EntityId::parse("42").expect("backend id");
        assert_eq!(backend.sharded_dir(Path::new("/base")), PathBuf::from("/base/42"));
    }

    #[test]
    fn serde_round_trips_as_plain_string_and_validates() {
        let id = EntityId::parse("abc123").expect("valid");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc123\"");

        let back: EntityId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);

        assert!(serde_json::from_str::<EntityId>("\"bad id\"").is_err());
    }
}
