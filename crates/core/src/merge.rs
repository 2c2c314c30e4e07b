//! Section merge protocol.
//!
//! Sections are merged through their JSON tree: the current value is serialised, the patch is
//! written at its path and the tree is decoded back into a section, so every field that the
//! patch does not address keeps its previous value. Decoding relies on `#[serde(default)]`, so
//! anything absent comes back as its default.
//!
//! Paths use the wire names and are relative to a section. A segment that addresses a list
//! selects the element whose `id` equals the segment:
//!
//! ```text
//! neuropsicomotor.sustentouCabeca.meses
//! cuidadores.6f1c...e2.nome
//! exames.91ab...07.arquivos.55d0...c3.removed
//! ```

use crate::sections::Section;
use crate::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A dotted path of wire field names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses `a.b.c`. Every segment must be non-empty.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let segments: Vec<String> = raw.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(CoreError::InvalidInput(format!("invalid field path '{raw}'")));
        }
        Ok(Self { segments })
    }

    pub fn from_segments(segments: Vec<String>) -> CoreResult<Self> {
        if segments.is_empty() || segments.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidInput(
                "field path needs at least one segment".into(),
            ));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Splits off the first segment, returning it and the remaining path (if any).
    pub fn split_first(&self) -> (&str, Option<FieldPath>) {
        let rest = self.segments[1..].to_vec();
        let rest = (!rest.is_empty()).then_some(FieldPath { segments: rest });
        (&self.segments[0], rest)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

/// A single field write: the value to store at `path`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPatch {
    path: FieldPath,
    value: Value,
}

impl FieldPatch {
    pub fn new(path: FieldPath, value: Value) -> Self {
        Self { path, value }
    }

    pub fn parse(path: &str, value: Value) -> CoreResult<Self> {
        Ok(Self::new(FieldPath::parse(path)?, value))
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// What a `null` inside an incoming object does to the value underneath.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Nulls {
    /// Absent and null are the same: the base value stays.
    KeepBase,
    /// `null` is written as is (clears an optional answer).
    Write,
}

/// Builds a total section from a partial JSON object.
///
/// Keys that the section does not have are rejected; `null` leaves the default in place and
/// arrays replace the default list.
pub fn from_partial<S: Section>(partial: Value) -> CoreResult<S> {
    let mut tree = to_tree(&S::default())?;
    match &partial {
        Value::Null => {}
        Value::Object(_) => {
            let mut path = vec![S::KEY.to_string()];
            overlay(&mut tree, partial.clone(), Nulls::KeepBase, &mut path)?;
        }
        other => {
            return Err(CoreError::InvalidPatch {
                path: S::KEY.to_string(),
                message: format!("expected an object, got {}", kind_of(other)),
            })
        }
    }
    let mut section: S = decode(tree, S::KEY)?;
    section.settle(&partial);
    Ok(section)
}

/// Returns a new section with `patch` applied to `current`.
///
/// An object written onto an object is merged key by key; any other value replaces the
/// target. Addressing a list element whose id is not in the list leaves the section
/// unchanged.
pub fn apply_patch<S: Section>(current: &S, patch: &FieldPatch) -> CoreResult<S> {
    match patch_value(current, patch, S::KEY)? {
        Some(mut next) => {
            next.settle(&written_tree(patch.path().segments(), patch.value()));
            Ok(next)
        }
        None => Ok(current.clone()),
    }
}

/// Nests `value` under `segments`: `["a", "b"]` and `1` give `{"a": {"b": 1}}`.
fn written_tree(segments: &[String], value: &Value) -> Value {
    segments.iter().rev().fold(value.clone(), |inner, segment| {
        let mut map = Map::new();
        map.insert(segment.clone(), inner);
        Value::Object(map)
    })
}

/// Writes `patch` into any serialisable value. `context` prefixes paths in errors.
///
/// Returns `None` when the path runs through a list element that does not exist.
pub(crate) fn patch_value<T>(current: &T, patch: &FieldPatch, context: &str) -> CoreResult<Option<T>>
where
    T: Serialize + DeserializeOwned,
{
    let mut tree = to_tree(current)?;
    let segments = patch.path().segments();

    let target = match locate(&mut tree, segments, context)? {
        Located::Found(target) => target,
        Located::MissingEntity(id) => {
            tracing::debug!("patch {}.{} ignored, no element {}", context, patch.path(), id);
            return Ok(None);
        }
    };

    let value = patch.value().clone();
    if target.is_object() && value.is_object() {
        let mut path = vec![context.to_string()];
        path.extend(segments.iter().cloned());
        overlay(target, value, Nulls::Write, &mut path)?;
    } else {
        *target = value;
    }

    decode(tree, &format!("{context}.{}", patch.path())).map(Some)
}

enum Located<'a> {
    Found(&'a mut Value),
    MissingEntity(String),
}

fn locate<'a>(root: &'a mut Value, segments: &[String], section: &str) -> CoreResult<Located<'a>> {
    let mut node = root;
    for (depth, segment) in segments.iter().enumerate() {
        node = match node {
            Value::Object(map) => map
                .get_mut(segment)
                .ok_or_else(|| unknown_field(section, &segments[..=depth]))?,
            Value::Array(items) => {
                let found = items
                    .iter_mut()
                    .find(|item| item.get("id").and_then(Value::as_str) == Some(segment.as_str()));
                match found {
                    Some(item) => item,
                    None => return Ok(Located::MissingEntity(segment.clone())),
                }
            }
            _ => return Err(unknown_field(section, &segments[..=depth])),
        };
    }
    Ok(Located::Found(node))
}

fn overlay(base: &mut Value, incoming: Value, nulls: Nulls, path: &mut Vec<String>) -> CoreResult<()> {
    match (base, incoming) {
        (_, Value::Null) if nulls == Nulls::KeepBase => Ok(()),
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                let Some(slot) = base_map.get_mut(&key) else {
                    return Err(CoreError::UnknownField(format!("{}.{key}", path.join("."))));
                };
                path.push(key);
                overlay(slot, value, nulls, path)?;
                path.pop();
            }
            Ok(())
        }
        (slot, value) => {
            *slot = value;
            Ok(())
        }
    }
}

fn to_tree<T: Serialize>(value: &T) -> CoreResult<Value> {
    serde_json::to_value(value).map_err(CoreError::Serialization)
}

fn decode<T: DeserializeOwned>(tree: Value, context: &str) -> CoreResult<T> {
    serde_path_to_error::deserialize(tree).map_err(|err| {
        let inner = err.path().to_string();
        let path = if inner == "." {
            context.to_string()
        } else {
            format!("{context} ({inner})")
        };
        CoreError::InvalidPatch {
            path,
            message: err.into_inner().to_string(),
        }
    })
}

fn unknown_field(section: &str, segments: &[String]) -> CoreError {
    CoreError::UnknownField(format!("{section}.{}", segments.join(".")))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
