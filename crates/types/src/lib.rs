//! Small value types shared by the intake crates.
//!
//! - [`NonEmptyText`]: trimmed text that is guaranteed to carry content.
//! - [`Resposta`]: the yes/no answer behind every tri-state question (`None` = unanswered).
//! - [`RespostaComAjuda`]: yes/no/with-help answer used by hygiene questions.

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Trimmed text with at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and rejects it if nothing is left.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NonEmptyText::new(value)
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true when `text` has no visible content.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Answer to a yes/no question.
///
/// Tri-state fields are `Option<Resposta>`: `None` serialises as `null` and means the question
/// has not been answered yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resposta {
    Sim,
    Nao,
}

impl Resposta {
    /// Maps a stored boolean answer onto the form's answer type.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Resposta::Sim
        } else {
            Resposta::Nao
        }
    }

    pub fn is_sim(self) -> bool {
        matches!(self, Resposta::Sim)
    }
}

/// Answer to an activity question where the child may need help.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RespostaComAjuda {
    Sim,
    Nao,
    ComAjuda,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        let text = NonEmptyText::new("  Maria ").expect("valid text");
        assert_eq!(text.as_str(), "Maria");
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn non_empty_text_deserialisation_validates() {
        let ok: NonEmptyText = serde_json::from_str("\" Ana \"").expect("valid");
        assert_eq!(ok.as_str(), "Ana");
        assert!(serde_json::from_str::<NonEmptyText>("\"  \"").is_err());
    }

    #[test]
    fn tri_state_answers_use_clinic_wire_names() {
        let unanswered: Option<Resposta> = None;
        assert_eq!(serde_json::to_string(&unanswered).expect("json"), "null");
        assert_eq!(
            serde_json::to_string(&Some(Resposta::Nao)).expect("json"),
            "\"nao\""
        );
        assert_eq!(
            serde_json::to_string(&RespostaComAjuda::ComAjuda).expect("json"),
            "\"comAjuda\""
        );
        let parsed: Option<RespostaComAjuda> = serde_json::from_str("\"sim\"").expect("parse");
        assert_eq!(parsed, Some(RespostaComAjuda::Sim));
    }

    #[test]
    fn is_blank_ignores_whitespace() {
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" x "));
    }
}
