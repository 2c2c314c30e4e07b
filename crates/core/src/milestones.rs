//! Developmental milestones and toileting times.
//!
//! A milestone is answered in exactly one of three ways: the age in months at which it was
//! reached, "did not reach" or "unknown". The two flags and the number are mutually
//! exclusive; the setters keep them that way and
//! [`settle_after_write`](MarcoMotor::settle_after_write) applies the same rule after a
//! path-based write, based on the answers the written object itself carries.
//!
//! Toileting times follow the same pattern between the `{anos, meses}` pair and the
//! "still uses diaper" flag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which part of a three-way answer was written last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Written {
    Number,
    FirstFlag,
    SecondFlag,
}

fn settle_triple(number: &mut String, first: &mut bool, second: &mut bool, written: Written) {
    match written {
        Written::Number => {
            if !number.trim().is_empty() {
                *first = false;
                *second = false;
            }
        }
        Written::FirstFlag => {
            if *first {
                number.clear();
                *second = false;
            }
        }
        Written::SecondFlag => {
            if *second {
                number.clear();
                *first = false;
            }
        }
    }
}

/// Resolve a value written as a whole when it does not name a single answer.
///
/// Precedence: first flag, then second flag, then the number.
fn normalize_triple(number: &mut String, first: &mut bool, second: &mut bool) {
    if *first {
        settle_triple(number, first, second, Written::FirstFlag);
    } else if *second {
        settle_triple(number, first, second, Written::SecondFlag);
    }
}

/// Answers asserted by an incoming milestone object: a non-blank `meses` or a flag set to
/// `true`. Keys the object does not carry assert nothing.
fn asserted_triple(written: &Value, first_flag: &str) -> Vec<Written> {
    let mut asserted = Vec::new();
    if written
        .get("meses")
        .and_then(Value::as_str)
        .is_some_and(|meses| !meses.trim().is_empty())
    {
        asserted.push(Written::Number);
    }
    if written.get(first_flag).and_then(Value::as_bool) == Some(true) {
        asserted.push(Written::FirstFlag);
    }
    if written.get("naoSoubeInformar").and_then(Value::as_bool) == Some(true) {
        asserted.push(Written::SecondFlag);
    }
    asserted
}

fn settle_triple_after(
    number: &mut String,
    first: &mut bool,
    second: &mut bool,
    asserted: &[Written],
) {
    match asserted {
        [only] => settle_triple(number, first, second, *only),
        _ => normalize_triple(number, first, second),
    }
}

fn triple_is_consistent(number: &str, first: bool, second: bool) -> bool {
    let answers = [!number.trim().is_empty(), first, second];
    answers.iter().filter(|a| **a).count() <= 1
}

// ============================================================================
// Motor milestones
// ============================================================================

/// Motor milestone: `{meses, naoRealiza, naoSoubeInformar}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarcoMotor {
    meses: String,
    nao_realiza: bool,
    nao_soube_informar: bool,
}

impl MarcoMotor {
    pub fn meses(&self) -> &str {
        &self.meses
    }

    pub fn nao_realiza(&self) -> bool {
        self.nao_realiza
    }

    pub fn nao_soube_informar(&self) -> bool {
        self.nao_soube_informar
    }

    /// Sets the age in months. A non-empty value clears both flags.
    pub fn set_meses(&mut self, meses: impl Into<String>) {
        self.meses = meses.into();
        self.settle_written(Written::Number);
    }

    /// Sets "does not do it yet". `true` clears the age and the other flag.
    pub fn set_nao_realiza(&mut self, value: bool) {
        self.nao_realiza = value;
        self.settle_written(Written::FirstFlag);
    }

    /// Sets "informant did not know". `true` clears the age and the other flag.
    pub fn set_nao_soube_informar(&mut self, value: bool) {
        self.nao_soube_informar = value;
        self.settle_written(Written::SecondFlag);
    }

    /// Re-applies exclusivity after `written` (the object just merged into this milestone)
    /// was stored.
    ///
    /// The single answer the object asserts wins over the stored ones. An object asserting
    /// several answers, or none, falls back to flag-first precedence.
    pub fn settle_after_write(&mut self, written: &Value) {
        settle_triple_after(
            &mut self.meses,
            &mut self.nao_realiza,
            &mut self.nao_soube_informar,
            &asserted_triple(written, "naoRealiza"),
        );
    }

    pub fn is_consistent(&self) -> bool {
        triple_is_consistent(&self.meses, self.nao_realiza, self.nao_soube_informar)
    }

    pub fn is_answered(&self) -> bool {
        !self.meses.trim().is_empty() || self.nao_realiza || self.nao_soube_informar
    }

    fn settle_written(&mut self, written: Written) {
        settle_triple(
            &mut self.meses,
            &mut self.nao_realiza,
            &mut self.nao_soube_informar,
            written,
        );
    }
}

// ============================================================================
// Speech milestones
// ============================================================================

/// Speech milestone: `{meses, naoFala, naoSoubeInformar}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarcoFala {
    meses: String,
    nao_fala: bool,
    nao_soube_informar: bool,
}

impl MarcoFala {
    pub fn meses(&self) -> &str {
        &self.meses
    }

    pub fn nao_fala(&self) -> bool {
        self.nao_fala
    }

    pub fn nao_soube_informar(&self) -> bool {
        self.nao_soube_informar
    }

    pub fn set_meses(&mut self, meses: impl Into<String>) {
        self.meses = meses.into();
        self.settle_written(Written::Number);
    }

    pub fn set_nao_fala(&mut self, value: bool) {
        self.nao_fala = value;
        self.settle_written(Written::FirstFlag);
    }

    pub fn set_nao_soube_informar(&mut self, value: bool) {
        self.nao_soube_informar = value;
        self.settle_written(Written::SecondFlag);
    }

    pub fn settle_after_write(&mut self, written: &Value) {
        settle_triple_after(
            &mut self.meses,
            &mut self.nao_fala,
            &mut self.nao_soube_informar,
            &asserted_triple(written, "naoFala"),
        );
    }

    pub fn is_consistent(&self) -> bool {
        triple_is_consistent(&self.meses, self.nao_fala, self.nao_soube_informar)
    }

    pub fn is_answered(&self) -> bool {
        !self.meses.trim().is_empty() || self.nao_fala || self.nao_soube_informar
    }

    fn settle_written(&mut self, written: Written) {
        settle_triple(
            &mut self.meses,
            &mut self.nao_fala,
            &mut self.nao_soube_informar,
            written,
        );
    }
}

// ============================================================================
// Toileting time
// ============================================================================

/// Time to continence: `{anos, meses, usaFralda}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TempoDesfralde {
    anos: String,
    meses: String,
    usa_fralda: bool,
}

impl TempoDesfralde {
    pub fn anos(&self) -> &str {
        &self.anos
    }

    pub fn meses(&self) -> &str {
        &self.meses
    }

    pub fn usa_fralda(&self) -> bool {
        self.usa_fralda
    }

    /// Sets years and months together. Any non-empty part clears `usaFralda`.
    pub fn set_tempo(&mut self, anos: impl Into<String>, meses: impl Into<String>) {
        self.anos = anos.into();
        self.meses = meses.into();
        self.settle_time();
    }

    pub fn set_anos(&mut self, anos: impl Into<String>) {
        self.anos = anos.into();
        self.settle_time();
    }

    pub fn set_meses(&mut self, meses: impl Into<String>) {
        self.meses = meses.into();
        self.settle_time();
    }

    /// `true` clears years and months.
    pub fn set_usa_fralda(&mut self, value: bool) {
        self.usa_fralda = value;
        self.settle_diaper();
    }

    /// Re-applies exclusivity after `written` was merged into this time.
    ///
    /// A written non-blank `anos`/`meses` clears the diaper flag unless the same object also
    /// sets `usaFralda = true`; in every other case a set diaper flag clears the time.
    pub fn settle_after_write(&mut self, written: &Value) {
        let time_written = ["anos", "meses"].iter().any(|key| {
            written
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|part| !part.trim().is_empty())
        });
        let diaper_written = written.get("usaFralda").and_then(Value::as_bool) == Some(true);

        if time_written && !diaper_written {
            self.settle_time();
        } else {
            self.settle_diaper();
        }
    }

    fn has_time(&self) -> bool {
        !self.anos.trim().is_empty() || !self.meses.trim().is_empty()
    }

    fn settle_time(&mut self) {
        if self.has_time() {
            self.usa_fralda = false;
        }
    }

    fn settle_diaper(&mut self) {
        if self.usa_fralda {
            self.anos.clear();
            self.meses.clear();
        }
    }

    pub fn is_consistent(&self) -> bool {
        !(self.usa_fralda && self.has_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_number_clears_flags() {
        let mut marco = MarcoMotor::default();
        marco.set_nao_realiza(true);
        marco.set_meses("7");
        assert_eq!(marco.meses(), "7");
        assert!(!marco.nao_realiza());
        assert!(!marco.nao_soube_informar());
    }

    #[test]
    fn motor_flags_are_exclusive() {
        let mut marco = MarcoMotor::default();
        marco.set_meses("3");
        marco.set_nao_realiza(true);
        assert_eq!(marco.meses(), "");
        assert!(marco.nao_realiza());

        marco.set_nao_soube_informar(true);
        assert!(!marco.nao_realiza());
        assert!(marco.nao_soube_informar());
        assert!(marco.is_consistent());
    }

    #[test]
    fn clearing_a_flag_touches_nothing_else() {
        let mut marco = MarcoFala::default();
        marco.set_nao_fala(true);
        marco.set_nao_fala(false);
        assert!(!marco.is_answered());

        marco.set_meses("12");
        marco.set_nao_soube_informar(false);
        assert_eq!(marco.meses(), "12");
    }

    #[test]
    fn blank_number_does_not_clear_flags() {
        let mut marco = MarcoMotor::default();
        marco.set_nao_soube_informar(true);
        marco.set_meses("");
        assert!(marco.nao_soube_informar());
    }

    #[test]
    fn conflicting_object_write_uses_precedence() {
        let written = serde_json::json!({
            "meses": "10", "naoFala": true, "naoSoubeInformar": true
        });
        let mut marco: MarcoFala = serde_json::from_value(written.clone()).expect("deserialize");
        assert!(!marco.is_consistent());

        marco.settle_after_write(&written);
        assert!(marco.nao_fala());
        assert!(!marco.nao_soube_informar());
        assert_eq!(marco.meses(), "");
    }

    #[test]
    fn written_number_beats_stored_flag() {
        let mut marco = MarcoMotor::default();
        marco.set_nao_realiza(true);
        // State right after merging {"meses": "4"} over the stored flag.
        marco.meses = "4".into();

        marco.settle_after_write(&serde_json::json!({"meses": "4"}));
        assert_eq!(marco.meses(), "4");
        assert!(!marco.nao_realiza());
        assert!(marco.is_consistent());
    }

    #[test]
    fn written_time_beats_stored_diaper_flag() {
        let mut tempo = TempoDesfralde::default();
        tempo.set_usa_fralda(true);
        tempo.anos = "3".into();

        tempo.settle_after_write(&serde_json::json!({"anos": "3"}));
        assert_eq!(tempo.anos(), "3");
        assert!(!tempo.usa_fralda());

        tempo.anos = "3".into();
        tempo.usa_fralda = true;
        tempo.settle_after_write(&serde_json::json!({"anos": "3", "usaFralda": true}));
        assert_eq!(tempo.anos(), "");
        assert!(tempo.usa_fralda());
    }

    #[test]
    fn toileting_diaper_and_time_are_exclusive() {
        let mut tempo = TempoDesfralde::default();
        tempo.set_tempo("2", "6");
        tempo.set_usa_fralda(true);
        assert_eq!(tempo.anos(), "");
        assert_eq!(tempo.meses(), "");

        tempo.set_meses("4");
        assert!(!tempo.usa_fralda());
        assert_eq!(tempo.meses(), "4");
        assert!(tempo.is_consistent());
    }

    #[test]
    fn milestone_wire_names() {
        let mut marco = MarcoMotor::default();
        marco.set_meses("3");
        let json = serde_json::to_value(&marco).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"meses": "3", "naoRealiza": false, "naoSoubeInformar": false})
        );
    }
}
