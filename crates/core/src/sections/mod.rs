//! The eight sections of an anamnese.
//!
//! Each section is a total record: every field, including fields of nested sub-records, has a
//! default, and every struct deserialises with `#[serde(default)]`. A section can therefore be
//! rebuilt from any partial JSON value without leaving a field missing.
//!
//! Field names on the wire are the clinic's camelCase Portuguese names; those are also the
//! names used by field paths (see [`crate::merge`]).

mod atividades;
mod cabecalho;
mod comportamento;
mod contexto;
mod desenvolvimento;
mod finalizacao;
mod queixa;
mod social;

pub use atividades::{Alimentacao, AtividadesVidaDiaria, Desfralde, Higiene, Sono, TempoDesfraldeKind};
pub use cabecalho::{Cabecalho, Cuidador, Parentesco};
pub use comportamento::{Comportamento, EstereotipiasRituais, ProblemasComportamento};
pub use contexto::{AtividadeRotina, ContextoFamiliarRotina, HistoricoFamiliar};
pub use desenvolvimento::{
    DesenvolvimentoInicial, Fala, MarcoFalaKind, MarcoMotorKind, Neuropsicomotor,
};
pub use finalizacao::Finalizacao;
pub use queixa::{ArquivoAnexo, Especialidade, Especialista, Exame, Medicamento, QueixaDiagnostico, Terapia};
pub use social::{DesenvolvimentoAcademico, DesenvolvimentoSocial, SocialAcademico};

use crate::form::Anamnese;
use crate::merge::FieldPatch;
use crate::wizard::WizardStep;
use crate::CoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A section of the anamnese document.
pub trait Section: Clone + Default + PartialEq + Serialize + DeserializeOwned {
    /// Key of the section in the document (`cabecalho`, `queixaDiagnostico`, ...).
    const KEY: &'static str;

    /// Wizard step that edits this section.
    const STEP: WizardStep;

    fn of(doc: &Anamnese) -> &Self;

    fn of_mut(doc: &mut Anamnese) -> &mut Self;

    /// Restores cross-field invariants after a write.
    ///
    /// `written` is the value just merged in, nested under its path relative to the section,
    /// so a write of `"4"` at `rolou.meses` arrives as `{"rolou": {"meses": "4"}}`.
    fn settle(&mut self, _written: &serde_json::Value) {}

    /// Builds a total section from a partial JSON value.
    fn from_partial(partial: serde_json::Value) -> CoreResult<Self> {
        crate::merge::from_partial(partial)
    }

    /// Returns a copy of this section with `patch` applied.
    fn with_patch(&self, patch: &FieldPatch) -> CoreResult<Self> {
        crate::merge::apply_patch(self, patch)
    }
}
