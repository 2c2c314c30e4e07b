//! Wire/boundary support for stored anamnese records.
//!
//! Once an anamnese has been submitted, the backend returns it in a "detail" shape that is
//! close to, but not the same as, the intake form's sections:
//! - milestones carry a `status` enum instead of two booleans,
//! - tri-state answers are plain optional booleans,
//! - hygiene answers use an independence level,
//! - behaviour problems are nested `{presente, descricao}` pairs,
//! - numbers and dates are typed instead of free text.
//!
//! This crate focuses on:
//! - the strict wire model for that shape (unknown keys are rejected, absent keys default),
//! - parsing from YAML/JSON with a path to the failing field,
//! - rendering back to YAML/JSON.
//!
//! Mapping the detail shape onto the intake form lives in `clinica-core`.

pub mod record;

pub use record::{
    AnamneseDetail, ArquivoDetail, AtividadeRotinaDetail, AtividadesVidaDiariaDetail,
    CabecalhoDetail, ComportamentoDescrito, ComportamentoDetail, ContextoFamiliarDetail,
    CuidadorDetail, DesenvolvimentoAcademicoDetail, DesenvolvimentoDetail,
    DesenvolvimentoSocialDetail, DesfraldeDetail, EspecialistaDetail, EstereotipiasDetail,
    ExameDetail, FalaDetail, FinalizacaoDetail, HigieneDetail, HistoricoFamiliarDetail,
    AlimentacaoDetail, MarcoDetail, MarcoStatus, MedicamentoDetail, NeuropsicomotorDetail,
    NivelIndependencia, ProblemasComportamentoDetail, QueixaDiagnosticoDetail,
    SocialAcademicoDetail, SonoDetail, TempoDesfraldeDetail, TerapiaDetail,
};

/// Errors returned by the `clinica-detail` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`DetailError`].
pub type DetailResult<T> = Result<T, DetailError>;
