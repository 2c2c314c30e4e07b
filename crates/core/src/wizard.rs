//! The eight-step intake wizard.
//!
//! Navigation is free: `next`, `previous` and `jump_to` never validate. The document is only
//! checked by [`Wizard::finish`], which is available on the last step.

use crate::constants::GENERIC_SUBMISSION_FAILURE;
use crate::form::AnamneseForm;
use crate::submission::{SubmissionReceipt, SubmissionService};
use crate::validation::validate_minimal;
use crate::{CoreError, CoreResult};

/// A step of the wizard; each step edits one section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    Cabecalho = 1,
    QueixaDiagnostico = 2,
    ContextoFamiliarRotina = 3,
    DesenvolvimentoInicial = 4,
    AtividadesVidaDiaria = 5,
    SocialAcademico = 6,
    Comportamento = 7,
    Finalizacao = 8,
}

impl WizardStep {
    pub const ALL: [WizardStep; 8] = [
        WizardStep::Cabecalho,
        WizardStep::QueixaDiagnostico,
        WizardStep::ContextoFamiliarRotina,
        WizardStep::DesenvolvimentoInicial,
        WizardStep::AtividadesVidaDiaria,
        WizardStep::SocialAcademico,
        WizardStep::Comportamento,
        WizardStep::Finalizacao,
    ];

    pub const FIRST: WizardStep = WizardStep::Cabecalho;
    pub const LAST: WizardStep = WizardStep::Finalizacao;

    /// 1-based step number.
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Sidebar title.
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Cabecalho => "Cabeçalho",
            WizardStep::QueixaDiagnostico => "Queixa e Diagnóstico",
            WizardStep::ContextoFamiliarRotina => "Contexto Familiar e Rotina",
            WizardStep::DesenvolvimentoInicial => "Desenvolvimento Inicial",
            WizardStep::AtividadesVidaDiaria => "Atividades de Vida Diária",
            WizardStep::SocialAcademico => "Social e Acadêmico",
            WizardStep::Comportamento => "Comportamento",
            WizardStep::Finalizacao => "Finalização",
        }
    }

    /// Document key of the section edited on this step.
    pub fn section_key(self) -> &'static str {
        match self {
            WizardStep::Cabecalho => "cabecalho",
            WizardStep::QueixaDiagnostico => "queixaDiagnostico",
            WizardStep::ContextoFamiliarRotina => "contextoFamiliarRotina",
            WizardStep::DesenvolvimentoInicial => "desenvolvimentoInicial",
            WizardStep::AtividadesVidaDiaria => "atividadesVidaDiaria",
            WizardStep::SocialAcademico => "socialAcademico",
            WizardStep::Comportamento => "comportamento",
            WizardStep::Finalizacao => "finalizacao",
        }
    }
}

/// Result of [`Wizard::finish`].
#[derive(Debug, Clone, PartialEq)]
pub enum FinishOutcome {
    /// `finish` was called before the last step; nothing happened.
    NotAtFinalStep,
    /// Minimal validation failed; the submitter was not called.
    Invalid(Vec<String>),
    /// The submitter failed; the form is untouched and the action can be retried.
    Failed(Vec<String>),
    Submitted(SubmissionReceipt),
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    errors: Vec<String>,
    skip_full_validation: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Wizard {
    /// Starts on the first step. `skip_full_validation` is passed to the submitter on finish.
    pub fn new(skip_full_validation: bool) -> Self {
        Self {
            step: WizardStep::FIRST,
            errors: Vec::new(),
            skip_full_validation,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Messages currently shown above the step.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_last_step(&self) -> bool {
        self.step == WizardStep::LAST
    }

    pub fn next(&mut self) {
        if let Some(step) = self.step.next() {
            self.move_to(step);
        }
    }

    pub fn previous(&mut self) {
        if let Some(step) = self.step.previous() {
            self.move_to(step);
        }
    }

    /// Moves directly to step `number`. Numbers outside `1..=8` are rejected and the step
    /// does not change.
    pub fn jump_to(&mut self, number: u8) -> CoreResult<()> {
        let step = WizardStep::from_number(number).ok_or(CoreError::StepOutOfRange(number))?;
        self.move_to(step);
        Ok(())
    }

    fn move_to(&mut self, step: WizardStep) {
        tracing::debug!("wizard step {} -> {}", self.step.number(), step.number());
        self.step = step;
        self.errors.clear();
    }

    /// Validates and submits the form.
    ///
    /// The form is only read; on success the caller discards it.
    pub fn finish(
        &mut self,
        form: &AnamneseForm,
        submitter: &dyn SubmissionService,
    ) -> FinishOutcome {
        if !self.is_last_step() {
            return FinishOutcome::NotAtFinalStep;
        }

        let payload = form.assemble();
        let report = validate_minimal(&payload.document);
        if !report.is_valid() {
            self.errors = report.messages();
            tracing::debug!("finish blocked by {} validation issue(s)", self.errors.len());
            return FinishOutcome::Invalid(self.errors.clone());
        }

        match submitter.submit(&payload, self.skip_full_validation) {
            Ok(receipt) => {
                tracing::info!("anamnese submitted as {}", receipt.id);
                self.errors.clear();
                FinishOutcome::Submitted(receipt)
            }
            Err(err) => {
                tracing::warn!("anamnese submission failed: {err}");
                let mut messages = err.user_messages();
                if messages.is_empty() {
                    messages.push(GENERIC_SUBMISSION_FAILURE.to_string());
                }
                self.errors = messages.clone();
                FinishOutcome::Failed(messages)
            }
        }
    }
}
