//! The anamnese document and the in-memory form that edits it.
//!
//! [`Anamnese`] is the document: eight total sections. [`AnamneseForm`] owns one document for
//! the lifetime of an intake, replaces a whole section on every change and keeps attached file
//! bytes in memory until [`AnamneseForm::assemble`] hands them to the submitter.
//! [`IntakeSession`] pairs a form with its [`Wizard`].

use crate::lists::{EntityList, ListEntity};
use crate::merge::{FieldPatch, FieldPath};
use crate::sections::{
    AtividadesVidaDiaria, Cabecalho, Comportamento, ContextoFamiliarRotina,
    DesenvolvimentoInicial, Finalizacao, QueixaDiagnostico, Section, SocialAcademico,
};
use crate::submission::{
    PendingAttachment, SubmissionPayload, SubmissionReceipt, SubmissionService,
};
use crate::wizard::{FinishOutcome, Wizard, WizardStep};
use crate::{CoreError, CoreResult};
use clinica_files::FileBlob;
use clinica_uuid::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Anamnese {
    pub cabecalho: Cabecalho,
    pub queixa_diagnostico: QueixaDiagnostico,
    pub contexto_familiar_rotina: ContextoFamiliarRotina,
    pub desenvolvimento_inicial: DesenvolvimentoInicial,
    pub atividades_vida_diaria: AtividadesVidaDiaria,
    pub social_academico: SocialAcademico,
    pub comportamento: Comportamento,
    pub finalizacao: Finalizacao,
}

fn take<S: Section>(sections: &mut Map<String, Value>) -> CoreResult<S> {
    S::from_partial(sections.remove(S::KEY).unwrap_or(Value::Null))
}

impl Anamnese {
    /// Builds a document from a partial JSON value. Missing sections and fields take their
    /// defaults; unknown keys are rejected.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let mut sections = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(CoreError::InvalidInput(
                    "an anamnese document must be an object".into(),
                ))
            }
        };

        if let Some(unknown) = sections
            .keys()
            .find(|key| !WizardStep::ALL.iter().any(|s| s.section_key() == key.as_str()))
        {
            return Err(CoreError::UnknownField(unknown.clone()));
        }

        Ok(Self {
            cabecalho: take(&mut sections)?,
            queixa_diagnostico: take(&mut sections)?,
            contexto_familiar_rotina: take(&mut sections)?,
            desenvolvimento_inicial: take(&mut sections)?,
            atividades_vida_diaria: take(&mut sections)?,
            social_academico: take(&mut sections)?,
            comportamento: take(&mut sections)?,
            finalizacao: take(&mut sections)?,
        })
    }

    pub fn from_json(text: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(CoreError::Deserialization)?;
        Self::from_value(value)
    }

    pub fn from_yaml(text: &str) -> CoreResult<Self> {
        let value: Value = serde_yaml::from_str(text).map_err(CoreError::YamlDeserialization)?;
        Self::from_value(value)
    }

    /// Pretty JSON with every field present.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(CoreError::Serialization)
    }

    /// Whether leaving the intake should ask for confirmation: a subject was selected or a
    /// complaint was written.
    pub fn has_unsaved_changes(&self) -> bool {
        self.cabecalho.has_subject()
            || !self.queixa_diagnostico.queixa_principal.trim().is_empty()
    }

    pub fn summary(&self) -> AnamneseSummary {
        let queixa = &self.queixa_diagnostico;
        let contexto = &self.contexto_familiar_rotina;
        AnamneseSummary {
            paciente: self.cabecalho.paciente_nome.clone(),
            cuidadores: self.cabecalho.cuidadores.len(),
            especialistas: queixa.especialistas.len(),
            medicamentos: queixa.medicamentos.len(),
            exames: queixa.exames.len(),
            arquivos_ativos: queixa.exames.active_file_count(),
            terapias: queixa.terapias.len(),
            historicos_familiares: contexto.historicos_familiares.len(),
            atividades_rotina: contexto.atividades_rotina.len(),
        }
    }
}

/// Counts shown in the intake sidebar and by the CLI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnamneseSummary {
    pub paciente: String,
    pub cuidadores: usize,
    pub especialistas: usize,
    pub medicamentos: usize,
    pub exames: usize,
    pub arquivos_ativos: usize,
    pub terapias: usize,
    pub historicos_familiares: usize,
    pub atividades_rotina: usize,
}

/// The repeatable lists of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Cuidadores,
    Especialistas,
    Medicamentos,
    Exames,
    Terapias,
    HistoricosFamiliares,
    AtividadesRotina,
}

impl ListKind {
    pub const ALL: [ListKind; 7] = [
        ListKind::Cuidadores,
        ListKind::Especialistas,
        ListKind::Medicamentos,
        ListKind::Exames,
        ListKind::Terapias,
        ListKind::HistoricosFamiliares,
        ListKind::AtividadesRotina,
    ];

    /// Document path of the list (`cabecalho.cuidadores`, ...).
    pub fn path(self) -> &'static str {
        match self {
            ListKind::Cuidadores => "cabecalho.cuidadores",
            ListKind::Especialistas => "queixaDiagnostico.especialistas",
            ListKind::Medicamentos => "queixaDiagnostico.medicamentos",
            ListKind::Exames => "queixaDiagnostico.exames",
            ListKind::Terapias => "queixaDiagnostico.terapias",
            ListKind::HistoricosFamiliares => "contextoFamiliarRotina.historicosFamiliares",
            ListKind::AtividadesRotina => "contextoFamiliarRotina.atividadesRotina",
        }
    }

    /// Last segment of [`path`](Self::path).
    pub fn name(self) -> &'static str {
        self.path().rsplit('.').next().unwrap_or_default()
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ListKind {
    type Err = CoreError;

    /// Accepts the full path or the bare list name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.path() == s || kind.name() == s)
            .ok_or_else(|| CoreError::UnknownList(s.to_string()))
    }
}

/// Per-step revision counters, bumped whenever a section value is replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Revisions([u64; 8]);

impl Revisions {
    fn slot(step: WizardStep) -> usize {
        usize::from(step.number() - 1)
    }

    fn bump(&mut self, step: WizardStep) {
        self.0[Self::slot(step)] += 1;
    }

    fn get(&self, step: WizardStep) -> u64 {
        self.0[Self::slot(step)]
    }
}

/// In-memory state of one intake.
#[derive(Clone, Debug, Default)]
pub struct AnamneseForm {
    doc: Anamnese,
    revisions: Revisions,
    blobs: HashMap<EntityId, FileBlob>,
}

impl AnamneseForm {
    /// An empty form: every section at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with `doc` (used by edit mode).
    pub fn from_document(doc: Anamnese) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    pub fn document(&self) -> &Anamnese {
        &self.doc
    }

    pub fn into_document(self) -> Anamnese {
        self.doc
    }

    pub fn section<S: Section>(&self) -> &S {
        S::of(&self.doc)
    }

    /// How many times section `S` has been replaced.
    pub fn revision<S: Section>(&self) -> u64 {
        self.revisions.get(S::STEP)
    }

    /// Installs `section` as the new value of its slot.
    pub fn replace<S: Section>(&mut self, section: S) {
        *S::of_mut(&mut self.doc) = section;
        self.revisions.bump(S::STEP);
        tracing::debug!("section {} replaced", S::KEY);
    }

    /// Edits a copy of section `S` and installs it.
    pub fn update<S: Section>(&mut self, edit: impl FnOnce(&mut S)) {
        let mut next = S::of(&self.doc).clone();
        edit(&mut next);
        self.replace(next);
    }

    /// Writes a patch whose path is relative to section `S`.
    pub fn patch<S: Section>(&mut self, patch: &FieldPatch) -> CoreResult<()> {
        let next = S::of(&self.doc).with_patch(patch)?;
        self.replace(next);
        Ok(())
    }

    /// Writes a patch whose path starts with a section key
    /// (`cabecalho.informante`, `desenvolvimentoInicial.fala.balbuciou.meses`).
    ///
    /// A bare section key with an object value merges the object into the section.
    pub fn apply(&mut self, patch: &FieldPatch) -> CoreResult<()> {
        let (key, rest) = patch.path().split_first();
        let step = WizardStep::ALL
            .into_iter()
            .find(|step| step.section_key() == key)
            .ok_or_else(|| CoreError::UnknownField(key.to_string()))?;

        match step {
            WizardStep::Cabecalho => self.apply_to::<Cabecalho>(rest, patch.value()),
            WizardStep::QueixaDiagnostico => self.apply_to::<QueixaDiagnostico>(rest, patch.value()),
            WizardStep::ContextoFamiliarRotina => {
                self.apply_to::<ContextoFamiliarRotina>(rest, patch.value())
            }
            WizardStep::DesenvolvimentoInicial => {
                self.apply_to::<DesenvolvimentoInicial>(rest, patch.value())
            }
            WizardStep::AtividadesVidaDiaria => {
                self.apply_to::<AtividadesVidaDiaria>(rest, patch.value())
            }
            WizardStep::SocialAcademico => self.apply_to::<SocialAcademico>(rest, patch.value()),
            WizardStep::Comportamento => self.apply_to::<Comportamento>(rest, patch.value()),
            WizardStep::Finalizacao => self.apply_to::<Finalizacao>(rest, patch.value()),
        }
    }

    fn apply_to<S: Section>(&mut self, rest: Option<FieldPath>, value: &Value) -> CoreResult<()> {
        if let Some(path) = rest {
            return self.patch::<S>(&FieldPatch::new(path, value.clone()));
        }

        let Value::Object(fields) = value else {
            return Err(CoreError::InvalidPatch {
                path: S::KEY.to_string(),
                message: "a whole section can only be written with an object".into(),
            });
        };
        let mut next = S::of(&self.doc).clone();
        for (key, field) in fields {
            next = next.with_patch(&FieldPatch::new(FieldPath::parse(key)?, field.clone()))?;
        }
        self.replace(next);
        Ok(())
    }

    /// Appends a default entity to list `kind` and returns its id.
    pub fn add_item(&mut self, kind: ListKind) -> EntityId {
        match kind {
            ListKind::Cuidadores => self.add_to::<Cabecalho, _>(|s| &mut s.cuidadores),
            ListKind::Especialistas => {
                self.add_to::<QueixaDiagnostico, _>(|s| &mut s.especialistas)
            }
            ListKind::Medicamentos => self.add_to::<QueixaDiagnostico, _>(|s| &mut s.medicamentos),
            ListKind::Exames => self.add_to::<QueixaDiagnostico, _>(|s| &mut s.exames),
            ListKind::Terapias => self.add_to::<QueixaDiagnostico, _>(|s| &mut s.terapias),
            ListKind::HistoricosFamiliares => {
                self.add_to::<ContextoFamiliarRotina, _>(|s| &mut s.historicos_familiares)
            }
            ListKind::AtividadesRotina => {
                self.add_to::<ContextoFamiliarRotina, _>(|s| &mut s.atividades_rotina)
            }
        }
    }

    /// Removes entity `id` from list `kind`. An absent id leaves the section and its revision
    /// untouched.
    pub fn remove_item(&mut self, kind: ListKind, id: &EntityId) {
        match kind {
            ListKind::Cuidadores => self.remove_from::<Cabecalho, _>(id, |s| &mut s.cuidadores),
            ListKind::Especialistas => {
                self.remove_from::<QueixaDiagnostico, _>(id, |s| &mut s.especialistas)
            }
            ListKind::Medicamentos => {
                self.remove_from::<QueixaDiagnostico, _>(id, |s| &mut s.medicamentos)
            }
            ListKind::Exames => {
                for file in self.files_of(id) {
                    self.blobs.remove(&file);
                }
                self.remove_from::<QueixaDiagnostico, _>(id, |s| &mut s.exames)
            }
            ListKind::Terapias => self.remove_from::<QueixaDiagnostico, _>(id, |s| &mut s.terapias),
            ListKind::HistoricosFamiliares => {
                self.remove_from::<ContextoFamiliarRotina, _>(id, |s| &mut s.historicos_familiares)
            }
            ListKind::AtividadesRotina => {
                self.remove_from::<ContextoFamiliarRotina, _>(id, |s| &mut s.atividades_rotina)
            }
        }
    }

    /// `(id, "Label N")` pairs of list `kind` in display order.
    pub fn item_labels(&self, kind: ListKind) -> Vec<(EntityId, String)> {
        let doc = &self.doc;
        match kind {
            ListKind::Cuidadores => doc.cabecalho.cuidadores.labels(),
            ListKind::Especialistas => doc.queixa_diagnostico.especialistas.labels(),
            ListKind::Medicamentos => doc.queixa_diagnostico.medicamentos.labels(),
            ListKind::Exames => doc.queixa_diagnostico.exames.labels(),
            ListKind::Terapias => doc.queixa_diagnostico.terapias.labels(),
            ListKind::HistoricosFamiliares => {
                doc.contexto_familiar_rotina.historicos_familiares.labels()
            }
            ListKind::AtividadesRotina => doc.contexto_familiar_rotina.atividades_rotina.labels(),
        }
    }

    pub fn item_count(&self, kind: ListKind) -> usize {
        self.item_labels(kind).len()
    }

    fn add_to<S, T>(&mut self, list: impl FnOnce(&mut S) -> &mut EntityList<T>) -> EntityId
    where
        S: Section,
        T: ListEntity + Default,
    {
        let mut next = S::of(&self.doc).clone();
        let slot = list(&mut next);
        let (items, id) = slot.with_added();
        *slot = items;
        self.replace(next);
        id
    }

    fn remove_from<S, T>(&mut self, id: &EntityId, list: impl FnOnce(&mut S) -> &mut EntityList<T>)
    where
        S: Section,
        T: ListEntity,
    {
        let mut next = S::of(&self.doc).clone();
        let slot = list(&mut next);
        if slot.position(id).is_none() {
            tracing::debug!("no item {id} in {}", S::KEY);
            return;
        }
        *slot = slot.without(id);
        self.replace(next);
    }

    fn files_of(&self, exam_id: &EntityId) -> Vec<EntityId> {
        self.doc
            .queixa_diagnostico
            .exames
            .get(exam_id)
            .map(|exam| exam.arquivos.iter().map(|file| file.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Adds a file descriptor to exam `exam_id`. Returns `None` when the exam does not exist.
    pub fn attach_file(
        &mut self,
        exam_id: &EntityId,
        nome: &str,
        tipo: &str,
        tamanho: u64,
    ) -> Option<EntityId> {
        let queixa = self.section::<QueixaDiagnostico>();
        let (exames, file_id) = queixa.exames.with_file_attached(exam_id, nome, tipo, tamanho);
        let file_id = file_id?;
        self.update::<QueixaDiagnostico>(|q| q.exames = exames);
        Some(file_id)
    }

    /// Attaches `blob` to exam `exam_id`, keeping its bytes until submission.
    ///
    /// `display_name` overrides the picked file's name.
    pub fn attach_blob(
        &mut self,
        exam_id: &EntityId,
        blob: FileBlob,
        display_name: Option<&str>,
    ) -> CoreResult<Option<EntityId>> {
        let blob = match display_name {
            Some(name) => blob.renamed(name)?,
            None => blob,
        };
        let file_id = self.attach_file(exam_id, blob.name(), blob.media_type(), blob.size());
        if let Some(id) = &file_id {
            self.blobs.insert(id.clone(), blob);
        }
        Ok(file_id)
    }

    /// Tombstones file `file_id` of exam `exam_id` and releases its bytes.
    pub fn remove_file(&mut self, exam_id: &EntityId, file_id: &EntityId) {
        self.update::<QueixaDiagnostico>(|q| q.exames = q.exames.with_file_removed(exam_id, file_id));
        self.blobs.remove(file_id);
    }

    /// Held bytes of files that are still attached.
    pub fn active_blobs(&self) -> Vec<PendingAttachment> {
        let mut attachments = Vec::new();
        for exam in &self.doc.queixa_diagnostico.exames {
            for file in exam.active_files() {
                if let Some(blob) = self.blobs.get(&file.id) {
                    attachments.push(PendingAttachment {
                        exam_id: exam.id.clone(),
                        file_id: file.id.clone(),
                        blob: blob.clone(),
                    });
                }
            }
        }
        attachments
    }

    /// The document and attachments to submit.
    pub fn assemble(&self) -> SubmissionPayload {
        SubmissionPayload {
            document: self.doc.clone(),
            attachments: self.active_blobs(),
        }
    }
}

/// One intake in progress: the form and the wizard driving it.
#[derive(Debug, Default)]
pub struct IntakeSession {
    form: AnamneseForm,
    wizard: Wizard,
}

impl IntakeSession {
    pub fn new(skip_full_validation: bool) -> Self {
        Self {
            form: AnamneseForm::new(),
            wizard: Wizard::new(skip_full_validation),
        }
    }

    pub fn form(&self) -> &AnamneseForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AnamneseForm {
        &mut self.form
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    /// Whether navigating away should be confirmed first.
    pub fn needs_leave_confirmation(&self) -> bool {
        self.form.document().has_unsaved_changes()
    }

    /// Runs the wizard's finish action without consuming the session.
    pub fn attempt_finish(&mut self, submitter: &dyn SubmissionService) -> FinishOutcome {
        self.wizard.finish(&self.form, submitter)
    }

    /// Finishes the intake.
    ///
    /// On success the session is consumed and the receipt returned. Otherwise the session
    /// comes back unchanged apart from the wizard's displayed errors.
    pub fn finish(
        mut self,
        submitter: &dyn SubmissionService,
    ) -> Result<SubmissionReceipt, Box<IntakeSession>> {
        match self.attempt_finish(submitter) {
            FinishOutcome::Submitted(receipt) => Ok(receipt),
            _ => Err(Box::new(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{Exame, Parentesco};
    use crate::submission::RecordingSubmitter;
    use serde_json::json;

    fn patch(path: &str, value: Value) -> FieldPatch {
        FieldPatch::parse(path, value).expect("valid path")
    }

    #[test]
    fn scenario_header_with_one_caregiver() {
        let mut form = AnamneseForm::new();
        form.apply(&patch("cabecalho.informante", json!("Maria")))
            .expect("informante");
        form.apply(&patch("cabecalho.parentesco", json!("mae")))
            .expect("parentesco");
        let id = form.add_item(ListKind::Cuidadores);
        form.update::<Cabecalho>(|cab| {
            cab.cuidadores = cab.cuidadores.with_updated(&id, |c| c.nome = "Ana".into());
        });

        let doc = form.assemble().document;
        assert_eq!(doc.cabecalho.informante, "Maria");
        assert_eq!(doc.cabecalho.parentesco, Some(Parentesco::Mae));
        assert_eq!(doc.cabecalho.cuidadores.len(), 1);
        assert_eq!(doc.cabecalho.cuidadores.as_slice()[0].nome, "Ana");
    }

    #[test]
    fn scenario_attached_file_is_tombstoned() {
        let mut form = AnamneseForm::new();
        let exam_id = form.add_item(ListKind::Exames);
        form.apply(&patch(&format!("queixaDiagnostico.exames.{exam_id}.nome"), json!("EEG")))
            .expect("nome");
        let file_id = form
            .attach_file(&exam_id, "laudo.pdf", "application/pdf", 1000)
            .expect("exam exists");
        form.remove_file(&exam_id, &file_id);

        let exam: &Exame = form
            .section::<QueixaDiagnostico>()
            .exames
            .get(&exam_id)
            .expect("exam");
        assert_eq!(exam.nome, "EEG");
        assert_eq!(exam.arquivos.len(), 1);
        assert!(exam.arquivos.as_slice()[0].removed);
        assert_eq!(exam.active_files().count(), 0);
    }

    #[test]
    fn scenario_milestone_number_then_flag() {
        let mut form = AnamneseForm::new();
        form.apply(&patch(
            "desenvolvimentoInicial.neuropsicomotor.sustentouCabeca.meses",
            json!("3"),
        ))
        .expect("meses");
        form.apply(&patch(
            "desenvolvimentoInicial.neuropsicomotor.sustentouCabeca.naoRealiza",
            json!(true),
        ))
        .expect("flag");

        let marco = &form
            .section::<DesenvolvimentoInicial>()
            .neuropsicomotor
            .sustentou_cabeca;
        assert_eq!(marco.meses(), "");
        assert!(marco.nao_realiza());
        assert!(!marco.nao_soube_informar());
    }

    #[test]
    fn section_object_write_keeps_incoming_answers() {
        let mut form = AnamneseForm::new();
        form.apply(&patch(
            "desenvolvimentoInicial.neuropsicomotor.rolou.naoRealiza",
            json!(true),
        ))
        .expect("flag");
        form.apply(&patch(
            "atividadesVidaDiaria.desfralde.diurnoFezes.usaFralda",
            json!(true),
        ))
        .expect("diaper");

        form.apply(&patch(
            "desenvolvimentoInicial",
            json!({"neuropsicomotor": {"rolou": {"meses": "4"}}}),
        ))
        .expect("section write");
        form.apply(&patch(
            "atividadesVidaDiaria",
            json!({"desfralde": {"diurnoFezes": {"anos": "2", "meses": "6"}}}),
        ))
        .expect("section write");

        let rolou = &form.section::<DesenvolvimentoInicial>().neuropsicomotor.rolou;
        assert_eq!(rolou.meses(), "4");
        assert!(!rolou.nao_realiza());
        let fezes = &form.section::<AtividadesVidaDiaria>().desfralde.diurno_fezes;
        assert_eq!((fezes.anos(), fezes.meses()), ("2", "6"));
        assert!(!fezes.usa_fralda());
    }

    #[test]
    fn every_update_replaces_the_section() {
        let mut form = AnamneseForm::new();
        assert_eq!(form.revision::<Finalizacao>(), 0);
        form.update::<Finalizacao>(|f| f.encaminhamentos = "Fono".into());
        form.apply(&patch("finalizacao", json!({"observacoesFinais": "ok"})))
            .expect("object write");
        assert_eq!(form.revision::<Finalizacao>(), 2);
        assert_eq!(form.revision::<Cabecalho>(), 0);

        let fin = form.section::<Finalizacao>();
        assert_eq!(fin.encaminhamentos, "Fono");
        assert_eq!(fin.observacoes_finais, "ok");
    }

    #[test]
    fn failed_patch_leaves_the_form_untouched() {
        let mut form = AnamneseForm::new();
        form.update::<Cabecalho>(|c| c.informante = "Maria".into());
        let before = form.document().clone();

        assert!(form.apply(&patch("cabecalho.parentesco", json!(7))).is_err());
        assert!(form.apply(&patch("prontuario.numero", json!("1"))).is_err());
        assert_eq!(form.document(), &before);
    }

    #[test]
    fn removing_absent_items_keeps_every_list() {
        let mut form = AnamneseForm::new();
        let mut ids = Vec::new();
        for kind in ListKind::ALL {
            ids.push((kind, form.add_item(kind), form.add_item(kind)));
        }
        let before = form.document().clone();
        let revisions: Vec<u64> = WizardStep::ALL
            .into_iter()
            .map(|step| form.revisions.get(step))
            .collect();
        for kind in ListKind::ALL {
            form.remove_item(kind, &EntityId::new());
        }
        assert_eq!(form.document(), &before);
        let after: Vec<u64> = WizardStep::ALL
            .into_iter()
            .map(|step| form.revisions.get(step))
            .collect();
        assert_eq!(after, revisions);

        for (kind, first, second) in ids {
            form.remove_item(kind, &first);
            let labels = form.item_labels(kind);
            assert_eq!(labels.len(), 1, "{kind}");
            assert_eq!(labels[0].0, second);
            assert!(labels[0].1.ends_with(" 1"));
        }
    }

    #[test]
    fn blobs_follow_their_files() {
        let mut form = AnamneseForm::new();
        let exam_id = form.add_item(ListKind::Exames);
        let blob = FileBlob::from_bytes("scan.png", b"\x89PNG\r\n\x1a\n0000".to_vec())
            .expect("blob");
        let kept = form
            .attach_blob(&exam_id, blob.clone(), Some("Ressonancia.png"))
            .expect("rename")
            .expect("exam exists");
        let dropped = form
            .attach_blob(&exam_id, blob, None)
            .expect("attach")
            .expect("exam exists");
        form.remove_file(&exam_id, &dropped);

        let payload = form.assemble();
        assert_eq!(payload.attachments.len(), 1);
        assert_eq!(payload.attachments[0].file_id, kept);
        assert_eq!(payload.attachments[0].blob.name(), "Ressonancia.png");
        assert_eq!(payload.document.summary().arquivos_ativos, 1);

        assert!(form
            .attach_blob(&EntityId::new(), payload.attachments[0].blob.clone(), None)
            .expect("no error")
            .is_none());
    }

    #[test]
    fn unsaved_changes_gate() {
        let mut form = AnamneseForm::new();
        assert!(!form.document().has_unsaved_changes());
        form.update::<Finalizacao>(|f| f.observacoes_finais = "x".into());
        assert!(!form.document().has_unsaved_changes());
        form.update::<QueixaDiagnostico>(|q| q.queixa_principal = "Atraso".into());
        assert!(form.document().has_unsaved_changes());

        let mut form = AnamneseForm::new();
        form.update::<Cabecalho>(|c| c.paciente_id = "p-1".into());
        assert!(form.document().has_unsaved_changes());
    }

    #[test]
    fn document_json_is_total_and_reloads() {
        let mut form = AnamneseForm::new();
        form.update::<Cabecalho>(|c| c.informante = "Maria".into());
        let json = form.document().to_json().expect("json");
        let value: Value = serde_json::from_str(&json).expect("value");
        assert_eq!(
            value["desenvolvimentoInicial"]["fala"]["balbuciou"]["naoFala"],
            json!(false)
        );
        assert_eq!(Anamnese::from_json(&json).expect("reload"), *form.document());

        let partial = Anamnese::from_json(r#"{"finalizacao": {"encaminhamentos": "TO"}}"#)
            .expect("partial");
        assert_eq!(partial.finalizacao.encaminhamentos, "TO");
        assert!(Anamnese::from_json(r#"{"extra": {}}"#).is_err());
    }

    #[test]
    fn list_kinds_parse_from_path_or_name() {
        for kind in ListKind::ALL {
            assert_eq!(kind.path().parse::<ListKind>().expect("path"), kind);
            assert_eq!(kind.name().parse::<ListKind>().expect("name"), kind);
        }
        assert!("pacientes".parse::<ListKind>().is_err());
    }

    #[test]
    fn session_is_kept_when_finish_fails() {
        let mut session = IntakeSession::new(true);
        session
            .form_mut()
            .update::<QueixaDiagnostico>(|q| q.queixa_principal = "Atraso".into());
        session.wizard_mut().jump_to(8).expect("step");
        assert!(session.needs_leave_confirmation());

        let submitter = RecordingSubmitter::accepting();
        let session = session.finish(&submitter).expect_err("header is incomplete");
        assert_eq!(submitter.calls(), 0);
        assert!(!session.wizard().errors().is_empty());
        assert_eq!(
            session.form().section::<QueixaDiagnostico>().queixa_principal,
            "Atraso"
        );
    }

    #[test]
    fn session_is_consumed_on_success() {
        let mut session = IntakeSession::new(true);
        session.form_mut().update::<Cabecalho>(|c| {
            c.paciente_id = "p-1".into();
            c.data_entrevista = "2024-02-01".into();
            c.informante = "Maria".into();
            c.parentesco = Some(Parentesco::Mae);
        });
        session
            .form_mut()
            .update::<QueixaDiagnostico>(|q| q.queixa_principal = "Atraso".into());
        session.wizard_mut().jump_to(8).expect("step");

        let submitter = RecordingSubmitter::accepting();
        let receipt = session.finish(&submitter).expect("submitted");
        assert!(receipt.location.is_none());
        let payload = submitter.last_payload().expect("called");
        assert_eq!(payload.document.cabecalho.informante, "Maria");
    }
}
