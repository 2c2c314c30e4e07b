//! Intake scripts: a YAML list of steps driven through one [`IntakeSession`].
//!
//! ```yaml
//! steps:
//!   - set: { path: cabecalho.informante, value: Maria }
//!   - add: { list: cuidadores, as: ana }
//!   - set: { path: cabecalho.cuidadores.$ana.nome, value: Ana }
//!   - add: { list: exames, as: eeg }
//!   - attach: { exam: $eeg, path: laudo.pdf, name: Laudo EEG, as: laudo }
//!   - jump: 8
//!   - finish
//! ```
//!
//! `$name` stands for the id generated by an earlier `add` or `attach` carrying `as: name`.

use anyhow::{Context, Result, anyhow, bail};
use clinica_core::form::{IntakeSession, ListKind};
use clinica_core::subjects::{SelectionOutcome, SubjectDirectory, SubjectPicker};
use clinica_core::submission::{SubmissionReceipt, SubmissionService};
use clinica_core::wizard::FinishOutcome;
use clinica_core::{FieldPatch, FieldPath};
use clinica_files::FileBlob;
use clinica_uuid::EntityId;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Set {
        path: String,
        value: Value,
    },
    Add {
        list: String,
        #[serde(default, rename = "as")]
        alias: Option<String>,
    },
    Remove {
        list: String,
        id: String,
    },
    Attach {
        exam: String,
        path: PathBuf,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "as")]
        alias: Option<String>,
    },
    RemoveFile {
        exam: String,
        file: String,
    },
    SelectSubject(String),
    Next,
    Previous,
    Jump(u8),
    Finish,
}

impl Script {
    /// Parses a script from YAML.
    ///
    /// The YAML tree is re-read as JSON so steps use the plain `name` / `{name: ...}` forms.
    pub fn parse(yaml: &str) -> Result<Self> {
        let tree: serde_yaml::Value = serde_yaml::from_str(yaml).context("script is not valid YAML")?;
        let tree = serde_json::to_value(tree).context("script is not a plain data tree")?;
        serde_json::from_value(tree).context("script does not match the step format")
    }
}

/// How a script run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The script ran out of steps without finishing.
    Incomplete,
    Submitted(SubmissionReceipt),
    /// `finish` was reached but did not submit; the messages are what the wizard shows.
    Rejected(Vec<String>),
}

/// Runs scripts against one session.
pub struct ScriptRunner<'a> {
    session: IntakeSession,
    picker: SubjectPicker,
    aliases: HashMap<String, EntityId>,
    base_dir: PathBuf,
    subjects: Option<&'a dyn SubjectDirectory>,
    submitter: &'a dyn SubmissionService,
}

impl<'a> ScriptRunner<'a> {
    /// `base_dir` resolves relative attachment paths.
    pub fn new(
        skip_full_validation: bool,
        base_dir: &Path,
        subjects: Option<&'a dyn SubjectDirectory>,
        submitter: &'a dyn SubmissionService,
    ) -> Self {
        Self {
            session: IntakeSession::new(skip_full_validation),
            picker: SubjectPicker::new(),
            aliases: HashMap::new(),
            base_dir: base_dir.to_path_buf(),
            subjects,
            submitter,
        }
    }

    pub fn session(&self) -> &IntakeSession {
        &self.session
    }

    pub fn run(&mut self, script: &Script) -> Result<RunOutcome> {
        for (index, step) in script.steps.iter().enumerate() {
            tracing::debug!("script step {}: {:?}", index + 1, step);
            let finished = self
                .run_step(step)
                .with_context(|| format!("step {} failed", index + 1))?;
            if let Some(outcome) = finished {
                return Ok(outcome);
            }
        }
        Ok(RunOutcome::Incomplete)
    }

    fn run_step(&mut self, step: &Step) -> Result<Option<RunOutcome>> {
        match step {
            Step::Set { path, value } => {
                let path = self.resolve_path(path)?;
                self.session
                    .form_mut()
                    .apply(&FieldPatch::new(path, value.clone()))?;
            }
            Step::Add { list, alias } => {
                let kind: ListKind = list.parse()?;
                let id = self.session.form_mut().add_item(kind);
                self.remember(alias, id);
            }
            Step::Remove { list, id } => {
                let kind: ListKind = list.parse()?;
                let id = self.resolve_id(id)?;
                self.session.form_mut().remove_item(kind, &id);
            }
            Step::Attach {
                exam,
                path,
                name,
                alias,
            } => {
                let exam_id = self.resolve_id(exam)?;
                let blob = FileBlob::read_path(&self.base_dir.join(path))?;
                let file_id = self
                    .session
                    .form_mut()
                    .attach_blob(&exam_id, blob, name.as_deref())?
                    .ok_or_else(|| anyhow!("exam {exam} is not in the form"))?;
                self.remember(alias, file_id);
            }
            Step::RemoveFile { exam, file } => {
                let exam_id = self.resolve_id(exam)?;
                let file_id = self.resolve_id(file)?;
                self.session.form_mut().remove_file(&exam_id, &file_id);
            }
            Step::SelectSubject(id) => self.select_subject(id)?,
            Step::Next => self.session.wizard_mut().next(),
            Step::Previous => self.session.wizard_mut().previous(),
            Step::Jump(number) => self.session.wizard_mut().jump_to(*number)?,
            Step::Finish => return Ok(Some(self.finish())),
        }
        Ok(None)
    }

    fn select_subject(&mut self, id: &str) -> Result<()> {
        let Some(directory) = self.subjects else {
            bail!("selectSubject needs a subjects file");
        };
        let summary = directory
            .list_subjects()?
            .into_iter()
            .find(|summary| summary.id.as_str() == id)
            .ok_or_else(|| anyhow!("subject {id} is not in the directory"))?;

        let outcome = self
            .picker
            .select(summary, directory, self.session.form_mut());
        if outcome == SelectionOutcome::Degraded {
            tracing::warn!("caregivers for subject {id} taken from the summary");
        }
        Ok(())
    }

    fn finish(&mut self) -> RunOutcome {
        match self.session.attempt_finish(self.submitter) {
            FinishOutcome::Submitted(receipt) => RunOutcome::Submitted(receipt),
            FinishOutcome::NotAtFinalStep => RunOutcome::Rejected(vec![format!(
                "finish is only available on step 8 (current step {})",
                self.session.wizard().step().number()
            )]),
            FinishOutcome::Invalid(messages) | FinishOutcome::Failed(messages) => {
                RunOutcome::Rejected(messages)
            }
        }
    }

    fn remember(&mut self, alias: &Option<String>, id: EntityId) {
        if let Some(alias) = alias {
            self.aliases.insert(alias.clone(), id);
        }
    }

    fn resolve_id(&self, raw: &str) -> Result<EntityId> {
        match raw.strip_prefix('$') {
            Some(alias) => self
                .aliases
                .get(alias)
                .cloned()
                .ok_or_else(|| anyhow!("unknown alias ${alias}")),
            None => Ok(EntityId::parse(raw)?),
        }
    }

    fn resolve_path(&self, raw: &str) -> Result<FieldPath> {
        let parsed = FieldPath::parse(raw)?;
        let segments = parsed
            .segments()
            .iter()
            .map(|segment| {
                if segment.starts_with('$') {
                    self.resolve_id(segment).map(|id| id.to_string())
                } else {
                    Ok(segment.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldPath::from_segments(segments)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinica_core::sections::{Cabecalho, QueixaDiagnostico};
    use clinica_core::submission::FileSubmissionStore;
    use clinica_core::subjects::FileSubjectDirectory;
    use tempfile::TempDir;

    const INTAKE: &str = r#"
steps:
  - set: { path: cabecalho.pacienteId, value: "42" }
  - set: { path: cabecalho.dataEntrevista, value: "2026-03-10" }
  - set: { path: cabecalho.informante, value: Maria }
  - set: { path: cabecalho.parentesco, value: mae }
  - add: { list: cuidadores, as: ana }
  - set: { path: cabecalho.cuidadores.$ana.nome, value: Ana }
  - next
  - set: { path: queixaDiagnostico.queixaPrincipal, value: Atraso de fala }
  - add: { list: exames, as: eeg }
  - attach: { exam: $eeg, path: laudo.pdf, name: Laudo EEG, as: laudo }
  - jump: 8
  - finish
"#;

    #[test]
    fn full_intake_script_submits() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("laudo.pdf"), b"%PDF-1.4 laudo").expect("write pdf");
        let store = FileSubmissionStore::new(dir.path().join("out")).expect("store");

        let script = Script::parse(INTAKE).expect("parse");
        let mut runner = ScriptRunner::new(true, dir.path(), None, &store);
        let outcome = runner.run(&script).expect("run");

        let RunOutcome::Submitted(receipt) = outcome else {
            panic!("expected submission, got {outcome:?}");
        };
        let saved = store.read_document(&receipt.id).expect("saved");
        assert_eq!(saved.cabecalho.informante, "Maria");
        assert_eq!(saved.cabecalho.cuidadores.as_slice()[0].nome, "Ana");
        let exam = &saved.queixa_diagnostico.exames.as_slice()[0];
        assert_eq!(exam.arquivos.as_slice()[0].nome, "Laudo EEG");
        assert_eq!(exam.arquivos.as_slice()[0].tipo, "application/pdf");
    }

    #[test]
    fn finish_with_missing_fields_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileSubmissionStore::new(dir.path()).expect("store");
        let script = Script::parse("steps: [ {jump: 8}, finish ]").expect("parse");

        let mut runner = ScriptRunner::new(true, dir.path(), None, &store);
        match runner.run(&script).expect("run") {
            RunOutcome::Rejected(messages) => {
                assert!(messages
                    .iter()
                    .any(|m| m == "queixaDiagnostico.queixaPrincipal: Main complaint is required"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(runner.session().wizard().errors().len(), 5);
    }

    #[test]
    fn removing_by_alias_drops_the_entity() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileSubmissionStore::new(dir.path()).expect("store");
        let script = Script::parse(
            "steps:\n  - add: { list: terapias, as: t }\n  - add: { list: queixaDiagnostico.terapias }\n  - remove: { list: terapias, id: $t }\n",
        )
        .expect("parse");

        let mut runner = ScriptRunner::new(true, dir.path(), None, &store);
        assert!(matches!(
            runner.run(&script).expect("run"),
            RunOutcome::Incomplete
        ));
        let queixa = runner.session().form().section::<QueixaDiagnostico>();
        assert_eq!(queixa.terapias.len(), 1);
    }

    #[test]
    fn unknown_alias_and_bad_jump_fail() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileSubmissionStore::new(dir.path()).expect("store");

        let mut runner = ScriptRunner::new(true, dir.path(), None, &store);
        let script = Script::parse("steps: [ {remove: {list: exames, id: $nope}} ]").expect("parse");
        assert!(runner.run(&script).is_err());

        let script = Script::parse("steps: [ {jump: 9} ]").expect("parse");
        assert!(runner.run(&script).is_err());
        assert_eq!(runner.session().wizard().step().number(), 1);
    }

    #[test]
    fn select_subject_fills_header_from_directory() {
        let dir = TempDir::new().expect("tempdir");
        let subjects = dir.path().join("subjects.yaml");
        std::fs::write(
            &subjects,
            "- id: \"7\"\n  nome: Joao\n  dataNascimento: 2020-01-02\n  cuidadores:\n    - nome: Carla\n      relacao: mae\n",
        )
        .expect("write subjects");
        let directory = FileSubjectDirectory::new(&subjects).expect("directory");
        let store = FileSubmissionStore::new(dir.path().join("out")).expect("store");

        let mut runner = ScriptRunner::new(true, dir.path(), Some(&directory), &store);
        let script = Script::parse("steps: [ {selectSubject: \"7\"} ]").expect("parse");
        runner.run(&script).expect("run");

        let cab = runner.session().form().section::<Cabecalho>();
        assert_eq!(cab.paciente_id, "7");
        assert_eq!(cab.paciente_nome, "Joao");
        assert_eq!(cab.paciente_data_nascimento, "2020-01-02");
        assert_eq!(cab.cuidadores.as_slice()[0].relacao, "mae");
    }

    #[test]
    fn unknown_step_is_a_parse_error() {
        assert!(Script::parse("steps: [ dance ]").is_err());
    }
}
