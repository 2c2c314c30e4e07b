//! Subject (child) lookup for the intake header.
//!
//! Picking a subject fills the header immediately from the [`SubjectSummary`] already on
//! screen, then fetches the full record for the caregiver list. If that fetch fails the
//! caregivers come from the summary with relation and contact left empty.

use crate::fetch::{FetchTicket, RequestGeneration};
use crate::form::AnamneseForm;
use crate::lists::EntityList;
use crate::sections::{Cabecalho, Cuidador};
use crate::{CoreError, CoreResult};
use chrono::NaiveDate;
use clinica_types::NonEmptyText;
use clinica_uuid::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverSummary {
    #[serde(default)]
    pub id: Option<String>,
    pub nome: String,
    #[serde(default)]
    pub data_nascimento: Option<NaiveDate>,
}

/// What the subject picker lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub id: NonEmptyText,
    pub nome: String,
    #[serde(default)]
    pub data_nascimento: Option<NaiveDate>,
    #[serde(default)]
    pub cuidadores: Vec<CaregiverSummary>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaregiverRecord {
    pub id: Option<String>,
    pub nome: String,
    pub relacao: String,
    pub telefone: String,
    pub email: String,
    pub data_nascimento: Option<NaiveDate>,
}

/// Full subject record as returned by the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: NonEmptyText,
    pub nome: String,
    #[serde(default)]
    pub data_nascimento: Option<NaiveDate>,
    #[serde(default)]
    pub cuidadores: Vec<CaregiverRecord>,
}

impl SubjectRecord {
    pub fn summary(&self) -> SubjectSummary {
        SubjectSummary {
            id: self.id.clone(),
            nome: self.nome.clone(),
            data_nascimento: self.data_nascimento,
            cuidadores: self
                .cuidadores
                .iter()
                .map(|c| CaregiverSummary {
                    id: c.id.clone(),
                    nome: c.nome.clone(),
                    data_nascimento: c.data_nascimento,
                })
                .collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("subject {0} not found")]
    NotFound(String),
    #[error("subject directory unavailable: {0}")]
    Unavailable(String),
}

pub trait SubjectDirectory {
    fn fetch_subject(&self, id: &NonEmptyText) -> Result<SubjectRecord, LookupError>;

    /// Summaries for the picker, ordered by id.
    fn list_subjects(&self) -> Result<Vec<SubjectSummary>, LookupError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySubjectDirectory {
    subjects: BTreeMap<String, SubjectRecord>,
}

impl InMemorySubjectDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: SubjectRecord) {
        self.subjects.insert(record.id.as_str().to_string(), record);
    }
}

impl SubjectDirectory for InMemorySubjectDirectory {
    fn fetch_subject(&self, id: &NonEmptyText) -> Result<SubjectRecord, LookupError> {
        self.subjects
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }

    fn list_subjects(&self) -> Result<Vec<SubjectSummary>, LookupError> {
        Ok(self.subjects.values().map(SubjectRecord::summary).collect())
    }
}

/// Subjects read from a YAML list on every lookup.
#[derive(Debug, Clone)]
pub struct FileSubjectDirectory {
    path: PathBuf,
}

impl FileSubjectDirectory {
    pub fn new(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::InvalidInput(format!(
                "subjects file does not exist: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn load(&self) -> Result<Vec<SubjectRecord>, LookupError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| LookupError::Unavailable(format!("{}: {e}", self.path.display())))?;
        serde_yaml::from_str(&text)
            .map_err(|e| LookupError::Unavailable(format!("{}: {e}", self.path.display())))
    }
}

impl SubjectDirectory for FileSubjectDirectory {
    fn fetch_subject(&self, id: &NonEmptyText) -> Result<SubjectRecord, LookupError> {
        self.load()?
            .into_iter()
            .find(|record| record.id == *id)
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }

    fn list_subjects(&self) -> Result<Vec<SubjectSummary>, LookupError> {
        let mut summaries: Vec<_> = self.load()?.iter().map(SubjectRecord::summary).collect();
        summaries.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(summaries)
    }
}

/// How the caregivers of a selected subject were filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// From the full record.
    Full,
    /// From the summary, after the fetch failed.
    Degraded,
    /// A newer selection was made; this result was dropped.
    Stale,
}

/// Header subject selection with request-generation tokens.
#[derive(Debug, Default)]
pub struct SubjectPicker {
    generation: RequestGeneration,
    pending: Option<(FetchTicket, SubjectSummary)>,
}

impl SubjectPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `summary`: the header identity is set right away and a ticket is issued for
    /// the record fetch.
    pub fn begin(&mut self, summary: SubjectSummary, form: &mut AnamneseForm) -> FetchTicket {
        let ticket = self.generation.issue();
        form.update::<Cabecalho>(|cab| {
            cab.paciente_id = summary.id.to_string();
            cab.paciente_nome = summary.nome.clone();
            cab.paciente_data_nascimento = date_text(summary.data_nascimento);
        });
        tracing::debug!("subject {} selected", summary.id);
        self.pending = Some((ticket, summary));
        ticket
    }

    /// Applies the fetch result for `ticket`. Results for older selections are ignored.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: Result<SubjectRecord, LookupError>,
        form: &mut AnamneseForm,
    ) -> SelectionOutcome {
        let summary = match self.pending.take() {
            Some((pending, summary)) if pending == ticket && self.generation.is_current(ticket) => {
                summary
            }
            other => {
                self.pending = other;
                tracing::debug!("stale subject lookup dropped");
                return SelectionOutcome::Stale;
            }
        };

        let (cuidadores, outcome) = match result {
            Ok(record) => (caregivers_from_record(&record), SelectionOutcome::Full),
            Err(err) => {
                tracing::warn!(
                    "subject lookup failed for {}, using summary data: {err}",
                    summary.id
                );
                (caregivers_from_summary(&summary), SelectionOutcome::Degraded)
            }
        };
        form.update::<Cabecalho>(|cab| cab.cuidadores = cuidadores);
        outcome
    }

    /// [`begin`](Self::begin) and [`resolve`](Self::resolve) in one call.
    pub fn select(
        &mut self,
        summary: SubjectSummary,
        directory: &dyn SubjectDirectory,
        form: &mut AnamneseForm,
    ) -> SelectionOutcome {
        let id = summary.id.clone();
        let ticket = self.begin(summary, form);
        let result = directory.fetch_subject(&id);
        self.resolve(ticket, result, form)
    }
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn caregiver_id(raw: Option<&str>) -> EntityId {
    raw.and_then(|id| EntityId::parse(id).ok())
        .unwrap_or_default()
}

fn caregivers_from_record(record: &SubjectRecord) -> EntityList<Cuidador> {
    record
        .cuidadores
        .iter()
        .map(|c| Cuidador {
            id: caregiver_id(c.id.as_deref()),
            nome: c.nome.clone(),
            relacao: c.relacao.clone(),
            telefone: c.telefone.clone(),
            email: c.email.clone(),
            data_nascimento: date_text(c.data_nascimento),
        })
        .collect::<Vec<_>>()
        .into()
}

fn caregivers_from_summary(summary: &SubjectSummary) -> EntityList<Cuidador> {
    summary
        .cuidadores
        .iter()
        .map(|c| Cuidador {
            id: caregiver_id(c.id.as_deref()),
            nome: c.nome.clone(),
            data_nascimento: date_text(c.data_nascimento),
            ..Cuidador::default()
        })
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SUBJECTS: &str = r#"
- id: crianca-1
  nome: Joao Silva
  dataNascimento: 2019-04-02
  cuidadores:
    - id: cuid-1
      nome: Maria Silva
      relacao: mae
      telefone: "11 99999-0000"
      email: maria@example.com
      dataNascimento: 1990-01-20
- id: crianca-2
  nome: Lia Souza
"#;

    fn joao() -> SubjectRecord {
        let records: Vec<SubjectRecord> = serde_yaml::from_str(SUBJECTS).expect("yaml");
        records.into_iter().next().expect("first")
    }

    struct Down;

    impl SubjectDirectory for Down {
        fn fetch_subject(&self, _id: &NonEmptyText) -> Result<SubjectRecord, LookupError> {
            Err(LookupError::Unavailable("connection refused".into()))
        }

        fn list_subjects(&self) -> Result<Vec<SubjectSummary>, LookupError> {
            Err(LookupError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn selection_maps_full_caregivers() {
        let mut directory = InMemorySubjectDirectory::new();
        directory.insert(joao());
        let mut form = AnamneseForm::new();
        let mut picker = SubjectPicker::new();

        let outcome = picker.select(joao().summary(), &directory, &mut form);
        assert_eq!(outcome, SelectionOutcome::Full);

        let cab = form.section::<Cabecalho>();
        assert_eq!(cab.paciente_id, "crianca-1");
        assert_eq!(cab.paciente_data_nascimento, "2019-04-02");
        let cuidador = &cab.cuidadores.as_slice()[0];
        assert_eq!(cuidador.id.as_str(), "cuid-1");
        assert_eq!(cuidador.relacao, "mae");
        assert_eq!(cuidador.email, "maria@example.com");
        assert_eq!(cuidador.data_nascimento, "1990-01-20");
    }

    #[test]
    fn failed_fetch_falls_back_to_summary() {
        let mut form = AnamneseForm::new();
        let mut picker = SubjectPicker::new();

        let outcome = picker.select(joao().summary(), &Down, &mut form);
        assert_eq!(outcome, SelectionOutcome::Degraded);

        let cab = form.section::<Cabecalho>();
        assert_eq!(cab.paciente_nome, "Joao Silva");
        let cuidador = &cab.cuidadores.as_slice()[0];
        assert_eq!(cuidador.nome, "Maria Silva");
        assert_eq!(cuidador.data_nascimento, "1990-01-20");
        assert!(cuidador.relacao.is_empty());
        assert!(cuidador.telefone.is_empty());
    }

    #[test]
    fn late_result_for_an_earlier_selection_is_dropped() {
        let records: Vec<SubjectRecord> = serde_yaml::from_str(SUBJECTS).expect("yaml");
        let mut form = AnamneseForm::new();
        let mut picker = SubjectPicker::new();

        let first = picker.begin(records[0].summary(), &mut form);
        let second = picker.begin(records[1].summary(), &mut form);

        assert_eq!(
            picker.resolve(first, Ok(records[0].clone()), &mut form),
            SelectionOutcome::Stale
        );
        assert!(form.section::<Cabecalho>().cuidadores.is_empty());

        assert_eq!(
            picker.resolve(second, Ok(records[1].clone()), &mut form),
            SelectionOutcome::Full
        );
        assert_eq!(form.section::<Cabecalho>().paciente_id, "crianca-2");
    }

    #[test]
    fn file_directory_reads_yaml() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("subjects.yaml");
        fs::write(&path, SUBJECTS).expect("write");

        let directory = FileSubjectDirectory::new(&path).expect("directory");
        let listed = directory.list_subjects().expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].nome, "Lia Souza");

        let id = NonEmptyText::new("crianca-9").expect("id");
        assert!(matches!(
            directory.fetch_subject(&id),
            Err(LookupError::NotFound(_))
        ));

        fs::write(&path, "not: [valid").expect("write");
        assert!(matches!(
            directory.list_subjects(),
            Err(LookupError::Unavailable(_))
        ));
    }
}
