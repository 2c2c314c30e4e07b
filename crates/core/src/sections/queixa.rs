//! Step 2: main complaint, diagnoses, specialists, medications, exams and prior therapies.

use super::Section;
use crate::form::Anamnese;
use crate::lists::{EntityList, ListEntity};
use crate::wizard::WizardStep;
use clinica_uuid::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueixaDiagnostico {
    pub queixa_principal: String,
    pub diagnostico_previo: String,
    pub suspeita_diagnostica: String,
    pub observacoes: String,
    pub especialistas: EntityList<Especialista>,
    pub medicamentos: EntityList<Medicamento>,
    pub exames: EntityList<Exame>,
    pub terapias: EntityList<Terapia>,
}

impl Section for QueixaDiagnostico {
    const KEY: &'static str = "queixaDiagnostico";
    const STEP: WizardStep = WizardStep::QueixaDiagnostico;

    fn of(doc: &Anamnese) -> &Self {
        &doc.queixa_diagnostico
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.queixa_diagnostico
    }
}

/// Specialty of a consulted professional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Especialidade {
    Neurologista,
    Pediatra,
    Psiquiatra,
    Psicologo,
    Fonoaudiologo,
    TerapeutaOcupacional,
    Fisioterapeuta,
    Nutricionista,
    Outra,
}

impl Especialidade {
    pub const ALL: [Especialidade; 9] = [
        Especialidade::Neurologista,
        Especialidade::Pediatra,
        Especialidade::Psiquiatra,
        Especialidade::Psicologo,
        Especialidade::Fonoaudiologo,
        Especialidade::TerapeutaOcupacional,
        Especialidade::Fisioterapeuta,
        Especialidade::Nutricionista,
        Especialidade::Outra,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Especialidade::Neurologista => "neurologista",
            Especialidade::Pediatra => "pediatra",
            Especialidade::Psiquiatra => "psiquiatra",
            Especialidade::Psicologo => "psicologo",
            Especialidade::Fonoaudiologo => "fonoaudiologo",
            Especialidade::TerapeutaOcupacional => "terapeutaOcupacional",
            Especialidade::Fisioterapeuta => "fisioterapeuta",
            Especialidade::Nutricionista => "nutricionista",
            Especialidade::Outra => "outra",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.key() == key)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Especialista {
    pub id: EntityId,
    pub especialidade: Option<Especialidade>,
    pub nome: String,
    /// `MM/AAAA` of the last appointment.
    pub mes_ano: String,
    pub ativo: bool,
}

impl ListEntity for Especialista {
    const LABEL: &'static str = "Especialista";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Medicamento {
    pub id: EntityId,
    pub nome: String,
    pub dosagem: String,
    pub horario: String,
    pub motivo: String,
    pub prescritor: String,
}

impl ListEntity for Medicamento {
    const LABEL: &'static str = "Medicamento";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}

/// A prior exam and the files attached to it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Exame {
    pub id: EntityId,
    pub nome: String,
    pub data: String,
    pub resultado: String,
    /// Full history of attached files, removed ones included.
    pub arquivos: EntityList<ArquivoAnexo>,
}

impl Exame {
    /// Files still attached (the display-and-count view).
    pub fn active_files(&self) -> impl Iterator<Item = &ArquivoAnexo> {
        self.arquivos.iter().filter(|file| !file.removed)
    }

    pub fn active_file_count(&self) -> usize {
        self.active_files().count()
    }
}

impl ListEntity for Exame {
    const LABEL: &'static str = "Exame";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}

/// Descriptor of a file attached to an exam.
///
/// Removing a file only sets `removed`; the descriptor stays in the list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArquivoAnexo {
    pub id: EntityId,
    pub nome: String,
    /// MIME type.
    pub tipo: String,
    /// Size in bytes.
    pub tamanho: u64,
    pub removed: bool,
}

impl ListEntity for ArquivoAnexo {
    const LABEL: &'static str = "Arquivo";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}

impl EntityList<Exame> {
    /// Appends a file descriptor to the exam with `exam_id`.
    ///
    /// Returns the new list and the id of the new file, or an unchanged copy and `None` when
    /// the exam is not in the list.
    pub fn with_file_attached(
        &self,
        exam_id: &EntityId,
        nome: &str,
        tipo: &str,
        tamanho: u64,
    ) -> (Self, Option<EntityId>) {
        if self.get(exam_id).is_none() {
            tracing::debug!("attach ignored, exam {} not in list", exam_id);
            return (self.clone(), None);
        }

        let file = ArquivoAnexo {
            id: EntityId::new(),
            nome: nome.to_string(),
            tipo: tipo.to_string(),
            tamanho,
            removed: false,
        };
        let file_id = file.id.clone();
        let list = self.with_updated(exam_id, |exam| {
            exam.arquivos = exam.arquivos.with_entity(file);
        });
        (list, Some(file_id))
    }

    /// Tombstones the file `file_id` of exam `exam_id`.
    pub fn with_file_removed(&self, exam_id: &EntityId, file_id: &EntityId) -> Self {
        self.with_updated(exam_id, |exam| {
            exam.arquivos = exam
                .arquivos
                .with_updated(file_id, |file| file.removed = true);
        })
    }

    pub fn active_file_count(&self) -> usize {
        self.iter().map(Exame::active_file_count).sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Terapia {
    pub id: EntityId,
    pub tipo: String,
    pub profissional: String,
    pub frequencia: String,
    pub periodo: String,
    pub ativa: bool,
}

impl ListEntity for Terapia {
    const LABEL: &'static str = "Terapia";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_exam(nome: &str) -> (EntityList<Exame>, EntityId) {
        let (list, id) = EntityList::<Exame>::new().with_added();
        let list = list.with_updated(&id, |exam| exam.nome = nome.into());
        (list, id)
    }

    #[test]
    fn removing_a_file_tombstones_it() {
        let (exames, exam_id) = one_exam("EEG");
        let (exames, file_id) =
            exames.with_file_attached(&exam_id, "laudo.pdf", "application/pdf", 1000);
        let file_id = file_id.expect("exam exists");
        assert_eq!(exames.active_file_count(), 1);

        let exames = exames.with_file_removed(&exam_id, &file_id);
        let exam = exames.get(&exam_id).expect("exam");
        assert_eq!(exam.arquivos.len(), 1);
        assert!(exam.arquivos.as_slice()[0].removed);
        assert_eq!(exam.active_file_count(), 0);
    }

    #[test]
    fn removing_twice_changes_nothing_more() {
        let (exames, exam_id) = one_exam("RM");
        let (exames, a) = exames.with_file_attached(&exam_id, "a.pdf", "application/pdf", 1);
        let (exames, _b) = exames.with_file_attached(&exam_id, "b.pdf", "application/pdf", 2);
        let a = a.expect("attached");

        let once = exames.with_file_removed(&exam_id, &a);
        let twice = once.with_file_removed(&exam_id, &a);
        assert_eq!(once, twice);
        assert_eq!(twice.active_file_count(), 1);
        assert_eq!(twice.get(&exam_id).map(|e| e.arquivos.len()), Some(2));
    }

    #[test]
    fn attach_to_unknown_exam_is_a_no_op() {
        let (exames, _) = one_exam("EEG");
        let (after, file_id) =
            exames.with_file_attached(&EntityId::new(), "x.pdf", "application/pdf", 5);
        assert!(file_id.is_none());
        assert_eq!(after, exames);
    }

    #[test]
    fn especialidade_keys_round_trip() {
        for e in Especialidade::ALL {
            assert_eq!(Especialidade::from_key(e.key()), Some(e));
        }
    }
}
