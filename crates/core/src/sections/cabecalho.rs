//! Step 1: interview header.

use super::Section;
use crate::form::Anamnese;
use crate::lists::{EntityList, ListEntity};
use crate::wizard::WizardStep;
use clinica_uuid::EntityId;
use serde::{Deserialize, Serialize};

/// Informant's relationship to the child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parentesco {
    Mae,
    Pai,
    Avo,
    Tio,
    Irmao,
    ResponsavelLegal,
    /// Free text in `parentescoOutro`.
    Outro,
}

impl Parentesco {
    pub const ALL: [Parentesco; 7] = [
        Parentesco::Mae,
        Parentesco::Pai,
        Parentesco::Avo,
        Parentesco::Tio,
        Parentesco::Irmao,
        Parentesco::ResponsavelLegal,
        Parentesco::Outro,
    ];

    /// Wire key of this relationship.
    pub fn key(self) -> &'static str {
        match self {
            Parentesco::Mae => "mae",
            Parentesco::Pai => "pai",
            Parentesco::Avo => "avo",
            Parentesco::Tio => "tio",
            Parentesco::Irmao => "irmao",
            Parentesco::ResponsavelLegal => "responsavelLegal",
            Parentesco::Outro => "outro",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cabecalho {
    pub data_entrevista: String,
    /// Backend id of the selected child; empty until a subject is picked.
    pub paciente_id: String,
    pub paciente_nome: String,
    pub paciente_data_nascimento: String,
    pub informante: String,
    pub parentesco: Option<Parentesco>,
    pub parentesco_outro: String,
    pub quem_encaminhou: String,
    pub cuidadores: EntityList<Cuidador>,
}

impl Cabecalho {
    /// Relationship as shown to the user: the free text when `outro` is selected.
    pub fn parentesco_label(&self) -> Option<&str> {
        match self.parentesco? {
            Parentesco::Outro => Some(self.parentesco_outro.trim()).filter(|s| !s.is_empty()),
            other => Some(other.key()),
        }
    }

    pub fn has_subject(&self) -> bool {
        !self.paciente_id.trim().is_empty()
    }
}

impl Section for Cabecalho {
    const KEY: &'static str = "cabecalho";
    const STEP: WizardStep = WizardStep::Cabecalho;

    fn of(doc: &Anamnese) -> &Self {
        &doc.cabecalho
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.cabecalho
    }
}

/// A caregiver of the child.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cuidador {
    pub id: EntityId,
    pub nome: String,
    pub relacao: String,
    pub telefone: String,
    pub email: String,
    pub data_nascimento: String,
}

impl ListEntity for Cuidador {
    const LABEL: &'static str = "Cuidador";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}
