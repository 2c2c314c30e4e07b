//! Step 3: family context and daily routine.

use super::Section;
use crate::form::Anamnese;
use crate::lists::{EntityList, ListEntity};
use crate::wizard::WizardStep;
use clinica_uuid::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextoFamiliarRotina {
    pub composicao_familiar: String,
    pub historicos_familiares: EntityList<HistoricoFamiliar>,
    pub atividades_rotina: EntityList<AtividadeRotina>,
}

impl Section for ContextoFamiliarRotina {
    const KEY: &'static str = "contextoFamiliarRotina";
    const STEP: WizardStep = WizardStep::ContextoFamiliarRotina;

    fn of(doc: &Anamnese) -> &Self {
        &doc.contexto_familiar_rotina
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.contexto_familiar_rotina
    }
}

/// A condition present in the family.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoricoFamiliar {
    pub id: EntityId,
    pub parentesco: String,
    pub condicao: String,
    pub observacao: String,
}

impl ListEntity for HistoricoFamiliar {
    const LABEL: &'static str = "Histórico";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtividadeRotina {
    pub id: EntityId,
    pub atividade: String,
    pub horario: String,
    pub frequencia: String,
    pub responsavel: String,
}

impl ListEntity for AtividadeRotina {
    const LABEL: &'static str = "Atividade";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}
