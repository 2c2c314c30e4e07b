//! Step 7: stereotypies, rituals and behaviour problems.

use super::Section;
use crate::form::Anamnese;
use crate::wizard::WizardStep;
use clinica_types::Resposta;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Comportamento {
    pub estereotipias_rituais: EstereotipiasRituais,
    pub problemas_comportamento: ProblemasComportamento,
}

impl Section for Comportamento {
    const KEY: &'static str = "comportamento";
    const STEP: WizardStep = WizardStep::Comportamento;

    fn of(doc: &Anamnese) -> &Self {
        &doc.comportamento
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.comportamento
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EstereotipiasRituais {
    pub estereotipias_motoras: Option<Resposta>,
    pub estereotipias_vocais: Option<Resposta>,
    pub hiperfoco: Option<Resposta>,
    pub rigidez_rotina: Option<Resposta>,
    pub sensibilidade_sensorial: Option<Resposta>,
    pub descricao: String,
}

/// Each problem pairs a tri-state answer with a free-text description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProblemasComportamento {
    pub agressividade: Option<Resposta>,
    pub descricao_agressividade: String,
    pub auto_lesao: Option<Resposta>,
    pub descricao_auto_lesao: String,
    pub birras: Option<Resposta>,
    pub descricao_birras: String,
    pub fugas: Option<Resposta>,
    pub descricao_fugas: String,
    pub destruicao_objetos: Option<Resposta>,
    pub descricao_destruicao_objetos: String,
}

impl ProblemasComportamento {
    /// `(answer, description)` pairs keyed by the answer's wire name.
    pub fn pairs(&self) -> [(&'static str, Option<Resposta>, &str); 5] {
        [
            ("agressividade", self.agressividade, &self.descricao_agressividade),
            ("autoLesao", self.auto_lesao, &self.descricao_auto_lesao),
            ("birras", self.birras, &self.descricao_birras),
            ("fugas", self.fugas, &self.descricao_fugas),
            (
                "destruicaoObjetos",
                self.destruicao_objetos,
                &self.descricao_destruicao_objetos,
            ),
        ]
    }
}
