//! Step 6: social and academic development.

use super::Section;
use crate::form::Anamnese;
use crate::wizard::WizardStep;
use clinica_types::Resposta;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialAcademico {
    pub desenvolvimento_social: DesenvolvimentoSocial,
    pub desenvolvimento_academico: DesenvolvimentoAcademico,
}

impl Section for SocialAcademico {
    const KEY: &'static str = "socialAcademico";
    const STEP: WizardStep = WizardStep::SocialAcademico;

    fn of(doc: &Anamnese) -> &Self {
        &doc.social_academico
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.social_academico
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesenvolvimentoSocial {
    pub contato_visual: Option<Resposta>,
    pub responde_nome: Option<Resposta>,
    pub brinca_com_pares: Option<Resposta>,
    pub compartilha_interesse: Option<Resposta>,
    pub brincadeira_simbolica: Option<Resposta>,
    pub observacoes: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesenvolvimentoAcademico {
    pub escola: String,
    pub serie: String,
    pub turno: String,
    pub possui_mediador: Option<Resposta>,
    pub adaptacao_curricular: Option<Resposta>,
    pub dificuldade_aprendizagem: Option<Resposta>,
    pub alfabetizado: Option<Resposta>,
    pub observacoes: String,
}
