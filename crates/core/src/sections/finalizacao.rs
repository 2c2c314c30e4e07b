//! Step 8: closing notes.

use super::Section;
use crate::form::Anamnese;
use crate::wizard::WizardStep;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Finalizacao {
    pub observacoes_finais: String,
    pub impressoes_terapeuta: String,
    pub encaminhamentos: String,
}

impl Section for Finalizacao {
    const KEY: &'static str = "finalizacao";
    const STEP: WizardStep = WizardStep::Finalizacao;

    fn of(doc: &Anamnese) -> &Self {
        &doc.finalizacao
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.finalizacao
    }
}
