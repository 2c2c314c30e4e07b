//! Step 4: pregnancy, birth and early developmental milestones.

use super::Section;
use crate::form::Anamnese;
use crate::milestones::{MarcoFala, MarcoMotor};
use crate::wizard::WizardStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesenvolvimentoInicial {
    pub tipo_parto: String,
    /// Weeks.
    pub idade_gestacional: String,
    /// Grams.
    pub peso_nascimento: String,
    /// Centimetres.
    pub comprimento_nascimento: String,
    pub intercorrencias_gestacao: String,
    pub intercorrencias_parto: String,
    pub neuropsicomotor: Neuropsicomotor,
    pub fala: Fala,
}

impl Section for DesenvolvimentoInicial {
    const KEY: &'static str = "desenvolvimentoInicial";
    const STEP: WizardStep = WizardStep::DesenvolvimentoInicial;

    fn of(doc: &Anamnese) -> &Self {
        &doc.desenvolvimento_inicial
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.desenvolvimento_inicial
    }

    fn settle(&mut self, written: &Value) {
        if let Some(group) = written.get("neuropsicomotor") {
            for kind in MarcoMotorKind::ALL {
                if let Some(marco) = group.get(kind.key()) {
                    kind.get_mut(&mut self.neuropsicomotor).settle_after_write(marco);
                }
            }
        }
        if let Some(group) = written.get("fala") {
            for kind in MarcoFalaKind::ALL {
                if let Some(marco) = group.get(kind.key()) {
                    kind.get_mut(&mut self.fala).settle_after_write(marco);
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Neuropsicomotor {
    pub sustentou_cabeca: MarcoMotor,
    pub rolou: MarcoMotor,
    pub sentou_sem_apoio: MarcoMotor,
    pub engatinhou: MarcoMotor,
    pub andou_com_apoio: MarcoMotor,
    pub andou_sem_apoio: MarcoMotor,
    pub subiu_escadas: MarcoMotor,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fala {
    pub balbuciou: MarcoFala,
    pub primeiras_palavras: MarcoFala,
    pub juntou_palavras: MarcoFala,
    pub formou_frases: MarcoFala,
}

/// Names the motor milestones so callers can iterate over them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarcoMotorKind {
    SustentouCabeca,
    Rolou,
    SentouSemApoio,
    Engatinhou,
    AndouComApoio,
    AndouSemApoio,
    SubiuEscadas,
}

impl MarcoMotorKind {
    pub const ALL: [MarcoMotorKind; 7] = [
        MarcoMotorKind::SustentouCabeca,
        MarcoMotorKind::Rolou,
        MarcoMotorKind::SentouSemApoio,
        MarcoMotorKind::Engatinhou,
        MarcoMotorKind::AndouComApoio,
        MarcoMotorKind::AndouSemApoio,
        MarcoMotorKind::SubiuEscadas,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MarcoMotorKind::SustentouCabeca => "sustentouCabeca",
            MarcoMotorKind::Rolou => "rolou",
            MarcoMotorKind::SentouSemApoio => "sentouSemApoio",
            MarcoMotorKind::Engatinhou => "engatinhou",
            MarcoMotorKind::AndouComApoio => "andouComApoio",
            MarcoMotorKind::AndouSemApoio => "andouSemApoio",
            MarcoMotorKind::SubiuEscadas => "subiuEscadas",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn get(self, group: &Neuropsicomotor) -> &MarcoMotor {
        match self {
            MarcoMotorKind::SustentouCabeca => &group.sustentou_cabeca,
            MarcoMotorKind::Rolou => &group.rolou,
            MarcoMotorKind::SentouSemApoio => &group.sentou_sem_apoio,
            MarcoMotorKind::Engatinhou => &group.engatinhou,
            MarcoMotorKind::AndouComApoio => &group.andou_com_apoio,
            MarcoMotorKind::AndouSemApoio => &group.andou_sem_apoio,
            MarcoMotorKind::SubiuEscadas => &group.subiu_escadas,
        }
    }

    pub fn get_mut(self, group: &mut Neuropsicomotor) -> &mut MarcoMotor {
        match self {
            MarcoMotorKind::SustentouCabeca => &mut group.sustentou_cabeca,
            MarcoMotorKind::Rolou => &mut group.rolou,
            MarcoMotorKind::SentouSemApoio => &mut group.sentou_sem_apoio,
            MarcoMotorKind::Engatinhou => &mut group.engatinhou,
            MarcoMotorKind::AndouComApoio => &mut group.andou_com_apoio,
            MarcoMotorKind::AndouSemApoio => &mut group.andou_sem_apoio,
            MarcoMotorKind::SubiuEscadas => &mut group.subiu_escadas,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarcoFalaKind {
    Balbuciou,
    PrimeirasPalavras,
    JuntouPalavras,
    FormouFrases,
}

impl MarcoFalaKind {
    pub const ALL: [MarcoFalaKind; 4] = [
        MarcoFalaKind::Balbuciou,
        MarcoFalaKind::PrimeirasPalavras,
        MarcoFalaKind::JuntouPalavras,
        MarcoFalaKind::FormouFrases,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MarcoFalaKind::Balbuciou => "balbuciou",
            MarcoFalaKind::PrimeirasPalavras => "primeirasPalavras",
            MarcoFalaKind::JuntouPalavras => "juntouPalavras",
            MarcoFalaKind::FormouFrases => "formouFrases",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn get(self, group: &Fala) -> &MarcoFala {
        match self {
            MarcoFalaKind::Balbuciou => &group.balbuciou,
            MarcoFalaKind::PrimeirasPalavras => &group.primeiras_palavras,
            MarcoFalaKind::JuntouPalavras => &group.juntou_palavras,
            MarcoFalaKind::FormouFrases => &group.formou_frases,
        }
    }

    pub fn get_mut(self, group: &mut Fala) -> &mut MarcoFala {
        match self {
            MarcoFalaKind::Balbuciou => &mut group.balbuciou,
            MarcoFalaKind::PrimeirasPalavras => &mut group.primeiras_palavras,
            MarcoFalaKind::JuntouPalavras => &mut group.juntou_palavras,
            MarcoFalaKind::FormouFrases => &mut group.formou_frases,
        }
    }
}
