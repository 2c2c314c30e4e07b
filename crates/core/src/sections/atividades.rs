//! Step 5: activities of daily living.

use super::Section;
use crate::form::Anamnese;
use crate::milestones::TempoDesfralde;
use crate::wizard::WizardStep;
use clinica_types::{Resposta, RespostaComAjuda};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtividadesVidaDiaria {
    pub desfralde: Desfralde,
    pub sono: Sono,
    pub higiene: Higiene,
    pub alimentacao: Alimentacao,
}

impl Section for AtividadesVidaDiaria {
    const KEY: &'static str = "atividadesVidaDiaria";
    const STEP: WizardStep = WizardStep::AtividadesVidaDiaria;

    fn of(doc: &Anamnese) -> &Self {
        &doc.atividades_vida_diaria
    }

    fn of_mut(doc: &mut Anamnese) -> &mut Self {
        &mut doc.atividades_vida_diaria
    }

    fn settle(&mut self, written: &Value) {
        let Some(desfralde) = written.get("desfralde") else {
            return;
        };
        for kind in TempoDesfraldeKind::ALL {
            if let Some(tempo) = desfralde.get(kind.key()) {
                kind.get_mut(&mut self.desfralde).settle_after_write(tempo);
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Desfralde {
    pub diurno_urina: TempoDesfralde,
    pub diurno_fezes: TempoDesfralde,
    pub noturno: TempoDesfralde,
    pub pede_para_ir: Option<Resposta>,
    pub limpa_sozinho: Option<Resposta>,
    pub usa_vaso_sanitario: Option<Resposta>,
}

/// Names the three toileting times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TempoDesfraldeKind {
    DiurnoUrina,
    DiurnoFezes,
    Noturno,
}

impl TempoDesfraldeKind {
    pub const ALL: [TempoDesfraldeKind; 3] = [
        TempoDesfraldeKind::DiurnoUrina,
        TempoDesfraldeKind::DiurnoFezes,
        TempoDesfraldeKind::Noturno,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TempoDesfraldeKind::DiurnoUrina => "diurnoUrina",
            TempoDesfraldeKind::DiurnoFezes => "diurnoFezes",
            TempoDesfraldeKind::Noturno => "noturno",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn get(self, desfralde: &Desfralde) -> &TempoDesfralde {
        match self {
            TempoDesfraldeKind::DiurnoUrina => &desfralde.diurno_urina,
            TempoDesfraldeKind::DiurnoFezes => &desfralde.diurno_fezes,
            TempoDesfraldeKind::Noturno => &desfralde.noturno,
        }
    }

    pub fn get_mut(self, desfralde: &mut Desfralde) -> &mut TempoDesfralde {
        match self {
            TempoDesfraldeKind::DiurnoUrina => &mut desfralde.diurno_urina,
            TempoDesfraldeKind::DiurnoFezes => &mut desfralde.diurno_fezes,
            TempoDesfraldeKind::Noturno => &mut desfralde.noturno,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sono {
    pub dorme_sozinho: Option<Resposta>,
    pub quarto_proprio: Option<Resposta>,
    pub acorda_noite: Option<Resposta>,
    pub dificuldade_adormecer: Option<Resposta>,
    pub horas_sono: String,
    pub observacoes: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Higiene {
    pub toma_banho: Option<RespostaComAjuda>,
    pub escova_dentes: Option<RespostaComAjuda>,
    pub lava_maos: Option<RespostaComAjuda>,
    pub veste_sozinho: Option<RespostaComAjuda>,
    pub calca_sapatos: Option<RespostaComAjuda>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alimentacao {
    pub come_sozinho: Option<Resposta>,
    pub usa_talheres: Option<Resposta>,
    pub seletividade: Option<Resposta>,
    pub engasgos: Option<Resposta>,
    pub restricoes: String,
    pub observacoes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::FieldPatch;
    use serde_json::json;

    fn patch(path: &str, value: serde_json::Value) -> FieldPatch {
        FieldPatch::parse(path, value).expect("valid path")
    }

    #[test]
    fn diaper_flag_clears_time_for_each_kind() {
        for kind in TempoDesfraldeKind::ALL {
            let base = format!("desfralde.{}", kind.key());
            let avd = AtividadesVidaDiaria::default()
                .with_patch(&patch(&format!("{base}.anos"), json!("2")))
                .expect("anos");
            let avd = avd
                .with_patch(&patch(&format!("{base}.usaFralda"), json!(true)))
                .expect("flag");
            let tempo = kind.get(&avd.desfralde);
            assert_eq!(tempo.anos(), "", "{}", kind.key());
            assert!(tempo.usa_fralda());

            let avd = avd
                .with_patch(&patch(&format!("{base}.meses"), json!("8")))
                .expect("meses");
            let tempo = kind.get(&avd.desfralde);
            assert!(!tempo.usa_fralda(), "{}", kind.key());
            assert_eq!(tempo.meses(), "8");
        }
    }

    #[test]
    fn group_write_keeps_the_incoming_time() {
        let mut avd = AtividadesVidaDiaria::default();
        avd.desfralde.noturno.set_usa_fralda(true);
        avd.desfralde.diurno_urina.set_usa_fralda(true);

        let avd = avd
            .with_patch(&patch("desfralde", json!({"noturno": {"anos": "3"}})))
            .expect("group patch");
        assert_eq!(avd.desfralde.noturno.anos(), "3");
        assert!(!avd.desfralde.noturno.usa_fralda());
        assert!(avd.desfralde.diurno_urina.usa_fralda());

        let avd = avd
            .with_patch(&patch(
                "desfralde",
                json!({"noturno": {"meses": "6", "usaFralda": true}}),
            ))
            .expect("conflicting object");
        assert!(avd.desfralde.noturno.usa_fralda());
        assert_eq!(avd.desfralde.noturno.anos(), "");
        assert_eq!(avd.desfralde.noturno.meses(), "");
    }

    #[test]
    fn tri_state_answers_use_wire_names() {
        let avd = AtividadesVidaDiaria::default()
            .with_patch(&patch("higiene.tomaBanho", json!("comAjuda")))
            .expect("with help");
        let avd = avd
            .with_patch(&patch("sono.dormeSozinho", json!("nao")))
            .expect("tri-state");
        assert_eq!(avd.higiene.toma_banho, Some(RespostaComAjuda::ComAjuda));
        assert_eq!(avd.sono.dorme_sozinho, Some(Resposta::Nao));

        let cleared = avd
            .with_patch(&patch("sono.dormeSozinho", json!(null)))
            .expect("clear");
        assert_eq!(cleared.sono.dorme_sozinho, None);
        assert_eq!(cleared.higiene.toma_banho, Some(RespostaComAjuda::ComAjuda));
    }

    #[test]
    fn out_of_set_answer_is_rejected() {
        let err = AtividadesVidaDiaria::default()
            .with_patch(&patch("sono.acordaNoite", json!("talvez")))
            .expect_err("not a tri-state value");
        assert!(matches!(err, crate::CoreError::InvalidPatch { .. }));
    }
}
