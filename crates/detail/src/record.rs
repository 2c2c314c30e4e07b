//! Stored anamnese detail records.
//!
//! Every struct uses `#[serde(default, deny_unknown_fields)]`: a key the backend leaves out
//! takes its default, a key this model does not know about is a schema mismatch.

use crate::{DetailError, DetailResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Root record
// ============================================================================

/// A submitted anamnese as returned by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AnamneseDetail {
    /// Backend identifier of the record.
    pub id: String,
    pub paciente_id: String,
    pub paciente_nome: Option<String>,
    pub paciente_data_nascimento: Option<NaiveDate>,
    pub criado_em: Option<DateTime<Utc>>,
    pub atualizado_em: Option<DateTime<Utc>>,

    pub cabecalho: CabecalhoDetail,
    pub queixa_diagnostico: QueixaDiagnosticoDetail,
    pub contexto_familiar_rotina: ContextoFamiliarDetail,
    pub desenvolvimento_inicial: DesenvolvimentoDetail,
    pub atividades_vida_diaria: AtividadesVidaDiariaDetail,
    pub social_academico: SocialAcademicoDetail,
    pub comportamento: ComportamentoDetail,
    pub finalizacao: FinalizacaoDetail,
}

impl AnamneseDetail {
    /// Parse a detail record from YAML text.
    ///
    /// Schema mismatches are reported with the path of the failing field
    /// (for example `desenvolvimentoInicial.neuropsicomotor.rolou.status`).
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::Translation`] on a schema mismatch and
    /// [`DetailError::InvalidInput`] when the record has no `id`.
    pub fn parse_yaml(yaml_text: &str) -> DetailResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let detail = serde_path_to_error::deserialize::<_, AnamneseDetail>(deserializer)
            .map_err(|err| schema_mismatch(err.path().to_string(), err.into_inner()))?;
        detail.checked()
    }

    /// Parse a detail record from JSON text. Same rules as [`AnamneseDetail::parse_yaml`].
    pub fn parse_json(json_text: &str) -> DetailResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let detail = serde_path_to_error::deserialize::<_, AnamneseDetail>(&mut deserializer)
            .map_err(|err| schema_mismatch(err.path().to_string(), err.into_inner()))?;
        detail.checked()
    }

    /// Returns [`DetailError::InvalidYaml`] when serialisation fails.
    pub fn render_yaml(&self) -> DetailResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Returns [`DetailError::InvalidJson`] when serialisation fails.
    pub fn render_json(&self) -> DetailResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn checked(self) -> DetailResult<Self> {
        if self.id.trim().is_empty() {
            return Err(DetailError::InvalidInput(
                "detail record id cannot be empty".into(),
            ));
        }
        Ok(self)
    }
}

fn schema_mismatch(path: String, source: impl std::fmt::Display) -> DetailError {
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    DetailError::Translation(format!("Detail schema mismatch at {path}: {source}"))
}

// ============================================================================
// Header
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CabecalhoDetail {
    pub data_entrevista: Option<NaiveDate>,
    pub informante: Option<String>,
    /// Free string on the backend; known values are the form's relationship keys.
    pub parentesco: Option<String>,
    pub parentesco_outro: Option<String>,
    pub quem_encaminhou: Option<String>,
    pub cuidadores: Vec<CuidadorDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CuidadorDetail {
    pub id: String,
    pub nome: Option<String>,
    pub relacao: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
}

// ============================================================================
// Complaint and diagnosis
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct QueixaDiagnosticoDetail {
    pub queixa_principal: Option<String>,
    pub diagnostico_previo: Option<String>,
    pub suspeita_diagnostica: Option<String>,
    pub observacoes: Option<String>,
    pub especialistas: Vec<EspecialistaDetail>,
    pub medicamentos: Vec<MedicamentoDetail>,
    pub exames: Vec<ExameDetail>,
    pub terapias: Vec<TerapiaDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct EspecialistaDetail {
    pub id: String,
    pub especialidade: Option<String>,
    pub nome: Option<String>,
    pub mes: Option<u32>,
    pub ano: Option<i32>,
    pub ativo: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct MedicamentoDetail {
    pub id: String,
    pub nome: Option<String>,
    pub dosagem: Option<String>,
    pub horario: Option<String>,
    pub motivo: Option<String>,
    pub prescritor: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ExameDetail {
    pub id: String,
    pub nome: Option<String>,
    pub data: Option<NaiveDate>,
    pub resultado: Option<String>,
    pub arquivos: Vec<ArquivoDetail>,
}

/// An uploaded file. Stored records never contain removed files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ArquivoDetail {
    pub id: String,
    pub nome: Option<String>,
    pub mime_type: Option<String>,
    pub tamanho: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TerapiaDetail {
    pub id: String,
    pub tipo: Option<String>,
    pub profissional: Option<String>,
    pub frequencia: Option<String>,
    pub periodo: Option<String>,
    pub ativa: Option<bool>,
}

// ============================================================================
// Family context and routine
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ContextoFamiliarDetail {
    pub composicao_familiar: Option<String>,
    pub historicos_familiares: Vec<HistoricoFamiliarDetail>,
    pub atividades_rotina: Vec<AtividadeRotinaDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HistoricoFamiliarDetail {
    pub id: String,
    pub parentesco: Option<String>,
    pub condicao: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AtividadeRotinaDetail {
    pub id: String,
    pub atividade: Option<String>,
    pub horario: Option<String>,
    pub frequencia: Option<String>,
    pub responsavel: Option<String>,
}

// ============================================================================
// Early development
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DesenvolvimentoDetail {
    pub tipo_parto: Option<String>,
    /// Weeks.
    pub idade_gestacional: Option<u32>,
    /// Grams.
    pub peso_nascimento: Option<u32>,
    /// Centimetres.
    pub comprimento_nascimento: Option<u32>,
    pub intercorrencias_gestacao: Option<String>,
    pub intercorrencias_parto: Option<String>,
    pub neuropsicomotor: NeuropsicomotorDetail,
    pub fala: FalaDetail,
}

/// Milestone outcome as stored by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarcoStatus {
    /// Reached, `meses` holds the age.
    Realizou,
    /// Not reached yet.
    NaoRealizou,
    /// Informant could not tell.
    NaoSoubeInformar,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct MarcoDetail {
    pub meses: Option<u32>,
    pub status: Option<MarcoStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct NeuropsicomotorDetail {
    pub sustentou_cabeca: MarcoDetail,
    pub rolou: MarcoDetail,
    pub sentou_sem_apoio: MarcoDetail,
    pub engatinhou: MarcoDetail,
    pub andou_com_apoio: MarcoDetail,
    pub andou_sem_apoio: MarcoDetail,
    pub subiu_escadas: MarcoDetail,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FalaDetail {
    pub balbuciou: MarcoDetail,
    pub primeiras_palavras: MarcoDetail,
    pub juntou_palavras: MarcoDetail,
    pub formou_frases: MarcoDetail,
}

// ============================================================================
// Daily living activities
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AtividadesVidaDiariaDetail {
    pub desfralde: DesfraldeDetail,
    pub sono: SonoDetail,
    pub higiene: HigieneDetail,
    pub alimentacao: AlimentacaoDetail,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TempoDesfraldeDetail {
    pub anos: Option<u32>,
    pub meses: Option<u32>,
    pub usa_fralda: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DesfraldeDetail {
    pub diurno_urina: TempoDesfraldeDetail,
    pub diurno_fezes: TempoDesfraldeDetail,
    pub noturno: TempoDesfraldeDetail,
    pub pede_para_ir: Option<bool>,
    pub limpa_sozinho: Option<bool>,
    pub usa_vaso_sanitario: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SonoDetail {
    pub dorme_sozinho: Option<bool>,
    pub quarto_proprio: Option<bool>,
    pub acorda_noite: Option<bool>,
    pub dificuldade_adormecer: Option<bool>,
    pub horas_sono: Option<String>,
    pub observacoes: Option<String>,
}

/// Hygiene autonomy as stored by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NivelIndependencia {
    Independente,
    Dependente,
    ComAjuda,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HigieneDetail {
    pub toma_banho: Option<NivelIndependencia>,
    pub escova_dentes: Option<NivelIndependencia>,
    pub lava_maos: Option<NivelIndependencia>,
    pub veste_sozinho: Option<NivelIndependencia>,
    pub calca_sapatos: Option<NivelIndependencia>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AlimentacaoDetail {
    pub come_sozinho: Option<bool>,
    pub usa_talheres: Option<bool>,
    pub seletividade: Option<bool>,
    pub engasgos: Option<bool>,
    pub restricoes: Option<String>,
    pub observacoes: Option<String>,
}

// ============================================================================
// Social and academic
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SocialAcademicoDetail {
    pub desenvolvimento_social: DesenvolvimentoSocialDetail,
    pub desenvolvimento_academico: DesenvolvimentoAcademicoDetail,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DesenvolvimentoSocialDetail {
    pub contato_visual: Option<bool>,
    pub responde_nome: Option<bool>,
    pub brinca_com_pares: Option<bool>,
    pub compartilha_interesse: Option<bool>,
    pub brincadeira_simbolica: Option<bool>,
    pub observacoes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DesenvolvimentoAcademicoDetail {
    pub escola: Option<String>,
    pub serie: Option<String>,
    pub turno: Option<String>,
    pub possui_mediador: Option<bool>,
    pub adaptacao_curricular: Option<bool>,
    pub dificuldade_aprendizagem: Option<bool>,
    pub alfabetizado: Option<bool>,
    pub observacoes: Option<String>,
}

// ============================================================================
// Behaviour
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ComportamentoDetail {
    pub estereotipias_rituais: EstereotipiasDetail,
    pub problemas_comportamento: ProblemasComportamentoDetail,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct EstereotipiasDetail {
    pub estereotipias_motoras: Option<bool>,
    pub estereotipias_vocais: Option<bool>,
    pub hiperfoco: Option<bool>,
    pub rigidez_rotina: Option<bool>,
    pub sensibilidade_sensorial: Option<bool>,
    pub descricao: Option<String>,
}

/// A behaviour problem with its optional description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ComportamentoDescrito {
    pub presente: Option<bool>,
    pub descricao: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ProblemasComportamentoDetail {
    pub agressividade: ComportamentoDescrito,
    pub auto_lesao: ComportamentoDescrito,
    pub birras: ComportamentoDescrito,
    pub fugas: ComportamentoDescrito,
    pub destruicao_objetos: ComportamentoDescrito,
}

// ============================================================================
// Finalization
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FinalizacaoDetail {
    pub observacoes_finais: Option<String>,
    pub impressoes_terapeuta: Option<String>,
    pub encaminhamentos: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"id: "901"
pacienteId: "p-17"
pacienteNome: "Joao"
cabecalho:
  dataEntrevista: 2024-03-05
  informante: "Maria"
  parentesco: "mae"
  cuidadores:
    - id: "12"
      nome: "Ana"
      relacao: "avo"
queixaDiagnostico:
  queixaPrincipal: "Atraso de fala"
  exames:
    - id: "e1"
      nome: "EEG"
      arquivos:
        - id: "f1"
          nome: "laudo.pdf"
          mimeType: "application/pdf"
          tamanho: 1000
desenvolvimentoInicial:
  neuropsicomotor:
    sustentouCabeca:
      meses: 3
      status: realizou
    rolou:
      status: naoSoubeInformar
atividadesVidaDiaria:
  higiene:
    tomaBanho: comAjuda
comportamento:
  problemasComportamento:
    birras:
      presente: true
      descricao: "ao sair de casa"
"#;

    #[test]
    fn parses_partial_record_with_defaults() {
        let detail = AnamneseDetail::parse_yaml(SAMPLE).expect("parse yaml");
        assert_eq!(detail.id, "901");
        assert_eq!(detail.cabecalho.informante.as_deref(), Some("Maria"));
        assert_eq!(
            detail.cabecalho.data_entrevista,
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(detail.cabecalho.cuidadores.len(), 1);
        assert_eq!(
            detail.desenvolvimento_inicial.neuropsicomotor.sustentou_cabeca,
            MarcoDetail {
                meses: Some(3),
                status: Some(MarcoStatus::Realizou)
            }
        );
        assert_eq!(
            detail.desenvolvimento_inicial.neuropsicomotor.engatinhou,
            MarcoDetail::default()
        );
        assert_eq!(
            detail.atividades_vida_diaria.higiene.toma_banho,
            Some(NivelIndependencia::ComAjuda)
        );
        assert_eq!(detail.finalizacao, FinalizacaoDetail::default());
    }

    #[test]
    fn yaml_and_json_renderings_parse_back_identically() {
        let detail = AnamneseDetail::parse_yaml(SAMPLE).expect("parse yaml");

        let yaml = detail.render_yaml().expect("render yaml");
        assert_eq!(AnamneseDetail::parse_yaml(&yaml).expect("reparse yaml"), detail);

        let json = detail.render_json().expect("render json");
        assert_eq!(AnamneseDetail::parse_json(&json).expect("parse json"), detail);
    }

    #[test]
    fn serialiser_errors_name_their_format() {
        let err: DetailError = serde_json::from_str::<u8>("x").expect_err("not json").into();
        assert!(err.to_string().starts_with("invalid JSON"), "{err}");
        let err: DetailError = serde_yaml::from_str::<u8>("[").expect_err("not yaml").into();
        assert!(matches!(err, DetailError::InvalidYaml(_)));
    }

    #[test]
    fn strict_validation_reports_path_of_unknown_key() {
        let input = SAMPLE.replace("      relacao: \"avo\"", "      apelido: \"vovo\"");
        let err = AnamneseDetail::parse_yaml(&input).expect_err("should reject unknown key");
        match err {
            DetailError::Translation(msg) => {
                assert!(msg.contains("cabecalho.cuidadores"), "{msg}");
                assert!(msg.contains("apelido"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_milestone_status() {
        let input = SAMPLE.replace("status: naoSoubeInformar", "status: talvez");
        let err = AnamneseDetail::parse_yaml(&input).expect_err("should reject status");
        match err {
            DetailError::Translation(msg) => assert!(msg.contains("rolou"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_id() {
        let err = AnamneseDetail::parse_json(r#"{"pacienteId": "p-1"}"#)
            .expect_err("should reject missing id");
        assert!(matches!(err, DetailError::InvalidInput(msg) if msg.contains("id")));
    }

    #[test]
    fn json_mismatch_reports_path() {
        let err = AnamneseDetail::parse_json(
            r#"{"id": "1", "desenvolvimentoInicial": {"idadeGestacional": "trinta"}}"#,
        )
        .expect_err("should reject wrong type");
        match err {
            DetailError::Translation(msg) => {
                assert!(msg.contains("desenvolvimentoInicial.idadeGestacional"), "{msg}")
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }
}
