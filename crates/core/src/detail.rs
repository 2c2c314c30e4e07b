//! Stored detail record to intake form.
//!
//! The mapping is one-directional and total: every field of the form gets a value, taken from
//! the detail when present and defaulted otherwise. Conversions where the two shapes disagree
//! have their own named function:
//!
//! | detail | form | function |
//! |---|---|---|
//! | milestone `{meses, status}` | `{meses, naoRealiza/naoFala, naoSoubeInformar}` | [`motor_milestone`], [`speech_milestone`] |
//! | toileting `{anos, meses, usaFralda}` numbers | text with diaper exclusivity | [`toileting_time`] |
//! | `Option<bool>` | tri-state `Option<Resposta>` | [`tri_state`] |
//! | independence level | with-help answer | [`with_help`] |
//! | `parentesco` free string | enum plus `parentescoOutro` | [`relationship`] |
//! | `especialidade` free string | enum | [`specialty`] |
//! | `mes` + `ano` | `mesAno` as `MM/YYYY` | [`month_year`] |
//! | `{presente, descricao}` | answer plus `descricao<Field>` | [`described`] |
//! | typed numbers and dates | text | [`number_text`], [`date_text`] |
//! | backend ids | entity ids | [`entity_id`] |

use crate::form::{Anamnese, AnamneseForm};
use crate::lists::{EntityList, ListEntity};
use crate::milestones::{MarcoFala, MarcoMotor, TempoDesfralde};
use crate::sections::{
    Alimentacao, ArquivoAnexo, AtividadeRotina, AtividadesVidaDiaria, Cabecalho, Comportamento,
    ContextoFamiliarRotina, Cuidador, DesenvolvimentoAcademico, DesenvolvimentoInicial,
    DesenvolvimentoSocial, Desfralde, Especialidade, Especialista, EstereotipiasRituais, Exame,
    Fala, Finalizacao, Higiene, HistoricoFamiliar, Medicamento, Neuropsicomotor, Parentesco,
    ProblemasComportamento, QueixaDiagnostico, SocialAcademico, Sono, Terapia,
};
use chrono::NaiveDate;
use clinica_detail::{
    AnamneseDetail, ComportamentoDescrito, MarcoDetail, MarcoStatus, NivelIndependencia,
    TempoDesfraldeDetail,
};
use clinica_types::{Resposta, RespostaComAjuda};
use clinica_uuid::EntityId;
use std::collections::HashSet;

/// Converts a stored record into an edit-ready form.
pub fn into_form(detail: &AnamneseDetail) -> AnamneseForm {
    AnamneseForm::from_document(into_anamnese(detail))
}

pub fn into_anamnese(detail: &AnamneseDetail) -> Anamnese {
    Anamnese {
        cabecalho: cabecalho(detail),
        queixa_diagnostico: queixa_diagnostico(detail),
        contexto_familiar_rotina: contexto(detail),
        desenvolvimento_inicial: desenvolvimento(detail),
        atividades_vida_diaria: atividades(detail),
        social_academico: social(detail),
        comportamento: comportamento(detail),
        finalizacao: finalizacao(detail),
    }
}

// ============================================================================
// Named conversions
// ============================================================================

pub fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn number_text<N: ToString>(value: Option<N>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

pub fn date_text(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn tri_state(value: Option<bool>) -> Option<Resposta> {
    value.map(Resposta::from_bool)
}

pub fn with_help(value: Option<NivelIndependencia>) -> Option<RespostaComAjuda> {
    value.map(|level| match level {
        NivelIndependencia::Independente => RespostaComAjuda::Sim,
        NivelIndependencia::Dependente => RespostaComAjuda::Nao,
        NivelIndependencia::ComAjuda => RespostaComAjuda::ComAjuda,
    })
}

/// Keeps a backend id when it is usable as an entity id, mints a new one otherwise.
pub fn entity_id(raw: &str) -> EntityId {
    EntityId::parse(raw).unwrap_or_else(|err| {
        tracing::warn!("replacing unusable record id '{raw}': {err}");
        EntityId::new()
    })
}

/// Known relationship keys map to the enum; anything else becomes `outro` with the stored
/// text (or the explicit `parentescoOutro`) as the free-text value.
pub fn relationship(raw: &Option<String>, outro: &Option<String>) -> (Option<Parentesco>, String) {
    let raw = raw.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match raw {
        None => (None, text(outro)),
        Some(key) => match Parentesco::from_key(key) {
            Some(parentesco) => (Some(parentesco), text(outro)),
            None => {
                let free = outro
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(key);
                (Some(Parentesco::Outro), free.to_string())
            }
        },
    }
}

/// Unknown specialties are kept as `outra`.
pub fn specialty(raw: &Option<String>) -> Option<Especialidade> {
    let key = raw.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some(Especialidade::from_key(key).unwrap_or(Especialidade::Outra))
}

/// `MM/YYYY` when both parts are present and the month is valid.
pub fn month_year(mes: Option<u32>, ano: Option<i32>) -> String {
    match (mes, ano) {
        (Some(mes @ 1..=12), Some(ano)) => format!("{mes:02}/{ano:04}"),
        _ => String::new(),
    }
}

/// `status` picks which of the three answers is set; `meses` is only kept for a reached
/// milestone (or when no status was stored).
pub fn motor_milestone(detail: &MarcoDetail) -> MarcoMotor {
    let mut marco = MarcoMotor::default();
    match detail.status {
        Some(MarcoStatus::NaoRealizou) => marco.set_nao_realiza(true),
        Some(MarcoStatus::NaoSoubeInformar) => marco.set_nao_soube_informar(true),
        Some(MarcoStatus::Realizou) | None => marco.set_meses(number_text(detail.meses)),
    }
    marco
}

pub fn speech_milestone(detail: &MarcoDetail) -> MarcoFala {
    let mut marco = MarcoFala::default();
    match detail.status {
        Some(MarcoStatus::NaoRealizou) => marco.set_nao_fala(true),
        Some(MarcoStatus::NaoSoubeInformar) => marco.set_nao_soube_informar(true),
        Some(MarcoStatus::Realizou) | None => marco.set_meses(number_text(detail.meses)),
    }
    marco
}

/// A stored `usaFralda = true` wins over any stored time.
pub fn toileting_time(detail: &TempoDesfraldeDetail) -> TempoDesfralde {
    let mut tempo = TempoDesfralde::default();
    if detail.usa_fralda == Some(true) {
        tempo.set_usa_fralda(true);
    } else {
        tempo.set_tempo(number_text(detail.anos), number_text(detail.meses));
    }
    tempo
}

pub fn described(detail: &ComportamentoDescrito) -> (Option<Resposta>, String) {
    (tri_state(detail.presente), text(&detail.descricao))
}

// ============================================================================
// Sections
// ============================================================================

fn cabecalho(detail: &AnamneseDetail) -> Cabecalho {
    let cab = &detail.cabecalho;
    let (parentesco, parentesco_outro) = relationship(&cab.parentesco, &cab.parentesco_outro);
    Cabecalho {
        data_entrevista: date_text(cab.data_entrevista),
        paciente_id: detail.paciente_id.clone(),
        paciente_nome: text(&detail.paciente_nome),
        paciente_data_nascimento: date_text(detail.paciente_data_nascimento),
        informante: text(&cab.informante),
        parentesco,
        parentesco_outro,
        quem_encaminhou: text(&cab.quem_encaminhou),
        cuidadores: list(&cab.cuidadores, |c| Cuidador {
            id: entity_id(&c.id),
            nome: text(&c.nome),
            relacao: text(&c.relacao),
            telefone: text(&c.telefone),
            email: text(&c.email),
            data_nascimento: date_text(c.data_nascimento),
        }),
    }
}

fn queixa_diagnostico(detail: &AnamneseDetail) -> QueixaDiagnostico {
    let q = &detail.queixa_diagnostico;
    QueixaDiagnostico {
        queixa_principal: text(&q.queixa_principal),
        diagnostico_previo: text(&q.diagnostico_previo),
        suspeita_diagnostica: text(&q.suspeita_diagnostica),
        observacoes: text(&q.observacoes),
        especialistas: list(&q.especialistas, |e| Especialista {
            id: entity_id(&e.id),
            especialidade: specialty(&e.especialidade),
            nome: text(&e.nome),
            mes_ano: month_year(e.mes, e.ano),
            ativo: e.ativo.unwrap_or(false),
        }),
        medicamentos: list(&q.medicamentos, |m| Medicamento {
            id: entity_id(&m.id),
            nome: text(&m.nome),
            dosagem: text(&m.dosagem),
            horario: text(&m.horario),
            motivo: text(&m.motivo),
            prescritor: text(&m.prescritor),
        }),
        exames: list(&q.exames, |e| Exame {
            id: entity_id(&e.id),
            nome: text(&e.nome),
            data: date_text(e.data),
            resultado: text(&e.resultado),
            arquivos: list(&e.arquivos, |a| ArquivoAnexo {
                id: entity_id(&a.id),
                nome: text(&a.nome),
                tipo: text(&a.mime_type),
                tamanho: a.tamanho.unwrap_or(0),
                removed: false,
            }),
        }),
        terapias: list(&q.terapias, |t| Terapia {
            id: entity_id(&t.id),
            tipo: text(&t.tipo),
            profissional: text(&t.profissional),
            frequencia: text(&t.frequencia),
            periodo: text(&t.periodo),
            ativa: t.ativa.unwrap_or(false),
        }),
    }
}

fn contexto(detail: &AnamneseDetail) -> ContextoFamiliarRotina {
    let c = &detail.contexto_familiar_rotina;
    ContextoFamiliarRotina {
        composicao_familiar: text(&c.composicao_familiar),
        historicos_familiares: list(&c.historicos_familiares, |h| HistoricoFamiliar {
            id: entity_id(&h.id),
            parentesco: text(&h.parentesco),
            condicao: text(&h.condicao),
            observacao: text(&h.observacao),
        }),
        atividades_rotina: list(&c.atividades_rotina, |a| AtividadeRotina {
            id: entity_id(&a.id),
            atividade: text(&a.atividade),
            horario: text(&a.horario),
            frequencia: text(&a.frequencia),
            responsavel: text(&a.responsavel),
        }),
    }
}

fn desenvolvimento(detail: &AnamneseDetail) -> DesenvolvimentoInicial {
    let d = &detail.desenvolvimento_inicial;
    let n = &d.neuropsicomotor;
    let f = &d.fala;
    DesenvolvimentoInicial {
        tipo_parto: text(&d.tipo_parto),
        idade_gestacional: number_text(d.idade_gestacional),
        peso_nascimento: number_text(d.peso_nascimento),
        comprimento_nascimento: number_text(d.comprimento_nascimento),
        intercorrencias_gestacao: text(&d.intercorrencias_gestacao),
        intercorrencias_parto: text(&d.intercorrencias_parto),
        neuropsicomotor: Neuropsicomotor {
            sustentou_cabeca: motor_milestone(&n.sustentou_cabeca),
            rolou: motor_milestone(&n.rolou),
            sentou_sem_apoio: motor_milestone(&n.sentou_sem_apoio),
            engatinhou: motor_milestone(&n.engatinhou),
            andou_com_apoio: motor_milestone(&n.andou_com_apoio),
            andou_sem_apoio: motor_milestone(&n.andou_sem_apoio),
            subiu_escadas: motor_milestone(&n.subiu_escadas),
        },
        fala: Fala {
            balbuciou: speech_milestone(&f.balbuciou),
            primeiras_palavras: speech_milestone(&f.primeiras_palavras),
            juntou_palavras: speech_milestone(&f.juntou_palavras),
            formou_frases: speech_milestone(&f.formou_frases),
        },
    }
}

fn atividades(detail: &AnamneseDetail) -> AtividadesVidaDiaria {
    let a = &detail.atividades_vida_diaria;
    AtividadesVidaDiaria {
        desfralde: Desfralde {
            diurno_urina: toileting_time(&a.desfralde.diurno_urina),
            diurno_fezes: toileting_time(&a.desfralde.diurno_fezes),
            noturno: toileting_time(&a.desfralde.noturno),
            pede_para_ir: tri_state(a.desfralde.pede_para_ir),
            limpa_sozinho: tri_state(a.desfralde.limpa_sozinho),
            usa_vaso_sanitario: tri_state(a.desfralde.usa_vaso_sanitario),
        },
        sono: Sono {
            dorme_sozinho: tri_state(a.sono.dorme_sozinho),
            quarto_proprio: tri_state(a.sono.quarto_proprio),
            acorda_noite: tri_state(a.sono.acorda_noite),
            dificuldade_adormecer: tri_state(a.sono.dificuldade_adormecer),
            horas_sono: text(&a.sono.horas_sono),
            observacoes: text(&a.sono.observacoes),
        },
        higiene: Higiene {
            toma_banho: with_help(a.higiene.toma_banho),
            escova_dentes: with_help(a.higiene.escova_dentes),
            lava_maos: with_help(a.higiene.lava_maos),
            veste_sozinho: with_help(a.higiene.veste_sozinho),
            calca_sapatos: with_help(a.higiene.calca_sapatos),
        },
        alimentacao: Alimentacao {
            come_sozinho: tri_state(a.alimentacao.come_sozinho),
            usa_talheres: tri_state(a.alimentacao.usa_talheres),
            seletividade: tri_state(a.alimentacao.seletividade),
            engasgos: tri_state(a.alimentacao.engasgos),
            restricoes: text(&a.alimentacao.restricoes),
            observacoes: text(&a.alimentacao.observacoes),
        },
    }
}

fn social(detail: &AnamneseDetail) -> SocialAcademico {
    let s = &detail.social_academico.desenvolvimento_social;
    let a = &detail.social_academico.desenvolvimento_academico;
    SocialAcademico {
        desenvolvimento_social: DesenvolvimentoSocial {
            contato_visual: tri_state(s.contato_visual),
            responde_nome: tri_state(s.responde_nome),
            brinca_com_pares: tri_state(s.brinca_com_pares),
            compartilha_interesse: tri_state(s.compartilha_interesse),
            brincadeira_simbolica: tri_state(s.brincadeira_simbolica),
            observacoes: text(&s.observacoes),
        },
        desenvolvimento_academico: DesenvolvimentoAcademico {
            escola: text(&a.escola),
            serie: text(&a.serie),
            turno: text(&a.turno),
            possui_mediador: tri_state(a.possui_mediador),
            adaptacao_curricular: tri_state(a.adaptacao_curricular),
            dificuldade_aprendizagem: tri_state(a.dificuldade_aprendizagem),
            alfabetizado: tri_state(a.alfabetizado),
            observacoes: text(&a.observacoes),
        },
    }
}

fn comportamento(detail: &AnamneseDetail) -> Comportamento {
    let e = &detail.comportamento.estereotipias_rituais;
    let p = &detail.comportamento.problemas_comportamento;
    let (agressividade, descricao_agressividade) = described(&p.agressividade);
    let (auto_lesao, descricao_auto_lesao) = described(&p.auto_lesao);
    let (birras, descricao_birras) = described(&p.birras);
    let (fugas, descricao_fugas) = described(&p.fugas);
    let (destruicao_objetos, descricao_destruicao_objetos) = described(&p.destruicao_objetos);
    Comportamento {
        estereotipias_rituais: EstereotipiasRituais {
            estereotipias_motoras: tri_state(e.estereotipias_motoras),
            estereotipias_vocais: tri_state(e.estereotipias_vocais),
            hiperfoco: tri_state(e.hiperfoco),
            rigidez_rotina: tri_state(e.rigidez_rotina),
            sensibilidade_sensorial: tri_state(e.sensibilidade_sensorial),
            descricao: text(&e.descricao),
        },
        problemas_comportamento: ProblemasComportamento {
            agressividade,
            descricao_agressividade,
            auto_lesao,
            descricao_auto_lesao,
            birras,
            descricao_birras,
            fugas,
            descricao_fugas,
            destruicao_objetos,
            descricao_destruicao_objetos,
        },
    }
}

fn finalizacao(detail: &AnamneseDetail) -> Finalizacao {
    let f = &detail.finalizacao;
    Finalizacao {
        observacoes_finais: text(&f.observacoes_finais),
        impressoes_terapeuta: text(&f.impressoes_terapeuta),
        encaminhamentos: text(&f.encaminhamentos),
    }
}

/// Converts stored items, minting a fresh id for any id already used earlier in the list.
fn list<D, T: ListEntity>(items: &[D], convert: impl Fn(&D) -> T) -> EntityList<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| {
            let mut entity = convert(item);
            if !seen.insert(entity.id().clone()) {
                let fresh = EntityId::new();
                tracing::warn!(
                    "duplicate {} id '{}' replaced by {fresh}",
                    T::LABEL,
                    entity.id()
                );
                *entity.id_mut() = fresh.clone();
                seen.insert(fresh);
            }
            entity
        })
        .collect::<Vec<_>>()
        .into()
}
