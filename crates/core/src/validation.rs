//! Document validation.
//!
//! Two passes are available:
//!
//! - [`validate_minimal`]: the required fields only. The wizard runs it before submitting.
//! - [`validate_full`]: the minimal pass plus formats, list entities and the cross-field
//!   invariants of milestones and toileting times. The file submission store runs it unless
//!   told to skip it.
//!
//! Both return a [`ValidationReport`]; neither fails for an invalid document.

use crate::form::Anamnese;
use crate::lists::{EntityList, ListEntity};
use crate::sections::{MarcoFalaKind, MarcoMotorKind, Parentesco, TempoDesfraldeKind};
use chrono::NaiveDate;
use clinica_types::is_blank;
use serde::Serialize;
use std::collections::HashSet;

/// One problem found in a document. `path` uses the document's wire names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Display form: `path: message`.
    pub fn display(&self) -> String {
        format!("{}: {}", self.path, self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Itemised messages in the order the issues were found.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ValidationIssue::display).collect()
    }

    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    fn require(&mut self, path: &str, value: &str, message: &str) {
        if is_blank(value) {
            self.push(path, message);
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Required fields only.
pub fn validate_minimal(doc: &Anamnese) -> ValidationReport {
    let mut report = ValidationReport::default();
    minimal_into(doc, &mut report);
    report
}

fn minimal_into(doc: &Anamnese, report: &mut ValidationReport) {
    let cab = &doc.cabecalho;
    report.require("cabecalho.pacienteId", &cab.paciente_id, "Patient is required");
    report.require(
        "cabecalho.dataEntrevista",
        &cab.data_entrevista,
        "Interview date is required",
    );
    report.require("cabecalho.informante", &cab.informante, "Informant is required");
    if cab.parentesco.is_none() {
        report.push("cabecalho.parentesco", "Relationship to the patient is required");
    }
    report.require(
        "queixaDiagnostico.queixaPrincipal",
        &doc.queixa_diagnostico.queixa_principal,
        "Main complaint is required",
    );
}

/// Everything [`validate_minimal`] checks, plus formats and consistency.
pub fn validate_full(doc: &Anamnese) -> ValidationReport {
    let mut report = ValidationReport::default();
    minimal_into(doc, &mut report);

    let cab = &doc.cabecalho;
    if cab.parentesco == Some(Parentesco::Outro) {
        report.require(
            "cabecalho.parentescoOutro",
            &cab.parentesco_outro,
            "Describe the relationship when 'outro' is selected",
        );
    }
    check_date(&mut report, "cabecalho.dataEntrevista", &cab.data_entrevista);
    check_date(
        &mut report,
        "cabecalho.pacienteDataNascimento",
        &cab.paciente_data_nascimento,
    );

    check_entities(
        &mut report,
        "cabecalho.cuidadores",
        &cab.cuidadores,
        |c| &c.nome,
        "name",
    );
    for cuidador in &cab.cuidadores {
        check_date(
            &mut report,
            &format!("cabecalho.cuidadores.{}.dataNascimento", cuidador.id),
            &cuidador.data_nascimento,
        );
    }

    let queixa = &doc.queixa_diagnostico;
    check_entities(
        &mut report,
        "queixaDiagnostico.especialistas",
        &queixa.especialistas,
        |e| &e.nome,
        "name",
    );
    for (index, especialista) in queixa.especialistas.iter().enumerate() {
        let path = format!("queixaDiagnostico.especialistas.{}", especialista.id);
        if especialista.especialidade.is_none() {
            report.push(
                format!("{path}.especialidade"),
                format!("{}: specialty is required", label_at::<crate::sections::Especialista>(index)),
            );
        }
        if !is_blank(&especialista.mes_ano) && !is_month_year(&especialista.mes_ano) {
            report.push(format!("{path}.mesAno"), "Expected MM/YYYY");
        }
    }
    check_entities(
        &mut report,
        "queixaDiagnostico.medicamentos",
        &queixa.medicamentos,
        |m| &m.nome,
        "name",
    );
    check_entities(
        &mut report,
        "queixaDiagnostico.exames",
        &queixa.exames,
        |e| &e.nome,
        "name",
    );
    for exame in &queixa.exames {
        check_unique_ids(
            &mut report,
            &format!("queixaDiagnostico.exames.{}.arquivos", exame.id),
            &exame.arquivos,
        );
        check_date(
            &mut report,
            &format!("queixaDiagnostico.exames.{}.data", exame.id),
            &exame.data,
        );
    }
    check_entities(
        &mut report,
        "queixaDiagnostico.terapias",
        &queixa.terapias,
        |t| &t.tipo,
        "type",
    );

    let contexto = &doc.contexto_familiar_rotina;
    check_entities(
        &mut report,
        "contextoFamiliarRotina.historicosFamiliares",
        &contexto.historicos_familiares,
        |h| &h.condicao,
        "condition",
    );
    check_entities(
        &mut report,
        "contextoFamiliarRotina.atividadesRotina",
        &contexto.atividades_rotina,
        |a| &a.atividade,
        "activity",
    );

    let dev = &doc.desenvolvimento_inicial;
    for kind in MarcoMotorKind::ALL {
        let marco = kind.get(&dev.neuropsicomotor);
        let path = format!("desenvolvimentoInicial.neuropsicomotor.{}", kind.key());
        if !marco.is_consistent() {
            report.push(&path, "Only one answer may be given for a milestone");
        }
        check_number(&mut report, &format!("{path}.meses"), marco.meses());
    }
    for kind in MarcoFalaKind::ALL {
        let marco = kind.get(&dev.fala);
        let path = format!("desenvolvimentoInicial.fala.{}", kind.key());
        if !marco.is_consistent() {
            report.push(&path, "Only one answer may be given for a milestone");
        }
        check_number(&mut report, &format!("{path}.meses"), marco.meses());
    }

    let desfralde = &doc.atividades_vida_diaria.desfralde;
    for kind in TempoDesfraldeKind::ALL {
        let tempo = kind.get(desfralde);
        let path = format!("atividadesVidaDiaria.desfralde.{}", kind.key());
        if !tempo.is_consistent() {
            report.push(&path, "A child still using diapers has no continence time");
        }
        check_number(&mut report, &format!("{path}.anos"), tempo.anos());
        check_number(&mut report, &format!("{path}.meses"), tempo.meses());
    }

    report
}

fn label_at<T: ListEntity>(index: usize) -> String {
    crate::lists::display_label::<T>(index)
}

fn check_entities<T: ListEntity>(
    report: &mut ValidationReport,
    list_path: &str,
    list: &EntityList<T>,
    field: impl Fn(&T) -> &String,
    field_name: &str,
) {
    check_unique_ids(report, list_path, list);
    for (index, entity) in list.iter().enumerate() {
        if is_blank(field(entity)) {
            report.push(
                format!("{list_path}.{}", entity.id()),
                format!("{}: {field_name} is required", label_at::<T>(index)),
            );
        }
    }
}

/// Every id after the first occurrence is reported; list operations would only reach the first.
fn check_unique_ids<T: ListEntity>(
    report: &mut ValidationReport,
    list_path: &str,
    list: &EntityList<T>,
) {
    let mut seen = HashSet::new();
    for (index, entity) in list.iter().enumerate() {
        if !seen.insert(entity.id()) {
            report.push(
                format!("{list_path}.{}", entity.id()),
                format!("{}: duplicate id {}", label_at::<T>(index), entity.id()),
            );
        }
    }
}

fn check_date(report: &mut ValidationReport, path: &str, value: &str) {
    if is_blank(value) {
        return;
    }
    if NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).is_err() {
        report.push(path, "Expected a date as YYYY-MM-DD");
    }
}

fn check_number(report: &mut ValidationReport, path: &str, value: &str) {
    if is_blank(value) {
        return;
    }
    if value.trim().parse::<u32>().is_err() {
        report.push(path, "Expected a whole number");
    }
}

/// `MM/YYYY` with a zero-padded month.
fn is_month_year(value: &str) -> bool {
    let value = value.trim();
    value.len() == 7
        && value.as_bytes()[2] == b'/'
        && NaiveDate::parse_from_str(&format!("01/{value}"), "%d/%m/%Y").is_ok()
}
