//! Detail drawer and read/edit view of a submitted anamnese.

use crate::constants::GENERIC_UPDATE_FAILURE;
use crate::detail::{into_anamnese, into_form};
use crate::fetch::{FetchTicket, RequestGeneration};
use crate::form::{Anamnese, AnamneseForm};
use crate::submission::{RecordUpdater, SubmissionError};
use clinica_detail::AnamneseDetail;

/// Whether the view shows the stored record or an edit draft.
#[derive(Debug, Clone)]
pub enum ViewMode {
    Read,
    Edit(Box<AnamneseForm>),
}

/// A submitted record shown read-only, with an optional edit session.
#[derive(Debug, Clone)]
pub struct RecordView {
    detail: AnamneseDetail,
    document: Anamnese,
    /// Whether `document` comes from a save rather than from `detail`.
    saved: bool,
    mode: ViewMode,
    errors: Vec<String>,
}

impl RecordView {
    /// Opens `detail` in read mode.
    pub fn new(detail: AnamneseDetail) -> Self {
        let document = into_anamnese(&detail);
        Self {
            detail,
            document,
            saved: false,
            mode: ViewMode::Read,
            errors: Vec::new(),
        }
    }

    pub fn record_id(&self) -> &str {
        &self.detail.id
    }

    pub fn detail(&self) -> &AnamneseDetail {
        &self.detail
    }

    /// What read mode shows: the stored record, or the last saved edit.
    pub fn document(&self) -> &Anamnese {
        &self.document
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ViewMode::Edit(_))
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The edit draft, when editing.
    pub fn draft_mut(&mut self) -> Option<&mut AnamneseForm> {
        match &mut self.mode {
            ViewMode::Edit(form) => Some(form.as_mut()),
            ViewMode::Read => None,
        }
    }

    /// Starts an edit session. Entering edit mode twice keeps the existing draft.
    pub fn enter_edit(&mut self) {
        if self.is_editing() {
            return;
        }
        let form = if self.saved {
            AnamneseForm::from_document(self.document.clone())
        } else {
            into_form(&self.detail)
        };
        tracing::debug!("editing record {}", self.detail.id);
        self.mode = ViewMode::Edit(Box::new(form));
        self.errors.clear();
    }

    /// Drops the draft and returns to read mode.
    pub fn cancel_edit(&mut self) {
        self.mode = ViewMode::Read;
        self.errors.clear();
    }

    /// Sends the whole draft to `updater`.
    ///
    /// On success the view returns to read mode showing the saved document. On failure the
    /// draft is kept and the messages are returned (and shown).
    pub fn save(&mut self, updater: &dyn RecordUpdater) -> Result<(), Vec<String>> {
        let ViewMode::Edit(form) = &self.mode else {
            return Ok(());
        };
        let document = form.document().clone();

        match updater.replace(&self.detail.id, &document) {
            Ok(()) => {
                tracing::info!("record {} updated", self.detail.id);
                self.document = document;
                self.saved = true;
                self.mode = ViewMode::Read;
                self.errors.clear();
                Ok(())
            }
            Err(err) => {
                tracing::warn!("record {} update failed: {err}", self.detail.id);
                let mut messages = err.user_messages();
                if messages.is_empty() {
                    messages.push(GENERIC_UPDATE_FAILURE.to_string());
                }
                self.errors = messages.clone();
                Err(messages)
            }
        }
    }
}

/// State of the detail drawer.
#[derive(Debug, Clone)]
pub enum DrawerState {
    Closed,
    Loading { record_id: String },
    Open(Box<RecordView>),
    Failed { record_id: String, message: String },
}

/// The drawer opened from the records table.
///
/// Opening issues a ticket; only the result for the latest ticket is shown, so a slow
/// response for a previously clicked row cannot replace the current one.
#[derive(Debug)]
pub struct RecordDrawer {
    generation: RequestGeneration,
    state: DrawerState,
}

impl Default for RecordDrawer {
    fn default() -> Self {
        Self {
            generation: RequestGeneration::new(),
            state: DrawerState::Closed,
        }
    }
}

impl RecordDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawerState {
        &self.state
    }

    pub fn view_mut(&mut self) -> Option<&mut RecordView> {
        match &mut self.state {
            DrawerState::Open(view) => Some(view.as_mut()),
            _ => None,
        }
    }

    pub fn open(&mut self, record_id: &str) -> FetchTicket {
        let ticket = self.generation.issue();
        self.state = DrawerState::Loading {
            record_id: record_id.to_string(),
        };
        ticket
    }

    /// Applies a fetch result. Returns `false` when `ticket` is stale and nothing changed.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: Result<AnamneseDetail, SubmissionError>,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!("stale drawer fetch dropped");
            return false;
        }
        let record_id = match &self.state {
            DrawerState::Loading { record_id } => record_id.clone(),
            _ => return false,
        };
        self.state = match result {
            Ok(detail) => DrawerState::Open(Box::new(RecordView::new(detail))),
            Err(err) => {
                tracing::warn!("could not load record {record_id}: {err}");
                let message = err
                    .user_messages()
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "Could not load the anamnese.".to_string());
                DrawerState::Failed { record_id, message }
            }
        };
        true
    }

    /// Closes the drawer; results still in flight are ignored.
    pub fn close(&mut self) {
        self.generation.invalidate();
        self.state = DrawerState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::FieldPatch;
    use crate::sections::{Cabecalho, QueixaDiagnostico};
    use std::cell::RefCell;

    fn stored(id: &str, queixa: &str) -> AnamneseDetail {
        AnamneseDetail::parse_yaml(&format!(
            "id: \"{id}\"\npacienteId: \"p-1\"\nqueixaDiagnostico:\n  queixaPrincipal: \"{queixa}\"\n"
        ))
        .expect("detail")
    }

    #[derive(Default)]
    struct Updater {
        saved: RefCell<Vec<(String, Anamnese)>>,
        fail: Option<fn() -> SubmissionError>,
    }

    impl RecordUpdater for Updater {
        fn replace(&self, record_id: &str, document: &Anamnese) -> Result<(), SubmissionError> {
            if let Some(fail) = self.fail {
                return Err(fail());
            }
            self.saved
                .borrow_mut()
                .push((record_id.to_string(), document.clone()));
            Ok(())
        }
    }

    #[test]
    fn read_mode_by_default_and_cancel_drops_the_draft() {
        let mut view = RecordView::new(stored("r1", "Atraso"));
        assert!(!view.is_editing());
        assert!(view.draft_mut().is_none());

        view.enter_edit();
        let draft = view.draft_mut().expect("editing");
        draft.update::<QueixaDiagnostico>(|q| q.queixa_principal = "Mudou".into());

        view.cancel_edit();
        assert!(!view.is_editing());
        assert_eq!(view.document().queixa_diagnostico.queixa_principal, "Atraso");

        view.enter_edit();
        let draft = view.draft_mut().expect("editing again");
        assert_eq!(
            draft.section::<QueixaDiagnostico>().queixa_principal,
            "Atraso"
        );
    }

    #[test]
    fn save_replaces_the_whole_record() {
        let updater = Updater::default();
        let mut view = RecordView::new(stored("r1", "Atraso"));
        view.enter_edit();
        view.draft_mut()
            .expect("editing")
            .apply(&FieldPatch::parse("cabecalho.informante", serde_json::json!("Paulo")).expect("path"))
            .expect("patch");

        view.save(&updater).expect("saved");
        assert!(!view.is_editing());
        assert_eq!(view.document().cabecalho.informante, "Paulo");

        let saved = updater.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "r1");
        assert_eq!(saved[0].1.queixa_diagnostico.queixa_principal, "Atraso");

        drop(saved);
        view.enter_edit();
        assert_eq!(
            view.draft_mut().expect("editing").section::<Cabecalho>().informante,
            "Paulo"
        );
    }

    #[test]
    fn failed_save_keeps_the_draft() {
        let updater = Updater {
            fail: Some(|| SubmissionError::Unavailable("timeout".into())),
            ..Updater::default()
        };
        let mut view = RecordView::new(stored("r1", "Atraso"));
        view.enter_edit();
        view.draft_mut()
            .expect("editing")
            .update::<Cabecalho>(|c| c.informante = "Paulo".into());

        let messages = view.save(&updater).expect_err("fails");
        assert_eq!(messages, vec![GENERIC_UPDATE_FAILURE.to_string()]);
        assert!(view.is_editing());
        assert_eq!(view.errors(), messages.as_slice());
        assert_eq!(
            view.draft_mut().expect("draft kept").section::<Cabecalho>().informante,
            "Paulo"
        );
    }

    #[test]
    fn drawer_ignores_stale_fetches() {
        let mut drawer = RecordDrawer::new();
        let first = drawer.open("r1");
        let second = drawer.open("r2");

        assert!(!drawer.resolve(first, Ok(stored("r1", "primeiro"))));
        assert!(matches!(drawer.state(), DrawerState::Loading { record_id } if record_id == "r2"));

        assert!(drawer.resolve(second, Ok(stored("r2", "segundo"))));
        let view = drawer.view_mut().expect("open");
        assert_eq!(view.record_id(), "r2");
        assert_eq!(view.document().queixa_diagnostico.queixa_principal, "segundo");
    }

    #[test]
    fn drawer_close_and_failure() {
        let mut drawer = RecordDrawer::new();
        let ticket = drawer.open("r1");
        drawer.close();
        assert!(!drawer.resolve(ticket, Ok(stored("r1", "x"))));
        assert!(matches!(drawer.state(), DrawerState::Closed));

        let ticket = drawer.open("r3");
        assert!(drawer.resolve(
            ticket,
            Err(SubmissionError::Rejected {
                errors: vec![],
                message: Some("Record not found".into()),
            })
        ));
        assert!(matches!(
            drawer.state(),
            DrawerState::Failed { message, .. } if message == "Record not found"
        ));
    }
}
