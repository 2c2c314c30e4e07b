//! Constants used throughout the intake core.

/// Default directory for submitted documents when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinica_data";

/// Default preferences file, relative to the data directory.
pub const DEFAULT_PREFERENCES_FILENAME: &str = "preferences.json";

/// Filename of a submitted document inside its sharded directory.
pub const DOCUMENT_FILENAME: &str = "anamnese.json";

/// Filename of the attachment manifest written next to a submitted document.
pub const ATTACHMENTS_MANIFEST_FILENAME: &str = "attachments.json";

/// Directory (under the data directory) holding submitted documents.
pub const SUBMISSIONS_DIR_NAME: &str = "submissions";

/// Preference key for the hidden columns of the sessions table.
pub const SESSIONS_HIDDEN_COLUMNS_KEY: &str = "sessoes.colunasOcultas";

/// Shown when a submission fails without any detail from the backend.
pub const GENERIC_SUBMISSION_FAILURE: &str = "Could not save the anamnese. Please try again.";

/// Shown when an edit-mode save fails without any detail from the backend.
pub const GENERIC_UPDATE_FAILURE: &str = "Could not update the anamnese. Please try again.";
