#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid value for {path}: {message}")]
    InvalidPatch { path: String, message: String },
    #[error("step {0} is outside the wizard (expected 1 to 8)")]
    StepOutOfRange(u8),
    #[error("unknown list: {0}")]
    UnknownList(String),

    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize document: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to create directory: {0}")]
    DirCreation(std::io::Error),

    #[error("attachment error: {0}")]
    Files(#[from] clinica_files::FilesError),
    #[error("invalid id: {0}")]
    Uuid(#[from] clinica_uuid::UuidError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
