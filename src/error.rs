use thiserror::Error;

/// Domain errors raised by the workspace core. File and CLI boundaries wrap these in
/// `anyhow::Error` with context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkspaceError {
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    #[error("entity id '{0}' is already placed in the catalog")]
    DuplicateEntityId(String),
    #[error("no avatar draft is open")]
    NoActiveDraft,
    #[error("duplicate sibling name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },
    #[error("file '{0}' cannot have children")]
    FileWithChildren(String),
    #[error("invalid colour '{0}', expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
}

impl WorkspaceError {
    pub(crate) fn invalid_layout(reason: impl Into<String>) -> Self {
        WorkspaceError::InvalidLayout(reason.into())
    }
}
