//! Error types for the layout designer

use thiserror::Error;

/// Errors returned by designer operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DesignError {
    /// Reference to a component the model does not know
    #[error("unknown component '{id}'")]
    UnknownComponent { id: String, suggestions: Vec<String> },

    /// Reference to a container the model does not know
    #[error("unknown container '{id}'")]
    UnknownContainer { id: String, suggestions: Vec<String> },

    /// A component used where a container is required
    #[error("component '{id}' is not a container")]
    NotAContainer { id: String },

    /// A new component reusing an existing id
    #[error("component '{id}' already exists")]
    DuplicateComponent { id: String },

    /// A gesture was started while another one is running
    #[error("a gesture session is already active")]
    SessionActive,

    /// A gesture operation was called with no session running
    #[error("no gesture session is active")]
    NoSession,

    /// A gesture started without components
    #[error("no components given")]
    EmptySelection,

    /// Components of one gesture live in different containers
    #[error("components {} are not in the same container", ids.join(", "))]
    MixedParents { ids: Vec<String> },

    /// The operation cannot apply to this component or container
    #[error("invalid target '{id}': {reason}")]
    InvalidTarget { id: String, reason: String },

    /// The model is not in the shape an operation requires
    #[error("invalid layout structure: {reason}")]
    InvalidStructure { reason: String },

    /// A change mark from a history branch that no longer exists
    #[error("change mark is no longer valid")]
    StaleChangeMark,
}

impl DesignError {
    /// Create an unknown component error with suggestions
    pub fn unknown_component(id: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UnknownComponent {
            id: id.into(),
            suggestions,
        }
    }

    /// Create an unknown container error with suggestions
    pub fn unknown_container(id: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UnknownContainer {
            id: id.into(),
            suggestions,
        }
    }

    /// Create an invalid target error
    pub fn invalid_target(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid structure error
    pub fn invalid_structure(reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            reason: reason.into(),
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownComponent { suggestions, .. } => Some(suggestions),
            Self::UnknownContainer { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}
