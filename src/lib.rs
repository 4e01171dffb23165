//! Layout Designer - constraint-based layout inference for GUI form builders
//!
//! Components are dragged onto a form; the designer snaps them to nearby
//! edges, baselines and container borders, and records the result as a pair
//! of interval trees (one per axis) that keep the form correct when it is
//! resized.
//!
//! # Example
//!
//! ```rust
//! use layout_designer::{Bounds, LayoutDesigner, LayoutModel, NewComponent, Point, TableMetrics};
//!
//! let mut model = LayoutModel::new();
//! model.add_component("Form", true);
//! model.set_form_size("Form", Some((400, 300)));
//! let metrics = TableMetrics::new().with_component("jButton1", 80, 24);
//!
//! let mut designer = LayoutDesigner::new(model, metrics);
//! designer
//!     .start_adding(
//!         vec![NewComponent::new("jButton1")],
//!         &[Bounds::new(0, 0, 80, 24)],
//!         Point::new(0, 0),
//!         Some("Form"),
//!     )
//!     .unwrap();
//! designer.move_to(Point::new(100, 100), Some("Form"), true, false).unwrap();
//! assert!(designer.end_moving(true).unwrap());
//!
//! let saved = layout_designer::save_form(designer.model());
//! assert!(saved.contains("component jButton1"));
//! ```

pub mod error;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod parser;

pub use error::ParseError;
pub use layout::{
    ChangeMark, ComponentAnchor, ComputedLayout, DesignError, DesignerConfig, Inclusion,
    LayoutDesigner, NewComponent, PositionDef, PositionKind, Preview,
};
pub use metrics::{MetricsError, MetricsProvider, TableMetrics};
pub use model::persist::LoadError;
pub use model::{
    Alignment, Axis, Bounds, LayoutModel, Length, PaddingKind, Placement, Point, ResizeEdge,
    SizeDef,
};

use thiserror::Error;

/// Errors reading a form file
#[derive(Debug, Error)]
pub enum FormError {
    /// Error during parsing
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// The file parsed but does not describe a valid model
    #[error("load error: {0}")]
    Load(#[from] LoadError),
}

impl From<Vec<ParseError>> for FormError {
    fn from(errors: Vec<ParseError>) -> Self {
        FormError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            FormError::Parse(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            FormError::Load(err) => err.format(source, filename),
        }
    }
}

/// Read a model from form file source
///
/// # Example
///
/// ```rust
/// let model = layout_designer::load_form(r#"
///     container Form [width: 200, height: 100] {
///         horizontal parallel { component jLabel1 }
///         vertical parallel { component jLabel1 }
///     }
/// "#).unwrap();
///
/// assert_eq!(model.form_size("Form"), Some((200, 100)));
/// assert!(model.contains("jLabel1"));
/// ```
pub fn load_form(source: &str) -> Result<LayoutModel, FormError> {
    let form = parser::parse(source)?;
    Ok(model::persist::load(&form)?)
}

/// Write a model as form file source
pub fn save_form(model: &LayoutModel) -> String {
    model::persist::save(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_form_parse_error() {
        let err = load_form("container Form {").unwrap_err();
        assert!(matches!(err, FormError::Parse(_)));
        assert!(err.format("container Form {", "form.lay").contains("form.lay"));
    }

    #[test]
    fn test_load_form_load_error() {
        let source = "container Form { horizontal sequential {} vertical parallel {} }";
        let err = load_form(source).unwrap_err();
        assert!(matches!(err, FormError::Load(LoadError::RootNotParallel { .. })));
        assert!(err.to_string().contains("parallel group"));
    }

    #[test]
    fn test_empty_form_round_trip() {
        let model = load_form("container Form { horizontal parallel {} vertical parallel {} }")
            .unwrap();
        assert_eq!(
            save_form(&model),
            "container Form {\n    horizontal parallel {}\n    vertical parallel {}\n}\n"
        );
    }
}
