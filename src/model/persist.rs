//! Loading and saving models in the form file format
//!
//! ```text
//! container Form [width: 400, height: 300] {
//!     horizontal parallel {
//!         sequential {
//!             gap [pref: 10]
//!             component jLabel1
//!             gap [max: unbounded]
//!         }
//!     }
//!     vertical parallel { ... }
//! }
//! ```
//!
//! Containers referenced as a `component` of another container are nested
//! in it; all others are top-level forms.

use std::fmt::Write as _;

use thiserror::Error;

use crate::error::render_report;
use crate::layout::find_similar;
use crate::parser::ast::{Attribute, ContainerDecl, FormFile, Node, Span, Spanned, Value};
use crate::parser::lexer::is_bare_name;

use super::{
    Alignment, Axis, Interval, IntervalId, IntervalKind, LayoutModel, Length, PaddingKind,
    SizeDef,
};

const SIZE_KEYS: [&str; 3] = ["min", "pref", "max"];

/// Errors building a model from a parsed form file
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("unknown attribute '{name}' on {on}")]
    UnknownAttribute {
        name: String,
        on: &'static str,
        span: Span,
        suggestions: Vec<String>,
    },

    #[error("invalid value '{value}' for '{name}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
        span: Span,
    },

    #[error("attribute '{name}' given twice")]
    DuplicateAttribute { name: String, span: Span },

    #[error("container '{id}' is declared twice")]
    DuplicateContainer { id: String, span: Span },

    #[error("{axis} layout of '{id}' is declared twice")]
    DuplicateAxis { id: String, axis: Axis, span: Span },

    #[error("component '{id}' is placed twice")]
    DuplicateComponent { id: String, span: Span },

    #[error("container '{id}' has no {axis} layout")]
    MissingAxis { id: String, axis: Axis, span: Span },

    #[error("component '{id}' is missing from the {axis} layout of '{container}'")]
    MissingFromAxis {
        id: String,
        container: String,
        axis: Axis,
        span: Span,
    },

    #[error("the {axis} layout of '{id}' must be a parallel group")]
    RootNotParallel { id: String, axis: Axis, span: Span },

    #[error("container '{id}' is nested in itself")]
    Cycle { id: String, span: Span },
}

impl LoadError {
    pub fn span(&self) -> &Span {
        match self {
            LoadError::UnknownAttribute { span, .. }
            | LoadError::InvalidValue { span, .. }
            | LoadError::DuplicateAttribute { span, .. }
            | LoadError::DuplicateContainer { span, .. }
            | LoadError::DuplicateAxis { span, .. }
            | LoadError::DuplicateComponent { span, .. }
            | LoadError::MissingAxis { span, .. }
            | LoadError::MissingFromAxis { span, .. }
            | LoadError::RootNotParallel { span, .. }
            | LoadError::Cycle { span, .. } => span,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            LoadError::UnknownAttribute { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let message = self.to_string();
        let label = match self.suggestions() {
            Some(s) if !s.is_empty() => format!("{message}\nDid you mean: {}", s.join(", ")),
            _ => message.clone(),
        };
        render_report(source, filename, self.span(), &message, &label)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Build a model from a parsed form file
pub fn load(form: &FormFile) -> Result<LayoutModel, LoadError> {
    let mut model = LayoutModel::new();
    for decl in &form.containers {
        let name = decl.node.name.node.as_str();
        if !model.add_component(name, true) {
            return Err(LoadError::DuplicateContainer {
                id: name.to_string(),
                span: decl.node.name.span.clone(),
            });
        }
    }

    for decl in &form.containers {
        load_container(&mut model, &decl.node, &decl.span)?;
    }

    check_components(&model, form)?;
    check_cycles(&model, form)?;
    Ok(model)
}

fn load_container(model: &mut LayoutModel, decl: &ContainerDecl, span: &Span) -> Result<(), LoadError> {
    let id = decl.name.node.as_str();

    check_keys(&decl.attributes, &["width", "height"], "container")?;
    let mut size = [None, None];
    for attr in &decl.attributes {
        let index = usize::from(attr.node.key.node.as_str() == "height");
        size[index] = Some(number(&attr.node, 0)?);
    }
    match (size, decl.attributes.first()) {
        ([Some(w), Some(h)], _) => model.set_form_size(id, Some((w, h))),
        (_, Some(given)) => return Err(invalid(&given.node, "width and height must be given together")),
        _ => {}
    }

    let mut seen = [false; 2];
    for layout in &decl.layouts {
        let axis = layout.node.axis;
        if std::mem::replace(&mut seen[axis.index()], true) {
            return Err(LoadError::DuplicateAxis {
                id: id.to_string(),
                axis,
                span: layout.span.clone(),
            });
        }
        let Some(root) = model.root(id, axis) else {
            continue;
        };
        let Node::Parallel {
            attributes,
            children,
        } = &layout.node.root.node
        else {
            return Err(LoadError::RootNotParallel {
                id: id.to_string(),
                axis,
                span: layout.node.root.span.clone(),
            });
        };
        apply_group_attributes(model, root, attributes, true)?;
        let mut loader = TreeLoader { model: &mut *model, container: id, axis };
        for child in children {
            let interval = loader.node(child)?;
            loader.model.add_child(root, interval, None);
        }
    }

    if seen[0] != seen[1] {
        let axis = if seen[0] { Axis::Vertical } else { Axis::Horizontal };
        return Err(LoadError::MissingAxis {
            id: id.to_string(),
            axis,
            span: span.clone(),
        });
    }
    Ok(())
}

struct TreeLoader<'a> {
    model: &'a mut LayoutModel,
    container: &'a str,
    axis: Axis,
}

impl TreeLoader<'_> {
    fn node(&mut self, node: &Spanned<Node>) -> Result<IntervalId, LoadError> {
        match &node.node {
            Node::Sequential {
                attributes,
                children,
            } => {
                let seq = self.model.insert_interval(Interval::sequential());
                apply_group_attributes(self.model, seq, attributes, false)?;
                for child in children {
                    let interval = self.node(child)?;
                    self.model.add_child(seq, interval, None);
                }
                Ok(seq)
            }
            Node::Parallel {
                attributes,
                children,
            } => {
                let group = self
                    .model
                    .insert_interval(Interval::parallel(Alignment::Leading));
                apply_group_attributes(self.model, group, attributes, true)?;
                for child in children {
                    let interval = self.node(child)?;
                    self.model.add_child(group, interval, None);
                }
                Ok(group)
            }
            Node::Component { name, attributes } => {
                let id = name.node.as_str();
                self.model.add_component(id, false);
                let placed_elsewhere = self
                    .model
                    .component(id)
                    .and_then(|c| c.parent.as_deref())
                    .is_some_and(|p| p != self.container);
                let interval = self
                    .model
                    .component_interval(id, self.axis)
                    .ok_or_else(|| LoadError::DuplicateComponent {
                        id: id.to_string(),
                        span: name.span.clone(),
                    })?;
                if placed_elsewhere || self.model.parent(interval).is_some() {
                    return Err(LoadError::DuplicateComponent {
                        id: id.to_string(),
                        span: name.span.clone(),
                    });
                }
                self.model.set_parent(id, Some(self.container));
                check_keys(attributes, &["align", "min", "pref", "max"], "component")?;
                apply_common(self.model, interval, attributes)?;
                Ok(interval)
            }
            Node::Gap { attributes } => {
                let gap = self
                    .model
                    .insert_interval(Interval::gap(PaddingKind::Related, SizeDef::DEFAULT));
                check_keys(attributes, &["padding", "min", "pref", "max"], "gap")?;
                for attr in attributes {
                    if attr.node.key.node.as_str() == "padding" {
                        let kind = keyword(&attr.node, PaddingKind::from_keyword, PaddingKind::KEYWORDS)?;
                        self.model.interval_mut(gap).kind = IntervalKind::Gap(kind);
                    }
                }
                apply_common(self.model, gap, attributes)?;
                Ok(gap)
            }
        }
    }
}

fn apply_group_attributes(
    model: &mut LayoutModel,
    group: IntervalId,
    attributes: &[Spanned<Attribute>],
    parallel: bool,
) -> Result<(), LoadError> {
    if parallel {
        check_keys(attributes, &["align", "group_align", "min", "pref", "max"], "parallel")?;
        for attr in attributes {
            if attr.node.key.node.as_str() == "group_align" {
                let alignment = keyword(&attr.node, Alignment::from_keyword, Alignment::KEYWORDS)?;
                if let IntervalKind::Parallel {
                    group_alignment, ..
                } = &mut model.interval_mut(group).kind
                {
                    *group_alignment = alignment;
                }
            }
        }
    } else {
        check_keys(attributes, &["align", "min", "pref", "max"], "sequential")?;
    }
    apply_common(model, group, attributes)
}

/// `align`, `min`, `pref` and `max`
fn apply_common(
    model: &mut LayoutModel,
    interval: IntervalId,
    attributes: &[Spanned<Attribute>],
) -> Result<(), LoadError> {
    for attr in attributes {
        let attr = &attr.node;
        let key = attr.key.node.as_str();
        match key {
            "align" => {
                let alignment = keyword(attr, Alignment::from_keyword, Alignment::KEYWORDS)?;
                model.interval_mut(interval).alignment = Some(alignment);
            }
            "min" | "pref" | "max" => {
                let length = length(attr)?;
                let size = &mut model.interval_mut(interval).size;
                match key {
                    "min" => size.min = length,
                    "pref" => size.pref = length,
                    _ => size.max = length,
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Reject unknown and repeated attribute names
fn check_keys(
    attributes: &[Spanned<Attribute>],
    allowed: &[&str],
    on: &'static str,
) -> Result<(), LoadError> {
    for (i, attr) in attributes.iter().enumerate() {
        let name = attr.node.key.node.as_str();
        if !allowed.contains(&name) {
            return Err(LoadError::UnknownAttribute {
                name: name.to_string(),
                on,
                span: attr.node.key.span.clone(),
                suggestions: find_similar(allowed.iter().copied(), name, 2),
            });
        }
        if attributes[..i]
            .iter()
            .any(|a| a.node.key.node.as_str() == name)
        {
            return Err(LoadError::DuplicateAttribute {
                name: name.to_string(),
                span: attr.node.key.span.clone(),
            });
        }
    }
    Ok(())
}

fn invalid(attr: &Attribute, reason: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        name: attr.key.node.to_string(),
        value: attr.value.node.to_string(),
        reason: reason.into(),
        span: attr.value.span.clone(),
    }
}

fn number(attr: &Attribute, min: i32) -> Result<i32, LoadError> {
    match attr.value.node {
        Value::Number(n) if n >= min => Ok(n),
        Value::Number(_) => Err(invalid(attr, format!("must be at least {min}"))),
        Value::Word(_) => Err(invalid(attr, "expected a number")),
    }
}

fn keyword<T>(attr: &Attribute, parse: fn(&str) -> Option<T>, known: &[&str]) -> Result<T, LoadError> {
    match &attr.value.node {
        Value::Word(w) => parse(w).ok_or_else(|| invalid(attr, format!("expected one of {}", known.join(", ")))),
        Value::Number(_) => Err(invalid(attr, format!("expected one of {}", known.join(", ")))),
    }
}

fn length(attr: &Attribute) -> Result<Length, LoadError> {
    let is_max = attr.key.node.as_str() == "max";
    match &attr.value.node {
        Value::Number(_) => Ok(Length::Px(number(attr, 0)?)),
        Value::Word(w) => match w.as_str() {
            "default" => Ok(Length::Default),
            "preferred" if attr.key.node.as_str() != "pref" => Ok(Length::Preferred),
            "unbounded" if is_max => Ok(Length::Unbounded),
            _ => Err(invalid(
                attr,
                match attr.key.node.as_str() {
                    "max" => "expected a number, default, preferred or unbounded",
                    "pref" => "expected a number or default",
                    _ => "expected a number, default or preferred",
                },
            )),
        },
    }
}

/// Every placed component must appear in both layouts of its container
fn check_components(model: &LayoutModel, form: &FormFile) -> Result<(), LoadError> {
    for comp in model.components() {
        let Some(container) = comp.parent.as_deref() else {
            continue;
        };
        for axis in Axis::ALL {
            if model.parent(comp.interval(axis)).is_none() {
                return Err(LoadError::MissingFromAxis {
                    id: comp.id.clone(),
                    container: container.to_string(),
                    axis,
                    span: container_span(form, container),
                });
            }
        }
    }
    Ok(())
}

fn check_cycles(model: &LayoutModel, form: &FormFile) -> Result<(), LoadError> {
    let limit = model.components().count();
    for id in model.container_ids() {
        let mut current = model.component(id).and_then(|c| c.parent.as_deref());
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == id || steps > limit {
                return Err(LoadError::Cycle {
                    id: id.to_string(),
                    span: container_span(form, id),
                });
            }
            current = model.component(parent).and_then(|c| c.parent.as_deref());
            steps += 1;
        }
    }
    Ok(())
}

fn container_span(form: &FormFile, id: &str) -> Span {
    form.containers
        .iter()
        .find(|c| c.node.name.node.as_str() == id)
        .map(|c| c.node.name.span.clone())
        .unwrap_or(0..0)
}

// ============================================================================
// Saving
// ============================================================================

/// Write a model in the form file format
pub fn save(model: &LayoutModel) -> String {
    let mut out = String::new();
    for (i, id) in model.container_ids().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("container ");
        out.push_str(&name(id));
        if let Some((w, h)) = model.form_size(id) {
            let _ = write!(out, " [width: {w}, height: {h}]");
        }
        out.push_str(" {\n");
        for axis in Axis::ALL {
            if let Some(root) = model.root(id, axis) {
                let _ = write!(out, "    {} ", axis.keyword());
                write_interval(model, root, 1, &mut out);
            }
        }
        out.push_str("}\n");
    }
    out
}

fn name(id: &str) -> String {
    if is_bare_name(id) {
        id.to_string()
    } else {
        format!("\"{id}\"")
    }
}

/// Write one interval; the caller has written the indentation
fn write_interval(model: &LayoutModel, id: IntervalId, depth: usize, out: &mut String) {
    let interval = model.interval(id);
    let mut attrs: Vec<String> = Vec::new();
    if let Some(alignment) = interval.alignment {
        attrs.push(format!("align: {}", alignment.keyword()));
    }
    match interval.padding_kind() {
        Some(kind) if kind != PaddingKind::Related => {
            attrs.push(format!("padding: {}", kind.keyword()))
        }
        _ => {}
    }
    match interval.group_alignment() {
        Some(alignment) if alignment != Alignment::Leading => {
            attrs.push(format!("group_align: {}", alignment.keyword()))
        }
        _ => {}
    }
    let size = interval.size;
    for (key, length) in SIZE_KEYS.iter().zip([size.min, size.pref, size.max]) {
        if length != Length::Default {
            attrs.push(format!("{key}: {}", length.keyword()));
        }
    }
    let attrs = if attrs.is_empty() {
        String::new()
    } else {
        format!(" [{}]", attrs.join(", "))
    };

    let keyword = match interval.component_id() {
        Some(comp) => {
            let _ = writeln!(out, "component {}{attrs}", name(comp));
            return;
        }
        None if interval.is_gap() => {
            let _ = writeln!(out, "gap{attrs}");
            return;
        }
        None if interval.is_sequential() => "sequential",
        None => "parallel",
    };
    let children = interval.children();
    if children.is_empty() {
        let _ = writeln!(out, "{keyword}{attrs} {{}}");
        return;
    }
    let _ = writeln!(out, "{keyword}{attrs} {{");
    for &child in children {
        out.push_str(&"    ".repeat(depth + 1));
        write_interval(model, child, depth + 1, out);
    }
    let _ = writeln!(out, "{}}}", "    ".repeat(depth));
}
