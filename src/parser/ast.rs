//! Abstract Syntax Tree types for the form file format

use crate::model::Axis;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Component or container name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root AST node - a complete form file
#[derive(Debug, Clone, PartialEq)]
pub struct FormFile {
    pub containers: Vec<Spanned<ContainerDecl>>,
}

/// `container <name> [attrs] { <axis layouts> }`
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDecl {
    pub name: Spanned<Identifier>,
    pub attributes: Vec<Spanned<Attribute>>,
    pub layouts: Vec<Spanned<AxisLayout>>,
}

/// `horizontal <node>` or `vertical <node>`
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub axis: Axis,
    pub root: Spanned<Node>,
}

/// One interval of a layout tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Sequential {
        attributes: Vec<Spanned<Attribute>>,
        children: Vec<Spanned<Node>>,
    },
    Parallel {
        attributes: Vec<Spanned<Attribute>>,
        children: Vec<Spanned<Node>>,
    },
    Component {
        name: Spanned<Identifier>,
        attributes: Vec<Spanned<Attribute>>,
    },
    Gap {
        attributes: Vec<Spanned<Attribute>>,
    },
}

impl Node {
    pub fn attributes(&self) -> &[Spanned<Attribute>] {
        match self {
            Node::Sequential { attributes, .. }
            | Node::Parallel { attributes, .. }
            | Node::Component { attributes, .. }
            | Node::Gap { attributes } => attributes,
        }
    }

    /// Keyword introducing the node
    pub fn keyword(&self) -> &'static str {
        match self {
            Node::Sequential { .. } => "sequential",
            Node::Parallel { .. } => "parallel",
            Node::Component { .. } => "component",
            Node::Gap { .. } => "gap",
        }
    }
}

/// `key: value`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: Spanned<Identifier>,
    pub value: Spanned<Value>,
}

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i32),
    Word(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Word(w) => write!(f, "{w}"),
        }
    }
}
