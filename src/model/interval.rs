//! Layout intervals: the nodes of the per-axis layout trees

use slotmap::new_key_type;

use super::types::{Alignment, PaddingKind, SizeDef};

new_key_type! {
    /// Stable handle of an interval inside a [`LayoutModel`](super::LayoutModel)
    pub struct IntervalId;
}

/// What an interval is
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalKind {
    /// The extent of one component along the tree's axis
    Component(String),
    /// Spacing; the padding kind selects the default size
    Gap(PaddingKind),
    /// Children laid out end to end
    Sequential(Vec<IntervalId>),
    /// Children overlaid and aligned at a common anchor
    Parallel {
        group_alignment: Alignment,
        children: Vec<IntervalId>,
    },
}

/// A node of a layout tree
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub kind: IntervalKind,
    pub parent: Option<IntervalId>,
    /// Own alignment inside a parallel parent; `None` follows the group
    pub alignment: Option<Alignment>,
    pub size: SizeDef,
}

impl Interval {
    pub fn component(id: impl Into<String>) -> Self {
        Self::new(IntervalKind::Component(id.into()))
    }

    pub fn gap(kind: PaddingKind, size: SizeDef) -> Self {
        Self {
            size,
            ..Self::new(IntervalKind::Gap(kind))
        }
    }

    pub fn sequential() -> Self {
        Self::new(IntervalKind::Sequential(Vec::new()))
    }

    pub fn parallel(group_alignment: Alignment) -> Self {
        Self::new(IntervalKind::Parallel {
            group_alignment,
            children: Vec::new(),
        })
    }

    fn new(kind: IntervalKind) -> Self {
        Self {
            kind,
            parent: None,
            alignment: None,
            size: SizeDef::DEFAULT,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, IntervalKind::Component(_))
    }

    pub fn is_gap(&self) -> bool {
        matches!(self.kind, IntervalKind::Gap(_))
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self.kind, IntervalKind::Sequential(_))
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.kind, IntervalKind::Parallel { .. })
    }

    pub fn is_group(&self) -> bool {
        self.is_sequential() || self.is_parallel()
    }

    pub fn component_id(&self) -> Option<&str> {
        match &self.kind {
            IntervalKind::Component(id) => Some(id),
            _ => None,
        }
    }

    pub fn padding_kind(&self) -> Option<PaddingKind> {
        match self.kind {
            IntervalKind::Gap(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn group_alignment(&self) -> Option<Alignment> {
        match self.kind {
            IntervalKind::Parallel {
                group_alignment, ..
            } => Some(group_alignment),
            _ => None,
        }
    }

    pub fn children(&self) -> &[IntervalId] {
        match &self.kind {
            IntervalKind::Sequential(children) | IntervalKind::Parallel { children, .. } => {
                children
            }
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<IntervalId>> {
        match &mut self.kind {
            IntervalKind::Sequential(children) | IntervalKind::Parallel { children, .. } => {
                Some(children)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let gap = Interval::gap(PaddingKind::Unrelated, SizeDef::fixed(4));
        assert!(gap.is_gap());
        assert_eq!(gap.padding_kind(), Some(PaddingKind::Unrelated));
        assert!(gap.children().is_empty());

        let group = Interval::parallel(Alignment::Baseline);
        assert!(group.is_group());
        assert_eq!(group.group_alignment(), Some(Alignment::Baseline));
        assert_eq!(Interval::component("a").component_id(), Some("a"));
    }
}
