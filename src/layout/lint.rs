//! Lint checks for layout trees.
//!
//! Detects structural defects a commit should never leave behind: groups
//! that should have been collapsed, adjacent gaps, negative sizes, broken
//! parent links, overlapping sequence members and baseline groups holding
//! components without a baseline.

use std::fmt;

use crate::metrics::MetricsProvider;
use crate::model::{Alignment, Axis, IntervalId, LayoutModel, Length};

use super::bounds::ComputedLayout;

/// A lint warning about a structural defect
#[derive(Debug)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Overlap,
    SingleChild,
    EmptyGroup,
    ConsecutiveGaps,
    NegativeSize,
    Baseline,
    Parent,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Overlap => write!(f, "overlap"),
            LintCategory::SingleChild => write!(f, "single-child"),
            LintCategory::EmptyGroup => write!(f, "empty-group"),
            LintCategory::ConsecutiveGaps => write!(f, "consecutive-gaps"),
            LintCategory::NegativeSize => write!(f, "negative-size"),
            LintCategory::Baseline => write!(f, "baseline"),
            LintCategory::Parent => write!(f, "parent"),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Run the structural checks on every layout tree of the model.
pub fn check(model: &LayoutModel) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    for_each_root(model, |container, axis, root| {
        check_tree(model, container, axis, root, &mut warnings);
    });
    warnings
}

/// Check that sequence members do not overlap in a computed layout.
pub fn check_layout(model: &LayoutModel, layout: &ComputedLayout) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    for_each_root(model, |container, axis, root| {
        for id in model.descendants(root) {
            if !model.interval(id).is_sequential() {
                continue;
            }
            let mut previous_end: Option<i32> = None;
            for &child in model.children(id) {
                let Some(extent) = layout.extent(child, axis) else {
                    continue;
                };
                if let Some(end) = previous_end {
                    if extent.start < end {
                        warnings.push(LintWarning {
                            category: LintCategory::Overlap,
                            message: format!(
                                "{container} ({axis}): sequence member at {} starts before previous one ends at {end}",
                                extent.start
                            ),
                        });
                    }
                }
                previous_end = Some(extent.end);
            }
        }
    });
    warnings
}

/// Check that every baseline-aligned member of a vertical baseline group has
/// a baseline.
pub fn check_baselines(model: &LayoutModel, metrics: &dyn MetricsProvider) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    for_each_root(model, |container, axis, root| {
        if axis != Axis::Vertical {
            return;
        }
        for id in model.descendants(root) {
            let interval = model.interval(id);
            if interval.group_alignment() != Some(Alignment::Baseline) {
                continue;
            }
            for &child in interval.children() {
                if model.effective_alignment(child) != Alignment::Baseline {
                    continue;
                }
                let Some(comp) = model.interval(child).component_id() else {
                    continue;
                };
                let size = metrics.preferred_size(comp).unwrap_or((0, 0));
                if metrics.baseline(comp, size.0, size.1).is_none() {
                    warnings.push(LintWarning {
                        category: LintCategory::Baseline,
                        message: format!(
                            "{container}: \"{comp}\" is baseline aligned but has no baseline"
                        ),
                    });
                }
            }
        }
    });
    warnings
}

fn for_each_root(model: &LayoutModel, mut f: impl FnMut(&str, Axis, IntervalId)) {
    for container in model.container_ids() {
        for axis in Axis::ALL {
            if let Some(root) = model.root(container, axis) {
                f(container, axis, root);
            }
        }
    }
}

fn check_tree(
    model: &LayoutModel,
    container: &str,
    axis: Axis,
    root: IntervalId,
    warnings: &mut Vec<LintWarning>,
) {
    let mut push = |category, message: String| {
        warnings.push(LintWarning {
            category,
            message: format!("{container} ({axis}): {message}"),
        })
    };
    for id in model.descendants(root) {
        let interval = model.interval(id);
        for &child in interval.children() {
            if model.parent(child) != Some(id) {
                push(LintCategory::Parent, "child does not point back to its group".into());
            }
        }
        if let Length::Px(v) = interval.size.pref {
            if v < 0 {
                push(LintCategory::NegativeSize, format!("preferred size {v}"));
            }
        }
        if !interval.is_group() || id == root {
            continue;
        }
        let children = interval.children();
        if children.iter().all(|&c| model.interval(c).is_gap()) {
            push(LintCategory::EmptyGroup, "group without content".into());
        } else if children.len() == 1 {
            push(LintCategory::SingleChild, "group with a single child".into());
        }
        if interval.is_sequential()
            && children
                .windows(2)
                .any(|w| model.interval(w[0]).is_gap() && model.interval(w[1]).is_gap())
        {
            push(LintCategory::ConsecutiveGaps, "adjacent gaps in sequence".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, PaddingKind, SizeDef};

    fn form() -> LayoutModel {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.add_component("a", false);
        model.set_parent("a", Some("Form"));
        model
    }

    #[test]
    fn test_clean_tree() {
        let mut model = form();
        for axis in Axis::ALL {
            let root = model.root("Form", axis).unwrap();
            let comp = model.component_interval("a", axis).unwrap();
            model.add_child(root, comp, None);
        }
        assert!(check(&model).is_empty());
    }

    #[test]
    fn test_single_child_and_gaps() {
        let mut model = form();
        let root = model.root("Form", Axis::Horizontal).unwrap();
        let seq = model.insert_interval(Interval::sequential());
        model.add_child(root, seq, None);
        let comp = model.component_interval("a", Axis::Horizontal).unwrap();
        let g1 = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::fixed(4)));
        let g2 = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::fixed(-2)));
        model.add_child(seq, g1, None);
        model.add_child(seq, g2, None);
        model.add_child(seq, comp, None);

        let categories: Vec<LintCategory> = check(&model).iter().map(|w| w.category).collect();
        assert!(categories.contains(&LintCategory::ConsecutiveGaps));
        assert!(categories.contains(&LintCategory::NegativeSize));
        assert!(!categories.contains(&LintCategory::SingleChild));
    }

    #[test]
    fn test_empty_group() {
        let mut model = form();
        let root = model.root("Form", Axis::Vertical).unwrap();
        let group = model.insert_interval(Interval::parallel(Alignment::Leading));
        model.add_child(root, group, None);
        let warnings = check(&model);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, LintCategory::EmptyGroup);
        assert!(warnings[0].to_string().starts_with("[empty-group] Form (vertical)"));
    }
}
