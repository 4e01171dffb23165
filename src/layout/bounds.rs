//! Bounds calculator
//!
//! Resolves the interval trees to concrete pixel bounds. Each axis is
//! handled on its own: sizes are computed bottom-up (sequential groups sum
//! their children, parallel groups take the maximum), then positions are
//! assigned top-down from the container origin. Extra or missing space in a
//! sequence goes to the resizable children only, smallest range first.
//!
//! The horizontal axis is resolved before the vertical one so that baselines
//! can be evaluated at the final component widths.

use std::collections::HashMap;

use indexmap::IndexMap;
use slotmap::SecondaryMap;
use tracing::trace;

use crate::metrics::MetricsProvider;
use crate::model::{
    Alignment, Axis, Bounds, Extent, IntervalId, IntervalKind, LayoutModel, Length, PaddingKind,
    Placement,
};

use super::config::DesignerConfig;

/// Minimum, preferred and maximum size of an interval along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sizes {
    pub min: i32,
    pub pref: i32,
    pub max: i32,
}

impl Sizes {
    /// Build sizes with `min <= pref <= max` enforced
    pub fn ordered(min: i32, pref: i32, max: i32) -> Self {
        let min = min.max(0);
        let pref = pref.max(min);
        let max = max.max(pref);
        Self { min, pref, max }
    }

    pub fn is_resizable(&self) -> bool {
        self.max > self.pref
    }
}

/// Result of a bounds computation
#[derive(Debug, Clone, Default)]
pub struct ComputedLayout {
    bounds: IndexMap<String, Bounds>,
    extents: [SecondaryMap<IntervalId, Extent>; 2],
}

impl ComputedLayout {
    /// Bounds of a positioned component
    pub fn bounds(&self, id: &str) -> Option<Bounds> {
        self.bounds.get(id).copied()
    }

    pub fn placement(&self, id: &str) -> Placement {
        match self.bounds(id) {
            Some(b) => Placement::Positioned(b),
            None => Placement::Unpositioned,
        }
    }

    /// Resolved extent of any interval of a laid-out tree
    pub fn extent(&self, interval: IntervalId, axis: Axis) -> Option<Extent> {
        self.extents[axis.index()].get(interval).copied()
    }

    pub(crate) fn extents(&self, axis: Axis) -> &SecondaryMap<IntervalId, Extent> {
        &self.extents[axis.index()]
    }

    /// All positioned components in model order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bounds)> {
        self.bounds.iter().map(|(id, b)| (id.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

/// Compute bounds of every positioned component.
///
/// Top-level containers sit at the origin with their design size, or their
/// preferred size when none was set.
pub fn compute(
    model: &LayoutModel,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
) -> ComputedLayout {
    let mut out = ComputedLayout::default();
    let forms: Vec<String> = model.top_level_containers().map(str::to_string).collect();
    for form in forms {
        let (width, height) = match model.form_size(&form) {
            Some(size) => size,
            None => (
                Sizer::new(model, metrics, config, Axis::Horizontal).intrinsic(&form).1,
                Sizer::new(model, metrics, config, Axis::Vertical).intrinsic(&form).1,
            ),
        };
        layout_container(
            model,
            metrics,
            config,
            &form,
            Bounds::new(0, 0, width, height),
            &mut out,
        );
    }
    out
}

fn layout_container(
    model: &LayoutModel,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    id: &str,
    bounds: Bounds,
    out: &mut ComputedLayout,
) {
    trace!(container = id, ?bounds, "laying out container");
    out.bounds.insert(id.to_string(), bounds);
    let Some(roots) = model.component(id).and_then(|c| c.layout_roots) else {
        return;
    };

    let mut horizontal = SecondaryMap::new();
    Sizer::new(model, metrics, config, Axis::Horizontal).layout(
        roots[0],
        bounds.x,
        bounds.width,
        &mut horizontal,
    );
    let mut vertical = SecondaryMap::new();
    Sizer::new(model, metrics, config, Axis::Vertical)
        .with_widths(&horizontal)
        .layout(roots[1], bounds.y, bounds.height, &mut vertical);

    for (key, extent) in horizontal {
        out.extents[0].insert(key, extent);
    }
    for (key, extent) in vertical {
        out.extents[1].insert(key, extent);
    }

    let subs: Vec<String> = model.sub_components(id).map(str::to_string).collect();
    for sub in subs {
        let Some(comp) = model.component(&sub) else {
            continue;
        };
        let (Some(h), Some(v)) = (
            out.extents[0].get(comp.intervals[0]).copied(),
            out.extents[1].get(comp.intervals[1]).copied(),
        ) else {
            continue;
        };
        let sub_bounds = Bounds::new(h.start, v.start, h.size(), v.size());
        if comp.is_container() {
            layout_container(model, metrics, config, &sub, sub_bounds, out);
        } else {
            out.bounds.insert(sub, sub_bounds);
        }
    }
}

/// Padding between two components, falling back to the configured default
pub(crate) fn padding(
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    first: &str,
    second: &str,
    axis: Axis,
    second_alignment: Alignment,
    kind: PaddingKind,
) -> i32 {
    metrics
        .padding(first, second, axis, second_alignment, kind)
        .unwrap_or_else(|| config.paddings.for_kind(kind))
}

/// Padding between a component and its container border
pub(crate) fn parent_padding(
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    parent: &str,
    id: &str,
    axis: Axis,
    alignment: Alignment,
) -> i32 {
    metrics
        .padding_in_parent(parent, id, axis, alignment)
        .unwrap_or(config.paddings.container)
}

/// Components lying at the `edge` of an interval
pub(crate) fn edge_components(model: &LayoutModel, id: IntervalId, edge: Alignment) -> Vec<String> {
    match &model.interval(id).kind {
        IntervalKind::Component(comp) => vec![comp.clone()],
        IntervalKind::Gap(_) => Vec::new(),
        IntervalKind::Sequential(children) => {
            let child = match edge {
                Alignment::Trailing => children.last(),
                _ => children.first(),
            };
            child
                .map(|&c| edge_components(model, c, edge))
                .unwrap_or_default()
        }
        IntervalKind::Parallel { children, .. } => children
            .iter()
            .flat_map(|&c| edge_components(model, c, edge))
            .collect(),
    }
}

/// What a gap touches on one side
enum Neighbor {
    Components(Vec<String>),
    Border(String),
    Nothing,
}

/// Size resolution for one axis of a model
pub(crate) struct Sizer<'a> {
    model: &'a LayoutModel,
    metrics: &'a dyn MetricsProvider,
    config: &'a DesignerConfig,
    axis: Axis,
    memo: HashMap<IntervalId, Sizes>,
    widths: Option<&'a SecondaryMap<IntervalId, Extent>>,
}

impl<'a> Sizer<'a> {
    pub(crate) fn new(
        model: &'a LayoutModel,
        metrics: &'a dyn MetricsProvider,
        config: &'a DesignerConfig,
        axis: Axis,
    ) -> Self {
        Self {
            model,
            metrics,
            config,
            axis,
            memo: HashMap::new(),
            widths: None,
        }
    }

    fn with_widths(mut self, widths: &'a SecondaryMap<IntervalId, Extent>) -> Self {
        self.widths = Some(widths);
        self
    }

    fn pick(&self, size: (i32, i32)) -> i32 {
        match self.axis {
            Axis::Horizontal => size.0,
            Axis::Vertical => size.1,
        }
    }

    /// Intrinsic (minimum, preferred) size of a component along the axis.
    /// Containers without a locked preferred size follow their own layout.
    pub(crate) fn intrinsic(&mut self, id: &str) -> (i32, i32) {
        let root = self.model.root(id, self.axis);
        if let Some(root) = root {
            if !self.metrics.has_explicit_pref_size(id) && !self.model.children(root).is_empty() {
                let sizes = self.sizes(root);
                return (sizes.min, sizes.pref);
            }
        }
        let pref = self
            .metrics
            .preferred_size(id)
            .map(|s| self.pick(s))
            .unwrap_or(0);
        let min = self
            .metrics
            .minimum_size(id)
            .map(|s| self.pick(s))
            .unwrap_or(pref)
            .min(pref);
        (min, pref)
    }

    /// Sizes of an interval, memoized
    pub(crate) fn sizes(&mut self, id: IntervalId) -> Sizes {
        if let Some(sizes) = self.memo.get(&id) {
            return *sizes;
        }
        let sizes = self.compute_sizes(id);
        self.memo.insert(id, sizes);
        sizes
    }

    fn compute_sizes(&mut self, id: IntervalId) -> Sizes {
        let model = self.model;
        let interval = model.interval(id);
        let def = interval.size;
        let max_size = self.config.max_size;
        match &interval.kind {
            IntervalKind::Component(comp) => {
                let (imin, ipref) = self.intrinsic(comp);
                let pref = match def.pref {
                    Length::Px(v) => v,
                    _ => ipref,
                };
                let min = match def.min {
                    Length::Px(v) => v,
                    Length::Preferred => pref,
                    _ => imin.min(pref),
                };
                let max = match def.max {
                    Length::Px(v) => v,
                    Length::Unbounded => max_size,
                    _ => pref,
                };
                Sizes::ordered(min, pref, max)
            }
            IntervalKind::Gap(_) => {
                let pref = match def.pref {
                    Length::Px(v) => v,
                    _ => self.default_gap(id),
                };
                let min = match def.min {
                    Length::Px(v) => v,
                    _ => pref,
                };
                let max = match def.max {
                    Length::Px(v) => v,
                    Length::Unbounded => max_size,
                    _ => pref,
                };
                Sizes::ordered(min, pref, max)
            }
            IntervalKind::Sequential(children) => {
                let (mut min, mut pref, mut max) = (0i64, 0i64, 0i64);
                for &child in children {
                    let s = self.sizes(child);
                    min += i64::from(s.min);
                    pref += i64::from(s.pref);
                    max += i64::from(s.max);
                }
                let clamp = |v: i64| v.min(i64::from(max_size)) as i32;
                self.apply_group_def(id, Sizes::ordered(clamp(min), clamp(pref), clamp(max)))
            }
            IntervalKind::Parallel {
                group_alignment,
                children,
            } => {
                let sizes = if self.axis == Axis::Vertical && *group_alignment == Alignment::Baseline
                {
                    self.baseline_group_sizes(children)
                } else {
                    let mut sizes = Sizes::default();
                    for &child in children {
                        let s = self.sizes(child);
                        sizes.min = sizes.min.max(s.min);
                        sizes.pref = sizes.pref.max(s.pref);
                        sizes.max = sizes.max.max(s.max);
                    }
                    sizes
                };
                self.apply_group_def(id, sizes)
            }
        }
    }

    fn apply_group_def(&self, id: IntervalId, computed: Sizes) -> Sizes {
        let def = self.model.interval(id).size;
        let pref = match def.pref {
            Length::Px(v) => v,
            _ => computed.pref,
        };
        let min = match def.min {
            Length::Px(v) => v,
            Length::Preferred => pref,
            _ => computed.min,
        };
        let max = match def.max {
            Length::Px(v) => v,
            Length::Preferred => pref,
            Length::Unbounded => self.config.max_size,
            Length::Default => computed.max,
        };
        Sizes::ordered(min, pref, max)
    }

    fn baseline_group_sizes(&mut self, children: &[IntervalId]) -> Sizes {
        let (mut ascent, mut descent) = (0, 0);
        let mut other = Sizes::default();
        for &child in children {
            let s = self.sizes(child);
            match self.child_baseline(child, s.pref) {
                Some(b) => {
                    ascent = ascent.max(b);
                    descent = descent.max(s.pref - b);
                }
                None => {
                    other.min = other.min.max(s.min);
                    other.pref = other.pref.max(s.pref);
                    other.max = other.max.max(s.max);
                }
            }
        }
        let aligned = ascent + descent;
        Sizes::ordered(
            aligned.max(other.min),
            aligned.max(other.pref),
            aligned.max(other.max),
        )
    }

    /// Baseline of a baseline-aligned child component at `height`
    fn child_baseline(&self, child: IntervalId, height: i32) -> Option<i32> {
        if self.model.effective_alignment(child) != Alignment::Baseline {
            return None;
        }
        let comp = self.model.interval(child).component_id()?;
        let width = self.component_width(comp);
        self.metrics.baseline(comp, width, height)
    }

    fn component_width(&self, comp: &str) -> i32 {
        let laid_out = self.widths.and_then(|widths| {
            let interval = self.model.component_interval(comp, Axis::Horizontal)?;
            widths.get(interval).map(Extent::size)
        });
        laid_out.unwrap_or_else(|| {
            let interval = self.model.component_interval(comp, Axis::Horizontal);
            match interval.map(|i| self.model.interval(i).size.pref) {
                Some(Length::Px(v)) => v,
                _ => self
                    .metrics
                    .preferred_size(comp)
                    .map(|s| s.0)
                    .unwrap_or(0),
            }
        })
    }

    /// Preferred size of a gap whose size is not given in pixels
    pub(crate) fn default_gap(&self, gap: IntervalId) -> i32 {
        let kind = self
            .model
            .interval(gap)
            .padding_kind()
            .unwrap_or(PaddingKind::Related);
        if kind == PaddingKind::Indent {
            if let Some(size) = self.indent_gap(gap) {
                return size;
            }
        }
        let before = self.neighbor(gap, Alignment::Leading);
        let after = self.neighbor(gap, Alignment::Trailing);
        let (metrics, config, axis) = (self.metrics, self.config, self.axis);
        match (before, after) {
            (Neighbor::Components(first), Neighbor::Components(second)) => first
                .iter()
                .flat_map(|a| {
                    second.iter().map(move |b| {
                        padding(metrics, config, a, b, axis, Alignment::Trailing, kind)
                    })
                })
                .max()
                .unwrap_or(0),
            (Neighbor::Border(parent), Neighbor::Components(comps)) => comps
                .iter()
                .map(|c| parent_padding(metrics, config, &parent, c, axis, Alignment::Leading))
                .max()
                .unwrap_or(0),
            (Neighbor::Components(comps), Neighbor::Border(parent)) => comps
                .iter()
                .map(|c| parent_padding(metrics, config, &parent, c, axis, Alignment::Trailing))
                .max()
                .unwrap_or(0),
            (Neighbor::Border(_), Neighbor::Border(_)) => config.paddings.container,
            _ => 0,
        }
    }

    /// An indent gap leading a sequence is measured from the leading edge of
    /// the sequence's parallel siblings
    fn indent_gap(&self, gap: IntervalId) -> Option<i32> {
        let model = self.model;
        let seq = model.parent(gap)?;
        if !model.interval(seq).is_sequential() || model.index_in_parent(gap) != Some(0) {
            return None;
        }
        let group = model.parent(seq)?;
        if !model.interval(group).is_parallel() {
            return None;
        }
        let indented = model
            .children(seq)
            .get(1)
            .map(|&c| edge_components(model, c, Alignment::Leading))
            .unwrap_or_default();
        let references: Vec<String> = model
            .children(group)
            .iter()
            .filter(|&&c| c != seq)
            .flat_map(|&c| edge_components(model, c, Alignment::Leading))
            .collect();
        references
            .iter()
            .flat_map(|r| {
                indented.iter().map(move |c| {
                    padding(
                        self.metrics,
                        self.config,
                        r,
                        c,
                        self.axis,
                        Alignment::Leading,
                        PaddingKind::Indent,
                    )
                })
            })
            .max()
    }

    fn neighbor(&self, gap: IntervalId, side: Alignment) -> Neighbor {
        let model = self.model;
        let mut current = gap;
        loop {
            let Some(parent) = model.parent(current) else {
                return match model.container_of_root(current) {
                    Some(container) => Neighbor::Border(container.to_string()),
                    None => Neighbor::Nothing,
                };
            };
            let group = model.interval(parent);
            if group.is_sequential() {
                let children = group.children();
                let index = children.iter().position(|&c| c == current).unwrap_or(0);
                let sibling = match side {
                    Alignment::Trailing => children.get(index + 1).copied(),
                    _ => index.checked_sub(1).map(|i| children[i]),
                };
                if let Some(sibling) = sibling {
                    if model.interval(sibling).is_gap() {
                        return Neighbor::Nothing;
                    }
                    let comps = edge_components(model, sibling, side.opposite());
                    return if comps.is_empty() {
                        Neighbor::Nothing
                    } else {
                        Neighbor::Components(comps)
                    };
                }
            }
            current = parent;
        }
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Assign `size` pixels starting at `start` to an interval and its subtree
    pub(crate) fn layout(
        &mut self,
        id: IntervalId,
        start: i32,
        size: i32,
        out: &mut SecondaryMap<IntervalId, Extent>,
    ) {
        out.insert(id, Extent::new(start, start + size));
        let model = self.model;
        match &model.interval(id).kind {
            IntervalKind::Sequential(children) => {
                let sizes: Vec<Sizes> = children.iter().map(|&c| self.sizes(c)).collect();
                let assigned = distribute(&sizes, size);
                let mut pos = start;
                for (&child, child_size) in children.iter().zip(assigned) {
                    self.layout(child, pos, child_size, out);
                    pos += child_size;
                }
            }
            IntervalKind::Parallel {
                group_alignment,
                children,
            } => {
                let by_baseline =
                    self.axis == Axis::Vertical && *group_alignment == Alignment::Baseline;
                let ascent = if by_baseline {
                    children
                        .iter()
                        .filter_map(|&c| {
                            let pref = self.sizes(c).pref;
                            self.child_baseline(c, pref)
                        })
                        .max()
                } else {
                    None
                };
                for &child in children {
                    let s = self.sizes(child);
                    if let Some(ascent) = ascent {
                        if let Some(b) = self.child_baseline(child, s.pref) {
                            self.layout(child, start + ascent - b, s.pref, out);
                            continue;
                        }
                    }
                    let child_size = size.max(s.min).min(s.max);
                    let child_start = match model.effective_alignment(child) {
                        Alignment::Trailing => start + size - child_size,
                        Alignment::Center => start + (size - child_size) / 2,
                        Alignment::Leading | Alignment::Baseline => start,
                    };
                    self.layout(child, child_start, child_size, out);
                }
            }
            IntervalKind::Component(_) | IntervalKind::Gap(_) => {}
        }
    }
}

/// Split `size` among sequence children. Growth goes to children that can
/// grow and shrinkage to children that can shrink; the child with the
/// smallest range is served first and never gets more than its range.
pub(crate) fn distribute(sizes: &[Sizes], size: i32) -> Vec<i32> {
    let mut out: Vec<i32> = sizes.iter().map(|s| s.pref).collect();
    let pref_total: i64 = sizes.iter().map(|s| i64::from(s.pref)).sum();
    let delta = i64::from(size) - pref_total;
    if delta == 0 {
        return out;
    }
    let growing = delta > 0;
    let mut ranges: Vec<(usize, i64)> = sizes
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let range = if growing {
                i64::from(s.max) - i64::from(s.pref)
            } else {
                i64::from(s.pref) - i64::from(s.min)
            };
            (i, range)
        })
        .filter(|(_, range)| *range > 0)
        .collect();
    ranges.sort_by_key(|(_, range)| *range);

    let mut remaining = delta.abs();
    let count = ranges.len();
    for (n, (index, range)) in ranges.into_iter().enumerate() {
        let share = remaining / (count - n) as i64;
        let take = share.min(range);
        if growing {
            out[index] += take as i32;
        } else {
            out[index] -= take as i32;
        }
        remaining -= take;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TableMetrics;
    use crate::model::{Interval, SizeDef};

    fn sizes(min: i32, pref: i32, max: i32) -> Sizes {
        Sizes { min, pref, max }
    }

    #[test]
    fn test_distribute_growth_to_resizable_only() {
        let out = distribute(&[sizes(10, 10, 10), sizes(0, 50, 32767), sizes(5, 5, 5)], 114);
        assert_eq!(out, vec![10, 99, 5]);
    }

    #[test]
    fn test_distribute_smallest_range_first() {
        let out = distribute(&[sizes(0, 10, 14), sizes(0, 10, 100)], 40);
        assert_eq!(out, vec![14, 26]);
    }

    #[test]
    fn test_distribute_shrink() {
        let out = distribute(&[sizes(10, 30, 30), sizes(20, 20, 20)], 40);
        assert_eq!(out, vec![20, 20]);
    }

    /// Form [200 x 100] with `a` and `b` in a row: container gap, a, related
    /// gap, b, resizing container gap
    fn row_model() -> LayoutModel {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.set_form_size("Form", Some((200, 100)));
        for id in ["a", "b"] {
            model.add_component(id, false);
            model.set_parent(id, Some("Form"));
        }
        for axis in Axis::ALL {
            let root = model.root("Form", axis).unwrap();
            let seq = model.insert_interval(Interval::sequential());
            model.add_child(root, seq, None);
            let lead = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::DEFAULT));
            model.add_child(seq, lead, None);
            let a = model.component_interval("a", axis).unwrap();
            model.add_child(seq, a, None);
            if axis == Axis::Horizontal {
                let gap = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::DEFAULT));
                model.add_child(seq, gap, None);
                let b = model.component_interval("b", axis).unwrap();
                model.add_child(seq, b, None);
            } else {
                let b = model.component_interval("b", axis).unwrap();
                model.add_child(root, b, None);
                model.interval_mut(b).alignment = Some(Alignment::Trailing);
            }
            let trail =
                model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::resizing(Length::Default)));
            model.add_child(seq, trail, None);
        }
        model
    }

    #[test]
    fn test_compute_row() {
        let model = row_model();
        let metrics = TableMetrics::new()
            .with_component("a", 40, 20)
            .with_component("b", 30, 20);
        let layout = compute(&model, &metrics, &DesignerConfig::default());
        assert_eq!(layout.bounds("Form"), Some(Bounds::new(0, 0, 200, 100)));
        assert_eq!(layout.bounds("a"), Some(Bounds::new(10, 10, 40, 20)));
        assert_eq!(layout.bounds("b"), Some(Bounds::new(56, 80, 30, 20)));
    }

    #[test]
    fn test_padding_from_metrics() {
        let model = row_model();
        let metrics = TableMetrics::new()
            .with_component("a", 40, 20)
            .with_component("b", 30, 20)
            .with_parent_padding_all("Form", "a", 0)
            .with_padding("a", "b", Axis::Horizontal, Alignment::Trailing, PaddingKind::Related, 3);
        let layout = compute(&model, &metrics, &DesignerConfig::default());
        assert_eq!(layout.bounds("a"), Some(Bounds::new(0, 0, 40, 20)));
        assert_eq!(layout.bounds("b").map(|b| b.x), Some(43));
    }

    #[test]
    fn test_unattached_component_is_unpositioned() {
        let mut model = row_model();
        model.add_component("c", false);
        let metrics = TableMetrics::new().with_component("c", 10, 10);
        let layout = compute(&model, &metrics, &DesignerConfig::default());
        assert_eq!(layout.placement("c"), Placement::Unpositioned);
    }

    #[test]
    fn test_baseline_group() {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.set_form_size("Form", Some((200, 100)));
        for id in ["label", "field"] {
            model.add_component(id, false);
            model.set_parent(id, Some("Form"));
        }
        let root = model.root("Form", Axis::Vertical).unwrap();
        let group = model.insert_interval(Interval::parallel(Alignment::Baseline));
        model.add_child(root, group, None);
        for id in ["label", "field"] {
            let interval = model.component_interval(id, Axis::Vertical).unwrap();
            model.add_child(group, interval, None);
        }
        let h_root = model.root("Form", Axis::Horizontal).unwrap();
        for id in ["label", "field"] {
            let interval = model.component_interval(id, Axis::Horizontal).unwrap();
            model.add_child(h_root, interval, None);
        }
        let metrics = TableMetrics::new()
            .with_component("label", 40, 14)
            .with_baseline("label", 11)
            .with_component("field", 60, 20)
            .with_baseline("field", 14);
        let layout = compute(&model, &metrics, &DesignerConfig::default());
        assert_eq!(layout.bounds("field").map(|b| b.y), Some(0));
        assert_eq!(layout.bounds("label").map(|b| b.y), Some(3));
        let group_extent = layout.extent(group, Axis::Vertical).unwrap();
        assert_eq!(group_extent, Extent::new(0, 20));
    }

    #[test]
    fn test_container_follows_nested_layout() {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.add_component("panel", true);
        model.add_component("label", false);
        model.set_parent("panel", Some("Form"));
        model.set_parent("label", Some("panel"));
        for axis in Axis::ALL {
            let root = model.root("Form", axis).unwrap();
            let panel = model.component_interval("panel", axis).unwrap();
            model.add_child(root, panel, None);
            let inner = model.root("panel", axis).unwrap();
            let seq = model.insert_interval(Interval::sequential());
            model.add_child(inner, seq, None);
            let gap = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::fixed(5)));
            model.add_child(seq, gap, None);
            let label = model.component_interval("label", axis).unwrap();
            model.add_child(seq, label, None);
        }
        let metrics = TableMetrics::new().with_component("label", 30, 10);
        let layout = compute(&model, &metrics, &DesignerConfig::default());
        assert_eq!(layout.bounds("Form"), Some(Bounds::new(0, 0, 35, 15)));
        assert_eq!(layout.bounds("panel"), Some(Bounds::new(0, 0, 35, 15)));
        assert_eq!(layout.bounds("label"), Some(Bounds::new(5, 5, 30, 10)));
    }
}
