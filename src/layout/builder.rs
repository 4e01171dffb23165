//! Group builder
//!
//! Commits a gesture into the interval trees. Each changed axis goes through
//! the same steps:
//!
//! 1. the dragged components are taken out of their trees, leaving a gap
//!    that keeps their neighbours in place;
//! 2. the trees are normalized (empty groups dropped, singletons collapsed,
//!    adjacent gaps merged);
//! 3. the dragged components are located: from the root down, the group
//!    whose members share the components' row decides whether they join a
//!    sequence, a parallel group, or force several groups to merge;
//! 4. the inclusion is applied and every gap of the touched trees is refitted
//!    so that all components keep their current positions and the dragged
//!    ones land on their target positions.
//!
//! Locating is side-effect free on the committed model; the gesture preview
//! runs steps 1-3 on a scratch copy.

use slotmap::SecondaryMap;
use tracing::{debug, warn};

use crate::metrics::MetricsProvider;
use crate::model::{
    Alignment, Axis, Bounds, Extent, Interval, IntervalId, IntervalKind, LayoutModel, Length,
    PaddingKind, ResizeEdge, SizeDef,
};

use super::bounds::{ComputedLayout, Sizer};
use super::config::DesignerConfig;
use super::error::DesignError;
use super::snap::{PositionDef, PositionKind, SnapTarget};

/// Where a dragged unit goes in an axis tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    /// New member of a parallel group
    Parallel {
        group: IntervalId,
        alignment: Alignment,
    },
    /// Inserted into a sequence before the child at `index`
    Sequence { seq: IntervalId, index: usize },
    /// Put into a new parallel group with `target`
    AlignWith {
        target: IntervalId,
        alignment: Alignment,
    },
    /// Put into a new sequence with `target`
    NextTo { target: IntervalId, after: bool },
    /// Several members of `group` merged into one sequence around the unit
    Merge {
        group: IntervalId,
        members: Vec<IntervalId>,
    },
    /// Parallel with the children `first..=last` of a sequence
    ParallelWithRange {
        seq: IntervalId,
        first: usize,
        last: usize,
    },
}

/// A component created by an adding gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComponent {
    pub id: String,
    pub is_container: bool,
}

impl NewComponent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_container: false,
        }
    }

    pub fn container(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_container: true,
        }
    }
}

/// Edge of its container a component follows along one axis, and the edges
/// it can be switched to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentAnchor {
    /// `None` when the component follows both edges, i.e. it resizes
    pub alignment: Option<Alignment>,
    pub leading_adjustable: bool,
    pub trailing_adjustable: bool,
}

/// Everything the builder needs to commit a gesture
#[derive(Debug, Clone)]
pub(crate) struct CommitRequest<'a> {
    pub container: &'a str,
    pub items: &'a [(String, Bounds)],
    pub additions: &'a [NewComponent],
    pub positions: &'a [PositionDef; 2],
    pub resize_edges: Option<[ResizeEdge; 2]>,
}

/// Inclusions the request would produce, computed on a scratch copy
pub(crate) fn plan(
    model: &LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    request: &CommitRequest<'_>,
) -> Result<[Option<Inclusion>; 2], DesignError> {
    let mut scratch = model.clone();
    run(&mut scratch, layout, metrics, config, request, false)
}

/// Apply the request to `model`
pub(crate) fn commit(
    model: &mut LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    request: &CommitRequest<'_>,
) -> Result<[Option<Inclusion>; 2], DesignError> {
    let mut scratch = model.clone();
    let inclusions = run(&mut scratch, layout, metrics, config, request, true)?;
    *model = scratch;
    Ok(inclusions)
}

fn run(
    model: &mut LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    request: &CommitRequest<'_>,
    apply: bool,
) -> Result<[Option<Inclusion>; 2], DesignError> {
    for addition in request.additions {
        model.add_component(&addition.id, addition.is_container);
    }
    let changed = Axis::ALL.map(|axis| axis_changed(model, layout, request, axis));
    let mut inclusions = [None, None];
    for axis in Axis::ALL {
        if !changed[axis.index()] {
            continue;
        }
        let mut builder = Builder::new(std::mem::take(model), layout, metrics, config, axis);
        let result = builder.place_items(request, apply);
        *model = builder.into_model();
        inclusions[axis.index()] = Some(result?);
    }
    if apply {
        for (id, _) in request.items {
            model.set_parent(id, Some(request.container));
        }
    }
    Ok(inclusions)
}

/// An axis needs work when a component changes container, enters the
/// layout, or gets a different extent
fn axis_changed(
    model: &LayoutModel,
    layout: &ComputedLayout,
    request: &CommitRequest<'_>,
    axis: Axis,
) -> bool {
    if let Some(edges) = request.resize_edges {
        if edges[axis.index()] == ResizeEdge::None {
            return false;
        }
    }
    request.items.iter().any(|(id, bounds)| {
        let Some(comp) = model.component(id) else {
            return true;
        };
        comp.parent.as_deref() != Some(request.container)
            || model.parent(comp.interval(axis)).is_none()
            || layout.bounds(id).map(|b| b.extent(axis)) != Some(bounds.extent(axis))
    })
}

/// Take components out of the layout, keeping everything else in place
pub(crate) fn remove_from_layout(
    model: &mut LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    ids: &[String],
) {
    for axis in Axis::ALL {
        let mut builder = Builder::new(std::mem::take(model), layout, metrics, config, axis);
        let mut roots = Vec::new();
        for id in ids {
            let Some(interval) = builder.model.component_interval(id, axis) else {
                continue;
            };
            if builder.model.parent(interval).is_none() {
                continue;
            }
            push_unique(&mut roots, builder.model.tree_root(interval));
            builder.remove(interval);
        }
        builder.refit_roots(&roots);
        *model = builder.into_model();
    }
    for id in ids {
        model.detach(id);
    }
}

fn push_unique(list: &mut Vec<IntervalId>, id: IntervalId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Line up components of one container at a common edge along `axis`.
/// With `closed` only the components join the aligned group; otherwise each
/// brings along the rest of its row on the side away from the aligned edge.
#[allow(clippy::too_many_arguments)]
pub(crate) fn align(
    model: &mut LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    ids: &[String],
    closed: bool,
    axis: Axis,
    alignment: Alignment,
) -> Result<(), DesignError> {
    let mut builder = Builder::new(model.clone(), layout, metrics, config, axis);
    builder.align(ids, closed, alignment)?;
    *model = builder.into_model();
    Ok(())
}

/// Make a component grow with its container along `axis`, or fix it at its
/// current size
pub(crate) fn set_resizing(
    model: &mut LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    id: &str,
    axis: Axis,
    resizing: bool,
) {
    let Some(interval) = model.component_interval(id, axis) else {
        return;
    };
    let mut builder = Builder::new(std::mem::take(model), layout, metrics, config, axis);
    builder.set_resizing(interval, resizing);
    *model = builder.into_model();
}

/// Make a fixed-size component follow the `alignment` edge of its container
pub(crate) fn adjust_alignment(
    model: &mut LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    id: &str,
    axis: Axis,
    alignment: Alignment,
) {
    let Some(interval) = model.component_interval(id, axis) else {
        return;
    };
    let mut builder = Builder::new(std::mem::take(model), layout, metrics, config, axis);
    builder.adjust_alignment(interval, alignment);
    *model = builder.into_model();
}

/// Which container edge a placed component follows along `axis`
pub(crate) fn component_anchor(model: &LayoutModel, interval: IntervalId) -> ComponentAnchor {
    let resizing = model.wants_resize(interval);
    let (mut leading_fixed, mut trailing_fixed) = (!resizing, !resizing);
    let (mut leading_adjustable, mut trailing_adjustable) = (!resizing, !resizing);

    let mut node = interval;
    while let Some(parent) = model.parent(node) {
        let group = model.interval(parent);
        if group.size.is_suppressed() {
            leading_fixed = true;
            trailing_fixed = true;
            leading_adjustable = true;
            trailing_adjustable = true;
        } else if group.is_parallel() {
            if model.wants_resize(parent) && !model.wants_resize(node) {
                match model.effective_alignment(node) {
                    Alignment::Leading => trailing_fixed = false,
                    Alignment::Trailing => leading_fixed = false,
                    _ => {}
                }
            }
        } else {
            let mut before = true;
            for &child in group.children() {
                if child == node {
                    before = false;
                } else if model.wants_resize(child) {
                    let gap = model.interval(child).is_gap();
                    if before {
                        leading_fixed = false;
                        leading_adjustable &= gap;
                    } else {
                        trailing_fixed = false;
                        trailing_adjustable &= gap;
                    }
                }
            }
        }
        node = parent;
    }

    // nothing grows: the component stays where the root group starts
    if leading_fixed && trailing_fixed {
        if model.interval(node).group_alignment() == Some(Alignment::Trailing) {
            leading_fixed = false;
        } else {
            trailing_fixed = false;
        }
    }
    let alignment = if leading_fixed {
        Some(Alignment::Leading)
    } else if trailing_fixed {
        Some(Alignment::Trailing)
    } else {
        None
    };
    ComponentAnchor {
        alignment,
        leading_adjustable,
        trailing_adjustable,
    }
}

/// Extent of a component moved to the `alignment` edge of `union`
fn aligned_extent(extent: Extent, union: Extent, alignment: Alignment) -> Extent {
    let size = extent.size();
    let start = match alignment {
        Alignment::Leading | Alignment::Baseline => union.start,
        Alignment::Trailing => union.end - size,
        Alignment::Center => union.start + (union.size() - size) / 2,
    };
    Extent::new(start, start + size)
}

/// Facts about one dragged component, gathered before any edit
struct ItemInfo {
    id: String,
    interval: IntervalId,
    target: Extent,
    orthogonal: Extent,
    attached: bool,
    current_size: Option<i32>,
    leaves_suppressed: bool,
}

/// The dragged components as one interval
struct Unit {
    interval: IntervalId,
    extent: Extent,
    orthogonal: Extent,
    components: Vec<String>,
    resizing: bool,
}

struct Builder<'a> {
    model: LayoutModel,
    layout: &'a ComputedLayout,
    metrics: &'a dyn MetricsProvider,
    config: &'a DesignerConfig,
    axis: Axis,
    /// Target extents of every interval of the touched trees
    extents: SecondaryMap<IntervalId, Extent>,
    /// Component treated as sharing the unit's row
    row_anchor: Option<String>,
}

impl<'a> Builder<'a> {
    fn new(
        model: LayoutModel,
        layout: &'a ComputedLayout,
        metrics: &'a dyn MetricsProvider,
        config: &'a DesignerConfig,
        axis: Axis,
    ) -> Self {
        Self {
            model,
            layout,
            metrics,
            config,
            axis,
            extents: layout.extents(axis).clone(),
            row_anchor: None,
        }
    }

    fn into_model(self) -> LayoutModel {
        self.model
    }

    fn interval(&self, id: IntervalId) -> &Interval {
        self.model.interval(id)
    }

    fn is_gap(&self, id: IntervalId) -> bool {
        self.model.interval(id).is_gap()
    }

    fn sizer(&self) -> Sizer<'_> {
        Sizer::new(&self.model, self.metrics, self.config, self.axis)
    }

    fn container_space(&self, root: IntervalId) -> Option<Extent> {
        let container = self.model.container_of_root(root)?;
        self.layout.bounds(container).map(|b| b.extent(self.axis))
    }

    fn new_gap(&mut self, extent: Extent, size: SizeDef) -> IntervalId {
        let gap = self
            .model
            .insert_interval(Interval::gap(PaddingKind::Related, size));
        self.extents.insert(gap, extent);
        gap
    }

    // ========================================================================
    // Gesture commit
    // ========================================================================

    fn place_items(
        &mut self,
        request: &CommitRequest<'_>,
        apply: bool,
    ) -> Result<Inclusion, DesignError> {
        let axis = self.axis;
        let position = &request.positions[axis.index()];
        let target_root = self
            .model
            .root(request.container, axis)
            .ok_or_else(|| DesignError::NotAContainer {
                id: request.container.to_string(),
            })?;
        let space = self.container_space(target_root).ok_or_else(|| {
            DesignError::invalid_target(request.container, "container is not positioned")
        })?;

        let mut infos = Vec::with_capacity(request.items.len());
        for (id, bounds) in request.items {
            let interval = self
                .model
                .component_interval(id, axis)
                .ok_or_else(|| DesignError::unknown_component(id.clone(), Vec::new()))?;
            let attached = self.model.parent(interval).is_some();
            let leaves_suppressed = attached
                && request.resize_edges.is_none()
                && self.interval(interval).size.is_resizing()
                && self.model.suppressed_ancestor(interval).is_some();
            infos.push(ItemInfo {
                id: id.clone(),
                interval,
                target: bounds.extent(axis),
                orthogonal: bounds.extent(axis.other()),
                attached,
                current_size: self.layout.extent(interval, axis).map(|e| e.size()),
                leaves_suppressed,
            });
        }

        let mut roots = vec![target_root];
        for info in &infos {
            if info.attached {
                push_unique(&mut roots, self.model.tree_root(info.interval));
                self.remove(info.interval);
            }
        }
        for &root in &roots {
            self.normalize(root);
        }
        for info in &infos {
            self.update_item_size(info, request, position);
            self.extents.insert(info.interval, info.target);
        }

        let unit = self.build_unit(&infos);
        self.row_anchor = match &position.kind {
            PositionKind::NextTo {
                target: SnapTarget::Component(id),
                ..
            } => Some(id.clone()),
            _ => None,
        };
        let inclusion = self.locate(target_root, &unit, position);
        debug!(?axis, ?inclusion, components = ?unit.components, "located");
        if !apply {
            return Ok(inclusion);
        }

        self.include(&inclusion, &unit, position, space);
        self.refit_roots(&roots);
        self.apply_snapped_gap(&unit, position);
        for &root in &roots {
            self.drop_empty_gaps(root);
            self.normalize(root);
        }
        Ok(inclusion)
    }

    fn update_item_size(&mut self, info: &ItemInfo, request: &CommitRequest<'_>, position: &PositionDef) {
        let size = info.target.size();
        let intrinsic = self.sizer().intrinsic(&info.id).1;
        let pref = if size == intrinsic {
            Length::Default
        } else {
            Length::Px(size)
        };
        let def = &mut self.model.interval_mut(info.interval).size;
        if request.resize_edges.is_some() {
            let to_border = position.edge == Alignment::Trailing
                && matches!(
                    position.kind,
                    PositionKind::NextTo {
                        target: SnapTarget::Border,
                        ..
                    }
                );
            *def = SizeDef {
                min: Length::Default,
                pref,
                max: if to_border {
                    Length::Unbounded
                } else {
                    Length::Default
                },
            };
        } else if !info.attached {
            def.pref = pref;
        } else if info.leaves_suppressed {
            if let Some(current) = info.current_size {
                debug!(component = %info.id, current, "fixing size of component leaving suppressed group");
                *def = SizeDef::fixed(current);
            }
        }
    }

    fn build_unit(&mut self, infos: &[ItemInfo]) -> Unit {
        let extent = infos
            .iter()
            .map(|i| i.target)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let orthogonal = infos
            .iter()
            .map(|i| i.orthogonal)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let components: Vec<String> = infos.iter().map(|i| i.id.clone()).collect();
        let resizing = infos
            .iter()
            .any(|i| self.interval(i.interval).size.is_resizing());

        let interval = if let [only] = infos {
            only.interval
        } else {
            let mut sorted: Vec<&ItemInfo> = infos.iter().collect();
            sorted.sort_by_key(|i| (i.target.start, i.target.end));
            let in_row = sorted
                .windows(2)
                .all(|w| w[0].target.end <= w[1].target.start);
            let group = if in_row {
                let seq = self.model.insert_interval(Interval::sequential());
                let mut previous: Option<Extent> = None;
                for info in &sorted {
                    if let Some(prev) = previous {
                        if info.target.start > prev.end {
                            let gap = self.new_gap(
                                Extent::new(prev.end, info.target.start),
                                SizeDef::fixed(info.target.start - prev.end),
                            );
                            self.model.add_child(seq, gap, None);
                        }
                    }
                    self.model.add_child(seq, info.interval, None);
                    previous = Some(info.target);
                }
                seq
            } else {
                let group = self
                    .model
                    .insert_interval(Interval::parallel(Alignment::Leading));
                for info in &sorted {
                    self.model.add_child(group, info.interval, None);
                }
                group
            };
            self.extents.insert(group, extent);
            group
        };
        Unit {
            interval,
            extent,
            orthogonal,
            components,
            resizing,
        }
    }

    // ========================================================================
    // Removal and normalization
    // ========================================================================

    /// Detach an interval, leaving a gap that covers its space in a sequence
    fn remove(&mut self, id: IntervalId) {
        let Some(parent) = self.model.parent(id) else {
            return;
        };
        if !self.interval(parent).is_sequential() {
            self.model.remove_child(id);
            return;
        }
        let extent = self.extents.get(id).copied();
        let children = self.model.children(parent).to_vec();
        let index = children.iter().position(|&c| c == id).unwrap_or(0);
        let prev = index
            .checked_sub(1)
            .map(|i| children[i])
            .filter(|&c| self.is_gap(c));
        let next = children.get(index + 1).copied().filter(|&c| self.is_gap(c));

        let covered = |b: &Builder<'_>, gaps: &[IntervalId]| {
            gaps.iter()
                .filter_map(|g| b.extents.get(*g).copied())
                .chain(extent)
                .reduce(|a, e| a.union(&e))
        };
        match (prev, next) {
            (Some(p), Some(n)) => {
                let span = covered(self, &[p, n]);
                let (keep, drop) = if self.interval(n).size.is_resizing() {
                    (n, p)
                } else {
                    (p, n)
                };
                self.model.delete_subtree(drop);
                self.absorb(keep, span);
            }
            (Some(g), None) | (None, Some(g)) => {
                let span = covered(self, &[g]);
                self.absorb(g, span);
            }
            (None, None) => {
                if let Some(extent) = extent {
                    let gap = self.new_gap(extent, SizeDef::fixed(extent.size()));
                    self.model.add_child(parent, gap, Some(index));
                }
            }
        }
        self.model.remove_child(id);
        self.drop_dangling_gap(parent);
    }

    fn absorb(&mut self, gap: IntervalId, span: Option<Extent>) {
        let Some(span) = span else {
            return;
        };
        self.extents.insert(gap, span);
        let interval = self.model.interval_mut(gap);
        if !interval.size.is_resizing() {
            interval.size = SizeDef::fixed(span.size());
        }
    }

    /// A nested sequence does not keep a fixed gap hanging past its content
    /// on the side it is not aligned to
    fn drop_dangling_gap(&mut self, seq: IntervalId) {
        let Some(parent) = self.model.parent(seq) else {
            return;
        };
        if self.model.parent(parent).is_none() {
            return;
        }
        let children = self.model.children(seq).to_vec();
        if !children.iter().any(|&c| !self.is_gap(c)) {
            return;
        }
        let dangling = match self.model.effective_alignment(seq) {
            Alignment::Trailing => children.first().copied(),
            _ => children.last().copied(),
        };
        if let Some(gap) = dangling {
            if self.is_gap(gap) && !self.interval(gap).size.is_resizing() {
                self.model.delete_subtree(gap);
            }
        }
    }

    fn normalize(&mut self, id: IntervalId) {
        if self.model.get_interval(id).is_none() {
            return;
        }
        for child in self.model.children(id).to_vec() {
            if self.model.get_interval(child).is_some() && self.model.parent(child) == Some(id) {
                self.normalize(child);
            }
        }
        if self.model.get_interval(id).is_none() {
            return;
        }
        if self.interval(id).is_sequential() {
            self.normalize_sequence(id);
        } else if self.interval(id).is_parallel() {
            self.normalize_parallel(id);
        }
    }

    fn normalize_sequence(&mut self, seq: IntervalId) {
        // flatten nested sequences
        let mut i = 0;
        while i < self.model.children(seq).len() {
            let child = self.model.children(seq)[i];
            if self.interval(child).is_sequential() {
                let grand = self.model.children(child).to_vec();
                self.model.remove_child(child);
                for (offset, &g) in grand.iter().enumerate() {
                    self.model.remove_child(g);
                    self.model.add_child(seq, g, Some(i + offset));
                }
                self.model.delete_subtree(child);
            } else {
                i += 1;
            }
        }

        // merge adjacent gaps
        let mut i = 0;
        while i + 1 < self.model.children(seq).len() {
            let a = self.model.children(seq)[i];
            let b = self.model.children(seq)[i + 1];
            if self.is_gap(a) && self.is_gap(b) {
                let span = match (self.extents.get(a), self.extents.get(b)) {
                    (Some(x), Some(y)) => Some(x.union(y)),
                    (x, y) => x.or(y).copied(),
                };
                if self.interval(b).size.is_resizing() && !self.interval(a).size.is_resizing() {
                    self.model.interval_mut(a).size = self.interval(b).size;
                }
                self.model.delete_subtree(b);
                self.absorb(a, span);
            } else {
                i += 1;
            }
        }

        let children = self.model.children(seq).to_vec();
        if !children.iter().any(|&c| !self.is_gap(c)) {
            if self.model.parent(seq).is_some() {
                self.model.delete_subtree(seq);
            }
            return;
        }
        if let [only] = children[..] {
            self.collapse(seq, only);
        }
    }

    fn normalize_parallel(&mut self, group: IntervalId) {
        let is_root = self.model.parent(group).is_none();
        let alignment = self.interval(group).group_alignment();

        for child in self.model.children(group).to_vec() {
            let c = self.interval(child);
            if c.is_gap() && !is_root {
                self.model.delete_subtree(child);
            } else if c.is_parallel()
                && c.group_alignment() == alignment
                && c.alignment.map_or(true, |a| Some(a) == alignment)
                && c.size.is_default()
            {
                let index = self.model.index_in_parent(child).unwrap_or(0);
                let grand = self.model.children(child).to_vec();
                for (offset, &g) in grand.iter().enumerate() {
                    self.model.remove_child(g);
                    self.model.add_child(group, g, Some(index + 1 + offset));
                }
                self.model.delete_subtree(child);
            }
        }

        if is_root {
            return;
        }
        let children = self.model.children(group).to_vec();
        match children[..] {
            [] => self.model.delete_subtree(group),
            [only] => self.collapse(group, only),
            _ => {}
        }
    }

    /// Replace a group holding a single child by that child
    fn collapse(&mut self, group: IntervalId, child: IntervalId) {
        if self.model.parent(group).is_none() {
            return;
        }
        let alignment = self.interval(group).alignment;
        let suppressed = self.interval(group).size.is_suppressed();
        self.model.remove_child(child);
        self.model.replace_child(group, child);
        let interval = self.model.interval_mut(child);
        interval.alignment = alignment;
        if suppressed {
            if interval.is_group() {
                interval.size.max = Length::Preferred;
            } else if interval.size.is_resizing() {
                interval.size.max = Length::Default;
            }
        }
        self.model.delete_subtree(group);
    }

    // ========================================================================
    // Locating
    // ========================================================================

    /// Extent of the content of an interval, ignoring gaps
    fn content_span(&self, id: IntervalId) -> Option<Extent> {
        let interval = self.interval(id);
        if interval.is_gap() {
            return None;
        }
        if interval.is_component() {
            return self.extents.get(id).copied();
        }
        interval
            .children()
            .iter()
            .filter_map(|&c| self.content_span(c))
            .reduce(|a, b| a.union(&b))
    }

    /// Extent an interval naturally occupies: its content plus the gaps at
    /// the edges of sequences
    fn natural_span(&self, id: IntervalId) -> Option<Extent> {
        let interval = self.interval(id);
        if interval.is_sequential() {
            let children = interval.children();
            let content = self.content_span(id)?;
            let edge_size = |gaps: &mut dyn Iterator<Item = &IntervalId>| -> i32 {
                gaps.take_while(|&&c| self.is_gap(c))
                    .map(|&c| self.extents.get(c).map_or(0, |e| e.size().max(0)))
                    .sum()
            };
            let leading = edge_size(&mut children.iter());
            let trailing = edge_size(&mut children.iter().rev());
            return Some(Extent::new(content.start - leading, content.end + trailing));
        }
        if interval.is_parallel() {
            return interval
                .children()
                .iter()
                .filter_map(|&c| self.natural_span(c))
                .reduce(|a, b| a.union(&b));
        }
        self.content_span(id)
    }

    fn is_row_mate(&self, component: &str, unit: &Unit) -> bool {
        if unit.components.iter().any(|c| c == component) {
            return false;
        }
        if self.row_anchor.as_deref() == Some(component) {
            return true;
        }
        self.layout
            .bounds(component)
            .is_some_and(|b| b.extent(self.axis.other()).overlaps(&unit.orthogonal))
    }

    fn has_mate(&self, id: IntervalId, unit: &Unit) -> bool {
        self.model
            .components_in(id)
            .iter()
            .any(|c| self.is_row_mate(c, unit))
    }

    fn locate(&self, root: IntervalId, unit: &Unit, position: &PositionDef) -> Inclusion {
        let inclusion = self
            .locate_aligned(root, unit, position)
            .unwrap_or_else(|| self.locate_in_parallel(root, unit));
        if self.fits(&inclusion, unit) {
            inclusion
        } else {
            debug!(?inclusion, "inclusion does not fit, placing at root");
            Inclusion::Parallel {
                group: root,
                alignment: Alignment::Leading,
            }
        }
    }

    /// Aligned, indented and baseline snaps put the unit in parallel with
    /// the snap target
    fn locate_aligned(
        &self,
        root: IntervalId,
        unit: &Unit,
        position: &PositionDef,
    ) -> Option<Inclusion> {
        let (target, alignment, joinable) = match &position.kind {
            PositionKind::Aligned { target, alignment } => (target, *alignment, true),
            PositionKind::Indented { target } => (target, Alignment::Leading, false),
            PositionKind::Baseline { target } if self.axis == Axis::Vertical => {
                (target, Alignment::Baseline, true)
            }
            _ => return None,
        };
        let x = self.model.component_interval(target, self.axis)?;
        if self.model.parent(x).is_none() || self.model.tree_root(x) != root {
            return None;
        }
        let parent = self.model.parent(x)?;
        let p = self.interval(parent);
        if joinable
            && p.is_parallel()
            && p.group_alignment() == Some(alignment)
            && self.model.effective_alignment(x) == alignment
        {
            let joined = Inclusion::Parallel {
                group: parent,
                alignment,
            };
            if self.fits(&joined, unit) {
                return Some(joined);
            }
        }
        let aligned = Inclusion::AlignWith { target: x, alignment };
        self.fits(&aligned, unit).then_some(aligned)
    }

    fn locate_in_parallel(&self, group: IntervalId, unit: &Unit) -> Inclusion {
        let mates: Vec<IntervalId> = self
            .model
            .children(group)
            .iter()
            .copied()
            .filter(|&c| !self.is_gap(c) && self.has_mate(c, unit))
            .collect();
        match mates[..] {
            [] => Inclusion::Parallel {
                group,
                alignment: Alignment::Leading,
            },
            [only] => {
                if self.interval(only).is_sequential() {
                    return self.locate_in_sequence(only, unit);
                }
                let span = self.natural_span(only).unwrap_or_default();
                if span.overlaps(&unit.extent) {
                    if self.interval(only).is_parallel() {
                        self.locate_in_parallel(only, unit)
                    } else {
                        Inclusion::Parallel {
                            group,
                            alignment: Alignment::Leading,
                        }
                    }
                } else {
                    Inclusion::NextTo {
                        target: only,
                        after: unit.extent.start >= span.end,
                    }
                }
            }
            _ => self.locate_merge(group, &mates, unit),
        }
    }

    fn locate_in_sequence(&self, seq: IntervalId, unit: &Unit) -> Inclusion {
        let children = self.model.children(seq);
        let contents: Vec<(usize, IntervalId, Extent)> = children
            .iter()
            .enumerate()
            .filter(|(_, &c)| !self.is_gap(c))
            .filter_map(|(i, &c)| self.natural_span(c).map(|s| (i, c, s)))
            .collect();
        let overlapping: Vec<&(usize, IntervalId, Extent)> = contents
            .iter()
            .filter(|(_, _, span)| span.overlaps(&unit.extent))
            .collect();
        match overlapping[..] {
            [] => {
                let index = contents
                    .iter()
                    .find(|(_, _, span)| span.start >= unit.extent.end)
                    .map_or(children.len(), |(i, _, _)| *i);
                Inclusion::Sequence { seq, index }
            }
            [&(index, child, span)] => {
                if self.interval(child).is_parallel()
                    && (span.contains(&unit.extent) || self.has_mate(child, unit))
                {
                    return self.locate_in_parallel(child, unit);
                }
                self.parallel_with_range(seq, index, index, unit)
            }
            [first, .., last] => self.parallel_with_range(seq, first.0, last.0, unit),
        }
    }

    /// Widen a range of sequence children until the unit in parallel with it
    /// no longer collides with the remaining children
    fn parallel_with_range(&self, seq: IntervalId, first: usize, last: usize, unit: &Unit) -> Inclusion {
        let children = self.model.children(seq);
        let (mut first, mut last) = (first, last);
        loop {
            let span = children[first..=last]
                .iter()
                .filter_map(|&c| self.natural_span(c))
                .fold(unit.extent, |a, b| a.union(&b));
            let before = (0..first)
                .rev()
                .find(|&i| !self.is_gap(children[i]))
                .filter(|&i| {
                    self.natural_span(children[i])
                        .is_some_and(|s| s.end > span.start)
                });
            let after = (last + 1..children.len())
                .find(|&i| !self.is_gap(children[i]))
                .filter(|&i| {
                    self.natural_span(children[i])
                        .is_some_and(|s| s.start < span.end)
                });
            match (before, after) {
                (None, None) => break,
                (b, a) => {
                    first = b.unwrap_or(first);
                    last = a.unwrap_or(last);
                }
            }
        }
        Inclusion::ParallelWithRange { seq, first, last }
    }

    fn locate_merge(&self, group: IntervalId, members: &[IntervalId], unit: &Unit) -> Inclusion {
        let splits = members.iter().all(|&m| self.splits_around(m, unit));
        if splits {
            Inclusion::Merge {
                group,
                members: members.to_vec(),
            }
        } else {
            Inclusion::Parallel {
                group,
                alignment: Alignment::Leading,
            }
        }
    }

    /// Whether every piece of content of `id` lies wholly before or after the unit
    fn splits_around(&self, id: IntervalId, unit: &Unit) -> bool {
        let clear = |span: Extent| span.end <= unit.extent.start || span.start >= unit.extent.end;
        if self.interval(id).is_sequential() {
            self.model
                .children(id)
                .iter()
                .filter(|&&c| !self.is_gap(c))
                .all(|&c| self.content_span(c).map_or(true, clear))
        } else {
            self.content_span(id).map_or(true, clear)
        }
    }

    /// Interval that grows by the inclusion, with its grown span
    fn claimed(&self, inclusion: &Inclusion, unit: &Unit) -> (IntervalId, Extent) {
        let anchor = match inclusion {
            Inclusion::Parallel { group, .. } | Inclusion::Merge { group, .. } => *group,
            Inclusion::Sequence { seq, .. } | Inclusion::ParallelWithRange { seq, .. } => *seq,
            Inclusion::AlignWith { target, .. } | Inclusion::NextTo { target, .. } => *target,
        };
        let span = self
            .natural_span(anchor)
            .map_or(unit.extent, |s| s.union(&unit.extent));
        (anchor, span)
    }

    fn fits(&self, inclusion: &Inclusion, unit: &Unit) -> bool {
        let (anchor, span) = self.claimed(inclusion, unit);
        self.fits_in_place(anchor, span)
    }

    /// Whether `id` can occupy `span` without colliding with its sequence
    /// neighbours, all the way up to the root
    fn fits_in_place(&self, id: IntervalId, span: Extent) -> bool {
        let Some(parent) = self.model.parent(id) else {
            return true;
        };
        let own = self.natural_span(parent);
        if self.interval(parent).is_sequential() {
            let children = self.model.children(parent);
            let index = children.iter().position(|&c| c == id).unwrap_or(0);
            let before = children[..index]
                .iter()
                .rev()
                .find(|&&c| !self.is_gap(c))
                .and_then(|&c| self.natural_span(c));
            let after = children[index + 1..]
                .iter()
                .find(|&&c| !self.is_gap(c))
                .and_then(|&c| self.natural_span(c));
            if before.is_some_and(|b| b.end > span.start) || after.is_some_and(|a| a.start < span.end) {
                return false;
            }
        }
        let grown = own.map_or(span, |o| o.union(&span));
        self.fits_in_place(parent, grown)
    }

    // ========================================================================
    // Applying inclusions
    // ========================================================================

    fn include(&mut self, inclusion: &Inclusion, unit: &Unit, position: &PositionDef, space: Extent) {
        match inclusion {
            Inclusion::Parallel { group, alignment } => {
                self.include_parallel(*group, *alignment, unit, position, space)
            }
            Inclusion::Sequence { seq, index } => {
                self.include_in_sequence(*seq, *index, unit, position, space)
            }
            Inclusion::AlignWith { target, alignment } => {
                let group = self
                    .model
                    .insert_interval(Interval::parallel(*alignment));
                let own = self.interval(*target).alignment;
                self.model.replace_child(*target, group);
                self.model.interval_mut(group).alignment = own;
                self.model.interval_mut(*target).alignment = None;
                self.model.add_child(group, *target, None);
                self.model.add_child(group, unit.interval, None);
            }
            Inclusion::NextTo { target, after } => {
                let seq = self.model.insert_interval(Interval::sequential());
                let own = self.interval(*target).alignment;
                let span = self.natural_span(*target).unwrap_or_default();
                self.model.replace_child(*target, seq);
                self.model.interval_mut(seq).alignment = own;
                self.model.interval_mut(*target).alignment = None;
                let (first, second, between) = if *after {
                    (*target, unit.interval, Extent::new(span.end, unit.extent.start))
                } else {
                    (unit.interval, *target, Extent::new(unit.extent.end, span.start))
                };
                self.model.add_child(seq, first, None);
                if between.size() > 0 {
                    let gap = self.new_gap(between, SizeDef::fixed(between.size()));
                    self.model.add_child(seq, gap, None);
                }
                self.model.add_child(seq, second, None);
            }
            Inclusion::Merge { group, members } => self.merge(*group, members, unit),
            Inclusion::ParallelWithRange { seq, first, last } => {
                let taken: Vec<IntervalId> = self.model.children(*seq)[*first..=*last].to_vec();
                let group = self
                    .model
                    .insert_interval(Interval::parallel(Alignment::Leading));
                for &c in &taken {
                    self.model.remove_child(c);
                }
                self.model.add_child(*seq, group, Some(*first));
                let inner = if let [only] = taken[..] {
                    only
                } else {
                    let inner = self.model.insert_interval(Interval::sequential());
                    for &c in &taken {
                        self.model.add_child(inner, c, None);
                    }
                    inner
                };
                self.model.add_child(group, inner, None);
                self.model.add_child(group, unit.interval, None);
            }
        }
        self.resolve_resizing_conflict(unit);
    }

    fn include_parallel(
        &mut self,
        group: IntervalId,
        alignment: Alignment,
        unit: &Unit,
        position: &PositionDef,
        space: Extent,
    ) {
        let group_alignment = self.interval(group).group_alignment();
        self.model.interval_mut(unit.interval).alignment =
            (group_alignment != Some(alignment)).then_some(alignment);
        if self.model.parent(group).is_some() {
            self.model.add_child(group, unit.interval, None);
            return;
        }

        // at the root the unit gets container gaps on both sides; the
        // resizing one is on the side away from the snapped edge
        let seq = self.model.insert_interval(Interval::sequential());
        self.model.add_child(group, seq, None);
        let leading_resizes =
            !unit.resizing && position.is_snapped() && position.edge == Alignment::Trailing;
        let trailing_resizes = !unit.resizing && !leading_resizes;
        let lead = Extent::new(space.start, unit.extent.start);
        let trail = Extent::new(unit.extent.end, space.end);
        let lead_def = if leading_resizes {
            SizeDef::resizing(Length::Default)
        } else {
            SizeDef::fixed(lead.size())
        };
        let trail_def = if trailing_resizes {
            SizeDef::resizing(Length::Default)
        } else {
            SizeDef::fixed(trail.size())
        };
        let lead_gap = self.new_gap(lead, lead_def);
        let trail_gap = self.new_gap(trail, trail_def);
        self.model.add_child(seq, lead_gap, None);
        self.model.add_child(seq, unit.interval, None);
        self.model.add_child(seq, trail_gap, None);
        self.model.interval_mut(unit.interval).alignment = None;
    }

    fn include_in_sequence(
        &mut self,
        seq: IntervalId,
        index: usize,
        unit: &Unit,
        position: &PositionDef,
        space: Extent,
    ) {
        self.model.add_child(seq, unit.interval, Some(index));
        let children = self.model.children(seq).to_vec();
        let before = index.checked_sub(1).map(|i| children[i]);
        let after = children.get(index + 1).copied();

        let mut gap_before = before.filter(|&c| self.is_gap(c));
        if let Some(prev) = before.filter(|&c| !self.is_gap(c)) {
            if let Some(span) = self.natural_span(prev) {
                if span.end < unit.extent.start {
                    let gap = self.new_gap(
                        Extent::new(span.end, unit.extent.start),
                        SizeDef::fixed(unit.extent.start - span.end),
                    );
                    self.model.add_child(seq, gap, Some(index));
                    gap_before = Some(gap);
                }
            }
        }
        let unit_index = self.model.index_in_parent(unit.interval).unwrap_or(index);
        let mut gap_after = after.filter(|&c| self.is_gap(c));
        if let Some(next) = after.filter(|&c| !self.is_gap(c)) {
            if let Some(span) = self.natural_span(next) {
                if span.start > unit.extent.end {
                    let gap = self.new_gap(
                        Extent::new(unit.extent.end, span.start),
                        SizeDef::fixed(span.start - unit.extent.end),
                    );
                    self.model.add_child(seq, gap, Some(unit_index + 1));
                    gap_after = Some(gap);
                }
            }
        }

        if unit.resizing {
            return;
        }
        let root_level = self
            .model
            .parent(seq)
            .is_some_and(|p| self.model.parent(p).is_none());
        let resizes = |b: &Self, g: Option<IntervalId>| g.is_some_and(|g| b.interval(g).size.is_resizing());
        let snapped_leading = position.is_snapped() && position.edge != Alignment::Trailing;

        if resizes(self, gap_before) && (snapped_leading || gap_after.is_none()) {
            if let Some(g) = gap_before {
                let size = self.extents.get(g).map_or(0, |e| e.size());
                self.model.interval_mut(g).size = SizeDef::fixed(size);
            }
            match gap_after {
                Some(g) => {
                    let pref = self.interval(g).size.pref;
                    self.model.interval_mut(g).size = SizeDef::resizing(pref);
                }
                None if root_level => {
                    let trail = Extent::new(unit.extent.end, space.end.max(unit.extent.end));
                    let gap = self.new_gap(trail, SizeDef::resizing(Length::Default));
                    self.model.add_child(seq, gap, None);
                }
                None => {}
            }
        } else if resizes(self, gap_after) && position.is_snapped() && position.edge == Alignment::Trailing {
            if let Some(g) = gap_after {
                let size = self.extents.get(g).map_or(0, |e| e.size());
                self.model.interval_mut(g).size = SizeDef::fixed(size);
            }
            if let Some(g) = gap_before {
                let pref = self.interval(g).size.pref;
                self.model.interval_mut(g).size = SizeDef::resizing(pref);
            }
        }
    }

    /// The unit shares its row with several members
    /// of a parallel group, so the members are split around the unit into a
    /// part before it and a part after it
    fn merge(&mut self, group: IntervalId, members: &[IntervalId], unit: &Unit) {
        let group_span = self.natural_span(group);
        let mut befores = Vec::new();
        let mut afters = Vec::new();
        let mut had_trailing_resizing = false;

        for &member in members {
            self.model.remove_child(member);
            if !self.interval(member).is_sequential() {
                match self.content_span(member) {
                    Some(span) if span.start >= unit.extent.end => afters.push(member),
                    _ => befores.push(member),
                }
                continue;
            }
            let children = self.model.children(member).to_vec();
            let is_before = |b: &Self, c: IntervalId| {
                !b.is_gap(c) && b.content_span(c).is_some_and(|s| s.end <= unit.extent.start)
            };
            let is_after = |b: &Self, c: IntervalId| {
                !b.is_gap(c) && b.content_span(c).is_some_and(|s| s.start >= unit.extent.end)
            };
            let last_before = children.iter().rposition(|&c| is_before(self, c));
            let first_after = children.iter().position(|&c| is_after(self, c));

            let before_part: Vec<IntervalId> = last_before
                .map(|k| children[..=k].to_vec())
                .unwrap_or_default();
            let after_part: Vec<IntervalId> = first_after
                .map(|j| children[j..].to_vec())
                .unwrap_or_default();
            let dropped: Vec<IntervalId> = children
                .iter()
                .copied()
                .filter(|c| !before_part.contains(c) && !after_part.contains(c))
                .collect();
            if first_after.is_none() {
                had_trailing_resizing |= dropped
                    .iter()
                    .any(|&g| self.is_gap(g) && self.interval(g).size.is_resizing());
            }
            for gap in dropped {
                self.model.delete_subtree(gap);
            }
            for (part, out) in [(before_part, &mut befores), (after_part, &mut afters)] {
                if part.is_empty() {
                    continue;
                }
                let seq = self.model.insert_interval(Interval::sequential());
                for c in part {
                    self.model.remove_child(c);
                    self.model.add_child(seq, c, None);
                }
                out.push(seq);
            }
            self.model.delete_subtree(member);
        }

        let before = self.parallel_part(&befores);
        let after = self.parallel_part(&afters);
        let seq = self.model.insert_interval(Interval::sequential());
        self.model.add_child(group, seq, None);
        if let Some(before) = before {
            self.model.add_child(seq, before, None);
            if let Some(span) = self.content_span(before) {
                if span.end < unit.extent.start {
                    let between = Extent::new(span.end, unit.extent.start);
                    let gap = self.new_gap(between, SizeDef::fixed(between.size()));
                    self.model.add_child(seq, gap, None);
                }
            }
        }
        self.model.add_child(seq, unit.interval, None);
        if let Some(after) = after {
            if let Some(span) = self.content_span(after) {
                if span.start > unit.extent.end {
                    let between = Extent::new(unit.extent.end, span.start);
                    let gap = self.new_gap(between, SizeDef::fixed(between.size()));
                    self.model.add_child(seq, gap, None);
                }
            }
            self.model.add_child(seq, after, None);
        } else if had_trailing_resizing {
            let end = group_span.map_or(unit.extent.end, |s| s.end.max(unit.extent.end));
            let gap = self.new_gap(
                Extent::new(unit.extent.end, end),
                SizeDef::resizing(Length::Px(0)),
            );
            self.model.add_child(seq, gap, None);
        }
    }

    fn parallel_part(&mut self, parts: &[IntervalId]) -> Option<IntervalId> {
        match parts {
            [] => None,
            [only] => Some(*only),
            _ => {
                let group = self
                    .model
                    .insert_interval(Interval::parallel(Alignment::Leading));
                for &p in parts {
                    self.model.add_child(group, p, None);
                }
                Some(group)
            }
        }
    }

    /// A sequence with resizable content does not also need resizing gaps
    fn resolve_resizing_conflict(&mut self, unit: &Unit) {
        if !unit.resizing {
            return;
        }
        let Some(seq) = self.model.parent(unit.interval) else {
            return;
        };
        if !self.interval(seq).is_sequential() {
            return;
        }
        for gap in self.model.children(seq).to_vec() {
            if self.is_gap(gap) && self.interval(gap).size.is_resizing() {
                let size = self.extents.get(gap).map_or(0, |e| e.size());
                self.model.interval_mut(gap).size = SizeDef::fixed(size);
            }
        }
    }

    // ========================================================================
    // Refitting gaps to positions
    // ========================================================================

    fn refit_roots(&mut self, roots: &[IntervalId]) {
        for &root in roots {
            if self.model.get_interval(root).is_none() {
                continue;
            }
            self.normalize(root);
            if let Some(space) = self.container_space(root) {
                self.place(root, space);
                self.settle_gaps(root);
            }
            self.drop_empty_gaps(root);
            self.normalize(root);
        }
    }

    fn place(&mut self, id: IntervalId, space: Extent) {
        if self.interval(id).is_sequential() {
            self.place_sequence(id, space);
        } else if self.interval(id).is_parallel() {
            self.place_parallel(id, space);
        }
    }

    fn place_parallel(&mut self, group: IntervalId, space: Extent) {
        self.extents.insert(group, space);
        let by_baseline = self.axis == Axis::Vertical
            && self.interval(group).group_alignment() == Some(Alignment::Baseline);
        for child in self.model.children(group).to_vec() {
            let interval = self.interval(child);
            if interval.is_gap() {
                continue;
            }
            if interval.is_sequential() {
                self.place_sequence(child, space);
                continue;
            }
            let Some(span) = self.natural_span(child) else {
                continue;
            };
            let alignment = self.model.effective_alignment(child);
            if by_baseline && alignment == Alignment::Baseline {
                self.place(child, span);
                continue;
            }
            let offset = match alignment {
                Alignment::Leading | Alignment::Baseline if span.start > space.start => {
                    Some(Alignment::Leading)
                }
                Alignment::Trailing if span.end < space.end => Some(Alignment::Trailing),
                _ => None,
            };
            match offset {
                Some(side) => {
                    let seq = self.model.insert_interval(Interval::sequential());
                    let own = self.interval(child).alignment;
                    self.model.replace_child(child, seq);
                    self.model.interval_mut(seq).alignment = own;
                    self.model.interval_mut(child).alignment = None;
                    if side == Alignment::Leading {
                        let gap = self.new_gap(
                            Extent::new(space.start, span.start),
                            SizeDef::fixed(span.start - space.start),
                        );
                        self.model.add_child(seq, gap, None);
                        self.model.add_child(seq, child, None);
                    } else {
                        self.model.add_child(seq, child, None);
                        let gap = self.new_gap(
                            Extent::new(span.end, space.end),
                            SizeDef::fixed(space.end - span.end),
                        );
                        self.model.add_child(seq, gap, None);
                    }
                    self.place_sequence(seq, space);
                }
                None => self.place(child, span),
            }
        }
    }

    fn place_sequence(&mut self, seq: IntervalId, space: Extent) {
        self.extents.insert(seq, space);
        let alignment = self.model.effective_alignment(seq);
        self.fill_missing_gaps(seq, space, alignment);

        let children = self.model.children(seq).to_vec();
        let mut cursor = space.start;
        for (i, &child) in children.iter().enumerate() {
            if self.is_gap(child) {
                let next_content = children[i + 1..]
                    .iter()
                    .find(|&&c| !self.is_gap(c))
                    .and_then(|&c| self.natural_span(c));
                let end = match next_content {
                    Some(span) => span.start,
                    None => self.trailing_gap_end(child, cursor, space, alignment),
                };
                let end = self.checked_end(cursor, end);
                self.extents.insert(child, Extent::new(cursor, end));
                cursor = end;
            } else {
                let span = self
                    .natural_span(child)
                    .unwrap_or(Extent::new(cursor, cursor));
                let start = self.checked_end(cursor, span.start);
                let end = span.end.max(start);
                self.place(child, Extent::new(start, end));
                cursor = end;
            }
        }
    }

    /// Insert gaps wherever content does not touch its neighbour, and at the
    /// aligned edge of the sequence
    fn fill_missing_gaps(&mut self, seq: IntervalId, space: Extent, alignment: Alignment) {
        let mut i = 0;
        while i + 1 < self.model.children(seq).len() {
            let a = self.model.children(seq)[i];
            let b = self.model.children(seq)[i + 1];
            if !self.is_gap(a) && !self.is_gap(b) {
                if let (Some(x), Some(y)) = (self.natural_span(a), self.natural_span(b)) {
                    if y.start > x.end {
                        let gap = self.new_gap(Extent::new(x.end, y.start), SizeDef::fixed(y.start - x.end));
                        self.model.add_child(seq, gap, Some(i + 1));
                    }
                }
            }
            i += 1;
        }

        let children = self.model.children(seq).to_vec();
        if alignment == Alignment::Trailing {
            if let Some(&last) = children.last() {
                if !self.is_gap(last) {
                    if let Some(span) = self.natural_span(last) {
                        if span.end < space.end {
                            let gap = self.new_gap(
                                Extent::new(span.end, space.end),
                                SizeDef::fixed(space.end - span.end),
                            );
                            self.model.add_child(seq, gap, None);
                        }
                    }
                }
            }
        } else if alignment != Alignment::Center {
            if let Some(&first) = children.first() {
                if !self.is_gap(first) {
                    if let Some(span) = self.natural_span(first) {
                        if span.start > space.start {
                            let gap = self.new_gap(
                                Extent::new(space.start, span.start),
                                SizeDef::fixed(span.start - space.start),
                            );
                            self.model.add_child(seq, gap, Some(0));
                        }
                    }
                }
            }
        }
    }

    fn trailing_gap_end(&self, gap: IntervalId, cursor: i32, space: Extent, alignment: Alignment) -> i32 {
        if self.interval(gap).size.is_resizing() || alignment == Alignment::Trailing {
            return space.end;
        }
        let stored = self.extents.get(gap).map_or(0, |e| e.size().max(0));
        (cursor + stored).min(space.end)
    }

    /// Positions inside a sequence never go backwards
    fn checked_end(&self, cursor: i32, end: i32) -> i32 {
        if end < cursor {
            warn!(
                axis = ?self.axis,
                overlap = cursor - end,
                "negative space in sequence, clamping to zero"
            );
            debug_assert!(end >= cursor, "negative space in sequence");
            cursor
        } else {
            end
        }
    }

    /// Update gap sizes to the refitted extents. Gaps that already resolve
    /// to the right size keep their definition.
    fn settle_gaps(&mut self, root: IntervalId) {
        let mut updates = Vec::new();
        {
            let mut sizer = Sizer::new(&self.model, self.metrics, self.config, self.axis);
            for id in self.model.descendants(root) {
                let interval = self.model.interval(id);
                if !interval.is_gap() {
                    continue;
                }
                let Some(extent) = self.extents.get(id) else {
                    continue;
                };
                let desired = extent.size().max(0);
                let def = interval.size;
                let resolved = sizer.sizes(id).pref;
                if def.is_resizing() {
                    if desired < resolved {
                        updates.push((id, SizeDef { pref: Length::Px(desired), ..def }));
                    }
                } else if desired != resolved {
                    updates.push((id, SizeDef::fixed(desired)));
                }
            }
        }
        for (id, size) in updates {
            self.model.interval_mut(id).size = size;
        }
    }

    fn drop_empty_gaps(&mut self, root: IntervalId) {
        if self.model.get_interval(root).is_none() {
            return;
        }
        for id in self.model.descendants(root) {
            let interval = self.model.interval(id);
            if interval.is_gap() && interval.size == SizeDef::fixed(0) {
                self.model.delete_subtree(id);
            }
        }
    }

    /// Turn the gap on the snapped side of the unit into a default padding
    /// when the snapped distance is exactly that padding
    fn apply_snapped_gap(&mut self, unit: &Unit, position: &PositionDef) {
        let (side, kind) = match &position.kind {
            PositionKind::NextTo { padding, .. } => (position.edge, *padding),
            PositionKind::Indented { .. } => (Alignment::Leading, PaddingKind::Indent),
            _ => return,
        };
        let Some(gap) = self.adjacent_gap(unit.interval, side) else {
            return;
        };
        let desired = self.extents.get(gap).map_or(-1, |e| e.size());
        if desired != position.padding_size {
            return;
        }
        let previous = self.interval(gap).clone();
        {
            let interval = self.model.interval_mut(gap);
            interval.kind = IntervalKind::Gap(kind);
            interval.size = if previous.size.is_resizing() {
                SizeDef::resizing(Length::Default)
            } else {
                SizeDef::DEFAULT
            };
        }
        if self.sizer().default_gap(gap) != desired {
            *self.model.interval_mut(gap) = previous;
        }
    }

    fn adjacent_gap(&self, id: IntervalId, side: Alignment) -> Option<IntervalId> {
        let mut current = id;
        loop {
            let parent = self.model.parent(current)?;
            if self.interval(parent).is_sequential() {
                let children = self.model.children(parent);
                let index = children.iter().position(|&c| c == current)?;
                let sibling = match side {
                    Alignment::Trailing => children.get(index + 1).copied(),
                    _ => index.checked_sub(1).map(|i| children[i]),
                };
                if let Some(sibling) = sibling {
                    return self.is_gap(sibling).then_some(sibling);
                }
            } else {
                let own = self.extents.get(current)?;
                let group = self.extents.get(parent)?;
                if own.edge(side) != group.edge(side) {
                    return None;
                }
            }
            current = parent;
        }
    }

    // ========================================================================
    // Structural commands
    // ========================================================================

    fn align(&mut self, ids: &[String], closed: bool, alignment: Alignment) -> Result<(), DesignError> {
        let axis = self.axis;
        let mut intervals = Vec::with_capacity(ids.len());
        let mut extents = Vec::with_capacity(ids.len());
        for id in ids {
            let interval = self
                .model
                .component_interval(id, axis)
                .ok_or_else(|| DesignError::unknown_component(id.clone(), Vec::new()))?;
            let extent = self
                .layout
                .extent(interval, axis)
                .filter(|_| self.model.parent(interval).is_some())
                .ok_or_else(|| DesignError::invalid_target(id.clone(), "component is not positioned"))?;
            intervals.push(interval);
            extents.push(extent);
        }
        let Some(&first) = intervals.first() else {
            return Err(DesignError::EmptySelection);
        };
        let root = self.model.tree_root(first);
        let space = self
            .container_space(root)
            .ok_or_else(|| DesignError::invalid_structure("container is not positioned"))?;
        let union = extents
            .iter()
            .copied()
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        // a centered group has no free side to bring a row along
        let closed = closed || alignment == Alignment::Center;
        let members: Vec<IntervalId> = if closed {
            intervals.clone()
        } else {
            let chains: Vec<Vec<IntervalId>> = intervals
                .iter()
                .map(|&i| self.chain(i, alignment, &intervals))
                .collect();
            chains.iter().map(|chain| self.wrap_chain(chain)).collect()
        };

        let mut roots = vec![root];
        for &member in &members {
            push_unique(&mut roots, self.model.tree_root(member));
            self.remove(member);
        }
        for &root in &roots {
            self.normalize(root);
        }
        for (&interval, &extent) in intervals.iter().zip(&extents) {
            self.extents
                .insert(interval, aligned_extent(extent, union, alignment));
        }

        let group = self.model.insert_interval(Interval::parallel(alignment));
        for &member in &members {
            self.model.interval_mut(member).alignment = None;
            self.model.add_child(group, member, None);
        }
        let extent = members
            .iter()
            .filter_map(|&m| self.natural_span(m))
            .reduce(|a, b| a.union(&b))
            .unwrap_or(union);
        self.extents.insert(group, extent);
        let components = self.model.components_in(group);
        let orthogonal = components
            .iter()
            .filter_map(|c| self.layout.bounds(c))
            .map(|b| b.extent(axis.other()))
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let unit = Unit {
            interval: group,
            extent,
            orthogonal,
            resizing: members.iter().any(|&m| self.model.wants_resize(m)),
            components,
        };

        let position = PositionDef::free();
        let inclusion = self.locate(root, &unit, &position);
        debug!(?axis, ?inclusion, components = ?unit.components, "aligning");
        self.include(&inclusion, &unit, &position, space);
        self.refit_roots(&roots);
        Ok(())
    }

    /// A component and the rest of its row on the side away from the aligned
    /// edge, up to the next aligned component
    fn chain(&self, interval: IntervalId, alignment: Alignment, aligned: &[IntervalId]) -> Vec<IntervalId> {
        let Some(seq) = self
            .model
            .parent(interval)
            .filter(|&p| self.interval(p).is_sequential())
        else {
            return vec![interval];
        };
        let children = self.model.children(seq);
        let index = children.iter().position(|&c| c == interval).unwrap_or(0);
        let mut chain = vec![interval];
        if alignment == Alignment::Trailing {
            for &c in children[..index].iter().rev() {
                if aligned.contains(&c) {
                    break;
                }
                chain.insert(0, c);
            }
        } else {
            for &c in &children[index + 1..] {
                if aligned.contains(&c) {
                    break;
                }
                chain.push(c);
            }
        }
        chain
    }

    /// Move the consecutive sequence children of `chain` into a nested sequence
    fn wrap_chain(&mut self, chain: &[IntervalId]) -> IntervalId {
        let first = chain[0];
        let Some(parent) = self.model.parent(first).filter(|_| chain.len() > 1) else {
            return first;
        };
        let index = self.model.index_in_parent(first);
        let seq = self.model.insert_interval(Interval::sequential());
        let extent = chain
            .iter()
            .filter_map(|c| self.extents.get(*c).copied())
            .reduce(|a, b| a.union(&b));
        for &c in chain {
            self.model.remove_child(c);
            self.model.add_child(seq, c, None);
        }
        self.model.add_child(parent, seq, index);
        if let Some(extent) = extent {
            self.extents.insert(seq, extent);
        }
        seq
    }

    fn set_resizing(&mut self, interval: IntervalId, resizing: bool) {
        if self.model.parent(interval).is_none() {
            return;
        }
        let root = self.model.tree_root(interval);
        let current = self.extents.get(interval).map(Extent::size);
        let intrinsic = self
            .interval(interval)
            .component_id()
            .map(str::to_string)
            .map(|id| self.sizer().intrinsic(&id).1);
        let pref = match current {
            Some(size) if Some(size) != intrinsic => Length::Px(size),
            _ => Length::Default,
        };
        self.model.interval_mut(interval).size = SizeDef {
            min: Length::Default,
            pref,
            max: if resizing {
                Length::Unbounded
            } else {
                Length::Default
            },
        };

        if resizing {
            // the gaps on the way up stop growing and the component fills
            // every group it is in
            let mut node = interval;
            while let Some(parent) = self.model.parent(node) {
                if self.interval(parent).is_sequential() {
                    for gap in self.model.children(parent).to_vec() {
                        if self.is_gap(gap) && self.interval(gap).size.is_resizing() {
                            let size = self.extents.get(gap).map_or(0, |e| e.size().max(0));
                            self.model.interval_mut(gap).size = SizeDef::fixed(size);
                        }
                    }
                } else if self.interval(parent).group_alignment() != Some(Alignment::Baseline) {
                    self.stretch_in_group(node, parent);
                }
                if self.interval(parent).size.is_suppressed() {
                    self.model.interval_mut(parent).size.max = Length::Default;
                }
                node = parent;
            }
        } else if let Some(seq) = self
            .model
            .parent(interval)
            .filter(|&p| self.interval(p).is_sequential())
        {
            if !self.model.wants_resize(seq) {
                self.release_edge_gap(seq);
            }
        }
        self.refit_roots(&[root]);
    }

    /// Wrap `node` in a sequence whose fixed gaps make it span all of `group`
    fn stretch_in_group(&mut self, node: IntervalId, group: IntervalId) {
        let (Some(space), Some(span)) = (self.extents.get(group).copied(), self.natural_span(node)) else {
            return;
        };
        if span.start <= space.start && span.end >= space.end {
            return;
        }
        let seq = self.model.insert_interval(Interval::sequential());
        let own = self.interval(node).alignment;
        self.model.replace_child(node, seq);
        self.model.interval_mut(seq).alignment = own;
        self.model.interval_mut(node).alignment = None;
        if span.start > space.start {
            let lead = Extent::new(space.start, span.start);
            let gap = self.new_gap(lead, SizeDef::fixed(lead.size()));
            self.model.add_child(seq, gap, None);
        }
        self.model.add_child(seq, node, None);
        if span.end < space.end {
            let trail = Extent::new(span.end, space.end);
            let gap = self.new_gap(trail, SizeDef::fixed(trail.size()));
            self.model.add_child(seq, gap, None);
        }
        self.extents.insert(seq, space);
    }

    /// Let a sequence that no longer grows float on the side away from its
    /// alignment
    fn release_edge_gap(&mut self, seq: IntervalId) {
        let trailing = self.model.effective_alignment(seq) == Alignment::Trailing;
        let children = self.model.children(seq);
        let edge = if trailing {
            children.first().copied()
        } else {
            children.last().copied()
        };
        if let Some(gap) = edge.filter(|&g| self.is_gap(g)) {
            let pref = self.interval(gap).size.pref;
            self.model.interval_mut(gap).size = SizeDef::resizing(pref);
            return;
        }
        let at_root = self
            .model
            .parent(seq)
            .is_some_and(|p| self.model.parent(p).is_none());
        let (Some(space), Some(span)) = (self.extents.get(seq).copied(), self.content_span(seq)) else {
            return;
        };
        if !at_root {
            return;
        }
        if trailing {
            let gap = self.new_gap(Extent::new(space.start, span.start), SizeDef::resizing(Length::Px(0)));
            self.model.add_child(seq, gap, Some(0));
        } else {
            let gap = self.new_gap(Extent::new(span.end, space.end), SizeDef::resizing(Length::Px(0)));
            self.model.add_child(seq, gap, None);
        }
    }

    fn adjust_alignment(&mut self, interval: IntervalId, alignment: Alignment) {
        if self.model.parent(interval).is_none() {
            return;
        }
        let root = self.model.tree_root(interval);

        // inside a group that does not grow the whole group moves
        let mut node = interval;
        let mut up = self.model.parent(interval);
        while let Some(p) = up {
            if self.interval(p).size.is_suppressed() {
                node = p;
            }
            up = self.model.parent(p);
        }
        if self.model.wants_resize(node) {
            return;
        }

        while let Some(parent) = self.model.parent(node) {
            if self.interval(parent).is_parallel() {
                if self.model.wants_resize(parent) {
                    if self.model.effective_alignment(node) != alignment {
                        let inherited = self.interval(parent).group_alignment() == Some(alignment);
                        self.model.interval_mut(node).alignment = (!inherited).then_some(alignment);
                    }
                    break;
                }
            } else if self.anchor_in_sequence(node, parent, alignment) {
                break;
            }
            node = parent;
        }
        self.refit_roots(&[root]);
    }

    /// Fix the growing gaps between `node` and the `alignment` edge of `seq`
    /// and let the other side grow instead. Returns `true` once the anchor
    /// is settled.
    fn anchor_in_sequence(&mut self, node: IntervalId, seq: IntervalId, alignment: Alignment) -> bool {
        let children = self.model.children(seq).to_vec();
        let index = children.iter().position(|&c| c == node).unwrap_or(0);
        let mut was_resizing = false;
        let mut other_side_grows = false;
        for (i, &child) in children.iter().enumerate() {
            if i == index || !self.model.wants_resize(child) {
                continue;
            }
            let anchored_side = (i < index) == (alignment == Alignment::Leading);
            if !anchored_side {
                other_side_grows = true;
            } else if self.is_gap(child) {
                let size = self.extents.get(child).map_or(0, |e| e.size().max(0));
                self.model.interval_mut(child).size = SizeDef::fixed(size);
                was_resizing = true;
            }
        }

        let parent_grows = self
            .model
            .parent(seq)
            .is_some_and(|p| self.model.wants_resize(p));
        let needs_anchor = was_resizing || (!self.model.wants_resize(seq) && parent_grows);
        if other_side_grows || self.model.effective_alignment(seq) == alignment || !needs_anchor {
            return false;
        }

        let inherited = self
            .model
            .parent(seq)
            .and_then(|p| self.interval(p).group_alignment())
            == Some(alignment);
        self.model.interval_mut(seq).alignment = (!inherited).then_some(alignment);
        let neighbour = if alignment == Alignment::Leading {
            children.get(index + 1).copied()
        } else {
            index.checked_sub(1).map(|i| children[i])
        };
        match neighbour.filter(|&c| self.is_gap(c)) {
            Some(gap) => {
                let pref = self.interval(gap).size.pref;
                self.model.interval_mut(gap).size = SizeDef::resizing(pref);
            }
            None => {
                let edge = self
                    .extents
                    .get(node)
                    .map_or(0, |e| e.edge(alignment.opposite()));
                let gap = self.new_gap(Extent::new(edge, edge), SizeDef::resizing(Length::Px(0)));
                let at = if alignment == Alignment::Leading { index + 1 } else { index };
                self.model.add_child(seq, gap, Some(at));
            }
        }
        true
    }
}
