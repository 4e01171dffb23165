//! Snapping and positioning
//!
//! For each axis independently, enumerates the places the dragged edge(s)
//! could snap to (next to a sibling at a preferred padding, aligned with a
//! sibling edge, indented under a sibling, on a sibling baseline, or at the
//! container border), keeps those strictly within the snap distance and
//! picks the best one. Baselines beat edges and edges beat the border;
//! within one priority the smaller offset wins.
//!
//! Nothing here touches the model: the same inputs always produce the same
//! positions.

use tracing::trace;

use crate::metrics::MetricsProvider;
use crate::model::{Alignment, Axis, Bounds, Extent, LayoutModel, PaddingKind, ResizeEdge};

use super::bounds::{padding, parent_padding, ComputedLayout};
use super::config::DesignerConfig;

/// What a snapped edge was snapped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapTarget {
    Component(String),
    Border,
}

/// Kind of position chosen on one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionKind {
    /// Not snapped
    Free,
    /// At a preferred padding from a component or the container border
    NextTo {
        target: SnapTarget,
        padding: PaddingKind,
    },
    /// Edge aligned with the same edge of a component
    Aligned {
        target: String,
        alignment: Alignment,
    },
    /// Leading edge indented relative to a component above or below
    Indented { target: String },
    /// Baseline aligned with a component's baseline
    Baseline { target: String },
}

/// Snapping decision for one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDef {
    pub kind: PositionKind,
    /// Edge of the dragged extent that was snapped
    pub edge: Alignment,
    /// Offset applied to the raw position
    pub distance: i32,
    /// Padding the snapped distance corresponds to, if any
    pub padding_size: i32,
}

impl PositionDef {
    pub fn free() -> Self {
        Self {
            kind: PositionKind::Free,
            edge: Alignment::Leading,
            distance: 0,
            padding_size: 0,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.kind != PositionKind::Free
    }

    /// Component this position refers to, if any
    pub fn target_component(&self) -> Option<&str> {
        match &self.kind {
            PositionKind::NextTo {
                target: SnapTarget::Component(id),
                ..
            }
            | PositionKind::Aligned { target: id, .. }
            | PositionKind::Indented { target: id }
            | PositionKind::Baseline { target: id } => Some(id),
            _ => None,
        }
    }

    fn priority(&self) -> u8 {
        match &self.kind {
            PositionKind::Baseline { .. } => 0,
            PositionKind::NextTo {
                target: SnapTarget::Border,
                ..
            } => 2,
            PositionKind::Free => 3,
            _ => 1,
        }
    }

    fn rank(&self) -> u8 {
        match &self.kind {
            PositionKind::Aligned { .. } => 0,
            PositionKind::Indented { .. } => 1,
            _ => 2,
        }
    }
}

/// Input of [`find_positions`]
#[derive(Debug, Clone)]
pub struct SnapRequest<'a> {
    /// Container the components are dragged over
    pub container: &'a str,
    /// Dragged components with their raw bounds
    pub items: &'a [(String, Bounds)],
    /// Dragged edges when resizing, `None` when moving
    pub resize_edges: Option<[ResizeEdge; 2]>,
}

impl SnapRequest<'_> {
    fn union(&self) -> Bounds {
        let mut iter = self.items.iter().map(|(_, b)| *b);
        let first = iter.next().unwrap_or_default();
        iter.fold(first, |acc, b| acc.union(&b))
    }

    fn is_moving(&self, id: &str) -> bool {
        self.items.iter().any(|(item, _)| item == id)
    }

    /// Dragged components whose `edge` lies on the edge of the whole selection
    fn edge_items(&self, axis: Axis, edge: Alignment, union: &Bounds) -> Vec<&str> {
        let at = union.edge(axis, edge);
        self.items
            .iter()
            .filter(|(_, b)| b.edge(axis, edge) == at)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// A positioned sibling in the target container
struct Sibling<'a> {
    id: &'a str,
    bounds: Bounds,
}

/// Compute the snap position for both axes
pub fn find_positions(
    model: &LayoutModel,
    layout: &ComputedLayout,
    metrics: &dyn MetricsProvider,
    config: &DesignerConfig,
    request: &SnapRequest<'_>,
) -> [PositionDef; 2] {
    let siblings: Vec<Sibling<'_>> = model
        .sub_components(request.container)
        .filter(|id| !request.is_moving(id))
        .filter_map(|id| layout.bounds(id).map(|bounds| Sibling { id, bounds }))
        .collect();
    let container = layout.bounds(request.container);
    let union = request.union();

    Axis::ALL.map(|axis| {
        let edges: Vec<Alignment> = match request.resize_edges {
            None => vec![Alignment::Leading, Alignment::Trailing],
            Some(edges) => edges[axis.index()].alignment().into_iter().collect(),
        };
        let mut candidates = Vec::new();
        for &edge in &edges {
            let ctx = AxisContext {
                metrics,
                config,
                request,
                axis,
                edge,
                union,
                moving: request.edge_items(axis, edge, &union),
            };
            ctx.component_candidates(&siblings, &mut candidates);
            if let Some(container_bounds) = container {
                ctx.border_candidate(container_bounds, &mut candidates);
            }
        }
        if axis == Axis::Vertical && request.resize_edges.is_none() {
            baseline_candidates(metrics, request, &siblings, union, &mut candidates);
        }

        let best = candidates
            .into_iter()
            .filter(|c| c.distance.abs() < config.snap_distance)
            .enumerate()
            .min_by_key(|(index, c)| (c.priority(), c.distance.abs(), c.rank(), *index))
            .map(|(_, c)| c);
        trace!(?axis, ?best, "snap position");
        best.unwrap_or_else(PositionDef::free)
    })
}

struct AxisContext<'a> {
    metrics: &'a dyn MetricsProvider,
    config: &'a DesignerConfig,
    request: &'a SnapRequest<'a>,
    axis: Axis,
    edge: Alignment,
    union: Bounds,
    moving: Vec<&'a str>,
}

impl AxisContext<'_> {
    fn extent(&self) -> Extent {
        self.union.extent(self.axis)
    }

    fn orthogonal(&self) -> Extent {
        self.union.extent(self.axis.other())
    }

    fn max_padding(&self, target: &str, side: Alignment, kind: PaddingKind) -> i32 {
        self.moving
            .iter()
            .map(|m| {
                padding(
                    self.metrics,
                    self.config,
                    target,
                    m,
                    self.axis,
                    side,
                    kind,
                )
            })
            .max()
            .unwrap_or_else(|| self.config.paddings.for_kind(kind))
    }

    fn component_candidates(&self, siblings: &[Sibling<'_>], out: &mut Vec<PositionDef>) {
        let extent = self.extent();
        let orthogonal = self.orthogonal();
        let position = extent.edge(self.edge);
        for sibling in siblings {
            let other = sibling.bounds.extent(self.axis);
            let other_orthogonal = sibling.bounds.extent(self.axis.other());

            if other_orthogonal.overlaps_within(&orthogonal, self.config.orthogonal_distance) {
                // our trailing edge before their leading edge, or our leading
                // edge after their trailing edge
                let side = self.edge.opposite();
                for kind in PaddingKind::SNAP_ORDER {
                    let pad = self.max_padding(sibling.id, side, kind);
                    let target = match self.edge {
                        Alignment::Trailing => other.start - pad,
                        _ => other.end + pad,
                    };
                    out.push(PositionDef {
                        kind: PositionKind::NextTo {
                            target: SnapTarget::Component(sibling.id.to_string()),
                            padding: kind,
                        },
                        edge: self.edge,
                        distance: target - position,
                        padding_size: pad,
                    });
                }
            }

            if !other_orthogonal.overlaps(&orthogonal) {
                out.push(PositionDef {
                    kind: PositionKind::Aligned {
                        target: sibling.id.to_string(),
                        alignment: self.edge,
                    },
                    edge: self.edge,
                    distance: other.edge(self.edge) - position,
                    padding_size: 0,
                });
                if self.axis == Axis::Horizontal && self.edge == Alignment::Leading {
                    let pad = self.max_padding(sibling.id, Alignment::Leading, PaddingKind::Indent);
                    out.push(PositionDef {
                        kind: PositionKind::Indented {
                            target: sibling.id.to_string(),
                        },
                        edge: Alignment::Leading,
                        distance: other.start + pad - position,
                        padding_size: pad,
                    });
                }
            }
        }
    }

    fn border_candidate(&self, container: Bounds, out: &mut Vec<PositionDef>) {
        let border = container.extent(self.axis);
        let position = self.extent().edge(self.edge);
        let pad = self
            .moving
            .iter()
            .map(|m| {
                parent_padding(
                    self.metrics,
                    self.config,
                    self.request.container,
                    m,
                    self.axis,
                    self.edge,
                )
            })
            .max()
            .unwrap_or(self.config.paddings.container);
        let target = match self.edge {
            Alignment::Trailing => border.end - pad,
            _ => border.start + pad,
        };
        out.push(PositionDef {
            kind: PositionKind::NextTo {
                target: SnapTarget::Border,
                padding: PaddingKind::Related,
            },
            edge: self.edge,
            distance: target - position,
            padding_size: pad,
        });
    }
}

/// Baseline candidates for a single dragged component beside a sibling
fn baseline_candidates(
    metrics: &dyn MetricsProvider,
    request: &SnapRequest<'_>,
    siblings: &[Sibling<'_>],
    union: Bounds,
    out: &mut Vec<PositionDef>,
) {
    let [(id, bounds)] = request.items else {
        return;
    };
    let Some(own) = metrics.baseline(id, bounds.width, bounds.height) else {
        return;
    };
    let horizontal = union.extent(Axis::Horizontal);
    for sibling in siblings {
        if sibling.bounds.extent(Axis::Horizontal).overlaps(&horizontal) {
            continue;
        }
        let Some(theirs) = metrics.baseline(sibling.id, sibling.bounds.width, sibling.bounds.height)
        else {
            continue;
        };
        let target = sibling.bounds.y + theirs - own;
        out.push(PositionDef {
            kind: PositionKind::Baseline {
                target: sibling.id.to_string(),
            },
            edge: Alignment::Baseline,
            distance: target - bounds.y,
            padding_size: 0,
        });
    }
}

/// Apply snapped offsets to the raw bounds of the dragged components
pub fn apply_positions(
    items: &[(String, Bounds)],
    positions: &[PositionDef; 2],
    resize_edges: Option<[ResizeEdge; 2]>,
) -> Vec<(String, Bounds)> {
    items
        .iter()
        .map(|(id, bounds)| {
            let mut b = *bounds;
            for axis in Axis::ALL {
                let d = positions[axis.index()].distance;
                if d == 0 {
                    continue;
                }
                let extent = b.extent(axis);
                let moved = match resize_edges.map(|e| e[axis.index()]) {
                    None => Extent::new(extent.start + d, extent.end + d),
                    Some(ResizeEdge::Leading) => {
                        Extent::new((extent.start + d).min(extent.end), extent.end)
                    }
                    Some(ResizeEdge::Trailing) => {
                        Extent::new(extent.start, (extent.end + d).max(extent.start))
                    }
                    Some(ResizeEdge::None) => extent,
                };
                b = b.with_extent(axis, moved);
            }
            (id.clone(), b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::bounds::compute;
    use crate::metrics::TableMetrics;
    use crate::model::{Interval, Length, SizeDef};

    /// Form [300 x 200] with `anchor` fixed at (50, 40, 60, 20)
    fn setup() -> (LayoutModel, TableMetrics) {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.set_form_size("Form", Some((300, 200)));
        model.add_component("anchor", false);
        model.set_parent("anchor", Some("Form"));
        for (axis, offset) in [(Axis::Horizontal, 50), (Axis::Vertical, 40)] {
            let root = model.root("Form", axis).unwrap();
            let seq = model.insert_interval(Interval::sequential());
            model.add_child(root, seq, None);
            let gap = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::fixed(offset)));
            model.add_child(seq, gap, None);
            let comp = model.component_interval("anchor", axis).unwrap();
            model.add_child(seq, comp, None);
            let trail = model.insert_interval(Interval::gap(
                PaddingKind::Related,
                SizeDef::resizing(Length::Default),
            ));
            model.add_child(seq, trail, None);
        }
        let metrics = TableMetrics::new()
            .with_component("anchor", 60, 20)
            .with_baseline("anchor", 15)
            .with_component("moving", 40, 20)
            .with_baseline("moving", 12);
        (model, metrics)
    }

    fn positions_for(bounds: Bounds) -> [PositionDef; 2] {
        let (model, metrics) = setup();
        let config = DesignerConfig::default();
        let layout = compute(&model, &metrics, &config);
        let items = vec![("moving".to_string(), bounds)];
        let request = SnapRequest {
            container: "Form",
            items: &items,
            resize_edges: None,
        };
        find_positions(&model, &layout, &metrics, &config, &request)
    }

    #[test]
    fn test_next_to_related_padding() {
        // anchor ends at x = 110; related padding 6 puts us at 116
        let [h, _] = positions_for(Bounds::new(119, 43, 40, 20));
        assert_eq!(
            h.kind,
            PositionKind::NextTo {
                target: SnapTarget::Component("anchor".to_string()),
                padding: PaddingKind::Related
            }
        );
        assert_eq!(h.distance, -3);
        assert_eq!(h.padding_size, 6);
    }

    #[test]
    fn test_snap_tolerance_is_strict() {
        // the border padding falls back to 10
        let [h, _] = positions_for(Bounds::new(17, 150, 40, 20));
        assert_eq!(h.distance, -7);
        let [h, _] = positions_for(Bounds::new(18, 150, 40, 20));
        assert!(!h.is_snapped());
    }

    #[test]
    fn test_aligned_below() {
        let [h, v] = positions_for(Bounds::new(52, 90, 40, 20));
        assert_eq!(
            h.kind,
            PositionKind::Aligned {
                target: "anchor".to_string(),
                alignment: Alignment::Leading
            }
        );
        assert_eq!(h.distance, -2);
        assert!(!v.is_snapped());
    }

    #[test]
    fn test_baseline_beats_edge() {
        // anchor baseline at 55; ours at y + 12 snaps to y = 43,
        // the top edge alignment would need y = 40
        let [_, v] = positions_for(Bounds::new(120, 41, 40, 20));
        assert_eq!(
            v.kind,
            PositionKind::Baseline {
                target: "anchor".to_string()
            }
        );
        assert_eq!(v.distance, 2);
    }

    #[test]
    fn test_border_snap() {
        let [h, v] = positions_for(Bounds::new(14, 165, 40, 20));
        assert_eq!(
            h.kind,
            PositionKind::NextTo {
                target: SnapTarget::Border,
                padding: PaddingKind::Related
            }
        );
        assert_eq!(h.distance, -4);
        assert_eq!(v.edge, Alignment::Trailing);
        assert_eq!(v.distance, 5);
    }

    #[test]
    fn test_apply_positions_resizing() {
        let items = vec![("a".to_string(), Bounds::new(10, 10, 50, 20))];
        let mut positions = [PositionDef::free(), PositionDef::free()];
        positions[0].distance = 5;
        let moved = apply_positions(&items, &positions, None);
        assert_eq!(moved[0].1, Bounds::new(15, 10, 50, 20));
        let resized = apply_positions(
            &items,
            &positions,
            Some([ResizeEdge::Trailing, ResizeEdge::None]),
        );
        assert_eq!(resized[0].1, Bounds::new(10, 10, 55, 20));
    }
}
