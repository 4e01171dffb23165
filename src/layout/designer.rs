//! Gesture controller
//!
//! [`LayoutDesigner`] owns the committed model, the metrics provider and the
//! computed layout, and drives one gesture at a time:
//!
//! ```text
//! Idle -> start_adding | start_moving | start_resizing
//!      -> move_to * n           (preview only, model untouched)
//!      -> end_moving(commit)    (builder runs when committing)
//!      -> Idle
//! ```
//!
//! Every committed gesture and structural command is one undo step.

use tracing::{debug, instrument, warn};

use crate::metrics::{MetricsProvider, TableMetrics};
use crate::model::{
    Alignment, Axis, Bounds, Extent, IntervalId, LayoutModel, Length, Placement, Point,
    ResizeEdge, SizeDef,
};

use super::bounds::{compute, ComputedLayout};
use super::builder::{self, CommitRequest, ComponentAnchor, Inclusion, NewComponent};
use super::config::DesignerConfig;
use super::error::DesignError;
use super::find_similar;
use super::lint;
use super::snap::{apply_positions, find_positions, PositionDef, SnapRequest};

/// Outcome of one `move_to` step
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    /// Refined bounds of the dragged components
    pub bounds: Vec<(String, Bounds)>,
    /// Snap decision per axis
    pub positions: [PositionDef; 2],
    /// Where the components would be inserted per axis; `None` when the axis
    /// is left unchanged
    pub inclusions: [Option<Inclusion>; 2],
}

/// Opaque marker of a model state, see [`LayoutDesigner::undo_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeMark {
    depth: usize,
    serial: u64,
}

#[derive(Debug, Clone)]
enum GestureKind {
    Adding { components: Vec<NewComponent> },
    Moving,
    Resizing { edges: [ResizeEdge; 2], in_layout: bool },
}

impl GestureKind {
    fn resize_edges(&self) -> Option<[ResizeEdge; 2]> {
        match self {
            GestureKind::Resizing { edges, .. } => Some(*edges),
            _ => None,
        }
    }
}

/// Result of the last `move_to`, committed by `end_moving(true)`
#[derive(Debug, Clone)]
struct Pending {
    container: String,
    items: Vec<(String, Bounds)>,
    positions: [PositionDef; 2],
}

#[derive(Debug, Clone)]
struct GestureSession {
    kind: GestureKind,
    items: Vec<(String, Bounds)>,
    hotspot: Point,
    /// Container the components come from, or the preferred drop target
    container: Option<String>,
    pending: Option<Pending>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    model: LayoutModel,
    serial: u64,
}

/// Interactive layout designer over one form model
#[derive(Debug)]
pub struct LayoutDesigner<M: MetricsProvider = TableMetrics> {
    model: LayoutModel,
    metrics: M,
    config: DesignerConfig,
    layout: ComputedLayout,
    history: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    serial: u64,
    next_serial: u64,
    session: Option<GestureSession>,
}

impl<M: MetricsProvider> LayoutDesigner<M> {
    pub fn new(model: LayoutModel, metrics: M) -> Self {
        Self::with_config(model, metrics, DesignerConfig::default())
    }

    pub fn with_config(model: LayoutModel, metrics: M, config: DesignerConfig) -> Self {
        let layout = compute(&model, &metrics, &config);
        Self {
            model,
            metrics,
            config,
            layout,
            history: Vec::new(),
            redo: Vec::new(),
            serial: 0,
            next_serial: 1,
            session: None,
        }
    }

    pub fn model(&self) -> &LayoutModel {
        &self.model
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Mutable access to the metrics; call [`update_current_state`] afterwards
    ///
    /// [`update_current_state`]: LayoutDesigner::update_current_state
    pub fn metrics_mut(&mut self) -> &mut M {
        &mut self.metrics
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn layout(&self) -> &ComputedLayout {
        &self.layout
    }

    pub fn is_gesture_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current bounds of a component
    pub fn placement(&self, id: &str) -> Result<Placement, DesignError> {
        self.require_component(id)?;
        Ok(self.layout.placement(id))
    }

    /// Current bounds of a positioned component
    pub fn bounds(&self, id: &str) -> Option<Bounds> {
        self.layout.bounds(id)
    }

    /// Re-read metrics and recompute all bounds
    pub fn update_current_state(&mut self) {
        self.layout = compute(&self.model, &self.metrics, &self.config);
    }

    // ========================================================================
    // Validation helpers
    // ========================================================================

    fn require_component(&self, id: &str) -> Result<(), DesignError> {
        if self.model.contains(id) {
            Ok(())
        } else {
            Err(DesignError::unknown_component(
                id,
                find_similar(self.model.component_ids(), id, 2),
            ))
        }
    }

    fn require_container(&self, id: &str) -> Result<(), DesignError> {
        match self.model.component(id) {
            Some(comp) if comp.is_container() => Ok(()),
            Some(_) => Err(DesignError::NotAContainer { id: id.to_string() }),
            None => Err(DesignError::unknown_container(
                id,
                find_similar(self.model.container_ids(), id, 2),
            )),
        }
    }

    fn require_idle(&self) -> Result<(), DesignError> {
        if self.session.is_some() {
            Err(DesignError::SessionActive)
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Begin dragging new components into a container
    #[instrument(level = "debug", skip(self))]
    pub fn start_adding(
        &mut self,
        components: Vec<NewComponent>,
        bounds: &[Bounds],
        hotspot: Point,
        target: Option<&str>,
    ) -> Result<(), DesignError> {
        self.require_idle()?;
        if components.is_empty() {
            return Err(DesignError::EmptySelection);
        }
        if components.len() != bounds.len() {
            return Err(DesignError::invalid_structure(format!(
                "{} components but {} bounds",
                components.len(),
                bounds.len()
            )));
        }
        for (i, comp) in components.iter().enumerate() {
            if self.model.contains(&comp.id) || components[..i].iter().any(|c| c.id == comp.id) {
                return Err(DesignError::DuplicateComponent { id: comp.id.clone() });
            }
        }
        if let Some(target) = target {
            self.require_container(target)?;
        }
        let items = components
            .iter()
            .map(|c| c.id.clone())
            .zip(bounds.iter().copied())
            .collect();
        self.session = Some(GestureSession {
            kind: GestureKind::Adding { components },
            items,
            hotspot,
            container: target.map(str::to_string),
            pending: None,
        });
        debug!("adding started");
        Ok(())
    }

    /// Begin moving components already placed in one container
    #[instrument(level = "debug", skip(self))]
    pub fn start_moving(
        &mut self,
        ids: &[&str],
        bounds: &[Bounds],
        hotspot: Point,
    ) -> Result<(), DesignError> {
        self.require_idle()?;
        let container = self.gesture_container(ids, bounds)?;
        self.session = Some(GestureSession {
            kind: GestureKind::Moving,
            items: ids
                .iter()
                .map(|id| id.to_string())
                .zip(bounds.iter().copied())
                .collect(),
            hotspot,
            container,
            pending: None,
        });
        debug!("moving started");
        Ok(())
    }

    /// Begin resizing. With `in_layout` false the single id must be a
    /// top-level container, whose design size is changed.
    #[instrument(level = "debug", skip(self))]
    pub fn start_resizing(
        &mut self,
        ids: &[&str],
        bounds: &[Bounds],
        hotspot: Point,
        edges: [ResizeEdge; 2],
        in_layout: bool,
    ) -> Result<(), DesignError> {
        self.require_idle()?;
        let container = if in_layout {
            self.gesture_container(ids, bounds)?
        } else {
            let [id] = ids else {
                return Err(DesignError::invalid_structure(
                    "exactly one container can be resized outside a layout",
                ));
            };
            self.require_container(id)?;
            if self.model.is_in_layout(id) {
                return Err(DesignError::invalid_target(*id, "container is not top-level"));
            }
            if bounds.len() != 1 {
                return Err(DesignError::invalid_structure("expected one bounds"));
            }
            Some(id.to_string())
        };
        self.session = Some(GestureSession {
            kind: GestureKind::Resizing { edges, in_layout },
            items: ids
                .iter()
                .map(|id| id.to_string())
                .zip(bounds.iter().copied())
                .collect(),
            hotspot,
            container,
            pending: None,
        });
        debug!("resizing started");
        Ok(())
    }

    /// Common checks of moved or resized components; returns their container
    fn gesture_container(&self, ids: &[&str], bounds: &[Bounds]) -> Result<Option<String>, DesignError> {
        if ids.is_empty() {
            return Err(DesignError::EmptySelection);
        }
        if ids.len() != bounds.len() {
            return Err(DesignError::invalid_structure(format!(
                "{} components but {} bounds",
                ids.len(),
                bounds.len()
            )));
        }
        let mut parent: Option<Option<String>> = None;
        for id in ids {
            self.require_component(id)?;
            let own = self.model.component(id).and_then(|c| c.parent.clone());
            match &parent {
                None => parent = Some(own),
                Some(p) if *p != own => {
                    return Err(DesignError::MixedParents {
                        ids: ids.iter().map(|s| s.to_string()).collect(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(parent.flatten())
    }

    /// Compute the preview for the cursor at `point`. The committed model is
    /// not modified.
    #[instrument(level = "debug", skip(self))]
    pub fn move_to(
        &mut self,
        point: Point,
        target: Option<&str>,
        auto_positioning: bool,
        lock_dimension: bool,
    ) -> Result<Preview, DesignError> {
        let session = self.session.as_ref().ok_or(DesignError::NoSession)?;
        let mut dx = point.x - session.hotspot.x;
        let mut dy = point.y - session.hotspot.y;
        if lock_dimension {
            if dx.abs() < dy.abs() {
                dx = 0;
            } else {
                dy = 0;
            }
        }
        let resize_edges = session.kind.resize_edges();
        let raw: Vec<(String, Bounds)> = session
            .items
            .iter()
            .map(|(id, b)| (id.clone(), drag_bounds(*b, dx, dy, resize_edges)))
            .collect();

        let container = match (target, &session.kind) {
            (Some(t), GestureKind::Adding { .. } | GestureKind::Moving) => t.to_string(),
            _ => session.container.clone().ok_or_else(|| {
                DesignError::invalid_structure("no target container for the gesture")
            })?,
        };
        if let GestureKind::Resizing {
            in_layout: false, ..
        } = session.kind
        {
            let preview = Preview {
                bounds: raw.clone(),
                positions: [PositionDef::free(), PositionDef::free()],
                inclusions: [None, None],
            };
            self.store_pending(container, raw, preview.positions.clone());
            return Ok(preview);
        }

        self.require_container(&container)?;
        if let Some((id, _)) = raw
            .iter()
            .find(|(id, _)| self.model.is_same_or_ancestor(id, &container))
        {
            return Err(DesignError::invalid_target(
                container.clone(),
                format!("cannot drop '{id}' into itself"),
            ));
        }
        let raw = match self.layout.bounds(&container) {
            Some(area) if resize_edges.is_none() => keep_inside(raw, area),
            _ => raw,
        };

        let snap = SnapRequest {
            container: &container,
            items: &raw,
            resize_edges,
        };
        let positions = if auto_positioning {
            find_positions(&self.model, &self.layout, &self.metrics, &self.config, &snap)
        } else {
            [PositionDef::free(), PositionDef::free()]
        };
        let bounds = apply_positions(&raw, &positions, resize_edges);

        let session = self.session.as_ref().ok_or(DesignError::NoSession)?;
        let additions: &[NewComponent] = match &session.kind {
            GestureKind::Adding { components } => components,
            _ => &[],
        };
        let inclusions = builder::plan(
            &self.model,
            &self.layout,
            &self.metrics,
            &self.config,
            &CommitRequest {
                container: &container,
                items: &bounds,
                additions,
                positions: &positions,
                resize_edges,
            },
        )?;
        let preview = Preview {
            bounds: bounds.clone(),
            positions: positions.clone(),
            inclusions,
        };
        self.store_pending(container, bounds, positions);
        Ok(preview)
    }

    fn store_pending(&mut self, container: String, items: Vec<(String, Bounds)>, positions: [PositionDef; 2]) {
        if let Some(session) = self.session.as_mut() {
            session.pending = Some(Pending {
                container,
                items,
                positions,
            });
        }
    }

    /// Finish the gesture. Returns `true` when the model changed.
    #[instrument(level = "debug", skip(self))]
    pub fn end_moving(&mut self, commit: bool) -> Result<bool, DesignError> {
        let session = self.session.take().ok_or(DesignError::NoSession)?;
        let Some(pending) = session.pending.filter(|_| commit) else {
            debug!("gesture discarded");
            return Ok(false);
        };

        let before = self.model.clone();
        let changed = match &session.kind {
            GestureKind::Resizing {
                in_layout: false, ..
            } => {
                let Some((_, bounds)) = pending.items.first() else {
                    return Ok(false);
                };
                let size = (bounds.width.max(0), bounds.height.max(0));
                let changed = self.model.form_size(&pending.container) != Some(size);
                self.model.set_form_size(&pending.container, Some(size));
                changed
            }
            kind => {
                let additions: &[NewComponent] = match kind {
                    GestureKind::Adding { components } => components,
                    _ => &[],
                };
                let inclusions = builder::commit(
                    &mut self.model,
                    &self.layout,
                    &self.metrics,
                    &self.config,
                    &CommitRequest {
                        container: &pending.container,
                        items: &pending.items,
                        additions,
                        positions: &pending.positions,
                        resize_edges: kind.resize_edges(),
                    },
                )?;
                inclusions.iter().any(Option::is_some)
            }
        };
        if changed {
            self.record(before);
        }
        debug!(changed, "gesture committed");
        Ok(changed)
    }

    // ========================================================================
    // Structural commands
    // ========================================================================

    /// Drop explicit sizes of a component. For a container this also drops
    /// the explicit sizes of its groups and, for a form, its design size.
    #[instrument(level = "debug", skip(self))]
    pub fn set_default_size(&mut self, id: &str) -> Result<(), DesignError> {
        self.require_idle()?;
        self.require_component(id)?;
        let before = self.model.clone();
        for axis in Axis::ALL {
            if let Some(interval) = self.model.component_interval(id, axis) {
                let size = &mut self.model.interval_mut(interval).size;
                let resizing = size.is_resizing();
                *size = SizeDef::DEFAULT;
                if resizing {
                    size.max = Length::Unbounded;
                }
            }
            if let Some(root) = self.model.root(id, axis) {
                for group in self.model.descendants(root) {
                    let interval = self.model.interval_mut(group);
                    if interval.is_group() && matches!(interval.size.pref, Length::Px(_)) {
                        interval.size.min = Length::Default;
                        interval.size.pref = Length::Default;
                    }
                }
            }
        }
        if !self.model.is_in_layout(id) {
            self.model.set_form_size(id, None);
        }
        self.record_if_changed(before);
        Ok(())
    }

    /// Remove a component from its container's layout, keeping the other
    /// components where they are. With `from_model` the component (and
    /// everything nested in it) is deleted entirely.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_component(&mut self, id: &str, from_model: bool) -> Result<(), DesignError> {
        self.require_idle()?;
        self.require_component(id)?;
        let before = self.model.clone();
        let ids = [id.to_string()];
        builder::remove_from_layout(&mut self.model, &self.layout, &self.metrics, &self.config, &ids);
        if from_model {
            self.model.delete_component(id);
        }
        self.record_if_changed(before);
        Ok(())
    }

    /// Set the design size of a top-level container
    #[instrument(level = "debug", skip(self))]
    pub fn resize_container(&mut self, id: &str, width: i32, height: i32) -> Result<(), DesignError> {
        self.require_idle()?;
        self.require_container(id)?;
        if self.model.is_in_layout(id) {
            return Err(DesignError::invalid_target(id, "container is not top-level"));
        }
        let before = self.model.clone();
        self.model
            .set_form_size(id, Some((width.max(0), height.max(0))));
        self.record_if_changed(before);
        Ok(())
    }

    /// Whether `ids` can be lined up by [`align`]: at least two distinct
    /// components placed in the layout of one container
    ///
    /// [`align`]: LayoutDesigner::align
    pub fn can_align(&self, ids: &[&str]) -> bool {
        let mut parent = None;
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) || !self.model.is_in_layout(id) {
                return false;
            }
            let Some(comp) = self.model.component(id) else {
                return false;
            };
            match parent {
                None => parent = comp.parent.as_deref(),
                Some(p) if comp.parent.as_deref() != Some(p) => return false,
                Some(_) => {}
            }
        }
        ids.len() > 1
    }

    /// Line up components at a common edge along `axis`. A closed alignment
    /// groups only the given components; an open one keeps the rest of each
    /// component's row attached on the side away from the aligned edge.
    #[instrument(level = "debug", skip(self))]
    pub fn align(
        &mut self,
        ids: &[&str],
        closed: bool,
        axis: Axis,
        alignment: Alignment,
    ) -> Result<(), DesignError> {
        self.require_idle()?;
        for id in ids {
            self.require_component(id)?;
        }
        if alignment == Alignment::Baseline {
            return Err(DesignError::invalid_structure(
                "baseline alignment comes from snapping, not from align",
            ));
        }
        if !self.can_align(ids) {
            let parents: Vec<Option<&str>> = ids
                .iter()
                .filter_map(|id| self.model.component(id))
                .map(|c| c.parent.as_deref())
                .collect();
            if parents.iter().all(Option::is_some) && parents.windows(2).any(|w| w[0] != w[1]) {
                return Err(DesignError::MixedParents {
                    ids: ids.iter().map(|id| id.to_string()).collect(),
                });
            }
            return Err(DesignError::invalid_target(
                ids.join(", "),
                "need at least two distinct components placed in a layout",
            ));
        }
        let before = self.model.clone();
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        builder::align(
            &mut self.model,
            &self.layout,
            &self.metrics,
            &self.config,
            &ids,
            closed,
            axis,
            alignment,
        )?;
        self.record_if_changed(before);
        Ok(())
    }

    /// Whether a placed component grows with its container along `axis`
    pub fn is_component_resizing(&self, id: &str, axis: Axis) -> Result<bool, DesignError> {
        self.require_component(id)?;
        let Some(interval) = self.placed_interval(id, axis) else {
            return Ok(false);
        };
        Ok(self.model.wants_resize(interval) && self.model.suppressed_ancestor(interval).is_none())
    }

    /// Make a placed component grow with its container along `axis`, or
    /// fix it at its current size
    #[instrument(level = "debug", skip(self))]
    pub fn set_component_resizing(&mut self, id: &str, axis: Axis, resizing: bool) -> Result<(), DesignError> {
        self.require_idle()?;
        self.require_component(id)?;
        if self.placed_interval(id, axis).is_none() {
            return Err(DesignError::invalid_target(id, "component is not in a layout"));
        }
        let before = self.model.clone();
        builder::set_resizing(
            &mut self.model,
            &self.layout,
            &self.metrics,
            &self.config,
            id,
            axis,
            resizing,
        );
        self.record_if_changed(before);
        Ok(())
    }

    /// Container edge a placed component follows along `axis`, and which
    /// edges it could be switched to
    pub fn adjustable_component_alignment(&self, id: &str, axis: Axis) -> Result<ComponentAnchor, DesignError> {
        self.require_component(id)?;
        let interval = self
            .placed_interval(id, axis)
            .ok_or_else(|| DesignError::invalid_target(id, "component is not in a layout"))?;
        Ok(builder::component_anchor(&self.model, interval))
    }

    /// Make a fixed-size component follow the leading or trailing edge of
    /// its container along `axis`
    #[instrument(level = "debug", skip(self))]
    pub fn adjust_component_alignment(
        &mut self,
        id: &str,
        axis: Axis,
        alignment: Alignment,
    ) -> Result<(), DesignError> {
        self.require_idle()?;
        if !matches!(alignment, Alignment::Leading | Alignment::Trailing) {
            return Err(DesignError::invalid_structure(format!(
                "components can only follow the leading or trailing edge, not {}",
                alignment.keyword()
            )));
        }
        let anchor = self.adjustable_component_alignment(id, axis)?;
        if anchor.alignment == Some(alignment) {
            return Ok(());
        }
        let adjustable = match alignment {
            Alignment::Leading => anchor.leading_adjustable,
            _ => anchor.trailing_adjustable,
        };
        if !adjustable {
            return Err(DesignError::invalid_target(
                id,
                format!("cannot follow the {} edge", alignment.keyword()),
            ));
        }
        let before = self.model.clone();
        builder::adjust_alignment(
            &mut self.model,
            &self.layout,
            &self.metrics,
            &self.config,
            id,
            axis,
            alignment,
        );
        self.record_if_changed(before);
        Ok(())
    }

    fn placed_interval(&self, id: &str, axis: Axis) -> Option<IntervalId> {
        self.model
            .component_interval(id, axis)
            .filter(|&interval| self.model.parent(interval).is_some())
    }

    // ========================================================================
    // Undo
    // ========================================================================

    /// Record an undo step unless the command left the model as it was
    fn record_if_changed(&mut self, before: LayoutModel) {
        if self.model == before {
            debug!("command changed nothing");
            return;
        }
        self.record(before);
    }

    fn record(&mut self, before: LayoutModel) {
        self.history.push(Snapshot {
            model: before,
            serial: self.serial,
        });
        self.serial = self.next_serial;
        self.next_serial += 1;
        self.redo.clear();
        self.update_current_state();
        if cfg!(debug_assertions) {
            for warning in lint::check(&self.model) {
                warn!(%warning, "layout lint");
            }
        }
    }

    /// Mark of the current state
    pub fn change_mark(&self) -> ChangeMark {
        ChangeMark {
            depth: self.history.len(),
            serial: self.serial,
        }
    }

    /// Restore the state `mark` was taken in
    pub fn undo_to(&mut self, mark: ChangeMark) -> Result<(), DesignError> {
        self.require_idle()?;
        let valid = if mark.depth == self.history.len() {
            mark.serial == self.serial
        } else {
            self.history
                .get(mark.depth)
                .is_some_and(|s| s.serial == mark.serial)
        };
        if !valid {
            return Err(DesignError::StaleChangeMark);
        }
        while self.history.len() > mark.depth {
            self.undo()?;
        }
        Ok(())
    }

    /// Revert the last committed change. Returns `false` if there was none.
    pub fn undo(&mut self) -> Result<bool, DesignError> {
        self.require_idle()?;
        let Some(snapshot) = self.history.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut self.model, snapshot.model);
        self.redo.push(Snapshot {
            model: current,
            serial: self.serial,
        });
        self.serial = snapshot.serial;
        self.update_current_state();
        debug!(depth = self.history.len(), "undo");
        Ok(true)
    }

    /// Re-apply the last undone change. Returns `false` if there was none.
    pub fn redo(&mut self) -> Result<bool, DesignError> {
        self.require_idle()?;
        let Some(snapshot) = self.redo.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut self.model, snapshot.model);
        self.history.push(Snapshot {
            model: current,
            serial: self.serial,
        });
        self.serial = snapshot.serial;
        self.update_current_state();
        debug!(depth = self.history.len(), "redo");
        Ok(true)
    }
}

/// Raw bounds for a cursor offset: translated when moving, edges dragged
/// when resizing
fn drag_bounds(bounds: Bounds, dx: i32, dy: i32, edges: Option<[ResizeEdge; 2]>) -> Bounds {
    let Some(edges) = edges else {
        return bounds.translate(dx, dy);
    };
    let mut out = bounds;
    for (axis, d) in [(Axis::Horizontal, dx), (Axis::Vertical, dy)] {
        let extent = out.extent(axis);
        let dragged = match edges[axis.index()] {
            ResizeEdge::Leading => Extent::new((extent.start + d).min(extent.end), extent.end),
            ResizeEdge::Trailing => Extent::new(extent.start, (extent.end + d).max(extent.start)),
            ResizeEdge::None => extent,
        };
        out = out.with_extent(axis, dragged);
    }
    out
}

/// Shift dragged components so they stay within the container area
fn keep_inside(items: Vec<(String, Bounds)>, area: Bounds) -> Vec<(String, Bounds)> {
    let Some(union) = items.iter().map(|(_, b)| *b).reduce(|a, b| a.union(&b)) else {
        return items;
    };
    let shift = |start: i32, size: i32, lo: i32, hi: i32| -> i32 {
        if start + size > hi {
            (hi - size).max(lo) - start
        } else if start < lo {
            lo - start
        } else {
            0
        }
    };
    let dx = shift(union.x, union.width, area.x, area.x + area.width);
    let dy = shift(union.y, union.height, area.y, area.y + area.height);
    if dx == 0 && dy == 0 {
        return items;
    }
    items
        .into_iter()
        .map(|(id, b)| (id, b.translate(dx, dy)))
        .collect()
}
