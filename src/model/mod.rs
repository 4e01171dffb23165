//! The geometry model: components plus one interval tree per container and axis
//!
//! Intervals live in a [`SlotMap`] arena and refer to each other by
//! [`IntervalId`]. Components own their two component intervals for their
//! whole lifetime; an interval without a parent is simply not part of any
//! layout. Cloning the model is the snapshot used for undo.

pub mod interval;
pub mod persist;
pub mod types;

use indexmap::IndexMap;
use slotmap::SlotMap;

pub use interval::{Interval, IntervalId, IntervalKind};
pub use types::*;

/// A component known to the model
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutComponent {
    pub id: String,
    /// Container whose layout places this component; `None` when unpositioned
    /// or when this is a top-level container
    pub parent: Option<String>,
    /// The component's own interval in each axis
    pub intervals: [IntervalId; 2],
    /// Root groups of the component's own layout, if it is a container
    pub layout_roots: Option<[IntervalId; 2]>,
    /// Design size of a top-level container
    pub form_size: Option<(i32, i32)>,
    /// Container taken out of its parent's layout but kept in the model.
    /// It keeps its own layout and is not a form.
    pub detached: bool,
}

impl LayoutComponent {
    pub fn is_container(&self) -> bool {
        self.layout_roots.is_some()
    }

    pub fn interval(&self, axis: Axis) -> IntervalId {
        self.intervals[axis.index()]
    }

    pub fn root(&self, axis: Axis) -> Option<IntervalId> {
        self.layout_roots.map(|roots| roots[axis.index()])
    }
}

/// All layout state of a form: components and their interval trees
#[derive(Debug, Clone, Default)]
pub struct LayoutModel {
    intervals: SlotMap<IntervalId, Interval>,
    components: IndexMap<String, LayoutComponent>,
}

/// Same components and same intervals under the same ids
impl PartialEq for LayoutModel {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
            && self.intervals.len() == other.intervals.len()
            && self
                .intervals
                .iter()
                .all(|(id, interval)| other.intervals.get(id) == Some(interval))
    }
}

impl LayoutModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Register a component. Returns `false` when the id is already taken.
    pub fn add_component(&mut self, id: &str, is_container: bool) -> bool {
        if self.components.contains_key(id) {
            return false;
        }
        let intervals = [
            self.intervals.insert(Interval::component(id)),
            self.intervals.insert(Interval::component(id)),
        ];
        self.components.insert(
            id.to_string(),
            LayoutComponent {
                id: id.to_string(),
                parent: None,
                intervals,
                layout_roots: None,
                form_size: None,
                detached: false,
            },
        );
        if is_container {
            self.make_container(id);
        }
        true
    }

    /// Give a component its own (empty) layout
    pub fn make_container(&mut self, id: &str) {
        let has_roots = match self.components.get(id) {
            Some(comp) => comp.layout_roots.is_some(),
            None => return,
        };
        if has_roots {
            return;
        }
        let roots = [
            self.intervals.insert(Interval::parallel(Alignment::Leading)),
            self.intervals.insert(Interval::parallel(Alignment::Leading)),
        ];
        if let Some(comp) = self.components.get_mut(id) {
            comp.layout_roots = Some(roots);
        }
    }

    pub fn component(&self, id: &str) -> Option<&LayoutComponent> {
        self.components.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Components in registration order
    pub fn components(&self) -> impl Iterator<Item = &LayoutComponent> {
        self.components.values()
    }

    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Containers with their own layout
    pub fn container_ids(&self) -> impl Iterator<Item = &str> {
        self.components
            .values()
            .filter(|c| c.is_container())
            .map(|c| c.id.as_str())
    }

    /// Containers not placed in any other layout (the forms)
    pub fn top_level_containers(&self) -> impl Iterator<Item = &str> {
        self.components
            .values()
            .filter(|c| c.is_container() && c.parent.is_none() && !c.detached)
            .map(|c| c.id.as_str())
    }

    /// Components placed directly in `container`'s layout
    pub fn sub_components<'a>(&'a self, container: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.components
            .values()
            .filter(move |c| c.parent.as_deref() == Some(container))
            .map(|c| c.id.as_str())
    }

    pub fn is_in_layout(&self, id: &str) -> bool {
        self.components
            .get(id)
            .is_some_and(|c| c.parent.is_some())
    }

    /// True if `ancestor` is `id` or contains it at any depth
    pub fn is_same_or_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.components.get(cur).and_then(|c| c.parent.as_deref());
            steps += 1;
            if steps > self.components.len() {
                break;
            }
        }
        false
    }

    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) {
        if let Some(comp) = self.components.get_mut(id) {
            comp.parent = parent.map(str::to_string);
            if comp.parent.is_some() {
                comp.detached = false;
            }
        }
    }

    /// Take a placed component out of its container. A container keeps
    /// its nested layout and stays out of the forms.
    pub(crate) fn detach(&mut self, id: &str) {
        if let Some(comp) = self.components.get_mut(id) {
            if comp.parent.take().is_some() && comp.layout_roots.is_some() {
                comp.detached = true;
            }
        }
    }

    pub fn form_size(&self, id: &str) -> Option<(i32, i32)> {
        self.components.get(id).and_then(|c| c.form_size)
    }

    pub fn set_form_size(&mut self, id: &str, size: Option<(i32, i32)>) {
        if let Some(comp) = self.components.get_mut(id) {
            comp.form_size = size;
        }
    }

    /// Interval of component `id` in `axis`
    pub fn component_interval(&self, id: &str, axis: Axis) -> Option<IntervalId> {
        self.components.get(id).map(|c| c.interval(axis))
    }

    /// Root group of container `id` in `axis`
    pub fn root(&self, id: &str, axis: Axis) -> Option<IntervalId> {
        self.components.get(id).and_then(|c| c.root(axis))
    }

    /// Remove a component and, for containers, everything nested in it.
    /// The component must already be detached from its parent's layout.
    pub fn delete_component(&mut self, id: &str) {
        let nested: Vec<String> = self.sub_components(id).map(str::to_string).collect();
        for child in nested {
            self.delete_component(&child);
        }
        if let Some(comp) = self.components.shift_remove(id) {
            if let Some(roots) = comp.layout_roots {
                for root in roots {
                    self.delete_subtree(root);
                }
            }
            for interval in comp.intervals {
                self.delete_subtree(interval);
                self.intervals.remove(interval);
            }
        }
    }

    // ========================================================================
    // Intervals
    // ========================================================================

    pub fn interval(&self, id: IntervalId) -> &Interval {
        &self.intervals[id]
    }

    pub(crate) fn interval_mut(&mut self, id: IntervalId) -> &mut Interval {
        &mut self.intervals[id]
    }

    pub fn get_interval(&self, id: IntervalId) -> Option<&Interval> {
        self.intervals.get(id)
    }

    pub(crate) fn insert_interval(&mut self, interval: Interval) -> IntervalId {
        self.intervals.insert(interval)
    }

    pub fn children(&self, id: IntervalId) -> &[IntervalId] {
        self.intervals[id].children()
    }

    pub fn parent(&self, id: IntervalId) -> Option<IntervalId> {
        self.intervals[id].parent
    }

    pub fn index_in_parent(&self, id: IntervalId) -> Option<usize> {
        let parent = self.intervals[id].parent?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Attach `child` to `parent` at `index` (appended when `None`)
    pub(crate) fn add_child(&mut self, parent: IntervalId, child: IntervalId, index: Option<usize>) {
        if let Some(children) = self.intervals[parent].children_mut() {
            let at = index.unwrap_or(children.len()).min(children.len());
            children.insert(at, child);
        }
        self.intervals[child].parent = Some(parent);
    }

    /// Detach `child` from its parent. Returns the index it had.
    pub(crate) fn remove_child(&mut self, child: IntervalId) -> Option<usize> {
        let parent = self.intervals[child].parent?;
        let index = self.index_in_parent(child)?;
        if let Some(children) = self.intervals[parent].children_mut() {
            children.remove(index);
        }
        self.intervals[child].parent = None;
        Some(index)
    }

    /// Put `new` in the place of `old`; `old` ends up detached
    pub(crate) fn replace_child(&mut self, old: IntervalId, new: IntervalId) {
        let Some(parent) = self.intervals[old].parent else {
            return;
        };
        if let Some(index) = self.index_in_parent(old) {
            if let Some(children) = self.intervals[parent].children_mut() {
                children[index] = new;
            }
            self.intervals[new].parent = Some(parent);
            self.intervals[old].parent = None;
        }
    }

    /// Drop an interval and its descendants from the arena. Component
    /// intervals belong to their components and are only detached.
    pub(crate) fn delete_subtree(&mut self, id: IntervalId) {
        let Some(interval) = self.intervals.get(id) else {
            return;
        };
        if interval.is_component() {
            if let Some(parent) = interval.parent {
                if let Some(children) = self.intervals[parent].children_mut() {
                    children.retain(|&c| c != id);
                }
            }
            self.intervals[id].parent = None;
            return;
        }
        for child in interval.children().to_vec() {
            self.intervals[child].parent = None;
            self.delete_subtree(child);
        }
        if let Some(parent) = self.intervals[id].parent {
            if let Some(children) = self.intervals[parent].children_mut() {
                children.retain(|&c| c != id);
            }
        }
        self.intervals.remove(id);
    }

    /// Topmost ancestor of an interval
    pub fn tree_root(&self, id: IntervalId) -> IntervalId {
        let mut current = id;
        while let Some(parent) = self.intervals[current].parent {
            current = parent;
        }
        current
    }

    pub fn is_root(&self, id: IntervalId) -> bool {
        self.intervals[id].parent.is_none() && self.container_of_root(id).is_some()
    }

    /// Container owning the root group `root`
    pub fn container_of_root(&self, root: IntervalId) -> Option<&str> {
        self.components
            .values()
            .find(|c| c.layout_roots.is_some_and(|roots| roots.contains(&root)))
            .map(|c| c.id.as_str())
    }

    /// Container whose layout tree holds `id`
    pub fn container_of(&self, id: IntervalId) -> Option<&str> {
        self.container_of_root(self.tree_root(id))
    }

    /// Ids of the components under an interval, in tree order
    pub fn components_in(&self, id: IntervalId) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_components(id, &mut out);
        out
    }

    fn collect_components(&self, id: IntervalId, out: &mut Vec<String>) {
        let interval = &self.intervals[id];
        if let Some(comp) = interval.component_id() {
            out.push(comp.to_string());
        }
        for &child in interval.children() {
            self.collect_components(child, out);
        }
    }

    /// All intervals under `id` (inclusive), depth first
    pub fn descendants(&self, id: IntervalId) -> Vec<IntervalId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            out.extend_from_slice(self.children(out[i]));
            i += 1;
        }
        out
    }

    /// Effective alignment of an interval inside its parallel parent
    pub fn effective_alignment(&self, id: IntervalId) -> Alignment {
        let interval = &self.intervals[id];
        interval.alignment.unwrap_or_else(|| {
            interval
                .parent
                .and_then(|p| self.intervals[p].group_alignment())
                .unwrap_or(Alignment::Leading)
        })
    }

    /// Whether an interval grows with its container: it is resizable itself
    /// or it is a group, not suppressed, holding something that is
    pub fn wants_resize(&self, id: IntervalId) -> bool {
        let interval = &self.intervals[id];
        if interval.size.is_suppressed() {
            return false;
        }
        interval.size.is_resizing()
            || (interval.is_group() && interval.children().iter().any(|&c| self.wants_resize(c)))
    }

    /// Nearest ancestor group whose growth is suppressed
    pub fn suppressed_ancestor(&self, id: IntervalId) -> Option<IntervalId> {
        let mut current = self.intervals[id].parent;
        while let Some(p) = current {
            if self.intervals[p].size.is_suppressed() {
                return Some(p);
            }
            current = self.intervals[p].parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_row() -> (LayoutModel, IntervalId) {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.add_component("a", false);
        model.add_component("b", false);
        model.set_parent("a", Some("Form"));
        model.set_parent("b", Some("Form"));
        let root = model.root("Form", Axis::Horizontal).unwrap();
        let seq = model.insert_interval(Interval::sequential());
        model.add_child(root, seq, None);
        let a = model.component_interval("a", Axis::Horizontal).unwrap();
        let b = model.component_interval("b", Axis::Horizontal).unwrap();
        model.add_child(seq, a, None);
        let gap = model.insert_interval(Interval::gap(PaddingKind::Related, SizeDef::DEFAULT));
        model.add_child(seq, gap, None);
        model.add_child(seq, b, None);
        (model, seq)
    }

    #[test]
    fn test_tree_navigation() {
        let (model, seq) = model_with_row();
        let b = model.component_interval("b", Axis::Horizontal).unwrap();
        assert_eq!(model.index_in_parent(b), Some(2));
        assert_eq!(model.container_of(b), Some("Form"));
        assert_eq!(model.components_in(seq), vec!["a", "b"]);
        assert_eq!(model.descendants(seq).len(), 4);
    }

    #[test]
    fn test_replace_and_remove() {
        let (mut model, seq) = model_with_row();
        let a = model.component_interval("a", Axis::Horizontal).unwrap();
        let group = model.insert_interval(Interval::parallel(Alignment::Leading));
        model.replace_child(a, group);
        model.add_child(group, a, None);
        assert_eq!(model.children(seq)[0], group);
        assert_eq!(model.parent(a), Some(group));

        assert_eq!(model.remove_child(a), Some(0));
        assert!(model.children(group).is_empty());
        assert_eq!(model.parent(a), None);
    }

    #[test]
    fn test_delete_subtree_keeps_component_intervals() {
        let (mut model, seq) = model_with_row();
        let a = model.component_interval("a", Axis::Horizontal).unwrap();
        model.delete_subtree(seq);
        assert!(model.get_interval(seq).is_none());
        assert!(model.get_interval(a).is_some());
        assert_eq!(model.parent(a), None);
    }

    #[test]
    fn test_ancestry_of_nested_containers() {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.add_component("panel", true);
        model.add_component("label", false);
        model.set_parent("panel", Some("Form"));
        model.set_parent("label", Some("panel"));
        assert!(model.is_same_or_ancestor("Form", "label"));
        assert!(model.is_same_or_ancestor("panel", "panel"));
        assert!(!model.is_same_or_ancestor("label", "panel"));
        assert_eq!(model.top_level_containers().collect::<Vec<_>>(), vec!["Form"]);

        model.delete_component("panel");
        assert!(!model.contains("label"));
    }

    #[test]
    fn test_detached_container_is_not_a_form() {
        let mut model = LayoutModel::new();
        model.add_component("Form", true);
        model.add_component("panel", true);
        model.add_component("label", false);
        model.set_parent("panel", Some("Form"));
        model.set_parent("label", Some("panel"));

        model.detach("panel");
        assert!(!model.is_in_layout("panel"));
        assert_eq!(model.component("label").unwrap().parent.as_deref(), Some("panel"));
        assert_eq!(model.top_level_containers().collect::<Vec<_>>(), vec!["Form"]);

        model.set_parent("panel", Some("Form"));
        assert!(!model.component("panel").unwrap().detached);
    }

    #[test]
    fn test_equality_follows_edits() {
        let (model, seq) = model_with_row();
        let mut copy = model.clone();
        assert_eq!(copy, model);
        let gap = model.children(seq)[1];
        copy.interval_mut(gap).size = SizeDef::fixed(4);
        assert_ne!(copy, model);
        copy.interval_mut(gap).size = SizeDef::DEFAULT;
        assert_eq!(copy, model);
        copy.set_form_size("Form", Some((10, 10)));
        assert_ne!(copy, model);
    }
}
