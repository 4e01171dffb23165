//! Intrinsic component metrics and preferred paddings
//!
//! The engine never measures anything itself. Sizes, baselines and paddings
//! come from a [`MetricsProvider`] supplied by the host; [`TableMetrics`] is
//! the table-backed provider used by tests and by hosts that precompute
//! their metrics.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Alignment, Axis, PaddingKind};

/// Source of intrinsic sizing facts
pub trait MetricsProvider {
    fn minimum_size(&self, id: &str) -> Option<(i32, i32)>;

    fn preferred_size(&self, id: &str) -> Option<(i32, i32)>;

    /// Baseline offset from the top of the component at the given size
    fn baseline(&self, id: &str, width: i32, height: i32) -> Option<i32>;

    /// Preferred distance between a component and the border of its parent
    fn padding_in_parent(
        &self,
        parent: &str,
        id: &str,
        axis: Axis,
        alignment: Alignment,
    ) -> Option<i32>;

    /// Preferred distance between two components; `second_alignment` tells
    /// on which side of `first` the `second` component sits
    fn padding(
        &self,
        first: &str,
        second: &str,
        axis: Axis,
        second_alignment: Alignment,
        kind: PaddingKind,
    ) -> Option<i32>;

    /// Whether the preferred size was locked by the user
    fn has_explicit_pref_size(&self, id: &str) -> bool;
}

/// Errors loading metrics tables
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to read metrics file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse metrics TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PaddingKey {
    first: String,
    second: String,
    axis: Axis,
    alignment: Alignment,
    kind: PaddingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ParentPaddingKey {
    parent: String,
    component: String,
    axis: Axis,
    alignment: Alignment,
}

/// Lookup tables implementing [`MetricsProvider`]
#[derive(Debug, Clone, Default)]
pub struct TableMetrics {
    minimum: HashMap<String, (i32, i32)>,
    preferred: HashMap<String, (i32, i32)>,
    baselines: HashMap<String, i32>,
    sized_baselines: HashMap<(String, i32, i32), i32>,
    explicit: HashSet<String>,
    paddings: HashMap<PaddingKey, i32>,
    parent_paddings: HashMap<ParentPaddingKey, i32>,
}

impl TableMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Component with the same minimum and preferred size
    pub fn with_component(mut self, id: &str, width: i32, height: i32) -> Self {
        self.set_sizes(id, (width, height), (width, height));
        self
    }

    pub fn with_sizes(mut self, id: &str, minimum: (i32, i32), preferred: (i32, i32)) -> Self {
        self.set_sizes(id, minimum, preferred);
        self
    }

    /// Baseline offset valid at every size
    pub fn with_baseline(mut self, id: &str, baseline: i32) -> Self {
        self.baselines.insert(id.to_string(), baseline);
        self
    }

    /// Baseline offset valid only at one size
    pub fn with_baseline_at(mut self, id: &str, width: i32, height: i32, baseline: i32) -> Self {
        self.sized_baselines
            .insert((id.to_string(), width, height), baseline);
        self
    }

    pub fn with_explicit_pref_size(mut self, id: &str) -> Self {
        self.explicit.insert(id.to_string());
        self
    }

    pub fn with_padding(
        mut self,
        first: &str,
        second: &str,
        axis: Axis,
        second_alignment: Alignment,
        kind: PaddingKind,
        size: i32,
    ) -> Self {
        self.paddings.insert(
            PaddingKey {
                first: first.to_string(),
                second: second.to_string(),
                axis,
                alignment: second_alignment,
                kind,
            },
            size,
        );
        self
    }

    /// Same padding-in-parent on both edges of both axes
    pub fn with_parent_padding_all(mut self, parent: &str, id: &str, size: i32) -> Self {
        for axis in Axis::ALL {
            for alignment in [Alignment::Leading, Alignment::Trailing] {
                self = self.with_parent_padding(parent, id, axis, alignment, size);
            }
        }
        self
    }

    pub fn with_parent_padding(
        mut self,
        parent: &str,
        id: &str,
        axis: Axis,
        alignment: Alignment,
        size: i32,
    ) -> Self {
        self.parent_paddings.insert(
            ParentPaddingKey {
                parent: parent.to_string(),
                component: id.to_string(),
                axis,
                alignment,
            },
            size,
        );
        self
    }

    pub fn set_sizes(&mut self, id: &str, minimum: (i32, i32), preferred: (i32, i32)) {
        self.minimum.insert(id.to_string(), minimum);
        self.preferred.insert(id.to_string(), preferred);
    }

    pub fn set_preferred_size(&mut self, id: &str, preferred: (i32, i32)) {
        self.preferred.insert(id.to_string(), preferred);
    }

    pub fn set_explicit_pref_size(&mut self, id: &str, explicit: bool) {
        if explicit {
            self.explicit.insert(id.to_string());
        } else {
            self.explicit.remove(id);
        }
    }

    /// Load tables from a TOML document
    ///
    /// ```toml
    /// [components.jLabel1]
    /// minimum = [34, 14]
    /// preferred = [34, 14]
    /// baseline = 11
    ///
    /// [[paddings]]
    /// first = "jLabel1"
    /// second = "jTextField1"
    /// axis = "horizontal"
    /// alignment = "trailing"
    /// kind = "related"
    /// size = 6
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, MetricsError> {
        let file: MetricsFile = toml::from_str(content)?;
        Ok(file.into_metrics())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MetricsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl MetricsProvider for TableMetrics {
    fn minimum_size(&self, id: &str) -> Option<(i32, i32)> {
        self.minimum.get(id).or_else(|| self.preferred.get(id)).copied()
    }

    fn preferred_size(&self, id: &str) -> Option<(i32, i32)> {
        self.preferred.get(id).copied()
    }

    fn baseline(&self, id: &str, width: i32, height: i32) -> Option<i32> {
        self.sized_baselines
            .get(&(id.to_string(), width, height))
            .or_else(|| self.baselines.get(id))
            .copied()
    }

    fn padding_in_parent(
        &self,
        parent: &str,
        id: &str,
        axis: Axis,
        alignment: Alignment,
    ) -> Option<i32> {
        self.parent_paddings
            .get(&ParentPaddingKey {
                parent: parent.to_string(),
                component: id.to_string(),
                axis,
                alignment,
            })
            .copied()
    }

    fn padding(
        &self,
        first: &str,
        second: &str,
        axis: Axis,
        second_alignment: Alignment,
        kind: PaddingKind,
    ) -> Option<i32> {
        let key = PaddingKey {
            first: first.to_string(),
            second: second.to_string(),
            axis,
            alignment: second_alignment,
            kind,
        };
        if let Some(size) = self.paddings.get(&key) {
            return Some(*size);
        }
        // the same distance seen from the other component
        let mirrored = PaddingKey {
            first: second.to_string(),
            second: first.to_string(),
            axis,
            alignment: second_alignment.opposite(),
            kind,
        };
        self.paddings.get(&mirrored).copied()
    }

    fn has_explicit_pref_size(&self, id: &str) -> bool {
        self.explicit.contains(id)
    }
}

// ============================================================================
// TOML schema
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetricsFile {
    #[serde(default)]
    components: HashMap<String, ComponentEntry>,
    #[serde(default)]
    paddings: Vec<PaddingEntry>,
    #[serde(default)]
    parent_paddings: Vec<ParentPaddingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentEntry {
    minimum: Option<(i32, i32)>,
    preferred: Option<(i32, i32)>,
    baseline: Option<i32>,
    #[serde(default)]
    explicit_preferred: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaddingEntry {
    first: String,
    second: String,
    axis: Axis,
    alignment: Alignment,
    #[serde(default)]
    kind: PaddingKind,
    size: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParentPaddingEntry {
    parent: String,
    component: String,
    axis: Axis,
    alignment: Alignment,
    size: i32,
}

impl MetricsFile {
    fn into_metrics(self) -> TableMetrics {
        let mut metrics = TableMetrics::new();
        for (id, entry) in self.components {
            if let Some(pref) = entry.preferred {
                metrics.preferred.insert(id.clone(), pref);
            }
            if let Some(min) = entry.minimum {
                metrics.minimum.insert(id.clone(), min);
            }
            if let Some(baseline) = entry.baseline {
                metrics.baselines.insert(id.clone(), baseline);
            }
            if entry.explicit_preferred {
                metrics.explicit.insert(id);
            }
        }
        for p in self.paddings {
            metrics = metrics.with_padding(&p.first, &p.second, p.axis, p.alignment, p.kind, p.size);
        }
        for p in self.parent_paddings {
            metrics = metrics.with_parent_padding(&p.parent, &p.component, p.axis, p.alignment, p.size);
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_lookup_is_symmetric() {
        let metrics = TableMetrics::new().with_padding(
            "a",
            "b",
            Axis::Horizontal,
            Alignment::Trailing,
            PaddingKind::Related,
            7,
        );
        assert_eq!(
            metrics.padding("a", "b", Axis::Horizontal, Alignment::Trailing, PaddingKind::Related),
            Some(7)
        );
        assert_eq!(
            metrics.padding("b", "a", Axis::Horizontal, Alignment::Leading, PaddingKind::Related),
            Some(7)
        );
        assert_eq!(
            metrics.padding("a", "b", Axis::Vertical, Alignment::Trailing, PaddingKind::Related),
            None
        );
    }

    #[test]
    fn test_sized_baseline_wins() {
        let metrics = TableMetrics::new()
            .with_baseline("label", 11)
            .with_baseline_at("label", 40, 20, 14);
        assert_eq!(metrics.baseline("label", 40, 20), Some(14));
        assert_eq!(metrics.baseline("label", 40, 16), Some(11));
        assert_eq!(metrics.baseline("other", 40, 16), None);
    }

    #[test]
    fn test_minimum_falls_back_to_preferred() {
        let metrics = TableMetrics::new().with_sizes("a", (10, 5), (20, 8));
        assert_eq!(metrics.minimum_size("a"), Some((10, 5)));
        let mut metrics = metrics;
        metrics.set_preferred_size("b", (30, 9));
        assert_eq!(metrics.minimum_size("b"), Some((30, 9)));
    }

    #[test]
    fn test_from_toml() {
        let metrics = TableMetrics::from_toml_str(
            r#"
            [components.jLabel1]
            minimum = [34, 14]
            preferred = [34, 14]
            baseline = 11

            [components.jPanel1]
            preferred = [100, 100]
            explicit_preferred = true

            [[paddings]]
            first = "jLabel1"
            second = "jTextField1"
            axis = "horizontal"
            alignment = "trailing"
            kind = "unrelated"
            size = 12

            [[parent_paddings]]
            parent = "Form"
            component = "jLabel1"
            axis = "vertical"
            alignment = "leading"
            size = 0
            "#,
        )
        .unwrap();
        assert_eq!(metrics.preferred_size("jLabel1"), Some((34, 14)));
        assert_eq!(metrics.baseline("jLabel1", 34, 14), Some(11));
        assert!(metrics.has_explicit_pref_size("jPanel1"));
        assert_eq!(
            metrics.padding(
                "jLabel1",
                "jTextField1",
                Axis::Horizontal,
                Alignment::Trailing,
                PaddingKind::Unrelated
            ),
            Some(12)
        );
        assert_eq!(
            metrics.padding_in_parent("Form", "jLabel1", Axis::Vertical, Alignment::Leading),
            Some(0)
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TableMetrics::from_toml_str("[components.a]\nwidth = 3\n").unwrap_err();
        assert!(matches!(err, MetricsError::Toml(_)));
    }
}
