//! Geometry primitives shared by the model and the engine

use std::fmt;

use serde::Deserialize;

/// Largest size an interval can grow to; marks a resizable interval
pub const UNBOUNDED: i32 = 32767;

/// Layout axis. Every container keeps one interval tree per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Index into per-axis arrays
    pub fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    /// The orthogonal axis
    pub fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Alignment of an interval inside a parallel group, or of the group itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Leading,
    Trailing,
    Center,
    Baseline,
}

impl Alignment {
    pub const KEYWORDS: &'static [&'static str] = &["leading", "trailing", "center", "baseline"];

    /// Leading and trailing swap; center and baseline map to themselves
    pub fn opposite(self) -> Alignment {
        match self {
            Alignment::Leading => Alignment::Trailing,
            Alignment::Trailing => Alignment::Leading,
            other => other,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Alignment::Leading => "leading",
            Alignment::Trailing => "trailing",
            Alignment::Center => "center",
            Alignment::Baseline => "baseline",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Alignment> {
        match word {
            "leading" => Some(Alignment::Leading),
            "trailing" => Some(Alignment::Trailing),
            "center" => Some(Alignment::Center),
            "baseline" => Some(Alignment::Baseline),
            _ => None,
        }
    }
}

/// Category of preferred spacing between two components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingKind {
    #[default]
    Related,
    Unrelated,
    Separate,
    Indent,
}

impl PaddingKind {
    pub const KEYWORDS: &'static [&'static str] = &["related", "unrelated", "separate", "indent"];

    /// Kinds tried when snapping next to a component, smallest distance first
    pub const SNAP_ORDER: [PaddingKind; 3] = [
        PaddingKind::Related,
        PaddingKind::Unrelated,
        PaddingKind::Separate,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PaddingKind::Related => "related",
            PaddingKind::Unrelated => "unrelated",
            PaddingKind::Separate => "separate",
            PaddingKind::Indent => "indent",
        }
    }

    pub fn from_keyword(word: &str) -> Option<PaddingKind> {
        match word {
            "related" => Some(PaddingKind::Related),
            "unrelated" => Some(PaddingKind::Unrelated),
            "separate" => Some(PaddingKind::Separate),
            "indent" => Some(PaddingKind::Indent),
            _ => None,
        }
    }
}

/// Which edge of a component is dragged on one axis during a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeEdge {
    Leading,
    #[default]
    None,
    Trailing,
}

impl ResizeEdge {
    /// Host encoding: -1 leading, 1 trailing, anything else none
    pub fn from_flag(flag: i32) -> ResizeEdge {
        match flag {
            -1 => ResizeEdge::Leading,
            1 => ResizeEdge::Trailing,
            _ => ResizeEdge::None,
        }
    }

    pub fn alignment(self) -> Option<Alignment> {
        match self {
            ResizeEdge::Leading => Some(Alignment::Leading),
            ResizeEdge::Trailing => Some(Alignment::Trailing),
            ResizeEdge::None => None,
        }
    }
}

/// A point in container coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn coord(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// A one-dimensional extent `[start, end)` along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub start: i32,
    pub end: i32,
}

impl Extent {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> i32 {
        self.end - self.start
    }

    /// Strict overlap: touching extents do not overlap
    pub fn overlaps(&self, other: &Extent) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlap allowing `margin` pixels of separation
    pub fn overlaps_within(&self, other: &Extent, margin: i32) -> bool {
        self.start < other.end + margin && other.start < self.end + margin
    }

    pub fn contains(&self, other: &Extent) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn edge(&self, alignment: Alignment) -> i32 {
        match alignment {
            Alignment::Trailing => self.end,
            Alignment::Center => self.start + self.size() / 2,
            Alignment::Leading | Alignment::Baseline => self.start,
        }
    }
}

/// Concrete pixel bounds of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn leading(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    pub fn size(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn trailing(&self, axis: Axis) -> i32 {
        self.leading(axis) + self.size(axis)
    }

    pub fn extent(&self, axis: Axis) -> Extent {
        Extent::new(self.leading(axis), self.trailing(axis))
    }

    pub fn edge(&self, axis: Axis, alignment: Alignment) -> i32 {
        self.extent(axis).edge(alignment)
    }

    /// Copy of these bounds with the extent on `axis` replaced
    pub fn with_extent(&self, axis: Axis, extent: Extent) -> Bounds {
        match axis {
            Axis::Horizontal => Bounds::new(extent.start, self.y, extent.size(), self.height),
            Axis::Vertical => Bounds::new(self.x, extent.start, self.width, extent.size()),
        }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Bounds {
        Bounds::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let h = self.extent(Axis::Horizontal).union(&other.extent(Axis::Horizontal));
        let v = self.extent(Axis::Vertical).union(&other.extent(Axis::Vertical));
        Bounds::new(h.start, v.start, h.size(), v.size())
    }
}

/// Where a component currently sits. Components outside any layout (being
/// added, or removed from the layout but kept in the model) are unpositioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Unpositioned,
    Positioned(Bounds),
}

impl Placement {
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Placement::Positioned(b) => Some(*b),
            Placement::Unpositioned => None,
        }
    }

    pub fn is_positioned(&self) -> bool {
        matches!(self, Placement::Positioned(_))
    }
}

/// One of the min/pref/max size values of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Length {
    /// Derived from the component metrics or the default padding
    #[default]
    Default,
    /// Same as the preferred size
    Preferred,
    Px(i32),
    /// Grows without limit
    Unbounded,
}

impl Length {
    pub fn keyword(&self) -> String {
        match self {
            Length::Default => "default".to_string(),
            Length::Preferred => "preferred".to_string(),
            Length::Px(v) => v.to_string(),
            Length::Unbounded => "unbounded".to_string(),
        }
    }
}

/// Declared sizing of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeDef {
    pub min: Length,
    pub pref: Length,
    pub max: Length,
}

impl SizeDef {
    pub const DEFAULT: SizeDef = SizeDef {
        min: Length::Default,
        pref: Length::Default,
        max: Length::Default,
    };

    /// Fixed gap or component of exactly `px` pixels
    pub fn fixed(px: i32) -> SizeDef {
        SizeDef {
            min: Length::Default,
            pref: Length::Px(px),
            max: Length::Default,
        }
    }

    /// Resizable gap starting at `pref`
    pub fn resizing(pref: Length) -> SizeDef {
        SizeDef {
            min: Length::Px(0),
            pref,
            max: Length::Unbounded,
        }
    }

    /// Declared resizable on its own
    pub fn is_resizing(&self) -> bool {
        matches!(self.max, Length::Unbounded)
    }

    /// A group whose growth is suppressed: its max is tied to its preferred size
    pub fn is_suppressed(&self) -> bool {
        matches!(self.max, Length::Preferred)
    }

    pub fn is_default(&self) -> bool {
        *self == SizeDef::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_overlap_is_strict() {
        let a = Extent::new(0, 10);
        assert!(a.overlaps(&Extent::new(5, 15)));
        assert!(!a.overlaps(&Extent::new(10, 20)));
        assert!(a.overlaps_within(&Extent::new(12, 20), 3));
    }

    #[test]
    fn test_bounds_edges() {
        let b = Bounds::new(10, 20, 100, 50);
        assert_eq!(b.trailing(Axis::Horizontal), 110);
        assert_eq!(b.trailing(Axis::Vertical), 70);
        assert_eq!(b.edge(Axis::Horizontal, Alignment::Center), 60);
    }

    #[test]
    fn test_bounds_with_extent() {
        let b = Bounds::new(10, 20, 100, 50);
        let moved = b.with_extent(Axis::Vertical, Extent::new(5, 25));
        assert_eq!(moved, Bounds::new(10, 5, 100, 20));
    }

    #[test]
    fn test_resize_edge_flags() {
        assert_eq!(ResizeEdge::from_flag(-1), ResizeEdge::Leading);
        assert_eq!(ResizeEdge::from_flag(0), ResizeEdge::None);
        assert_eq!(ResizeEdge::from_flag(1), ResizeEdge::Trailing);
    }

    #[test]
    fn test_keywords() {
        for word in Alignment::KEYWORDS {
            assert_eq!(Alignment::from_keyword(word).unwrap().keyword(), *word);
        }
        for word in PaddingKind::KEYWORDS {
            assert_eq!(PaddingKind::from_keyword(word).unwrap().keyword(), *word);
        }
    }
}
