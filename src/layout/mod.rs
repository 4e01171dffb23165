//! Layout engine: snapping, group building and bounds computation
//!
//! [`LayoutDesigner`] is the entry point. It takes gestures from the host,
//! previews them with the snapping engine, commits them through the group
//! builder and recomputes bounds after every change.

pub mod bounds;
pub mod builder;
pub mod config;
pub mod designer;
pub mod error;
pub mod lint;
pub mod snap;

pub use bounds::{compute, ComputedLayout, Sizes};
pub use builder::{ComponentAnchor, Inclusion, NewComponent};
pub use config::{ConfigError, DesignerConfig, PaddingDefaults};
pub use designer::{ChangeMark, LayoutDesigner, Preview};
pub use error::DesignError;
pub use snap::{apply_positions, find_positions, PositionDef, PositionKind, SnapRequest, SnapTarget};

/// Calculate Levenshtein distance between two strings
pub(crate) fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut row = vec![0usize; n + 1];
    for i in 1..=m {
        row[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[n]
}

/// Known names close to `target`, closest first
pub(crate) fn find_similar<'a>(
    known: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(String, usize)> = known
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then(|| (name.to_string(), dist))
        })
        .collect();

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    candidates
        .into_iter()
        .map(|(name, _)| name)
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("jLabel1", "jLabel1"), 0);
        assert_eq!(levenshtein_distance("jLabel1", "jLabel2"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar() {
        let known = ["jLabel1", "jLabel2", "jTextField1", "Form"];
        let similar = find_similar(known, "jLabel3", 2);
        assert_eq!(similar, vec!["jLabel1".to_string(), "jLabel2".to_string()]);
        assert!(find_similar(known, "jLabel1", 2).iter().all(|s| s != "jLabel1"));
    }
}
