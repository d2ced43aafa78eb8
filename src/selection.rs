//! Export category selection.

use crate::catalog::{self, Brand};

/// Labels currently chosen for export.
///
/// Stored by display label because that is the checkbox identity in the
/// dialog; mapping to category keys happens at payload-build time, where
/// labels without a key are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    labels: Vec<String>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every catalog label for the brand, the dialog-open default.
    ///
    /// Always rebuilt from the catalog, never merged with a previous
    /// selection: labels are brand-specific, so a selection made under one
    /// brand must not carry over to another.
    pub fn all_for(brand: Brand) -> Self {
        Self {
            labels: catalog::labels_for(brand).iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add or remove a label.
    ///
    /// Never errors: a label unknown to the catalog is stored here and
    /// dropped when the payload is built.
    pub fn toggle(&mut self, label: &str) {
        if let Some(pos) = self.labels.iter().position(|l| l == label) {
            self.labels.remove(pos);
        } else {
            self.labels.push(label.to_string());
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_for_matches_catalog() {
        let selection = Selection::all_for(Brand::Builder);
        assert_eq!(selection.len(), catalog::labels_for(Brand::Builder).len());
        assert!(selection.contains("Chatflows"));
        assert!(selection.contains("Tools"));
    }

    #[test]
    fn test_toggle_removes_then_restores() {
        let mut selection = Selection::all_for(Brand::Builder);
        let before = selection.len();

        selection.toggle("Chatflows");
        assert!(!selection.contains("Chatflows"));
        assert_eq!(selection.len(), before - 1);

        selection.toggle("Chatflows");
        assert!(selection.contains("Chatflows"));
        assert_eq!(selection.len(), before);
    }

    #[test]
    fn test_toggle_stores_unknown_labels() {
        let mut selection = Selection::empty();
        selection.toggle("Not A Category");
        assert!(selection.contains("Not A Category"));
        selection.toggle("Not A Category");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_reset_across_brands_drops_old_labels() {
        // Valid under Builder, then the brand switches: the recomputed
        // selection holds exactly the Suite label set.
        let selection = Selection::all_for(Brand::Builder);
        assert!(selection.contains("Chatflows"));

        let selection = Selection::all_for(Brand::Suite);
        assert!(!selection.contains("Chatflows"));
        assert!(selection.contains("Assist Flows"));
        assert_eq!(selection.len(), catalog::labels_for(Brand::Suite).len());
    }
}
