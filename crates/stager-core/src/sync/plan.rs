//! Mirror pass description.

use std::fmt;
use std::path::PathBuf;

use crate::catalog::CategorySet;

/// Decides which source-relative paths belong in a pass's destination.
pub trait IncludeRule: Send + Sync {
    fn includes(&self, rel_path: &str) -> bool;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Include rule built from the enabled asset categories of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub categories: CategorySet,
    pub texture_suffix: Option<String>,
}

impl CategoryRule {
    pub fn new(categories: CategorySet, texture_suffix: Option<&str>) -> Self {
        Self {
            categories,
            texture_suffix: texture_suffix.map(str::to_string),
        }
    }
}

impl IncludeRule for CategoryRule {
    fn includes(&self, rel_path: &str) -> bool {
        self.categories
            .matches(rel_path, self.texture_suffix.as_deref())
    }

    fn describe(&self) -> String {
        format!("categories [{}]", self.categories)
    }
}

pub struct SyncPlan {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub include: Box<dyn IncludeRule>,
    /// Remove destination files outside the matched set.
    pub delete_unmatched: bool,
    /// Destination-relative paths that are never deleted.
    pub preserve: Vec<String>,
}

impl SyncPlan {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        include: impl IncludeRule + 'static,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            include: Box::new(include),
            delete_unmatched: true,
            preserve: Vec::new(),
        }
    }

    pub fn preserving(mut self, rel_path: impl Into<String>) -> Self {
        self.preserve.push(rel_path.into());
        self
    }

    pub fn keep_unmatched(mut self) -> Self {
        self.delete_unmatched = false;
        self
    }
}

impl fmt::Debug for SyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncPlan")
            .field("source_root", &self.source_root)
            .field("destination_root", &self.destination_root)
            .field("include", &self.include.describe())
            .field("delete_unmatched", &self.delete_unmatched)
            .field("preserve", &self.preserve)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    #[test]
    fn category_rule_uses_texture_suffix() {
        let rule = CategoryRule::new(CategorySet::only(&[Category::Textures]), Some(".ktx"));
        assert!(rule.includes("ba_data/textures/a.ktx"));
        assert!(!rule.includes("ba_data/textures/a.dds"));
        assert_eq!(rule.describe(), "categories [textures]");
    }

    #[test]
    fn plan_builders() {
        let plan = SyncPlan::new("/src", "/dst", CategoryRule::new(CategorySet::all(), None))
            .preserving("payload_info")
            .keep_unmatched();
        assert!(!plan.delete_unmatched);
        assert_eq!(plan.preserve, vec!["payload_info".to_string()]);
        assert!(format!("{plan:?}").contains("categories"));
    }
}
