//! Asset category catalog.
//!
//! Categories are fixed at compile time. Each one owns a pure predicate over a
//! `/`-separated path relative to the root of a mirror pass. Which categories
//! are enabled is decided per invocation by the resolved profile.

use std::fmt;

use serde::{Serialize, Serializer};

/// Directory name holding the embedded interpreter's standard library.
pub const PYTHON_LIBRARY_DIR: &str = "pylib";

/// Suffix of the compiled scripts shipped next to their sources.
pub const COMPILED_SCRIPT_SUFFIX: &str = ".opt.pyc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Scripts,
    Textures,
    Audio,
    Fonts,
    Json,
    Models,
    CollideModels,
    PythonLibrary,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Scripts,
        Category::Textures,
        Category::Audio,
        Category::Fonts,
        Category::Json,
        Category::Models,
        Category::CollideModels,
        Category::PythonLibrary,
    ];

    /// Toggle name as used in flags, config and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Scripts => "scripts",
            Category::Textures => "textures",
            Category::Audio => "audio",
            Category::Fonts => "fonts",
            Category::Json => "json",
            Category::Models => "models",
            Category::CollideModels => "collide-models",
            Category::PythonLibrary => "python-library",
        }
    }

    /// Returns true when `rel_path` belongs to this category.
    ///
    /// `texture_suffix` is only consulted for [`Category::Textures`]; without a
    /// suffix no file counts as a texture.
    pub fn matches(self, rel_path: &str, texture_suffix: Option<&str>) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        match self {
            Category::Scripts => {
                (name.ends_with(".py") || name.ends_with(COMPILED_SCRIPT_SUFFIX))
                    && !in_python_library(rel_path)
            }
            Category::Textures => texture_suffix.is_some_and(|suffix| name.ends_with(suffix)),
            Category::Audio => name.ends_with(".ogg"),
            Category::Fonts => name.ends_with(".fdata"),
            Category::Json => name.ends_with(".json"),
            Category::Models => name.ends_with(".bob"),
            Category::CollideModels => name.ends_with(".cob"),
            Category::PythonLibrary => in_python_library(rel_path),
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

fn in_python_library(rel_path: &str) -> bool {
    let mut parts: Vec<&str> = rel_path.split('/').collect();
    // The last component is the file itself.
    parts.pop();
    parts.contains(&PYTHON_LIBRARY_DIR)
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Set of enabled categories.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategorySet(u16);

impl CategorySet {
    pub const fn empty() -> Self {
        CategorySet(0)
    }

    pub fn all() -> Self {
        Category::ALL.into_iter().collect()
    }

    pub fn only(categories: &[Category]) -> Self {
        categories.iter().copied().collect()
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    pub fn remove(&mut self, category: Category) {
        self.0 &= !category.bit();
    }

    pub fn without(mut self, category: Category) -> Self {
        self.remove(category);
        self
    }

    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_all(self) -> bool {
        self == Self::all()
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled categories in catalog order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// True when any enabled category claims `rel_path`.
    pub fn matches(self, rel_path: &str, texture_suffix: Option<&str>) -> bool {
        self.iter().any(|c| c.matches(rel_path, texture_suffix))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = CategorySet::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Debug for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let names: Vec<&str> = self.iter().map(Category::as_str).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for CategorySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
