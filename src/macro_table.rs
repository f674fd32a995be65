//! The macro table handed to math renderers.

use rustc_hash::FxHashMap;

/// Macros every table starts with, unless built with [`MacroTable::new`].
pub const DEFAULT_MACROS: &[(&str, &str)] = &[
    ("\\RR", "\\mathbb{R}"),
    ("\\NN", "\\mathbb{N}"),
    ("\\ZZ", "\\mathbb{Z}"),
    ("\\QQ", "\\mathbb{Q}"),
    ("\\CC", "\\mathbb{C}"),
];

/// A mapping from macro name (including the leading backslash, e.g. `\RR`)
/// to its expansion.
///
/// ```
/// # use mathscan::MacroTable;
/// let mut macros = MacroTable::default();
/// assert_eq!(macros.get("\\RR"), Some("\\mathbb{R}"));
///
/// macros.insert("\\eps", "\\varepsilon");
/// assert_eq!(macros.len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTable {
    entries: FxHashMap<String, String>,
}

impl MacroTable {
    /// An empty table.
    pub fn new() -> Self {
        MacroTable {
            entries: FxHashMap::default(),
        }
    }

    /// Adds or replaces a macro.  A missing leading backslash is added.
    pub fn insert(&mut self, name: impl Into<String>, expansion: impl Into<String>) {
        let mut name = name.into();
        if !name.starts_with('\\') {
            name.insert(0, '\\');
        }
        self.entries.insert(name, expansion.into());
    }

    /// Removes a macro, returning its expansion.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    /// The expansion of `name`, if defined.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Number of macros in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no macros.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, expansion)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        let mut table = MacroTable::new();
        for &(name, expansion) in DEFAULT_MACROS {
            table.insert(name, expansion);
        }
        table
    }
}
