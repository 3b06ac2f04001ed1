//! Logical-name substitution for embed tags.
//!
//! A define maps the name written in `<embed-file src="...">` to the file that
//! should actually be loaded. Substitution is a single lookup: the substitute
//! is used as-is and never looked up again.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameTable {
    map: HashMap<String, String>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `name` to `substitute`, replacing any earlier define for `name`.
    pub fn define(&mut self, name: impl Into<String>, substitute: impl Into<String>) {
        self.map.insert(name.into(), substitute.into());
    }

    /// The name to load for `name`.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, substitute) in iter {
            table.define(name, substitute);
        }
        table
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for RenameTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, substitute) in iter {
            self.define(name, substitute);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_names_resolve_to_themselves() {
        let table = RenameTable::new();
        assert_eq!(table.resolve("nav.html"), "nav.html");
    }

    #[test]
    fn defined_names_are_substituted() {
        let table: RenameTable = [("a.html", "b.html")].into_iter().collect();
        assert_eq!(table.resolve("a.html"), "b.html");
        assert_eq!(table.resolve("b.html"), "b.html");
    }

    #[test]
    fn substitution_is_not_chained() {
        let table: RenameTable = [("a.html", "b.html"), ("b.html", "c.html")]
            .into_iter()
            .collect();
        assert_eq!(table.resolve("a.html"), "b.html");
    }

    #[test]
    fn later_defines_override_earlier_ones() {
        let mut table: RenameTable = [("nav.html", "nav-dark.html")].into_iter().collect();
        table.extend([("nav.html", "nav-print.html")]);
        assert_eq!(table.resolve("nav.html"), "nav-print.html");
        assert_eq!(table.len(), 1);
    }
}
