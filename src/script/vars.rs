//! Variable tables.
//!
//! One table per trigger instance (locals) and one per script container
//! (globals). Names compare case-insensitively but keep the spelling they
//! were first set with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named script value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

/// Ordered, case-insensitive variable map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarTable {
    vars: BTreeMap<String, Variable>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl VarTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a value up.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&key(name)).map(|v| v.value.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(&key(name))
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.vars.get_mut(&key(&name)) {
            Some(existing) => existing.value = value,
            None => {
                self.vars.insert(key(&name), Variable { name, value });
            }
        }
    }

    /// Insert a whole variable, replacing any with the same name.
    pub fn insert(&mut self, var: Variable) {
        self.vars.insert(key(&var.name), var);
    }

    /// Remove a variable and return it.
    pub fn take(&mut self, name: &str) -> Option<Variable> {
        self.vars.remove(&key(name))
    }

    /// Remove a variable. Returns true if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.take(name).is_some()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let mut vars = VarTable::new();
        vars.set("Target", "bob");
        assert_eq!(vars.get("target"), Some("bob"));
        assert_eq!(vars.get("TARGET"), Some("bob"));

        vars.set("TARGET", "alice");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.iter().next().unwrap().name, "Target");
        assert_eq!(vars.get("target"), Some("alice"));
    }

    #[test]
    fn test_take_and_insert() {
        let mut locals = VarTable::new();
        let mut globals = VarTable::new();
        locals.set("count", "3");

        let var = locals.take("COUNT").unwrap();
        globals.insert(var);

        assert!(locals.is_empty());
        assert_eq!(globals.get("count"), Some("3"));
    }

    #[test]
    fn test_remove() {
        let mut vars = VarTable::new();
        vars.set("a", "1");
        assert!(vars.remove("A"));
        assert!(!vars.remove("a"));
    }

    #[test]
    fn test_ordered_iteration() {
        let mut vars = VarTable::new();
        vars.set("zeta", "1");
        vars.set("alpha", "2");
        vars.set("Mid", "3");
        let names: Vec<_> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Mid", "zeta"]);
    }
}
