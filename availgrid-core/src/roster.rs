//! Roster sync: the cached student list, the active student, and the set of
//! students selected for display.
//!
//! Every selected name is a member of the current roster. The roster is
//! replaced wholesale on each refresh and the selection is re-intersected
//! with it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Names of the students chosen for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Drops every selected name that is not in `roster`.
pub fn reconcile_selection(old: &Selection, roster: &[String]) -> Selection {
    old.iter()
        .filter(|name| roster.iter().any(|s| s == name))
        .collect()
}

/// Loose comparison key for matching a typed name against the stored one.
fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<String>,
    active: Option<String>,
    selection: Selection,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[String] {
        &self.students
    }

    pub fn contains(&self, name: &str) -> bool {
        self.students.iter().any(|s| s == name)
    }

    /// Student that new busy blocks are recorded for.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replaces the roster with a freshly fetched list.
    ///
    /// An active name that disappeared is cleared, and an empty active name
    /// falls back to the first student. With `auto_select_all`, an empty
    /// selection (after pruning) becomes the whole roster.
    pub fn apply_refresh(&mut self, students: Vec<String>, auto_select_all: bool) {
        self.students = students;

        if self.active.as_deref().is_some_and(|a| !self.contains(a)) {
            self.active = None;
        }
        if self.active.is_none() {
            self.active = self.students.first().cloned();
        }

        self.selection = reconcile_selection(&self.selection, &self.students);
        if auto_select_all && self.selection.is_empty() {
            self.select_all();
        }
    }

    pub fn set_active(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.active = Some(name.to_string());
        true
    }

    pub fn clear_active_if(&mut self, name: &str) {
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
    }

    pub fn select_all(&mut self) {
        self.selection = self.students.iter().cloned().collect();
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    /// Adds or removes one name. Names outside the roster are ignored.
    pub fn toggle(&mut self, name: &str, included: bool) -> bool {
        if included {
            self.contains(name) && self.selection.insert(name)
        } else {
            self.selection.remove(name)
        }
    }

    /// Selects the roster entry created from the name the user typed.
    ///
    /// The service may normalise names (whitespace, capitalisation), so an
    /// exact match on the trimmed input is tried first and a loose match second.
    pub fn include_created(&mut self, typed: &str) -> Option<&str> {
        let trimmed = typed.trim();
        let key = name_key(trimmed);
        let index = self
            .students
            .iter()
            .position(|s| s == trimmed)
            .or_else(|| self.students.iter().position(|s| name_key(s) == key))?;
        let name = &self.students[index];
        self.selection.insert(name.clone());
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reconcile_drops_stale_names() {
        let old: Selection = ["A", "C", "D"].into_iter().collect();
        let expected: Selection = ["A"].into_iter().collect();
        assert_eq!(reconcile_selection(&old, &names(&["A", "B"])), expected);
    }

    #[test]
    fn refresh_prunes_selection() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A", "B", "C"]), false);
        roster.toggle("A", true);
        roster.toggle("C", true);

        roster.apply_refresh(names(&["A", "B"]), false);
        assert_eq!(roster.selection().iter().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn auto_select_all_only_fills_empty_selection() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A", "B"]), true);
        assert_eq!(roster.selection().iter().collect::<Vec<_>>(), ["A", "B"]);

        roster.toggle("B", false);
        roster.apply_refresh(names(&["A", "B"]), true);
        assert_eq!(roster.selection().iter().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn auto_select_all_applies_after_pruning_to_empty() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A", "B"]), false);
        roster.toggle("A", true);

        roster.apply_refresh(names(&["B", "C"]), true);
        assert_eq!(roster.selection().iter().collect::<Vec<_>>(), ["B", "C"]);
    }

    #[test]
    fn active_defaults_to_first_and_clears_when_removed() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A", "B"]), false);
        assert_eq!(roster.active(), Some("A"));

        assert!(roster.set_active("B"));
        roster.apply_refresh(names(&["A", "B", "C"]), false);
        assert_eq!(roster.active(), Some("B"));

        roster.apply_refresh(names(&["A", "C"]), false);
        assert_eq!(roster.active(), Some("A"));

        roster.apply_refresh(vec![], false);
        assert_eq!(roster.active(), None);
    }

    #[test]
    fn set_active_rejects_unknown_names() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A"]), false);
        assert!(!roster.set_active("Z"));
        assert_eq!(roster.active(), Some("A"));
    }

    #[test]
    fn toggle_ignores_names_outside_roster() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A"]), false);
        assert!(!roster.toggle("Z", true));
        assert!(roster.selection().is_empty());
        assert!(roster.toggle("A", true));
        assert!(roster.toggle("A", false));
        assert!(roster.selection().is_empty());
    }

    #[test]
    fn select_all_and_none() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["A", "B"]), false);
        roster.select_all();
        assert_eq!(roster.selection().len(), 2);
        roster.select_none();
        assert!(roster.selection().is_empty());
    }

    #[test]
    fn include_created_matches_normalised_name() {
        let mut roster = Roster::new();
        roster.apply_refresh(names(&["Mary Jane", "Bob"]), false);

        assert_eq!(roster.include_created("  bob "), Some("Bob"));
        assert_eq!(roster.include_created("mary   jane"), Some("Mary Jane"));
        assert_eq!(roster.include_created("Nobody"), None);
        assert_eq!(roster.selection().len(), 2);
    }
}
