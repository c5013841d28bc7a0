use std::collections::HashSet;

use tracklane_protocol::EventId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Keep the current selection instead of clearing it first.
    pub append: bool,
    /// Flip membership instead of adding.
    pub toggle: bool,
}

/// Unordered set of selected event ids.
#[derive(Debug, Clone)]
pub struct Selection {
    selected: HashSet<EventId>,
    allow_multiple: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
            allow_multiple: true,
        }
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_multiple_selection(&self) -> bool {
        self.allow_multiple
    }

    pub fn set_allow_multiple_selection(&mut self, allow: bool) {
        self.allow_multiple = allow;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EventId> {
        self.selected.iter()
    }

    /// Replace the selection outright.
    pub fn set_selected<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = EventId>,
    {
        self.selected = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Apply a pointer-driven selection of `candidates`.
    ///
    /// In single-selection mode only the first candidate counts, and an
    /// existing selection of a different event is dropped before it is
    /// applied.
    pub fn select(&mut self, candidates: &[EventId], options: SelectOptions) {
        if !options.append {
            self.selected.clear();
        }

        if self.allow_multiple {
            for id in candidates {
                self.apply(id, options.toggle);
            }
        } else if let Some(first) = candidates.first() {
            if !self.selected.is_empty() && !self.selected.contains(first) {
                self.selected.clear();
            }
            self.apply(first, options.toggle);
        }
    }

    fn apply(&mut self, id: &EventId, toggle: bool) {
        if toggle && self.selected.contains(id) {
            self.selected.remove(id);
        } else {
            self.selected.insert(id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<EventId> {
        names.iter().map(|n| EventId::from(*n)).collect()
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut selection = Selection::new();
        let toggle = SelectOptions {
            append: true,
            toggle: true,
        };
        selection.select(&ids(&["e1"]), toggle);
        assert!(selection.is_selected("e1"));
        selection.select(&ids(&["e1"]), toggle);
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_without_append_starts_fresh() {
        let mut selection = Selection::new();
        selection.set_selected(ids(&["e1", "e2"]));
        selection.select(
            &ids(&["e1"]),
            SelectOptions {
                append: false,
                toggle: true,
            },
        );
        // Cleared first, so the toggle adds e1 back.
        assert!(selection.is_selected("e1"));
        assert!(!selection.is_selected("e2"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn single_selection_replaces_previous() {
        let mut selection = Selection::new();
        selection.set_allow_multiple_selection(false);
        let append = SelectOptions {
            append: true,
            toggle: false,
        };
        selection.select(&ids(&["e1"]), append);
        selection.select(&ids(&["e2", "e3"]), append);
        assert!(!selection.is_selected("e1"));
        assert!(selection.is_selected("e2"));
        assert!(!selection.is_selected("e3"));
    }

    #[test]
    fn multi_select_appends_all_candidates() {
        let mut selection = Selection::new();
        selection.select(&ids(&["a"]), SelectOptions::default());
        selection.select(
            &ids(&["b", "c"]),
            SelectOptions {
                append: true,
                toggle: false,
            },
        );
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn empty_candidates_clear_without_append() {
        let mut selection = Selection::new();
        selection.set_selected(ids(&["a"]));
        selection.select(&[], SelectOptions::default());
        assert!(selection.is_empty());
    }
}
