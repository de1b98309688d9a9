//! The rows a user has marked for a bulk action.

use std::collections::BTreeSet;

/// The state of the select-all checkbox for the visible page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    /// No visible row is selected.
    None,
    /// Some, but not all, visible rows are selected.
    Some,
    /// Every visible row is selected.
    All,
}

impl SelectAllState {
    /// The value of the checkbox's `aria-checked` attribute.
    pub fn aria_checked(self) -> &'static str {
        match self {
            SelectAllState::None => "false",
            SelectAllState::Some => "mixed",
            SelectAllState::All => "true",
        }
    }
}

/// A set of row ids that is independent of the page being displayed.
///
/// Ids stay selected when their row scrolls off the visible page. Only
/// [SelectionSet::toggle], [SelectionSet::select_all_on_page],
/// [SelectionSet::remove_all] and [SelectionSet::clear] change the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Flip the membership of `id`, returning whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_owned());
            true
        }
    }

    /// Deselect the visible ids if all of them are selected, otherwise select them all.
    ///
    /// Ids that are not in `visible` are never touched.
    pub fn select_all_on_page(&mut self, visible: &[String]) {
        if self.select_all_state(visible) == SelectAllState::All {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().cloned());
        }
    }

    pub fn select_all_state(&self, visible: &[String]) -> SelectAllState {
        let selected_count = visible.iter().filter(|id| self.contains(id)).count();

        if selected_count == 0 {
            SelectAllState::None
        } else if selected_count == visible.len() {
            SelectAllState::All
        } else {
            SelectAllState::Some
        }
    }

    /// The ids of `visible` that are selected, in the order of `visible`.
    pub fn selected_among(&self, visible: &[String]) -> Vec<String> {
        visible
            .iter()
            .filter(|id| self.contains(id))
            .cloned()
            .collect()
    }

    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a String>) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
