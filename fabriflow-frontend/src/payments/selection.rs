use serde::{Deserialize, Serialize};

/// Invoice ids chosen for one payment batch, in the order they were picked.
///
/// Ids are unique. Allocation runs in this order, not table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    /// Removes `id` if present, otherwise appends it.
    pub fn toggle(&mut self, id: &str) -> Toggle {
        if let Some(position) = self.ids.iter().position(|selected| selected == id) {
            self.ids.remove(position);
            Toggle::Removed
        } else {
            self.ids.push(id.to_string());
            Toggle::Added
        }
    }

    /// Replaces the selection with `ids`, keeping the first occurrence of duplicates.
    pub fn replace<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.clear();
        for id in ids {
            let id = id.into();
            if !self.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
