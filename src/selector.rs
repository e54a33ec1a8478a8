use log::{debug, info, warn};

use crate::types::{Category, Selection};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Please select a label.")]
    Incomplete,
}

/// Two-level choice: a category, then one of its four labels.
#[derive(Debug, Clone, Default)]
pub struct LabelSelector {
    category: Option<Category>,
    labels: Vec<&'static str>,
    label: Option<usize>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Labels offered for the current category; empty until one is chosen.
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    pub fn selected_label(&self) -> Option<&'static str> {
        self.label.and_then(|i| self.labels.get(i).copied())
    }

    /// Rebuilds the label list and discards the previous label choice.
    pub fn select_category(&mut self, category: Category) {
        debug!("Category: {}", category.dir_name());
        self.category = Some(category);
        self.labels = category.labels().to_vec();
        self.label = None;
    }

    pub fn select_label(&mut self, index: usize) {
        if index < self.labels.len() {
            self.label = Some(index);
        } else {
            warn!("Label index {} out of range", index);
        }
    }

    /// Hands the selection forward, or rejects when either level is unset.
    pub fn proceed(&self) -> Result<Selection, SelectionError> {
        let (Some(category), Some(label)) = (self.category, self.selected_label()) else {
            warn!("Label not selected");
            return Err(SelectionError::Incomplete);
        };
        let selection = Selection::new(category, label).ok_or(SelectionError::Incomplete)?;
        info!("Selected: category={}, label={}", category.key(), label);
        Ok(selection)
    }

    /// Opaque parameters passed to the measurement screen.
    pub fn params(selection: &Selection) -> (String, String) {
        (selection.category().key().to_string(), selection.label().to_string())
    }
}
