//! Dialog body text as authors configure it.

use serde::{Deserialize, Serialize};

/// Either a fixed line or a pool of lines to pick from at random.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialogText {
    Fixed(String),
    Pool(Vec<String>),
}

impl DialogText {
    /// Resolve to the text to show.
    ///
    /// `pick` receives the pool size (always > 0) and returns an index below
    /// it; an empty pool resolves to an empty string.
    pub fn resolve(&self, pick: impl FnOnce(usize) -> usize) -> String {
        match self {
            DialogText::Fixed(text) => text.clone(),
            DialogText::Pool(lines) if lines.is_empty() => String::new(),
            DialogText::Pool(lines) => {
                let index = pick(lines.len()).min(lines.len() - 1);
                lines[index].clone()
            }
        }
    }
}

impl Default for DialogText {
    fn default() -> Self {
        Self::Fixed(String::new())
    }
}
