//! Quiz content: problem banks and their entries.

use serde::{Deserialize, Serialize};

/// One answer option.
///
/// Content files usually list options as plain strings such as
/// `"B. Mount Fuji"`; the token is then the first character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemOption {
    Labeled { token: String, display: String },
    Plain(String),
}

impl ProblemOption {
    pub fn token(&self) -> String {
        match self {
            ProblemOption::Labeled { token, .. } => token.clone(),
            ProblemOption::Plain(text) => text.chars().next().map(String::from).unwrap_or_default(),
        }
    }

    pub fn display(&self) -> &str {
        match self {
            ProblemOption::Labeled { display, .. } => display,
            ProblemOption::Plain(text) => text,
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemEntry {
    /// Prompt text
    #[serde(alias = "dialog")]
    pub dialogs: String,
    pub options: Vec<ProblemOption>,
    /// Token of the correct option
    #[serde(alias = "answer")]
    pub ans: String,
}

impl ProblemEntry {
    pub fn is_correct(&self, token: &str) -> bool {
        self.ans == token
    }
}

/// Ordered problem set as loaded from content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemBank(Vec<ProblemEntry>);

impl ProblemBank {
    pub fn new(entries: Vec<ProblemEntry>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[ProblemEntry] {
        &self.0
    }

    /// Entries in the given order. Indices past the end are skipped.
    pub fn permuted(&self, order: &[usize]) -> Vec<&ProblemEntry> {
        order.iter().filter_map(|i| self.0.get(*i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = r#"[
        {"dialogs": "2 + 2?", "options": ["A. 3", "B. 4"], "ans": "B"},
        {"dialog": "Capital of Japan?", "options": [
            {"token": "t", "display": "Tokyo"},
            {"token": "k", "display": "Kyoto"}
        ], "answer": "t"}
    ]"#;

    #[test]
    fn parses_plain_and_labeled_options() {
        let bank: ProblemBank = serde_json::from_str(BANK).unwrap();
        assert_eq!(bank.len(), 2);

        let first = &bank.entries()[0];
        assert_eq!(first.options[1].token(), "B");
        assert_eq!(first.options[1].display(), "B. 4");
        assert!(first.is_correct("B"));

        let second = &bank.entries()[1];
        assert_eq!(second.options[0].token(), "t");
        assert_eq!(second.options[0].display(), "Tokyo");
        assert!(!second.is_correct("k"));
    }

    #[test]
    fn permuted_follows_order() {
        let bank: ProblemBank = serde_json::from_str(BANK).unwrap();
        let drawn = bank.permuted(&[1, 0, 7]);
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[0].ans, "t");
        assert_eq!(drawn[1].ans, "B");
    }

    #[test]
    fn empty_plain_option_has_empty_token() {
        assert_eq!(ProblemOption::Plain(String::new()).token(), "");
    }
}
