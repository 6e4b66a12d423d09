use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Upload,
    Workspace,
}

/// One immutable record of something shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    ChallengeQuestionPosted {
        question: String,
    },
    AskExchange {
        question: String,
        answer: String,
        justification: String,
    },
    ChallengeExchange {
        question: String,
        answer: String,
        evaluation: String,
        justification: String,
    },
    ErrorNotice {
        message: String,
    },
}

impl HistoryEntry {
    pub fn question(&self) -> Option<&str> {
        match self {
            HistoryEntry::ChallengeQuestionPosted { question }
            | HistoryEntry::AskExchange { question, .. }
            | HistoryEntry::ChallengeExchange { question, .. } => Some(question),
            HistoryEntry::ErrorNotice { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HistoryEntry::ErrorNotice { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub words: usize,
    pub chars: usize,
}

impl DocumentStats {
    /// Words are whitespace-delimited runs; chars counts Unicode scalar values.
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_skip_empty_tokens() {
        let stats = DocumentStats::from_text("  alpha \n\tbeta   gamma  ");
        assert_eq!(stats.words, 3);
        assert_eq!(stats.chars, 24);
    }

    #[test]
    fn stats_for_blank_text_are_zero() {
        assert_eq!(
            DocumentStats::from_text(""),
            DocumentStats { words: 0, chars: 0 }
        );
    }

    #[test]
    fn history_entry_serializes_with_type_tag() {
        let entry = HistoryEntry::ErrorNotice {
            message: "boom".to_string(),
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["type"], "error_notice");
        assert_eq!(json["message"], "boom");
    }
}
