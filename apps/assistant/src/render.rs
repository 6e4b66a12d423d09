//! Plain-text rendering of session state for the terminal.

use client_core::SessionSnapshot;
use shared::domain::{DocumentStats, HistoryEntry};

pub const EMPTY_HISTORY: &str = "Ask a question to begin.";
pub const NO_SUMMARY: &str = "No summary available yet. Upload a document to get started.";

pub fn entry(entry: &HistoryEntry) -> String {
    match entry {
        HistoryEntry::ChallengeQuestionPosted { question } => format!("Challenge: {question}"),
        HistoryEntry::AskExchange {
            question,
            answer,
            justification,
        } => format!(
            "Question: {question}\n  Answer: {answer}\n  Justification: {justification}"
        ),
        HistoryEntry::ChallengeExchange {
            question,
            answer,
            evaluation,
            justification,
        } => format!(
            "Challenge: {question}\n  Your Answer: {answer}\n  Evaluation: {evaluation}\n  Justification: {justification}"
        ),
        HistoryEntry::ErrorNotice { message } => format!("Error: {message}"),
    }
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    entries.iter().map(entry).collect::<Vec<_>>().join("\n")
}

pub fn summary(summary: &str) -> String {
    if summary.trim().is_empty() {
        NO_SUMMARY.to_string()
    } else {
        format!("Document Summary\n{summary}")
    }
}

pub fn stats(stats: Option<DocumentStats>) -> String {
    match stats {
        Some(stats) => format!("Doc length: {} words, {} chars", stats.words, stats.chars),
        None => "Doc length: —".to_string(),
    }
}

/// One-line status header shown after uploads and on `:stats`.
pub fn status(snapshot: &SessionSnapshot) -> String {
    let challenge = if snapshot.challenge_active {
        format!("Live ({} pending)", snapshot.pending_count)
    } else {
        "Off".to_string()
    };
    let summary = if snapshot.summary.is_empty() {
        "Pending"
    } else {
        "Ready"
    };
    format!(
        "{} | Summary: {summary} | Challenge: {challenge}",
        stats(snapshot.document_stats)
    )
}

pub fn prompt(pending_challenge: Option<&str>) -> String {
    match pending_challenge {
        Some(question) => format!("[challenge] {question}\nanswer> "),
        None => "ask> ".to_string(),
    }
}
