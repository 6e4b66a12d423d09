//! Routes one line of user input to exactly one remote operation.
//!
//! A pending challenge question takes precedence: while the queue is
//! non-empty every submission is an answer to its head. Otherwise the input
//! is a free-form question about the document.

use shared::{
    domain::HistoryEntry,
    protocol::{AskRequest, EvaluateRequest},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{challenge::QueueTicket, session::SessionController};

const ASK_FALLBACK: &str = "Failed to get answer.";
const EVALUATE_FALLBACK: &str = "Failed to evaluate answer.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Answered(HistoryEntry),
    Evaluated(HistoryEntry),
    /// The session or round moved on while the call was in flight.
    Discarded,
}

/// Errors meant for inline display next to the input; never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter an answer.")]
    EmptyAnswer,
    #[error("Please enter a question.")]
    EmptyQuestion,
    #[error("{0}")]
    Remote(String),
}

enum Route {
    Answer(QueueTicket),
    Ask { epoch: u64 },
}

impl SessionController {
    pub async fn submit(&self, raw_input: &str) -> Result<SubmitOutcome, SubmitError> {
        let route = {
            let guard = self.inner.lock().await;
            match guard.queue.head_ticket() {
                Some(ticket) => Route::Answer(ticket),
                None => Route::Ask { epoch: guard.epoch },
            }
        };

        match route {
            Route::Answer(ticket) => self.answer_challenge(ticket, raw_input).await,
            Route::Ask { epoch } => self.ask_question(epoch, raw_input).await,
        }
    }

    async fn answer_challenge(
        &self,
        ticket: QueueTicket,
        raw_input: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        if raw_input.trim().is_empty() {
            return Err(SubmitError::EmptyAnswer);
        }

        let request = EvaluateRequest {
            question: ticket.question().to_string(),
            user_answer: raw_input.to_string(),
        };
        let result = self.challenges.evaluate(&request).await;

        let mut guard = self.inner.lock().await;
        if !guard.queue.is_head(&ticket) {
            debug!(
                round = ticket.round(),
                "discarding evaluation for a question no longer pending"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!("challenge evaluation failed: {err}");
                return Err(SubmitError::Remote(err.message(EVALUATE_FALLBACK)));
            }
        };

        guard.queue.dequeue_if_head(&ticket);
        let entry = HistoryEntry::ChallengeExchange {
            question: request.question,
            answer: request.user_answer,
            evaluation: response.answer,
            justification: response.justification,
        };
        self.record(&mut guard, entry.clone());
        self.emit_challenge_state(&guard);
        Ok(SubmitOutcome::Evaluated(entry))
    }

    async fn ask_question(
        &self,
        epoch: u64,
        raw_input: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        if raw_input.trim().is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }

        let request = AskRequest {
            question: raw_input.to_string(),
        };
        let result = self.questions.ask(&request).await;

        let mut guard = self.inner.lock().await;
        if guard.epoch != epoch {
            debug!(epoch, "discarding answer for a superseded document session");
            return Ok(SubmitOutcome::Discarded);
        }

        match result {
            Ok(response) => {
                let entry = HistoryEntry::AskExchange {
                    question: response.question,
                    answer: response.answer,
                    justification: response.justification,
                };
                self.record(&mut guard, entry.clone());
                Ok(SubmitOutcome::Answered(entry))
            }
            Err(err) => {
                warn!("question failed: {err}");
                Err(SubmitError::Remote(err.message(ASK_FALLBACK)))
            }
        }
    }
}
