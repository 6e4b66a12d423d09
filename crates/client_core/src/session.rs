//! Session state machine: upload, challenge rounds, derived stats.
//!
//! All state sits behind one async mutex. The lock is never held across a
//! remote call; results that come back after the state they were based on
//! changed are dropped.

use std::sync::Arc;

use serde::Serialize;
use shared::domain::{DocumentStats, HistoryEntry, Mode};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    challenge::ChallengeQueue, history::HistoryLog, ChallengeService, DocumentService,
    DocumentUpload, QuestionService,
};

const FETCH_CHALLENGE_FALLBACK: &str = "Failed to load challenge questions.";
const EMPTY_ROUND_MESSAGE: &str = "No challenge questions were generated.";
const UPLOAD_FALLBACK: &str = "Failed to upload document.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub document_text: Option<String>,
    pub summary: String,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a challenge round is already active ({pending} pending); close it first")]
    AlreadyActive { pending: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file selected.")]
    NoFileSelected,
    #[error("Please upload a PDF or TXT file.")]
    UnsupportedFileType { filename: String },
    #[error("{0}")]
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Loaded { stats: DocumentStats },
    /// Superseded by a later upload while in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStart {
    Started(usize),
    /// Recorded in history as an error notice.
    Failed(String),
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeToggle {
    Closed { dropped: usize },
    Opened(RoundStart),
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    SessionReset { stats: Option<DocumentStats> },
    HistoryAppended(HistoryEntry),
    ChallengeStateChanged { active: bool, pending: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub summary: String,
    pub document_stats: Option<DocumentStats>,
    pub challenge_active: bool,
    pub pending_challenge: Option<String>,
    pub pending_count: usize,
    pub history: Vec<HistoryEntry>,
}

pub(crate) struct SessionState {
    pub(crate) session: Session,
    /// Bumped on every upload; in-flight results from older epochs are stale.
    pub(crate) epoch: u64,
    /// Issued per `upload_document` call; only the latest may apply.
    upload_seq: u64,
    pub(crate) queue: ChallengeQueue,
    pub(crate) history: HistoryLog,
}

pub struct SessionController {
    documents: Arc<dyn DocumentService>,
    pub(crate) questions: Arc<dyn QuestionService>,
    pub(crate) challenges: Arc<dyn ChallengeService>,
    pub(crate) inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        documents: Arc<dyn DocumentService>,
        questions: Arc<dyn QuestionService>,
        challenges: Arc<dyn ChallengeService>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            documents,
            questions,
            challenges,
            inner: Mutex::new(SessionState {
                session: Session::default(),
                epoch: 0,
                upload_seq: 0,
                queue: ChallengeQueue::new(),
                history: HistoryLog::new(),
            }),
            events,
        })
    }

    /// One backend serving all three remote operations.
    pub fn with_backend<B>(backend: Arc<B>) -> Arc<Self>
    where
        B: DocumentService + QuestionService + ChallengeService + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn record(&self, state: &mut SessionState, entry: HistoryEntry) {
        state.history.append(entry.clone());
        self.emit(SessionEvent::HistoryAppended(entry));
    }

    pub(crate) fn emit_challenge_state(&self, state: &SessionState) {
        self.emit(SessionEvent::ChallengeStateChanged {
            active: !state.queue.is_empty(),
            pending: state.queue.len(),
        });
    }

    /// Starts a fresh session on `document_text`, dropping history and any
    /// challenge in progress.
    pub async fn upload(&self, document_text: impl Into<String>, summary: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        self.apply_upload(&mut guard, document_text.into(), summary.into());
    }

    fn apply_upload(&self, state: &mut SessionState, document_text: String, summary: String) {
        let had_challenge = !state.queue.is_empty();
        state.session.document_text = Some(document_text);
        state.session.summary = summary;
        state.session.mode = Mode::Workspace;
        state.epoch += 1;
        state.queue.clear();
        state.history = HistoryLog::new();

        let stats = state
            .session
            .document_text
            .as_deref()
            .map(DocumentStats::from_text);
        info!(
            epoch = state.epoch,
            words = stats.map(|s| s.words).unwrap_or_default(),
            "document session started"
        );
        self.emit(SessionEvent::SessionReset { stats });
        if had_challenge {
            self.emit_challenge_state(state);
        }
    }

    /// Validates the file locally, sends it to the document service and
    /// starts a new session from the extracted text.
    pub async fn upload_document(
        &self,
        document: DocumentUpload,
    ) -> Result<UploadOutcome, UploadError> {
        if document.filename.trim().is_empty() {
            return Err(UploadError::NoFileSelected);
        }
        if !document.has_accepted_extension() {
            return Err(UploadError::UnsupportedFileType {
                filename: document.filename,
            });
        }

        let (epoch, seq) = {
            let mut guard = self.inner.lock().await;
            guard.upload_seq += 1;
            (guard.epoch, guard.upload_seq)
        };
        let filename = document.filename.clone();
        let response = self.documents.upload(document).await;

        let mut guard = self.inner.lock().await;
        if guard.upload_seq != seq || guard.epoch != epoch {
            debug!(%filename, "discarding upload result from superseded session");
            return Ok(UploadOutcome::Discarded);
        }
        match response {
            Ok(body) => {
                let stats = DocumentStats::from_text(&body.text);
                self.apply_upload(&mut guard, body.text, body.summary);
                Ok(UploadOutcome::Loaded { stats })
            }
            Err(err) => {
                warn!(%filename, "document upload failed: {err}");
                Err(UploadError::Remote(err.message(UPLOAD_FALLBACK)))
            }
        }
    }

    pub async fn start_challenge_round(&self) -> Result<RoundStart, SessionError> {
        let (epoch, round) = {
            let guard = self.inner.lock().await;
            if !guard.queue.is_empty() {
                return Err(SessionError::AlreadyActive {
                    pending: guard.queue.len(),
                });
            }
            (guard.epoch, guard.queue.round())
        };

        let result = self.challenges.fetch_challenge().await;

        let mut guard = self.inner.lock().await;
        if guard.epoch != epoch || guard.queue.round() != round {
            debug!(round, "discarding challenge fetch for a superseded round");
            return Ok(RoundStart::Discarded);
        }

        let message = match result {
            Ok(payload) => {
                let questions = payload.into_questions();
                if !questions.is_empty() {
                    let count = questions.len();
                    guard.queue.enqueue_all(questions.iter().cloned());
                    for question in questions {
                        self.record(
                            &mut guard,
                            HistoryEntry::ChallengeQuestionPosted { question },
                        );
                    }
                    info!(
                        round = guard.queue.round(),
                        pending = count,
                        "challenge round started"
                    );
                    self.emit_challenge_state(&guard);
                    return Ok(RoundStart::Started(count));
                }
                EMPTY_ROUND_MESSAGE.to_string()
            }
            Err(err) => {
                warn!("challenge fetch failed: {err}");
                err.message(FETCH_CHALLENGE_FALLBACK)
            }
        };

        self.record(
            &mut guard,
            HistoryEntry::ErrorNotice {
                message: message.clone(),
            },
        );
        Ok(RoundStart::Failed(message))
    }

    /// Drops every unanswered question. Returns how many were dropped.
    pub async fn close_challenge_round(&self) -> usize {
        let mut guard = self.inner.lock().await;
        let dropped = guard.queue.clear();
        info!(dropped, "challenge round closed");
        if dropped > 0 {
            self.emit_challenge_state(&guard);
        }
        dropped
    }

    /// Single affordance for "Challenge me" / "Close challenge": closes an
    /// active round, otherwise starts one.
    pub async fn toggle_challenge(&self) -> ChallengeToggle {
        match self.start_challenge_round().await {
            Ok(outcome) => ChallengeToggle::Opened(outcome),
            Err(SessionError::AlreadyActive { .. }) => ChallengeToggle::Closed {
                dropped: self.close_challenge_round().await,
            },
        }
    }

    pub async fn compute_document_stats(&self) -> Option<DocumentStats> {
        let guard = self.inner.lock().await;
        guard
            .session
            .document_text
            .as_deref()
            .map(DocumentStats::from_text)
    }

    pub async fn mode(&self) -> Mode {
        self.inner.lock().await.session.mode
    }

    pub async fn summary(&self) -> String {
        self.inner.lock().await.session.summary.clone()
    }

    pub async fn document_text(&self) -> Option<String> {
        self.inner.lock().await.session.document_text.clone()
    }

    pub async fn challenge_active(&self) -> bool {
        !self.inner.lock().await.queue.is_empty()
    }

    pub async fn pending_challenge(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .queue
            .peek_first()
            .map(str::to_string)
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock().await.history.all().to_vec()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        SessionSnapshot {
            mode: guard.session.mode,
            summary: guard.session.summary.clone(),
            document_stats: guard
                .session
                .document_text
                .as_deref()
                .map(DocumentStats::from_text),
            challenge_active: !guard.queue.is_empty(),
            pending_challenge: guard.queue.peek_first().map(str::to_string),
            pending_count: guard.queue.len(),
            history: guard.history.all().to_vec(),
        }
    }
}
