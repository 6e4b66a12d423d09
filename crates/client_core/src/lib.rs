use async_trait::async_trait;
use shared::{
    error::ServiceError,
    protocol::{
        AskRequest, AskResponse, ChallengePayload, EvaluateRequest, EvaluateResponse,
        UploadResponse,
    },
};

pub mod challenge;
pub mod history;
mod router;
pub mod session;
pub mod transport;

pub use challenge::{ChallengeQueue, QueueError, QueueTicket};
pub use history::HistoryLog;
pub use router::{SubmitError, SubmitOutcome};
pub use session::{
    ChallengeToggle, RoundStart, Session, SessionController, SessionError, SessionEvent,
    SessionSnapshot, UploadError, UploadOutcome,
};
pub use transport::HttpAssistantClient;

const ACCEPTED_EXTENSIONS: [(&str, &str); 2] = [(".pdf", "application/pdf"), (".txt", "text/plain")];

/// A file picked by the user, not yet sent anywhere.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Mime type for accepted extensions, `None` for anything else.
    pub fn mime_type(&self) -> Option<&'static str> {
        let lower = self.filename.to_ascii_lowercase();
        ACCEPTED_EXTENSIONS
            .iter()
            .find(|(ext, _)| lower.ends_with(ext))
            .map(|(_, mime)| *mime)
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.mime_type().is_some()
    }
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn upload(&self, document: DocumentUpload) -> Result<UploadResponse, ServiceError>;
}

#[async_trait]
pub trait QuestionService: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError>;
}

#[async_trait]
pub trait ChallengeService: Send + Sync {
    async fn fetch_challenge(&self) -> Result<ChallengePayload, ServiceError>;
    async fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluateResponse, ServiceError>;
}


#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod transport_tests;
