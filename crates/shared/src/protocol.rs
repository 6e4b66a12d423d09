use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub text: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub justification: String,
}

/// `GET /challenge` answers with either a bare question or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChallengePayload {
    Many(Vec<String>),
    One(String),
}

impl ChallengePayload {
    pub fn into_questions(self) -> Vec<String> {
        match self {
            ChallengePayload::Many(questions) => questions,
            ChallengePayload::One(question) => vec![question],
        }
    }
}

impl From<Vec<String>> for ChallengePayload {
    fn from(value: Vec<String>) -> Self {
        ChallengePayload::Many(value)
    }
}

impl From<String> for ChallengePayload {
    fn from(value: String) -> Self {
        ChallengePayload::One(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub question: String,
    pub user_answer: String,
}

/// `answer` carries the verdict, e.g. "Correct".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub answer: String,
    pub justification: String,
}
