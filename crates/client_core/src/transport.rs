use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    error::{ServiceError, ServiceErrorBody},
    protocol::{
        AskRequest, AskResponse, ChallengePayload, EvaluateRequest, EvaluateResponse,
        UploadResponse,
    },
};
use url::Url;

use crate::{ChallengeService, DocumentService, DocumentUpload, QuestionService};

/// reqwest client for the research assistant HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpAssistantClient {
    http: Client,
    server_url: String,
}

impl HttpAssistantClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(server_url)
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "unsupported scheme '{}' in server url '{server_url}'",
                parsed.scheme()
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            server_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.server_url)
    }
}

fn transport_error(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| ServiceError::Transport(format!("invalid response body: {e}")));
    }

    // Non-JSON error bodies carry no detail; callers fall back to their own text.
    let detail = response
        .json::<ServiceErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail);
    Err(ServiceError::rejected(status.as_u16(), detail))
}

#[async_trait]
impl DocumentService for HttpAssistantClient {
    async fn upload(&self, document: DocumentUpload) -> Result<UploadResponse, ServiceError> {
        let mime = document.mime_type().unwrap_or("application/octet-stream");
        let part = Part::bytes(document.bytes)
            .file_name(document.filename)
            .mime_str(mime)
            .map_err(transport_error)?;
        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

#[async_trait]
impl QuestionService for HttpAssistantClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError> {
        let response = self
            .http
            .post(self.endpoint("ask"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

#[async_trait]
impl ChallengeService for HttpAssistantClient {
    async fn fetch_challenge(&self) -> Result<ChallengePayload, ServiceError> {
        let response = self
            .http
            .get(self.endpoint("challenge"))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluateResponse, ServiceError> {
        let response = self
            .http
            .post(self.endpoint("evaluate"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}
