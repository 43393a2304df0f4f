use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use url::Url;

use crate::models::*;
use crate::portal::auth::NETWORK_ERROR;

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Text suitable for an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Unauthorized => "Not authenticated".into(),
            ApiError::Network(_) => NETWORK_ERROR.into(),
            ApiError::Other(e) => e.to_string(),
        }
    }
}

// ─── Client ─────────────────────────────────────────────────────────────────

/// Talks to the portal server. The session cookie lives in the client's
/// cookie store, so clones share one login.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid portal URL: {base_url}"))?;

        let client = Client::builder()
            .user_agent("student-portal/0.1.0")
            .cookie_store(true)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(&format!("/api{path}"))
            .with_context(|| format!("Bad API path: {path}"))
            .map_err(ApiError::Other)
    }

    async fn check_status(resp: Response) -> Result<Response, ApiError> {
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            s if s.is_client_error() || s.is_server_error() => {
                let status = s.as_u16();
                let body = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<MessageResponse>(&body)
                    .map(|m| m.message)
                    .unwrap_or(body);
                Err(ApiError::Api { status, message })
            }
            _ => Ok(resp),
        }
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.api_url(path)?;
        let resp = self.client.post(url).json(body).send().await?;
        Self::check_status(resp).await
    }

    // ── Session ─────────────────────────────────────────────────────────

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let url = self.api_url("/current-user")?;
        let resp = Self::check_status(self.client.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<MessageResponse, ApiError> {
        let resp = self.post_json("/login", request).await?;
        Ok(resp.json().await?)
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        let resp = self.post_json("/signup", request).await?;
        Ok(resp.json().await?)
    }

    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        let resp = self.post_json("/logout", &serde_json::json!({})).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_account(&self) -> Result<MessageResponse, ApiError> {
        let url = self.api_url("/delete-account")?;
        let resp = Self::check_status(self.client.delete(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    // ── Upload ──────────────────────────────────────────────────────────

    /// Send a local file as the `assignmentFile` multipart field.
    pub async fn upload(
        &self,
        assignment_id: u32,
        file_path: &Path,
    ) -> Result<UploadResponse, ApiError> {
        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let data = tokio::fs::read(file_path).await.map_err(|e| {
            ApiError::Other(anyhow::anyhow!("Cannot read '{}': {e}", file_path.display()))
        })?;

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename)
            .mime_str(mime_from_ext(file_path))
            .map_err(|e| ApiError::Other(anyhow::anyhow!("Invalid content-type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("assignmentId", assignment_id.to_string())
            .part("assignmentFile", part);

        let url = self.api_url("/upload")?;
        let resp = self.client.post(url).multipart(form).send().await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

fn mime_from_ext(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "c" | "cpp" | "h" => "text/x-c",
        "java" => "text/x-java",
        "sql" => "application/sql",
        _ => "application/octet-stream",
    }
}
