use crate::endpoint::{Endpoint, Method};
use crate::error::ClientError;
use crate::wire::{
    AccessibilityContent, ApiResponse, CompiledContent, ConsensusContent,
    ContextValidationContent, ErrorBody, GenerationRequest, UserStoriesContent,
};
use crate::Result;
use forge_core::auth::AuthProvider;
use forge_core::config::ApiConfig;
use forge_core::quality::QualityAssessment;
use forge_core::types::Stage;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default request timeout for generation calls.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_model: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_model: None,
        }
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout: Duration::from_secs(api.timeout_seconds),
            default_model: Some(api.default_model.clone()),
        }
    }
}

/// Client for the `/api/forge/*` routes.
///
/// Cheap to clone: the HTTP pool and auth provider are shared. Requests are
/// never retried; a failed call is surfaced to the caller as-is.
#[derive(Clone)]
pub struct ForgeClient {
    http: reqwest::Client,
    base_url: String,
    default_model: Option<String>,
    auth: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for ForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClient")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("authenticated", &self.auth.is_authenticated())
            .finish()
    }
}

impl ForgeClient {
    pub fn new(config: ClientConfig, auth: Arc<dyn AuthProvider>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.default_model,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api/forge/{}", self.base_url, path)
    }

    pub(crate) fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.auth.access_token() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    /// Build a request carrying the client's default model.
    pub fn request(
        &self,
        project_id: impl Into<String>,
        stage: Stage,
        context: serde_json::Value,
    ) -> GenerationRequest {
        GenerationRequest {
            project_id: project_id.into(),
            stage,
            context,
            model: self.default_model.clone(),
            priority: None,
        }
    }

    // -----------------------------------------------------------------------
    // Core call
    // -----------------------------------------------------------------------

    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<T>> {
        if endpoint.method() != Method::Post {
            return Err(ClientError::WrongMethod(endpoint.path().to_string()));
        }
        if endpoint.is_generation() {
            self.auth.charge_generation()?;
        }
        let url = self.url(endpoint.path());
        debug!(%url, project = %request.project_id, stage = %request.stage, "forge request");

        let resp = self
            .authorize(self.http.post(&url))
            .json(request)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
            endpoint: endpoint.path().to_string(),
            source,
        })
    }

    /// Untyped generation: the content is a JSON patch for the stage payload.
    pub async fn generate(
        &self,
        endpoint: Endpoint,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<serde_json::Value>> {
        self.call(endpoint, request).await
    }

    pub async fn assess_quality(
        &self,
        project_id: &str,
        stage: Stage,
        content: serde_json::Value,
    ) -> Result<QualityAssessment> {
        self.assess(&self.request(project_id, stage, content)).await
    }

    /// Assess a prepared request, e.g. one carrying the project priority.
    pub async fn assess(&self, request: &GenerationRequest) -> Result<QualityAssessment> {
        let resp: ApiResponse<QualityAssessment> =
            self.call(Endpoint::AssessQuality, request).await?;
        Ok(resp.content)
    }

    // -----------------------------------------------------------------------
    // Typed endpoints
    // -----------------------------------------------------------------------

    pub async fn generate_user_stories(
        &self,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<UserStoriesContent>> {
        self.call(Endpoint::GenerateUserStories, request).await
    }

    pub async fn validate_accessibility(
        &self,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<AccessibilityContent>> {
        self.call(Endpoint::ValidateAccessibility, request).await
    }

    pub async fn evaluate_architecture_consensus(
        &self,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<ConsensusContent>> {
        self.call(Endpoint::EvaluateArchitectureConsensus, request)
            .await
    }

    pub async fn compile_playbook(
        &self,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<CompiledContent>> {
        self.call(Endpoint::CompilePlaybook, request).await
    }

    pub async fn validate_context_integration(
        &self,
        request: &GenerationRequest,
    ) -> Result<ApiResponse<ContextValidationContent>> {
        self.call(Endpoint::ValidateContextIntegration, request)
            .await
    }
}

/// Pass 2xx responses through; turn anything else into a typed error.
pub(crate) async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized(message));
    }
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
