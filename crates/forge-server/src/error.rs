use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use forge_core::ForgeError;

// ---------------------------------------------------------------------------
// Sentinels for statuses that have no ForgeError counterpart
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum Sentinel {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotImplemented(String),
}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(Sentinel::NotFound(msg.into()).into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(Sentinel::Unauthorized(msg.into()).into())
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self(Sentinel::NotImplemented(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if let Some(s) = self.0.downcast_ref::<Sentinel>() {
            return match s {
                Sentinel::NotFound(_) => StatusCode::NOT_FOUND,
                Sentinel::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                Sentinel::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            };
        }
        let Some(e) = self.0.downcast_ref::<ForgeError>() else {
            return StatusCode::INTERNAL_SERVER_ERROR;
        };
        match e {
            ForgeError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
            ForgeError::ProjectExists(_)
            | ForgeError::WorkflowComplete(_)
            | ForgeError::ProjectClosed { .. } => StatusCode::CONFLICT,
            ForgeError::NotInitialized
            | ForgeError::InvalidProjectId(_)
            | ForgeError::InvalidStage(_)
            | ForgeError::InvalidValue { .. }
            | ForgeError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            ForgeError::StageMismatch { .. }
            | ForgeError::IncompleteStage { .. }
            | ForgeError::GateBlocked { .. }
            | ForgeError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ForgeError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ForgeError::GuestLimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            ForgeError::Io(_) | ForgeError::Yaml(_) | ForgeError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ForgeError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn project_not_found_maps_to_404() {
        assert_eq!(
            status_of(ForgeError::ProjectNotFound("p".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn invalid_stage_maps_to_400() {
        assert_eq!(
            status_of(ForgeError::InvalidStage("nope".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn incomplete_stage_maps_to_422() {
        assert_eq!(
            status_of(ForgeError::IncompleteStage {
                stage: "implementation_playbook".into(),
                missing: vec!["testingStrategy".into()],
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn permission_denied_maps_to_403() {
        assert_eq!(
            status_of(ForgeError::PermissionDenied("guest".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn io_error_maps_to_500() {
        assert_eq!(
            status_of(ForgeError::Io(std::io::Error::other("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn sentinels() {
        assert_eq!(
            AppError::not_found("x").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized("x").into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::not_implemented("x").into_response().status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            AppError(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
