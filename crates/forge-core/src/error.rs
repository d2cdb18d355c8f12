use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("not initialized: run 'sutra init'")]
    NotInitialized,

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("invalid project id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidProjectId(String),

    #[error("invalid stage: {0}")]
    InvalidStage(String),

    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("stage mismatch: project is in '{current}', got completion for '{submitted}'")]
    StageMismatch { current: String, submitted: String },

    #[error("stage '{stage}' is incomplete: missing {}", missing.join(", "))]
    IncompleteStage {
        stage: String,
        missing: Vec<String>,
    },

    #[error("quality gate blocked '{stage}': score {score} is below minimum {minimum}")]
    GateBlocked {
        stage: String,
        score: u32,
        minimum: u32,
    },

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("stage payload does not match '{stage}': {reason}")]
    InvalidPayload { stage: String, reason: String },

    #[error("workflow already completed for project {0}")]
    WorkflowComplete(String),

    #[error("project {id} is {status}: no stage work is accepted")]
    ProjectClosed { id: String, status: String },

    #[error("guest daily limit of {limit} generations reached")]
    GuestLimitReached { limit: u32 },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
