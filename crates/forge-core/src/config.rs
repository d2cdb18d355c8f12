use crate::error::{ForgeError, Result};
use crate::paths;
use crate::types::{Stage, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = ForgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ForgeError::InvalidValue {
                field: "environment",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// QualityConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum score per stage, keyed by stage name.
    #[serde(default = "default_stage_minimums")]
    pub thresholds: BTreeMap<String, u32>,
    /// Points added to the minimum to get the recommended score.
    #[serde(default = "default_margin")]
    pub recommended_margin: u32,
    #[serde(default = "default_priority_adjustments")]
    pub priority_adjustments: bool,
}

pub fn default_minimum(stage: Stage) -> u32 {
    match stage {
        Stage::IdeaRefinement => 75,
        Stage::PrdGeneration => 80,
        Stage::UxRequirements => 82,
        Stage::TechnicalAnalysis => 85,
        Stage::ImplementationPlaybook => 88,
    }
}

fn default_stage_minimums() -> BTreeMap<String, u32> {
    Stage::all()
        .iter()
        .map(|&s| (s.as_str().to_string(), default_minimum(s)))
        .collect()
}

fn default_margin() -> u32 {
    10
}

fn default_priority_adjustments() -> bool {
    true
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            thresholds: default_stage_minimums(),
            recommended_margin: default_margin(),
            priority_adjustments: default_priority_adjustments(),
        }
    }
}

impl QualityConfig {
    /// Configured minimum for `stage`. The canonical key wins over aliases
    /// such as `prd` or `ux-requirements`.
    pub fn minimum_for(&self, stage: Stage) -> u32 {
        self.thresholds
            .get(stage.as_str())
            .copied()
            .or_else(|| {
                self.thresholds
                    .iter()
                    .find(|(key, _)| key.parse::<Stage>().ok() == Some(stage))
                    .map(|(_, &minimum)| minimum)
            })
            .unwrap_or_else(|| default_minimum(stage))
    }
}

// ---------------------------------------------------------------------------
// WorkflowConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_allow_ux_skip")]
    pub allow_ux_skip: bool,
    #[serde(default)]
    pub allow_rollback: bool,
}

fn default_allow_ux_skip() -> bool {
    true
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            allow_ux_skip: default_allow_ux_skip(),
            allow_rollback: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Bearer token. Read from config or `SUTRA_API_TOKEN`, never written back.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Role of the user the token belongs to. Guests are always `guest`.
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_base_url() -> String {
    "http://localhost:7071".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_role() -> UserRole {
    UserRole::User
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            default_model: default_model(),
            token: None,
            role: default_role(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// ForgeConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default = "default_guest_limit")]
    pub guest_daily_limit: u32,
}

fn default_version() -> u32 {
    1
}

fn default_guest_limit() -> u32 {
    5
}

impl ForgeConfig {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                owner: None,
            },
            environment: Environment::default(),
            api: ApiConfig::default(),
            quality: QualityConfig::default(),
            workflow: WorkflowConfig::default(),
            guest_daily_limit: default_guest_limit(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ForgeError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: ForgeConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the config and layer `SUTRA_*` environment variables on top.
    pub fn load_with_env(root: &Path) -> Result<Self> {
        let mut cfg = Self::load(root)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        crate::io::atomic_write(&path, self.to_yaml()?.as_bytes())
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("SUTRA_API_URL") {
            self.api.base_url = url;
        }
        if let Some(env) = get("SUTRA_ENVIRONMENT") {
            self.environment = env.parse()?;
        }
        if let Some(limit) = get("SUTRA_GUEST_DAILY_LIMIT") {
            self.guest_daily_limit =
                limit
                    .trim()
                    .parse()
                    .map_err(|_| ForgeError::InvalidValue {
                        field: "SUTRA_GUEST_DAILY_LIMIT",
                        value: limit.clone(),
                    })?;
        }
        if let Some(token) = get("SUTRA_API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Some(role) = get("SUTRA_ROLE") {
            self.api.role = role.trim().parse()?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let mut seen: BTreeMap<Stage, &str> = BTreeMap::new();
        for (key, &minimum) in &self.quality.thresholds {
            match key.parse::<Stage>() {
                Err(_) => warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("unknown stage '{key}' in quality.thresholds"),
                }),
                Ok(stage) => {
                    if let Some(other) = seen.insert(stage, key) {
                        warnings.push(ConfigWarning {
                            level: WarnLevel::Warning,
                            message: format!(
                                "'{other}' and '{key}' both set the {stage} threshold; '{}' is used",
                                stage.as_str()
                            ),
                        });
                    }
                }
            }
            if minimum > 100 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "quality threshold for '{key}' is {minimum}; scores are 0-100"
                    ),
                });
            }
        }

        if self.quality.recommended_margin == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "quality.recommended_margin is 0: the caution band is empty"
                    .to_string(),
            });
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "api.base_url '{}' must start with http:// or https://",
                    self.api.base_url
                ),
            });
        }

        if self.api.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "api.timeout_seconds is 0: requests will time out immediately"
                    .to_string(),
            });
        }

        if self.environment == Environment::Production && self.workflow.allow_rollback {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "workflow.allow_rollback is enabled in production".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
